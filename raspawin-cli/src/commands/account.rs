use super::load_game;
use crate::AppContext;
use comfy_table::{presets::UTF8_FULL, Table};
use dialoguer::Confirm;
use raspawin_core::{HistoryEntry, Money, PlayerSnapshot, SnapshotStore};

pub async fn show_balance(ctx: &AppContext) -> anyhow::Result<()> {
    let game = load_game(ctx, None).await?;
    let cost = game.config().entry_cost;

    println!("Balance for {}:", game.player());
    println!("  Available: {}", game.balance());
    println!("  Card cost: {}", cost);

    if !game.can_start() {
        println!();
        println!("Not enough to buy another card.");
    }

    Ok(())
}

pub async fn show_history(ctx: &AppContext) -> anyhow::Result<()> {
    let game = load_game(ctx, None).await?;
    let history = game.history();

    println!("Recent games for {}:", game.player());
    if history.is_empty() {
        println!("No games played yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Date", "Prize", "Value", "Result", "Session"]);

    for entry in &history {
        table.add_row(history_row(entry));
    }

    println!("{table}");
    Ok(())
}

pub async fn show_stats(ctx: &AppContext) -> anyhow::Result<()> {
    let game = load_game(ctx, None).await?;
    let stats = game.stats();

    println!("Statistics for {} (last {} games):", game.player(), stats.games);
    println!("  Wins: {}", stats.wins);
    println!("  Win rate: {:.1}%", stats.win_rate);
    println!("  Total won: {}", stats.total_won);
    println!("  Balance: {}", game.balance());

    Ok(())
}

/// Forget the player's saved state, or start over from `balance` when given.
pub async fn reset_player(ctx: &AppContext, yes: bool, balance: Option<Money>) -> anyhow::Result<()> {
    let player = ctx.config.player();

    if !yes
        && !Confirm::new()
            .with_prompt(format!(
                "Reset balance and history for {}? This cannot be undone",
                player
            ))
            .default(false)
            .interact()?
    {
        println!("Reset cancelled.");
        return Ok(());
    }

    let snapshots = SnapshotStore::new(ctx.store.as_ref());
    let balance = match balance {
        Some(balance) => {
            let snapshot = PlayerSnapshot {
                balance,
                ..PlayerSnapshot::fresh(&ctx.config.game)
            };
            snapshots.save_player(&player, &snapshot).await?;
            balance
        }
        None => {
            snapshots.remove_player(&player).await?;
            ctx.config.game.starting_balance
        }
    };

    tracing::info!("Reset player {}", player);
    println!("Balance reset to {}", balance);
    Ok(())
}

fn history_row(entry: &HistoryEntry) -> Vec<String> {
    let mut session = entry.session_id.to_string();
    session.truncate(8);

    vec![
        entry.timestamp.format("%Y-%m-%d %H:%M").to_string(),
        entry.prize_name.clone(),
        entry.value.to_string(),
        if entry.won { "Win" } else { "Loss" }.to_string(),
        session,
    ]
}
