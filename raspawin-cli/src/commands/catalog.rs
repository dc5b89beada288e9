use super::{random_source, store};
use crate::AppContext;
use clap::Subcommand;
use comfy_table::{presets::UTF8_FULL, Table};
use raspawin_core::SnapshotStore;
use raspawin_game::PrizeCatalog;

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// Show prizes, weights and odds
    Show,
    /// Change the weight of a prize
    SetWeight {
        /// Prize id
        prize_id: String,
        /// New weight (any non-negative number; odds are normalized)
        weight: f64,
    },
    /// Activate or deactivate a prize
    Toggle {
        /// Prize id
        prize_id: String,
    },
    /// Go back to the default catalog
    Reset,
}

pub async fn handle_catalog_command(cmd: CatalogCommands, ctx: &AppContext) -> anyhow::Result<()> {
    let store = store(ctx);
    let tenant = &ctx.config.tenant_id;

    match cmd {
        CatalogCommands::Show => {
            let catalog = PrizeCatalog::load_for_tenant(store.as_ref(), tenant).await;
            println!("Prize catalog for tenant '{}':", tenant);
            print_catalog(&catalog);
        }

        CatalogCommands::SetWeight { prize_id, weight } => {
            let mut catalog = PrizeCatalog::load_for_tenant(store.as_ref(), tenant).await;
            catalog.set_weight(&prize_id, weight)?;
            catalog.save_for_tenant(store.as_ref(), tenant).await?;

            println!("Weight of '{}' set to {}", prize_id, weight);
            print_catalog(&catalog);
        }

        CatalogCommands::Toggle { prize_id } => {
            let mut catalog = PrizeCatalog::load_for_tenant(store.as_ref(), tenant).await;
            let active = catalog.toggle_active(&prize_id)?;
            catalog.save_for_tenant(store.as_ref(), tenant).await?;

            println!(
                "Prize '{}' is now {}",
                prize_id,
                if active { "active" } else { "inactive" }
            );
            print_catalog(&catalog);
        }

        CatalogCommands::Reset => {
            SnapshotStore::new(store.as_ref())
                .remove_tenant_catalog(tenant)
                .await?;

            println!("Tenant '{}' uses the default catalog again", tenant);
            print_catalog(&PrizeCatalog::default());
        }
    }

    Ok(())
}

pub async fn simulate(ctx: &AppContext, rounds: u64, seed: Option<u64>) -> anyhow::Result<()> {
    let store = store(ctx);
    let catalog = PrizeCatalog::load_for_tenant(store.as_ref(), &ctx.config.tenant_id).await;
    let mut source = random_source(seed);

    println!("Drawing {} cards...", rounds);
    let counts = raspawin_game::simulate(&catalog, rounds, source.as_mut())?;
    let expected: Vec<f64> = catalog.odds().into_iter().map(|(_, p)| p).collect();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Prize", "Value", "Draws", "Observed", "Expected"]);

    let mut paid_cents: u128 = 0;
    for ((prize, count), probability) in counts.iter().zip(expected) {
        paid_cents += prize.value.to_cents() as u128 * *count as u128;
        let observed = if rounds == 0 {
            0.0
        } else {
            *count as f64 / rounds as f64
        };

        table.add_row(vec![
            format!("{} {}", prize.emoji, prize.name),
            prize.value.to_string(),
            count.to_string(),
            format!("{:.3}%", observed * 100.0),
            format!("{:.3}%", probability * 100.0),
        ]);
    }

    println!("{table}");

    if rounds > 0 {
        let cost = ctx.config.game.entry_cost.to_cents() as f64 / 100.0;
        let payout = paid_cents as f64 / 100.0 / rounds as f64;
        println!("Average payout per card: {:.4}", payout);
        println!("Expected payout per card: {:.4}", catalog.expected_payout());
        if cost > 0.0 {
            println!("Return to player: {:.2}%", payout / cost * 100.0);
        }
    }

    Ok(())
}

fn print_catalog(catalog: &PrizeCatalog) {
    let total = catalog.total_active_weight();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["ID", "Prize", "Value", "Weight", "Active", "Odds"]);

    for prize in catalog.prizes() {
        let odds = if prize.is_drawable() && total > 0.0 {
            format!("{:.2}%", prize.weight / total * 100.0)
        } else {
            "-".to_string()
        };

        table.add_row(vec![
            prize.id.clone(),
            format!("{} {}", prize.emoji, prize.name),
            prize.value.to_string(),
            prize.weight.to_string(),
            if prize.active { "yes" } else { "no" }.to_string(),
            odds,
        ]);
    }

    println!("{table}");
    println!("Total weight: {}", catalog.weight_total());
    println!("Expected payout per card: {:.4}", catalog.expected_payout());

    if let Err(e) = catalog.validate() {
        println!();
        println!("Warning: {}", e);
    }
}
