use super::load_game;
use crate::AppContext;
use dialoguer::{Input, Select};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use raspawin_game::{ScratchGame, SessionState, SessionView, Settlement};

const MAX_AUTO_STROKES: usize = 10_000;

pub async fn play(ctx: &AppContext, auto: bool, seed: Option<u64>) -> anyhow::Result<()> {
    let mut game = load_game(ctx, seed).await?;

    println!("Balance: {}", game.balance());
    println!("Card cost: {}", game.config().entry_cost);

    let view = game.start_session().await?;
    println!("Bought card {}", view.id);
    println!("Balance after purchase: {}", game.balance());
    println!();

    let finished = if auto {
        scratch_automatically(&mut game, seed)?;
        true
    } else {
        scratch_interactively(&mut game)?
    };

    if !finished {
        let id = game.abandon()?;
        println!("Card {} forfeited, the entry cost is not refunded", id);
        return Ok(());
    }

    let view = game.wait_for_result().await?;
    print_prize(&view);

    let settlement = game.complete().await?;
    print_settlement(&settlement);
    Ok(())
}

/// Returns false if the player quit before the card was revealed.
fn scratch_interactively(game: &mut ScratchGame) -> anyhow::Result<bool> {
    let (width, height) = (game.config().surface_width, game.config().surface_height);
    println!(
        "The card is {}x{}. Scratch at x,y; the prize shows once {:.0}% is uncovered.",
        width,
        height,
        game.config().reveal_threshold * 100.0
    );

    loop {
        let state = game.view().map(|v| v.state);
        if state.map_or(true, |s| s.is_revealed()) {
            return Ok(true);
        }

        let choice = Select::new()
            .with_prompt("What now?")
            .items(&["Scratch", "Reveal all", "Quit (forfeit card)"])
            .default(0)
            .interact()?;

        match choice {
            0 => {
                let input: String = Input::new()
                    .with_prompt("x,y")
                    .default(format!("{},{}", width / 2, height / 2))
                    .interact_text()?;

                let Some((x, y)) = parse_point(&input) else {
                    println!("Enter two numbers separated by a comma, e.g. 120,80");
                    continue;
                };

                let update = game.scratch(x, y)?;
                print_progress(&update.view);
                if update.revealed {
                    println!("The card is revealed!");
                }
            }
            1 => {
                game.force_reveal()?;
                println!("Scratched off everything.");
            }
            _ => return Ok(false),
        }
    }
}

fn scratch_automatically(game: &mut ScratchGame, seed: Option<u64>) -> anyhow::Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let width = game.config().surface_width as f64;
    let height = game.config().surface_height as f64;

    for stroke in 1..=MAX_AUTO_STROKES {
        let x = rng.gen_range(0.0..width);
        let y = rng.gen_range(0.0..height);
        let update = game.scratch(x, y)?;

        tracing::debug!("Stroke {} at ({:.0}, {:.0})", stroke, x, y);
        if update.revealed || update.view.state.is_revealed() {
            print_progress(&update.view);
            println!("Revealed after {} strokes", stroke);
            return Ok(());
        }
    }

    game.force_reveal()?;
    println!("Revealed the rest of the card");
    Ok(())
}

fn parse_point(input: &str) -> Option<(f64, f64)> {
    let (x, y) = input.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}

fn print_progress(view: &SessionView) {
    println!("Scratched: {:.0}%", view.coverage * 100.0);
}

fn print_prize(view: &SessionView) {
    if view.state != SessionState::ResultShown {
        return;
    }

    match &view.prize {
        Some(prize) if prize.is_win() => {
            println!("{} {} - you won {}!", prize.emoji, prize.name, prize.value)
        }
        Some(prize) => println!("{} {} - better luck next time", prize.emoji, prize.name),
        None => {}
    }
}

fn print_settlement(settlement: &Settlement) {
    if settlement.won {
        println!("Credited {}", settlement.credited);
    }
    println!("Balance: {}", settlement.balance);
}
