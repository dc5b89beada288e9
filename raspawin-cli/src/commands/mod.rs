mod account;
mod catalog;
mod play;
mod settings;

pub use account::{reset_player, show_balance, show_history, show_stats};
pub use catalog::{handle_catalog_command, simulate, CatalogCommands};
pub use play::play;
pub use settings::{handle_config_command, ConfigCommands};

use crate::AppContext;
use raspawin_core::KeyValueStore;
use raspawin_game::{RandomSource, RngSource, ScratchGame};
use std::sync::Arc;

fn random_source(seed: Option<u64>) -> Box<dyn RandomSource> {
    match seed {
        Some(seed) => Box::new(RngSource::seeded(seed)),
        None => Box::new(RngSource::from_entropy()),
    }
}

pub(crate) fn store(ctx: &AppContext) -> Arc<dyn KeyValueStore> {
    ctx.store.clone()
}

async fn load_game(ctx: &AppContext, seed: Option<u64>) -> anyhow::Result<ScratchGame> {
    let game = ScratchGame::load(
        ctx.config.player(),
        ctx.config.game.clone(),
        store(ctx),
        random_source(seed),
    )
    .await?;
    Ok(game)
}
