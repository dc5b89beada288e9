//! RaspaWin core - shared types, configuration and persistence
//!
//! This library holds what the scratch-card engine and its front ends share:
//! money and prize types, the engine configuration, and the key-value
//! persistence the player snapshots live in.

pub mod config;
pub mod error;
pub mod storage;
pub mod types;

pub use config::GameConfig;
pub use error::{RaspawinError, Result};
pub use storage::{KeyValueStore, MemoryStore, PlayerSnapshot, SnapshotStore, SqliteStore};
pub use types::{default_prizes, HistoryEntry, Money, PlayerContext, PrizeDefinition};

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_snapshot_in_sqlite_store() {
        let temp_dir = tempdir().unwrap();
        let store = SqliteStore::new(&temp_dir.path().join("raspawin.db"))
            .await
            .unwrap();
        let snapshots = SnapshotStore::new(&store);
        let player = PlayerContext::new("client-1", "player-3");
        let config = GameConfig::default();

        let mut snapshot = snapshots.load_player(&player, &config).await;
        assert_eq!(snapshot.balance, config.starting_balance);

        snapshot.balance = Money::from_units(95);
        snapshots.save_player(&player, &snapshot).await.unwrap();

        let loaded = snapshots.load_player(&player, &config).await;
        assert_eq!(loaded.balance, Money::from_units(95));
    }
}
