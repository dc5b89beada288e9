use crate::config::GameConfig;
use crate::error::Result;
use crate::storage::KeyValueStore;
use crate::types::{default_prizes, HistoryEntry, Money, PlayerContext, PrizeDefinition};
use serde::{Deserialize, Serialize};

/// Everything the engine persists for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub balance: Money,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub catalog: Vec<PrizeDefinition>,
}

impl PlayerSnapshot {
    pub fn fresh(config: &GameConfig) -> Self {
        Self {
            balance: config.starting_balance,
            history: Vec::new(),
            catalog: default_prizes(),
        }
    }
}

pub struct SnapshotStore<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> SnapshotStore<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn player_key(player: &PlayerContext) -> String {
        format!("raspawin:{}:{}", player.tenant_id, player.player_id)
    }

    pub fn catalog_key(tenant_id: &str) -> String {
        format!("raspawin:{}:catalog", tenant_id)
    }

    /// Load a player's snapshot. Absent or unreadable data falls back to
    /// defaults; this never fails.
    ///
    /// A tenant catalog, when one is stored, replaces the catalog saved in
    /// the player snapshot.
    pub async fn load_player(&self, player: &PlayerContext, config: &GameConfig) -> PlayerSnapshot {
        let key = Self::player_key(player);

        let mut snapshot = match self.store.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<PlayerSnapshot>(&raw) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!("Corrupt snapshot for {}, using defaults: {}", player, e);
                    PlayerSnapshot::fresh(config)
                }
            },
            Ok(None) => {
                tracing::info!("No snapshot for {}, starting fresh", player);
                PlayerSnapshot::fresh(config)
            }
            Err(e) => {
                tracing::warn!("Failed to load snapshot for {}, using defaults: {}", player, e);
                PlayerSnapshot::fresh(config)
            }
        };

        if let Some(catalog) = self.load_tenant_catalog(&player.tenant_id).await {
            snapshot.catalog = catalog;
        } else if snapshot.catalog.is_empty() {
            snapshot.catalog = default_prizes();
        }

        snapshot
    }

    pub async fn save_player(&self, player: &PlayerContext, snapshot: &PlayerSnapshot) -> Result<()> {
        let raw = serde_json::to_string(snapshot)?;
        self.store.set(&Self::player_key(player), &raw).await?;
        tracing::debug!("Saved snapshot for {}", player);
        Ok(())
    }

    pub async fn remove_player(&self, player: &PlayerContext) -> Result<()> {
        self.store.remove(&Self::player_key(player)).await
    }

    /// The administrative catalog for a tenant, if one has been saved and is readable.
    pub async fn load_tenant_catalog(&self, tenant_id: &str) -> Option<Vec<PrizeDefinition>> {
        let key = Self::catalog_key(tenant_id);

        match self.store.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<PrizeDefinition>>(&raw) {
                Ok(catalog) => Some(catalog),
                Err(e) => {
                    tracing::warn!("Corrupt catalog for tenant {}, ignoring: {}", tenant_id, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to load catalog for tenant {}: {}", tenant_id, e);
                None
            }
        }
    }

    pub async fn save_tenant_catalog(&self, tenant_id: &str, catalog: &[PrizeDefinition]) -> Result<()> {
        let raw = serde_json::to_string(catalog)?;
        self.store.set(&Self::catalog_key(tenant_id), &raw).await?;
        tracing::info!("Saved catalog for tenant {} ({} prizes)", tenant_id, catalog.len());
        Ok(())
    }

    pub async fn remove_tenant_catalog(&self, tenant_id: &str) -> Result<()> {
        self.store.remove(&Self::catalog_key(tenant_id)).await
    }
}
