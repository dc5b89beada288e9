use crate::ledger::{HistoryStats, Ledger, Settlement};
use crate::resolver::{resolve, RandomSource};
use crate::session::{GameSession, SessionView};
use crate::surface::ScratchOutcome;
use crate::{GameError, PrizeCatalog, Result};
use parking_lot::Mutex;
use raspawin_core::{
    GameConfig, HistoryEntry, KeyValueStore, Money, PlayerContext, PlayerSnapshot, SnapshotStore,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Result of one stroke as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScratchUpdate {
    pub view: SessionView,
    pub newly_uncovered: u64,
    /// Set on the stroke that revealed the card.
    pub revealed: bool,
}

/// One player's scratch-card game: catalog, ledger and at most one open session.
pub struct ScratchGame {
    player: PlayerContext,
    config: GameConfig,
    store: Arc<dyn KeyValueStore>,
    source: Box<dyn RandomSource>,
    catalog: PrizeCatalog,
    ledger: Ledger,
    // shared with the pending reveal timer
    active: Arc<Mutex<Option<GameSession>>>,
    reveal_timer: Option<JoinHandle<()>>,
}

impl ScratchGame {
    /// Load the player's balance, history and catalog. Missing or corrupt
    /// saved data falls back to defaults.
    pub async fn load(
        player: PlayerContext,
        config: GameConfig,
        store: Arc<dyn KeyValueStore>,
        source: Box<dyn RandomSource>,
    ) -> Result<Self> {
        config.validate()?;

        let snapshot = SnapshotStore::new(store.as_ref())
            .load_player(&player, &config)
            .await;

        let catalog = PrizeCatalog::new(snapshot.catalog);
        if let Err(e) = catalog.validate() {
            tracing::warn!("Catalog for {} cannot be played: {}", player, e);
        }

        let ledger = Ledger::new(snapshot.balance, snapshot.history, config.history_limit);
        tracing::info!("Loaded game for {} with balance {}", player, ledger.balance());

        Ok(Self {
            player,
            config,
            store,
            source,
            catalog,
            ledger,
            active: Arc::new(Mutex::new(None)),
            reveal_timer: None,
        })
    }

    pub fn player(&self) -> &PlayerContext {
        &self.player
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn catalog(&self) -> &PrizeCatalog {
        &self.catalog
    }

    pub fn balance(&self) -> Money {
        self.ledger.balance()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.ledger.history()
    }

    pub fn stats(&self) -> HistoryStats {
        self.ledger.stats()
    }

    /// The current (or last completed) session.
    pub fn view(&self) -> Option<SessionView> {
        self.active.lock().as_ref().map(|s| s.view())
    }

    pub fn can_start(&self) -> bool {
        self.ledger.balance() >= self.config.entry_cost
            && !self.active.lock().as_ref().map_or(false, |s| s.is_open())
    }

    /// Pick up catalog edits made by the tenant administrator.
    pub async fn refresh_catalog(&mut self) {
        if let Some(prizes) = SnapshotStore::new(self.store.as_ref())
            .load_tenant_catalog(&self.player.tenant_id)
            .await
        {
            self.catalog = PrizeCatalog::new(prizes);
        }
    }

    /// Draw a prize, take the entry cost and open a new card.
    ///
    /// The in-memory ledger is authoritative: a failed save is logged and
    /// the session stays open.
    pub async fn start_session(&mut self) -> Result<SessionView> {
        if let Some(session) = self.active.lock().as_ref().filter(|s| s.is_open()) {
            return Err(GameError::SessionBusy(session.id()));
        }

        let prize = resolve(&self.catalog, self.source.as_mut())?;
        self.ledger.debit(self.config.entry_cost)?;

        let session = GameSession::new(prize, self.config.entry_cost, &self.config);
        let view = session.view();
        self.cancel_reveal_timer();
        *self.active.lock() = Some(session);

        tracing::info!("Player {} started session {}", self.player, view.id);

        self.persist().await;
        Ok(view)
    }

    /// Scratch with the configured brush.
    pub fn scratch(&mut self, x: f64, y: f64) -> Result<ScratchUpdate> {
        self.scratch_with_radius(x, y, self.config.brush_radius)
    }

    pub fn scratch_with_radius(&mut self, x: f64, y: f64, radius: f64) -> Result<ScratchUpdate> {
        let (outcome, view) = {
            let mut slot = self.active.lock();
            let session = slot.as_mut().ok_or(GameError::NoActiveSession)?;
            let outcome: ScratchOutcome = session.scratch(x, y, radius)?;
            (outcome, session.view())
        };

        if outcome.revealed {
            self.schedule_result(view.id);
        }

        Ok(ScratchUpdate {
            view,
            newly_uncovered: outcome.newly_uncovered,
            revealed: outcome.revealed,
        })
    }

    /// Reveal the whole card without further scratching.
    pub fn force_reveal(&mut self) -> Result<SessionView> {
        let (revealed, view) = {
            let mut slot = self.active.lock();
            let session = slot.as_mut().ok_or(GameError::NoActiveSession)?;
            let revealed = session.force_reveal()?;
            (revealed, session.view())
        };

        if revealed {
            self.schedule_result(view.id);
        }

        Ok(view)
    }

    /// Wait for the pending reveal delay, if any, and return the session.
    pub async fn wait_for_result(&mut self) -> Result<SessionView> {
        if let Some(timer) = self.reveal_timer.take() {
            if let Err(e) = timer.await {
                tracing::debug!("Reveal timer did not finish: {}", e);
            }
        }

        self.view().ok_or(GameError::NoActiveSession)
    }

    /// Close the card, credit the prize and save. As with
    /// [`start_session`](Self::start_session), a failed save is only logged.
    pub async fn complete(&mut self) -> Result<Settlement> {
        let settlement = {
            let mut slot = self.active.lock();
            let session = slot.as_mut().ok_or(GameError::NoActiveSession)?;
            session.complete()?;
            self.ledger.settle(session)?
        };
        self.reveal_timer = None;

        self.persist().await;
        Ok(settlement)
    }

    /// Drop a card that has not been revealed yet. The entry cost is not
    /// refunded and nothing is written to the history. A revealed card can
    /// only be completed.
    pub fn abandon(&mut self) -> Result<Uuid> {
        let id = {
            let mut slot = self.active.lock();
            let session = slot
                .as_ref()
                .filter(|s| s.is_open())
                .ok_or(GameError::NoActiveSession)?;
            if session.state().is_revealed() {
                return Err(GameError::InvalidTransition {
                    state: session.state(),
                    action: "abandon",
                });
            }

            let id = session.id();
            *slot = None;
            id
        };
        self.cancel_reveal_timer();

        tracing::warn!("Player {} abandoned session {}", self.player, id);
        Ok(id)
    }

    fn schedule_result(&mut self, session_id: Uuid) {
        self.cancel_reveal_timer();

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                // no runtime to wait on, show the result straight away
                if let Some(session) = self.active.lock().as_mut() {
                    if let Err(e) = session.show_result() {
                        tracing::warn!("Could not show result for {}: {}", session_id, e);
                    }
                }
                return;
            }
        };

        let active = Arc::clone(&self.active);
        let delay = self.config.reveal_delay;
        self.reveal_timer = Some(handle.spawn(async move {
            tokio::time::sleep(delay).await;

            let mut slot = active.lock();
            match slot.as_mut() {
                Some(session) if session.id() == session_id => {
                    if let Err(e) = session.show_result() {
                        tracing::warn!("Could not show result for {}: {}", session_id, e);
                    }
                }
                _ => tracing::debug!("Session {} is gone, skipping result", session_id),
            }
        }));
    }

    fn cancel_reveal_timer(&mut self) {
        if let Some(timer) = self.reveal_timer.take() {
            if !timer.is_finished() {
                tracing::warn!("Cancelling pending reveal timer");
            }
            timer.abort();
        }
    }

    async fn persist(&self) {
        let snapshot = PlayerSnapshot {
            balance: self.ledger.balance(),
            history: self.ledger.history(),
            catalog: self.catalog.prizes().to_vec(),
        };

        if let Err(e) = SnapshotStore::new(self.store.as_ref())
            .save_player(&self.player, &snapshot)
            .await
        {
            tracing::warn!("Could not save state for {}: {}", self.player, e);
        }
    }
}

impl Drop for ScratchGame {
    fn drop(&mut self) {
        if let Some(timer) = self.reveal_timer.take() {
            timer.abort();
        }
    }
}

impl std::fmt::Debug for ScratchGame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScratchGame")
            .field("player", &self.player)
            .field("balance", &self.ledger.balance())
            .field("session", &self.view())
            .field("reveal_pending", &self.reveal_timer.is_some())
            .finish()
    }
}
