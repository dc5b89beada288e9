use crate::surface::{ScratchOutcome, SurfaceTracker};
use crate::{GameError, Result};
use chrono::{DateTime, Utc};
use raspawin_core::{GameConfig, Money, PrizeDefinition};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Reveal state of one scratch card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Hidden,
    Scratching,
    Revealed,
    ResultShown,
    Completed,
}

impl SessionState {
    /// Whether the prize may be shown to the player.
    pub fn is_revealed(self) -> bool {
        matches!(
            self,
            SessionState::Revealed | SessionState::ResultShown | SessionState::Completed
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Hidden => "hidden",
            SessionState::Scratching => "scratching",
            SessionState::Revealed => "revealed",
            SessionState::ResultShown => "result shown",
            SessionState::Completed => "completed",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct GameSession {
    id: Uuid,
    chosen_prize: PrizeDefinition,
    surface: SurfaceTracker,
    state: SessionState,
    cost_paid: Money,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl GameSession {
    /// A fresh card: new id, fully covered surface.
    pub fn new(chosen_prize: PrizeDefinition, cost_paid: Money, config: &GameConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            chosen_prize,
            surface: SurfaceTracker::new(
                config.surface_width,
                config.surface_height,
                config.reveal_threshold,
            ),
            state: SessionState::Hidden,
            cost_paid,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != SessionState::Completed
    }

    pub fn coverage(&self) -> f64 {
        self.surface.coverage_fraction()
    }

    pub fn cost_paid(&self) -> Money {
        self.cost_paid
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn surface(&self) -> &SurfaceTracker {
        &self.surface
    }

    /// The prize, once the card has been revealed.
    pub fn prize(&self) -> Option<&PrizeDefinition> {
        self.state.is_revealed().then_some(&self.chosen_prize)
    }

    pub(crate) fn chosen_prize(&self) -> &PrizeDefinition {
        &self.chosen_prize
    }

    /// Apply one stroke. Crossing the threshold moves the card to `Revealed`.
    ///
    /// Strokes on a card that is already revealed are ignored.
    pub fn scratch(&mut self, x: f64, y: f64, radius: f64) -> Result<ScratchOutcome> {
        match self.state {
            SessionState::Completed => return Err(GameError::SessionClosed(self.id)),
            SessionState::Revealed | SessionState::ResultShown => {
                return Ok(ScratchOutcome {
                    newly_uncovered: 0,
                    coverage: self.coverage(),
                    revealed: false,
                });
            }
            SessionState::Hidden => {
                self.state = SessionState::Scratching;
                tracing::debug!("Session {} started scratching", self.id);
            }
            SessionState::Scratching => {}
        }

        let outcome = self.surface.scratch(x, y, radius);
        if outcome.revealed {
            self.state = SessionState::Revealed;
            tracing::info!(
                "Session {} revealed at {:.1}% coverage",
                self.id,
                outcome.coverage * 100.0
            );
        }

        Ok(outcome)
    }

    /// Uncover the whole card. Returns false when it was already revealed.
    pub fn force_reveal(&mut self) -> Result<bool> {
        match self.state {
            SessionState::Completed => Err(GameError::SessionClosed(self.id)),
            SessionState::Revealed | SessionState::ResultShown => Ok(false),
            SessionState::Hidden | SessionState::Scratching => {
                self.surface.force_reveal();
                self.state = SessionState::Revealed;
                tracing::info!("Session {} revealed by force", self.id);
                Ok(true)
            }
        }
    }

    /// Called once the reveal delay has elapsed.
    pub fn show_result(&mut self) -> Result<()> {
        match self.state {
            SessionState::Revealed => {
                self.state = SessionState::ResultShown;
                tracing::info!("Session {} showing result", self.id);
                Ok(())
            }
            SessionState::Completed => Err(GameError::SessionClosed(self.id)),
            state => Err(GameError::InvalidTransition {
                state,
                action: "show the result",
            }),
        }
    }

    /// Close the card. Only one transition into `Completed` is possible.
    pub fn complete(&mut self) -> Result<()> {
        match self.state {
            SessionState::ResultShown => {
                self.state = SessionState::Completed;
                self.completed_at = Some(Utc::now());
                tracing::info!("Session {} completed", self.id);
                Ok(())
            }
            SessionState::Completed => Err(GameError::SessionClosed(self.id)),
            state => Err(GameError::InvalidTransition {
                state,
                action: "complete",
            }),
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            state: self.state,
            coverage: self.coverage(),
            cost_paid: self.cost_paid,
            prize: self.prize().cloned(),
        }
    }
}

/// What the presentation layer may see of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub id: Uuid,
    pub state: SessionState,
    pub coverage: f64,
    pub cost_paid: Money,
    /// `None` until the card is revealed.
    pub prize: Option<PrizeDefinition>,
}
