use crate::session::SessionState;
use raspawin_core::Money;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("RaspaWin core error: {0}")]
    Core(#[from] raspawin_core::RaspawinError),

    #[error("Insufficient funds: need {need}, have {available}")]
    InsufficientFunds { need: Money, available: Money },

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Session {0} is still open")]
    SessionBusy(Uuid),

    #[error("Session {0} is already completed")]
    SessionClosed(Uuid),

    #[error("Cannot {action} while session is {state}")]
    InvalidTransition {
        state: SessionState,
        action: &'static str,
    },

    #[error("No active session")]
    NoActiveSession,

    #[error("Prize not found: {0}")]
    PrizeNotFound(String),

    #[error("Session {0} was already settled")]
    AlreadySettled(Uuid),
}

impl GameError {
    pub fn invalid_catalog(msg: impl Into<String>) -> Self {
        Self::InvalidCatalog(msg.into())
    }
}
