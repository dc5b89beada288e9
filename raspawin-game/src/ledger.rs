use crate::session::{GameSession, SessionState};
use crate::{GameError, Result};
use chrono::Utc;
use raspawin_core::{HistoryEntry, Money, PrizeDefinition};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Monetary effect of one completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub session_id: Uuid,
    pub prize: PrizeDefinition,
    pub credited: Money,
    pub balance: Money,
    pub won: bool,
}

/// Summary of the recent history shown next to the game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub games: usize,
    pub wins: usize,
    /// Percentage of wins, 0 when there are no games.
    pub win_rate: f64,
    pub total_won: Money,
}

/// Owner of the player's balance and recent history.
#[derive(Debug, Clone)]
pub struct Ledger {
    balance: Money,
    // newest first
    history: VecDeque<HistoryEntry>,
    history_limit: usize,
}

impl Ledger {
    pub fn new(balance: Money, history: Vec<HistoryEntry>, history_limit: usize) -> Self {
        let mut history: VecDeque<HistoryEntry> = history.into();
        history.truncate(history_limit);

        Self {
            balance,
            history,
            history_limit,
        }
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    /// Most recent entry first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.iter().cloned().collect()
    }

    /// Take the entry cost. Fails without touching the balance when it is too low.
    pub fn debit(&mut self, cost: Money) -> Result<Money> {
        self.balance = self
            .balance
            .checked_sub(cost)
            .ok_or(GameError::InsufficientFunds {
                need: cost,
                available: self.balance,
            })?;

        tracing::info!("Debited {}, balance now {}", cost, self.balance);
        Ok(self.balance)
    }

    /// Credit a completed session's prize and record it in the history.
    pub fn settle(&mut self, session: &GameSession) -> Result<Settlement> {
        if session.state() != SessionState::Completed {
            return Err(GameError::InvalidTransition {
                state: session.state(),
                action: "settle",
            });
        }

        if self.history.iter().any(|h| h.session_id == session.id()) {
            return Err(GameError::AlreadySettled(session.id()));
        }

        let prize = session.chosen_prize().clone();
        let won = prize.is_win();
        if won {
            self.balance = self.balance.saturating_add(prize.value);
        }

        self.history.push_front(HistoryEntry {
            session_id: session.id(),
            timestamp: session.completed_at().unwrap_or_else(Utc::now),
            prize_name: prize.name.clone(),
            value: prize.value,
            won,
        });
        while self.history.len() > self.history_limit {
            self.history.pop_back();
        }

        tracing::info!(
            "Settled session {}: {} ({}), balance now {}",
            session.id(),
            prize.name,
            prize.value,
            self.balance
        );

        Ok(Settlement {
            session_id: session.id(),
            credited: if won { prize.value } else { Money::ZERO },
            prize,
            balance: self.balance,
            won,
        })
    }

    pub fn stats(&self) -> HistoryStats {
        let games = self.history.len();
        let wins = self.history.iter().filter(|h| h.won).count();
        let total_won = self
            .history
            .iter()
            .filter(|h| h.won)
            .fold(Money::ZERO, |acc, h| acc.saturating_add(h.value));

        HistoryStats {
            games,
            wins,
            win_rate: if games == 0 {
                0.0
            } else {
                wins as f64 / games as f64 * 100.0
            },
            total_won,
        }
    }
}
