use crate::error::{RaspawinError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Monetary amount in cents. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn from_units(units: u64) -> Self {
        Self(units * 100)
    }

    pub const fn to_cents(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Money {
    type Err = RaspawinError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RaspawinError::invalid_amount(format!("'{}'", s)));
        }
        if frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RaspawinError::invalid_amount(format!(
                "'{}' (at most two decimal places)",
                s
            )));
        }

        let units: u64 = whole
            .parse()
            .map_err(|_| RaspawinError::invalid_amount(format!("'{}' is too large", s)))?;
        let cents = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().unwrap_or(0) * 10,
            _ => frac.parse::<u64>().unwrap_or(0),
        };

        units
            .checked_mul(100)
            .and_then(|c| c.checked_add(cents))
            .map(Money)
            .ok_or_else(|| RaspawinError::invalid_amount(format!("'{}' is too large", s)))
    }
}

/// One entry of a prize catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeDefinition {
    pub id: String,
    pub name: String,
    pub value: Money,
    /// Relative likelihood; normalized by the sum of active weights.
    pub weight: f64,
    pub active: bool,
    #[serde(default)]
    pub emoji: String,
}

impl PrizeDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, value: Money, weight: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value,
            weight,
            active: true,
            emoji: String::new(),
        }
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = emoji.into();
        self
    }

    /// Whether this prize can be drawn at all.
    pub fn is_drawable(&self) -> bool {
        self.active && self.weight.is_finite() && self.weight > 0.0
    }

    pub fn is_win(&self) -> bool {
        !self.value.is_zero()
    }
}

/// Prize table used when a tenant has not configured its own.
pub fn default_prizes() -> Vec<PrizeDefinition> {
    vec![
        PrizeDefinition::new("1", "Jackpot!", Money::from_units(1000), 1.0).with_emoji("💎"),
        PrizeDefinition::new("2", "Super Prêmio", Money::from_units(500), 2.0).with_emoji("🏆"),
        PrizeDefinition::new("3", "Grande Prêmio", Money::from_units(100), 5.0).with_emoji("🎁"),
        PrizeDefinition::new("4", "Prêmio Médio", Money::from_units(50), 10.0).with_emoji("🎯"),
        PrizeDefinition::new("5", "Prêmio Pequeno", Money::from_units(20), 15.0).with_emoji("🎪"),
        PrizeDefinition::new("6", "Prêmio Mínimo", Money::from_units(10), 20.0).with_emoji("🎈"),
        PrizeDefinition::new("7", "Tente Novamente", Money::ZERO, 47.0).with_emoji("😔"),
    ]
}

/// Record of one completed session, kept in the player's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub session_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub prize_name: String,
    pub value: Money,
    pub won: bool,
}

/// Identifies whose balance, history and catalog the engine works on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerContext {
    pub tenant_id: String,
    pub player_id: String,
}

impl PlayerContext {
    pub fn new(tenant_id: impl Into<String>, player_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            player_id: player_id.into(),
        }
    }
}

impl fmt::Display for PlayerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tenant_id, self.player_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_parse_and_display() {
        assert_eq!("5".parse::<Money>().unwrap(), Money::from_cents(500));
        assert_eq!("5.5".parse::<Money>().unwrap(), Money::from_cents(550));
        assert_eq!("145.00".parse::<Money>().unwrap(), Money::from_units(145));
        assert_eq!(Money::from_cents(9505).to_string(), "95.05");

        assert!("-5".parse::<Money>().is_err());
        assert!("5.001".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!(".50".parse::<Money>().is_err());
    }

    #[test]
    fn test_money_checked_sub() {
        let balance = Money::from_units(4);
        assert!(balance.checked_sub(Money::from_units(5)).is_none());
        assert_eq!(
            Money::from_units(100).checked_sub(Money::from_units(5)),
            Some(Money::from_units(95))
        );
    }

    #[test]
    fn test_prize_drawable() {
        let mut prize = PrizeDefinition::new("1", "Jackpot!", Money::from_units(1000), 1.0);
        assert!(prize.is_drawable());
        assert!(prize.is_win());

        prize.active = false;
        assert!(!prize.is_drawable());

        prize.active = true;
        prize.weight = 0.0;
        assert!(!prize.is_drawable());

        prize.weight = f64::NAN;
        assert!(!prize.is_drawable());
    }

    #[test]
    fn test_prize_without_emoji_deserializes() {
        let json = r#"{"id":"7","name":"Tente Novamente","value":0,"weight":47.0,"active":true}"#;
        let prize: PrizeDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(prize.emoji, "");
        assert!(!prize.is_win());
    }
}
