use crate::{GameError, Result};
use raspawin_core::{default_prizes, KeyValueStore, PrizeDefinition, SnapshotStore};
use serde::{Deserialize, Serialize};

/// Weight sum the administrative view expects; anything far from it is only warned about.
const EXPECTED_WEIGHT_TOTAL: f64 = 100.0;
const WEIGHT_TOTAL_TOLERANCE: f64 = 5.0;

/// Ordered prize table. Order matters: the resolver scans it front to back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrizeCatalog {
    prizes: Vec<PrizeDefinition>,
}

impl Default for PrizeCatalog {
    fn default() -> Self {
        Self::new(default_prizes())
    }
}

impl PrizeCatalog {
    pub fn new(prizes: Vec<PrizeDefinition>) -> Self {
        Self { prizes }
    }

    /// The tenant's administrative catalog, or the default one.
    pub async fn load_for_tenant(store: &dyn KeyValueStore, tenant_id: &str) -> Self {
        SnapshotStore::new(store)
            .load_tenant_catalog(tenant_id)
            .await
            .map(Self::new)
            .unwrap_or_default()
    }

    /// Store as the tenant's catalog. An unplayable catalog is saved but
    /// refuses new sessions until fixed.
    pub async fn save_for_tenant(&self, store: &dyn KeyValueStore, tenant_id: &str) -> Result<()> {
        if let Err(e) = self.validate() {
            tracing::warn!("Saving unplayable catalog for tenant {}: {}", tenant_id, e);
        }

        SnapshotStore::new(store)
            .save_tenant_catalog(tenant_id, &self.prizes)
            .await?;
        Ok(())
    }

    pub fn prizes(&self) -> &[PrizeDefinition] {
        &self.prizes
    }

    pub fn len(&self) -> usize {
        self.prizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prizes.is_empty()
    }

    pub fn get(&self, prize_id: &str) -> Option<&PrizeDefinition> {
        self.prizes.iter().find(|p| p.id == prize_id)
    }

    /// Check the catalog can be drawn from.
    pub fn validate(&self) -> Result<()> {
        if let Some(bad) = self
            .prizes
            .iter()
            .find(|p| p.active && !(p.weight.is_finite() && p.weight >= 0.0))
        {
            return Err(GameError::invalid_catalog(format!(
                "prize '{}' has invalid weight {}",
                bad.id, bad.weight
            )));
        }

        if !self.prizes.iter().any(|p| p.is_drawable()) {
            return Err(GameError::invalid_catalog(
                "no active prize with a positive weight",
            ));
        }

        let total = self.total_active_weight();
        if !total.is_finite() {
            return Err(GameError::invalid_catalog(format!(
                "active weights add up to {}, which cannot be normalized",
                total
            )));
        }

        Ok(())
    }

    /// Sum of the weights that take part in a draw.
    pub fn total_active_weight(&self) -> f64 {
        self.prizes
            .iter()
            .filter(|p| p.is_drawable())
            .map(|p| p.weight)
            .sum()
    }

    /// Sum of all configured weights, as shown to administrators.
    pub fn weight_total(&self) -> f64 {
        self.prizes
            .iter()
            .filter(|p| p.weight.is_finite())
            .map(|p| p.weight)
            .sum()
    }

    /// Normalized probability of each drawable prize, in catalog order.
    pub fn odds(&self) -> Vec<(&PrizeDefinition, f64)> {
        let total = self.total_active_weight();
        if total <= 0.0 {
            return Vec::new();
        }

        self.prizes
            .iter()
            .filter(|p| p.is_drawable())
            .map(|p| (p, p.weight / total))
            .collect()
    }

    /// Average payout of one card, in currency units.
    pub fn expected_payout(&self) -> f64 {
        self.odds()
            .into_iter()
            .map(|(p, probability)| probability * p.value.to_cents() as f64 / 100.0)
            .sum()
    }

    pub fn set_weight(&mut self, prize_id: &str, weight: f64) -> Result<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(GameError::invalid_catalog(format!(
                "weight for prize '{}' must be a non-negative number, got {}",
                prize_id, weight
            )));
        }

        let prize = self.get_mut(prize_id)?;
        prize.weight = weight;
        tracing::info!("Prize '{}' weight set to {}", prize_id, weight);

        self.check_weight_total();
        Ok(())
    }

    pub fn set_active(&mut self, prize_id: &str, active: bool) -> Result<()> {
        let prize = self.get_mut(prize_id)?;
        prize.active = active;
        tracing::info!(
            "Prize '{}' {}",
            prize_id,
            if active { "activated" } else { "deactivated" }
        );
        Ok(())
    }

    /// Flip a prize's active flag, returning the new value.
    pub fn toggle_active(&mut self, prize_id: &str) -> Result<bool> {
        let active = !self
            .get(prize_id)
            .ok_or_else(|| GameError::PrizeNotFound(prize_id.to_string()))?
            .active;
        self.set_active(prize_id, active)?;
        Ok(active)
    }

    fn get_mut(&mut self, prize_id: &str) -> Result<&mut PrizeDefinition> {
        self.prizes
            .iter_mut()
            .find(|p| p.id == prize_id)
            .ok_or_else(|| GameError::PrizeNotFound(prize_id.to_string()))
    }

    fn check_weight_total(&self) {
        let total = self.weight_total();
        if (total - EXPECTED_WEIGHT_TOTAL).abs() > WEIGHT_TOTAL_TOLERANCE {
            tracing::warn!(
                "Prize weights sum to {}, expected about {}; odds are normalized anyway",
                total,
                EXPECTED_WEIGHT_TOTAL
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raspawin_core::Money;

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = PrizeCatalog::default();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.len(), 7);
        assert_eq!(catalog.total_active_weight(), 100.0);

        let odds = catalog.odds();
        assert_eq!(odds[0].0.name, "Jackpot!");
        assert!((odds[0].1 - 0.01).abs() < 1e-12);
        assert!((odds[6].1 - 0.47).abs() < 1e-12);
    }

    #[test]
    fn test_no_active_positive_weight_is_rejected() {
        let mut catalog = PrizeCatalog::new(vec![
            PrizeDefinition::new("a", "A", Money::from_units(10), 0.0),
            PrizeDefinition::new("b", "B", Money::ZERO, 3.0),
        ]);
        catalog.set_active("b", false).unwrap();

        assert!(matches!(
            catalog.validate(),
            Err(GameError::InvalidCatalog(_))
        ));
        assert!(catalog.odds().is_empty());

        assert!(matches!(
            PrizeCatalog::new(Vec::new()).validate(),
            Err(GameError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn test_negative_weight_is_rejected() {
        let catalog = PrizeCatalog::new(vec![
            PrizeDefinition::new("a", "A", Money::from_units(10), -1.0),
            PrizeDefinition::new("b", "B", Money::ZERO, 3.0),
        ]);
        assert!(catalog.validate().is_err());

        let mut catalog = PrizeCatalog::default();
        assert!(catalog.set_weight("1", -0.5).is_err());
        assert!(catalog.set_weight("1", f64::NAN).is_err());
        assert_eq!(catalog.get("1").unwrap().weight, 1.0);
    }

    #[test]
    fn test_overflowing_weight_total_is_rejected() {
        let catalog = PrizeCatalog::new(vec![
            PrizeDefinition::new("a", "A", Money::from_units(10), 1e308),
            PrizeDefinition::new("b", "B", Money::ZERO, 1e308),
        ]);
        assert!(catalog.total_active_weight().is_infinite());
        assert!(matches!(
            catalog.validate(),
            Err(GameError::InvalidCatalog(_))
        ));

        let mut source = crate::SequenceSource::new([0.0]);
        assert!(crate::resolve(&catalog, &mut source).is_err());

        let mut catalog = PrizeCatalog::default();
        catalog.set_weight("1", 1e300).unwrap();
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_weights_need_not_sum_to_100() {
        let mut catalog = PrizeCatalog::default();
        catalog.set_weight("7", 10.0).unwrap();
        catalog.set_weight("1", 50.0).unwrap();

        assert!(catalog.validate().is_ok());
        let total: f64 = catalog.odds().iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_toggle_and_unknown_prize() {
        let mut catalog = PrizeCatalog::default();
        assert!(!catalog.toggle_active("3").unwrap());
        assert!(!catalog.get("3").unwrap().active);
        assert!(catalog.toggle_active("3").unwrap());

        assert!(matches!(
            catalog.set_weight("99", 1.0),
            Err(GameError::PrizeNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_tenant_catalog_roundtrip() {
        let store = raspawin_core::MemoryStore::new();
        assert_eq!(
            PrizeCatalog::load_for_tenant(&store, "client-1").await,
            PrizeCatalog::default()
        );

        let mut catalog = PrizeCatalog::default();
        catalog.set_weight("1", 30.0).unwrap();
        catalog.set_active("7", false).unwrap();
        catalog.save_for_tenant(&store, "client-1").await.unwrap();

        let loaded = PrizeCatalog::load_for_tenant(&store, "client-1").await;
        assert_eq!(loaded, catalog);
        assert_eq!(
            PrizeCatalog::load_for_tenant(&store, "client-2").await,
            PrizeCatalog::default()
        );
    }

    #[test]
    fn test_expected_payout() {
        let catalog = PrizeCatalog::new(vec![
            PrizeDefinition::new("win", "Win", Money::from_units(10), 1.0),
            PrizeDefinition::new("lose", "Lose", Money::ZERO, 3.0),
        ]);
        assert!((catalog.expected_payout() - 2.5).abs() < 1e-9);
    }
}
