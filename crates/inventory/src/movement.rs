//! Stock movement ledger entries.
//!
//! Movements are append-only. Constructors enforce the count invariants so a
//! stored movement always satisfies `new_count = previous_count + quantity_delta`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use npi_core::{DomainError, DomainResult, ItemId, MovementId, UserId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    Initial,
    Restock,
    Adjustment,
    Production,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Initial => "initial",
            MovementType::Restock => "restock",
            MovementType::Adjustment => "adjustment",
            MovementType::Production => "production",
        }
    }
}

impl core::str::FromStr for MovementType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initial" => Ok(MovementType::Initial),
            "restock" => Ok(MovementType::Restock),
            "adjustment" => Ok(MovementType::Adjustment),
            "production" => Ok(MovementType::Production),
            other => Err(DomainError::unknown("movement type", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub item_id: ItemId,
    pub previous_count: f64,
    pub new_count: f64,
    pub quantity_delta: f64,
    pub movement_type: MovementType,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
}

impl StockMovement {
    /// Opening balance for a freshly created item (`0 -> count`).
    pub fn initial(
        item_id: ItemId,
        count: f64,
        notes: Option<String>,
        actor: Option<UserId>,
        at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if !count.is_finite() || count <= 0.0 {
            return Err(DomainError::NotPositive("count"));
        }
        Ok(Self::build(item_id, 0.0, count, count, MovementType::Initial, notes, actor, at))
    }

    pub fn restock(
        item_id: ItemId,
        previous_count: f64,
        quantity: f64,
        notes: Option<String>,
        actor: Option<UserId>,
        at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(DomainError::NotPositive("quantity"));
        }
        let new_count = previous_count + quantity;
        Ok(Self::build(
            item_id,
            previous_count,
            new_count,
            quantity,
            MovementType::Restock,
            notes,
            actor,
            at,
        ))
    }

    /// Recount: `new_count` is authoritative, the delta is derived from it.
    pub fn adjustment(
        item_id: ItemId,
        previous_count: f64,
        new_count: f64,
        notes: Option<String>,
        actor: Option<UserId>,
        at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if !new_count.is_finite() || new_count < 0.0 {
            return Err(DomainError::Negative("new_count"));
        }
        Ok(Self::build(
            item_id,
            previous_count,
            new_count,
            new_count - previous_count,
            MovementType::Adjustment,
            notes,
            actor,
            at,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        item_id: ItemId,
        previous_count: f64,
        new_count: f64,
        quantity_delta: f64,
        movement_type: MovementType,
        notes: Option<String>,
        created_by: Option<UserId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MovementId::new(),
            item_id,
            previous_count,
            new_count,
            quantity_delta,
            movement_type,
            notes,
            created_at,
            created_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restock_adds_quantity() {
        let m = StockMovement::restock(ItemId::new(), 4.0, 6.0, None, None, Utc::now()).unwrap();
        assert_eq!(m.new_count, 10.0);
        assert_eq!(m.quantity_delta, 6.0);
        assert_eq!(m.movement_type, MovementType::Restock);
    }

    #[test]
    fn adjustment_derives_delta_from_new_count() {
        let m = StockMovement::adjustment(ItemId::new(), 10.0, 7.5, None, None, Utc::now()).unwrap();
        assert_eq!(m.quantity_delta, -2.5);
        assert_eq!(m.previous_count + m.quantity_delta, m.new_count);
    }

    #[test]
    fn initial_starts_from_zero() {
        let m = StockMovement::initial(ItemId::new(), 3.0, None, None, Utc::now()).unwrap();
        assert_eq!((m.previous_count, m.new_count, m.quantity_delta), (0.0, 3.0, 3.0));
        assert!(StockMovement::initial(ItemId::new(), 0.0, None, None, Utc::now()).is_err());
    }

    #[test]
    fn invalid_quantities_are_rejected() {
        let id = ItemId::new();
        assert!(StockMovement::restock(id, 1.0, 0.0, None, None, Utc::now()).is_err());
        assert!(StockMovement::adjustment(id, 1.0, -1.0, None, None, Utc::now()).is_err());
    }

    #[test]
    fn movement_type_round_trips_as_text() {
        for t in [
            MovementType::Initial,
            MovementType::Restock,
            MovementType::Adjustment,
            MovementType::Production,
        ] {
            assert_eq!(t.as_str().parse::<MovementType>().unwrap(), t);
        }
    }
}
