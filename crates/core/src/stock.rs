//! Inventory movements.
//!
//! Sales take stock out, purchases put it back in. Stock on hand never
//! goes negative.

use hisaab_shared::AppError;
use hisaab_shared::types::ItemId;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::billing::TransactionType;

/// Errors raised by stock movements.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StockError {
    /// Not enough stock on hand.
    #[error("Insufficient stock for item {item_id}: available {available}, requested {requested}")]
    InsufficientStock {
        /// Item being moved.
        item_id: ItemId,
        /// Quantity on hand.
        available: Decimal,
        /// Quantity asked for.
        requested: Decimal,
    },
}

impl From<StockError> for AppError {
    fn from(err: StockError) -> Self {
        Self::ConstraintViolation(err.to_string())
    }
}

/// Which way stock moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDirection {
    /// Stock received.
    In,
    /// Stock issued.
    Out,
}

impl StockDirection {
    /// The movement that undoes this one.
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Self::In => Self::Out,
            Self::Out => Self::In,
        }
    }
}

impl From<TransactionType> for StockDirection {
    fn from(kind: TransactionType) -> Self {
        match kind {
            TransactionType::Sale => Self::Out,
            TransactionType::Purchase => Self::In,
        }
    }
}

/// Returns the stock on hand after moving `quantity` of `item_id`.
///
/// # Errors
///
/// Returns `StockError::InsufficientStock` when issuing more than is on hand.
pub fn apply_movement(
    item_id: ItemId,
    on_hand: Decimal,
    direction: StockDirection,
    quantity: Decimal,
) -> Result<Decimal, StockError> {
    match direction {
        StockDirection::In => Ok(on_hand + quantity),
        StockDirection::Out if quantity > on_hand => Err(StockError::InsufficientStock {
            item_id,
            available: on_hand,
            requested: quantity,
        }),
        StockDirection::Out => Ok(on_hand - quantity),
    }
}

/// Returns true when stock has fallen to the reorder level.
#[must_use]
pub fn is_low_stock(on_hand: Decimal, min_stock_level: Decimal) -> bool {
    on_hand <= min_stock_level
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sale_decrements() {
        let dir = StockDirection::from(TransactionType::Sale);
        assert_eq!(
            apply_movement(ItemId::new(), dec!(10), dir, dec!(4)),
            Ok(dec!(6))
        );
        assert_eq!(
            apply_movement(ItemId::new(), dec!(10), dir, dec!(10)),
            Ok(dec!(0))
        );
    }

    #[test]
    fn test_purchase_increments() {
        let dir = StockDirection::from(TransactionType::Purchase);
        assert_eq!(
            apply_movement(ItemId::new(), dec!(1.5), dir, dec!(2.25)),
            Ok(dec!(3.75))
        );
    }

    #[test]
    fn test_oversell_rejected() {
        let item = ItemId::new();
        let err = apply_movement(item, dec!(3), StockDirection::Out, dec!(3.001)).unwrap_err();
        assert_eq!(
            err,
            StockError::InsufficientStock {
                item_id: item,
                available: dec!(3),
                requested: dec!(3.001),
            }
        );
        assert_eq!(AppError::from(err).status_code(), 409);
    }

    #[test]
    fn test_reversal() {
        let sale = StockDirection::from(TransactionType::Sale);
        let after_sale = apply_movement(ItemId::new(), dec!(10), sale, dec!(4)).unwrap();
        let restored = apply_movement(ItemId::new(), after_sale, sale.reversed(), dec!(4)).unwrap();
        assert_eq!(restored, dec!(10));
    }

    #[test]
    fn test_low_stock_is_inclusive() {
        assert!(is_low_stock(dec!(5), dec!(5)));
        assert!(is_low_stock(dec!(0), dec!(0)));
        assert!(!is_low_stock(dec!(5.001), dec!(5)));
    }
}
