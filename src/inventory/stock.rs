//! Quantity rules for stock movements.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockError {
    NonPositiveQuantity,
    Insufficient { stock: i32, requested: i32 },
    Overflow { stock: i32, requested: i32 },
}

impl fmt::Display for StockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockError::NonPositiveQuantity => write!(f, "Quantity must be greater than 0"),
            StockError::Insufficient { stock, requested } => write!(
                f,
                "Insufficient stock. Current stock: {stock}, requested: {requested}"
            ),
            StockError::Overflow { stock, requested } => write!(
                f,
                "Quantity too large. Current stock: {stock}, requested: {requested}, maximum stock: {}",
                i32::MAX
            ),
        }
    }
}

pub fn validate_entry(quantity: i32) -> Result<(), StockError> {
    if quantity <= 0 {
        return Err(StockError::NonPositiveQuantity);
    }
    Ok(())
}

/// Returns the stock after adding `quantity`, if it fits.
pub fn validate_capacity(stock: i32, quantity: i32) -> Result<i32, StockError> {
    validate_entry(quantity)?;
    stock.checked_add(quantity).ok_or(StockError::Overflow {
        stock,
        requested: quantity,
    })
}

/// Accepts exactly `0 < quantity <= stock`.
pub fn validate_exit(stock: i32, quantity: i32) -> Result<(), StockError> {
    validate_entry(quantity)?;
    if quantity > stock {
        return Err(StockError::Insufficient {
            stock,
            requested: quantity,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_accepts_exactly_the_available_range() {
        for stock in 0..=20 {
            for qty in -5..=25 {
                let accepted = validate_exit(stock, qty).is_ok();
                assert_eq!(accepted, qty > 0 && qty <= stock, "stock={stock} qty={qty}");
            }
        }
    }

    #[test]
    fn exit_reports_which_rule_failed() {
        assert_eq!(validate_exit(10, 0), Err(StockError::NonPositiveQuantity));
        assert_eq!(validate_exit(10, -3), Err(StockError::NonPositiveQuantity));
        assert_eq!(
            validate_exit(10, 20),
            Err(StockError::Insufficient {
                stock: 10,
                requested: 20
            })
        );
    }

    #[test]
    fn insufficient_message_names_both_numbers() {
        let msg = validate_exit(10, 20).unwrap_err().to_string();
        assert!(msg.starts_with("Insufficient stock"));
        assert!(msg.contains("10") && msg.contains("20"));
    }

    #[test]
    fn entry_only_needs_a_positive_quantity() {
        assert!(validate_entry(1).is_ok());
        assert!(validate_entry(i32::MAX).is_ok());
        assert_eq!(validate_entry(0), Err(StockError::NonPositiveQuantity));
    }

    #[test]
    fn entry_past_the_integer_range_is_an_overflow() {
        assert_eq!(validate_capacity(10, 5), Ok(15));
        assert_eq!(validate_capacity(0, i32::MAX), Ok(i32::MAX));
        assert_eq!(
            validate_capacity(10, i32::MAX),
            Err(StockError::Overflow {
                stock: 10,
                requested: i32::MAX
            })
        );
        assert_eq!(validate_capacity(10, 0), Err(StockError::NonPositiveQuantity));

        let msg = validate_capacity(1, i32::MAX).unwrap_err().to_string();
        assert!(msg.starts_with("Quantity too large"));
    }
}
