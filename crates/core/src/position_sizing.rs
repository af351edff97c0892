use anyhow::Result;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Calculate a whole-share position size from available cash
///
/// # Arguments
/// * `cash` - Cash currently available in the account
/// * `cash_at_risk` - Fraction of cash committed to one position (0.0-1.0]
/// * `last_price` - Last traded price for the symbol
///
/// # Returns
/// Share count, rounded down so that `quantity * last_price <= cash_at_risk * cash`
///
/// # Errors
/// Returns error if parameters are invalid
pub fn calculate_position_size(
    cash: Decimal,
    cash_at_risk: Decimal,
    last_price: Decimal,
) -> Result<u64> {
    if last_price <= Decimal::ZERO {
        anyhow::bail!("Last price must be positive, got {last_price}");
    }

    if cash_at_risk <= Decimal::ZERO || cash_at_risk > Decimal::ONE {
        anyhow::bail!("Cash at risk must be in (0, 1], got {cash_at_risk}");
    }

    if cash <= Decimal::ZERO {
        return Ok(0);
    }

    let budget = cash * cash_at_risk;
    let quantity = (budget / last_price).floor();

    quantity
        .to_u64()
        .ok_or_else(|| anyhow::anyhow!("Position size {quantity} does not fit a share count"))
}

/// Notional committed by a position of `quantity` shares at `price`.
#[must_use]
pub fn position_notional(quantity: u64, price: Decimal) -> Decimal {
    Decimal::from(quantity) * price
}
