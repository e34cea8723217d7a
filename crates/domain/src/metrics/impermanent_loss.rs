use crate::error::{PoolError, Result};
use crate::math::concentrated_liquidity::get_amounts_for_liquidity;

fn check_price(price: f64) -> Result<f64> {
    if !price.is_finite() || price <= 0.0 {
        return Err(PoolError::InvalidPrice(price));
    }
    Ok(price)
}

/// Calculates Impermanent Loss for a constant product pool.
/// formula: 2 * sqrt(price_ratio) / (1 + price_ratio) - 1
///
/// # Arguments
///
/// * `entry_price` - The price at which the position was opened (token1/token0)
/// * `current_price` - The current price (token1/token0)
///
/// # Returns
///
/// * `f64` - The impermanent loss as a negative fraction (e.g., -0.05 for 5% loss)
pub fn calculate_il_constant_product(entry_price: f64, current_price: f64) -> Result<f64> {
    let price_ratio = check_price(current_price)? / check_price(entry_price)?;
    Ok(2.0 * price_ratio.sqrt() / (1.0 + price_ratio) - 1.0)
}

/// Calculates Impermanent Loss for a concentrated liquidity position.
/// This compares the value of the LP position at current_price vs holding the
/// assets it held at entry_price. The result does not depend on liquidity.
pub fn calculate_il_concentrated(
    entry_price: f64,
    current_price: f64,
    price_lower: f64,
    price_upper: f64,
) -> Result<f64> {
    let entry = check_price(entry_price)?;
    let current = check_price(current_price)?;
    let lower = check_price(price_lower)?;
    let upper = check_price(price_upper)?;
    if lower >= upper {
        return Err(PoolError::InvalidRange {
            min_price: lower,
            max_price: upper,
        });
    }

    let (sqrt_lower, sqrt_upper) = (lower.sqrt(), upper.sqrt());
    let (x0, y0) = get_amounts_for_liquidity(1.0, entry.sqrt(), sqrt_lower, sqrt_upper);
    let (x1, y1) = get_amounts_for_liquidity(1.0, current.sqrt(), sqrt_lower, sqrt_upper);

    // Value Held: The initial bundle (x0, y0) valued at current_price
    let value_held = x0 * current + y0;
    // Value LP: The current bundle (x1, y1) valued at current_price
    let value_lp = x1 * current + y1;

    if value_held == 0.0 {
        return Ok(0.0);
    }
    Ok((value_lp - value_held) / value_held)
}
