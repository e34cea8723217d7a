//! Constant-liquidity curve identities in sqrt-price space.

/// Orders two sqrt prices as `(lower, upper)`.
fn ordered(sqrt_price_a: f64, sqrt_price_b: f64) -> (f64, f64) {
    if sqrt_price_a < sqrt_price_b {
        (sqrt_price_a, sqrt_price_b)
    } else {
        (sqrt_price_b, sqrt_price_a)
    }
}

/// Calculates the amount of token0 (x) moved between two sqrt prices.
/// delta_x = L * (1/sqrt(P_a) - 1/sqrt(P_b))
/// where P_a < P_b
pub fn get_amount0_delta(liquidity: f64, sqrt_price_a: f64, sqrt_price_b: f64) -> f64 {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    debug_assert!(lower > 0.0, "sqrt price must be positive");

    // delta_x = L * ( (upper - lower) / (lower * upper) )
    liquidity * (upper - lower) / (lower * upper)
}

/// Calculates the amount of token1 (y) moved between two sqrt prices.
/// delta_y = L * (sqrt(P_b) - sqrt(P_a))
/// where P_a < P_b
pub fn get_amount1_delta(liquidity: f64, sqrt_price_a: f64, sqrt_price_b: f64) -> f64 {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    liquidity * (upper - lower)
}

/// Reserves `(x, y)` held by liquidity `L` over `[sqrt_lower, sqrt_upper]`
/// when the pool sits at `sqrt_price`.
///
/// Below the range the position is all x, above it all y, and inside it
/// holds x for `[P, upper]` and y for `[lower, P]`.
pub fn get_amounts_for_liquidity(
    liquidity: f64,
    sqrt_price: f64,
    sqrt_lower: f64,
    sqrt_upper: f64,
) -> (f64, f64) {
    if sqrt_price < sqrt_lower {
        (get_amount0_delta(liquidity, sqrt_lower, sqrt_upper), 0.0)
    } else if sqrt_price > sqrt_upper {
        (0.0, get_amount1_delta(liquidity, sqrt_lower, sqrt_upper))
    } else {
        (
            get_amount0_delta(liquidity, sqrt_price, sqrt_upper),
            get_amount1_delta(liquidity, sqrt_lower, sqrt_price),
        )
    }
}

/// Value in token1 units of one unit of liquidity over the range, at the
/// current price. Inside the range this is `2√P − P/√Pu − √Pl`.
pub fn value_per_liquidity(sqrt_price: f64, sqrt_lower: f64, sqrt_upper: f64) -> f64 {
    let (x, y) = get_amounts_for_liquidity(1.0, sqrt_price, sqrt_lower, sqrt_upper);
    x * sqrt_price * sqrt_price + y
}

/// Calculates liquidity for a given amount of token0 and price range
/// L = amount0 * (sqrt(P_a) * sqrt(P_b)) / (sqrt(P_b) - sqrt(P_a))
pub fn get_liquidity_for_amount0(amount0: f64, sqrt_price_a: f64, sqrt_price_b: f64) -> Option<f64> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    let den = upper - lower;
    if den <= 0.0 {
        return None;
    }
    Some(amount0 * lower * upper / den)
}

/// Calculates liquidity for a given amount of token1 and price range
/// L = amount1 / (sqrt(P_b) - sqrt(P_a))
pub fn get_liquidity_for_amount1(amount1: f64, sqrt_price_a: f64, sqrt_price_b: f64) -> Option<f64> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    let den = upper - lower;
    if den <= 0.0 {
        return None;
    }
    Some(amount1 / den)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_deltas() {
        // Example: Liquidity 1000
        // Price goes from 1 to 4 (sqrt: 1 to 2)
        // delta_y = 1000 * (2 - 1) = 1000
        // delta_x = 1000 * (1/1 - 1/2) = 1000 * 0.5 = 500
        let liquidity = 1000.0;

        assert_eq!(get_amount1_delta(liquidity, 1.0, 2.0), 1000.0);
        assert_eq!(get_amount0_delta(liquidity, 1.0, 2.0), 500.0);

        // Argument order does not matter.
        assert_eq!(get_amount0_delta(liquidity, 2.0, 1.0), 500.0);
    }

    #[test]
    fn test_get_liquidity() {
        // From previous test: if dx = 500, L should be 1000
        let l = get_liquidity_for_amount0(500.0, 1.0, 2.0).unwrap();
        assert!((l - 1000.0).abs() < 1e-9);

        // If dy = 1000, L should be 1000
        let l2 = get_liquidity_for_amount1(1000.0, 1.0, 2.0).unwrap();
        assert!((l2 - 1000.0).abs() < 1e-9);

        assert!(get_liquidity_for_amount1(1000.0, 2.0, 2.0).is_none());
    }

    #[test]
    fn test_amounts_three_branches() {
        // Range [1, 4], sqrt [1, 2]
        let (x, y) = get_amounts_for_liquidity(100.0, 0.5, 1.0, 2.0);
        assert!((x - 50.0).abs() < 1e-12);
        assert_eq!(y, 0.0);

        let (x, y) = get_amounts_for_liquidity(100.0, 3.0, 1.0, 2.0);
        assert_eq!(x, 0.0);
        assert!((y - 100.0).abs() < 1e-12);

        // sqrt price 1.5: x = 100 * (1/1.5 - 1/2), y = 100 * 0.5
        let (x, y) = get_amounts_for_liquidity(100.0, 1.5, 1.0, 2.0);
        assert!((x - 100.0 * (1.0 / 1.5 - 0.5)).abs() < 1e-12);
        assert!((y - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_value_per_liquidity_matches_closed_form() {
        let (s, sl, su) = (1.5_f64, 1.0_f64, 2.0_f64);
        let closed_form = 2.0 * s - s * s / su - sl;
        assert!((value_per_liquidity(s, sl, su) - closed_form).abs() < 1e-12);
    }
}
