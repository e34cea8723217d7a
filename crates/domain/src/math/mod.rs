pub mod concentrated_liquidity;
pub mod price_tick;
