use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul};

/// Fee amounts in both pool tokens: `x` (token0) and `y` (token1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeVector {
    pub x: f64,
    pub y: f64,
}

impl FeeVector {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Total in token1 units at `price`.
    pub fn value_at(&self, price: f64) -> f64 {
        self.x * price + self.y
    }
}

impl Add for FeeVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for FeeVector {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Mul<f64> for FeeVector {
    type Output = Self;

    fn mul(self, share: f64) -> Self {
        Self::new(self.x * share, self.y * share)
    }
}
