//! Player vitality

/// Current and maximum health
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    current: f64,
    max: f64,
}

impl Health {
    /// Start at full health
    pub fn new(max: f64) -> Self {
        Self { current: max, max }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Raise the cap and heal by the same amount
    pub fn add_max(&mut self, amount: f64) {
        self.max += amount;
        self.current = (self.current + amount).min(self.max);
    }

    pub fn damage(&mut self, amount: f64) {
        self.current = (self.current - amount).max(0.0);
    }

    pub fn heal(&mut self, amount: f64) {
        self.current = (self.current + amount).min(self.max);
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }
}
