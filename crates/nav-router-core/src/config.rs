use std::time::Duration;

/// Tuning for a [`NavigationHandler`](crate::NavigationHandler).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavigationConfig {
    /// How long pop operations stay rejected after one succeeds.
    pub pop_cooldown: Duration,
}

impl NavigationConfig {
    pub const DEFAULT_POP_COOLDOWN: Duration = Duration::from_millis(500);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pop_cooldown(mut self, pop_cooldown: Duration) -> Self {
        self.pop_cooldown = pop_cooldown;
        self
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            pop_cooldown: Self::DEFAULT_POP_COOLDOWN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cooldown_is_half_a_second() {
        assert_eq!(NavigationConfig::default().pop_cooldown, Duration::from_millis(500));
    }

    #[test]
    fn cooldown_is_configurable() {
        let config = NavigationConfig::new().with_pop_cooldown(Duration::from_millis(120));
        assert_eq!(config.pop_cooldown.as_millis(), 120);
    }
}
