use embassy_time::Duration;

/// Config for configurable action behavior
#[derive(Clone, Copy, Debug, Default)]
pub struct BehaviorConfig {
    pub tap_hold: TapHoldConfig,
}

/// Configurations for tap hold behavior
#[derive(Clone, Copy, Debug)]
pub struct TapHoldConfig {
    /// If the key is pressed longer than this, it is accepted as `hold`
    pub hold_timeout: Duration,
}

impl Default for TapHoldConfig {
    fn default() -> Self {
        Self {
            hold_timeout: Duration::from_millis(200),
        }
    }
}
