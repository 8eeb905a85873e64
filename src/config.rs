use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// How often the elapsed-time/average-speed bookkeeping runs.
    pub timer_tick: Duration,
    /// How often a location sample is requested while recording.
    pub sample_tick: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let timer_tick_ms = std::env::var("TIMER_TICK_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1_000);

        let sample_tick_ms = std::env::var("SAMPLE_TICK_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10_000);

        Self {
            timer_tick: Duration::from_millis(timer_tick_ms),
            sample_tick: Duration::from_millis(sample_tick_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer_tick: Duration::from_secs(1),
            sample_tick: Duration::from_secs(10),
        }
    }
}
