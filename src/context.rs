use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

/// Trait for providing the current time.
/// Decouples the series start from `Utc::now()` so runs can be reproduced.
pub trait TimeProvider: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Context holding the providers used by one invocation.
#[derive(Clone)]
pub struct FunctionContext {
    pub time: Arc<dyn TimeProvider>,
}

impl FunctionContext {
    pub fn new_system() -> Self {
        Self {
            time: Arc::new(SystemTimeProvider),
        }
    }

    pub fn new_simulated(start_time_ms: i64) -> Self {
        Self {
            time: Arc::new(SimulatedTimeProvider::new(start_time_ms)),
        }
    }

    /// Start of the generated day: now, truncated to whole seconds.
    pub fn series_start(&self) -> DateTime<Utc> {
        let now = self.time.now();
        Utc.timestamp_opt(now.timestamp(), 0).single().unwrap_or(now)
    }
}

// --- Live Implementation ---

pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// --- Simulated Implementation ---

/// Always reports the same instant.
pub struct SimulatedTimeProvider {
    instant: DateTime<Utc>,
}

impl SimulatedTimeProvider {
    pub fn new(time_ms: i64) -> Self {
        Self {
            instant: Utc
                .timestamp_millis_opt(time_ms)
                .single()
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        }
    }
}

impl TimeProvider for SimulatedTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}
