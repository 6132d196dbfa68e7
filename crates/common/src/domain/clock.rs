use chrono::{DateTime, Utc};

/// Source of "now" for components whose behavior depends on wall-clock time
/// (certificate expiry, ingestion stamps). Injected rather than read from
/// ambient state so expiry is testable.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
