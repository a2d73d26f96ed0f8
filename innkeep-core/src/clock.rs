use chrono::{DateTime, NaiveDate, Utc};

/// Source of "now" for date checks such as same-day check-in.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar day the front desk is operating on (UTC).
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Frozen clock for tests.
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }

    /// Noon UTC on the given day.
    pub fn on(day: NaiveDate) -> Self {
        let time = day
            .and_hms_opt(12, 0, 0)
            .map(|naive| naive.and_utc())
            .unwrap_or_else(Utc::now);
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}
