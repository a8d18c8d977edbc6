use crate::error::AppError;
use std::cell::Cell;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

/// Source of the current instant, already shifted into the offset that
/// defines calendar days.
pub trait Clock {
    fn now(&self) -> OffsetDateTime;

    fn offset(&self) -> UtcOffset {
        self.now().offset()
    }

    fn today(&self) -> Date {
        self.now().date()
    }

    fn unix_millis(&self) -> i64 {
        (self.now().unix_timestamp_nanos() / 1_000_000) as i64
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(local_offset())
    }
}

/// Clock pinned to a settable instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<OffsetDateTime>,
}

impl FixedClock {
    pub fn new(now: OffsetDateTime) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn advance(&self, by: time::Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> OffsetDateTime {
        (**self).now()
    }
}

pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

pub fn format_timestamp(at: OffsetDateTime) -> Result<String, AppError> {
    at.format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

/// Calendar day of an RFC 3339 timestamp, seen from `offset`.
pub fn calendar_day(timestamp: &str, offset: UtcOffset) -> Result<Date, AppError> {
    let parsed = OffsetDateTime::parse(timestamp.trim(), &Rfc3339)
        .map_err(|_| AppError::invalid_data("timestamp must be RFC3339"))?;
    Ok(parsed.to_offset(offset).date())
}

pub fn format_day(day: Date) -> Result<String, AppError> {
    day.format(format_description!("[year]-[month]-[day]"))
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

pub fn parse_day(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::invalid_data("day must be YYYY-MM-DD"))
}
