use time::{Duration, OffsetDateTime, Time, UtcOffset};

use crate::error::AppError;

/// Current instant viewed at the caller's UTC offset.
pub fn now_at_offset(offset_minutes: i32) -> Result<OffsetDateTime, AppError> {
    let offset = offset_minutes
        .checked_mul(60)
        .and_then(|secs| UtcOffset::from_whole_seconds(secs).ok())
        .ok_or_else(|| AppError::InvalidInput("Invalid tz_offset_minutes".into()))?;
    Ok(OffsetDateTime::now_utc().to_offset(offset))
}

/// Local midnight of `now`'s day, same offset.
pub fn start_of_day(now: OffsetDateTime) -> OffsetDateTime {
    now.replace_time(Time::MIDNIGHT)
}

/// Local midnight of the most recent Sunday.
pub fn start_of_week(now: OffsetDateTime) -> OffsetDateTime {
    let back = now.weekday().number_days_from_sunday() as i64;
    start_of_day(now) - Duration::days(back)
}
