use time::OffsetDateTime;

/// Current wall-clock time in UTC, truncated to whole microseconds.
///
/// Microseconds are the finest resolution PostgreSQL `TIMESTAMPTZ` keeps, so
/// a stamp reads back identical from every backend.
pub fn now_utc() -> OffsetDateTime {
    truncate_to_micros(OffsetDateTime::now_utc())
}

fn truncate_to_micros(at: OffsetDateTime) -> OffsetDateTime {
    at.replace_nanosecond(at.nanosecond() / 1_000 * 1_000)
        .unwrap_or(at)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamps_have_no_sub_microsecond_part() {
        assert_eq!(now_utc().nanosecond() % 1_000, 0);
    }

    #[test]
    fn truncation_drops_only_nanoseconds() {
        let at = time::macros::datetime!(2024-03-01 12:00:00.123456789 UTC);
        assert_eq!(
            truncate_to_micros(at),
            time::macros::datetime!(2024-03-01 12:00:00.123456 UTC)
        );
    }
}
