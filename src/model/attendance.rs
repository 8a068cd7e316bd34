use chrono::{NaiveDate, NaiveDateTime};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One row per (person, date). The unique key on (user_id, date) is what
/// serializes concurrent check-in attempts.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attendance {
    pub id: u64,
    pub user_id: Option<u64>,
    pub display_name: String,
    pub date: NaiveDate,
    pub check_in: Option<NaiveDateTime>,
    pub check_out: Option<NaiveDateTime>,
}

/// check-out happened before check-in; a data fault, never clamped to zero.
#[derive(Debug, Display, PartialEq, Eq)]
#[display(fmt = "check-out timestamp precedes check-in")]
pub struct NegativeSpan;

/// Whole-second breakdown of the span between check-in and check-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct WorkDuration {
    #[schema(example = 8)]
    pub hours: i64,
    #[schema(example = 45)]
    pub minutes: i64,
    #[schema(example = 30)]
    pub seconds: i64,
    #[schema(example = 31530)]
    pub total_seconds: i64,
    #[schema(example = "8h 45m 30s")]
    pub formatted: String,
}

impl WorkDuration {
    pub fn between(
        check_in: NaiveDateTime,
        check_out: NaiveDateTime,
    ) -> Result<Self, NegativeSpan> {
        let elapsed = (check_out - check_in).num_seconds();
        if elapsed < 0 {
            return Err(NegativeSpan);
        }

        let hours = elapsed / 3600;
        let minutes = (elapsed % 3600) / 60;
        let seconds = elapsed % 60;

        Ok(WorkDuration {
            hours,
            minutes,
            seconds,
            total_seconds: elapsed,
            formatted: format!("{hours}h {minutes}m {seconds}s"),
        })
    }

    /// Annotation for record listings: absent while the pair is incomplete.
    /// A negative span in stored data is logged and rendered as absent so one
    /// corrupt row cannot fail a whole page.
    pub fn annotate(
        check_in: Option<NaiveDateTime>,
        check_out: Option<NaiveDateTime>,
    ) -> Option<Self> {
        match (check_in, check_out) {
            (Some(start), Some(end)) => match Self::between(start, end) {
                Ok(duration) => Some(duration),
                Err(e) => {
                    tracing::warn!(check_in = %start, check_out = %end, "{e}");
                    None
                }
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn full_working_day_breakdown() {
        let d = WorkDuration::between(at(9, 0, 0), at(17, 45, 30)).unwrap();
        assert_eq!(d.hours, 8);
        assert_eq!(d.minutes, 45);
        assert_eq!(d.seconds, 30);
        assert_eq!(d.total_seconds, 31530);
        assert_eq!(d.formatted, "8h 45m 30s");
    }

    #[test]
    fn decomposition_identity_holds() {
        for &(h, m, s) in &[(0u32, 0u32, 0u32), (0, 0, 59), (1, 59, 59), (12, 30, 15)] {
            let d = WorkDuration::between(at(0, 0, 0), at(h, m, s)).unwrap();
            assert_eq!(d.hours * 3600 + d.minutes * 60 + d.seconds, d.total_seconds);
        }
    }

    #[test]
    fn instant_checkout_is_zero_not_absent() {
        let d = WorkDuration::between(at(9, 0, 0), at(9, 0, 0)).unwrap();
        assert_eq!(d.total_seconds, 0);
        assert_eq!(d.formatted, "0h 0m 0s");
    }

    #[test]
    fn negative_span_is_a_fault() {
        assert_eq!(
            WorkDuration::between(at(17, 0, 0), at(9, 0, 0)),
            Err(NegativeSpan)
        );
    }

    #[test]
    fn annotation_is_absent_until_both_timestamps_exist() {
        assert_eq!(WorkDuration::annotate(Some(at(9, 0, 0)), None), None);
        assert_eq!(WorkDuration::annotate(None, None), None);
        assert!(WorkDuration::annotate(Some(at(9, 0, 0)), Some(at(10, 0, 0))).is_some());
    }
}
