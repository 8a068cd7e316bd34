use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::error::ApiError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LeaveType {
    Annual,
    Sick,
    Casual,
    Unpaid,
}

/// Leave-request lifecycle. Pending is the only non-terminal state for the
/// cancellation path; reviewer status updates are deliberately not gated on
/// the current state (see DESIGN.md).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    /// Approved, Rejected and Cancelled are all terminal for the
    /// cancellation path.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }

    pub fn is_cancellable(&self) -> bool {
        !self.is_terminal()
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 123)]
    pub user_id: Option<u64>,
    #[schema(example = "Maya Rahman")]
    pub applicant_name: String,
    #[schema(example = "sick", value_type = String)]
    pub leave_type: String,
    #[schema(example = "2026-01-10", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-12", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    #[schema(example = 3)]
    pub days: i64,
    pub reason: String,
    pub contact: Option<String>,
    pub handover: Option<String>,
    #[schema(example = "pending", value_type = String)]
    pub status: String,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<NaiveDateTime>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub updated_at: Option<NaiveDateTime>,
}

/// Day-count resolution: an explicit positive count wins, an explicit
/// non-positive count is rejected outright, and otherwise the span is derived
/// inclusively of both endpoints.
pub fn resolve_days(
    start_date: NaiveDate,
    end_date: NaiveDate,
    explicit: Option<i64>,
) -> Result<i64, ApiError> {
    if end_date < start_date {
        return Err(ApiError::validation("end_date cannot precede start_date"));
    }

    match explicit {
        Some(days) if days <= 0 => Err(ApiError::validation("days must be a positive number")),
        Some(days) => Ok(days),
        None => Ok((end_date - start_date).num_days() + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn span_is_inclusive_of_both_endpoints() {
        assert_eq!(resolve_days(day(10), day(12), None).unwrap(), 3);
        assert_eq!(resolve_days(day(10), day(10), None).unwrap(), 1);
    }

    #[test]
    fn end_before_start_is_rejected() {
        assert!(matches!(
            resolve_days(day(12), day(10), None),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn explicit_positive_count_wins_over_derivation() {
        assert_eq!(resolve_days(day(10), day(12), Some(2)).unwrap(), 2);
    }

    #[test]
    fn explicit_non_positive_count_is_rejected() {
        for bad in [0, -1] {
            assert!(matches!(
                resolve_days(day(10), day(12), Some(bad)),
                Err(ApiError::Validation(_))
            ));
        }
    }

    #[test]
    fn status_parses_only_the_enumerated_set() {
        assert_eq!("approved".parse::<LeaveStatus>(), Ok(LeaveStatus::Approved));
        assert_eq!("Cancelled".parse::<LeaveStatus>(), Ok(LeaveStatus::Cancelled));
        assert!("Bogus".parse::<LeaveStatus>().is_err());
        assert!("".parse::<LeaveStatus>().is_err());
    }

    #[test]
    fn only_pending_is_cancellable() {
        assert!(LeaveStatus::Pending.is_cancellable());
        for terminal in [
            LeaveStatus::Approved,
            LeaveStatus::Rejected,
            LeaveStatus::Cancelled,
        ] {
            assert!(!terminal.is_cancellable());
            assert!(terminal.is_terminal());
        }
    }

    #[test]
    fn status_round_trips_lowercase_on_the_wire() {
        assert_eq!(LeaveStatus::Pending.to_string(), "pending");
        assert_eq!(LeaveType::Sick.to_string(), "sick");
    }
}
