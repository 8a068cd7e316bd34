use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::attendance::{Attendance, WorkDuration};
use crate::utils::pagination::PageMeta;
use actix_web::{HttpResponse, web};
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

/// Window used when no date filter is supplied.
const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Deserialize, ToSchema)]
pub struct CheckIn {
    /// Opaque proof-of-presence payload (e.g. a base64 photo). Required.
    #[schema(example = "data:image/jpeg;base64,/9j...")]
    pub proof: String,
    /// Optional display-name override recorded on the day's row.
    pub display_name: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CheckOut {
    #[schema(example = "data:image/jpeg;base64,/9j...")]
    pub proof: String,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceEntry {
    pub id: u64,
    pub display_name: String,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_in: Option<NaiveDateTime>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_out: Option<NaiveDateTime>,
    /// Absent until both timestamps exist.
    pub duration: Option<WorkDuration>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceEntry>,
    pub meta: PageMeta,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    #[schema(example = "2026-01-01", value_type = Option<String>, format = "date")]
    /// Single-date filter; defaults to the trailing 30 days.
    pub date: Option<NaiveDate>,
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 10)]
    pub per_page: Option<u64>,
    #[schema(example = 123)]
    /// Staff only: fetch another person's records.
    pub user_id: Option<u64>,
}

fn require_proof(proof: &str) -> Result<&str, ApiError> {
    let trimmed = proof.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Proof payload must not be empty"));
    }
    Ok(trimmed)
}

fn internal(e: sqlx::Error, context: &'static str) -> ApiError {
    tracing::error!(error = %e, "{context}");
    ApiError::Internal
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    request_body = CheckIn,
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully",
            "check_in": "2026-01-01T09:00:00"
        })),
        (status = 400, description = "Empty proof payload"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CheckIn>,
) -> Result<HttpResponse, ApiError> {
    let proof = require_proof(&payload.proof)?;
    let actor = auth.actor(payload.display_name.as_deref());

    let now = Utc::now().naive_utc();
    let today = now.date();

    let insert = sqlx::query(
        r#"
        INSERT INTO attendance (user_id, display_name, date, check_in, check_in_proof)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(actor.user_id)
    .bind(&actor.display_name)
    .bind(today)
    .bind(now)
    .bind(proof)
    .execute(pool.get_ref())
    .await;

    match insert {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Checked in successfully",
            "check_in": now
        }))),

        Err(e) => {
            // Unique (user_id, date) key: a duplicate means the day's row
            // already exists, possibly created by a concurrent request.
            let duplicate = matches!(
                &e,
                sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23000")
            );

            if !duplicate {
                tracing::error!(error = %e, user_id = auth.user_id, "Check-in failed");
                return Err(ApiError::Internal);
            }

            // Repair a half-written row whose check-in never landed;
            // otherwise this is a second check-in.
            let repaired = sqlx::query(
                r#"
                UPDATE attendance
                SET check_in = ?, check_in_proof = ?
                WHERE user_id = ? AND date = ? AND check_in IS NULL
                "#,
            )
            .bind(now)
            .bind(proof)
            .bind(actor.user_id)
            .bind(today)
            .execute(pool.get_ref())
            .await
            .map_err(|e| internal(e, "Check-in repair failed"))?;

            if repaired.rows_affected() == 0 {
                return Err(ApiError::conflict("Already checked in today"));
            }

            Ok(HttpResponse::Ok().json(json!({
                "message": "Checked in successfully",
                "check_in": now
            })))
        }
    }
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-out",
    request_body = CheckOut,
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully",
            "check_out": "2026-01-01T17:45:30",
            "duration": {
                "hours": 8, "minutes": 45, "seconds": 30,
                "total_seconds": 31530, "formatted": "8h 45m 30s"
            }
        })),
        (status = 400, description = "Empty proof payload"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No check-in found for today", body = Object, example = json!({
            "message": "No check-in found for today"
        })),
        (status = 409, description = "Already checked out today", body = Object, example = json!({
            "message": "Already checked out today"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CheckOut>,
) -> Result<HttpResponse, ApiError> {
    let proof = require_proof(&payload.proof)?;

    let now = Utc::now().naive_utc();
    let today = now.date();

    let updated = sqlx::query(
        r#"
        UPDATE attendance
        SET check_out = ?, check_out_proof = ?
        WHERE user_id = ?
        AND date = ?
        AND check_in IS NOT NULL
        AND check_out IS NULL
        "#,
    )
    .bind(now)
    .bind(proof)
    .bind(auth.user_id)
    .bind(today)
    .execute(pool.get_ref())
    .await
    .map_err(|e| internal(e, "Check-out failed"))?;

    if updated.rows_affected() == 0 {
        // Nothing to close out, or already closed.
        let row = sqlx::query_as::<_, (Option<NaiveDateTime>, Option<NaiveDateTime>)>(
            "SELECT check_in, check_out FROM attendance WHERE user_id = ? AND date = ?",
        )
        .bind(auth.user_id)
        .bind(today)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| internal(e, "Check-out lookup failed"))?;

        return Err(match row {
            Some((_, Some(_))) => ApiError::conflict("Already checked out today"),
            _ => ApiError::not_found("No check-in found for today"),
        });
    }

    let check_in = sqlx::query_scalar::<_, Option<NaiveDateTime>>(
        "SELECT check_in FROM attendance WHERE user_id = ? AND date = ?",
    )
    .bind(auth.user_id)
    .bind(today)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| internal(e, "Check-out readback failed"))?
    .ok_or_else(|| {
        tracing::error!(user_id = auth.user_id, "Check-in vanished after guarded update");
        ApiError::Internal
    })?;

    // A negative span is a data fault, not something to clamp.
    let duration = WorkDuration::between(check_in, now).map_err(|e| {
        tracing::error!(user_id = auth.user_id, check_in = %check_in, check_out = %now, "{e}");
        ApiError::Internal
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked out successfully",
        "check_out": now,
        "duration": duration
    })))
}

/// Attendance record listing
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Paginated attendance records", body = AttendanceListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, ApiError> {
    // Everyone sees their own records; only staff may look at someone else's.
    let target_user = match query.user_id {
        Some(other) if other != auth.user_id => {
            auth.require_hr_or_admin()?;
            other
        }
        _ => auth.user_id,
    };

    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);

    let (date_from, date_to) = match query.date {
        Some(d) => (d, d),
        None => {
            let today = Utc::now().date_naive();
            (today - Duration::days(DEFAULT_WINDOW_DAYS - 1), today)
        }
    };

    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM attendance WHERE user_id = ? AND date BETWEEN ? AND ?",
    )
    .bind(target_user)
    .bind(date_from)
    .bind(date_to)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| internal(e, "Failed to count attendance records"))?;

    let meta = PageMeta::new(page, per_page, total);

    let rows = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, user_id, display_name, date, check_in, check_out
        FROM attendance
        WHERE user_id = ? AND date BETWEEN ? AND ?
        ORDER BY date DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(target_user)
    .bind(date_from)
    .bind(date_to)
    .bind(per_page)
    .bind(meta.offset())
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| internal(e, "Failed to fetch attendance records"))?;

    let data = rows
        .into_iter()
        .map(|row| AttendanceEntry {
            duration: WorkDuration::annotate(row.check_in, row.check_out),
            id: row.id,
            display_name: row.display_name,
            date: row.date,
            check_in: row.check_in,
            check_out: row.check_out,
        })
        .collect::<Vec<_>>();

    Ok(HttpResponse::Ok().json(AttendanceListResponse { data, meta }))
}
