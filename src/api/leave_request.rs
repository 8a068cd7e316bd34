use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType, resolve_days};
use crate::model::role::Role;
use crate::utils::pagination::PageMeta;
use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "sick")]
    pub leave_type: LeaveType, // enum ensures Swagger dropdown
    #[schema(example = "2026-01-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Fever")]
    pub reason: String,
    /// Reachability while away.
    pub contact: Option<String>,
    /// Handover notes for whoever covers.
    pub handover: Option<String>,
    #[schema(example = 3)]
    /// Explicit day count; derived from the date span (inclusive) when omitted.
    pub days: Option<i64>,
    /// Optional applicant-name override.
    pub applicant_name: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateStatus {
    #[schema(example = "approved")]
    pub status: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = 123)]
    /// Filter by applicant user ID (staff only; others always see their own)
    pub user_id: Option<u64>,
    #[schema(example = "pending")]
    /// Filter by leave status
    pub status: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    pub meta: PageMeta,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Str(String),
}

fn internal(e: sqlx::Error, context: &'static str) -> ApiError {
    tracing::error!(error = %e, "{context}");
    ApiError::Internal
}

/* =========================
Submit leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted",
         body = Object,
         example = json!({
            "id": 1,
            "applicant_name": "Maya Rahman",
            "status": "pending",
            "days": 3
         })
        ),
        (status = 400, description = "Missing or invalid field"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> Result<HttpResponse, ApiError> {
    let reason = payload.reason.trim();
    if reason.is_empty() {
        return Err(ApiError::validation("reason must not be empty"));
    }

    // Rejects end < start and explicit non-positive counts.
    let days = resolve_days(payload.start_date, payload.end_date, payload.days)?;

    let actor = auth.actor(payload.applicant_name.as_deref());
    let now = Utc::now().naive_utc();

    let result = sqlx::query(
        r#"
        INSERT INTO leave_requests
            (user_id, applicant_name, leave_type, start_date, end_date,
             days, reason, contact, handover, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(actor.user_id)
    .bind(&actor.display_name)
    .bind(payload.leave_type.to_string())
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(days)
    .bind(reason)
    .bind(&payload.contact)
    .bind(&payload.handover)
    .bind(LeaveStatus::Pending.to_string())
    .bind(now)
    .bind(now)
    .execute(pool.get_ref())
    .await
    .map_err(|e| internal(e, "Failed to create leave request"))?;

    Ok(HttpResponse::Created().json(json!({
        "id": result.last_insert_id(),
        "applicant_name": actor.display_name,
        "status": LeaveStatus::Pending,
        "days": days
    })))
}

/* =========================
Update status (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/status",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request")
    ),
    request_body = UpdateStatus,
    responses(
        (status = 200, description = "Status updated", body = Object, example = json!({
            "id": 1,
            "status": "approved"
        })),
        (status = 400, description = "Unknown status value"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn update_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateStatus>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();

    let new_status: LeaveStatus = payload.status.parse().map_err(|_| {
        ApiError::validation("Unknown status. Allowed: pending, approved, rejected, cancelled")
    })?;

    let found = sqlx::query_scalar::<_, u64>("SELECT id FROM leave_requests WHERE id = ?")
        .bind(leave_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| internal(e, "Failed to fetch leave request"))?;

    if found.is_none() {
        return Err(ApiError::not_found("Leave request not found"));
    }

    // Reviewers may move a request between any of the enumerated states;
    // only the applicant's cancellation path is gated on Pending.
    sqlx::query("UPDATE leave_requests SET status = ?, updated_at = ? WHERE id = ?")
        .bind(new_status.to_string())
        .bind(Utc::now().naive_utc())
        .bind(leave_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| internal(e, "Failed to update leave status"))?;

    Ok(HttpResponse::Ok().json(json!({
        "id": leave_id,
        "status": new_status
    })))
}

/* =========================
Cancel (owner or admin)
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave/{leave_id}/cancel",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to cancel")
    ),
    responses(
        (status = 200, description = "Leave request cancelled", body = Object, example = json!({
            "message": "Leave request cancelled",
            "status": "cancelled"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the applicant"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "No longer pending")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let leave_id = path.into_inner();

    let (owner, status) = sqlx::query_as::<_, (Option<u64>, String)>(
        "SELECT user_id, status FROM leave_requests WHERE id = ?",
    )
    .bind(leave_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| internal(e, "Failed to fetch leave request"))?
    .ok_or_else(|| ApiError::not_found("Leave request not found"))?;

    let is_owner = owner == Some(auth.user_id);
    if !is_owner && auth.role != Role::Admin {
        return Err(ApiError::forbidden(
            "Only the applicant or an admin can cancel a leave request",
        ));
    }

    let current: LeaveStatus = status.parse().map_err(|_| {
        tracing::error!(leave_id, status = %status, "Unrecognized stored leave status");
        ApiError::Internal
    })?;

    if !current.is_cancellable() {
        return Err(ApiError::conflict(format!(
            "Leave request is {current}, no longer cancellable"
        )));
    }

    // Guarded on Pending so a racing reviewer decision still wins.
    let updated = sqlx::query(
        "UPDATE leave_requests SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
    )
    .bind(LeaveStatus::Cancelled.to_string())
    .bind(Utc::now().naive_utc())
    .bind(leave_id)
    .bind(LeaveStatus::Pending.to_string())
    .execute(pool.get_ref())
    .await
    .map_err(|e| internal(e, "Failed to cancel leave request"))?;

    if updated.rows_affected() == 0 {
        return Err(ApiError::conflict("Leave request is no longer cancellable"));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave request cancelled",
        "status": LeaveStatus::Cancelled
    })))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let leave_id = path.into_inner();

    let leave = sqlx::query_as::<_, LeaveRequest>(
        r#"
        SELECT id, user_id, applicant_name, leave_type, start_date, end_date,
               days, reason, contact, handover, status, created_at, updated_at
        FROM leave_requests
        WHERE id = ?
        "#,
    )
    .bind(leave_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| internal(e, "Failed to fetch leave request"))?
    .ok_or_else(|| ApiError::not_found("Leave request not found"))?;

    if leave.user_id != Some(auth.user_id) && !auth.is_staff() {
        return Err(ApiError::forbidden("Not your leave request"));
    }

    Ok(HttpResponse::Ok().json(leave))
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> Result<HttpResponse, ApiError> {
    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    // Non-staff only ever see their own requests.
    let user_filter = if auth.is_staff() {
        query.user_id
    } else {
        Some(auth.user_id)
    };

    if let Some(user_id) = user_filter {
        where_sql.push_str(" AND user_id = ?");
        args.push(FilterValue::U64(user_id));
    }

    if let Some(status) = query.status.as_deref() {
        let status: LeaveStatus = status
            .parse()
            .map_err(|_| ApiError::validation("Unknown status filter"))?;
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status.to_string()));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(s.clone()),
        };
    }

    let total = count_q
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| internal(e, "Failed to count leave requests"))?;

    let meta = PageMeta::new(page, per_page, total);

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT id, user_id, applicant_name, leave_type, start_date, end_date,
               days, reason, contact, handover, status, created_at, updated_at
        FROM leave_requests
        {}
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let data = data_q
        .bind(per_page)
        .bind(meta.offset())
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| internal(e, "Failed to fetch leave list"))?;

    Ok(HttpResponse::Ok().json(LeaveListResponse { data, meta }))
}
