use crate::api::attendance::{
    AttendanceEntry, AttendanceListResponse, AttendanceQuery, CheckIn, CheckOut,
};
use crate::api::leave_request::{CreateLeave, LeaveFilter, LeaveListResponse, UpdateStatus};
use crate::model::attendance::WorkDuration;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::utils::pagination::PageMeta;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Back-Office API",
        version = "1.0.0",
        description = r#"
## Back-Office Attendance & Leave System

This API powers the attendance and leave workflows of a small-business
back-office system.

### 🔹 Key Features
- **Attendance Ledger**
  - One check-in / one check-out per person per day, with proof payloads
  - Derived work-duration breakdown and paginated history
- **Leave Management**
  - Submit requests, reviewer approve/reject, applicant cancellation
  - Day-count derivation from the date span

### 🔐 Security
All workflow endpoints are protected using **JWT Bearer authentication**.
Reviewer operations require the **Admin** or **HR** role.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination metadata on all list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::list_attendance,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::update_status,
        crate::api::leave_request::cancel_leave,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::leave_list
    ),
    components(
        schemas(
            CheckIn,
            CheckOut,
            AttendanceQuery,
            AttendanceEntry,
            AttendanceListResponse,
            WorkDuration,
            CreateLeave,
            UpdateStatus,
            LeaveFilter,
            LeaveRequest,
            LeaveStatus,
            LeaveType,
            LeaveListResponse,
            PageMeta
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance ledger APIs"),
        (name = "Leave", description = "Leave request workflow APIs"),
    )
)]
pub struct ApiDoc;
