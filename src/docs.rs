use crate::api::admin::{DepartmentReq, EmployeeReq, ManagerReq, StatusReq, UpdateLeave};
use crate::api::admin_users::{AdminUserList, AdminUserReq};
use crate::api::manager::UnlockReq;
use crate::api::overlay::AffordanceSet;
use crate::api::public::SubmitLeave;
use crate::model::admin_user::{AdminUser, AdminUserView};
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::leave_request::{
    AdminLeaveRow, LeaveStatus, ManagerLeaveRow, PendingGroup, PendingItem, PublicLeaveRow,
};
use crate::model::manager_user::{ManagerUser, UnlockedDepartment};
use crate::models::{MagicLinkReq, SessionResponse};
use crate::overlay::Affordance;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Desk API",
        version = "1.0.0",
        description = r#"
## Leave Desk

Leave requests for a small organization.

### 🔹 Key Features
- **Public page**
  - Submit a leave request without an account, watch recent requests refresh live
- **Manager console**
  - Magic-link sign-in, PIN unlock of one department, approve/reject
- **Admin console**
  - Departments, employees, managers, requests, pending summary, admin accounts

### 🔐 Security
Session endpoints take a **Bearer** token obtained from `/auth/verify`.
Roles come from the `manager_users` and `admin_users` tables, not the token.

### 🔄 Live refresh
`GET /realtime?table=leave_requests&event=*` streams change events; clients
re-fetch on each one.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::public::health,
        crate::api::public::list_departments,
        crate::api::public::list_employees,
        crate::api::public::recent_requests,
        crate::api::public::submit_request,
        crate::api::realtime::subscribe,

        crate::auth::handlers::request_magic_link,
        crate::auth::handlers::verify_magic_link,
        crate::auth::handlers::logout,
        crate::auth::handlers::me,

        crate::api::manager::unlock,
        crate::api::manager::list_requests,
        crate::api::manager::approve,
        crate::api::manager::reject,

        crate::api::admin::me,
        crate::api::admin::list_departments,
        crate::api::admin::create_department,
        crate::api::admin::rename_department,
        crate::api::admin::delete_department,
        crate::api::admin::list_employees,
        crate::api::admin::create_employee,
        crate::api::admin::update_employee,
        crate::api::admin::delete_employee,
        crate::api::admin::list_managers,
        crate::api::admin::upsert_manager,
        crate::api::admin::delete_manager,
        crate::api::admin::generate_manager_pin,
        crate::api::admin::list_requests,
        crate::api::admin::pending_summary,
        crate::api::admin::set_request_status,
        crate::api::admin::update_request,
        crate::api::admin::delete_request,

        crate::api::admin_users::list_admin_users,
        crate::api::admin_users::upsert_admin_user,
        crate::api::admin_users::delete_admin_user,

        crate::api::overlay::get_affordances
    ),
    components(
        schemas(
            Department,
            Employee,
            LeaveStatus,
            PublicLeaveRow,
            AdminLeaveRow,
            ManagerLeaveRow,
            PendingGroup,
            PendingItem,
            SubmitLeave,
            MagicLinkReq,
            SessionResponse,
            UnlockReq,
            UnlockedDepartment,
            ManagerUser,
            ManagerReq,
            DepartmentReq,
            EmployeeReq,
            StatusReq,
            UpdateLeave,
            AdminUser,
            AdminUserView,
            AdminUserList,
            AdminUserReq,
            Affordance,
            AffordanceSet
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Public", description = "Public submission page APIs"),
        (name = "Realtime", description = "Change notifications"),
        (name = "Auth", description = "Magic-link sign-in"),
        (name = "Manager", description = "Manager console APIs"),
        (name = "Admin", description = "Admin console APIs"),
        (name = "Admin accounts", description = "Admin account management"),
        (name = "Overlay", description = "Admin panel affordances"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
