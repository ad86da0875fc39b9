//! REST surface for the exit workflow
//!
//! Thin layer: each handler checks the role gate, adapts the body and calls
//! into the workflow service. Every response uses the common envelope.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::AuthContext;
use exitflow_core::{
    ExitWorkflow, ExitflowError, FileDirectory, HealthCheckResult, HrFinalizeInput, Notifier,
    SubmitInput,
};
use exitflow_types::{ActorRole, Employee, EmployeeId};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<ExitWorkflow<FileDirectory, Notifier>>,
}

/// Common response envelope
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    fn success(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            status: "success",
            message: message.into(),
            data: Some(data),
        })
    }
}

/// Error response carrying the HTTP status to answer with
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }
}

impl From<ExitflowError> for ApiError {
    fn from(error: ExitflowError) -> Self {
        let (status, message) = match &error {
            ExitflowError::Validation(msg) | ExitflowError::Workflow(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            ExitflowError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            other => {
                log::error!("Unexpected error handling request: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiResponse::<()> {
            status: "error",
            message: self.message,
            data: None,
        });
        (self.status, body).into_response()
    }
}

// Request bodies

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitBody {
    reason: String,
    #[serde(default)]
    comments: String,
    #[serde(default)]
    attachment_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TlApproveBody {
    employee_id: String,
    #[serde(default)]
    comments: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RejectBody {
    employee_id: String,
    rejection_reason: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManagerApproveBody {
    employee_id: String,
    #[serde(default)]
    lwd: Option<NaiveDate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HrApproveBody {
    employee_id: String,
    notice_days: i64,
    #[serde(rename = "finalLWD")]
    final_lwd: NaiveDate,
    #[serde(default)]
    comments: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClearanceBody {
    employee_id: String,
    #[serde(default)]
    clearance_data: BTreeMap<String, bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelieveBody {
    employee_id: String,
}

const SUBMITTER_ROLES: &[ActorRole] = &[ActorRole::Employee, ActorRole::TeamLead, ActorRole::Manager];
const HR_ROLES: &[ActorRole] = &[ActorRole::Hr, ActorRole::Admin];

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/resignation/submit", post(submit))
        .route("/resignation/cancel", post(cancel))
        .route("/resignation/tl/list", get(tl_list))
        .route("/resignation/tl/approve", post(tl_approve))
        .route("/resignation/tl/reject", post(tl_reject))
        .route("/resignation/manager/list", get(manager_list))
        .route("/resignation/manager/approve", post(manager_approve))
        .route("/resignation/manager/reject", post(manager_reject))
        .route("/resignation/hr/list", get(hr_list))
        .route("/resignation/hr/approve", post(hr_approve))
        .route("/resignation/hr/clearance", post(hr_clearance))
        .route("/resignation/hr/exit-list", get(hr_exit_list))
        .route("/resignation/hr/relieve", post(hr_relieve))
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

async fn submit(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(body): Json<SubmitBody>,
) -> Result<Json<ApiResponse<Employee>>, ApiError> {
    ctx.require_role(SUBMITTER_ROLES)?;

    let input = SubmitInput {
        reason: body.reason,
        comments: body.comments,
        attachment_url: body.attachment_url,
    };
    let employee = state.workflow.submit(&ctx.actor(), input).await?;

    Ok(ApiResponse::success(
        "Resignation submitted successfully",
        employee,
    ))
}

async fn cancel(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<Json<ApiResponse<Employee>>, ApiError> {
    ctx.require_role(SUBMITTER_ROLES)?;

    let employee = state.workflow.cancel(&ctx.actor()).await?;

    Ok(ApiResponse::success(
        "Resignation cancelled successfully",
        employee,
    ))
}

async fn tl_list(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<Json<ApiResponse<Vec<Employee>>>, ApiError> {
    ctx.require_role(&[ActorRole::TeamLead])?;

    let employees = state.workflow.tl_pending_list(&ctx.actor()).await?;

    Ok(ApiResponse::success("Pending team lead approvals", employees))
}

async fn tl_approve(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(body): Json<TlApproveBody>,
) -> Result<Json<ApiResponse<Employee>>, ApiError> {
    ctx.require_role(&[ActorRole::TeamLead])?;

    let employee = state
        .workflow
        .tl_approve(&ctx.actor(), &EmployeeId::new(body.employee_id), body.comments)
        .await?;

    Ok(ApiResponse::success("Resignation approved", employee))
}

async fn tl_reject(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(body): Json<RejectBody>,
) -> Result<Json<ApiResponse<Employee>>, ApiError> {
    ctx.require_role(&[ActorRole::TeamLead])?;

    let employee = state
        .workflow
        .tl_reject(
            &ctx.actor(),
            &EmployeeId::new(body.employee_id),
            body.rejection_reason,
        )
        .await?;

    Ok(ApiResponse::success("Resignation rejected", employee))
}

async fn manager_list(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<Json<ApiResponse<Vec<Employee>>>, ApiError> {
    ctx.require_role(&[ActorRole::Manager])?;

    let employees = state.workflow.manager_pending_list(&ctx.actor()).await?;

    Ok(ApiResponse::success("Pending manager approvals", employees))
}

async fn manager_approve(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(body): Json<ManagerApproveBody>,
) -> Result<Json<ApiResponse<Employee>>, ApiError> {
    ctx.require_role(&[ActorRole::Manager, ActorRole::Admin, ActorRole::Hr])?;

    let employee = state
        .workflow
        .manager_approve(&ctx.actor(), &EmployeeId::new(body.employee_id), body.lwd)
        .await?;

    Ok(ApiResponse::success("Resignation approved", employee))
}

async fn manager_reject(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(body): Json<RejectBody>,
) -> Result<Json<ApiResponse<Employee>>, ApiError> {
    ctx.require_role(&[ActorRole::Manager])?;

    let employee = state
        .workflow
        .manager_reject(
            &ctx.actor(),
            &EmployeeId::new(body.employee_id),
            body.rejection_reason,
        )
        .await?;

    Ok(ApiResponse::success("Resignation rejected", employee))
}

async fn hr_list(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<Json<ApiResponse<Vec<Employee>>>, ApiError> {
    ctx.require_role(HR_ROLES)?;

    let employees = state.workflow.hr_pending_list(&ctx.actor()).await?;

    Ok(ApiResponse::success("Awaiting HR finalization", employees))
}

async fn hr_approve(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(body): Json<HrApproveBody>,
) -> Result<Json<ApiResponse<Employee>>, ApiError> {
    ctx.require_role(HR_ROLES)?;

    let input = HrFinalizeInput {
        notice_days: body.notice_days,
        final_lwd: body.final_lwd,
        comments: body.comments,
    };
    let employee = state
        .workflow
        .hr_finalize(&ctx.actor(), &EmployeeId::new(body.employee_id), input)
        .await?;

    Ok(ApiResponse::success("Resignation finalized", employee))
}

async fn hr_clearance(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(body): Json<ClearanceBody>,
) -> Result<Json<ApiResponse<Employee>>, ApiError> {
    ctx.require_role(HR_ROLES)?;

    let employee = state
        .workflow
        .update_clearance(
            &ctx.actor(),
            &EmployeeId::new(body.employee_id),
            &body.clearance_data,
        )
        .await?;

    Ok(ApiResponse::success("Exit clearance updated", employee))
}

async fn hr_exit_list(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<Json<ApiResponse<Vec<Employee>>>, ApiError> {
    ctx.require_role(HR_ROLES)?;

    let employees = state.workflow.exit_list(&ctx.actor()).await?;

    Ok(ApiResponse::success("Employees in exit process", employees))
}

async fn hr_relieve(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(body): Json<RelieveBody>,
) -> Result<Json<ApiResponse<Employee>>, ApiError> {
    ctx.require_role(HR_ROLES)?;

    let employee = state
        .workflow
        .relieve(&ctx.actor(), &EmployeeId::new(body.employee_id))
        .await?;

    Ok(ApiResponse::success("Employee relieved", employee))
}

async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthCheckResult>> {
    let result = state.workflow.health_check().await;
    ApiResponse::success("Health check", result)
}
