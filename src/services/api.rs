use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::database::connection::DatabaseManager;
use crate::database::models::{Member, PaymentStatus, TemplateKey, TextTemplate};
use crate::services::workflow::{ApprovalWorkflow, WorkflowError};
use crate::utils::validation::{validate_rejection_reason, validate_template_value};

/// Dashboard counters. Revenue is a projection: every active membership is
/// assumed to renew at the configured monthly fee.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub active_users: i64,
    pub pending_payments: i64,
    pub expiring_today: i64,
    pub monthly_revenue: i64,
}

pub async fn gather_stats(
    pool: &sqlx::SqlitePool,
    membership_fee: i64,
) -> Result<Stats, sqlx::Error> {
    let members = Member::list_all(pool).await?;
    let today = Utc::now().date_naive();

    let active_users = members.iter().filter(|m| m.is_active).count() as i64;
    let pending_payments = members
        .iter()
        .filter(|m| m.status() == PaymentStatus::Pending && m.payment_proof.is_some())
        .count() as i64;
    let expiring_today = members
        .iter()
        .filter(|m| {
            m.is_active
                && m.status() == PaymentStatus::Approved
                && m.expiry_datetime().map(|dt| dt.date_naive()) == Some(today)
        })
        .count() as i64;

    Ok(Stats {
        active_users,
        pending_payments,
        expiring_today,
        monthly_revenue: active_users * membership_fee,
    })
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMember {
    pub id: i64,
    pub telegram_id: String,
    pub full_name: String,
    pub phone_number: String,
    pub join_date: String,
    pub payment_status: String,
    pub payment_proof: Option<String>,
    pub payment_expiry_date: Option<String>,
    pub is_active: bool,
}

impl From<Member> for ApiMember {
    fn from(m: Member) -> Self {
        ApiMember {
            id: m.id,
            telegram_id: m.telegram_id,
            full_name: m.full_name,
            phone_number: m.phone_number,
            join_date: m.join_date,
            payment_status: m.payment_status,
            payment_proof: m.payment_proof,
            payment_expiry_date: m.payment_expiry_date,
            is_active: m.is_active,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: i64,
    pub full_name: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TemplateUpdateRequest {
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub database: String,
    pub uptime_seconds: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub workflow: Arc<ApprovalWorkflow>,
    pub membership_fee: i64,
    pub start_time: DateTime<Utc>,
}

/// HTTP surface consumed by the admin dashboard, plus health endpoints.
pub struct ApiService {
    pub router: Router,
}

impl ApiService {
    pub fn new(db: Arc<DatabaseManager>, workflow: Arc<ApprovalWorkflow>, membership_fee: i64) -> Self {
        let state = AppState {
            db,
            workflow,
            membership_fee,
            start_time: Utc::now(),
        };

        let router = Router::new()
            .route("/health", get(health_check))
            .route("/health/ready", get(readiness_check))
            .route("/health/live", get(liveness_check))
            .route("/api/users", get(list_users))
            .route("/api/users/:id", delete(delete_user))
            .route("/api/users/remove/:id", post(remove_user))
            .route("/api/payments/pending", get(list_pending_payments))
            .route("/api/payments/approve/:id", post(approve_payment))
            .route("/api/payments/reject/:id", post(reject_payment))
            .route("/api/texts", get(list_texts))
            .route("/api/texts/:key", put(update_text))
            .route("/api/stats", get(get_stats))
            .route("/api/activities", get(get_activities))
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        Self { router }
    }
}

/// Dashboard error shape: the status code plus a `{"message": ...}` body.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

fn db_error(e: sqlx::Error) -> ApiError {
    tracing::error!("Database error in API handler: {}", e);
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

fn workflow_error(e: WorkflowError) -> ApiError {
    match e {
        WorkflowError::MemberNotFound(_) => {
            ApiError::new(StatusCode::NOT_FOUND, "Member not found")
        }
        WorkflowError::EmptyReason => {
            ApiError::new(StatusCode::BAD_REQUEST, "Rejection reason is required")
        }
        WorkflowError::Database(e) => db_error(e),
    }
}

async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, StatusCode> {
    let database = match sqlx::query("SELECT 1").fetch_one(&state.db.pool).await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let uptime = Utc::now()
        .signed_duration_since(state.start_time)
        .num_seconds()
        .max(0) as u64;

    let response = HealthResponse {
        status: database.to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        uptime_seconds: uptime,
    };

    if database == "healthy" {
        Ok(Json(response))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

async fn readiness_check(State(state): State<AppState>) -> Result<Json<&'static str>, StatusCode> {
    sqlx::query("SELECT 1")
        .fetch_one(&state.db.pool)
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;
    Ok(Json("ready"))
}

async fn liveness_check() -> Json<&'static str> {
    Json("alive")
}

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<ApiMember>>, ApiError> {
    let members = Member::list_all(&state.db.pool).await.map_err(db_error)?;
    Ok(Json(members.into_iter().map(ApiMember::from).collect()))
}

async fn list_pending_payments(
    State(state): State<AppState>,
) -> Result<Json<Vec<ApiMember>>, ApiError> {
    let members = Member::list_by_status(&state.db.pool, PaymentStatus::Pending)
        .await
        .map_err(db_error)?;
    Ok(Json(
        members
            .into_iter()
            .filter(|m| m.payment_proof.is_some())
            .map(ApiMember::from)
            .collect(),
    ))
}

async fn approve_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiMember>, ApiError> {
    let member = state
        .workflow
        .approve(id, Utc::now())
        .await
        .map_err(workflow_error)?;
    Ok(Json(member.into()))
}

async fn reject_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<RejectRequest>,
) -> Result<Json<ApiMember>, ApiError> {
    let reason = validate_rejection_reason(&request.reason)
        .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "Rejection reason is required"))?;
    let member = state
        .workflow
        .reject(id, &reason)
        .await
        .map_err(workflow_error)?;
    Ok(Json(member.into()))
}

async fn remove_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Option<Json<RemoveRequest>>,
) -> Result<Json<ApiMember>, ApiError> {
    let reason = body.as_ref().and_then(|b| b.reason.as_deref());
    let member = state
        .workflow
        .remove(id, reason)
        .await
        .map_err(workflow_error)?;
    Ok(Json(member.into()))
}

/// Hard delete, unlike the remove endpoint which only deactivates.
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = Member::delete(&state.db.pool, id).await.map_err(db_error)?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::new(StatusCode::NOT_FOUND, "Member not found"))
    }
}

async fn list_texts(State(state): State<AppState>) -> Result<Json<Vec<TextTemplate>>, ApiError> {
    let templates = TextTemplate::list_all(&state.db.pool)
        .await
        .map_err(db_error)?;
    Ok(Json(templates))
}

async fn update_text(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<TemplateUpdateRequest>,
) -> Result<Json<TextTemplate>, ApiError> {
    let key = TemplateKey::parse(&key)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "Unknown text key"))?;
    let value = validate_template_value(&request.value)
        .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "Text value cannot be empty"))?;

    let template = TextTemplate::set(&state.db.pool, key, &value)
        .await
        .map_err(db_error)?;
    Ok(Json(template))
}

async fn get_stats(State(state): State<AppState>) -> Result<Json<Stats>, ApiError> {
    let stats = gather_stats(&state.db.pool, state.membership_fee)
        .await
        .map_err(db_error)?;
    Ok(Json(stats))
}

/// Ten most recent member records, typed by their current payment status.
async fn get_activities(State(state): State<AppState>) -> Result<Json<Vec<Activity>>, ApiError> {
    let members = Member::list_all(&state.db.pool).await.map_err(db_error)?;
    Ok(Json(
        members
            .into_iter()
            .take(10)
            .map(|m| Activity {
                id: m.id,
                full_name: m.full_name,
                activity_type: m.payment_status,
                date: m.join_date,
            })
            .collect(),
    ))
}
