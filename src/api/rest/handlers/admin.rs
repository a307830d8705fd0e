// Administration Handlers
//
// Handler functions for administrative operations

use axum::{
    extract::{Path, Query, State},
    response::{Json as AxumJson},
    http::StatusCode,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;
use uuid::Uuid;

use crate::error::DbError;
use super::super::types::*;
use std::time::UNIX_EPOCH;

/// Get database configuration
#[utoipa::path(
    get,
    path = "/api/v1/admin/config",
    tag = "admin",
    responses(
        (status = 200, description = "Configuration", body = ConfigResponse),
    )
)]
pub async fn get_config(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<AxumJson<ConfigResponse>> {
    let mut settings = HashMap::new();
    settings.insert("max_connections".to_string(), json!(1000));
    settings.insert("buffer_pool_size".to_string(), json!(1024));
    settings.insert("wal_enabled".to_string(), json!(true));

    let response = ConfigResponse {
        settings,
        version: "1.0.0".to_string(),
        updated_at: SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap().as_secs() as i64,
    };

    Ok(AxumJson(response))
}

/// Update database configuration
#[utoipa::path(
    put,
    path = "/api/v1/admin/config",
    tag = "admin",
    request_body = HashMap<String, serde_json::Value>,
    responses(
        (status = 200, description = "Configuration updated"),
        (status = 400, description = "Invalid configuration", body = ApiError),
    )
)]
pub async fn update_config(
    State(_state): State<Arc<ApiState>>,
    AxumJson(_settings): AxumJson<HashMap<String, serde_json::Value>>,
) -> ApiResult<StatusCode> {
    // TODO: Validate and apply configuration changes
    Ok(StatusCode::OK)
}

/// Create a backup
#[utoipa::path(
    post,
    path = "/api/v1/admin/backup",
    tag = "admin",
    request_body = BackupRequest,
    responses(
        (status = 202, description = "Backup started", body = BackupResponse),
    )
)]
pub async fn create_backup(
    State(_state): State<Arc<ApiState>>,
    AxumJson(_request): AxumJson<BackupRequest>,
) -> ApiResult<AxumJson<BackupResponse>> {
    let backup_id = Uuid::new_v4();

    let response = BackupResponse {
        backup_id: backup_id.to_string(),
        status: "in_progress".to_string(),
        started_at: SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap().as_secs() as i64,
        completed_at: None,
        size_bytes: None,
        location: "/backups/".to_string() + &backup_id.to_string(),
    };

    Ok(AxumJson(response))
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/v1/admin/health",
    tag = "admin",
    responses(
        (status = 200, description = "Health status", body = HealthResponse),
    )
)]
pub async fn get_health(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<AxumJson<HealthResponse>> {
    let mut checks = HashMap::new();

    checks.insert("database".to_string(), ComponentHealth {
        status: "healthy".to_string(),
        message: Some("Database is operational".to_string()),
        last_check: SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap().as_secs() as i64,
    });

    checks.insert("storage".to_string(), ComponentHealth {
        status: "healthy".to_string(),
        message: None,
        last_check: SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap().as_secs() as i64,
    });

    let response = HealthResponse {
        status: "healthy".to_string(),
        version: "1.0.0".to_string(),
        uptime_seconds: 3600,
        checks,
    };

    Ok(AxumJson(response))
}

/// Run maintenance operations
#[utoipa::path(
    post,
    path = "/api/v1/admin/maintenance",
    tag = "admin",
    request_body = MaintenanceRequest,
    responses(
        (status = 202, description = "Maintenance started"),
        (status = 400, description = "Invalid operation", body = ApiError),
    )
)]
pub async fn run_maintenance(
    State(_state): State<Arc<ApiState>>,
    AxumJson(request): AxumJson<MaintenanceRequest>,
) -> ApiResult<StatusCode> {
    // Validate operation
    match request.operation.as_str() {
        "vacuum" | "analyze" | "reindex" | "checkpoint" => {
            // TODO: Execute maintenance operation
            Ok(StatusCode::ACCEPTED)
        }
        _ => Err(ApiError::new("INVALID_INPUT", "Invalid maintenance operation")),
    }
}

/// Get all users
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "admin",
    responses(
        (status = 200, description = "List of users", body = Vec<UserResponse>),
    )
)]
pub async fn get_users(
    State(_state): State<Arc<ApiState>>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<AxumJson<PaginatedResponse<UserResponse>>> {
    // TODO: Fetch users from database
    let users = vec![];

    let response = PaginatedResponse::new(users, params.page, params.page_size, 0);
    Ok(AxumJson(response))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/v1/admin/users",
    tag = "admin",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 409, description = "User already exists", body = ApiError),
    )
)]
pub async fn create_user(
    State(_state): State<Arc<ApiState>>,
    AxumJson(request): AxumJson<UserRequest>,
) -> ApiResult<AxumJson<UserResponse>> {
    let user = UserResponse {
        user_id: 1,
        username: request.username,
        roles: request.roles,
        enabled: request.enabled.unwrap_or(true),
        created_at: SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap().as_secs() as i64,
        last_login: None,
    };

    Ok(AxumJson(user))
}

/// Get user by ID
pub async fn get_user(
    State(_state): State<Arc<ApiState>>,
    Path(_id): Path<u64>,
) -> ApiResult<AxumJson<UserResponse>> {
    // TODO: Implement user lookup
    Err(ApiError::new("NOT_FOUND", "User not found"))
}

/// Update user
pub async fn update_user(
    State(_state): State<Arc<ApiState>>,
    Path(_id): Path<u64>,
    AxumJson(_request): AxumJson<UserRequest>,
) -> ApiResult<StatusCode> {
    // TODO: Implement user update
    Ok(StatusCode::OK)
}

/// Delete user
pub async fn delete_user(
    State(_state): State<Arc<ApiState>>,
    Path(_id): Path<u64>,
) -> ApiResult<StatusCode> {
    // TODO: Implement user deletion
    Ok(StatusCode::NO_CONTENT)
}

/// Get all roles
#[utoipa::path(
    get,
    path = "/api/v1/admin/roles",
    tag = "admin",
    responses(
        (status = 200, description = "List of roles", body = Vec<RoleResponse>),
    )
)]
pub async fn get_roles(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<AxumJson<Vec<RoleResponse>>> {
    // TODO: Fetch roles from database
    Ok(AxumJson(vec![]))
}

/// Create a new role
#[utoipa::path(
    post,
    path = "/api/v1/admin/roles",
    tag = "admin",
    request_body = RoleRequest,
    responses(
        (status = 201, description = "Role created", body = RoleResponse),
    )
)]
pub async fn create_role(
    State(_state): State<Arc<ApiState>>,
    AxumJson(request): AxumJson<RoleRequest>,
) -> ApiResult<AxumJson<RoleResponse>> {
    let role = RoleResponse {
        role_id: 1,
        role_name: request.role_name,
        permissions: request.permissions,
        description: request.description,
        created_at: SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap().as_secs() as i64,
    };

    Ok(AxumJson(role))
}

/// Get role by ID
pub async fn get_role(
    State(_state): State<Arc<ApiState>>,
    Path(_id): Path<u64>,
) -> ApiResult<AxumJson<RoleResponse>> {
    Err(ApiError::new("NOT_FOUND", "Role not found"))
}

/// Update role
pub async fn update_role(
    State(_state): State<Arc<ApiState>>,
    Path(_id): Path<u64>,
    AxumJson(_request): AxumJson<RoleRequest>,
) -> ApiResult<StatusCode> {
    Ok(StatusCode::OK)
}

/// Delete role
pub async fn delete_role(
    State(_state): State<Arc<ApiState>>,
    Path(_id): Path<u64>,
) -> ApiResult<StatusCode> {
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Monitoring Handlers
// ============================================================================

/// Get metrics
#[utoipa::path(
    get,
    path = "/api/v1/metrics",
    tag = "monitoring",
    responses(
        (status = 200, description = "Metrics data", body = MetricsResponse),
    )
)]
pub async fn get_metrics(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<AxumJson<MetricsResponse>> {
    let mut metric_data = HashMap::new();

    metric_data.insert("total_requests".to_string(), MetricData {
        value: 0.0,
        unit: "count".to_string(),
        labels: HashMap::new(),
    });

    let response = MetricsResponse {
        timestamp: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64,
        metrics: metric_data,
        prometheus_format: None,
    };

    Ok(AxumJson(response))
}