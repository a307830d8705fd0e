// # REST API Handlers
//
// Handler functions for all REST API endpoints.
// Each handler implements proper error handling and uses dependency injection.

use axum::{
    extract::{Path, Query, State},
    response::{Json as AxumJson},
    http::StatusCode,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::DbError;
use crate::api::rest::types::*;
use std::time::UNIX_EPOCH;

/// Execute a SQL query
#[utoipa::path(
    post,
    path = "/api/v1/query",
    tag = "database",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Query executed successfully", body = QueryResponse),
        (status = 400, description = "Invalid query", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError),
    )
)]
pub async fn execute_query(
    State(state): State<Arc<ApiState>>,
    AxumJson(request): AxumJson<QueryRequest>,
) -> ApiResult<AxumJson<QueryResponse>> {
    let query_id = Uuid::new_v4();
    let start = SystemTime::now();

    // Validate SQL
    if request.sql.trim().is_empty() {
        return Err(ApiError::new("INVALID_INPUT", "SQL query cannot be empty"));
    }

    // Record query execution
    {
        let mut queries = state.active_queries.write().await;
        queries.insert(query_id, QueryExecution {
            query_id,
            sql: request.sql.clone(),
            started_at: start,
            session_id: SessionId(1), // TODO: Get from context
            status: "running".to_string(),
        });
    }

    // TODO: Execute query against actual database engine
    // For now, return mock response

    let execution_time = start.elapsed().unwrap_or_default().as_millis() as u64;

    // Clean up query tracking
    {
        let mut queries = state.active_queries.write().await;
        queries.remove(&query_id);
    }

    let response = QueryResponse {
        query_id: query_id.to_string(),
        rows: vec![],
        columns: vec![
            ColumnMetadata {
                name: "id".to_string(),
                data_type: "INTEGER".to_string(),
                nullable: false,
                precision: None,
                scale: None,
            },
        ],
        row_count: 0,
        affected_rows: None,
        execution_time_ms: execution_time,
        plan: if request.explain.unwrap_or(false) {
            Some("Sequential Scan on table".to_string())
        } else {
            None
        },
        warnings: vec![],
        has_more: false,
    };

    Ok(AxumJson(response))
}

/// Execute batch operations
#[utoipa::path(
    post,
    path = "/api/v1/batch",
    tag = "database",
    request_body = BatchRequest,
    responses(
        (status = 200, description = "Batch executed", body = BatchResponse),
        (status = 400, description = "Invalid batch", body = ApiError),
    )
)]
pub async fn execute_batch(
    State(_state): State<Arc<ApiState>>,
    AxumJson(request): AxumJson<BatchRequest>,
) -> ApiResult<AxumJson<BatchResponse>> {
    let batch_id = Uuid::new_v4();
    let start = SystemTime::now();

    if request.statements.is_empty() {
        return Err(ApiError::new("INVALID_INPUT", "Batch must contain at least one statement"));
    }

    let mut results = Vec::new();
    let mut success_count = 0;
    let mut failure_count = 0;

    for (index, statement) in request.statements.iter().enumerate() {
        let stmt_start = SystemTime::now();

        // TODO: Execute actual statement
        let success = !statement.is_empty();

        if success {
            success_count += 1;
        } else {
            failure_count += 1;

            if request.stop_on_error {
                break;
            }
        }

        results.push(BatchStatementResult {
            statement_index: index,
            success,
            affected_rows: Some(0),
            error: if !success { Some("Execution failed".to_string()) } else { None },
            execution_time_ms: stmt_start.elapsed().unwrap_or_default().as_millis() as u64,
        });
    }

    let total_time = start.elapsed().unwrap_or_default().as_millis() as u64;

    let response = BatchResponse {
        batch_id: batch_id.to_string(),
        results,
        total_time_ms: total_time,
        success_count,
        failure_count,
    };

    Ok(AxumJson(response))
}

/// Get table information
#[utoipa::path(
    get,
    path = "/api/v1/tables/{name}",
    tag = "database",
    params(
        ("name" = String, Path, description = "Table name")
    ),
    responses(
        (status = 200, description = "Table info", body = TableInfo),
        (status = 404, description = "Table not found", body = ApiError),
    )
)]
pub async fn get_table(
    State(_state): State<Arc<ApiState>>,
    Path(name): Path<String>,
) -> ApiResult<AxumJson<TableInfo>> {
    // TODO: Implement actual table lookup
    let table = TableInfo {
        name: name.clone(),
        schema: "public".to_string(),
        row_count: 0,
        size_bytes: 0,
        columns: vec![],
        indexes: vec![],
    };

    Ok(AxumJson(table))
}

/// Create a new table
#[utoipa::path(
    post,
    path = "/api/v1/tables/{name}",
    tag = "database",
    request_body = TableRequest,
    responses(
        (status = 201, description = "Table created"),
        (status = 409, description = "Table already exists", body = ApiError),
    )
)]
pub async fn create_table(
    State(_state): State<Arc<ApiState>>,
    Path(_name): Path<String>,
    AxumJson(_request): AxumJson<TableRequest>,
) -> ApiResult<StatusCode> {
    // TODO: Implement table creation
    Ok(StatusCode::CREATED)
}

/// Update table schema
#[utoipa::path(
    put,
    path = "/api/v1/tables/{name}",
    tag = "database",
    request_body = TableRequest,
    responses(
        (status = 200, description = "Table updated"),
        (status = 404, description = "Table not found", body = ApiError),
    )
)]
pub async fn update_table(
    State(_state): State<Arc<ApiState>>,
    Path(_name): Path<String>,
    AxumJson(_request): AxumJson<TableRequest>,
) -> ApiResult<StatusCode> {
    // TODO: Implement table update
    Ok(StatusCode::OK)
}

/// Delete a table
#[utoipa::path(
    delete,
    path = "/api/v1/tables/{name}",
    tag = "database",
    responses(
        (status = 204, description = "Table deleted"),
        (status = 404, description = "Table not found", body = ApiError),
    )
)]
pub async fn delete_table(
    State(_state): State<Arc<ApiState>>,
    Path(_name): Path<String>,
) -> ApiResult<StatusCode> {
    // TODO: Implement table deletion
    Ok(StatusCode::NO_CONTENT)
}

/// Get database schema
#[utoipa::path(
    get,
    path = "/api/v1/schema",
    tag = "database",
    responses(
        (status = 200, description = "Schema information", body = SchemaResponse),
    )
)]
pub async fn get_schema(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<AxumJson<SchemaResponse>> {
    // TODO: Implement schema introspection
    let response = SchemaResponse {
        database_name: "rustydb".to_string(),
        tables: vec![],
        views: vec![],
        procedures: vec![],
        total_count: 0,
    };

    Ok(AxumJson(response))
}

/// Begin a new transaction
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    tag = "database",
    request_body = TransactionRequest,
    responses(
        (status = 201, description = "Transaction started", body = TransactionResponse),
    )
)]
pub async fn begin_transaction(
    State(_state): State<Arc<ApiState>>,
    AxumJson(request): AxumJson<TransactionRequest>,
) -> ApiResult<AxumJson<TransactionResponse>> {
    let txn_id = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_micros() as u64;

    let response = TransactionResponse {
        transaction_id: TransactionId(txn_id),
        isolation_level: request.isolation_level.unwrap_or_else(|| "READ_COMMITTED".to_string()),
        started_at: SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap().as_secs() as i64,
        status: "active".to_string(),
    };

    Ok(AxumJson(response))
}

/// Commit a transaction
#[utoipa::path(
    post,
    path = "/api/v1/transactions/{id}/commit",
    tag = "database",
    params(
        ("id" = u64, Path, description = "Transaction ID")
    ),
    responses(
        (status = 200, description = "Transaction committed"),
        (status = 404, description = "Transaction not found", body = ApiError),
    )
)]
pub async fn commit_transaction(
    State(_state): State<Arc<ApiState>>,
    Path(_id): Path<u64>,
) -> ApiResult<StatusCode> {
    // TODO: Implement transaction commit
    Ok(StatusCode::OK)
}

/// Rollback a transaction
#[utoipa::path(
    post,
    path = "/api/v1/transactions/{id}/rollback",
    tag = "database",
    params(
        ("id" = u64, Path, description = "Transaction ID")
    ),
    responses(
        (status = 200, description = "Transaction rolled back"),
        (status = 404, description = "Transaction not found", body = ApiError),
    )
)]
pub async fn rollback_transaction(
    State(_state): State<Arc<ApiState>>,
    Path(_id): Path<u64>,
) -> ApiResult<StatusCode> {
    // TODO: Implement transaction rollback
    Ok(StatusCode::OK)
}

