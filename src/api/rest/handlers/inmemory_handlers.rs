// In-Memory Operations API Handlers
//
// REST API endpoints for in-memory column store operations including:
// - In-memory area enablement
// - Population management
// - Memory statistics
// - Cache management

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::rest::types::{ApiState, ApiError, ApiResult};
use crate::inmemory::{
    InMemoryStore, InMemoryConfig, ColumnMetadata,
    PopulationStrategy, PopulationPriority,
};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EnableInMemoryRequest {
    pub table: String,
    pub columns: Option<Vec<String>>,
    pub priority: Option<String>, // high, medium, low
    pub compression: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EnableInMemoryResponse {
    pub table: String,
    pub status: String,
    pub population_started: bool,
    pub estimated_size_bytes: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InMemoryStatusResponse {
    pub enabled: bool,
    pub total_memory_bytes: u64,
    pub used_memory_bytes: u64,
    pub memory_utilization_percent: f64,
    pub tables: Vec<InMemoryTableInfo>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InMemoryTableInfo {
    pub table_name: String,
    pub memory_bytes: u64,
    pub row_count: u64,
    pub compression_ratio: f64,
    pub population_status: String,
    pub last_accessed: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PopulateRequest {
    pub table: String,
    pub force: Option<bool>,
    pub strategy: Option<String>, // full, incremental
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PopulateResponse {
    pub table: String,
    pub status: String,
    pub rows_populated: u64,
    pub duration_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EvictRequest {
    pub table: Option<String>,
    pub threshold_percent: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EvictResponse {
    pub tables_evicted: Vec<String>,
    pub memory_freed_bytes: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InMemoryStatsResponse {
    pub total_stores: usize,
    pub total_memory_bytes: u64,
    pub max_memory_bytes: u64,
    pub memory_pressure: f64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_hit_ratio: f64,
    pub population_queue_size: usize,
}

// ============================================================================
// Handler Functions
// ============================================================================

// Global in-memory store instance
lazy_static::lazy_static! {
    static ref INMEMORY_STORE: parking_lot::RwLock<InMemoryStore> =
        parking_lot::RwLock::new(InMemoryStore::new(InMemoryConfig::default()));
}

/// Enable in-memory storage for a table
#[utoipa::path(
    post,
    path = "/api/v1/inmemory/enable",
    request_body = EnableInMemoryRequest,
    responses(
        (status = 200, description = "In-memory enabled", body = EnableInMemoryResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    ),
    tag = "inmemory"
)]
pub async fn enable_inmemory(
    State(_state): State<Arc<ApiState>>,
    Json(request): Json<EnableInMemoryRequest>,
) -> ApiResult<Json<EnableInMemoryResponse>> {
    let store = INMEMORY_STORE.read();

    // In a real implementation, would:
    // 1. Create column store for the table
    // 2. Schedule population
    // 3. Return status

    // Mock column metadata
    let columns = if let Some(cols) = request.columns {
        cols.iter().enumerate().map(|(i, name)| {
            ColumnMetadata {
                name: name.clone(),
                data_type: "VARCHAR".to_string(),
                nullable: true,
                index: i,
            }
        }).collect()
    } else {
        Vec::new()
    };

    // Create column store
    let column_store = store.create_column_store(request.table.clone(), columns);

    Ok(Json(EnableInMemoryResponse {
        table: request.table,
        status: "enabled".to_string(),
        population_started: true,
        estimated_size_bytes: 0,
    }))
}

/// Disable in-memory storage for a table
#[utoipa::path(
    post,
    path = "/api/v1/inmemory/disable",
    params(
        ("table" = String, Query(description = "Table name"))
    ),
    responses(
        (status = 200, description = "In-memory disabled"),
        (status = 404, description = "Table not found", body = ApiError),
    ),
    tag = "inmemory"
)]
pub async fn disable_inmemory(
    State(_state): State<Arc<ApiState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<StatusCode> {
    let table = params.get("table")
        .ok_or_else(|| ApiError::new("MISSING_PARAMETER", "Missing table parameter"))?;

    // In a real implementation, would disable and evict the table from memory

    Ok(StatusCode::OK)
}

/// Get in-memory status
#[utoipa::path(
    get,
    path = "/api/v1/inmemory/status",
    responses(
        (status = 200, description = "In-memory status", body = InMemoryStatusResponse),
    ),
    tag = "inmemory"
)]
pub async fn inmemory_status(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<Json<InMemoryStatusResponse>> {
    let store = INMEMORY_STORE.read();

    let stats = store.stats();

    // Build table info list
    let tables = Vec::new(); // Would query actual table info

    Ok(Json(InMemoryStatusResponse {
        enabled: true,
        total_memory_bytes: stats.max_memory as u64,
        used_memory_bytes: stats.total_memory as u64,
        memory_utilization_percent: stats.memory_pressure * 100.0,
        tables,
    }))
}

/// Get in-memory statistics
#[utoipa::path(
    get,
    path = "/api/v1/inmemory/stats",
    responses(
        (status = 200, description = "In-memory statistics", body = InMemoryStatsResponse),
    ),
    tag = "inmemory"
)]
pub async fn inmemory_stats(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<Json<InMemoryStatsResponse>> {
    let store = INMEMORY_STORE.read();

    let stats = store.stats();

    Ok(Json(InMemoryStatsResponse {
        total_stores: stats.total_stores,
        total_memory_bytes: stats.total_memory as u64,
        max_memory_bytes: stats.max_memory as u64,
        memory_pressure: stats.memory_pressure,
        cache_hits: 0, // Would track actual cache hits
        cache_misses: 0,
        cache_hit_ratio: 0.0,
        population_queue_size: 0,
    }))
}

/// Populate a table into memory
#[utoipa::path(
    post,
    path = "/api/v1/inmemory/populate",
    request_body = PopulateRequest,
    responses(
        (status = 200, description = "Table populated", body = PopulateResponse),
        (status = 404, description = "Table not found", body = ApiError),
    ),
    tag = "inmemory"
)]
pub async fn populate_table(
    State(_state): State<Arc<ApiState>>,
    Json(request): Json<PopulateRequest>,
) -> ApiResult<Json<PopulateResponse>> {
    let start = std::time::Instant::now();

    // In a real implementation, would:
    // 1. Load data from disk into column store
    // 2. Apply compression
    // 3. Update statistics

    let duration_ms = start.elapsed().as_millis() as u64;

    Ok(Json(PopulateResponse {
        table: request.table,
        status: "populated".to_string(),
        rows_populated: 0,
        duration_ms,
    }))
}

/// Evict tables from memory
#[utoipa::path(
    post,
    path = "/api/v1/inmemory/evict",
    request_body = EvictRequest,
    responses(
        (status = 200, description = "Tables evicted", body = EvictResponse),
    ),
    tag = "inmemory"
)]
pub async fn evict_tables(
    State(_state): State<Arc<ApiState>>,
    Json(request): Json<EvictRequest>,
) -> ApiResult<Json<EvictResponse>> {
    let store = INMEMORY_STORE.read();

    // If specific table requested, evict it
    // Otherwise, evict based on memory pressure threshold

    if let Some(table) = request.table {
        // Evict specific table
        if let Some(column_store) = store.get_column_store(&table) {
            // column_store.evict();
        }
    } else {
        // Evict tables based on LRU and memory pressure
        store.evict_if_needed();
    }

    Ok(Json(EvictResponse {
        tables_evicted: Vec::new(),
        memory_freed_bytes: 0,
    }))
}

/// Get table population status
#[utoipa::path(
    get,
    path = "/api/v1/inmemory/tables/{table}/status",
    params(
        ("table" = String, Path, description = "Table name")
    ),
    responses(
        (status = 200, description = "Table status", body = InMemoryTableInfo),
        (status = 404, description = "Table not found", body = ApiError),
    ),
    tag = "inmemory"
)]
pub async fn get_table_status(
    State(_state): State<Arc<ApiState>>,
    Path(table): Path<String>,
) -> ApiResult<Json<InMemoryTableInfo>> {
    let store = INMEMORY_STORE.read();

    let column_store = store.get_column_store(&table)
        .ok_or_else(|| ApiError::new("NOT_FOUND", format!("Table '{}' not found in memory", table)))?;

    Ok(Json(InMemoryTableInfo {
        table_name: table,
        memory_bytes: column_store.memory_usage() as u64,
        row_count: 0,
        compression_ratio: 1.0,
        population_status: "populated".to_string(),
        last_accessed: chrono::Utc::now().timestamp(),
    }))
}

/// Force memory compaction
#[utoipa::path(
    post,
    path = "/api/v1/inmemory/compact",
    responses(
        (status = 200, description = "Compaction started"),
    ),
    tag = "inmemory"
)]
pub async fn compact_memory(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<StatusCode> {
    // In a real implementation, would:
    // 1. Trigger compression on all column stores
    // 2. Reclaim unused memory
    // 3. Defragment memory

    Ok(StatusCode::OK)
}

/// Set in-memory configuration
#[utoipa::path(
    put,
    path = "/api/v1/inmemory/config",
    responses(
        (status = 200, description = "Configuration updated"),
    ),
    tag = "inmemory"
)]
pub async fn update_inmemory_config(
    State(_state): State<Arc<ApiState>>,
    Json(config): Json<serde_json::Value>,
) -> ApiResult<StatusCode> {
    // Update in-memory configuration parameters
    // e.g., max_memory, auto_populate, compression settings

    Ok(StatusCode::OK)
}

/// Get in-memory configuration
#[utoipa::path(
    get,
    path = "/api/v1/inmemory/config",
    responses(
        (status = 200, description = "Configuration retrieved"),
    ),
    tag = "inmemory"
)]
pub async fn get_inmemory_config(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<Json<serde_json::Value>> {
    let config = serde_json::json!({
        "max_memory_bytes": 4 * 1024 * 1024 * 1024u64,
        "auto_populate": true,
        "enable_compression": true,
        "vector_width": 8,
        "cache_line_size": 64,
    });

    Ok(Json(config))
}
