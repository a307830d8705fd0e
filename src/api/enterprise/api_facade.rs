// Enterprise Integration Module
//
// Part of the Enterprise Integration Layer for RustyDB

use crate::api::{CorrelationId, RateLimitConfig};
use crate::error::DbError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant, SystemTime};

// ============================================================================
// SECTION 4: API FACADE LAYER (700+ lines)
// ============================================================================

// Unified API request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiedApiRequest {
    pub request_id: String,
    pub correlation_id: CorrelationId,
    pub api_version: String,
    pub endpoint: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
    pub query_params: HashMap<String, String>,
    pub timestamp: SystemTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

// Unified API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiedApiResponse {
    pub request_id: String,
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
    pub duration: Duration,
    pub timestamp: SystemTime,
}

// Request router
pub struct RequestRouter {
    routes: Arc<RwLock<HashMap<String, Box<dyn RouteHandler>>>>,
    middleware: Arc<RwLock<Vec<Box<dyn Middleware>>>>,
}

pub trait RouteHandler: Send + Sync {
    fn handle(&self, request: UnifiedApiRequest) -> Result<UnifiedApiResponse, DbError>;
}

pub trait Middleware: Send + Sync {
    fn process(&self, request: &mut UnifiedApiRequest) -> Result<(), DbError>;
}

impl RequestRouter {
    pub fn new() -> Self {
        Self {
            routes: Arc::new(RwLock::new(HashMap::new())),
            middleware: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn register_route(&self, path: &str, handler: Box<dyn RouteHandler>) {
        let mut routes = self.routes.write().unwrap();
        routes.insert(path.to_string(), handler);
    }

    pub fn register_middleware(&self, middleware: Box<dyn Middleware>) {
        let mut mw = self.middleware.write().unwrap();
        mw.push(middleware);
    }

    pub fn route(&self, mut request: UnifiedApiRequest) -> Result<UnifiedApiResponse, DbError> {
        // Apply middleware
        {
            let middleware = self.middleware.read().unwrap();
            for mw in middleware.iter() {
                mw.process(&mut request)?;
            }
        }

        // Find and execute handler
        let routes = self.routes.read().unwrap();
        if let Some(handler) = routes.get(&request.endpoint) {
            handler.handle(request)
        } else {
            Ok(UnifiedApiResponse {
                request_id: request.request_id,
                status_code: 404,
                headers: HashMap::new(),
                body: Some(b"Not Found".to_vec()),
                duration: Duration::from_millis(0),
                timestamp: SystemTime::now(),
            })
        }
    }
}

// Response aggregator
pub struct ResponseAggregator {
    aggregation_strategies: Arc<RwLock<HashMap<String, Box<dyn AggregationStrategy>>>>,
}

pub trait AggregationStrategy: Send + Sync {
    fn aggregate(&self, responses: Vec<UnifiedApiResponse>) -> Result<UnifiedApiResponse, DbError>;
}

impl ResponseAggregator {
    pub fn new() -> Self {
        Self {
            aggregation_strategies: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn register_strategy(&self, name: &str, strategy: Box<dyn AggregationStrategy>) {
        let mut strategies = self.aggregation_strategies.write().unwrap();
        strategies.insert(name.to_string(), strategy);
    }

    pub fn aggregate(
        &self,
        strategy_name: &str,
        responses: Vec<UnifiedApiResponse>,
    ) -> Result<UnifiedApiResponse, DbError> {
        let strategies = self.aggregation_strategies.read().unwrap();
        if let Some(strategy) = strategies.get(strategy_name) {
            strategy.aggregate(responses)
        } else {
            Err(DbError::NotFound(format!(
                "Aggregation strategy not found: {}",
                strategy_name
            )))
        }
    }
}

// Batch request handler
pub struct BatchRequestHandler {
    max_batch_size: usize,
    router: Arc<RequestRouter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub requests: Vec<UnifiedApiRequest>,
    pub atomic: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub responses: Vec<UnifiedApiResponse>,
    pub success_count: usize,
    pub failure_count: usize,
}

impl BatchRequestHandler {
    pub fn new(max_batch_size: usize, router: Arc<RequestRouter>) -> Self {
        Self {
            max_batch_size,
            router,
        }
    }

    pub async fn handle_batch(&self, batch: BatchRequest) -> Result<BatchResponse, DbError> {
        if batch.requests.len() > self.max_batch_size {
            return Err(DbError::InvalidInput(format!(
                "Batch size {} exceeds maximum {}",
                batch.requests.len(),
                self.max_batch_size
            )));
        }

        let mut responses = Vec::new();
        let mut success_count = 0;
        let mut failure_count = 0;

        for request in batch.requests {
            match self.router.route(request) {
                Ok(response) => {
                    if response.status_code < 400 {
                        success_count += 1;
                    } else {
                        failure_count += 1;
                        if batch.atomic {
                            return Err(DbError::Internal("Atomic batch failed".to_string()));
                        }
                    }
                    responses.push(response);
                }
                Err(e) => {
                    failure_count += 1;
                    if batch.atomic {
                        return Err(e);
                    }
                }
            }
        }

        Ok(BatchResponse {
            responses,
            success_count,
            failure_count,
        })
    }
}

// API version manager
pub struct ApiVersionManager {
    versions: Arc<RwLock<HashMap<String, ApiVersion>>>,
    default_version: Arc<RwLock<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiVersion {
    pub version: String,
    pub deprecated: bool,
    pub sunset_date: Option<SystemTime>,
    pub routes: Vec<String>,
}

impl ApiVersionManager {
    pub fn new(default_version: &str) -> Self {
        Self {
            versions: Arc::new(RwLock::new(HashMap::new())),
            default_version: Arc::new(RwLock::new(default_version.to_string())),
        }
    }

    pub fn register_version(&self, version: ApiVersion) {
        let mut versions = self.versions.write().unwrap();
        versions.insert(version.version.clone(), version);
    }

    pub fn get_version(&self, version: &str) -> Option<ApiVersion> {
        let versions = self.versions.read().unwrap();
        versions.get(version).cloned()
    }

    pub fn is_version_supported(&self, version: &str) -> bool {
        let versions = self.versions.read().unwrap();
        if let Some(v) = versions.get(version) {
            !v.deprecated || v.sunset_date.is_none() || v.sunset_date.unwrap() > SystemTime::now()
        } else {
            false
        }
    }

    pub fn get_default_version(&self) -> String {
        let default = self.default_version.read().unwrap();
        default.clone()
    }
}

// Backward compatibility layer
pub struct BackwardCompatibilityLayer {
    transformers: Arc<RwLock<HashMap<String, Box<dyn RequestTransformer>>>>,
}

pub trait RequestTransformer: Send + Sync {
    fn transform(&self, request: &mut UnifiedApiRequest) -> Result<(), DbError>;
}

impl BackwardCompatibilityLayer {
    pub fn new() -> Self {
        Self {
            transformers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn register_transformer(
        &self,
        from_version: &str,
        transformer: Box<dyn RequestTransformer>,
    ) {
        let mut transformers = self.transformers.write().unwrap();
        transformers.insert(from_version.to_string(), transformer);
    }

    pub fn transform_request(&self, request: &mut UnifiedApiRequest) -> Result<(), DbError> {
        let transformers = self.transformers.read().unwrap();
        if let Some(transformer) = transformers.get(&request.api_version) {
            transformer.transform(request)?;
        }
        Ok(())
    }
}

// API gateway coordinator
pub struct ApiGatewayCoordinator {
    router: Arc<RequestRouter>,
    #[allow(dead_code)]
    aggregator: Arc<ResponseAggregator>,
    batch_handler: Arc<BatchRequestHandler>,
    version_manager: Arc<ApiVersionManager>,
    compatibility_layer: Arc<BackwardCompatibilityLayer>,
    rate_limiter: Arc<RateLimiter>,
}

// Rate limiter
pub struct RateLimiter {
    limits: Arc<RwLock<HashMap<String, RateLimit>>>,
    usage: Arc<RwLock<HashMap<String, RateLimitUsage>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimit {
    pub requests_per_second: usize,
    pub burst_size: usize,
}

#[derive(Debug, Clone)]
struct RateLimitUsage {
    tokens: usize,
    last_refill: Instant,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            limits: Arc::new(RwLock::new(HashMap::new())),
            usage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn set_limit(&self, key: &str, limit: RateLimit) {
        let burst_size = limit.burst_size;

        let mut limits = self.limits.write().unwrap();
        limits.insert(key.to_string(), limit);

        let mut usage = self.usage.write().unwrap();
        usage.insert(
            key.to_string(),
            RateLimitUsage {
                tokens: burst_size,
                last_refill: Instant::now(),
            },
        );
    }

    pub fn check_rate_limit(
        &self,
        key: &str,
        _option: Option<&RateLimitConfig>,
    ) -> Result<(), DbError> {
        let limits = self.limits.read().unwrap();
        let limit = limits
            .get(key)
            .ok_or_else(|| DbError::NotFound(format!("Rate limit not found for: {}", key)))?;

        let requests_per_second = limit.requests_per_second;
        let burst_size = limit.burst_size;
        drop(limits);

        let mut usage = self.usage.write().unwrap();
        let usage_entry = usage.get_mut(key).unwrap();

        // Refill tokens based on time elapsed
        let now = Instant::now();
        let elapsed = now.duration_since(usage_entry.last_refill).as_secs_f64();
        let tokens_to_add = (elapsed * requests_per_second as f64) as usize;

        if tokens_to_add > 0 {
            usage_entry.tokens = (usage_entry.tokens + tokens_to_add).min(burst_size);
            usage_entry.last_refill = now;
        }

        // Check if we have tokens available
        if usage_entry.tokens > 0 {
            usage_entry.tokens -= 1;
            Ok(())
        } else {
            Err(DbError::InvalidOperation("Rate limit exceeded".to_string()))
        }
    }
}

impl ApiGatewayCoordinator {
    pub fn new(max_batch_size: usize, default_version: &str) -> Self {
        let router = Arc::new(RequestRouter::new());
        Self {
            batch_handler: Arc::new(BatchRequestHandler::new(max_batch_size, router.clone())),
            router,
            aggregator: Arc::new(ResponseAggregator::new()),
            version_manager: Arc::new(ApiVersionManager::new(default_version)),
            compatibility_layer: Arc::new(BackwardCompatibilityLayer::new()),
            rate_limiter: Arc::new(RateLimiter::new()),
        }
    }

    pub async fn process_request(
        &self,
        mut request: UnifiedApiRequest,
    ) -> Result<UnifiedApiResponse, DbError> {
        // Check rate limit
        let rate_key = format!("{}:{}", request.correlation_id.as_str(), request.endpoint);
        self.rate_limiter.check_rate_limit(&rate_key, None)?;

        // Check version
        if !self
            .version_manager
            .is_version_supported(&request.api_version)
        {
            return Err(DbError::InvalidInput(format!(
                "API version {} is not supported",
                request.api_version
            )));
        }

        // Apply backward compatibility
        self.compatibility_layer.transform_request(&mut request)?;

        // Route request
        self.router.route(request)
    }

    pub async fn process_batch(&self, batch: BatchRequest) -> Result<BatchResponse, DbError> {
        self.batch_handler.handle_batch(batch).await
    }

    pub fn router(&self) -> &Arc<RequestRouter> {
        &self.router
    }

    pub fn version_manager(&self) -> &Arc<ApiVersionManager> {
        &self.version_manager
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }
}
