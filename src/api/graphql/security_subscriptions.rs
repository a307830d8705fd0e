// GraphQL Security Subscriptions
//
// Real-time subscriptions for security events including authentication,
// authorization, audit, encryption, rate limiting, and threat detection.

use async_graphql::{Context, Enum, Object, SimpleObject, Subscription, ID};
use futures_util::stream::Stream;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use super::types::DateTime;

// ============================================================================
// Security Event Types for GraphQL
// ============================================================================

/// Authentication event subscription
#[derive(Clone, Debug, SimpleObject)]
pub struct AuthenticationEvent {
    pub event_id: ID,
    pub action: AuthAction,
    pub username: String,
    pub session_id: Option<String>,
    pub success: bool,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub mfa_required: bool,
    pub mfa_verified: bool,
    pub failure_reason: Option<String>,
    pub timestamp: DateTime,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum AuthAction {
    Login,
    Logout,
    PasswordChange,
    MfaChallenge,
    MfaVerify,
    AccountLocked,
    AccountUnlocked,
    SessionExpired,
    SessionRefreshed,
}

/// Authorization event subscription
#[derive(Clone, Debug, SimpleObject)]
pub struct AuthorizationEvent {
    pub event_id: ID,
    pub action: AuthzAction,
    pub username: String,
    pub session_id: Option<String>,
    pub resource: String,
    pub resource_type: String,
    pub permission: String,
    pub granted: bool,
    pub reason: Option<String>,
    pub role_id: Option<String>,
    pub timestamp: DateTime,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum AuthzAction {
    PermissionCheck,
    PermissionDenied,
    RoleAssigned,
    RoleRevoked,
    PrivilegeGranted,
    PrivilegeRevoked,
    PolicyEvaluated,
    AccessDenied,
}

/// Audit log event subscription
#[derive(Clone, Debug)]
pub struct AuditLogEvent {
    pub id: ID,
    pub username: String,
    pub session_id: Option<String>,
    pub action: String,
    pub object_name: Option<String>,
    pub object_type: Option<String>,
    pub sql_text: Option<String>,
    pub success: bool,
    pub severity: AuditSeverity,
    pub rows_affected: Option<i64>,
    pub execution_time_ms: Option<i64>,
    pub client_ip: Option<String>,
    pub error_message: Option<String>,
    pub timestamp: DateTime,
}

#[Object]
impl AuditLogEvent {
    async fn id(&self) -> &ID {
        &self.id
    }

    async fn username(&self) -> &str {
        &self.username
    }

    async fn session_id(&self) -> &Option<String> {
        &self.session_id
    }

    async fn action(&self) -> &str {
        &self.action
    }

    async fn object_name(&self) -> &Option<String> {
        &self.object_name
    }

    async fn object_type(&self) -> &Option<String> {
        &self.object_type
    }

    async fn sql_text(&self) -> &Option<String> {
        &self.sql_text
    }

    async fn success(&self) -> bool {
        self.success
    }

    async fn severity(&self) -> AuditSeverity {
        self.severity
    }

    async fn rows_affected(&self) -> &Option<i64> {
        &self.rows_affected
    }

    async fn execution_time_ms(&self) -> &Option<i64> {
        &self.execution_time_ms
    }

    async fn client_ip(&self) -> &Option<String> {
        &self.client_ip
    }

    async fn error_message(&self) -> &Option<String> {
        &self.error_message
    }

    async fn timestamp(&self) -> &DateTime {
        &self.timestamp
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum AuditSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// Encryption event subscription
#[derive(Clone, Debug, SimpleObject)]
pub struct EncryptionEvent {
    pub event_id: ID,
    pub action: EncryptionAction,
    pub key_id: Option<String>,
    pub key_type: Option<String>,
    pub algorithm: Option<String>,
    pub target: Option<String>,
    pub target_type: Option<String>,
    pub rotation_progress: Option<i32>,
    pub success: bool,
    pub message: Option<String>,
    pub timestamp: DateTime,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum EncryptionAction {
    KeyGenerated,
    KeyRotationStarted,
    KeyRotationProgress,
    KeyRotationCompleted,
    KeyRotationFailed,
    KeyExpired,
    KeyDestroyed,
    EncryptionEnabled,
    EncryptionDisabled,
    TdeEnabled,
    TdeDisabled,
}

/// Rate limit event subscription
#[derive(Clone, Debug, SimpleObject)]
pub struct RateLimitEvent {
    pub event_id: ID,
    pub source_ip: String,
    pub user_id: Option<String>,
    pub limit_type: String,
    pub limit_value: i64,
    pub current_rate: i64,
    pub blocked: bool,
    pub adaptive_multiplier: Option<f64>,
    pub reputation_score: Option<i32>,
    pub ddos_suspected: bool,
    pub timestamp: DateTime,
}

/// Insider threat event subscription
#[derive(Clone, Debug)]
pub struct InsiderThreatEvent {
    pub threat_id: ID,
    pub user_id: String,
    pub threat_type: ThreatType,
    pub threat_level: ThreatLevel,
    pub risk_score: i32,
    pub query_text: Option<String>,
    pub tables_accessed: Vec<String>,
    pub rows_affected: i64,
    pub anomalies_detected: Vec<String>,
    pub action_taken: String,
    pub client_ip: Option<String>,
    pub location: Option<String>,
    pub timestamp: DateTime,
}

#[Object]
impl InsiderThreatEvent {
    async fn threat_id(&self) -> &ID {
        &self.threat_id
    }

    async fn user_id(&self) -> &str {
        &self.user_id
    }

    async fn threat_type(&self) -> ThreatType {
        self.threat_type
    }

    async fn threat_level(&self) -> ThreatLevel {
        self.threat_level
    }

    async fn risk_score(&self) -> i32 {
        self.risk_score
    }

    async fn query_text(&self) -> &Option<String> {
        &self.query_text
    }

    async fn tables_accessed(&self) -> &[String] {
        &self.tables_accessed
    }

    async fn rows_affected(&self) -> i64 {
        self.rows_affected
    }

    async fn anomalies_detected(&self) -> &[String] {
        &self.anomalies_detected
    }

    async fn action_taken(&self) -> &str {
        &self.action_taken
    }

    async fn client_ip(&self) -> &Option<String> {
        &self.client_ip
    }

    async fn location(&self) -> &Option<String> {
        &self.location
    }

    async fn timestamp(&self) -> &DateTime {
        &self.timestamp
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum ThreatType {
    DataExfiltration,
    PrivilegeEscalation,
    AnomalousQuery,
    UnusualAccess,
    SuspiciousPattern,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Memory hardening event subscription
#[derive(Clone, Debug, SimpleObject)]
pub struct MemoryHardeningEvent {
    pub event_id: ID,
    pub event_type: MemoryEventType,
    pub severity: AuditSeverity,
    pub buffer_id: Option<String>,
    pub address: Option<String>,
    pub size: Option<i64>,
    pub canary_value: Option<String>,
    pub expected_value: Option<String>,
    pub action_taken: String,
    pub timestamp: DateTime,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum MemoryEventType {
    CanaryViolation,
    BufferOverflow,
    UseAfterFree,
    DoubleFree,
    MemoryLeak,
    InvalidAccess,
}

/// Circuit breaker event subscription
#[derive(Clone, Debug, SimpleObject)]
pub struct CircuitBreakerEvent {
    pub event_id: ID,
    pub circuit_id: String,
    pub old_state: CircuitState,
    pub new_state: CircuitState,
    pub failure_count: i32,
    pub success_count: i32,
    pub error_rate: f64,
    pub half_open_successes: Option<i32>,
    pub reason: String,
    pub timestamp: DateTime,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Security metrics snapshot subscription
#[derive(Clone, Debug, SimpleObject)]
pub struct SecurityMetrics {
    pub active_sessions: i32,
    pub total_users: i32,
    pub failed_logins_last_hour: i32,
    pub active_threats: i32,
    pub critical_threats: i32,
    pub rate_limit_violations: i32,
    pub audit_events_per_second: f64,
    pub encryption_operations_per_second: f64,
    pub avg_authentication_time_ms: f64,
    pub timestamp: DateTime,
}

/// Security posture score subscription
#[derive(Clone, Debug, SimpleObject)]
pub struct SecurityPosture {
    pub overall_score: i32,
    pub authentication_score: i32,
    pub authorization_score: i32,
    pub encryption_score: i32,
    pub audit_coverage: f64,
    pub threat_detection_status: String,
    pub compliance_level: String,
    pub recommendations: Vec<String>,
    pub timestamp: DateTime,
}

// ============================================================================
// Security Subscription Root
// ============================================================================

/// Security subscription operations
pub struct SecuritySubscriptionRoot;

#[Subscription]
impl SecuritySubscriptionRoot {
    /// Subscribe to authentication events
    async fn authentication_events<'ctx>(
        &self,
        filter_username: Option<String>,
        filter_actions: Option<Vec<AuthAction>>,
    ) -> impl Stream<Item = AuthenticationEvent> + 'ctx {
        let (tx, rx) = broadcast::channel(1000);

        // In production: register subscription with authentication manager
        // For now, simulate events
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(5));
            loop {
                interval.tick().await;
                let event = create_sample_auth_event();
                let _ = tx.send(event);
            }
        });

        let filter_username = filter_username.clone();
        let filter_actions = filter_actions.clone();
        BroadcastStream::new(rx).filter_map(move |result| {
            let filter_username = filter_username.clone();
            let filter_actions = filter_actions.clone();
            async move {
                result.ok().and_then(|event| {
                    // Apply filters
                    if let Some(ref username) = filter_username {
                        if &event.username != username {
                            return None;
                        }
                    }
                    if let Some(ref actions) = filter_actions {
                        if !actions.contains(&event.action) {
                            return None;
                        }
                    }
                    Some(event)
                })
            }
        })
    }

    /// Subscribe to authorization events
    async fn authorization_events<'ctx>(
        &self,
        filter_username: Option<String>,
        filter_resource: Option<String>,
    ) -> impl Stream<Item = AuthorizationEvent> + 'ctx {
        let (tx, rx) = broadcast::channel(1000);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(5));
            loop {
                interval.tick().await;
                let event = create_sample_authz_event();
                let _ = tx.send(event);
            }
        });

        let filter_username = filter_username.clone();
        let filter_resource = filter_resource.clone();
        BroadcastStream::new(rx).filter_map(move |result| {
            let filter_username = filter_username.clone();
            let filter_resource = filter_resource.clone();
            async move {
                result.ok().and_then(|event| {
                    if let Some(ref username) = filter_username {
                        if &event.username != username {
                            return None;
                        }
                    }
                    if let Some(ref resource) = filter_resource {
                        if &event.resource != resource {
                            return None;
                        }
                    }
                    Some(event)
                })
            }
        })
    }

    /// Subscribe to audit log stream
    async fn audit_log_stream<'ctx>(
        &self,
        filter_username: Option<String>,
        filter_severity: Option<AuditSeverity>,
        filter_actions: Option<Vec<String>>,
    ) -> impl Stream<Item = AuditLogEvent> + 'ctx {
        let (tx, rx) = broadcast::channel(1000);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(2));
            loop {
                interval.tick().await;
                let event = create_sample_audit_event();
                let _ = tx.send(event);
            }
        });

        let filter_username = filter_username.clone();
        let filter_severity = filter_severity.clone();
        let filter_actions = filter_actions.clone();
        BroadcastStream::new(rx).filter_map(move |result| {
            let filter_username = filter_username.clone();
            let filter_severity = filter_severity.clone();
            let filter_actions = filter_actions.clone();
            async move {
                result.ok().and_then(|event| {
                    if let Some(ref username) = filter_username {
                        if &event.username != username {
                            return None;
                        }
                    }
                    if let Some(severity) = filter_severity {
                        if event.severity as u8 > severity as u8 {
                            return None;
                        }
                    }
                    if let Some(ref actions) = filter_actions {
                        if !actions.contains(&event.action) {
                            return None;
                        }
                    }
                    Some(event)
                })
            }
        })
    }

    /// Subscribe to encryption events
    async fn encryption_events<'ctx>(
        &self,
        filter_actions: Option<Vec<EncryptionAction>>,
    ) -> impl Stream<Item = EncryptionEvent> + 'ctx {
        let (tx, rx) = broadcast::channel(100);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(10));
            loop {
                interval.tick().await;
                let event = create_sample_encryption_event();
                let _ = tx.send(event);
            }
        });

        let filter_actions = filter_actions.clone();
        BroadcastStream::new(rx).filter_map(move |result| {
            let filter_actions = filter_actions.clone();
            async move {
                result.ok().and_then(|event| {
                    if let Some(ref actions) = filter_actions {
                        if !actions.contains(&event.action) {
                            return None;
                        }
                    }
                    Some(event)
                })
            }
        })
    }

    /// Subscribe to rate limiting events
    async fn rate_limit_events<'ctx>(
        &self,
        filter_source_ip: Option<String>,
        only_blocked: Option<bool>,
    ) -> impl Stream<Item = RateLimitEvent> + 'ctx {
        let (tx, rx) = broadcast::channel(1000);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(3));
            loop {
                interval.tick().await;
                let event = create_sample_rate_limit_event();
                let _ = tx.send(event);
            }
        });

        let filter_source_ip = filter_source_ip.clone();
        BroadcastStream::new(rx).filter_map(move |result| {
            let filter_source_ip = filter_source_ip.clone();
            async move {
                result.ok().and_then(|event| {
                    if let Some(ref ip) = filter_source_ip {
                        if &event.source_ip != ip {
                            return None;
                        }
                    }
                    if let Some(true) = only_blocked {
                        if !event.blocked {
                            return None;
                        }
                    }
                    Some(event)
                })
            }
        })
    }

    /// Subscribe to insider threat alerts
    async fn insider_threat_alerts<'ctx>(
        &self,
        min_threat_level: Option<ThreatLevel>,
        filter_user_id: Option<String>,
    ) -> impl Stream<Item = InsiderThreatEvent> + 'ctx {
        let (tx, rx) = broadcast::channel(100);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(15));
            loop {
                interval.tick().await;
                let event = create_sample_threat_event();
                let _ = tx.send(event);
            }
        });

        let filter_user_id = filter_user_id.clone();
        BroadcastStream::new(rx).filter_map(move |result| {
            let filter_user_id = filter_user_id.clone();
            async move {
                result.ok().and_then(|event| {
                    if let Some(min_level) = min_threat_level {
                        if (event.threat_level as u8) < (min_level as u8) {
                            return None;
                        }
                    }
                    if let Some(ref user_id) = filter_user_id {
                        if &event.user_id != user_id {
                            return None;
                        }
                    }
                    Some(event)
                })
            }
        })
    }

    /// Subscribe to memory hardening events
    async fn memory_hardening_events<'ctx>(
        &self,
        filter_event_types: Option<Vec<MemoryEventType>>,
    ) -> impl Stream<Item = MemoryHardeningEvent> + 'ctx {
        let (tx, rx) = broadcast::channel(100);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(20));
            loop {
                interval.tick().await;
                let event = create_sample_memory_event();
                let _ = tx.send(event);
            }
        });

        let filter_event_types = filter_event_types.clone();
        BroadcastStream::new(rx).filter_map(move |result| {
            let filter_event_types = filter_event_types.clone();
            async move {
                result.ok().and_then(|event| {
                    if let Some(ref types) = filter_event_types {
                        if !types.contains(&event.event_type) {
                            return None;
                        }
                    }
                    Some(event)
                })
            }
        })
    }

    /// Subscribe to circuit breaker events
    async fn circuit_breaker_events<'ctx>(
        &self,
        filter_circuit_id: Option<String>,
    ) -> impl Stream<Item = CircuitBreakerEvent> + 'ctx {
        let (tx, rx) = broadcast::channel(100);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(30));
            loop {
                interval.tick().await;
                let event = create_sample_circuit_event();
                let _ = tx.send(event);
            }
        });

        let filter_circuit_id = filter_circuit_id.clone();
        BroadcastStream::new(rx).filter_map(move |result| {
            let filter_circuit_id = filter_circuit_id.clone();
            async move {
                result.ok().and_then(|event| {
                    if let Some(ref circuit_id) = filter_circuit_id {
                        if &event.circuit_id != circuit_id {
                            return None;
                        }
                    }
                    Some(event)
                })
            }
        })
    }

    /// Subscribe to security metrics updates
    async fn security_metrics<'ctx>(
        &self,
        interval_seconds: Option<i32>,
    ) -> impl Stream<Item = SecurityMetrics> + 'ctx {
        let interval = Duration::from_secs(interval_seconds.unwrap_or(5) as u64);

        async_stream::stream! {
            let mut interval_timer = tokio::time::interval(interval);
            loop {
                interval_timer.tick().await;
                yield SecurityMetrics {
                    active_sessions: 42,
                    total_users: 150,
                    failed_logins_last_hour: 7,
                    active_threats: 3,
                    critical_threats: 0,
                    rate_limit_violations: 12,
                    audit_events_per_second: 45.5,
                    encryption_operations_per_second: 12.3,
                    avg_authentication_time_ms: 125.5,
                    timestamp: DateTime::now(),
                };
            }
        }
    }

    /// Subscribe to security posture updates
    async fn security_posture<'ctx>(
        &self,
        interval_seconds: Option<i32>,
    ) -> impl Stream<Item = SecurityPosture> + 'ctx {
        let interval = Duration::from_secs(interval_seconds.unwrap_or(60) as u64);

        async_stream::stream! {
            let mut interval_timer = tokio::time::interval(interval);
            loop {
                interval_timer.tick().await;
                yield SecurityPosture {
                    overall_score: 85,
                    authentication_score: 90,
                    authorization_score: 88,
                    encryption_score: 82,
                    audit_coverage: 95.5,
                    threat_detection_status: "Active".to_string(),
                    compliance_level: "High".to_string(),
                    recommendations: vec![
                        "Enable MFA for all administrative accounts".to_string(),
                        "Review encryption key rotation policy".to_string(),
                    ],
                    timestamp: DateTime::now(),
                };
            }
        }
    }
}

// ============================================================================
// Sample Event Generators
// ============================================================================

fn create_sample_auth_event() -> AuthenticationEvent {
    AuthenticationEvent {
        event_id: ID::from("auth_event_001"),
        action: AuthAction::Login,
        username: "alice@example.com".to_string(),
        session_id: Some("sess_abc123".to_string()),
        success: true,
        client_ip: Some("192.168.1.100".to_string()),
        user_agent: Some("Mozilla/5.0".to_string()),
        mfa_required: true,
        mfa_verified: true,
        failure_reason: None,
        timestamp: DateTime::now(),
    }
}

fn create_sample_authz_event() -> AuthorizationEvent {
    AuthorizationEvent {
        event_id: ID::from("authz_event_001"),
        action: AuthzAction::PermissionCheck,
        username: "bob@example.com".to_string(),
        session_id: Some("sess_xyz789".to_string()),
        resource: "customers".to_string(),
        resource_type: "TABLE".to_string(),
        permission: "SELECT".to_string(),
        granted: true,
        reason: None,
        role_id: Some("role_viewer".to_string()),
        timestamp: DateTime::now(),
    }
}

fn create_sample_audit_event() -> AuditLogEvent {
    AuditLogEvent {
        id: ID::from("audit_12345"),
        username: "alice@example.com".to_string(),
        session_id: Some("sess_abc123".to_string()),
        action: "SELECT".to_string(),
        object_name: Some("customers".to_string()),
        object_type: Some("TABLE".to_string()),
        sql_text: Some("SELECT * FROM customers WHERE active = true LIMIT 100".to_string()),
        success: true,
        severity: AuditSeverity::Info,
        rows_affected: Some(42),
        execution_time_ms: Some(125),
        client_ip: Some("192.168.1.100".to_string()),
        error_message: None,
        timestamp: DateTime::now(),
    }
}

fn create_sample_encryption_event() -> EncryptionEvent {
    EncryptionEvent {
        event_id: ID::from("enc_event_001"),
        action: EncryptionAction::KeyRotationProgress,
        key_id: Some("key_abc123".to_string()),
        key_type: Some("TableEncryption".to_string()),
        algorithm: Some("AES256-GCM".to_string()),
        target: Some("users_table".to_string()),
        target_type: Some("TABLE".to_string()),
        rotation_progress: Some(45),
        success: true,
        message: Some("Key rotation 45% complete".to_string()),
        timestamp: DateTime::now(),
    }
}

fn create_sample_rate_limit_event() -> RateLimitEvent {
    RateLimitEvent {
        event_id: ID::from("rate_event_001"),
        source_ip: "192.168.1.200".to_string(),
        user_id: Some("user_charlie".to_string()),
        limit_type: "per_ip".to_string(),
        limit_value: 1000,
        current_rate: 1250,
        blocked: true,
        adaptive_multiplier: Some(0.8),
        reputation_score: Some(35),
        ddos_suspected: false,
        timestamp: DateTime::now(),
    }
}

fn create_sample_threat_event() -> InsiderThreatEvent {
    InsiderThreatEvent {
        threat_id: ID::from("threat_xyz789"),
        user_id: "user_bob".to_string(),
        threat_type: ThreatType::DataExfiltration,
        threat_level: ThreatLevel::High,
        risk_score: 75,
        query_text: Some("SELECT * FROM sensitive_data".to_string()),
        tables_accessed: vec!["sensitive_data".to_string(), "pii_records".to_string()],
        rows_affected: 50000,
        anomalies_detected: vec![
            "Unusual data volume".to_string(),
            "Off-hours access".to_string(),
        ],
        action_taken: "ALERT_GENERATED".to_string(),
        client_ip: Some("10.0.0.50".to_string()),
        location: Some("Unknown".to_string()),
        timestamp: DateTime::now(),
    }
}

fn create_sample_memory_event() -> MemoryHardeningEvent {
    MemoryHardeningEvent {
        event_id: ID::from("mem_event_001"),
        event_type: MemoryEventType::CanaryViolation,
        severity: AuditSeverity::Warning,
        buffer_id: Some("buf_12345".to_string()),
        address: Some("0x7ffe12345678".to_string()),
        size: Some(4096),
        canary_value: Some("0xDEADBEEF12345678".to_string()),
        expected_value: Some("0xCAFEBABE87654321".to_string()),
        action_taken: "Buffer freed and logged".to_string(),
        timestamp: DateTime::now(),
    }
}

fn create_sample_circuit_event() -> CircuitBreakerEvent {
    CircuitBreakerEvent {
        event_id: ID::from("circuit_event_001"),
        circuit_id: "db_connection_pool".to_string(),
        old_state: CircuitState::Closed,
        new_state: CircuitState::HalfOpen,
        failure_count: 5,
        success_count: 95,
        error_rate: 5.0,
        half_open_successes: Some(0),
        reason: "Error threshold exceeded".to_string(),
        timestamp: DateTime::now(),
    }
}
