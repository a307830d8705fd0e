// Monitoring Module
//
// Part of the comprehensive monitoring system for RustyDB

use std::sync::{Arc, Mutex, atomic::{AtomicU64, AtomicBool, Ordering}};
use std::collections::{HashMap, BTreeMap, VecDeque};
use std::time::{Duration, SystemTime, Instant, UNIX_EPOCH};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::DbError;
use super::metrics_core::*;

// SECTION 5: DASHBOARD DATA API (600+ lines)
// ============================================================================

// Time-series data point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp: SystemTime,
    pub value: f64,
    pub labels: BTreeMap<String, String>,
}

// Time-series query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeriesQuery {
    pub metric_name: String,
    pub start_time: SystemTime,
    pub end_time: SystemTime,
    pub step: Duration,
    pub labels: BTreeMap<String, String>,
    pub aggregation: AggregationFunction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationFunction {
    Avg,
    Sum,
    Min,
    Max,
    Count,
    Rate,
    Percentile(u8),
}

// Time-series result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeriesResult {
    pub metric_name: String,
    pub labels: BTreeMap<String, String>,
    pub points: Vec<TimeSeriesPoint>,
}

// Real-time metric stream
pub struct MetricStream {
    subscribers: Arc<RwLock<Vec<Arc<dyn MetricSubscriber>>>>,
}

pub trait MetricSubscriber: Send + Sync {
    fn on_metric(&self, metric_name: &str, value: f64, labels: &BTreeMap<String, String>);
}

impl MetricStream {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn subscribe(&self, subscriber: Arc<dyn MetricSubscriber>) {
        self.subscribers.write().push(subscriber);
    }

    pub fn publish(&self, metric_name: &str, value: f64, labels: &BTreeMap<String, String>) {
        let subscribers = self.subscribers.read();
        for sub in subscribers.iter() {
            sub.on_metric(metric_name, value, labels);
        }
    }
}

impl Default for MetricStream {
    fn default() -> Self {
        Self::new()
    }
}

// Dashboard widget configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardWidget {
    pub id: String,
    pub title: String,
    pub widget_type: WidgetType,
    pub queries: Vec<TimeSeriesQuery>,
    pub refresh_interval: Duration,
    pub position: WidgetPosition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetPosition {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WidgetType {
    LineChart,
    AreaChart,
    BarChart,
    Gauge,
    Counter,
    Table,
    Heatmap,
    Alert,
}

// Custom dashboard definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub id: String,
    pub name: String,
    pub description: String,
    pub widgets: Vec<DashboardWidget>,
    pub tags: Vec<String>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
    pub created_by: String,
}

impl Dashboard {
    pub fn new(id: String, name: String, created_by: String) -> Self {
        Self {
            id,
            name,
            description: String::new(),
            widgets: Vec::new(),
            tags: Vec::new(),
            created_at: SystemTime::now(),
            updated_at: SystemTime::now(),
            created_by,
        }
    }

    pub fn add_widget(&mut self, widget: DashboardWidget) {
        self.widgets.push(widget);
        self.updated_at = SystemTime::now();
    }
}

// Dashboard manager
pub struct DashboardManager {
    dashboards: Arc<RwLock<HashMap<String, Dashboard>>>,
}

impl DashboardManager {
    pub fn new() -> Self {
        Self {
            dashboards: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn create_dashboard(&self, dashboard: Dashboard) -> Result<(), DbError> {
        self.dashboards.write().insert(dashboard.id.clone(), dashboard);
        Ok(())
    }

    pub fn get_dashboard(&self, id: &str) -> Option<Dashboard> {
        self.dashboards.read().get(id).cloned()
    }

    pub fn update_dashboard(&self, dashboard: Dashboard) -> Result<(), DbError> {
        self.dashboards.write().insert(dashboard.id.clone(), dashboard);
        Ok(())
    }

    pub fn delete_dashboard(&self, id: &str) -> Result<(), DbError> {
        self.dashboards.write().remove(id);
        Ok(())
    }

    pub fn list_dashboards(&self) -> Vec<Dashboard> {
        self.dashboards.read().values().cloned().collect()
    }
}

impl Default for DashboardManager {
    fn default() -> Self {
        Self::new()
    }
}

// Time-series database for historical metrics
pub struct TimeSeriesDatabase {
    data: Arc<RwLock<HashMap<String, VecDeque<TimeSeriesPoint>>>>,
    max_points_per_metric: usize,
    retention_period: Duration,
}

impl TimeSeriesDatabase {
    pub fn new(max_points: usize, retention: Duration) -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
            max_points_per_metric: max_points,
            retention_period: retention,
        }
    }

    pub fn insert(&self, metric_name: String, point: TimeSeriesPoint) {
        let mut data = self.data.write();
        let points = data.entry(metric_name).or_insert_with(VecDeque::new);

        points.push_back(point);

        // Limit size
        if points.len() > self.max_points_per_metric {
            points.pop_front();
        }
    }

    pub fn query(&self, query: TimeSeriesQuery) -> TimeSeriesResult {
        let data = self.data.read();
        let points = data.get(&query.metric_name).cloned().unwrap_or_default();

        // Filter by time range
        let filtered: Vec<_> = points.iter()
            .filter(|p| p.timestamp >= query.start_time && p.timestamp <= query.end_time)
            .filter(|p| {
                // Filter by labels
                query.labels.iter().all(|(k, v)| {
                    p.labels.get(k).map(|pv| pv == v).unwrap_or(false)
                })
            })
            .cloned()
            .collect();

        // Apply aggregation if needed
        let aggregated = self.aggregate_points(filtered, query.step, query.aggregation);

        TimeSeriesResult {
            metric_name: query.metric_name.clone(),
            labels: query.labels.clone(),
            points: aggregated,
        }
    }

    fn aggregate_points(
        &self,
        points: Vec<TimeSeriesPoint>,
        step: Duration,
        aggregation: AggregationFunction,
    ) -> Vec<TimeSeriesPoint> {
        if points.is_empty() {
            return Vec::new();
        }

        let mut result = Vec::new();
        let mut current_bucket: Vec<TimeSeriesPoint> = Vec::new();
        let mut bucket_start = points[0].timestamp;

        for point in points {
            if let Ok(elapsed) = point.timestamp.duration_since(bucket_start) {
                if elapsed >= step {
                    // Aggregate current bucket
                    if !current_bucket.is_empty() {
                        let aggregated = self.apply_aggregation(&current_bucket, aggregation);
                        result.push(TimeSeriesPoint {
                            timestamp: bucket_start,
                            value: aggregated,
                            labels: current_bucket[0].labels.clone(),
                        });
                    }

                    // Start new bucket
                    current_bucket.clear();
                    bucket_start = point.timestamp;
                }
            }

            current_bucket.push(point);
        }

        // Handle last bucket
        if !current_bucket.is_empty() {
            let aggregated = self.apply_aggregation(&current_bucket, aggregation);
            result.push(TimeSeriesPoint {
                timestamp: bucket_start,
                value: aggregated,
                labels: current_bucket[0].labels.clone(),
            });
        }

        result
    }

    fn apply_aggregation(
        &self,
        points: &[TimeSeriesPoint],
        function: AggregationFunction,
    ) -> f64 {
        if points.is_empty() {
            return 0.0;
        }

        match function {
            AggregationFunction::Avg => {
                points.iter().map(|p| p.value).sum::<f64>() / points.len() as f64
            }
            AggregationFunction::Sum => {
                points.iter().map(|p| p.value).sum()
            }
            AggregationFunction::Min => {
                points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min)
            }
            AggregationFunction::Max => {
                points.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max)
            }
            AggregationFunction::Count => {
                points.len() as f64
            }
            AggregationFunction::Rate => {
                if points.len() < 2 {
                    return 0.0;
                }
                let first = &points[0];
                let last = &points[points.len() - 1];
                let value_delta = last.value - first.value;
                if let Ok(time_delta) = last.timestamp.duration_since(first.timestamp) {
                    value_delta / time_delta.as_secs_f64()
                } else {
                    0.0
                }
            }
            AggregationFunction::Percentile(p) => {
                let mut values: Vec<f64> = points.iter().map(|p| p.value).collect();
                values.sort_by(|a, b| a.partial_cmp(b).unwrap());
                let index = ((values.len() - 1) as f64 * (p as f64 / 100.0)) as usize;
                values[index]
            }
        }
    }

    pub fn cleanup_old_data(&self) {
        let cutoff = SystemTime::now() - self.retention_period;
        let mut data = self.data.write();

        for points in data.values_mut() {
            while let Some(front) = points.front() {
                if front.timestamp < cutoff {
                    points.pop_front();
                } else {
                    break;
                }
            }
        }
    }
}
