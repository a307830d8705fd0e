//! # FLASHBACK DATABASE Implementation
//!
//! Oracle-like FLASHBACK DATABASE for point-in-time database recovery.
//! Provides database-level flashback to restore the entire database to a previous state.
//!
//! ## Features
//!
//! - FLASHBACK DATABASE TO TIMESTAMP/SCN
//! - FLASHBACK DATABASE TO RESTORE POINT
//! - Guaranteed restore points (never purged)
//! - Database incarnation management
//! - Resetlogs operations for new timeline
//! - Point-in-time recovery (PITR) orchestration
//! - Archive log coordination
//! - Flashback logs management
//!
//! ## Example
//!
//! ```sql
//! FLASHBACK DATABASE TO TIMESTAMP '2024-01-01 12:00:00';
//! FLASHBACK DATABASE TO SCN 12345;
//! FLASHBACK DATABASE TO RESTORE POINT before_migration;
//! ALTER DATABASE OPEN RESETLOGS;
//! ```

use std::collections::{HashMap};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;
use std::path::PathBuf;

use crate::common::TableId;
use crate::error::Result;
use super::time_travel::{SCN, Timestamp, TimeTravelEngine, current_timestamp};

// ============================================================================
// Database Flashback Manager
// ============================================================================

/// Manages FLASHBACK DATABASE operations
pub struct DatabaseFlashbackManager {
    /// Time travel engine
    time_travel: Arc<TimeTravelEngine>,

    /// Flashback logs
    flashback_logs: Arc<RwLock<FlashbackLogs>>,

    /// Database incarnations
    incarnations: Arc<RwLock<IncarnationTree>>,

    /// Guaranteed restore points
    guaranteed_points: Arc<RwLock<GuaranteedRestorePoints>>,

    /// Recovery orchestrator
    recovery: Arc<RwLock<RecoveryOrchestrator>>,

    /// Configuration
    config: DatabaseFlashbackConfig,

    /// Statistics
    stats: Arc<RwLock<DatabaseFlashbackStats>>,
}

impl DatabaseFlashbackManager {
    /// Create a new database flashback manager
    pub fn new(
        time_travel: Arc<TimeTravelEngine>,
        config: DatabaseFlashbackConfig,
    ) -> Self {
        Self {
            time_travel,
            flashback_logs: Arc::new(RwLock::new(FlashbackLogs::new())),
            incarnations: Arc::new(RwLock::new(IncarnationTree::new())),
            guaranteed_points: Arc::new(RwLock::new(GuaranteedRestorePoints::new())),
            recovery: Arc::new(RwLock::new(RecoveryOrchestrator::new())),
            config,
            stats: Arc::new(RwLock::new(DatabaseFlashbackStats::default())),
        }
    }

    /// FLASHBACK DATABASE TO TIMESTAMP
    pub fn flashback_to_timestamp(&self, timestamp: Timestamp) -> Result<DatabaseFlashbackResult> {
        let scn = self.time_travel.timestamp_to_scn(timestamp)?;
        self.flashback_to_scn(scn)
    }

    /// FLASHBACK DATABASE TO SCN
    pub fn flashback_to_scn(&self, target_scn: SCN) -> Result<DatabaseFlashbackResult> {
        let start_time = SystemTime::now();

        // 1. Validate flashback is possible
        self.validate_database_flashback(target_scn)?;

        // 2. Prepare for flashback
        let current_scn = self.time_travel.get_current_scn();
        let flashback_plan = self.create_flashback_plan(current_scn, target_scn)?;

        // 3. Execute flashback
        let mut recovery = self.recovery.write().unwrap();
        let _result = recovery.execute_database_flashback(&flashback_plan)?;

        // 4. Create new incarnation
        let mut incarnations = self.incarnations.write().unwrap();
        incarnations.create_incarnation(target_scn, "flashback")?;

        // 5. Update statistics
        let mut stats = self.stats.write().unwrap();
        stats.database_flashbacks += 1;
        stats.total_flashback_duration_ms += start_time.elapsed()
            .unwrap_or_default()
            .as_millis() as u64;

        Ok(DatabaseFlashbackResult {
            success: true,
            target_scn,
            tables_recovered: result.tables_recovered,
            rows_affected: result.rows_affected,
            duration_ms: start_time.elapsed().unwrap_or_default().as_millis() as u64,
        })
    }

    /// FLASHBACK DATABASE TO RESTORE POINT
    pub fn flashback_to_restore_point(&self, restore_point_name: &str) -> Result<DatabaseFlashbackResult> {
        let guaranteed = self.guaranteed_points.read().unwrap();
        let restore_point = guaranteed.get(restore_point_name)?;
        let scn = restore_point.scn;
        drop(guaranteed);

        self.flashback_to_scn(scn)
    }

    /// Create a guaranteed restore point
    pub fn create_guaranteed_restore_point(
        &self,
        name: String,
        scn: Option<SCN>,
    ) -> Result<()> {
        let target_scn = scn.unwrap_or_else(|| self.time_travel.get_current_scn());

        let restore_point = GuaranteedRestorePoint {
            name: name.clone(),
            scn: target_scn,
            timestamp: current_timestamp(),
            creation_time: SystemTime::now(),
            flashback_logs_retained: true,
        };

        let mut guaranteed = self.guaranteed_points.write().unwrap();
        guaranteed.add(restore_point)?;

        Ok(())
    }

    /// Drop a guaranteed restore point
    pub fn drop_guaranteed_restore_point(&self, name: &str) -> Result<()> {
        let mut guaranteed = self.guaranteed_points.write().unwrap();
        guaranteed.remove(name)
    }

    /// Execute RESETLOGS operation
    pub fn resetlogs(&self) -> Result<()> {
        let mut incarnations = self.incarnations.write().unwrap();
        let current_scn = self.time_travel.get_current_scn();
        incarnations.create_incarnation(current_scn, "resetlogs")?;

        let mut stats = self.stats.write().unwrap();
        stats.resetlogs_operations += 1;

        Ok(())
    }

    /// Get current database incarnation
    pub fn get_current_incarnation(&self) -> Result<Incarnation> {
        let incarnations = self.incarnations.read().unwrap();
        incarnations.get_current()
    }

    /// List all incarnations
    pub fn list_incarnations(&self) -> Vec<Incarnation> {
        let incarnations = self.incarnations.read().unwrap();
        incarnations.list_all()
    }

    /// Archive flashback logs
    pub fn archive_flashback_logs(&self, target_scn: SCN) -> Result<usize> {
        let mut logs = self.flashback_logs.write().unwrap();
        logs.archive_until(target_scn)
    }

    /// Purge old flashback logs
    pub fn purge_flashback_logs(&self, before_timestamp: Timestamp) -> Result<usize> {
        let mut logs = self.flashback_logs.write().unwrap();
        logs.purge_before(before_timestamp)
    }

    /// Get flashback window (oldest SCN we can flashback to)
    pub fn get_flashback_window(&self) -> Result<(SCN, SCN)> {
        let _logs = self.flashback_logs.read().unwrap();
        let oldest_scn = logs.get_oldest_scn()?;
        let newest_scn = self.time_travel.get_current_scn();

        Ok((oldest_scn, newest_scn))
    }

    /// Validate flashback is possible
    fn validate_database_flashback(&self, target_scn: SCN) -> Result<()> {
        let current_scn = self.time_travel.get_current_scn();

        if target_scn >= current_scn {
            return Err(DbError::Validation(
                "Cannot flashback to future SCN".to_string()
            ));
        }

        // Check if flashback logs cover the target SCN
        let _logs = self.flashback_logs.read().unwrap();
        if !logs.covers_scn(target_scn) {
            return Err(DbError::Validation(
                format!("Flashback logs do not cover SCN {}", target_scn)
            ));
        }

        Ok(())
    }

    /// Create flashback execution plan
    fn create_flashback_plan(&self, from_scn: SCN, to_scn: SCN) -> Result<FlashbackPlan> {
        let _logs = self.flashback_logs.read().unwrap();
        let log_sequence = logs.get_logs_between(to_scn, from_scn)?;

        Ok(FlashbackPlan {
            from_scn,
            to_scn,
            log_files: log_sequence,
            tables_to_recover: Vec::new(), // Would be populated
        })
    }

    /// Get statistics
    pub fn get_stats(&self) -> DatabaseFlashbackStats {
        self.stats.read().unwrap().clone()
    }
}

// ============================================================================
// Flashback Logs
// ============================================================================

/// Manages flashback logs for database recovery
struct FlashbackLogs {
    /// Log files by SCN range
    logs: BTreeMap<SCN, FlashbackLogFile>,

    /// Total size of flashback logs
    total_size_bytes: u64,
}

impl FlashbackLogs {
    fn new() -> Self {
        Self {
            logs: BTreeMap::new(),
            total_size_bytes: 0,
        }
    }

    fn add_log(&mut self, log: FlashbackLogFile) {
        self.total_size_bytes += log.size_bytes;
        self.logs.insert(log.start_scn, log);
    }

    fn covers_scn(&self, scn: SCN) -> bool {
        self.logs.iter().any(|(_, log)| {
            scn >= log.start_scn && scn <= log.end_scn
        })
    }

    fn get_oldest_scn(&self) -> Result<SCN> {
        self.logs
            .keys()
            .next()
            .copied()
            .ok_or_else(|| DbError::Validation("No flashback logs available".to_string()))
    }

    fn get_logs_between(&self, start_scn: SCN, end_scn: SCN) -> Result<Vec<FlashbackLogFile>> {
        let mut result = Vec::new();

        for log in self.logs.values() {
            if log.end_scn >= start_scn && log.start_scn <= end_scn {
                result.push(log.clone());
            }
        }

        if result.is_empty() {
            return Err(DbError::Validation(
                format!("No flashback logs found for SCN range {} to {}", start_scn, end_scn)
            ));
        }

        Ok(result)
    }

    fn archive_until(&mut self, scn: SCN) -> Result<usize> {
        let mut archived = 0;

        let to_archive: Vec<_> = self.logs
            .iter()
            .filter(|(_, log)| log.end_scn <= scn)
            .map(|(k, _)| *k)
            .collect();

        for key in to_archive {
            if let Some(log) = self.logs.remove(&key) {
                self.total_size_bytes -= log.size_bytes;
                archived += 1;
            }
        }

        Ok(archived)
    }

    fn purge_before(&mut self, timestamp: Timestamp) -> Result<usize> {
        let mut purged = 0;

        let to_purge: Vec<_> = self.logs
            .iter()
            .filter(|(_, log)| log.creation_time < timestamp)
            .map(|(k, _)| *k)
            .collect();

        for key in to_purge {
            if let Some(log) = self.logs.remove(&key) {
                self.total_size_bytes -= log.size_bytes;
                purged += 1;
            }
        }

        Ok(purged)
    }
}

/// Flashback log file
#[derive(Debug, Clone)]
struct FlashbackLogFile {
    file_path: PathBuf,
    start_scn: SCN,
    end_scn: SCN,
    size_bytes: u64,
    creation_time: Timestamp,
}

// ============================================================================
// Database Incarnation Management
// ============================================================================

/// Manages database incarnation tree
struct IncarnationTree {
    incarnations: Vec<Incarnation>,
    current_incarnation_id: u32,
    next_id: u32,
}

impl IncarnationTree {
    fn new() -> Self {
        let initial = Incarnation {
            incarnation_id: 1,
            parent_incarnation_id: None,
            resetlogs_scn: 0,
            resetlogs_time: SystemTime::now(),
            prior_incarnation_scn: None,
            status: IncarnationStatus::Current,
            branch_reason: "initial".to_string(),
        };

        Self {
            incarnations: vec![initial],
            current_incarnation_id: 1,
            next_id: 2,
        }
    }

    fn create_incarnation(&mut self, scn: SCN, reason: &str) -> Result<u32> {
        let incarnation_id = self.next_id;
        self.next_id += 1;

        // Mark current incarnation as parent
        if let Some(current) = self.get_current_mut() {
            current.status = IncarnationStatus::Parent;
        }

        let incarnation = Incarnation {
            incarnation_id,
            parent_incarnation_id: Some(self.current_incarnation_id),
            resetlogs_scn: scn,
            resetlogs_time: SystemTime::now(),
            prior_incarnation_scn: Some(scn),
            status: IncarnationStatus::Current,
            branch_reason: reason.to_string(),
        };

        self.incarnations.push(incarnation);
        self.current_incarnation_id = incarnation_id;

        Ok(incarnation_id)
    }

    fn get_current(&self) -> Result<Incarnation> {
        self.incarnations
            .iter()
            .find(|inc| inc.incarnation_id == self.current_incarnation_id)
            .cloned()
            .ok_or_else(|| DbError::Validation("Current incarnation not found".to_string()))
    }

    fn get_current_mut(&mut self) -> Option<&mut Incarnation> {
        let current_id = self.current_incarnation_id;
        self.incarnations
            .iter_mut()
            .find(|inc| inc.incarnation_id == current_id)
    }

    fn list_all(&self) -> Vec<Incarnation> {
        self.incarnations.clone()
    }
}

/// Database incarnation
#[derive(Debug, Clone)]
pub struct Incarnation {
    pub incarnation_id: u32,
    pub parent_incarnation_id: Option<u32>,
    pub resetlogs_scn: SCN,
    pub resetlogs_time: SystemTime,
    pub prior_incarnation_scn: Option<SCN>,
    pub status: IncarnationStatus,
    pub branch_reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncarnationStatus {
    Current,
    Parent,
    Orphan,
}

// ============================================================================
// Guaranteed Restore Points
// ============================================================================

/// Manages guaranteed restore points
struct GuaranteedRestorePoints {
    points: HashMap<String, GuaranteedRestorePoint>,
}

impl GuaranteedRestorePoints {
    fn new() -> Self {
        Self {
            points: HashMap::new(),
        }
    }

    fn add(&mut self, point: GuaranteedRestorePoint) -> Result<()> {
        if self.points.contains_key(&point.name) {
            return Err(DbError::Validation(
                format!("Restore point '{}' already exists", point.name)
            ));
        }

        self.points.insert(point.name.clone(), point);
        Ok(())
    }

    fn get(&self, name: &str) -> Result<&GuaranteedRestorePoint> {
        self.points.get(name)
            .ok_or_else(|| DbError::Validation(
                format!("Restore point '{}' not found", name)
            ))
    }

    fn remove(&mut self, name: &str) -> Result<()> {
        self.points.remove(name)
            .ok_or_else(|| DbError::Validation(
                format!("Restore point '{}' not found", name)
            ))?;
        Ok(())
    }

    fn list_all(&self) -> Vec<&GuaranteedRestorePoint> {
        self.points.values().collect()
    }
}

/// Guaranteed restore point (never purged)
#[derive(Debug, Clone)]
pub struct GuaranteedRestorePoint {
    pub name: String,
    pub scn: SCN,
    pub timestamp: Timestamp,
    pub creation_time: SystemTime,
    pub flashback_logs_retained: bool,
}

// ============================================================================
// Recovery Orchestrator
// ============================================================================

/// Orchestrates point-in-time recovery
struct RecoveryOrchestrator {
    recovery_in_progress: bool,
}

impl RecoveryOrchestrator {
    fn new() -> Self {
        Self {
            recovery_in_progress: false,
        }
    }

    fn execute_database_flashback(&mut self, _plan: &FlashbackPlan) -> Result<RecoveryResult> {
        if self.recovery_in_progress {
            return Err(DbError::Validation(
                "Recovery already in progress".to_string()
            ));
        }

        self.recovery_in_progress = true;

        // Execute recovery steps
        // 1. Read flashback logs in reverse
        // 2. Apply undo operations
        // 3. Restore each table state
        // 4. Validate consistency

        let _result = RecoveryResult {
            tables_recovered: 0,
            rows_affected: 0,
        };

        self.recovery_in_progress = false;

        Ok(result)
    }
}

// ============================================================================
// Flashback Plan
// ============================================================================

/// Plan for executing database flashback
struct FlashbackPlan {
    from_scn: SCN,
    to_scn: SCN,
    log_files: Vec<FlashbackLogFile>,
    tables_to_recover: Vec<TableId>,
}

/// Result of recovery operation
struct RecoveryResult {
    tables_recovered: usize,
    rows_affected: usize,
}

// ============================================================================
// Database Flashback Result
// ============================================================================

/// Result of FLASHBACK DATABASE operation
#[derive(Debug, Clone)]
pub struct DatabaseFlashbackResult {
    pub success: bool,
    pub target_scn: SCN,
    pub tables_recovered: usize,
    pub rows_affected: usize,
    pub duration_ms: u64,
}

// ============================================================================
// Configuration
// ============================================================================

/// Database flashback configuration
#[derive(Debug, Clone)]
pub struct DatabaseFlashbackConfig {
    /// Enable flashback database
    pub enable_flashback_database: bool,

    /// Flashback log retention (days)
    pub flashback_retention_days: u64,

    /// Maximum guaranteed restore points
    pub max_guaranteed_restore_points: usize,

    /// Flashback log size limit (bytes)
    pub flashback_log_size_limit: u64,

    /// Auto-archive flashback logs
    pub auto_archive: bool,
}

impl Default for DatabaseFlashbackConfig {
    fn default() -> Self {
        Self {
            enable_flashback_database: true,
            flashback_retention_days: 7,
            max_guaranteed_restore_points: 20,
            flashback_log_size_limit: 100 * 1024 * 1024 * 1024, // 100 GB
            auto_archive: true,
        }
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Statistics for database flashback operations
#[derive(Debug, Clone, Default)]
pub struct DatabaseFlashbackStats {
    pub database_flashbacks: u64,
    pub total_flashback_duration_ms: u64,
    pub resetlogs_operations: u64,
    pub guaranteed_restore_points: usize,
    pub flashback_log_size_bytes: u64,
}

impl DatabaseFlashbackStats {
    pub fn avg_flashback_duration_ms(&self) -> f64 {
        if self.database_flashbacks == 0 {
            0.0
        } else {
            (self.total_flashback_duration_ms as f64) / (self.database_flashbacks as f64)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incarnation_tree() {
        let mut tree = IncarnationTree::new();

        assert_eq!(tree.current_incarnation_id, 1);

        let new_id = tree.create_incarnation(1000, "flashback").unwrap();
        assert_eq!(new_id, 2);
        assert_eq!(tree.current_incarnation_id, 2);

        let current = tree.get_current().unwrap();
        assert_eq!(current.incarnation_id, 2);
        assert_eq!(current.parent_incarnation_id, Some(1));
    }

    #[test]
    fn test_guaranteed_restore_points() {
        let mut points = GuaranteedRestorePoints::new();

        let rp = GuaranteedRestorePoint {
            name: "test_point".to_string(),
            scn: 1000,
            timestamp: current_timestamp(),
            creation_time: SystemTime::now(),
            flashback_logs_retained: true,
        };

        points.add(rp).unwrap();
        let retrieved = points.get("test_point").unwrap();
        assert_eq!(retrieved.scn, 1000);

        points.remove("test_point").unwrap();
        assert!(points.get("test_point").is_err());
    }

    #[test]
    fn test_flashback_logs() {
        let mut logs = FlashbackLogs::new();

        let log = FlashbackLogFile {
            file_path: PathBuf::from("/test.log"),
            start_scn: 1000,
            end_scn: 2000,
            size_bytes: 1024,
            creation_time: current_timestamp(),
        };

        logs.add_log(log);

        assert!(logs.covers_scn(1500));
        assert!(!logs.covers_scn(500));
        assert!(!logs.covers_scn(2500));
    }
}


