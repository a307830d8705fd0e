// # Encryption Services Module
//
// Provides transparent data encryption (TDE), column-level encryption,
// key rotation without downtime, and hardware security module integration.
//
// ## Features
//
// - Transparent Data Encryption (TDE) for tablespaces
// - Column-level encryption with different algorithms
// - Online key rotation without downtime
// - Hardware Security Module (HSM) integration patterns
// - Key hierarchy and derivation
// - Encrypted backup support

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use crate::Result;
use crate::error::DbError;

/// Key identifier
pub type KeyId = String;

/// Encryption algorithm types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum EncryptionAlgorithm {
    /// AES-256-GCM
    Aes256Gcm,
    /// ChaCha20-Poly1305
    ChaCha20Poly1305,
    /// AES-128-GCM
    Aes128Gcm,
    /// AES-192-GCM
    Aes192Gcm,
}

/// Key type in the hierarchy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum KeyType {
    /// Master encryption key (root of hierarchy)
    Master,
    /// Table encryption key
    TableEncryption,
    /// Column encryption key
    ColumnEncryption,
    /// Backup encryption key
    BackupEncryption,
    /// Transaction log encryption key
    TransactionLogEncryption,
    /// Temporary key for key rotation
    Temporary,
}

/// Encryption key with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptionKey {
    /// Unique key identifier
    pub id: KeyId,
    /// Key type
    pub key_type: KeyType,
    /// Encryption algorithm
    pub algorithm: EncryptionAlgorithm,
    /// Encrypted key material (encrypted with master key)
    pub encrypted_key_material: Vec<u8>,
    /// Initialization vector
    pub iv: Vec<u8>,
    /// Key version (for rotation)
    pub version: u32,
    /// Parent key ID (for key hierarchy)
    pub parent_key_id: Option<KeyId>,
    /// Key creation timestamp
    pub created_at: i64,
    /// Key expiration timestamp
    pub expires_at: Option<i64>,
    /// Whether key is currently active
    pub is_active: bool,
    /// Key rotation state
    pub rotation_state: KeyRotationState,
    /// Tags for key management
    pub tags: HashMap<String, String>,
}

/// Key rotation state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum KeyRotationState {
    /// Normal active state
    Active,
    /// Being rotated (both old and new keys valid)
    Rotating,
    /// Rotation complete, being deprecated
    Deprecated,
    /// Destroyed (no longer usable)
    Destroyed,
}

/// Transparent Data Encryption configuration for a tablespace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TdeConfig {
    /// Tablespace identifier
    pub tablespace_id: String,
    /// Encryption key ID
    pub key_id: KeyId,
    /// Algorithm
    pub algorithm: EncryptionAlgorithm,
    /// Whether TDE is enabled
    pub enabled: bool,
    /// Compression before encryption
    pub compress_before_encrypt: bool,
    /// Created timestamp
    pub created_at: i64,
    /// Last key rotation
    pub last_rotation: Option<i64>,
}

/// Column encryption configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnEncryption {
    /// Table identifier
    pub table_id: String,
    /// Column identifier
    pub column_id: String,
    /// Encryption key ID
    pub key_id: KeyId,
    /// Algorithm
    pub algorithm: EncryptionAlgorithm,
    /// Whether deterministic encryption (allows equality checks)
    pub deterministic: bool,
    /// Salt for key derivation (if deterministic)
    pub salt: Option<Vec<u8>>,
    /// Created timestamp
    pub created_at: i64,
}

/// Hardware Security Module (HSM) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HsmConfig {
    /// HSM provider type
    pub provider: HsmProvider,
    /// Connection endpoint
    pub endpoint: String,
    /// Credentials (encrypted)
    pub credentials: Vec<u8>,
    /// Partition/slot identifier
    pub partition: Option<String>,
    /// Whether HSM is enabled
    pub enabled: bool,
    /// Master key ID in HSM
    pub master_key_id: Option<String>,
}

/// HSM provider types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum HsmProvider {
    /// AWS CloudHSM
    AwsCloudHsm,
    /// Azure Key Vault
    AzureKeyVault,
    /// Google Cloud KMS
    GoogleCloudKms,
    /// PKCS#11 compatible HSM
    Pkcs11,
    /// Custom provider
    Custom { name: String },
}

/// Key rotation job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyRotationJob {
    /// Job ID
    pub id: String,
    /// Key being rotated
    pub old_key_id: KeyId,
    /// New key
    pub new_key_id: KeyId,
    /// Job state
    pub state: RotationJobState,
    /// Started timestamp
    pub started_at: i64,
    /// Completed timestamp
    pub completed_at: Option<i64>,
    /// Progress percentage (0-100)
    pub progress: u8,
    /// Number of data blocks re-encrypted
    pub blocks_reencrypted: u64,
    /// Total blocks to re-encrypt
    pub total_blocks: u64,
    /// Error message if failed
    pub error: Option<String>,
}

/// State of a key rotation job
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum RotationJobState {
    /// Job is queued
    Queued,
    /// Job is running
    Running,
    /// Job paused
    Paused,
    /// Job completed successfully
    Completed,
    /// Job failed
    Failed,
    /// Job cancelled
    Cancelled,
}

/// Encryption manager
pub struct EncryptionManager {
    /// Encryption keys
    keys: Arc<RwLock<HashMap<KeyId, EncryptionKey>>>,
    /// TDE configurations by tablespace
    tde_configs: Arc<RwLock<HashMap<String, TdeConfig>>>,
    /// Column encryption configurations
    column_encryptions: Arc<RwLock<HashMap<String, HashMap<String, ColumnEncryption>>>>,
    /// HSM configuration
    hsm_config: Arc<RwLock<Option<HsmConfig>>>,
    /// Active key rotation jobs
    rotation_jobs: Arc<RwLock<HashMap<String, KeyRotationJob>>>,
    /// Master key (in memory, would be in HSM in production)
    master_key: Arc<RwLock<Option<Vec<u8>>>>,
    /// Key version counter
    key_version_counter: Arc<RwLock<u32>>,
}

impl EncryptionManager {
    /// Create a new encryption manager
    pub fn new() -> Self {
        Self {
            keys: Arc::new(RwLock::new(HashMap::new())),
            tde_configs: Arc::new(RwLock::new(HashMap::new())),
            column_encryptions: Arc::new(RwLock::new(HashMap::new())),
            hsm_config: Arc::new(RwLock::new(None)),
            rotation_jobs: Arc::new(RwLock::new(HashMap::new())),
            master_key: Arc::new(RwLock::new(None)),
            key_version_counter: Arc::new(RwLock::new(0)),
        }
    }

    /// Initialize with a master key
    pub fn initialize_master_key(&self, master_key: Vec<u8>) -> Result<KeyId> {
        if master_key.len() != 32 {
            return Err(DbError::InvalidInput("Master key must be 32 bytes".to_string()));
        }

        // Store master key (in production, this would be in HSM)
        *self.master_key.write() = Some(master_key.clone());

        // Create master key entry
        let key = EncryptionKey {
            id: "MASTER_KEY".to_string(),
            key_type: KeyType::Master,
            algorithm: EncryptionAlgorithm::Aes256Gcm,
            encrypted_key_material: vec![], // Master key is not encrypted
            iv: vec![],
            version: 1,
            parent_key_id: None,
            created_at: current_timestamp(),
            expires_at: None,
            is_active: true,
            rotation_state: KeyRotationState::Active,
            tags: HashMap::new(),
        };

        self.keys.write().insert(key.id.clone(), key.clone());

        Ok(key.id)
    }

    /// Generate a new encryption key
    pub fn generate_key(
        &self,
        key_type: KeyType,
        algorithm: EncryptionAlgorithm,
        parent_key_id: Option<KeyId>,
    ) -> Result<KeyId> {
        // Verify parent key exists if specified
        if let Some(ref parent_id) = parent_key_id {
            if !self.keys.read().contains_key(parent_id) {
                return Err(DbError::NotFound(format!("Parent key {} not found", parent_id)));
            }
        }

        // Generate random key material
        let key_material = self.generate_random_key(&algorithm)?;

        // Encrypt with master key (or parent key)
        let (encrypted_material, iv) = self.encrypt_key_material(&key_material)?;

        let version = {
            let mut counter = self.key_version_counter.write();
            *counter += 1;
            *counter
        };

        let key_id = format!("KEY_{:08}_{}", version, key_type_prefix(&key_type));

        let key = EncryptionKey {
            id: key_id.clone(),
            key_type,
            algorithm,
            encrypted_key_material: encrypted_material,
            iv,
            version,
            parent_key_id,
            created_at: current_timestamp(),
            expires_at: None,
            is_active: true,
            rotation_state: KeyRotationState::Active,
            tags: HashMap::new(),
        };

        self.keys.write().insert(key_id.clone(), key);

        Ok(key_id)
    }

    /// Get a key by ID
    pub fn get_key(&self, key_id: &str) -> Result<EncryptionKey> {
        self.keys.read()
            .get(key_id)
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("Key {} not found", key_id)))
    }

    /// Enable TDE for a tablespace
    pub fn enable_tde(
        &self,
        tablespace_id: String,
        algorithm: EncryptionAlgorithm,
    ) -> Result<()> {
        // Generate a new table encryption key
        let key_id = self.generate_key(
            KeyType::TableEncryption,
            algorithm.clone(),
            Some("MASTER_KEY".to_string()),
        )?;

        let config = TdeConfig {
            tablespace_id: tablespace_id.clone(),
            key_id,
            algorithm,
            enabled: true,
            compress_before_encrypt: true,
            created_at: current_timestamp(),
            last_rotation: None,
        };

        self.tde_configs.write().insert(tablespace_id, config);

        Ok(())
    }

    /// Disable TDE for a tablespace
    pub fn disable_tde(&self, tablespace_id: &str) -> Result<()> {
        let mut configs = self.tde_configs.write();

        if configs.remove(tablespace_id).is_none() {
            return Err(DbError::NotFound(
                format!("TDE not configured for tablespace {}", tablespace_id)
            ));
        }

        Ok(())
    }

    /// Get TDE configuration for a tablespace
    pub fn get_tde_config(&self, tablespace_id: &str) -> Option<TdeConfig> {
        self.tde_configs.read().get(tablespace_id).cloned()
    }

    /// Enable column encryption
    pub fn enable_column_encryption(
        &self,
        table_id: String,
        column_id: String,
        algorithm: EncryptionAlgorithm,
        deterministic: bool,
    ) -> Result<()> {
        // Generate column encryption key
        let key_id = self.generate_key(
            KeyType::ColumnEncryption,
            algorithm.clone(),
            Some("MASTER_KEY".to_string()),
        )?;

        let salt = if deterministic {
            Some(self.generate_random_bytes(16)?)
        } else {
            None
        };

        let column_enc = ColumnEncryption {
            table_id: table_id.clone(),
            column_id: column_id.clone(),
            key_id,
            algorithm,
            deterministic,
            salt,
            created_at: current_timestamp(),
        };

        let mut encryptions = self.column_encryptions.write();
        let table_encryptions = encryptions.entry(table_id).or_insert_with(HashMap::new);
        table_encryptions.insert(column_id, column_enc);

        Ok(())
    }

    /// Disable column encryption
    pub fn disable_column_encryption(&self, table_id: &str, column_id: &str) -> Result<()> {
        let mut encryptions = self.column_encryptions.write();

        if let Some(table_encryptions) = encryptions.get_mut(table_id) {
            if table_encryptions.remove(column_id).is_none() {
                return Err(DbError::NotFound(
                    format!("Column encryption not found for {}.{}", table_id, column_id)
                ));
            }
            Ok(())
        } else {
            Err(DbError::NotFound(
                format!("No column encryptions for table {}", table_id)
            ))
        }
    }

    /// Get column encryption configuration
    pub fn get_column_encryption(
        &self,
        table_id: &str,
        column_id: &str,
    ) -> Option<ColumnEncryption> {
        self.column_encryptions.read()
            .get(table_id)
            .and_then(|t| t.get(column_id))
            .cloned()
    }

    /// Start key rotation
    pub fn start_key_rotation(&self, old_key_id: &KeyId) -> Result<String> {
        // Get the old key
        let old_key = self.get_key(old_key_id)?;

        if old_key.rotation_state != KeyRotationState::Active {
            return Err(DbError::InvalidOperation(
                "Key is not in active state".to_string()
            ));
        }

        // Generate new key with same properties
        let new_key_id = self.generate_key(
            old_key.key_type.clone(),
            old_key.algorithm.clone(),
            old_key.parent_key_id.clone(),
        )?;

        // Create rotation job
        let job_id = format!("ROT_{:08}", self.rotation_jobs.read().len() + 1);

        let job = KeyRotationJob {
            id: job_id.clone(),
            old_key_id: old_key_id.clone(),
            new_key_id: new_key_id.clone(),
            state: RotationJobState::Queued,
            started_at: current_timestamp(),
            completed_at: None,
            progress: 0,
            blocks_reencrypted: 0,
            total_blocks: 0, // Would be calculated based on actual data
            error: None,
        };

        self.rotation_jobs.write().insert(job_id.clone(), job);

        // Mark old key as rotating
        if let Some(key) = self.keys.write().get_mut(old_key_id) {
            key.rotation_state = KeyRotationState::Rotating;
        }

        Ok(job_id)
    }

    /// Get rotation job status
    pub fn get_rotation_job(&self, job_id: &str) -> Result<KeyRotationJob> {
        self.rotation_jobs.read()
            .get(job_id)
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("Rotation job {} not found", job_id)))
    }

    /// Update rotation job progress
    pub fn update_rotation_progress(
        &self,
        job_id: &str,
        blocks_completed: u64,
    ) -> Result<()> {
        let mut jobs = self.rotation_jobs.write();

        if let Some(job) = jobs.get_mut(job_id) {
            job.blocks_reencrypted = blocks_completed;

            if job.total_blocks > 0 {
                job.progress = ((blocks_completed * 100) / job.total_blocks) as u8;
            }

            if blocks_completed >= job.total_blocks {
                job.state = RotationJobState::Completed;
                job.completed_at = Some(current_timestamp());

                // Mark old key as deprecated
                if let Some(key) = self.keys.write().get_mut(&job.old_key_id) {
                    key.rotation_state = KeyRotationState::Deprecated;
                    key.is_active = false;
                }
            }

            Ok(())
        } else {
            Err(DbError::NotFound(format!("Rotation job {} not found", job_id)))
        }
    }

    /// Configure HSM integration
    pub fn configure_hsm(&self, config: HsmConfig) -> Result<()> {
        *self.hsm_config.write() = Some(config);
        Ok(())
    }

    /// Get HSM configuration
    pub fn get_hsm_config(&self) -> Option<HsmConfig> {
        self.hsm_config.read().clone()
    }

    /// Encrypt data with a specific key
    pub fn encrypt_data(&self, key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
        let key = self.get_key(key_id)?;

        if !key.is_active {
            return Err(DbError::InvalidOperation("Key is not active".to_string()));
        }

        // Decrypt the key material using master key
        let key_material = self.decrypt_key_material(&key)?;

        // Encrypt the data (simplified - would use actual crypto library)
        let ciphertext = self.perform_encryption(&key_material, plaintext, &key.algorithm)?;

        Ok(ciphertext)
    }

    /// Decrypt data with a specific key
    pub fn decrypt_data(&self, key_id: &str, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let key = self.get_key(key_id)?;

        // Even deprecated keys can decrypt (for rotation)
        if key.rotation_state == KeyRotationState::Destroyed {
            return Err(DbError::InvalidOperation("Key has been destroyed".to_string()));
        }

        // Decrypt the key material using master key
        let key_material = self.decrypt_key_material(&key)?;

        // Decrypt the data
        let plaintext = self.perform_decryption(&key_material, ciphertext, &key.algorithm)?;

        Ok(plaintext)
    }

    /// Destroy a key (irreversible)
    pub fn destroy_key(&self, key_id: &KeyId) -> Result<()> {
        let mut keys = self.keys.write();

        if let Some(key) = keys.get_mut(key_id) {
            if key.key_type == KeyType::Master {
                return Err(DbError::InvalidOperation("Cannot destroy master key".to_string()));
            }

            if key.rotation_state != KeyRotationState::Deprecated {
                return Err(DbError::InvalidOperation(
                    "Can only destroy deprecated keys".to_string()
                ));
            }

            key.rotation_state = KeyRotationState::Destroyed;
            key.is_active = false;
            // In production, would securely wipe key material
            key.encrypted_key_material.clear();

            Ok(())
        } else {
            Err(DbError::NotFound(format!("Key {} not found", key_id)))
        }
    }

    /// Get all active keys
    pub fn get_active_keys(&self) -> Vec<EncryptionKey> {
        self.keys.read()
            .values()
            .filter(|k| k.is_active && k.rotation_state == KeyRotationState::Active)
            .cloned()
            .collect()
    }

    /// Get encryption statistics
    pub fn get_statistics(&self) -> EncryptionStatistics {
        let keys = self.keys.read();
        let tde_configs = self.tde_configs.read();
        let column_encryptions = self.column_encryptions.read();
        let rotation_jobs = self.rotation_jobs.read();

        EncryptionStatistics {
            total_keys: keys.len(),
            active_keys: keys.values().filter(|k| k.is_active).count(),
            deprecated_keys: keys.values()
                .filter(|k| k.rotation_state == KeyRotationState::Deprecated)
                .count(),
            tablespaces_with_tde: tde_configs.len(),
            encrypted_columns: column_encryptions.values()
                .map(|t| t.len())
                .sum(),
            active_rotations: rotation_jobs.values()
                .filter(|j| j.state == RotationJobState::Running)
                .count(),
        }
    }

    // Private helper methods

    fn generate_random_key(&self, algorithm: &EncryptionAlgorithm) -> Result<Vec<u8>> {
        let key_size = match algorithm {
            EncryptionAlgorithm::Aes256Gcm => 32,
            EncryptionAlgorithm::Aes192Gcm => 24,
            EncryptionAlgorithm::Aes128Gcm => 16,
            EncryptionAlgorithm::ChaCha20Poly1305 => 32,
        };

        self.generate_random_bytes(key_size)
    }

    fn generate_random_bytes(&self, size: usize) -> Result<Vec<u8>> {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let bytes: Vec<u8> = (0..size).map(|_| rng.gen()).collect();
        Ok(bytes)
    }

    fn encrypt_key_material(&self, key_material: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
        // Simplified - would use actual encryption with master key
        let iv = self.generate_random_bytes(12)?;
        let encrypted = key_material.to_vec(); // Placeholder

        Ok((encrypted, iv))
    }

    fn decrypt_key_material(&self, key: &EncryptionKey) -> Result<Vec<u8>> {
        // Simplified - would decrypt using master key
        Ok(key.encrypted_key_material.clone())
    }

    fn perform_encryption(
        &self,
        _key: &[u8],
        plaintext: &[u8],
        _algorithm: &EncryptionAlgorithm,
    ) -> Result<Vec<u8>> {
        // Simplified - would use actual crypto library
        Ok(plaintext.to_vec())
    }

    fn perform_decryption(
        &self,
        _key: &[u8],
        ciphertext: &[u8],
        _algorithm: &EncryptionAlgorithm,
    ) -> Result<Vec<u8>> {
        // Simplified - would use actual crypto library
        Ok(ciphertext.to_vec())
    }
}

impl Default for EncryptionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Encryption statistics
#[derive(Debug, Clone)]
pub struct EncryptionStatistics {
    pub total_keys: usize,
    pub active_keys: usize,
    pub deprecated_keys: usize,
    pub tablespaces_with_tde: usize,
    pub encrypted_columns: usize,
    pub active_rotations: usize,
}

fn key_type_prefix(key_type: &KeyType) -> &str {
    match key_type {
        KeyType::Master => "MASTER",
        KeyType::TableEncryption => "TDE",
        KeyType::ColumnEncryption => "COL",
        KeyType::BackupEncryption => "BACKUP",
        KeyType::TransactionLogEncryption => "TXLOG",
        KeyType::Temporary => "TEMP",
    }
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
use std::time::UNIX_EPOCH;

    #[test]
    fn test_key_generation() {
        let manager = EncryptionManager::new();

        // Initialize master key
        let master_key = vec![0u8; 32];
        manager.initialize_master_key(master_key).unwrap();

        // Generate table encryption key
        let key_id = manager.generate_key(
            KeyType::TableEncryption,
            EncryptionAlgorithm::Aes256Gcm,
            Some("MASTER_KEY".to_string()),
        ).unwrap();

        assert!(key_id.starts_with("KEY_"));
    }

    #[test]
    fn test_tde_configuration() {
        let manager = EncryptionManager::new();
        let master_key = vec![0u8; 32];
        manager.initialize_master_key(master_key).unwrap();

        manager.enable_tde(
            "tablespace1".to_string(),
            EncryptionAlgorithm::Aes256Gcm,
        ).unwrap();

        let config = manager.get_tde_config("tablespace1");
        assert!(config.is_some());
        assert!(config.unwrap().enabled);
    }

    #[test]
    fn test_key_rotation() {
        let manager = EncryptionManager::new();
        let master_key = vec![0u8; 32];
        manager.initialize_master_key(master_key).unwrap();

        let key_id = manager.generate_key(
            KeyType::TableEncryption,
            EncryptionAlgorithm::Aes256Gcm,
            Some("MASTER_KEY".to_string()),
        ).unwrap();

        let job_id = manager.start_key_rotation(&key_id).unwrap();
        let job = manager.get_rotation_job(&job_id).unwrap();

        assert_eq!(job.state, RotationJobState::Queued);
        assert_eq!(job.old_key_id, key_id);
    }
}
