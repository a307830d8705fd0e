/// Session authentication system
///
/// This module provides multi-method authentication with support for:
/// - Database native authentication
/// - LDAP integration
/// - Kerberos SSO
/// - SAML federation
/// - Token-based authentication

use std::fmt;
use super::types::Username;
use crate::error::{Result, DbError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashSet, HashMap};
use std::time::SystemTime;

/// Authentication provider trait
///
/// Implement this trait to add new authentication methods.
///
/// # Examples
///
/// ```rust,ignore
/// use rusty_db::pool::session::auth::Authenticator;
///
/// struct CustomAuth;
///
/// impl Authenticator for CustomAuth {
///     async fn authenticate(&self, credentials: &Credentials) -> Result<AuthenticationResult> {
///         // Custom authentication logic
///         Ok(AuthenticationResult {
///             username: Username::new("user").unwrap(),
///             authenticated: true,
///             privileges: PrivilegeSet::default(),
///             roles: HashSet::new(),
///             auth_method: AuthMethod::Custom,
///         })
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync {
    /// Authenticate user with provided credentials
    ///
    /// # Arguments
    ///
    /// * `credentials` - User credentials (password, token, certificate, etc.)
    ///
    /// # Returns
    ///
    /// `AuthenticationResult` on success with user privileges
    ///
    /// # Errors
    ///
    /// Returns `DbError::AuthenticationFailed` if credentials are invalid
    fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> impl std::future::Future<Output = Result<AuthenticationResult>> + Send;

    /// Validate existing authentication token
    fn validate_token(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Refresh authentication token
    fn refresh_token(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Authentication credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Credentials {
    /// Username and password
    Password { username: String, password: String },

    /// LDAP bind DN and password
    Ldap { bind_dn: String, password: String },

    /// Kerberos ticket
    Kerberos { ticket: Vec<u8>, service: String },

    /// SAML assertion
    Saml { assertion: String, issuer: String },

    /// Bearer token (JWT, OAuth2, etc.)
    Token { token: String },

    /// Client certificate
    Certificate { cert_pem: String },
}

/// Authentication result
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    pub username: Username,
    pub authenticated: bool,
    pub privileges: PrivilegeSet,
    pub roles: HashSet<String>,
    pub auth_method: AuthMethod,
}

/// Authentication methods supported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMethod {
    Database,
    Ldap,
    Kerberos,
    Saml,
    Token,
    Certificate,
    Custom,
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::Database => write!(f, "DATABASE"),
            AuthMethod::Ldap => write!(f, "LDAP"),
            AuthMethod::Kerberos => write!(f, "KERBEROS"),
            AuthMethod::Saml => write!(f, "SAML"),
            AuthMethod::Token => write!(f, "TOKEN"),
            AuthMethod::Certificate => write!(f, "CERTIFICATE"),
            AuthMethod::Custom => write!(f, "CUSTOM"),
        }
    }
}

/// Privilege set for a user
///
/// Represents system and object privileges granted to a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrivilegeSet {
    /// System privileges (e.g., CREATE_TABLE, DROP_USER)
    pub system_privileges: HashSet<String>,

    /// Object privileges (e.g., SELECT on table X)
    pub object_privileges: HashMap<String, HashSet<String>>,

    /// Administrative privileges
    pub is_dba: bool,

    /// Can grant privileges to others
    pub can_grant: bool,
}

impl PrivilegeSet {
    /// Create a new empty privilege set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a DBA privilege set with all permissions
    pub fn dba() -> Self {
        Self {
            system_privileges: HashSet::new(),
            object_privileges: HashMap::new(),
            is_dba: true,
            can_grant: true,
        }
    }

    /// Check if user has a specific system privilege
    pub fn has_system_privilege(&self, privilege: &str) -> bool {
        self.is_dba || self.system_privileges.contains(privilege)
    }

    /// Check if user has a specific object privilege
    pub fn has_object_privilege(&self, object: &str, privilege: &str) -> bool {
        if self.is_dba {
            return true;
        }

        self.object_privileges
            .get(object)
            .map_or(false, |privs| privs.contains(privilege))
    }

    /// Add system privilege
    pub fn add_system_privilege(&mut self, privilege: String) {
        self.system_privileges.insert(privilege);
    }

    /// Add object privilege
    pub fn add_object_privilege(&mut self, object: String, privilege: String) {
        self.object_privileges
            .entry(object)
            .or_insert_with(HashSet::new)
            .insert(privilege);
    }
}

/// Database native authenticator
///
/// Implements password-based authentication with password hashing.
pub struct DatabaseAuthenticator {
    /// User password hashes (username -> hash)
    password_hashes: parking_lot::RwLock<HashMap<String, String>>,
}

impl DatabaseAuthenticator {
    /// Create a new database authenticator
    pub fn new() -> Self {
        Self {
            password_hashes: parking_lot::RwLock::new(HashMap::new()),
        }
    }

    /// Register a new user with password
    ///
    /// # Arguments
    ///
    /// * `username` - Username
    /// * `password` - Plain-text password (will be hashed)
    pub fn register_user(&self, username: String, password: &str) {
        let hash = self.hash_password(password);
        self.password_hashes.write().insert(username, hash);
    }

    /// Remove a user
    pub fn remove_user(&self, username: &str) {
        self.password_hashes.write().remove(username);
    }

    /// Hash password using SHA-256
    fn hash_password(&self, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Verify password against stored hash
    fn verify_password(&self, username: &str, password: &str) -> bool {
        let hashes = self.password_hashes.read();
        let stored_hash = match hashes.get(username) {
            Some(h) => h,
            None => return false,
        };

        let provided_hash = self.hash_password(password);
        provided_hash == *stored_hash
    }
}

impl Authenticator for DatabaseAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthenticationResult> {
        match credentials {
            Credentials::Password { username, password } => {
                if self.verify_password(username, password) {
                    Ok(AuthenticationResult {
                        username: Username::new(username.clone())
                            .map_err(|e| DbError::InvalidInput(e))?,
                        authenticated: true,
                        privileges: PrivilegeSet::default(),
                        roles: HashSet::new(),
                        auth_method: AuthMethod::Database,
                    })
                } else {
                    Err(DbError::Authentication(
                        "Invalid username or password".to_string(),
                    ))
                }
            }
            _ => Err(DbError::Authentication(
                "Unsupported credential type".to_string(),
            )),
        }
    }

    async fn validate_token(&self, _token: &str) -> Result<bool> {
        // Database authenticator doesn't use tokens
        Ok(false)
    }

    async fn refresh_token(&self, _token: &str) -> Result<String> {
        Err(DbError::NotImplemented(
            "Database authenticator doesn't support tokens".to_string(),
        ))
    }
}

/// Token-based authenticator
///
/// Implements JWT or custom token authentication.
pub struct TokenAuthenticator {
    /// Valid tokens (token -> username, expiry)
    tokens: parking_lot::RwLock<HashMap<String, String>>,
}

impl TokenAuthenticator {
    pub fn new() -> Self {
        Self {
            tokens: parking_lot::RwLock::new(HashMap::new()),
        }
    }

    /// Issue a new token for a user
    ///
    /// # Arguments
    ///
    /// * `username` - Username
    /// * `validity` - Token validity duration
    ///
    /// # Returns
    ///
    /// Generated token string
pub fn issue_token(&self, username: String, validity: std::time::Duration) -> String {
    use uuid::Uuid;

    let token = Uuid::new_v4().to_string();
    let expiry = SystemTime::now() + validity;

    self.tokens.write().insert(token.clone(), (username.clone()));
    token
}

    /// Revoke a token
    pub fn revoke_token(&self, token: &str) {
        self.tokens.write().remove(token);
    }

    /// Check if token is valid and not expired
fn is_token_valid(&self, token: &str) -> Option<String> {
    let tokens = self.tokens.read();
    tokens.get(token).and_then(|(username, expiry)| {
        if SystemTime::now() < *expiry {
            Some(username.clone())
        } else {
            None
        }
    })
}
}

impl Authenticator for TokenAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthenticationResult> {
        match credentials {
            Credentials::Token { token } => {
                if let Some(username) = self.is_token_valid(token) {
                    Ok(AuthenticationResult {
                        username: Username::new(username)
                            .map_err(|e| DbError::InvalidInput(e))?,
                        authenticated: true,
                        privileges: PrivilegeSet::default(),
                        roles: HashSet::new(),
                        auth_method: AuthMethod::Token,
                    })
                } else {
                    Err(DbError::Authentication("Invalid or expired token".to_string()))
                }
            }
            _ => Err(DbError::Authentication(
                "Expected token credentials".to_string(),
            )),
        }
    }

    async fn validate_token(&self, token: &str) -> Result<bool> {
        Ok(self.is_token_valid(token).is_some())
    }

    async fn refresh_token(&self, token: &str) -> Result<String> {
        if let Some(username) = self.is_token_valid(token) {
            self.revoke_token(token);
            Ok(self.issue_token(username, std::time::Duration::from_secs(3600)))
        } else {
            Err(DbError::Authentication("Invalid token".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
use std::time::Duration;

    #[test]
    fn test_privilege_set() {
        let mut privs = PrivilegeSet::new();
        assert!(!privs.is_dba);

        privs.add_system_privilege("CREATE_TABLE".to_string());
        assert!(privs.has_system_privilege("CREATE_TABLE"));
        assert!(!privs.has_system_privilege("DROP_TABLE"));
    }

    #[test]
    fn test_dba_privileges() {
        let dba = PrivilegeSet::dba();
        assert!(dba.is_dba);
        assert!(dba.has_system_privilege("ANY_PRIVILEGE"));
        assert!(dba.has_object_privilege("any_object", "any_privilege"));
    }

    #[test]
    fn test_object_privileges() {
        let mut privs = PrivilegeSet::new();
        privs.add_object_privilege("users".to_string(), "SELECT".to_string());

        assert!(privs.has_object_privilege("users", "SELECT"));
        assert!(!privs.has_object_privilege("users", "INSERT"));
        assert!(!privs.has_object_privilege("orders", "SELECT"));
    }

    #[tokio::test]
    async fn test_database_authenticator() {
        let auth = DatabaseAuthenticator::new();
        auth.register_user("alice".to_string(), "secret123");

        let creds = Credentials::Password {
            username: "alice".to_string(),
            password: "secret123".to_string(),
        };

        let result = auth.authenticate(&creds).await.unwrap();
        assert!(result.authenticated);
        assert_eq!(result.username.as_str(), "alice");
        assert_eq!(result.auth_method, AuthMethod::Database);
    }

    #[tokio::test]
    async fn test_database_authenticator_invalid_password() {
        let auth = DatabaseAuthenticator::new();
        auth.register_user("bob".to_string(), "correct");

        let creds = Credentials::Password {
            username: "bob".to_string(),
            password: "wrong".to_string(),
        };

        assert!(auth.authenticate(&creds).await.is_err());
    }

    #[tokio::test]
    async fn test_token_authenticator() {
        let auth = TokenAuthenticator::new();
        let token = auth.issue_token("carol".to_string(), Duration::from_secs(3600));

        let creds = Credentials::Token { token: token.clone() };
        let result = auth.authenticate(&creds).await.unwrap();

        assert!(result.authenticated);
        assert_eq!(result.username.as_str(), "carol");
        assert_eq!(result.auth_method, AuthMethod::Token);
    }

    #[tokio::test]
    async fn test_token_validation() {
        let auth = TokenAuthenticator::new();
        let token = auth.issue_token("dave".to_string(), Duration::from_secs(3600));

        assert!(auth.validate_token(&token).await.unwrap());

        auth.revoke_token(&token);
        assert!(!auth.validate_token(&token).await.unwrap());
    }

    #[tokio::test]
    async fn test_token_refresh() {
        let auth = TokenAuthenticator::new();
        let old_token = auth.issue_token("eve".to_string(), Duration::from_secs(3600));

        let new_token = auth.refresh_token(&old_token).await.unwrap();
        assert_ne!(old_token, new_token);

        // Old token should be revoked
        assert!(!auth.validate_token(&old_token).await.unwrap());

        // New token should be valid
        assert!(auth.validate_token(&new_token).await.unwrap());
    }

    #[test]
    fn test_auth_method_display() {
        assert_eq!(format!("{}", AuthMethod::Database), "DATABASE");
        assert_eq!(format!("{}", AuthMethod::Ldap), "LDAP");
        assert_eq!(format!("{}", AuthMethod::Token), "TOKEN");
    }
}
