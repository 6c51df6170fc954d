//! Adapter construction, caching, and health checking.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OnceCell, RwLock};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use llmgate_core::types::HealthStatus;
use llmgate_core::GatewayError;
use llmgate_provider_openai_compatible::ProviderAdapter;
use llmgate_registry::{CredentialStore, ModelDescriptor, ModelRegistry, ProviderKey};

/// Factory tuning knobs.
#[derive(Debug, Clone)]
pub struct FactoryConfig {
    /// Cadence of the periodic health sweep.
    pub health_check_interval: Duration,
    /// Consecutive failed checks after which a cached handle is evicted.
    pub eviction_threshold: u32,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            health_check_interval: Duration::from_secs(60),
            eviction_threshold: 3,
        }
    }
}

type AdapterSlot = Arc<OnceCell<Arc<ProviderAdapter>>>;

struct HealthSlot {
    status: Arc<HealthStatus>,
    consecutive_failures: u32,
}

/// Constructs and caches one adapter handle per provider configuration.
///
/// The cache is keyed by configuration identity ([`ProviderKey`]), not by
/// model identifier: several logical models routinely share one endpoint and
/// credential, and they all borrow the same live handle. Concurrent callers
/// racing on an uncached key await a single construction.
pub struct AdapterFactory {
    registry: Arc<ModelRegistry>,
    credentials: Arc<dyn CredentialStore>,
    config: FactoryConfig,
    adapters: RwLock<HashMap<ProviderKey, AdapterSlot>>,
    health: RwLock<HashMap<ProviderKey, HealthSlot>>,
}

impl AdapterFactory {
    pub fn new(
        registry: Arc<ModelRegistry>,
        credentials: Arc<dyn CredentialStore>,
        config: FactoryConfig,
    ) -> Self {
        Self {
            registry,
            credentials,
            config,
            adapters: RwLock::new(HashMap::new()),
            health: RwLock::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Resolve a model identifier and return its provider's adapter handle.
    pub async fn get_adapter(
        &self,
        model_id: &str,
    ) -> Result<Arc<ProviderAdapter>, GatewayError> {
        let descriptor = self.registry.resolve(model_id)?;
        self.adapter_for(&descriptor).await
    }

    /// Like [`get_adapter`](Self::get_adapter) for an already resolved
    /// descriptor.
    ///
    /// Construction failures are not cached; the next call retries.
    pub async fn adapter_for(
        &self,
        descriptor: &ModelDescriptor,
    ) -> Result<Arc<ProviderAdapter>, GatewayError> {
        let key = descriptor.provider_key();

        // Fast path: an initialized slot needs no write lock and no waiting.
        if let Some(slot) = self.adapters.read().await.get(&key)
            && let Some(adapter) = slot.get()
        {
            return Ok(adapter.clone());
        }

        let slot = {
            let mut adapters = self.adapters.write().await;
            adapters.entry(key).or_default().clone()
        };

        let adapter = slot
            .get_or_try_init(|| async {
                debug!(
                    model_id = %descriptor.model_id,
                    endpoint = %descriptor.endpoint,
                    "constructing provider adapter"
                );
                ProviderAdapter::for_descriptor(descriptor, self.credentials.as_ref())
                    .await
                    .map(Arc::new)
            })
            .await?;

        Ok(adapter.clone())
    }

    /// Probe every distinct provider configuration in the current registry
    /// snapshot and update its health slot.
    ///
    /// This is the single writer of health state. A handle that has failed
    /// `eviction_threshold` consecutive checks is dropped from the cache so
    /// the next `get_adapter` call rebuilds it.
    pub async fn run_health_checks(&self) {
        let snapshot = self.registry.snapshot();
        let mut seen = HashSet::new();

        for descriptor in snapshot.list() {
            let key = descriptor.provider_key();
            if !seen.insert(key.clone()) {
                continue;
            }

            let status = match self.adapter_for(descriptor).await {
                Ok(adapter) => adapter.health_check(descriptor).await,
                Err(err) => {
                    warn!(
                        model_id = %descriptor.model_id,
                        error = %err,
                        "health check could not construct adapter"
                    );
                    HealthStatus::unhealthy(
                        descriptor.provider_family,
                        &descriptor.model_id,
                        err.kind(),
                    )
                }
            };
            self.record_health(&key, status).await;
        }
    }

    async fn record_health(&self, key: &ProviderKey, status: HealthStatus) {
        let evict = {
            let mut health = self.health.write().await;
            let slot = health.entry(key.clone()).or_insert_with(|| HealthSlot {
                status: Arc::new(HealthStatus::unchecked(
                    status.provider_family,
                    status.model_id.clone(),
                )),
                consecutive_failures: 0,
            });

            let healthy = status.healthy;
            slot.status = Arc::new(status);
            if healthy {
                slot.consecutive_failures = 0;
                false
            } else {
                slot.consecutive_failures += 1;
                if slot.consecutive_failures >= self.config.eviction_threshold {
                    slot.consecutive_failures = 0;
                    true
                } else {
                    false
                }
            }
        };

        if evict && self.adapters.write().await.remove(key).is_some() {
            warn!(
                endpoint = %key.endpoint,
                threshold = self.config.eviction_threshold,
                "evicted adapter handle after repeated failed health checks"
            );
        }
    }

    /// Read-only health snapshot for a model's provider configuration.
    ///
    /// A provider that has never been checked reports healthy with no
    /// `last_checked_at`, so a freshly loaded registry is immediately
    /// routable.
    pub async fn status(&self, model_id: &str) -> Result<HealthStatus, GatewayError> {
        let descriptor = self.registry.resolve(model_id)?;
        let key = descriptor.provider_key();

        let health = self.health.read().await;
        Ok(match health.get(&key) {
            Some(slot) => {
                let mut status = (*slot.status).clone();
                status.model_id = descriptor.model_id.clone();
                status
            }
            None => HealthStatus::unchecked(descriptor.provider_family, &descriptor.model_id),
        })
    }

    /// Drive [`run_health_checks`](Self::run_health_checks) on the configured
    /// interval until the returned task is aborted.
    pub fn spawn_health_loop(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let factory = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(factory.config.health_check_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                factory.run_health_checks().await;
            }
        })
    }
}

impl std::fmt::Debug for AdapterFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterFactory")
            .field("config", &self.config)
            .finish()
    }
}
