//! Read-only model cards for the listing/health surface.

use chrono::{DateTime, Utc};
use serde::Serialize;

use llmgate_core::types::ProviderFamily;
use llmgate_core::GatewayError;

use crate::factory::AdapterFactory;

/// Descriptor and health joined into one card, as consumed by the external
/// models-list surface.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub model_id: String,
    pub display_name: String,
    pub provider_family: ProviderFamily,
    pub supports_streaming: bool,
    pub max_context_tokens: u32,
    pub healthy: bool,
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl AdapterFactory {
    /// Card for one model.
    pub async fn model_info(&self, model_id: &str) -> Result<ModelInfo, GatewayError> {
        let descriptor = self.registry().resolve(model_id)?;
        let status = self.status(model_id).await?;
        Ok(ModelInfo {
            model_id: descriptor.model_id.clone(),
            display_name: descriptor.display_name.clone(),
            provider_family: descriptor.provider_family,
            supports_streaming: descriptor.supports_streaming,
            max_context_tokens: descriptor.max_context_tokens,
            healthy: status.healthy,
            last_checked_at: status.last_checked_at,
        })
    }

    /// Cards for every registered model, in registry order.
    pub async fn list_models(&self) -> Vec<ModelInfo> {
        let snapshot = self.registry().snapshot();
        let mut cards = Vec::with_capacity(snapshot.len());
        for descriptor in snapshot.list() {
            if let Ok(info) = self.model_info(&descriptor.model_id).await {
                cards.push(info);
            }
        }
        cards
    }
}
