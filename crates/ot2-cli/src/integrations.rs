//! Optional collaborators of a Sanger run: a sequence lookup service that fills
//! in missing PAI sequences and an order service that receives the finished
//! order. Neither can fail a run; every failure is logged and degrades to
//! "no sequence" or a failed [`OrderStatus`].

pub mod benchling;
pub mod client;
pub mod genewiz;

use async_trait::async_trait;
use ot2protocols::workflows::sanger::{OrderPayload, OrderStatus};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for one collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub enabled: bool,
    pub api_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn disabled(api_url: impl Into<String>) -> Self {
        Self {
            enabled: false,
            api_url: api_url.into(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("Missing API key for {service}")]
    MissingApiKey { service: &'static str },

    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} rejected request ({status}): {body}")]
    Rejected {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} returned invalid JSON: {reason}")]
    InvalidResponse {
        service: &'static str,
        reason: String,
    },

    #[error("{service} did not answer within {secs}s")]
    Timeout { service: &'static str, secs: u64 },

    #[error("No sequence data found for {0}")]
    NoResult(String),
}

#[async_trait]
pub trait SequenceLookup: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the stored sequence for a sample id.
    async fn lookup(&self, sample_id: &str) -> Result<String, CollaboratorError>;
}

#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Submits the order and returns the service's JSON response.
    async fn submit(&self, order: &OrderPayload) -> Result<serde_json::Value, CollaboratorError>;
}

/// Looks up each id in turn. Ids that fail, time out or come back empty are
/// left out of the returned map.
pub async fn resolve_sequences(
    lookup: &dyn SequenceLookup,
    sample_ids: &[String],
    timeout: Duration,
) -> BTreeMap<String, String> {
    let mut sequences = BTreeMap::new();
    for id in sample_ids {
        match tokio::time::timeout(timeout, lookup.lookup(id)).await {
            Ok(Ok(sequence)) if !sequence.trim().is_empty() => {
                debug!(sample = %id, service = lookup.name(), "Resolved sequence");
                sequences.insert(id.clone(), sequence.trim().to_string());
            }
            Ok(Ok(_)) => {
                debug!(sample = %id, service = lookup.name(), "Lookup returned an empty sequence");
            }
            Ok(Err(e)) => {
                warn!(sample = %id, service = lookup.name(), error = %e, "Sequence lookup failed");
            }
            Err(_) => {
                warn!(
                    sample = %id,
                    service = lookup.name(),
                    timeout_secs = timeout.as_secs(),
                    "Sequence lookup timed out"
                );
            }
        }
    }
    info!(
        "Resolved {} of {} missing sequence(s) from {}.",
        sequences.len(),
        sample_ids.len(),
        lookup.name()
    );
    sequences
}

/// Submits the order when a submitter is configured.
pub async fn submit_order(
    submitter: Option<&dyn OrderSubmitter>,
    order: &OrderPayload,
    timeout: Duration,
) -> OrderStatus {
    let Some(submitter) = submitter else {
        return OrderStatus::Disabled;
    };
    let result = match tokio::time::timeout(timeout, submitter.submit(order)).await {
        Ok(result) => result,
        Err(_) => Err(CollaboratorError::Timeout {
            service: submitter.name(),
            secs: timeout.as_secs(),
        }),
    };
    match result {
        Ok(response) => {
            info!("Order for {} sample(s) submitted to {}.", order.samples.len(), submitter.name());
            OrderStatus::Submitted { response }
        }
        Err(e) => {
            warn!(service = submitter.name(), error = %e, "Order submission failed");
            OrderStatus::Failed {
                error: e.to_string(),
            }
        }
    }
}

/// The configured lookup service, or `None` when it is disabled or cannot be
/// set up.
pub fn sequence_lookup(config: &ApiConfig) -> Option<Box<dyn SequenceLookup>> {
    if !config.enabled {
        debug!("Sequence lookup is disabled.");
        return None;
    }
    match benchling::BenchlingClient::from_config(config) {
        Ok(client) => Some(Box::new(client)),
        Err(e) => {
            warn!(error = %e, "Sequence lookup is enabled but unavailable");
            None
        }
    }
}

/// The configured order service. An enabled service that cannot be set up
/// yields the failed status to report in its place.
pub fn order_submitter(config: &ApiConfig) -> Result<Option<Box<dyn OrderSubmitter>>, OrderStatus> {
    if !config.enabled {
        return Ok(None);
    }
    match genewiz::GeneWizClient::from_config(config) {
        Ok(client) => Ok(Some(Box::new(client))),
        Err(e) => Err(OrderStatus::Failed {
            error: e.to_string(),
        }),
    }
}
