use super::client::ApiClient;
use super::{ApiConfig, CollaboratorError, OrderSubmitter};
use async_trait::async_trait;
use ot2protocols::workflows::sanger::OrderPayload;
use reqwest::Method;
use serde_json::Value;

pub const SERVICE: &str = "GeneWiz";
pub const DEFAULT_API_URL: &str = "https://api.genewiz.com";
const ORDERS_ENDPOINT: &str = "sequencing/orders";

/// Places sequencing orders.
#[derive(Debug, Clone)]
pub struct GeneWizClient {
    api: ApiClient,
}

impl GeneWizClient {
    pub fn from_config(config: &ApiConfig) -> Result<Self, CollaboratorError> {
        Ok(Self {
            api: ApiClient::new(SERVICE, config)?,
        })
    }
}

#[async_trait]
impl OrderSubmitter for GeneWizClient {
    fn name(&self) -> &'static str {
        SERVICE
    }

    async fn submit(&self, order: &OrderPayload) -> Result<Value, CollaboratorError> {
        let request = self
            .api
            .request(Method::POST, ORDERS_ENDPOINT)
            .bearer_auth(self.api.api_key())
            .json(order);
        self.api.send_json(request).await
    }
}
