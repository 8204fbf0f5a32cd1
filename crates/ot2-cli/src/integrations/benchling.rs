use super::client::ApiClient;
use super::{ApiConfig, CollaboratorError, SequenceLookup};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

pub const SERVICE: &str = "Benchling";
pub const DEFAULT_API_URL: &str = "https://api.benchling.com/v2";

/// Fetches oligo sequences by sample name.
#[derive(Debug, Clone)]
pub struct BenchlingClient {
    api: ApiClient,
}

impl BenchlingClient {
    pub fn from_config(config: &ApiConfig) -> Result<Self, CollaboratorError> {
        Ok(Self {
            api: ApiClient::new(SERVICE, config)?,
        })
    }
}

#[async_trait]
impl SequenceLookup for BenchlingClient {
    fn name(&self) -> &'static str {
        SERVICE
    }

    async fn lookup(&self, sample_id: &str) -> Result<String, CollaboratorError> {
        let request = self
            .api
            .request(Method::GET, "oligos")
            .header("X-Benchling-Api-Key", self.api.api_key())
            .query(&[("query", sample_id), ("limit", "1")]);
        let body = self.api.send_json(request).await?;
        sequence_from_response(sample_id, &body)
    }
}

/// Takes `data[0].sequence`; a missing sequence field reads as empty.
pub fn sequence_from_response(sample_id: &str, body: &Value) -> Result<String, CollaboratorError> {
    let first = body
        .get("data")
        .and_then(Value::as_array)
        .and_then(|results| results.first())
        .ok_or_else(|| CollaboratorError::NoResult(sample_id.to_string()))?;
    Ok(first
        .get("sequence")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_result_sequence_is_used() {
        let body = json!({ "data": [{ "sequence": "ATCG" }, { "sequence": "GGGG" }] });
        assert_eq!(sequence_from_response("S1", &body).unwrap(), "ATCG");
    }

    #[test]
    fn empty_results_are_no_result() {
        let err = sequence_from_response("S1", &json!({ "data": [] })).unwrap_err();
        assert!(matches!(err, CollaboratorError::NoResult(ref id) if id == "S1"));
        assert!(sequence_from_response("S1", &json!({})).is_err());
    }

    #[test]
    fn result_without_sequence_reads_as_empty() {
        let body = json!({ "data": [{ "name": "S1" }] });
        assert_eq!(sequence_from_response("S1", &body).unwrap(), "");
    }
}
