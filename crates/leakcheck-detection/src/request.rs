//! Per-credential lookup requests against the leak detection endpoint.

use async_trait::async_trait;
use leakcheck_core::DetectionConfig;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::cipher::LookupSingleLeakPayload;
use crate::credential::IsLeaked;
use crate::error::LeakDetectionError;
use crate::token::AccessToken;

/// A single, one-shot lookup of one credential.
#[async_trait]
pub trait LeakDetectionRequest: Send + Sync {
    async fn lookup_single_leak(
        &self,
        access_token: &AccessToken,
        payload: LookupSingleLeakPayload,
    ) -> Result<IsLeaked, LeakDetectionError>;
}

/// Produces one [`LeakDetectionRequest`] per credential in a batch.
pub trait LeakDetectionRequestFactory: Send + Sync {
    fn create_request(&self) -> Box<dyn LeakDetectionRequest>;
}

#[derive(Serialize)]
struct LookupSingleLeakBody<'a> {
    username_hash_prefix: &'a [u8],
    encrypted_payload: &'a [u8],
}

#[derive(Deserialize)]
struct LookupSingleLeakResponse {
    leak_match: bool,
}

/// HTTP implementation: POSTs the payload as JSON with a bearer token.
pub struct HttpLeakDetectionRequest {
    client: reqwest::Client,
    endpoint_url: String,
}

#[async_trait]
impl LeakDetectionRequest for HttpLeakDetectionRequest {
    async fn lookup_single_leak(
        &self,
        access_token: &AccessToken,
        payload: LookupSingleLeakPayload,
    ) -> Result<IsLeaked, LeakDetectionError> {
        let body = LookupSingleLeakBody {
            username_hash_prefix: &payload.username_hash_prefix,
            encrypted_payload: &payload.encrypted_payload,
        };
        trace!("issuing leak lookup against {}", self.endpoint_url);

        let response = self
            .client
            .post(&self.endpoint_url)
            .bearer_auth(&access_token.0)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LeakDetectionError::InvalidServerResponse(format!(
                "unexpected HTTP status {status}"
            )));
        }

        let parsed: LookupSingleLeakResponse = response
            .json()
            .await
            .map_err(|e| LeakDetectionError::InvalidServerResponse(e.to_string()))?;
        debug!("leak lookup completed (leak_match: {})", parsed.leak_match);
        Ok(IsLeaked(parsed.leak_match))
    }
}

/// Factory for [`HttpLeakDetectionRequest`]s sharing one connection pool.
pub struct HttpLeakDetectionRequestFactory {
    client: reqwest::Client,
    endpoint_url: String,
}

impl HttpLeakDetectionRequestFactory {
    pub fn new(config: &DetectionConfig) -> Result<Self, LeakDetectionError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint_url: config.endpoint_url.clone(),
        })
    }
}

impl LeakDetectionRequestFactory for HttpLeakDetectionRequestFactory {
    fn create_request(&self) -> Box<dyn LeakDetectionRequest> {
        Box::new(HttpLeakDetectionRequest {
            client: self.client.clone(),
            endpoint_url: self.endpoint_url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_has_stable_field_names() {
        let body = LookupSingleLeakBody {
            username_hash_prefix: &[0xbd, 0x74, 0xa9],
            encrypted_payload: &[1, 2, 3],
        };
        let value = serde_json::to_value(&body).expect("serialize body");
        assert_eq!(
            value,
            serde_json::json!({
                "username_hash_prefix": [0xbd, 0x74, 0xa9],
                "encrypted_payload": [1, 2, 3],
            })
        );
    }

    #[test]
    fn response_parses_leak_match() {
        let parsed: LookupSingleLeakResponse =
            serde_json::from_str(r#"{"leak_match": true}"#).expect("parse response");
        assert!(parsed.leak_match);
    }
}
