// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Orderly REST client.
//!
//! Every response is wrapped in `{success, data?, message?}`. A response
//! with `success: false` becomes [`ClientError::Api`] carrying the server
//! message, whatever the HTTP status. Nothing here retries: a rejected
//! nonce or signature is reported once and the caller decides what to do.

pub mod account;
pub mod assets;

#[cfg(test)]
pub(crate) mod mock;

use std::time::Duration;

use alloy::primitives::B256;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::chain::{base_url, ChainId};
use crate::eip712::now_millis;
use crate::error::{ClientError, ClientResult};
use crate::keys::OrderlyKey;
use crate::signing::sign_request;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Response envelope shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// What private endpoints need to authenticate: the account and its key.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub account_id: B256,
    pub key: OrderlyKey,
}

impl Credentials {
    pub fn new(account_id: B256, key: OrderlyKey) -> Self {
        Self { account_id, key }
    }
}

/// Client bound to one chain's REST deployment.
#[derive(Debug, Clone)]
pub struct OrderlyClient {
    chain_id: ChainId,
    base_url: Url,
    http: Client,
}

impl OrderlyClient {
    /// Client for the chain's default deployment (mainnet or testnet).
    pub fn new(chain_id: ChainId) -> ClientResult<Self> {
        Self::with_base_url(chain_id, base_url(chain_id))
    }

    pub fn with_base_url(chain_id: ChainId, base_url: &str) -> ClientResult<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        // A path prefix (a proxy mount) must end in `/` to survive `Url::join`.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            chain_id,
            base_url,
            http,
        })
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> ClientResult<Url> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn get_public<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let url = self.url(path, query)?;
        let request = self.http.get(url);
        self.execute(Method::GET, path, request).await
    }

    async fn post_public<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = self.url(path, &[])?;
        let body = serde_json::to_string(body)
            .map_err(|e| ClientError::Signing(format!("failed to encode body: {e}")))?;
        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body);
        self.execute(Method::POST, path, request).await
    }

    async fn get_signed<T: DeserializeOwned>(
        &self,
        credentials: &Credentials,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let url = self.url(path, query)?;
        let headers = sign_request(
            &credentials.account_id,
            &credentials.key,
            &Method::GET,
            &url,
            None,
            now_millis(),
        );
        let request = headers.apply(self.http.get(url))?;
        self.execute(Method::GET, path, request).await
    }

    async fn post_signed<B: Serialize, T: DeserializeOwned>(
        &self,
        credentials: &Credentials,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = self.url(path, &[])?;
        let body = serde_json::to_string(body)
            .map_err(|e| ClientError::Signing(format!("failed to encode body: {e}")))?;
        let headers = sign_request(
            &credentials.account_id,
            &credentials.key,
            &Method::POST,
            &url,
            Some(&body),
            now_millis(),
        );
        let request = headers.apply(self.http.post(url))?.body(body);
        self.execute(Method::POST, path, request).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> ClientResult<T> {
        debug!(%method, path, "Sending request");
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode_envelope(status.as_u16(), &body).inspect_err(|e| {
            warn!(%method, path, status = status.as_u16(), error = %e, "Request failed");
        })
    }
}

/// Turn a raw response into the payload or the matching error.
fn decode_envelope<T: DeserializeOwned>(status: u16, body: &str) -> ClientResult<T> {
    let envelope: Envelope<Value> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) if (200..300).contains(&status) => {
            return Err(ClientError::Decode(format!("invalid envelope: {e}")));
        }
        Err(_) => {
            return Err(ClientError::Http {
                status,
                body: body.to_string(),
            });
        }
    };

    if !envelope.success {
        return Err(ClientError::api(
            envelope
                .message
                .unwrap_or_else(|| format!("request failed with status {status}")),
        ));
    }

    serde_json::from_value(envelope.data.unwrap_or(Value::Null))
        .map_err(|e| ClientError::Decode(e.to_string()))
}
