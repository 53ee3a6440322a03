// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Orderly-key request authentication.
//!
//! Private REST endpoints authenticate with an ed25519 signature over
//! `timestamp || METHOD || path[?query] || body`, sent alongside the
//! account id and the public key in `orderly-*` headers.

use alloy::primitives::B256;
use base64ct::{Base64UrlUnpadded, Encoding};
use ed25519_dalek::{Signature, Verifier};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::keys::{account_id_hex, decode_public_key, OrderlyKey};

pub const HEADER_TIMESTAMP: &str = "orderly-timestamp";
pub const HEADER_ACCOUNT_ID: &str = "orderly-account-id";
pub const HEADER_KEY: &str = "orderly-key";
pub const HEADER_SIGNATURE: &str = "orderly-signature";

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

/// Bytes covered by the request signature.
pub fn signature_payload(
    timestamp_ms: u64,
    method: &Method,
    url: &Url,
    body: Option<&str>,
) -> String {
    let mut payload = format!("{timestamp_ms}{}{}", method.as_str(), url.path());
    if let Some(query) = url.query() {
        payload.push('?');
        payload.push_str(query);
    }
    if let Some(body) = body {
        payload.push_str(body);
    }
    payload
}

fn content_type(method: &Method) -> &'static str {
    if *method == Method::GET || *method == Method::DELETE {
        FORM
    } else {
        JSON
    }
}

/// Authentication headers for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub timestamp: u64,
    pub account_id: String,
    pub orderly_key: String,
    pub signature: String,
    pub content_type: &'static str,
}

impl SignedHeaders {
    pub fn to_header_map(&self) -> ClientResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let mut put = |name: &'static str, value: &str| -> ClientResult<()> {
            let value = HeaderValue::from_str(value)
                .map_err(|e| ClientError::Signing(format!("header {name}: {e}")))?;
            headers.insert(name, value);
            Ok(())
        };
        put(HEADER_TIMESTAMP, &self.timestamp.to_string())?;
        put(HEADER_ACCOUNT_ID, &self.account_id)?;
        put(HEADER_KEY, &self.orderly_key)?;
        put(HEADER_SIGNATURE, &self.signature)?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(self.content_type));
        Ok(headers)
    }

    /// Attach the headers to an outgoing request.
    pub fn apply(&self, request: RequestBuilder) -> ClientResult<RequestBuilder> {
        Ok(request.headers(self.to_header_map()?))
    }
}

/// Sign a request with the account's Orderly key.
pub fn sign_request(
    account_id: &B256,
    key: &OrderlyKey,
    method: &Method,
    url: &Url,
    body: Option<&str>,
    timestamp_ms: u64,
) -> SignedHeaders {
    let payload = signature_payload(timestamp_ms, method, url, body);
    let signature = key.sign(payload.as_bytes());
    SignedHeaders {
        timestamp: timestamp_ms,
        account_id: account_id_hex(account_id),
        orderly_key: key.public_key(),
        signature: Base64UrlUnpadded::encode_string(&signature.to_bytes()),
        content_type: content_type(method),
    }
}

/// Check a request signature against the `ed25519:` public key it names.
pub fn verify_request(
    orderly_key: &str,
    signature_b64: &str,
    timestamp_ms: u64,
    method: &Method,
    url: &Url,
    body: Option<&str>,
) -> ClientResult<()> {
    let public = decode_public_key(orderly_key)?;
    let raw = Base64UrlUnpadded::decode_vec(signature_b64.trim_end_matches('='))
        .map_err(|e| ClientError::Signing(format!("invalid signature encoding: {e}")))?;
    let bytes: [u8; 64] = raw
        .as_slice()
        .try_into()
        .map_err(|_| ClientError::Signing("signature must be 64 bytes".to_string()))?;
    let payload = signature_payload(timestamp_ms, method, url, body);
    public
        .verify(payload.as_bytes(), &Signature::from_bytes(&bytes))
        .map_err(|e| ClientError::Signing(e.to_string()))
}
