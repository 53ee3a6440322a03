// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process stand-in for the Orderly REST backend.
//!
//! Verifies EIP-712 signatures and orderly-key request signatures the way
//! the real service does, issues single-use nonces, and counts hits per
//! path so tests can assert that nothing was retried.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, Signature};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::chain::ChainId;
use crate::eip712::{
    AddOrderlyKeyMessage, DelegateAddOrderlyKeyMessage, DelegateInternalTransferMessage,
    DelegateSettlePnlMessage, DelegateSignerMessage, DelegateWithdrawMessage,
    InternalTransferMessage, RegistrationMessage, SettlePnlMessage, TypedMessage, WithdrawMessage,
};
use crate::keys::{account_id, account_id_hex};
use crate::signing::{
    verify_request, HEADER_ACCOUNT_ID, HEADER_KEY, HEADER_SIGNATURE, HEADER_TIMESTAMP,
};

pub const KNOWN_BROKER: &str = "woofi_dex";
pub const USDC_HOLDING: f64 = 250.5;
pub const WITHDRAW_FEE: f64 = 1.0;

#[derive(Default)]
pub struct MockState {
    pub chain_id: u64,
    next_registration_nonce: u64,
    issued_registration_nonces: HashSet<String>,
    /// account id hex -> registered public keys
    keys: HashMap<String, HashSet<String>>,
    pub withdraw_nonce: u64,
    pub settle_nonce: u64,
    pub transfer_nonce: u64,
    /// Simulates another session consuming the nonce right after it is read.
    pub stale_withdraw_nonce: bool,
    pub hits: HashMap<String, usize>,
    pub last_body: HashMap<String, Value>,
}

pub type Shared = Arc<Mutex<MockState>>;

pub struct MockServer {
    pub addr: SocketAddr,
    pub state: Shared,
}

impl MockServer {
    pub async fn start(chain_id: ChainId) -> Self {
        let state = Arc::new(Mutex::new(MockState {
            chain_id: chain_id.as_u64(),
            next_registration_nonce: 194_528_949_540,
            ..Default::default()
        }));
        let app = router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self, path: &str) -> usize {
        self.state.lock().unwrap().hits.get(path).copied().unwrap_or(0)
    }

    pub fn last_body(&self, path: &str) -> Option<Value> {
        self.state.lock().unwrap().last_body.get(path).cloned()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/v1/registration_nonce", get(registration_nonce))
        .route("/v1/register_account", post(register_account))
        .route("/v1/orderly_key", post(orderly_key))
        .route("/v1/delegate_signer", post(delegate_signer))
        .route("/v1/delegate_orderly_key", post(delegate_orderly_key))
        .route("/v1/withdraw_nonce", get(withdraw_nonce))
        .route("/v1/withdraw_request", post(withdraw_request))
        .route("/v1/delegate_withdraw_request", post(delegate_withdraw_request))
        .route("/v1/settle_nonce", get(settle_nonce))
        .route("/v1/settle_pnl", post(settle_pnl))
        .route("/v1/delegate_settle_pnl", post(delegate_settle_pnl))
        .route("/v1/transfer_nonce", get(transfer_nonce))
        .route("/v2/internal_transfer", post(internal_transfer))
        .route("/v1/client/holding", get(client_holding))
        .route("/v1/positions", get(positions))
        .route("/v1/asset/history", get(asset_history))
        .route("/v1/public/account", get(public_account))
        .route("/v1/public/broker/name", get(broker_name))
        .route("/v1/public/token", get(public_token))
        .with_state(state)
}

fn ok(data: Value) -> Response {
    Json(json!({ "success": true, "data": data })).into_response()
}

fn fail(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "message": message })),
    )
        .into_response()
}

fn record(state: &Shared, uri: &Uri, body: Option<&str>) {
    let mut s = state.lock().unwrap();
    *s.hits.entry(uri.path().to_string()).or_default() += 1;
    if let Some(body) = body.and_then(|b| serde_json::from_str(b).ok()) {
        s.last_body.insert(uri.path().to_string(), body);
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Signed<M> {
    message: M,
    signature: String,
    user_address: Address,
}

/// Parse a signed body and check the wallet signature over its message.
fn verify_typed<M: TypedMessage + DeserializeOwned>(
    chain_id: u64,
    body: &str,
) -> Result<Signed<M>, Response> {
    verify_signed(chain_id, parse_body(body)?)
}

fn parse_body(body: &str) -> Result<Value, Response> {
    serde_json::from_str(body).map_err(|e| fail(&format!("malformed body: {e}")))
}

/// Check the wallet signature over an already parsed body.
fn verify_signed<M: TypedMessage + DeserializeOwned>(
    chain_id: u64,
    body: Value,
) -> Result<Signed<M>, Response> {
    let signed: Signed<M> =
        serde_json::from_value(body).map_err(|e| fail(&format!("malformed body: {e}")))?;
    let hash = signed
        .message
        .signing_hash(ChainId::new(chain_id))
        .map_err(|e| fail(&e.to_string()))?;
    let signature = Signature::from_str(&signed.signature).map_err(|_| fail("bad signature"))?;
    let recovered = signature
        .recover_address_from_prehash(&hash)
        .map_err(|_| fail("bad signature"))?;
    if recovered != signed.user_address {
        return Err(fail("signature does not match user address"));
    }
    Ok(signed)
}

/// Check orderly-key headers against a registered key; returns the account id.
fn authenticate(
    state: &Shared,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: Option<&str>,
) -> Result<String, Response> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| fail(&format!("missing {name}")))
    };
    let timestamp: u64 = header(HEADER_TIMESTAMP)?
        .parse()
        .map_err(|_| fail("bad timestamp"))?;
    let account = header(HEADER_ACCOUNT_ID)?;
    let key = header(HEADER_KEY)?;
    let signature = header(HEADER_SIGNATURE)?;

    let registered = state
        .lock()
        .unwrap()
        .keys
        .get(&account)
        .is_some_and(|k| k.contains(&key));
    if !registered {
        return Err(fail("orderly key is not registered"));
    }

    let url = Url::parse(&format!("http://mock{uri}")).map_err(|_| fail("bad uri"))?;
    let method = reqwest::Method::from_bytes(method.as_str().as_bytes())
        .map_err(|_| fail("bad method"))?;
    verify_request(&key, &signature, timestamp, &method, &url, body)
        .map_err(|_| fail("orderly signature mismatch"))?;
    Ok(account)
}

fn chain_of(state: &Shared) -> u64 {
    state.lock().unwrap().chain_id
}

async fn registration_nonce(State(state): State<Shared>, uri: Uri) -> Response {
    record(&state, &uri, None);
    let mut s = state.lock().unwrap();
    let nonce = s.next_registration_nonce.to_string();
    s.next_registration_nonce += 1;
    s.issued_registration_nonces.insert(nonce.clone());
    ok(json!({ "registration_nonce": nonce }))
}

async fn register_account(State(state): State<Shared>, uri: Uri, body: String) -> Response {
    record(&state, &uri, Some(&body));
    let signed = match verify_typed::<RegistrationMessage>(chain_of(&state), &body) {
        Ok(s) => s,
        Err(r) => return r,
    };
    if signed.message.broker_id != KNOWN_BROKER {
        return fail("Broker id is not exist");
    }
    if !state
        .lock()
        .unwrap()
        .issued_registration_nonces
        .remove(&signed.message.registration_nonce)
    {
        return fail("registration nonce is invalid");
    }
    let id = account_id(signed.user_address, &signed.message.broker_id);
    ok(json!({ "account_id": account_id_hex(&id) }))
}

fn store_key(state: &Shared, account: String, key: String) {
    state
        .lock()
        .unwrap()
        .keys
        .entry(account)
        .or_default()
        .insert(key);
}

async fn orderly_key(State(state): State<Shared>, uri: Uri, body: String) -> Response {
    record(&state, &uri, Some(&body));
    let signed = match verify_typed::<AddOrderlyKeyMessage>(chain_of(&state), &body) {
        Ok(s) => s,
        Err(r) => return r,
    };
    let id = account_id(signed.user_address, &signed.message.broker_id);
    store_key(&state, account_id_hex(&id), signed.message.orderly_key);
    ok(json!({ "id": 1 }))
}

async fn delegate_signer(State(state): State<Shared>, uri: Uri, body: String) -> Response {
    record(&state, &uri, Some(&body));
    let signed = match verify_typed::<DelegateSignerMessage>(chain_of(&state), &body) {
        Ok(s) => s,
        Err(r) => return r,
    };
    if !state
        .lock()
        .unwrap()
        .issued_registration_nonces
        .remove(&signed.message.registration_nonce.to_string())
    {
        return fail("registration nonce is invalid");
    }
    ok(json!({
        "user_id": 4242,
        "valid_signer": signed.user_address.to_string(),
    }))
}

async fn delegate_orderly_key(State(state): State<Shared>, uri: Uri, body: String) -> Response {
    record(&state, &uri, Some(&body));
    let signed = match verify_typed::<DelegateAddOrderlyKeyMessage>(chain_of(&state), &body) {
        Ok(s) => s,
        Err(r) => return r,
    };
    let id = account_id(signed.message.delegate_contract, &signed.message.broker_id);
    store_key(&state, account_id_hex(&id), signed.message.orderly_key);
    ok(json!({ "id": 2 }))
}

async fn withdraw_nonce(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    record(&state, &uri, None);
    if let Err(r) = authenticate(&state, &method, &uri, &headers, None) {
        return r;
    }
    let mut s = state.lock().unwrap();
    let nonce = s.withdraw_nonce;
    if s.stale_withdraw_nonce {
        s.withdraw_nonce += 1;
    }
    ok(json!({ "withdraw_nonce": nonce }))
}

fn consume(counter: &mut u64, presented: u64, what: &str) -> Result<(), Response> {
    if presented != *counter {
        return Err(fail(&format!("{what} nonce already used")));
    }
    *counter += 1;
    Ok(())
}

async fn withdraw_request(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    record(&state, &uri, Some(&body));
    if let Err(r) = authenticate(&state, &method, &uri, &headers, Some(&body)) {
        return r;
    }
    let signed = match verify_typed::<WithdrawMessage>(chain_of(&state), &body) {
        Ok(s) => s,
        Err(r) => return r,
    };
    let mut s = state.lock().unwrap();
    match consume(&mut s.withdraw_nonce, signed.message.withdraw_nonce, "withdraw") {
        Ok(()) => ok(json!({ "withdraw_id": 1 })),
        Err(r) => r,
    }
}

async fn delegate_withdraw_request(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    record(&state, &uri, Some(&body));
    if let Err(r) = authenticate(&state, &method, &uri, &headers, Some(&body)) {
        return r;
    }
    let signed = match verify_typed::<DelegateWithdrawMessage>(chain_of(&state), &body) {
        Ok(s) => s,
        Err(r) => return r,
    };
    let mut s = state.lock().unwrap();
    match consume(&mut s.withdraw_nonce, signed.message.withdraw_nonce, "withdraw") {
        Ok(()) => ok(json!({ "withdraw_id": 2 })),
        Err(r) => r,
    }
}

async fn settle_nonce(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    record(&state, &uri, None);
    if let Err(r) = authenticate(&state, &method, &uri, &headers, None) {
        return r;
    }
    // string-encoded on purpose
    let nonce = state.lock().unwrap().settle_nonce;
    ok(json!({ "settle_nonce": nonce.to_string() }))
}

async fn settle_pnl(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    record(&state, &uri, Some(&body));
    if let Err(r) = authenticate(&state, &method, &uri, &headers, Some(&body)) {
        return r;
    }
    let signed = match verify_typed::<SettlePnlMessage>(chain_of(&state), &body) {
        Ok(s) => s,
        Err(r) => return r,
    };
    let mut s = state.lock().unwrap();
    match consume(&mut s.settle_nonce, signed.message.settle_nonce, "settle") {
        Ok(()) => ok(json!({ "settle_pnl_id": 1 })),
        Err(r) => r,
    }
}

async fn delegate_settle_pnl(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    record(&state, &uri, Some(&body));
    if let Err(r) = authenticate(&state, &method, &uri, &headers, Some(&body)) {
        return r;
    }
    let signed = match verify_typed::<DelegateSettlePnlMessage>(chain_of(&state), &body) {
        Ok(s) => s,
        Err(r) => return r,
    };
    let mut s = state.lock().unwrap();
    match consume(&mut s.settle_nonce, signed.message.settle_nonce, "settle") {
        Ok(()) => ok(json!({ "settle_pnl_id": 2 })),
        Err(r) => r,
    }
}

async fn transfer_nonce(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    record(&state, &uri, None);
    if let Err(r) = authenticate(&state, &method, &uri, &headers, None) {
        return r;
    }
    let nonce = state.lock().unwrap().transfer_nonce;
    ok(json!({ "transfer_nonce": nonce }))
}

async fn internal_transfer(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    record(&state, &uri, Some(&body));
    if let Err(r) = authenticate(&state, &method, &uri, &headers, Some(&body)) {
        return r;
    }
    let chain = chain_of(&state);
    let value = match parse_body(&body) {
        Ok(value) => value,
        Err(r) => return r,
    };
    let nonce = if value["message"].get("delegateContract").is_some() {
        match verify_signed::<DelegateInternalTransferMessage>(chain, value) {
            Ok(s) => s.message.transfer_nonce,
            Err(r) => return r,
        }
    } else {
        match verify_signed::<InternalTransferMessage>(chain, value) {
            Ok(s) => s.message.transfer_nonce,
            Err(r) => return r,
        }
    };
    let mut s = state.lock().unwrap();
    match consume(&mut s.transfer_nonce, nonce, "transfer") {
        Ok(()) => ok(json!({ "transfer_id": 1 })),
        Err(r) => r,
    }
}

async fn client_holding(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    record(&state, &uri, None);
    if let Err(r) = authenticate(&state, &method, &uri, &headers, None) {
        return r;
    }
    ok(json!({
        "holding": [
            { "token": "ETH", "holding": 0.25, "frozen": 0.0, "pending_short": 0.0 },
            {
                "token": "USDC",
                "holding": USDC_HOLDING,
                "frozen": 0.0,
                "pending_short": 0.0,
                "updated_time": 1_700_000_000_000u64
            }
        ]
    }))
}

async fn positions(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    record(&state, &uri, None);
    if let Err(r) = authenticate(&state, &method, &uri, &headers, None) {
        return r;
    }
    ok(json!({
        "rows": [
            { "symbol": "PERP_ETH_USDC", "position_qty": 0.5, "unsettled_pnl": 12.25 },
            { "symbol": "PERP_BTC_USDC", "position_qty": -0.01, "unsettled_pnl": -2.0 }
        ]
    }))
}

#[derive(Deserialize)]
struct HistoryParams {
    side: Option<String>,
    page: Option<u32>,
}

async fn asset_history(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<HistoryParams>,
) -> Response {
    record(&state, &uri, None);
    if let Err(r) = authenticate(&state, &method, &uri, &headers, None) {
        return r;
    }
    let rows = [
        json!({
            "id": "1",
            "tx_id": "0x01",
            "side": "DEPOSIT",
            "token": "USDC",
            "amount": 100.0,
            "fee": 0.0,
            "trans_status": "COMPLETED",
            "created_time": 1u64
        }),
        json!({
            "id": "2",
            "side": "WITHDRAW",
            "token": "USDC",
            "amount": 10.0,
            "fee": 1.0,
            "trans_status": "PENDING",
            "created_time": 2u64
        }),
    ];
    let rows: Vec<Value> = rows
        .into_iter()
        .filter(|r| params.side.as_deref().map_or(true, |s| r["side"] == s))
        .collect();
    ok(json!({
        "meta": {
            "total": rows.len(),
            "records_per_page": 25,
            "current_page": params.page.unwrap_or(1)
        },
        "rows": rows
    }))
}

#[derive(Deserialize)]
struct AccountParams {
    address: String,
    broker_id: String,
}

async fn public_account(
    State(state): State<Shared>,
    uri: Uri,
    Query(params): Query<AccountParams>,
) -> Response {
    record(&state, &uri, None);
    let Ok(address) = Address::from_str(&params.address) else {
        return fail("invalid address");
    };
    let id = account_id(address, &params.broker_id);
    if !state.lock().unwrap().keys.contains_key(&account_id_hex(&id)) {
        return fail("account not found");
    }
    ok(json!({ "user_id": 4242, "account_id": account_id_hex(&id) }))
}

#[derive(Deserialize)]
struct BrokerParams {
    broker_id: String,
}

async fn broker_name(
    State(state): State<Shared>,
    uri: Uri,
    Query(params): Query<BrokerParams>,
) -> Response {
    record(&state, &uri, None);
    if params.broker_id == KNOWN_BROKER {
        ok(json!({ "broker_id": KNOWN_BROKER, "broker_name": "WOOFi Pro" }))
    } else {
        // upstream proxy failure without an envelope
        (StatusCode::BAD_GATEWAY, "bad gateway").into_response()
    }
}

async fn public_token(State(state): State<Shared>, uri: Uri) -> Response {
    record(&state, &uri, None);
    let chain = chain_of(&state);
    ok(json!({
        "rows": [{
            "token": "USDC",
            "decimals": 6,
            "minimum_withdraw_amount": 0.000001,
            "chain_details": [
                { "chain_id": chain.to_string(), "decimals": 6, "withdrawal_fee": WITHDRAW_FEE }
            ]
        }]
    }))
}
