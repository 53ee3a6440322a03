// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account registration, delegate signers and Orderly key issuance.

use alloy::primitives::{Address, B256};
use serde::de::IgnoredAny;
use tracing::info;

use super::OrderlyClient;
use crate::blockchain::signing::Wallet;
use crate::eip712::{
    now_millis, sign_message, AddOrderlyKeyMessage, DelegateAddOrderlyKeyMessage,
    DelegateSignerMessage, RegistrationMessage,
};
use crate::error::{ClientError, ClientResult};
use crate::keys::{account_id_hex, parse_account_id, OrderlyKey, Scope, ORDERLY_KEY_LIFETIME_MS};
use crate::models::{
    AccountInfo, BrokerName, DelegateSignerLink, RegisteredAccount, RegistrationNonce,
};
use crate::storage::{KeyValueStore, OrderlyStorage};

impl OrderlyClient {
    /// Fresh single-use nonce for registration and delegate-signer messages.
    pub async fn registration_nonce(&self) -> ClientResult<String> {
        let nonce: RegistrationNonce = self.get_public("/v1/registration_nonce", &[]).await?;
        Ok(nonce.registration_nonce)
    }

    /// Register the wallet with `broker_id`; returns the new account id.
    pub async fn register_account(&self, wallet: &Wallet, broker_id: &str) -> ClientResult<B256> {
        let registration_nonce = self.registration_nonce().await?;
        let message = RegistrationMessage {
            broker_id: broker_id.to_string(),
            chain_id: self.chain_id.as_u64(),
            timestamp: now_millis(),
            registration_nonce,
        };
        let body = sign_message(wallet, self.chain_id, message).await?;
        let registered: RegisteredAccount = self.post_public("/v1/register_account", &body).await?;
        let account_id = parse_account_id(&registered.account_id)?;

        info!(
            account_id = %account_id_hex(&account_id),
            broker_id,
            address = %wallet.address(),
            "Registered account"
        );
        Ok(account_id)
    }

    /// Issue a new Orderly key for the wallet's own account and store it.
    ///
    /// The key is generated locally; only its public half is sent. A key
    /// already stored for the same account and network is replaced.
    pub async fn add_orderly_key<S: KeyValueStore>(
        &self,
        wallet: &Wallet,
        broker_id: &str,
        scope: Scope,
        account_id: &B256,
        storage: &OrderlyStorage<S>,
    ) -> ClientResult<OrderlyKey> {
        let key = OrderlyKey::generate();
        let timestamp = now_millis();
        let message = AddOrderlyKeyMessage {
            broker_id: broker_id.to_string(),
            chain_id: self.chain_id.as_u64(),
            orderly_key: key.public_key(),
            scope,
            timestamp,
            expiration: timestamp + ORDERLY_KEY_LIFETIME_MS,
        };
        let body = sign_message(wallet, self.chain_id, message).await?;
        let _: IgnoredAny = self.post_public("/v1/orderly_key", &body).await?;

        storage.save_orderly_key(account_id, self.chain_id, &key)?;
        info!(
            account_id = %account_id_hex(account_id),
            public_key = %key.public_key(),
            scope = %scope,
            "Added Orderly key"
        );
        Ok(key)
    }

    /// Announce a confirmed `delegate` transaction so the backend links the
    /// wallet to the delegate contract's account.
    pub async fn announce_delegate_signer(
        &self,
        wallet: &Wallet,
        broker_id: &str,
        delegate_contract: Address,
        tx_hash: B256,
    ) -> ClientResult<DelegateSignerLink> {
        let raw_nonce = self.registration_nonce().await?;
        let registration_nonce = raw_nonce.trim().parse::<u64>().map_err(|e| {
            ClientError::Decode(format!("registration nonce `{raw_nonce}` is not a u64: {e}"))
        })?;
        let message = DelegateSignerMessage {
            delegate_contract,
            broker_id: broker_id.to_string(),
            chain_id: self.chain_id.as_u64(),
            timestamp: now_millis(),
            registration_nonce,
            tx_hash,
        };
        let body = sign_message(wallet, self.chain_id, message).await?;
        let link: DelegateSignerLink = self.post_public("/v1/delegate_signer", &body).await?;

        info!(
            user_id = link.user_id,
            valid_signer = %link.valid_signer,
            delegate_contract = %delegate_contract,
            "Announced delegate signer"
        );
        Ok(link)
    }

    /// Issue an Orderly key for a delegate contract's account and store it.
    pub async fn delegate_add_orderly_key<S: KeyValueStore>(
        &self,
        wallet: &Wallet,
        broker_id: &str,
        delegate_contract: Address,
        account_id: &B256,
        scope: Scope,
        storage: &OrderlyStorage<S>,
    ) -> ClientResult<OrderlyKey> {
        let key = OrderlyKey::generate();
        let timestamp = now_millis();
        let message = DelegateAddOrderlyKeyMessage {
            delegate_contract,
            broker_id: broker_id.to_string(),
            chain_id: self.chain_id.as_u64(),
            orderly_key: key.public_key(),
            scope,
            timestamp,
            expiration: timestamp + ORDERLY_KEY_LIFETIME_MS,
        };
        let body = sign_message(wallet, self.chain_id, message).await?;
        let _: IgnoredAny = self.post_public("/v1/delegate_orderly_key", &body).await?;

        storage.save_orderly_key(account_id, self.chain_id, &key)?;
        info!(
            account_id = %account_id_hex(account_id),
            delegate_contract = %delegate_contract,
            public_key = %key.public_key(),
            "Added delegate Orderly key"
        );
        Ok(key)
    }

    /// Look up an existing account by owner address and broker.
    pub async fn account_info(
        &self,
        address: Address,
        broker_id: &str,
    ) -> ClientResult<AccountInfo> {
        self.get_public(
            "/v1/public/account",
            &[
                ("address", address.to_string()),
                ("broker_id", broker_id.to_string()),
            ],
        )
        .await
    }

    pub async fn broker_name(&self, broker_id: &str) -> ClientResult<BrokerName> {
        self.get_public("/v1/public/broker/name", &[("broker_id", broker_id.to_string())])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockServer, KNOWN_BROKER};
    use crate::chain::ChainId;
    use crate::keys::account_id;
    use crate::storage::MemoryStore;
    use alloy::primitives::address;

    const ARB_SEPOLIA: ChainId = ChainId::new(0x66eee);
    const DELEGATE: Address = address!("0xa4394b62261061c629800c6d86d153a9f38f0cbb");

    async fn setup() -> (MockServer, OrderlyClient, Wallet) {
        let server = MockServer::start(ARB_SEPOLIA).await;
        let client = OrderlyClient::with_base_url(ARB_SEPOLIA, &server.base_url()).unwrap();
        (server, client, Wallet::random())
    }

    #[tokio::test]
    async fn registration_returns_derived_account_id() {
        let (server, client, wallet) = setup().await;

        let id = client.register_account(&wallet, KNOWN_BROKER).await.unwrap();
        assert_eq!(id, account_id(wallet.address(), KNOWN_BROKER));
        assert!(!account_id_hex(&id).is_empty());

        let body = server.last_body("/v1/register_account").unwrap();
        assert_eq!(body["message"]["brokerId"], KNOWN_BROKER);
        assert_eq!(body["message"]["chainId"], 421614);
        assert!(body["message"]["registrationNonce"].is_string());
        assert!(body.get("verifyingContract").is_none());
    }

    #[tokio::test]
    async fn unknown_broker_surfaces_server_message() {
        let (server, client, wallet) = setup().await;

        let err = client.register_account(&wallet, "no_such_broker").await.unwrap_err();
        assert!(err.is_api_rejection());
        assert_eq!(err.to_string(), "Broker id is not exist");
        assert_eq!(server.hits("/v1/register_account"), 1);
    }

    #[tokio::test]
    async fn add_key_persists_private_half() {
        let (server, client, wallet) = setup().await;
        let storage = OrderlyStorage::new(MemoryStore::new());

        let id = client.register_account(&wallet, KNOWN_BROKER).await.unwrap();
        let key = client
            .add_orderly_key(&wallet, KNOWN_BROKER, Scope::ReadTrading, &id, &storage)
            .await
            .unwrap();

        let stored = storage.load_orderly_key(&id, ARB_SEPOLIA).unwrap().unwrap();
        assert_eq!(stored, key);

        let body = server.last_body("/v1/orderly_key").unwrap();
        assert_eq!(body["message"]["orderlyKey"], key.public_key());
        assert_eq!(body["message"]["scope"], "read,trading");
        let ts = body["message"]["timestamp"].as_u64().unwrap();
        let exp = body["message"]["expiration"].as_u64().unwrap();
        assert_eq!(exp - ts, ORDERLY_KEY_LIFETIME_MS);
    }

    #[tokio::test]
    async fn second_key_replaces_first() {
        let (_server, client, wallet) = setup().await;
        let storage = OrderlyStorage::new(MemoryStore::new());
        let id = client.register_account(&wallet, KNOWN_BROKER).await.unwrap();

        let first = client
            .add_orderly_key(&wallet, KNOWN_BROKER, Scope::Read, &id, &storage)
            .await
            .unwrap();
        let second = client
            .add_orderly_key(&wallet, KNOWN_BROKER, Scope::Read, &id, &storage)
            .await
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(storage.load_orderly_key(&id, ARB_SEPOLIA).unwrap(), Some(second));
    }

    #[tokio::test]
    async fn failed_key_registration_stores_nothing() {
        let (_server, _client, wallet) = setup().await;
        let storage = OrderlyStorage::new(MemoryStore::new());
        // nothing listens on port 9
        let dead = OrderlyClient::with_base_url(ARB_SEPOLIA, "http://127.0.0.1:9").unwrap();
        let id = account_id(wallet.address(), KNOWN_BROKER);

        let err = dead
            .add_orderly_key(&wallet, KNOWN_BROKER, Scope::Read, &id, &storage)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
        assert!(storage.store().is_empty());
    }

    #[tokio::test]
    async fn delegate_signer_flow() {
        let (server, client, wallet) = setup().await;
        let storage = OrderlyStorage::new(MemoryStore::new());
        let tx_hash = B256::repeat_byte(0x5a);

        let link = client
            .announce_delegate_signer(&wallet, KNOWN_BROKER, DELEGATE, tx_hash)
            .await
            .unwrap();
        assert_eq!(link.user_id, 4242);
        assert_eq!(link.valid_signer.parse::<Address>().unwrap(), wallet.address());

        let body = server.last_body("/v1/delegate_signer").unwrap();
        assert!(body["message"]["registrationNonce"].is_u64());
        assert_eq!(
            body["message"]["txHash"].as_str().unwrap(),
            format!("{tx_hash:#x}")
        );

        let delegate_account = account_id(DELEGATE, KNOWN_BROKER);
        let key = client
            .delegate_add_orderly_key(
                &wallet,
                KNOWN_BROKER,
                DELEGATE,
                &delegate_account,
                Scope::ReadTrading,
                &storage,
            )
            .await
            .unwrap();
        assert_eq!(
            storage.load_orderly_key(&delegate_account, ARB_SEPOLIA).unwrap(),
            Some(key)
        );
    }

    #[tokio::test]
    async fn public_lookups() {
        let (_server, client, wallet) = setup().await;
        let storage = OrderlyStorage::new(MemoryStore::new());

        let missing = client
            .account_info(wallet.address(), KNOWN_BROKER)
            .await
            .unwrap_err();
        assert!(missing.is_api_rejection());

        let id = client.register_account(&wallet, KNOWN_BROKER).await.unwrap();
        client
            .add_orderly_key(&wallet, KNOWN_BROKER, Scope::Read, &id, &storage)
            .await
            .unwrap();
        let info = client.account_info(wallet.address(), KNOWN_BROKER).await.unwrap();
        assert_eq!(parse_account_id(&info.account_id).unwrap(), id);

        let broker = client.broker_name(KNOWN_BROKER).await.unwrap();
        assert_eq!(broker.broker_name, "WOOFi Pro");
        let err = client.broker_name("nobody").await.unwrap_err();
        assert!(matches!(err, ClientError::Http { status: 502, .. }));
    }
}
