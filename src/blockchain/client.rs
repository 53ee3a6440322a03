// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM chain client for the vault flows.

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, TxHash, B256, U256},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, Provider, ProviderBuilder, RootProvider,
    },
};
use tracing::{debug, info};

use super::delegate_signer::{DelegateSignerContract, EXAMPLE_DELEGATE_CONTRACT};
use super::erc20::Erc20Contract;
use super::signing::Wallet;
use super::vault::{deposit_input, VaultContract};
use crate::chain::{descriptor, usdc_address, vault_address, ChainDescriptor, ChainId};
use crate::error::{ClientError, ClientResult};
use crate::keys::USDC;

/// HTTP provider with the recommended fillers and a signing wallet.
type HttpProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

/// Transaction receipt summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub gas_used: u64,
    pub success: bool,
}

/// Wallet-bound client for one chain.
pub struct ChainClient {
    chain: &'static ChainDescriptor,
    owner: Address,
    provider: HttpProvider,
}

impl ChainClient {
    /// Connect to the chain's public RPC endpoint.
    pub fn new(chain_id: ChainId, wallet: &Wallet) -> ClientResult<Self> {
        let chain = descriptor(chain_id)?;
        Self::with_rpc_url(chain_id, wallet, chain.rpc_url)
    }

    pub fn with_rpc_url(chain_id: ChainId, wallet: &Wallet, rpc_url: &str) -> ClientResult<Self> {
        let chain = descriptor(chain_id)?;
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ClientError::InvalidUrl(e.to_string()))?;

        let provider = ProviderBuilder::new()
            .wallet(wallet.ethereum_wallet())
            .connect_http(url);

        debug!(chain = chain.label, rpc_url, "Connected chain client");
        Ok(Self {
            chain,
            owner: wallet.address(),
            provider,
        })
    }

    pub fn chain(&self) -> &'static ChainDescriptor {
        self.chain
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain.id
    }

    /// Address of the connected wallet.
    pub fn owner(&self) -> Address {
        self.owner
    }

    fn usdc(&self) -> ClientResult<Erc20Contract<HttpProvider>> {
        Ok(Erc20Contract::new(&self.provider, usdc_address(self.chain.id)?))
    }

    fn vault(&self) -> ClientResult<VaultContract<HttpProvider>> {
        Ok(VaultContract::new(&self.provider, vault_address(self.chain.id)?))
    }

    /// Native gas-token balance of the wallet.
    pub async fn native_balance(&self) -> ClientResult<U256> {
        self.provider
            .get_balance(self.owner)
            .await
            .map_err(|e| ClientError::Rpc(e.to_string()))
    }

    pub async fn usdc_balance(&self) -> ClientResult<U256> {
        self.usdc()?.balance_of(self.owner).await
    }

    /// USDC the vault may pull from the wallet.
    pub async fn usdc_allowance(&self) -> ClientResult<U256> {
        let vault = vault_address(self.chain.id)?;
        self.usdc()?.allowance(self.owner, vault).await
    }

    /// Decimals reported by the USDC contract itself.
    pub async fn usdc_decimals(&self) -> ClientResult<u8> {
        self.usdc()?.decimals().await
    }

    pub async fn needs_approval(&self, amount: U256) -> ClientResult<bool> {
        Ok(self.usdc_allowance().await? < amount)
    }

    /// Approve the vault to pull exactly `amount` USDC.
    pub async fn approve_usdc(&self, amount: U256) -> ClientResult<TxHash> {
        let vault = vault_address(self.chain.id)?;
        self.usdc()?.approve(vault, amount).await
    }

    /// Native fee for depositing into `receiver`'s account.
    pub async fn deposit_fee(
        &self,
        receiver: Address,
        account_id: B256,
        broker_id: &str,
        amount: u128,
    ) -> ClientResult<U256> {
        let input = deposit_input(account_id, broker_id, USDC, amount);
        self.vault()?.deposit_fee(receiver, &input).await
    }

    /// Deposit USDC from the wallet into its own account, paying a fee
    /// quoted by [`ChainClient::deposit_fee`] for the wallet.
    pub async fn deposit(
        &self,
        account_id: B256,
        broker_id: &str,
        amount: u128,
        fee: U256,
    ) -> ClientResult<TxHash> {
        let input = deposit_input(account_id, broker_id, USDC, amount);
        self.vault()?.deposit(input, fee).await
    }

    /// Deposit USDC into the account of a delegate contract. `fee` is the
    /// quote for `delegate_contract` as receiver.
    pub async fn delegate_deposit(
        &self,
        delegate_contract: Address,
        account_id: B256,
        broker_id: &str,
        amount: u128,
        fee: U256,
    ) -> ClientResult<TxHash> {
        let input = deposit_input(account_id, broker_id, USDC, amount);
        self.vault()?.deposit_to(delegate_contract, input, fee).await
    }

    /// Make the wallet the delegate signer of the example contract.
    ///
    /// Only meaningful on testnets, where that contract is deployed.
    pub async fn register_example_delegate_signer(&self, broker_id: &str) -> ClientResult<TxHash> {
        if !self.chain.is_testnet() {
            return Err(ClientError::UnsupportedChain(self.chain.id));
        }
        let vault = vault_address(self.chain.id)?;
        DelegateSignerContract::new(&self.provider, EXAMPLE_DELEGATE_CONTRACT)
            .delegate(vault, broker_id, self.owner)
            .await
    }

    /// Receipt for a submitted transaction, `None` while pending.
    pub async fn transaction_status(&self, tx_hash: TxHash) -> ClientResult<Option<TxReceipt>> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| ClientError::Rpc(format!("Failed to get receipt: {e}")))?;

        Ok(receipt.map(|r| {
            let summary = TxReceipt {
                tx_hash,
                block_number: r.block_number.unwrap_or(0),
                gas_used: r.gas_used as u64,
                success: r.status(),
            };
            info!(tx_hash = %tx_hash, success = summary.success, "Transaction mined");
            summary
        }))
    }
}
