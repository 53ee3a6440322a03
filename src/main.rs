// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `orderly-onboard` command-line client.
//!
//! Each subcommand performs one onboarding or asset action against the
//! Orderly backend and, where needed, the chain's vault contract. The broker
//! id and delegate contract given on the command line are remembered per
//! chain, so later commands can omit them.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, TxHash, B256};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use orderly_onboard::api::assets::check_withdraw_amount;
use orderly_onboard::api::{Credentials, OrderlyClient};
use orderly_onboard::blockchain::delegate_signer::EXAMPLE_DELEGATE_CONTRACT;
use orderly_onboard::blockchain::units::to_u128;
use orderly_onboard::blockchain::vault::{SafeInstructions, VAULT_ABI_URL};
use orderly_onboard::blockchain::{format_units, parse_units, ChainClient, Wallet};
use orderly_onboard::chain::{self, ChainId, SUPPORTED_CHAINS};
use orderly_onboard::config::{init_tracing, Config, WalletSource};
use orderly_onboard::keys::{account_id, account_id_hex, parse_address, Scope, USDC};
use orderly_onboard::models::{AssetHistoryQuery, AssetSide};
use orderly_onboard::poller::{subscribe, DEFAULT_POLL_INTERVAL};
use orderly_onboard::storage::{KeyValueStore, OrderlyStorage, RedbStore, StoragePaths};

#[derive(Parser, Debug)]
#[command(name = "orderly-onboard")]
#[command(about = "Register wallets, issue API keys and move USDC on Orderly Network")]
#[command(version)]
struct Cli {
    /// Chain id, hex (0xa4b1) or decimal (42161)
    #[arg(long, global = true, env = "ORDERLY_CHAIN_ID", default_value = "0x66eee")]
    chain: ChainId,

    /// Broker id; remembered per chain once given
    #[arg(long, global = true)]
    broker_id: Option<String>,

    /// REST base URL override
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// JSON-RPC endpoint override
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Directory holding the local state database
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// PEM file with the wallet key (takes precedence over WALLET_PRIVATE_KEY)
    #[arg(long, global = true)]
    wallet_pem: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Which account an asset command acts on.
#[derive(Args, Debug, Clone)]
struct Target {
    /// Act on the delegate contract's account instead of the wallet's own
    #[arg(long)]
    delegate: bool,

    /// Delegate contract address; remembered per chain once given
    #[arg(long)]
    contract: Option<Address>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List supported chains
    Chains,

    /// Show the account id for an address (the wallet by default)
    AccountId {
        #[arg(long)]
        address: Option<Address>,
    },

    /// Show the display name of the broker
    Broker,

    /// Register the wallet with the broker
    Register,

    /// Issue and store a new Orderly key for the wallet's account
    AddKey {
        #[arg(long, default_value = "read,trading")]
        scope: Scope,
    },

    /// Make the wallet the delegate signer of the example contract (testnets)
    DelegateRegister,

    /// Print the vault call a Gnosis Safe makes to link its delegate signer
    SafeInstructions {
        /// Signer to link (the wallet by default)
        #[arg(long)]
        signer: Option<Address>,
    },

    /// Announce a delegate signer link after its transaction is mined
    AnnounceDelegate {
        #[arg(long)]
        tx_hash: B256,

        #[arg(long)]
        contract: Option<Address>,
    },

    /// Issue and store a new Orderly key for the delegate contract's account
    DelegateAddKey {
        #[arg(long, default_value = "read,trading")]
        scope: Scope,

        #[arg(long)]
        contract: Option<Address>,
    },

    /// Show wallet and vault balances
    Balances {
        #[command(flatten)]
        target: Target,
    },

    /// Deposit USDC from the wallet into the vault
    Deposit {
        /// Amount in whole USDC, e.g. 12.5
        amount: String,

        #[command(flatten)]
        target: Target,
    },

    /// Withdraw USDC from the vault
    Withdraw {
        amount: String,

        /// Receiving address (the wallet, or the contract for delegates)
        #[arg(long)]
        receiver: Option<Address>,

        #[command(flatten)]
        target: Target,
    },

    /// Settle unsettled PnL into the USDC holding
    Settle {
        #[command(flatten)]
        target: Target,
    },

    /// Transfer USDC to another Orderly account
    Transfer {
        amount: String,

        /// Receiving account id
        #[arg(long)]
        to: B256,

        #[command(flatten)]
        target: Target,
    },

    /// List deposits and withdrawals
    History {
        #[arg(long)]
        side: Option<AssetSide>,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        size: Option<u32>,

        #[command(flatten)]
        target: Target,
    },

    /// Show the status of a submitted transaction
    TxStatus { tx_hash: TxHash },

    /// Poll balances until interrupted
    Watch {
        /// Poll interval in seconds
        #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
        interval: u64,

        #[command(flatten)]
        target: Target,
    },
}

/// Resolved per-invocation state.
struct Session {
    chain_id: ChainId,
    client: OrderlyClient,
    storage: OrderlyStorage<RedbStore>,
    wallet_source: Option<WalletSource>,
    rpc_url: Option<String>,
    broker_arg: Option<String>,
}

impl Session {
    fn open(cli: &Cli, config: Config) -> Result<Self> {
        let base_url = cli.base_url.clone().or(config.base_url);
        let client = match base_url {
            Some(url) => OrderlyClient::with_base_url(cli.chain, &url)?,
            None => OrderlyClient::new(cli.chain)?,
        };

        let data_dir = cli.data_dir.clone().unwrap_or(config.data_dir);
        let db_path = StoragePaths::new(&data_dir).state_db();
        let store = RedbStore::open(&db_path)
            .with_context(|| format!("Failed to open state database {}", db_path.display()))?;

        let wallet_source = cli
            .wallet_pem
            .clone()
            .map(WalletSource::Pem)
            .or(config.wallet);

        Ok(Self {
            chain_id: cli.chain,
            client,
            storage: OrderlyStorage::new(store),
            wallet_source,
            rpc_url: cli.rpc_url.clone().or(config.rpc_url),
            broker_arg: cli.broker_id.clone(),
        })
    }

    fn wallet(&self) -> Result<Wallet> {
        let source = self
            .wallet_source
            .as_ref()
            .ok_or_else(|| {
                anyhow!("No wallet configured; set WALLET_PRIVATE_KEY or --wallet-pem")
            })?;
        Ok(source.load()?)
    }

    fn chain_client(&self, wallet: &Wallet) -> Result<ChainClient> {
        let client = match &self.rpc_url {
            Some(url) => ChainClient::with_rpc_url(self.chain_id, wallet, url)?,
            None => ChainClient::new(self.chain_id, wallet)?,
        };
        Ok(client)
    }

    /// Broker id from the command line (then remembered), else the stored one.
    fn broker_id(&self) -> Result<String> {
        if let Some(broker_id) = &self.broker_arg {
            self.storage.save_broker_id(self.chain_id, broker_id)?;
            return Ok(broker_id.clone());
        }
        let stored = self.storage.load_broker_id(self.chain_id)?;
        if stored.is_empty() {
            bail!("No broker id known for chain {}; pass --broker-id", self.chain_id);
        }
        Ok(stored)
    }

    fn contract(&self, explicit: Option<Address>) -> Result<Address> {
        resolve_contract(&self.storage, self.chain_id, explicit)
    }

    /// Owner address of the targeted account, and the delegate contract if any.
    fn owner(&self, wallet: &Wallet, target: &Target) -> Result<(Address, Option<Address>)> {
        if target.delegate || target.contract.is_some() {
            let contract = self.contract(target.contract)?;
            Ok((contract, Some(contract)))
        } else {
            Ok((wallet.address(), None))
        }
    }

    fn credentials(&self, account: B256) -> Result<Credentials> {
        let key = self
            .storage
            .load_orderly_key(&account, self.chain_id)?
            .ok_or_else(|| {
                anyhow!(
                    "No Orderly key stored for account {}; run add-key first",
                    account_id_hex(&account)
                )
            })?;
        Ok(Credentials::new(account, key))
    }
}

/// Delegate contract from the command line (then remembered), else the stored
/// one. Testnets fall back to the example delegate contract.
fn resolve_contract<S: KeyValueStore>(
    storage: &OrderlyStorage<S>,
    chain_id: ChainId,
    explicit: Option<Address>,
) -> Result<Address> {
    if let Some(contract) = explicit {
        storage.save_contract_address(chain_id, &contract.to_string())?;
        return Ok(contract);
    }
    let stored = storage.load_contract_address(chain_id)?;
    if !stored.is_empty() {
        return Ok(parse_address(&stored)?);
    }
    if chain::is_testnet(chain_id) {
        return Ok(EXAMPLE_DELEGATE_CONTRACT);
    }
    bail!("No delegate contract known for chain {chain_id}; pass --contract")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();
    init_tracing(config.log_format);

    if matches!(cli.command, Commands::Chains) {
        print_chains();
        return Ok(());
    }

    let session = Session::open(&cli, config)?;
    info!(chain = %session.chain_id, base_url = %session.client.base_url(), "Starting");
    run(&session, cli.command).await
}

fn print_chains() {
    for chain in SUPPORTED_CHAINS {
        let vault = chain
            .contracts
            .map(|c| c.vault.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:<18} {:<8} {:<8} {}",
            chain.id.to_string(),
            chain.label,
            chain.token,
            chain.network.as_str(),
            vault
        );
    }
}

async fn run(session: &Session, command: Commands) -> Result<()> {
    let chain_id = session.chain_id;
    match command {
        Commands::Chains => print_chains(),

        Commands::AccountId { address } => {
            let broker_id = session.broker_id()?;
            let address = match address {
                Some(address) => address,
                None => session.wallet()?.address(),
            };
            let id = account_id(address, &broker_id);
            println!("Account id: {}", account_id_hex(&id));
            match session.client.account_info(address, &broker_id).await {
                Ok(info) => println!("Registered: user {}", info.user_id),
                Err(e) if e.is_api_rejection() => println!("Registered: no ({e})"),
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Broker => {
            let broker_id = session.broker_id()?;
            let name = session.client.broker_name(&broker_id).await?;
            println!("{} ({})", name.broker_name, name.broker_id);
        }

        Commands::Register => {
            let wallet = session.wallet()?;
            let broker_id = session.broker_id()?;
            let id = session.client.register_account(&wallet, &broker_id).await?;
            println!("Registered account {}", account_id_hex(&id));
        }

        Commands::AddKey { scope } => {
            let wallet = session.wallet()?;
            let broker_id = session.broker_id()?;
            let id = account_id(wallet.address(), &broker_id);
            let key = session
                .client
                .add_orderly_key(&wallet, &broker_id, scope, &id, &session.storage)
                .await?;
            println!("Added Orderly key {} ({scope})", key.public_key());
        }

        Commands::DelegateRegister => {
            let wallet = session.wallet()?;
            let broker_id = session.broker_id()?;
            let tx_hash = session
                .chain_client(&wallet)?
                .register_example_delegate_signer(&broker_id)
                .await?;
            session.contract(Some(EXAMPLE_DELEGATE_CONTRACT))?;
            println!("Delegate signer transaction submitted: {tx_hash}");
            println!("Once mined, run: announce-delegate --tx-hash {tx_hash}");
        }

        Commands::SafeInstructions { signer } => {
            let broker_id = session.broker_id()?;
            let signer = match signer {
                Some(signer) => signer,
                None => session.wallet()?.address(),
            };
            let safe = SafeInstructions::new(chain_id, &broker_id, signer)?;
            println!("1. Open the transaction builder of your Safe");
            println!("2. Contract address (Orderly vault): {}", safe.vault);
            println!("3. ABI: {VAULT_ABI_URL}");
            println!("4. Method: delegateSigner");
            println!("5. Data tuple: {}", safe.data_tuple());
            println!("   Raw calldata: {}", safe.calldata);
            println!("Once executed, run: announce-delegate --tx-hash <hash> --contract <safe>");
        }

        Commands::AnnounceDelegate { tx_hash, contract } => {
            let wallet = session.wallet()?;
            let broker_id = session.broker_id()?;
            let contract = session.contract(contract)?;
            let link = session
                .client
                .announce_delegate_signer(&wallet, &broker_id, contract, tx_hash)
                .await?;
            println!(
                "Delegate signer {} linked to user {} ({})",
                link.valid_signer,
                link.user_id,
                account_id_hex(&account_id(contract, &broker_id))
            );
        }

        Commands::DelegateAddKey { scope, contract } => {
            let wallet = session.wallet()?;
            let broker_id = session.broker_id()?;
            let contract = session.contract(contract)?;
            let id = account_id(contract, &broker_id);
            let key = session
                .client
                .delegate_add_orderly_key(
                    &wallet,
                    &broker_id,
                    contract,
                    &id,
                    scope,
                    &session.storage,
                )
                .await?;
            println!("Added delegate Orderly key {} ({scope})", key.public_key());
        }

        Commands::Balances { target } => {
            let wallet = session.wallet()?;
            let broker_id = session.broker_id()?;
            let (owner, _) = session.owner(&wallet, &target)?;
            let id = account_id(owner, &broker_id);

            let evm = session.chain_client(&wallet)?;
            let decimals = chain::usdc_decimals(chain_id)?;
            let native = evm.native_balance().await?;
            let usdc = evm.usdc_balance().await?;
            let allowance = evm.usdc_allowance().await?;
            println!("Wallet {}", wallet.address());
            println!("  {}: {}", evm.chain().token, format_units(native, 18));
            println!("  USDC: {}", format_units(usdc, decimals));
            println!("  USDC allowance: {}", format_units(allowance, decimals));

            println!("Account {}", account_id_hex(&id));
            match session.credentials(id) {
                Ok(credentials) => {
                    let holding = session.client.client_holding(&credentials, USDC).await?;
                    let pnl = session.client.unsettled_pnl(&credentials).await?;
                    println!("  Vault USDC: {holding}");
                    println!("  Unsettled PnL: {pnl}");
                }
                Err(e) => println!("  {e}"),
            }
        }

        Commands::Deposit { amount, target } => {
            let wallet = session.wallet()?;
            let broker_id = session.broker_id()?;
            let (owner, contract) = session.owner(&wallet, &target)?;
            let id = account_id(owner, &broker_id);

            let evm = session.chain_client(&wallet)?;
            let decimals = evm.usdc_decimals().await?;
            let units = parse_units(&amount, decimals)?;
            if units.is_zero() {
                bail!("Deposit amount must be positive");
            }
            let balance = evm.usdc_balance().await?;
            if units > balance {
                bail!(
                    "Insufficient USDC: wallet holds {}",
                    format_units(balance, decimals)
                );
            }
            if evm.needs_approval(units).await? {
                let tx_hash = evm.approve_usdc(units).await?;
                println!("Approval submitted: {tx_hash}");
                println!("Run deposit again once it is mined");
                return Ok(());
            }

            let raw = to_u128(units)?;
            let fee = evm.deposit_fee(owner, id, &broker_id, raw).await?;
            info!(fee = %fee, "Deposit fee quoted");
            let tx_hash = match contract {
                Some(contract) => {
                    evm.delegate_deposit(contract, id, &broker_id, raw, fee).await?
                }
                None => evm.deposit(id, &broker_id, raw, fee).await?,
            };
            println!(
                "Deposit submitted: {tx_hash} (fee {} {})",
                format_units(fee, 18),
                evm.chain().token
            );
        }

        Commands::Withdraw {
            amount,
            receiver,
            target,
        } => {
            let wallet = session.wallet()?;
            let broker_id = session.broker_id()?;
            let (owner, contract) = session.owner(&wallet, &target)?;
            let credentials = session.credentials(account_id(owner, &broker_id))?;

            let decimals = chain::usdc_decimals(chain_id)?;
            let units = parse_units(&amount, decimals)?;
            let holding = session.client.client_holding(&credentials, USDC).await?;
            let fee = session.client.withdraw_fee(USDC).await?;
            check_withdraw_amount(units, holding, fee, decimals)?;

            let receiver = receiver.unwrap_or(owner);
            let raw = to_u128(units)?;
            match contract {
                Some(contract) => {
                    session
                        .client
                        .delegate_withdraw(
                            &wallet,
                            &credentials,
                            &broker_id,
                            contract,
                            raw,
                            receiver,
                        )
                        .await?
                }
                None => {
                    session
                        .client
                        .withdraw(&wallet, &credentials, &broker_id, raw, receiver)
                        .await?
                }
            }
            println!("Withdrawal of {amount} USDC to {receiver} requested");
        }

        Commands::Settle { target } => {
            let wallet = session.wallet()?;
            let broker_id = session.broker_id()?;
            let (owner, contract) = session.owner(&wallet, &target)?;
            let credentials = session.credentials(account_id(owner, &broker_id))?;

            let pnl = session.client.unsettled_pnl(&credentials).await?;
            if pnl == 0.0 {
                println!("Nothing to settle");
                return Ok(());
            }
            match contract {
                Some(contract) => {
                    session
                        .client
                        .delegate_settle_pnl(&wallet, &credentials, &broker_id, contract)
                        .await?
                }
                None => {
                    session
                        .client
                        .settle_pnl(&wallet, &credentials, &broker_id)
                        .await?
                }
            }
            println!("Settlement of {pnl} requested");
        }

        Commands::Transfer { amount, to, target } => {
            let wallet = session.wallet()?;
            let broker_id = session.broker_id()?;
            let (owner, contract) = session.owner(&wallet, &target)?;
            let credentials = session.credentials(account_id(owner, &broker_id))?;

            let units = parse_units(&amount, chain::usdc_decimals(chain_id)?)?;
            if units.is_zero() {
                bail!("Transfer amount must be positive");
            }
            let raw = to_u128(units)?;
            match contract {
                Some(contract) => {
                    session
                        .client
                        .delegate_internal_transfer(&wallet, &credentials, contract, to, raw)
                        .await?
                }
                None => {
                    session
                        .client
                        .internal_transfer(&wallet, &credentials, to, raw)
                        .await?
                }
            }
            println!("Transfer of {amount} USDC to {} requested", account_id_hex(&to));
        }

        Commands::History {
            side,
            page,
            size,
            target,
        } => {
            let wallet = session.wallet()?;
            let broker_id = session.broker_id()?;
            let (owner, _) = session.owner(&wallet, &target)?;
            let credentials = session.credentials(account_id(owner, &broker_id))?;

            let query = AssetHistoryQuery {
                token: Some(USDC.to_string()),
                side,
                page,
                size,
            };
            let history = session.client.asset_history(&credentials, &query).await?;
            for row in &history.rows {
                println!(
                    "{:<13} {:<8} {:>14} {:<10} {}",
                    row.created_time,
                    row.side.as_str(),
                    row.amount,
                    row.trans_status,
                    row.tx_id.as_deref().unwrap_or("-")
                );
            }
            println!(
                "Page {} ({} of {} records)",
                history.meta.current_page,
                history.rows.len(),
                history.meta.total
            );
        }

        Commands::TxStatus { tx_hash } => {
            let wallet = session.wallet()?;
            match session.chain_client(&wallet)?.transaction_status(tx_hash).await? {
                Some(receipt) => println!(
                    "{} in block {} ({} gas)",
                    if receipt.success { "Succeeded" } else { "Reverted" },
                    receipt.block_number,
                    receipt.gas_used
                ),
                None => println!("Pending"),
            }
        }

        Commands::Watch { interval, target } => {
            let wallet = session.wallet()?;
            let broker_id = session.broker_id()?;
            let (owner, _) = session.owner(&wallet, &target)?;
            let credentials = session.credentials(account_id(owner, &broker_id))?;
            watch(session, &wallet, credentials, Duration::from_secs(interval.max(1))).await?;
        }
    }
    Ok(())
}

/// Print holding, unsettled PnL and wallet USDC as they change, until Ctrl-C.
async fn watch(
    session: &Session,
    wallet: &Wallet,
    credentials: Credentials,
    interval: Duration,
) -> Result<()> {
    let client = session.client.clone();
    let creds = credentials.clone();
    let mut holding = subscribe("holding", interval, move || {
        let client = client.clone();
        let creds = creds.clone();
        async move { client.client_holding(&creds, USDC).await }
    });

    let client = session.client.clone();
    let mut pnl = subscribe("unsettled_pnl", interval, move || {
        let client = client.clone();
        let creds = credentials.clone();
        async move { client.unsettled_pnl(&creds).await }
    });

    let evm = Arc::new(session.chain_client(wallet)?);
    let decimals = chain::usdc_decimals(session.chain_id)?;
    let mut wallet_usdc = subscribe("wallet_usdc", interval, move || {
        let evm = Arc::clone(&evm);
        async move { evm.usdc_balance().await }
    });

    println!("Watching balances every {}s, Ctrl-C to stop", interval.as_secs());
    loop {
        tokio::select! {
            Some(value) = holding.changed() => println!("Vault USDC: {value}"),
            Some(value) = pnl.changed() => println!("Unsettled PnL: {value}"),
            Some(value) = wallet_usdc.changed() => {
                println!("Wallet USDC: {}", format_units(value, decimals));
            }
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                break;
            }
        }
    }

    holding.cancel();
    pnl.cancel();
    wallet_usdc.cancel();
    Ok(())
}
