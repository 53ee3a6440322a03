// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Static table of the chains the client knows about.

use alloy::primitives::{address, Address};

use super::{ChainContracts, ChainDescriptor, ChainId, Network};

/// Verifying contract used for off-chain (registration / key) messages.
pub const OFF_CHAIN_VERIFYING_CONTRACT: Address =
    address!("0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC");

/// Verifying contract on the Orderly settlement layer, mainnet chains.
const MAINNET_VERIFYING_CONTRACT: Address = address!("0x6F7a338F2aA472838dEFD3283eB360d4Dff5D203");

/// Verifying contract on the Orderly settlement layer, testnet chains.
const TESTNET_VERIFYING_CONTRACT: Address = address!("0x1826B75e2ef249173FC735149AE4B8e9ea10abff");

/// Mainnet REST endpoint.
pub const MAINNET_BASE_URL: &str = "https://api-evm.orderly.org";

/// Testnet REST endpoint.
pub const TESTNET_BASE_URL: &str = "https://testnet-api-evm.orderly.org";

pub const ETHEREUM: ChainDescriptor = ChainDescriptor {
    id: ChainId::new(0x1),
    label: "Ethereum",
    token: "ETH",
    rpc_url: "https://ethereum-rpc.publicnode.com",
    network: Network::Mainnet,
    icon: "./assets/ethereum.svg",
    contracts: None,
};

pub const ARBITRUM_ONE: ChainDescriptor = ChainDescriptor {
    id: ChainId::new(0xa4b1),
    label: "Arbitrum One",
    token: "ETH",
    rpc_url: "https://arbitrum-one.publicnode.com",
    network: Network::Mainnet,
    icon: "./assets/arbitrum.svg",
    contracts: Some(ChainContracts {
        vault: address!("0x816f722424B49Cf1275cc86DA9840Fbd5a6167e9"),
        verifying_contract: MAINNET_VERIFYING_CONTRACT,
        usdc: address!("0xaf88d065e77c8cC2239327C5EDb3A432268e5831"),
        usdc_decimals: 6,
    }),
};

pub const OP_MAINNET: ChainDescriptor = ChainDescriptor {
    id: ChainId::new(0xa),
    label: "OP Mainnet",
    token: "ETH",
    rpc_url: "https://mainnet.optimism.io",
    network: Network::Mainnet,
    icon: "./assets/optimism.svg",
    contracts: Some(ChainContracts {
        vault: address!("0x816f722424b49cf1275cc86da9840fbd5a6167e9"),
        verifying_contract: MAINNET_VERIFYING_CONTRACT,
        usdc: address!("0x0b2c639c533813f4aa9d7837caf62653d097ff85"),
        usdc_decimals: 6,
    }),
};

pub const BASE: ChainDescriptor = ChainDescriptor {
    id: ChainId::new(0x2105),
    label: "Base",
    token: "ETH",
    rpc_url: "https://base-rpc.publicnode.com",
    network: Network::Mainnet,
    icon: "./assets/base.svg",
    contracts: None,
};

pub const MANTLE: ChainDescriptor = ChainDescriptor {
    id: ChainId::new(0x1388),
    label: "Mantle",
    token: "MNT",
    rpc_url: "https://rpc.mantle.xyz",
    network: Network::Mainnet,
    icon: "./assets/mantle.svg",
    contracts: None,
};

pub const SEI: ChainDescriptor = ChainDescriptor {
    id: ChainId::new(0x531),
    label: "Sei",
    token: "SEI",
    rpc_url: "https://evm-rpc.sei-apis.com",
    network: Network::Mainnet,
    icon: "./assets/sei.svg",
    contracts: None,
};

pub const BSC: ChainDescriptor = ChainDescriptor {
    id: ChainId::new(0x38),
    label: "BSC",
    token: "BNB",
    rpc_url: "https://binance.llamarpc.com",
    network: Network::Mainnet,
    icon: "./assets/bnb.svg",
    contracts: None,
};

pub const MODE: ChainDescriptor = ChainDescriptor {
    id: ChainId::new(0x868b),
    label: "Mode",
    token: "ETH",
    rpc_url: "https://mainnet.mode.network",
    network: Network::Mainnet,
    icon: "https://app.mode.network/assets/icons/mode_yellow.svg",
    contracts: None,
};

pub const ARBITRUM_SEPOLIA: ChainDescriptor = ChainDescriptor {
    id: ChainId::new(0x66eee),
    label: "Arbitrum Sepolia",
    token: "ETH",
    rpc_url: "https://sepolia-rollup.arbitrum.io/rpc",
    network: Network::Testnet,
    icon: "./assets/arbitrum_sepolia.svg",
    contracts: Some(ChainContracts {
        vault: address!("0x0EaC556c0C2321BA25b9DC01e4e3c95aD5CDCd2f"),
        verifying_contract: TESTNET_VERIFYING_CONTRACT,
        usdc: address!("0x75faf114eafb1BDbe2F0316DF893fd58CE46AA4d"),
        usdc_decimals: 6,
    }),
};

pub const OP_SEPOLIA: ChainDescriptor = ChainDescriptor {
    id: ChainId::new(0xaa37dc),
    label: "OP Sepolia",
    token: "ETH",
    rpc_url: "https://sepolia.optimism.io",
    network: Network::Testnet,
    icon: "./assets/optimism_sepolia.svg",
    contracts: Some(ChainContracts {
        vault: address!("0xEfF2896077B6ff95379EfA89Ff903598190805EC"),
        verifying_contract: TESTNET_VERIFYING_CONTRACT,
        usdc: address!("0x5fd84259d66Cd46123540766Be93DFE6D43130D7"),
        usdc_decimals: 6,
    }),
};

/// Every chain the client can address, in display order.
pub static SUPPORTED_CHAINS: &[ChainDescriptor] = &[
    ETHEREUM,
    ARBITRUM_ONE,
    OP_MAINNET,
    BASE,
    MANTLE,
    SEI,
    BSC,
    MODE,
    ARBITRUM_SEPOLIA,
    OP_SEPOLIA,
];
