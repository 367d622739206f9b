//! Network identification and per-network feature flags.

use std::collections::HashSet;
use std::fmt;

/// Well-known EVM networks, keyed by chain id
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Network {
    Mainnet,
    Ropsten,
    Rinkeby,
    Goerli,
    Optimism,
    Cronos,
    Kovan,
    Bsc,
    Gnosis,
    Fuse,
    Polygon,
    Fantom,
    ZkSync,
    Moonbeam,
    Moonriver,
    Kava,
    Mantle,
    Base,
    Arbitrum,
    Celo,
    Avalanche,
    Linea,
    Sepolia,
    Aurora,
    Harmony,
    Unknown(u64),
}

const KNOWN_NETWORKS: &[(Network, u64, &str)] = &[
    (Network::Mainnet, 1, "Mainnet"),
    (Network::Ropsten, 3, "Ropsten"),
    (Network::Rinkeby, 4, "Rinkeby"),
    (Network::Goerli, 5, "Goerli"),
    (Network::Optimism, 10, "Optimism"),
    (Network::Cronos, 25, "Cronos"),
    (Network::Kovan, 42, "Kovan"),
    (Network::Bsc, 56, "BSC"),
    (Network::Gnosis, 100, "Gnosis"),
    (Network::Fuse, 122, "Fuse"),
    (Network::Polygon, 137, "Polygon"),
    (Network::Fantom, 250, "Fantom"),
    (Network::ZkSync, 324, "zkSync Era"),
    (Network::Moonbeam, 1284, "Moonbeam"),
    (Network::Moonriver, 1285, "Moonriver"),
    (Network::Kava, 2222, "Kava"),
    (Network::Mantle, 5000, "Mantle"),
    (Network::Base, 8453, "Base"),
    (Network::Arbitrum, 42161, "Arbitrum"),
    (Network::Celo, 42220, "Celo"),
    (Network::Avalanche, 43114, "Avalanche"),
    (Network::Linea, 59144, "Linea"),
    (Network::Sepolia, 11155111, "Sepolia"),
    (Network::Aurora, 1313161554, "Aurora"),
    (Network::Harmony, 1666600000, "Harmony"),
];

/// Networks whose public endpoints reject the `eth_call` state-override argument
const NO_STATE_OVERRIDE: &[Network] = &[
    Network::Gnosis,
    Network::Harmony,
    Network::Moonbeam,
    Network::Moonriver,
    Network::Kovan,
    Network::Fuse,
    Network::ZkSync,
    Network::Aurora,
    Network::Cronos,
    Network::Mantle,
    Network::Linea,
];

impl Network {
    pub fn from_chain_id(chain_id: u64) -> Self {
        KNOWN_NETWORKS
            .iter()
            .find(|(_, id, _)| *id == chain_id)
            .map(|(network, _, _)| *network)
            .unwrap_or(Network::Unknown(chain_id))
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Unknown(id) => *id,
            known => KNOWN_NETWORKS
                .iter()
                .find(|(network, _, _)| network == known)
                .map(|(_, id, _)| *id)
                .unwrap_or_default(),
        }
    }

    pub fn name(&self) -> Option<&'static str> {
        KNOWN_NETWORKS
            .iter()
            .find(|(network, _, _)| network == self)
            .map(|(_, _, name)| *name)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", name, self.chain_id()),
            None => write!(f, "chain {}", self.chain_id()),
        }
    }
}

/// Feature flags per network
#[derive(Clone, Debug)]
pub struct NetworkRegistry {
    no_state_override: HashSet<u64>,
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self {
            no_state_override: NO_STATE_OVERRIDE.iter().map(Network::chain_id).collect(),
        }
    }
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark additional chain ids as lacking state-override support
    pub fn with_unsupported<I: IntoIterator<Item = u64>>(mut self, chain_ids: I) -> Self {
        self.no_state_override.extend(chain_ids);
        self
    }

    pub fn resolve(&self, chain_id: u64) -> Network {
        Network::from_chain_id(chain_id)
    }

    pub fn supports_state_override(&self, network: Network) -> bool {
        !self.no_state_override.contains(&network.chain_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_round_trip() {
        for (network, id, _) in KNOWN_NETWORKS {
            assert_eq!(Network::from_chain_id(*id), *network);
            assert_eq!(network.chain_id(), *id);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Network::Gnosis.to_string(), "Gnosis (100)");
        assert_eq!(Network::from_chain_id(31337).to_string(), "chain 31337");
    }

    #[test]
    fn test_default_state_override_flags() {
        let registry = NetworkRegistry::default();
        assert!(registry.supports_state_override(Network::Mainnet));
        assert!(registry.supports_state_override(Network::Unknown(31337)));
        assert!(!registry.supports_state_override(Network::Gnosis));
        assert!(!registry.supports_state_override(Network::Harmony));
    }

    #[test]
    fn test_extra_unsupported_chains() {
        let registry = NetworkRegistry::new().with_unsupported([31337]);
        assert!(!registry.supports_state_override(registry.resolve(31337)));
    }
}
