//! Ordered discovery of injected wallet providers.

use crate::error::ConnectError;
use crate::provider::EthereumProvider;
use std::sync::Arc;

/// What the page environment injected.
///
/// Mirrors the browser globals: a multi-chain wallet may namespace its
/// Ethereum provider separately from the generic injected one, and may be
/// present with only its non-Ethereum side active.
#[derive(Default)]
pub struct InjectedWallets {
    /// Ethereum provider namespaced under the multi-chain wallet
    /// extension (`window.phantom.ethereum`).
    pub namespaced_ethereum: Option<Arc<dyn EthereumProvider>>,
    /// Generic injected provider (`window.ethereum`).
    pub ethereum: Option<Arc<dyn EthereumProvider>>,
    /// The multi-chain wallet is installed but only its Solana side is
    /// exposed.
    pub solana_only_present: bool,
}

impl InjectedWallets {
    /// Pick a provider in the significant order:
    /// namespaced Ethereum provider, then the generic one. If only the
    /// non-Ethereum variant exists, fail with guidance rather than
    /// silently falling through; with nothing injected, `NoProviderFound`.
    pub fn discover(&self) -> Result<Arc<dyn EthereumProvider>, ConnectError> {
        if let Some(provider) = &self.namespaced_ethereum {
            tracing::debug!("using namespaced Phantom Ethereum provider");
            return Ok(Arc::clone(provider));
        }
        if let Some(provider) = &self.ethereum {
            tracing::debug!("using generic injected Ethereum provider");
            return Ok(Arc::clone(provider));
        }
        if self.solana_only_present {
            return Err(ConnectError::EthereumDisabled);
        }
        Err(ConnectError::NoProviderFound)
    }
}
