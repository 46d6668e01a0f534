//! Deployment configuration: which contract the client talks to.

use serde::Deserialize;
use std::time::Duration;
use voteth_types::{unix_now_ms, EthAddress};

/// Compiled-in contract address, used whenever `config.json` cannot be
/// fetched or parsed. The client must come up even with no config
/// endpoint at all.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x61F1d0760aeABB09BFdCF2594ed515725589e73e";

/// Shape of `config.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub contract_address: EthAddress,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl AppConfig {
    pub fn fallback() -> Self {
        Self {
            // The literal above is checked by a test; parse cannot fail.
            contract_address: EthAddress::parse(DEFAULT_CONTRACT_ADDRESS)
                .expect("built-in contract address is well-formed"),
            last_updated: None,
        }
    }
}

/// Fetch `config.json` from the deployment, falling back to the built-in
/// address on any failure. Never returns an error: a broken config
/// endpoint must not block the client.
pub async fn load_config(base_url: &str) -> AppConfig {
    match fetch_config(base_url).await {
        Ok(config) => {
            tracing::info!(
                address = config.contract_address.as_str(),
                updated = ?config.last_updated,
                "loaded contract address from config"
            );
            config
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not load config.json, using built-in address");
            AppConfig::fallback()
        }
    }
}

async fn fetch_config(base_url: &str) -> Result<AppConfig, String> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| e.to_string())?;

    // Cache-buster: the deployment rewrites config.json in place, and a
    // cached copy would pin users to a retired contract.
    let url = format!("{base_url}/config.json?v={}", unix_now_ms());
    let response = http.get(&url).send().await.map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()));
    }
    response.json().await.map_err(|e| e.to_string())
}
