//! Wallet connection state machine.

use crate::discovery::InjectedWallets;
use crate::error::{ConnectError, ProviderError};
use crate::provider::{classify_wallet, EthereumProvider, ProviderEvent, SubscriptionId};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use voteth_types::{EthAddress, WalletSession};

/// Outcome the connector emits for the presentation layer. The connector
/// never touches any view itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session ended (explicit disconnect, empty account list, or a
    /// provider-side disconnect).
    Disconnected,
    /// Accounts or chain changed: signer and network identity are
    /// coupled, so the whole page context must be rebuilt rather than
    /// mutating the session in place.
    ReloadRequired,
}

/// Raw provider event forwarded out of a subscription handler. Policy is
/// applied in [`WalletConnector::process_signals`], on the owner's turn,
/// not inside the handler.
#[derive(Debug)]
enum ProviderSignal {
    AccountsChanged(Value),
    ChainChanged(Value),
    Connected(Value),
    Disconnected(Value),
}

/// Acquires a signing provider, validates network identity, and owns the
/// provider event subscriptions for the lifetime of one session.
pub struct WalletConnector {
    wallets: InjectedWallets,
    required_chain_id: u64,
    provider: Option<Arc<dyn EthereumProvider>>,
    session: Option<WalletSession>,
    subscriptions: Vec<(ProviderEvent, SubscriptionId)>,
    signal_tx: mpsc::UnboundedSender<ProviderSignal>,
    signal_rx: mpsc::UnboundedReceiver<ProviderSignal>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl WalletConnector {
    /// Create a connector for the given page environment. The returned
    /// receiver carries [`SessionEvent`]s for the presentation layer.
    pub fn new(
        wallets: InjectedWallets,
        required_chain_id: u64,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        (
            Self {
                wallets,
                required_chain_id,
                provider: None,
                session: None,
                subscriptions: Vec::new(),
                signal_tx,
                signal_rx,
                events_tx,
            },
            events_rx,
        )
    }

    pub fn session(&self) -> Option<&WalletSession> {
        self.session.as_ref()
    }

    pub fn required_chain_id(&self) -> u64 {
        self.required_chain_id
    }

    /// The provider handle for the live session, used to bind a contract
    /// gateway.
    pub fn provider(&self) -> Option<Arc<dyn EthereumProvider>> {
        self.provider.as_ref().map(Arc::clone)
    }

    /// Establish a session: discover a provider, request account access,
    /// validate (and once attempt to switch) the network, subscribe the
    /// four provider events.
    pub async fn connect(&mut self) -> Result<WalletSession, ConnectError> {
        // A stale handler from a prior session must never fire into a new
        // one: deregister before anything else.
        self.disconnect();

        let provider = self.wallets.discover()?;
        let wallet = classify_wallet(provider.flags());
        tracing::info!(%wallet, "connecting wallet");

        let accounts = provider
            .request("eth_requestAccounts", json!([]))
            .await
            .map_err(connect_err)?;
        let address = first_account(&accounts)?;

        let mut chain_id = query_chain_id(provider.as_ref()).await?;
        if chain_id != self.required_chain_id {
            tracing::warn!(
                current = chain_id,
                required = self.required_chain_id,
                "wrong network, requesting switch"
            );
            let params = json!([{ "chainId": format!("0x{:x}", self.required_chain_id) }]);
            match provider.request("wallet_switchEthereumChain", params).await {
                Ok(_) => chain_id = query_chain_id(provider.as_ref()).await?,
                Err(e) => tracing::warn!(error = %e, "network switch request failed"),
            }
            if chain_id != self.required_chain_id {
                return Err(ConnectError::WrongNetwork {
                    current: chain_id,
                    required: self.required_chain_id,
                });
            }
        }

        self.subscribe_events(&provider);
        let session = WalletSession {
            address,
            wallet,
            chain_id,
        };
        tracing::info!(address = %session.address, %wallet, "wallet connected");
        self.provider = Some(provider);
        self.session = Some(session.clone());
        Ok(session)
    }

    /// Tear the session down. Idempotent and safe when never connected.
    ///
    /// Removes exactly the four handlers this connector registered,
    /// never a blanket removal, which would clobber listeners owned by
    /// other code.
    pub fn disconnect(&mut self) {
        if let Some(provider) = self.provider.take() {
            for (event, id) in self.subscriptions.drain(..) {
                provider.unsubscribe(event, id);
            }
            tracing::info!("wallet disconnected, event handlers removed");
        }
        self.session = None;
    }

    /// Re-query the provider for the active chain id and compare against
    /// the required one. Query failures count as "not ok" and are logged.
    pub async fn network_ok(&self) -> bool {
        let Some(provider) = &self.provider else {
            return false;
        };
        match query_chain_id(provider.as_ref()).await {
            Ok(chain_id) => chain_id == self.required_chain_id,
            Err(e) => {
                tracing::warn!(error = %e, "network check failed");
                false
            }
        }
    }

    /// Drain pending provider signals and apply session policy:
    /// an empty account list disconnects; any other account change and
    /// any chain change require a full rebuild.
    pub fn process_signals(&mut self) {
        while let Ok(signal) = self.signal_rx.try_recv() {
            self.handle_signal(signal);
        }
    }

    fn handle_signal(&mut self, signal: ProviderSignal) {
        match signal {
            ProviderSignal::AccountsChanged(payload) => {
                let empty = payload.as_array().map_or(true, |a| a.is_empty());
                if empty {
                    tracing::info!("account list emptied, disconnecting");
                    self.disconnect();
                    let _ = self.events_tx.send(SessionEvent::Disconnected);
                } else {
                    let _ = self.events_tx.send(SessionEvent::ReloadRequired);
                }
            }
            ProviderSignal::ChainChanged(chain) => {
                tracing::info!(?chain, "chain changed, session rebuild required");
                let _ = self.events_tx.send(SessionEvent::ReloadRequired);
            }
            ProviderSignal::Connected(info) => {
                tracing::debug!(?info, "provider connected");
            }
            ProviderSignal::Disconnected(error) => {
                tracing::info!(?error, "provider disconnected");
                self.disconnect();
                let _ = self.events_tx.send(SessionEvent::Disconnected);
            }
        }
    }

    fn subscribe_events(&mut self, provider: &Arc<dyn EthereumProvider>) {
        let wiring: [(ProviderEvent, fn(Value) -> ProviderSignal); 4] = [
            (ProviderEvent::AccountsChanged, ProviderSignal::AccountsChanged),
            (ProviderEvent::ChainChanged, ProviderSignal::ChainChanged),
            (ProviderEvent::Connect, ProviderSignal::Connected),
            (ProviderEvent::Disconnect, ProviderSignal::Disconnected),
        ];
        for (event, make_signal) in wiring {
            let tx = self.signal_tx.clone();
            let id = provider.subscribe(
                event,
                Box::new(move |payload| {
                    let _ = tx.send(make_signal(payload.clone()));
                }),
            );
            self.subscriptions.push((event, id));
        }
    }
}

fn connect_err(err: ProviderError) -> ConnectError {
    if err.user_rejected() {
        ConnectError::UserRejected
    } else {
        ConnectError::Provider(err.message)
    }
}

fn first_account(accounts: &Value) -> Result<EthAddress, ConnectError> {
    let raw = accounts
        .as_array()
        .and_then(|a| a.first())
        .and_then(Value::as_str)
        .ok_or_else(|| ConnectError::Provider("no accounts returned".into()))?;
    EthAddress::parse(raw).map_err(|e| ConnectError::Provider(e.to_string()))
}

async fn query_chain_id(provider: &dyn EthereumProvider) -> Result<u64, ConnectError> {
    let value = provider
        .request("eth_chainId", json!([]))
        .await
        .map_err(connect_err)?;
    parse_chain_id(&value).ok_or_else(|| ConnectError::Provider(format!("bad chain id: {value}")))
}

fn parse_chain_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => {
            let hex = s.strip_prefix("0x").unwrap_or(s);
            u64::from_str_radix(hex, 16).ok()
        }
        _ => None,
    }
}
