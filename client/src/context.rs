//! The one orchestrator object for a client page.
//!
//! Owns the connector, the current election binding, the poll scheduler,
//! the verification manager and the local stores. The browser origin of
//! this client kept all of this in module-level globals; here it is a
//! single owned context so lifetimes and teardown are explicit.

use crate::config::AppConfig;
use crate::flow::{VotePhase, VoteRejection, VoteSubmissionFlow};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::mpsc;
use voteth_chain::{
    ConnectError, ContractGateway, ElectionReader, InjectedWallets, PendingVote, RpcError,
    SessionEvent, StatusSnapshot, WalletConnector, SEPOLIA_CHAIN_ID,
};
use voteth_store::{ElectionHistory, KvStore, Preferences, Theme, TokenStore};
use voteth_sync::{SyncScheduler, SyncUpdate, ViewShape};
use voteth_types::{AddressError, CandidateView, ElectionRecord, EthAddress, WalletSession};
use voteth_verify::{FaceVerificationManager, VerificationApi, VideoDevice};

/// Failures of switching to another election contract.
#[derive(Debug, Error)]
pub enum SwitchError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("this address has no contract code")]
    NotAContract,
}

/// The election the polls and votes are bound to right now. Swapping the
/// binding retargets running poll loops without restarting them.
#[derive(Default)]
struct CurrentElection {
    gateway: RwLock<Option<ContractGateway>>,
}

impl CurrentElection {
    fn bind(&self, gateway: ContractGateway) {
        *self.gateway.write().unwrap_or_else(|e| e.into_inner()) = Some(gateway);
    }

    fn get(&self) -> Option<ContractGateway> {
        self.gateway
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

fn unbound() -> RpcError {
    RpcError::InvalidResponse("no wallet session bound".into())
}

#[async_trait]
impl ElectionReader for CurrentElection {
    async fn status(&self) -> Result<StatusSnapshot, RpcError> {
        self.get().ok_or_else(unbound)?.status().await
    }

    async fn candidates(&self) -> Result<Vec<CandidateView>, RpcError> {
        let gateway = self.get().ok_or_else(unbound)?;
        ElectionReader::candidates(&gateway).await
    }
}

/// Receivers the presentation layer drains.
pub struct ClientChannels {
    pub session_events: mpsc::UnboundedReceiver<SessionEvent>,
    pub sync_updates: mpsc::UnboundedReceiver<SyncUpdate>,
    pub vote_phases: mpsc::UnboundedReceiver<VotePhase>,
}

pub struct ClientContext {
    connector: WalletConnector,
    current: Arc<CurrentElection>,
    scheduler: SyncScheduler,
    flow: VoteSubmissionFlow,
    verification: FaceVerificationManager,
    prefs: Preferences,
    history: ElectionHistory,
    election_address: EthAddress,
    election_name: String,
}

impl ClientContext {
    pub fn new(
        wallets: InjectedWallets,
        kv: Arc<dyn KvStore>,
        device: Arc<dyn VideoDevice>,
        face_api: Arc<dyn VerificationApi>,
        config: AppConfig,
    ) -> (Self, ClientChannels) {
        let (connector, session_events) = WalletConnector::new(wallets, SEPOLIA_CHAIN_ID);
        let current = Arc::new(CurrentElection::default());
        let (scheduler, sync_updates) =
            SyncScheduler::new(current.clone() as Arc<dyn ElectionReader>);
        let tokens = TokenStore::new(kv.clone());
        let (flow, vote_phases) = VoteSubmissionFlow::new(tokens.clone());
        let verification = FaceVerificationManager::new(face_api, device, tokens);

        (
            Self {
                connector,
                current,
                scheduler,
                flow,
                verification,
                prefs: Preferences::new(kv.clone()),
                history: ElectionHistory::new(kv),
                election_address: config.contract_address,
                election_name: "Current Election".to_string(),
            },
            ClientChannels {
                session_events,
                sync_updates,
                vote_phases,
            },
        )
    }

    /// Connect a wallet and bind the contract gateway to the session's
    /// provider.
    pub async fn connect_wallet(&mut self) -> Result<WalletSession, ConnectError> {
        let session = self.connector.connect().await?;
        if let Some(provider) = self.connector.provider() {
            self.current
                .bind(ContractGateway::new(provider, self.election_address.clone()));
        }
        Ok(session)
    }

    pub fn session(&self) -> Option<&WalletSession> {
        self.connector.session()
    }

    /// Submit a vote for the candidate index in `input`.
    pub async fn vote(&self, input: &str) -> Result<PendingVote, VoteRejection> {
        let gateway = self.current.get().ok_or(VoteRejection::NotConnected)?;
        self.flow.submit(&self.connector, &gateway, input).await
    }

    /// Retarget the client at another election contract.
    ///
    /// The code-presence probe is best effort: a definite "no code there"
    /// aborts, but a failed probe proceeds with a warning so a flaky RPC
    /// endpoint cannot lock the user out of switching.
    pub async fn switch_election(&mut self, raw: &str, name: &str) -> Result<(), SwitchError> {
        let address = EthAddress::parse(raw.trim())?;
        if let Some(gateway) = self.current.get() {
            match gateway.has_code(&address).await {
                Ok(false) => return Err(SwitchError::NotAContract),
                Ok(true) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "could not verify contract code, proceeding")
                }
            }
        }

        self.history.save(address.clone(), name);
        self.election_name = name.to_string();
        self.election_address = address.clone();
        if let Some(provider) = self.connector.provider() {
            self.current.bind(ContractGateway::new(provider, address));
        }
        tracing::info!(election = %self.election_name, "switched election");
        Ok(())
    }

    pub fn election_address(&self) -> &EthAddress {
        &self.election_address
    }

    pub fn election_name(&self) -> &str {
        &self.election_name
    }

    pub fn saved_elections(&self) -> Vec<ElectionRecord> {
        self.history.list()
    }

    /// Identity handed to the face service: the wallet address when
    /// connected, otherwise a stored per-browser id.
    pub fn user_id(&self) -> String {
        match self.connector.session() {
            Some(session) => session.address.as_str().to_string(),
            None => self.prefs.user_id(),
        }
    }

    pub fn verification(&self) -> &FaceVerificationManager {
        &self.verification
    }

    pub fn theme(&self) -> Theme {
        self.prefs.theme()
    }

    pub fn toggle_theme(&self) -> Theme {
        self.prefs.toggle_theme()
    }

    /// Forward a page-visibility change to the poll scheduler.
    pub fn visibility_changed(&self, hidden: bool, shape: ViewShape) {
        self.scheduler.visibility_changed(hidden, shape);
    }

    pub fn scheduler(&self) -> &SyncScheduler {
        &self.scheduler
    }

    /// Apply any queued provider events (account/chain changes,
    /// disconnects). Call on the owner's turn, e.g. once per UI tick.
    pub fn process_wallet_events(&mut self) {
        self.connector.process_signals();
    }

    /// Teardown on unload/navigation: stop polls, release the camera,
    /// drop the wallet session and its subscriptions.
    pub fn shutdown(&mut self) {
        self.scheduler.stop_all();
        self.verification.stop_camera();
        self.connector.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CONTRACT_ADDRESS;
    use crate::testutil::{ScriptedProvider, TEST_ACCOUNT};
    use voteth_store::MemoryStore;
    use voteth_types::{unix_now_ms, CapabilityToken, PollKind};
    use voteth_verify::{
        CameraError, EnrollResponse, EnrollmentStatus, StreamConstraints, VerifyError,
        VerifyHttpOutcome, VideoStream,
    };

    struct NoApi;

    #[async_trait]
    impl VerificationApi for NoApi {
        async fn status(&self, _u: &str) -> Result<EnrollmentStatus, VerifyError> {
            Err(VerifyError::Http("unused".into()))
        }
        async fn enroll(&self, _u: &str, _i: &str) -> Result<EnrollResponse, VerifyError> {
            Err(VerifyError::Http("unused".into()))
        }
        async fn verify(
            &self,
            _u: &str,
            _i: &str,
            _s: bool,
        ) -> Result<VerifyHttpOutcome, VerifyError> {
            Err(VerifyError::Http("unused".into()))
        }
    }

    struct NoCamera;

    impl VideoDevice for NoCamera {
        fn open(&self, _c: StreamConstraints) -> Result<Box<dyn VideoStream>, CameraError> {
            Err(CameraError::NoDevice)
        }
    }

    struct Rig {
        provider: Arc<ScriptedProvider>,
        kv: Arc<MemoryStore>,
        context: ClientContext,
        channels: ClientChannels,
    }

    fn rig() -> Rig {
        let provider = Arc::new(ScriptedProvider::sepolia());
        let wallets = InjectedWallets {
            ethereum: Some(provider.clone() as Arc<dyn voteth_chain::EthereumProvider>),
            ..InjectedWallets::default()
        };
        let kv = Arc::new(MemoryStore::new());
        let (context, channels) = ClientContext::new(
            wallets,
            kv.clone(),
            Arc::new(NoCamera),
            Arc::new(NoApi),
            AppConfig::fallback(),
        );
        Rig {
            provider,
            kv,
            context,
            channels,
        }
    }

    fn grant_token(kv: &Arc<MemoryStore>) {
        TokenStore::new(kv.clone() as Arc<dyn KvStore>)
            .set(&CapabilityToken::issued("tok", 90.0, 300, unix_now_ms()));
    }

    const OTHER_ELECTION: &str = "0x00000000000000000000000000000000000000bb";

    #[tokio::test]
    async fn vote_before_connecting_is_rejected() {
        let r = rig();
        grant_token(&r.kv);
        assert_eq!(
            r.context.vote("1").await.unwrap_err(),
            VoteRejection::NotConnected
        );
    }

    #[tokio::test]
    async fn connect_binds_the_gateway_to_the_configured_election() {
        let mut r = rig();
        grant_token(&r.kv);
        let session = r.context.connect_wallet().await.unwrap();
        assert_eq!(session.address.as_str().to_lowercase(), TEST_ACCOUNT);

        r.context.vote("1").await.unwrap();
        let votes = r.provider.requests_named("vote");
        assert_eq!(votes[0]["to"], DEFAULT_CONTRACT_ADDRESS);
    }

    #[tokio::test]
    async fn malformed_address_never_reaches_history() {
        let mut r = rig();
        let err = r.context.switch_election("not-an-address", "Bad").await;
        assert!(matches!(err, Err(SwitchError::Address(_))));
        assert!(r.context.saved_elections().is_empty());
    }

    #[tokio::test]
    async fn codeless_address_is_refused() {
        let mut r = rig();
        r.context.connect_wallet().await.unwrap();
        *r.provider.code_at_address.lock().unwrap() = "0x".to_string();

        let err = r.context.switch_election(OTHER_ELECTION, "Ghost").await;
        assert!(matches!(err, Err(SwitchError::NotAContract)));
        assert!(r.context.saved_elections().is_empty());
    }

    #[tokio::test]
    async fn failed_code_probe_proceeds_with_the_switch() {
        let mut r = rig();
        r.context.connect_wallet().await.unwrap();
        *r.provider.fail_code_check.lock().unwrap() = true;

        r.context
            .switch_election(OTHER_ELECTION, "Runoff 2026")
            .await
            .unwrap();
        let saved = r.context.saved_elections();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].name, "Runoff 2026");
    }

    #[tokio::test]
    async fn switch_retargets_subsequent_votes() {
        let mut r = rig();
        grant_token(&r.kv);
        r.context.connect_wallet().await.unwrap();
        r.context
            .switch_election(OTHER_ELECTION, "Runoff 2026")
            .await
            .unwrap();

        r.context.vote("0").await.unwrap();
        let votes = r.provider.requests_named("vote");
        assert_eq!(votes[0]["to"], OTHER_ELECTION);
        assert_eq!(r.context.election_name(), "Runoff 2026");
    }

    #[tokio::test]
    async fn user_id_prefers_the_wallet_address() {
        let mut r = rig();
        let browser_id = r.context.user_id();
        assert!(browser_id.starts_with("user_"));
        // Stable across calls.
        assert_eq!(r.context.user_id(), browser_id);

        r.context.connect_wallet().await.unwrap();
        assert_eq!(r.context.user_id().to_lowercase(), TEST_ACCOUNT);
    }

    #[tokio::test]
    async fn polls_fail_soft_until_a_session_is_bound() {
        let r = rig();
        let reader = r.context.current.clone();
        assert!(ElectionReader::status(&*reader).await.is_err());
        drop(r.channels);
    }

    #[tokio::test]
    async fn shutdown_stops_every_poll() {
        let mut r = rig();
        r.context.connect_wallet().await.unwrap();
        r.context.visibility_changed(
            false,
            ViewShape {
                has_candidate_table: true,
                has_results_container: true,
            },
        );
        assert!(r.context.scheduler().is_running(PollKind::Status));

        r.context.shutdown();
        assert!(!r.context.scheduler().is_running(PollKind::Status));
        assert!(!r.context.scheduler().is_running(PollKind::Results));
        assert!(r.context.session().is_none());
    }
}
