//! Vote submission: gate, validate, submit, confirm.

use tokio::sync::mpsc;
use voteth_chain::{ContractGateway, PendingVote, VoteError, WalletConnector};
use voteth_store::TokenStore;

/// Progress report emitted while a vote is on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VotePhase {
    Submitting,
    Confirming,
}

/// Why a vote attempt did not record a vote. Every variant maps to one
/// fixed user-facing message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoteRejection {
    /// No valid verification token; the UI should scroll to the
    /// verification section.
    VerificationRequired,
    NotConnected,
    EmptyInput,
    NotANumber,
    NegativeIndex,
    WrongNetwork,
    RejectedByUser,
    AlreadyVoted,
    VotingClosed,
    InvalidCandidate,
    Failed,
}

impl VoteRejection {
    pub fn message(&self) -> &'static str {
        match self {
            VoteRejection::VerificationRequired => {
                "Please complete face verification before voting!"
            }
            VoteRejection::NotConnected => "Please connect your wallet first",
            VoteRejection::EmptyInput => "Please enter a candidate number",
            VoteRejection::NotANumber => "Please enter a valid number",
            VoteRejection::NegativeIndex => "Candidate number must be 0 or greater",
            VoteRejection::WrongNetwork => "Please switch to Sepolia network",
            VoteRejection::RejectedByUser => "Transaction rejected by user",
            VoteRejection::AlreadyVoted => "You have already voted!",
            VoteRejection::VotingClosed => "Voting period has ended",
            VoteRejection::InvalidCandidate => "Invalid candidate number",
            VoteRejection::Failed => "Transaction failed. Please try again.",
        }
    }

    /// Whether the UI should bring the verification section into view.
    pub fn wants_verification_scroll(&self) -> bool {
        matches!(self, VoteRejection::VerificationRequired)
    }

    fn from_vote_error(err: VoteError) -> Self {
        match err {
            VoteError::UserRejected => VoteRejection::RejectedByUser,
            VoteError::AlreadyVoted => VoteRejection::AlreadyVoted,
            VoteError::VotingClosed => VoteRejection::VotingClosed,
            VoteError::InvalidCandidate => VoteRejection::InvalidCandidate,
            VoteError::Unknown(message) => {
                tracing::warn!(%message, "unclassified vote failure");
                VoteRejection::Failed
            }
        }
    }
}

/// Orders the checks in front of a vote transaction.
///
/// The token gate is advisory: it keeps unverified users from wasting
/// gas, while the contract itself stays authoritative on
/// one-vote-per-address. All validation runs before anything touches the
/// network.
pub struct VoteSubmissionFlow {
    tokens: TokenStore,
    phase_tx: mpsc::UnboundedSender<VotePhase>,
}

impl VoteSubmissionFlow {
    /// The receiver carries [`VotePhase`] progress for the UI.
    pub fn new(tokens: TokenStore) -> (Self, mpsc::UnboundedReceiver<VotePhase>) {
        let (phase_tx, phase_rx) = mpsc::unbounded_channel();
        (Self { tokens, phase_tx }, phase_rx)
    }

    /// Validate the raw candidate-index input. `"0"` is a valid index.
    pub fn parse_candidate_index(input: &str) -> Result<u32, VoteRejection> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VoteRejection::EmptyInput);
        }
        let index: i64 = trimmed.parse().map_err(|_| VoteRejection::NotANumber)?;
        if index < 0 {
            return Err(VoteRejection::NegativeIndex);
        }
        u32::try_from(index).map_err(|_| VoteRejection::InvalidCandidate)
    }

    /// Run the full submission sequence. Short-circuits with the first
    /// applicable rejection; on success the vote is confirmed on-chain.
    pub async fn submit(
        &self,
        connector: &WalletConnector,
        gateway: &ContractGateway,
        input: &str,
    ) -> Result<PendingVote, VoteRejection> {
        if !self.tokens.has() {
            return Err(VoteRejection::VerificationRequired);
        }
        if connector.session().is_none() {
            return Err(VoteRejection::NotConnected);
        }
        let index = Self::parse_candidate_index(input)?;
        if !connector.network_ok().await {
            return Err(VoteRejection::WrongNetwork);
        }

        let _ = self.phase_tx.send(VotePhase::Submitting);
        let pending = gateway
            .cast_vote(index)
            .await
            .map_err(VoteRejection::from_vote_error)?;

        let _ = self.phase_tx.send(VotePhase::Confirming);
        gateway
            .await_confirmation(&pending)
            .await
            .map_err(VoteRejection::from_vote_error)?;
        Ok(pending)
    }
}
