use thiserror::Error;

/// Numeric code a provider reports when the user cancels a signing
/// request (EIP-1193 `userRejectedRequest`).
pub const USER_REJECTED_CODE: i64 = 4001;

/// Raw failure surfaced by a provider `request` call.
///
/// Carries the provider's numeric error code when one was reported; the
/// message text is what vote-error classification pattern-matches on.
#[derive(Debug, Clone, Error)]
#[error("provider error{}: {message}", .code.map(|c| format!(" ({c})")).unwrap_or_default())]
pub struct ProviderError {
    pub code: Option<i64>,
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    pub fn user_rejected(&self) -> bool {
        self.code == Some(USER_REJECTED_CODE)
    }
}

/// Failures of `WalletConnector::connect`.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("no Ethereum wallet detected — install MetaMask, Phantom, Coinbase Wallet or Brave")]
    NoProviderFound,

    /// The multi-chain wallet is installed but only its non-Ethereum side
    /// is active; falling through to nothing would strand the user, so
    /// this carries remediation guidance instead.
    #[error("Phantom detected but Ethereum is not active — enable the Ethereum toggle in Phantom settings and restart the browser")]
    EthereumDisabled,

    #[error("wrong network: connected to chain {current}, required chain {required}")]
    WrongNetwork { current: u64, required: u64 },

    #[error("connection request rejected by user")]
    UserRejected,

    #[error("provider error: {0}")]
    Provider(String),
}

/// Failures of contract reads.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("invalid contract response: {0}")]
    InvalidResponse(String),
}

/// Classified failure of a vote transaction.
///
/// Classification is a best-effort match on the revert text the provider
/// reports; anything unrecognized degrades to `Unknown` rather than
/// guessing.
#[derive(Debug, Error)]
pub enum VoteError {
    #[error("transaction rejected by user")]
    UserRejected,

    #[error("this address has already voted")]
    AlreadyVoted,

    #[error("the voting period has ended")]
    VotingClosed,

    #[error("invalid candidate number")]
    InvalidCandidate,

    #[error("transaction failed: {0}")]
    Unknown(String),
}

impl VoteError {
    /// Map a raw provider failure onto the fixed vote-error taxonomy.
    pub fn classify(err: ProviderError) -> Self {
        if err.user_rejected() {
            return VoteError::UserRejected;
        }
        if err.message.contains("already voted") {
            VoteError::AlreadyVoted
        } else if err.message.contains("Voting is finished") {
            VoteError::VotingClosed
        } else if err.message.contains("Invalid candidate") {
            VoteError::InvalidCandidate
        } else {
            VoteError::Unknown(err.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_user_rejection_by_code() {
        let err = ProviderError::with_code(USER_REJECTED_CODE, "User denied transaction");
        assert!(matches!(VoteError::classify(err), VoteError::UserRejected));
    }

    #[test]
    fn classify_known_revert_substrings() {
        let cases = [
            ("execution reverted: You have already voted.", "AlreadyVoted"),
            ("execution reverted: Voting is finished", "VotingClosed"),
            ("execution reverted: Invalid candidate index.", "InvalidCandidate"),
        ];
        for (msg, expected) in cases {
            let classified = VoteError::classify(ProviderError::new(msg));
            let name = match classified {
                VoteError::AlreadyVoted => "AlreadyVoted",
                VoteError::VotingClosed => "VotingClosed",
                VoteError::InvalidCandidate => "InvalidCandidate",
                other => panic!("{msg:?} classified as {other:?}"),
            };
            assert_eq!(name, expected);
        }
    }

    #[test]
    fn unmatched_text_degrades_to_unknown() {
        let err = ProviderError::new("nonce too low");
        match VoteError::classify(err) {
            VoteError::Unknown(text) => assert_eq!(text, "nonce too low"),
            other => panic!("expected Unknown, got {other:?}"),
        }
    }
}
