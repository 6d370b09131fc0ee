use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Unknown voter or wrong password.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// No outstanding challenge or no credential for the voter.
    #[error("no active challenge session")]
    NoSession,

    #[error("challenge response did not verify")]
    MacMismatch,

    #[error("voter {voter_id} is already registered")]
    AlreadyRegistered { voter_id: String },

    #[error("voter id must not be empty")]
    InvalidVoterId,
}
