use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("ledger error: {0}")]
    Ledger(#[from] ballot_ledger::LedgerError),

    #[error("integrity violation: {0}")]
    Integrity(#[from] ballot_ledger::IntegrityError),

    #[error("authentication error: {0}")]
    Auth(#[from] ballot_auth::AuthError),

    #[error("config error: {0}")]
    Config(String),

    #[error("account {0} is not the election administrator")]
    NotAdmin(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
