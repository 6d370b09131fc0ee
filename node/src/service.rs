//! The election service: registration, login and vote submission over one
//! shared ledger.
//!
//! One service instance is shared (behind an `Arc`) by every voter session.
//! Session handlers hold no state of their own beyond the tokens the
//! service hands out.

use std::sync::Arc;

use ballot_auth::{AuthError, AuthenticatedVoter, ChallengeAuthenticator, CredentialStore};
use ballot_crypto::{OsRandom, RandomSource};
use ballot_ledger::{IntegrityError, Ledger, LedgerError, SealedBlock, Tally, Transaction};
use ballot_types::{Clock, SystemClock};
use ballot_work::CancelToken;

use crate::config::ElectionConfig;
use crate::tracing_spans::{login_span, mine_span, vote_span};
use crate::NodeError;

/// Proof that the caller logged in as the election administrator.
#[derive(Debug)]
pub struct AdminSession {
    account: String,
}

impl AdminSession {
    pub fn account(&self) -> &str {
        &self.account
    }
}

pub struct ElectionService {
    ledger: Arc<Ledger>,
    credentials: Arc<CredentialStore>,
    authenticator: ChallengeAuthenticator,
    admin_account: String,
    /// Holds only the admin credential, apart from voter credentials.
    admin_credentials: CredentialStore,
}

impl ElectionService {
    /// Service on the system clock and OS randomness.
    pub fn new(config: &ElectionConfig) -> Result<Self, NodeError> {
        Self::with_sources(config, Arc::new(SystemClock), Arc::new(OsRandom))
    }

    /// Service with injected time and randomness, for deterministic tests.
    pub fn with_sources(
        config: &ElectionConfig,
        clock: Arc<dyn Clock>,
        random: Arc<dyn RandomSource>,
    ) -> Result<Self, NodeError> {
        let difficulty = config.work_difficulty()?;
        let ledger = Arc::new(Ledger::new(config.candidates.clone(), difficulty, clock)?);

        let credentials = Arc::new(CredentialStore::with_random(
            config.registration_policy,
            Arc::clone(&random),
        ));
        let authenticator = ChallengeAuthenticator::with_random(Arc::clone(&credentials), random);

        let admin_credentials = CredentialStore::default();
        if let Some(password) = &config.admin_password {
            admin_credentials.register(&config.admin_account, password)?;
        } else {
            tracing::warn!("no admin password configured; admin login disabled");
        }

        tracing::info!(
            candidates = config.candidates.len(),
            difficulty = difficulty.leading_zeros(),
            "election service ready"
        );

        Ok(Self {
            ledger,
            credentials,
            authenticator,
            admin_account: config.admin_account.clone(),
            admin_credentials,
        })
    }

    pub fn register_voter(&self, voter_id: &str, password: &str) -> Result<(), NodeError> {
        self.credentials.register(voter_id, password)?;
        Ok(())
    }

    /// Password check plus challenge-response handshake.
    pub fn login(&self, voter_id: &str, password: &str) -> Result<AuthenticatedVoter, NodeError> {
        let _span = login_span(voter_id).entered();
        Ok(self.authenticator.login(voter_id, password)?)
    }

    /// The authenticator, for callers running the handshake across a transport.
    pub fn authenticator(&self) -> &ChallengeAuthenticator {
        &self.authenticator
    }

    /// Record a vote for the candidate at 1-based `candidate_index`.
    ///
    /// Consumes the login token, so one login yields at most one vote attempt.
    pub fn submit_vote(
        &self,
        voter: AuthenticatedVoter,
        candidate_index: usize,
    ) -> Result<SealedBlock, NodeError> {
        self.submit_vote_with_cancel(voter, candidate_index, &CancelToken::new())
    }

    /// [`Self::submit_vote`], abandoning the nonce search if `cancel` fires.
    pub fn submit_vote_with_cancel(
        &self,
        voter: AuthenticatedVoter,
        candidate_index: usize,
        cancel: &CancelToken,
    ) -> Result<SealedBlock, NodeError> {
        let voter_id = voter.into_voter_id();
        let _span = vote_span(&voter_id, candidate_index).entered();

        if self.ledger.has_voted(&voter_id) {
            tracing::info!("vote rejected: already voted");
            return Err(LedgerError::AlreadyVoted { voter_id }.into());
        }
        let Some(candidate) = self.ledger.candidate_at(candidate_index) else {
            tracing::info!("vote rejected: candidate index out of range");
            return Err(LedgerError::InvalidCandidate {
                candidate: candidate_index.to_string(),
            }
            .into());
        };

        let transaction = Transaction::new(voter_id, candidate);
        let _mine = mine_span(self.ledger.difficulty().leading_zeros()).entered();
        Ok(self.ledger.record_vote_with_cancel(transaction, cancel)?)
    }

    pub fn tally(&self) -> Tally {
        self.ledger.tally()
    }

    /// Every recorded vote, in chain order. Administrator only.
    pub fn all_transactions(&self, _admin: &AdminSession) -> Vec<Transaction> {
        self.ledger.all_transactions()
    }

    pub fn is_admin(&self, account: &str) -> bool {
        account == self.admin_account
    }

    /// Authenticate the administrator account.
    pub fn admin_login(&self, account: &str, password: &str) -> Result<AdminSession, NodeError> {
        if !self.is_admin(account) {
            tracing::info!(account, "admin login refused: not the admin account");
            return Err(NodeError::NotAdmin(account.to_string()));
        }
        if !self.admin_credentials.verify_password(account, password) {
            tracing::warn!(account, "admin login refused: bad credentials");
            return Err(AuthError::AuthenticationFailed.into());
        }
        tracing::info!(account, "admin logged in");
        Ok(AdminSession {
            account: account.to_string(),
        })
    }

    pub fn candidates(&self) -> &[String] {
        self.ledger.candidates()
    }

    pub fn blocks(&self) -> Vec<SealedBlock> {
        self.ledger.blocks()
    }

    pub fn verify_chain_integrity(&self) -> Result<(), IntegrityError> {
        self.ledger.verify_chain_integrity()
    }

    /// The sealed chain as pretty-printed JSON.
    pub fn chain_json(&self) -> Result<String, NodeError> {
        Ok(serde_json::to_string_pretty(&self.ledger.blocks())?)
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_nullables::{NullClock, NullRandom};

    fn config() -> ElectionConfig {
        ElectionConfig {
            work_difficulty: 1,
            admin_password: Some("admin123".into()),
            ..ElectionConfig::default()
        }
    }

    fn service() -> ElectionService {
        ElectionService::with_sources(
            &config(),
            Arc::new(NullClock::new(1_700_000_000)),
            Arc::new(OsRandom),
        )
        .unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let bad = ElectionConfig {
            candidates: vec![],
            ..config()
        };
        assert!(matches!(
            ElectionService::new(&bad),
            Err(NodeError::Ledger(LedgerError::EmptySlate))
        ));

        let bad = ElectionConfig {
            work_difficulty: 99,
            ..config()
        };
        assert!(matches!(ElectionService::new(&bad), Err(NodeError::Config(_))));
    }

    #[test]
    fn index_maps_to_slate_position() {
        let service = service();
        service.register_voter("alice", "pw1").unwrap();
        let token = service.login("alice", "pw1").unwrap();
        let block = service.submit_vote(token, 2).unwrap();
        assert_eq!(block.transactions()[0].candidate_choice, "Candidate B");
    }

    #[test]
    fn index_zero_is_invalid() {
        let service = service();
        service.register_voter("bob", "pw").unwrap();
        let token = service.login("bob", "pw").unwrap();
        assert!(matches!(
            service.submit_vote(token, 0),
            Err(NodeError::Ledger(LedgerError::InvalidCandidate { .. }))
        ));
        assert_eq!(service.blocks().len(), 1);
    }

    #[test]
    fn admin_login_paths() {
        let service = service();
        assert!(service.is_admin("admin"));
        assert!(!service.is_admin("alice"));

        assert!(matches!(
            service.admin_login("alice", "admin123"),
            Err(NodeError::NotAdmin(_))
        ));
        assert!(matches!(
            service.admin_login("admin", "wrong"),
            Err(NodeError::Auth(AuthError::AuthenticationFailed))
        ));
        let admin = service.admin_login("admin", "admin123").unwrap();
        assert_eq!(admin.account(), "admin");
        assert!(service.all_transactions(&admin).is_empty());
    }

    #[test]
    fn admin_disabled_without_password() {
        let service = ElectionService::with_sources(
            &ElectionConfig {
                admin_password: None,
                ..config()
            },
            Arc::new(NullClock::new(0)),
            Arc::new(NullRandom::constant(3)),
        )
        .unwrap();
        assert!(matches!(
            service.admin_login("admin", "admin123"),
            Err(NodeError::Auth(AuthError::AuthenticationFailed))
        ));
    }

    #[test]
    fn chain_json_lists_blocks() {
        let service = service();
        let json = service.chain_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let blocks = parsed.as_array().unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0]["index"], 1);
        assert_eq!(blocks[0]["hash"].as_str().unwrap().len(), 64);
    }
}
