//! One-time challenges and MAC verification.
//!
//! Per voter: `Idle -> ChallengeIssued -> {Authenticated | Failed}`. The
//! challenge is removed on the first verification attempt whatever the
//! outcome, so a consumed challenge/response pair can never be replayed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ballot_crypto::{verify_hmac_sha256, OsRandom, RandomSource};

use crate::credential::CredentialStore;
use crate::error::AuthError;
use crate::prover::{compute_response, response_message};
use crate::secret::{derive_secret, DerivedSecret};
use crate::session::AuthenticatedVoter;

/// Bytes of fresh randomness per challenge.
pub const CHALLENGE_LEN: usize = 16;

/// Bytes of randomness in the verifier bit.
pub const VERIFIER_BIT_LEN: usize = 1;

pub struct ChallengeAuthenticator {
    credentials: Arc<CredentialStore>,
    /// voter id -> outstanding challenge
    challenges: Mutex<HashMap<String, String>>,
    random: Arc<dyn RandomSource>,
}

impl ChallengeAuthenticator {
    pub fn new(credentials: Arc<CredentialStore>) -> Self {
        Self::with_random(credentials, Arc::new(OsRandom))
    }

    /// Authenticator drawing challenges and verifier bits from `random`.
    pub fn with_random(credentials: Arc<CredentialStore>, random: Arc<dyn RandomSource>) -> Self {
        Self {
            credentials,
            challenges: Mutex::new(HashMap::new()),
            random,
        }
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// Issue a fresh challenge for `voter_id`, replacing any outstanding one.
    pub fn issue_challenge(&self, voter_id: &str) -> String {
        let challenge = self.random.hex(CHALLENGE_LEN);
        let replaced = self
            .lock()
            .insert(voter_id.to_string(), challenge.clone())
            .is_some();
        tracing::debug!(voter = voter_id, replaced, "challenge issued");
        challenge
    }

    /// A fresh verifier bit, hex-encoded.
    pub fn verifier_bit(&self) -> String {
        self.random.hex(VERIFIER_BIT_LEN)
    }

    pub fn has_outstanding_challenge(&self, voter_id: &str) -> bool {
        self.lock().contains_key(voter_id)
    }

    /// Check `presented_mac` (hex) against HMAC of the outstanding challenge
    /// and `presented_bit` under the voter's stored secret.
    ///
    /// The challenge is consumed before the MAC is checked.
    pub fn verify(
        &self,
        voter_id: &str,
        presented_bit: &str,
        presented_mac: &str,
    ) -> Result<AuthenticatedVoter, AuthError> {
        let challenge = self.take_challenge(voter_id)?;
        self.credentials
            .with_secret(voter_id, |secret| {
                self.check_response(voter_id, &challenge, presented_bit, presented_mac, secret)
            })
            .unwrap_or_else(|| {
                tracing::info!(voter = voter_id, "challenge outstanding for unregistered voter");
                Err(AuthError::NoSession)
            })
    }

    /// Password check and full handshake in one call, both roles in-process.
    ///
    /// Runs under one credential read guard, so a concurrent re-registration
    /// lands either wholly before or wholly after this login.
    pub fn login(&self, voter_id: &str, password: &str) -> Result<AuthenticatedVoter, AuthError> {
        self.credentials
            .with_matching_credential(voter_id, password, |salt, stored| {
                let challenge = self.issue_challenge(voter_id);
                let bit = self.verifier_bit();
                let response =
                    compute_response(&derive_secret(voter_id, password, salt), &challenge, &bit);

                let challenge = self.take_challenge(voter_id)?;
                self.check_response(voter_id, &challenge, &bit, &response, stored)
            })
            .unwrap_or_else(|| {
                tracing::info!(voter = voter_id, "login refused: bad credentials");
                Err(AuthError::AuthenticationFailed)
            })
    }

    /// Remove the outstanding challenge, if any.
    fn take_challenge(&self, voter_id: &str) -> Result<String, AuthError> {
        self.lock().remove(voter_id).ok_or_else(|| {
            tracing::info!(voter = voter_id, "verification without an outstanding challenge");
            AuthError::NoSession
        })
    }

    fn check_response(
        &self,
        voter_id: &str,
        challenge: &str,
        presented_bit: &str,
        presented_mac: &str,
        secret: &DerivedSecret,
    ) -> Result<AuthenticatedVoter, AuthError> {
        let Ok(tag) = hex::decode(presented_mac) else {
            tracing::warn!(voter = voter_id, "challenge response is not valid hex");
            return Err(AuthError::MacMismatch);
        };

        let key = secret.mac_key();
        let message = response_message(challenge, presented_bit);
        if verify_hmac_sha256(key.as_bytes(), &message, &tag) {
            tracing::info!(voter = voter_id, "challenge response verified");
            Ok(AuthenticatedVoter::new(voter_id.to_string()))
        } else {
            tracing::warn!(voter = voter_id, "challenge response mismatch");
            Err(AuthError::MacMismatch)
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.challenges.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
