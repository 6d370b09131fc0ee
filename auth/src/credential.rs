//! Salted voter credentials.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ballot_crypto::{OsRandom, RandomSource};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::secret::{derive_secret, DerivedSecret};

/// Bytes of fresh randomness per salt.
pub const SALT_LEN: usize = 16;

/// What `register` does when the voter id already has a credential.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationPolicy {
    /// Replace the existing credential.
    #[default]
    Overwrite,
    /// Refuse with [`AuthError::AlreadyRegistered`].
    Reject,
}

struct CredentialRecord {
    salt: String,
    secret: DerivedSecret,
}

/// Voter id → salt and derived secret. The raw password is never stored.
pub struct CredentialStore {
    records: RwLock<HashMap<String, CredentialRecord>>,
    policy: RegistrationPolicy,
    random: Arc<dyn RandomSource>,
}

impl CredentialStore {
    pub fn new(policy: RegistrationPolicy) -> Self {
        Self::with_random(policy, Arc::new(OsRandom))
    }

    /// Store drawing salts from `random`.
    pub fn with_random(policy: RegistrationPolicy, random: Arc<dyn RandomSource>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            policy,
            random,
        }
    }

    /// Register `voter_id` with a fresh salt.
    pub fn register(&self, voter_id: &str, password: &str) -> Result<(), AuthError> {
        if voter_id.is_empty() {
            return Err(AuthError::InvalidVoterId);
        }

        let salt = self.random.hex(SALT_LEN);
        let secret = derive_secret(voter_id, password, &salt);

        let mut records = self.write();
        let replaced = records.contains_key(voter_id);
        if replaced && self.policy == RegistrationPolicy::Reject {
            tracing::info!(voter = voter_id, "registration refused: already registered");
            return Err(AuthError::AlreadyRegistered {
                voter_id: voter_id.to_string(),
            });
        }
        records.insert(voter_id.to_string(), CredentialRecord { salt, secret });
        drop(records);

        tracing::info!(voter = voter_id, replaced, "voter registered");
        Ok(())
    }

    /// Recompute the secret with the stored salt and compare in constant time.
    pub fn verify_password(&self, voter_id: &str, password: &str) -> bool {
        self.with_matching_credential(voter_id, password, |_, _| ())
            .is_some()
    }

    /// Public salt for `voter_id`, needed by a remote prover to derive its secret.
    pub fn salt_for(&self, voter_id: &str) -> Option<String> {
        self.read().get(voter_id).map(|r| r.salt.clone())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Run `f` against the stored secret without letting it escape the lock.
    pub(crate) fn with_secret<R>(
        &self,
        voter_id: &str,
        f: impl FnOnce(&DerivedSecret) -> R,
    ) -> Option<R> {
        self.read().get(voter_id).map(|r| f(&r.secret))
    }

    /// Run `f` with the salt and stored secret, only if `password` matches.
    ///
    /// The read guard is held for the whole call, so a concurrent
    /// re-registration cannot swap the credential between check and use.
    pub(crate) fn with_matching_credential<R>(
        &self,
        voter_id: &str,
        password: &str,
        f: impl FnOnce(&str, &DerivedSecret) -> R,
    ) -> Option<R> {
        let records = self.read();
        let record = records.get(voter_id)?;
        if !derive_secret(voter_id, password, &record.salt).ct_eq(&record.secret) {
            return None;
        }
        Some(f(&record.salt, &record.secret))
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CredentialRecord>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CredentialRecord>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new(RegistrationPolicy::default())
    }
}
