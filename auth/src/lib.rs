//! Voter authentication.
//!
//! - Salted credential registration (SHA3-256 derived secret, never the password)
//! - One-time challenges answered with HMAC-SHA-256 over `challenge ‖ bit`
//! - [`AuthenticatedVoter`] tokens handed to the vote submission flow
//!
//! The handshake can run split across a transport (`issue_challenge` on the
//! server, [`derive_secret`] + [`compute_response`] on the client, `verify` on
//! the server) or collapsed in-process through [`ChallengeAuthenticator::login`].

pub mod challenge;
pub mod credential;
pub mod error;
pub mod prover;
pub mod secret;
pub mod session;

pub use challenge::{ChallengeAuthenticator, CHALLENGE_LEN, VERIFIER_BIT_LEN};
pub use credential::{CredentialStore, RegistrationPolicy, SALT_LEN};
pub use error::AuthError;
pub use prover::compute_response;
pub use secret::{derive_secret, DerivedSecret};
pub use session::AuthenticatedVoter;
