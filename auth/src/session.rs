/// Proof that a voter completed the challenge-response exchange.
///
/// Only [`crate::ChallengeAuthenticator`] can mint one. It is neither `Clone`
/// nor `Copy`, so a vote submission that consumes it bounds one login to one
/// vote attempt.
#[derive(Debug, PartialEq, Eq)]
pub struct AuthenticatedVoter {
    voter_id: String,
}

impl AuthenticatedVoter {
    pub(crate) fn new(voter_id: String) -> Self {
        Self { voter_id }
    }

    pub fn voter_id(&self) -> &str {
        &self.voter_id
    }

    pub fn into_voter_id(self) -> String {
        self.voter_id
    }
}
