//! Prover side of the challenge-response exchange.

use ballot_crypto::hmac_sha256_hex;

use crate::secret::DerivedSecret;

/// MAC input: the challenge followed by the verifier bit, as text.
pub(crate) fn response_message(challenge: &str, bit: &str) -> Vec<u8> {
    let mut message = Vec::with_capacity(challenge.len() + bit.len());
    message.extend_from_slice(challenge.as_bytes());
    message.extend_from_slice(bit.as_bytes());
    message
}

/// Answer a challenge: hex HMAC-SHA-256 of `challenge ‖ bit` keyed by the secret.
///
/// Runs on the voter's side after deriving the secret from the password and
/// the salt published by [`crate::CredentialStore::salt_for`].
pub fn compute_response(secret: &DerivedSecret, challenge: &str, bit: &str) -> String {
    let key = secret.mac_key();
    hmac_sha256_hex(key.as_bytes(), &response_message(challenge, bit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::derive_secret;
    use ballot_crypto::hmac_sha256;

    #[test]
    fn response_is_hmac_over_challenge_and_bit() {
        let secret = derive_secret("alice", "pw1", "salt");
        let key = hex::encode(secret.as_bytes());
        let expected = hex::encode(hmac_sha256(key.as_bytes(), b"c0ffee7f"));
        assert_eq!(compute_response(&secret, "c0ffee", "7f"), expected);
    }

    #[test]
    fn bit_changes_response() {
        let secret = derive_secret("alice", "pw1", "salt");
        assert_ne!(
            compute_response(&secret, "abcd", "00"),
            compute_response(&secret, "abcd", "01")
        );
    }
}
