//! Password-derived secrets.

use ballot_crypto::{constant_time_eq, sha3_256_multi};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// SHA3-256 of `voter_id ‖ password ‖ salt_hex`.
///
/// This type intentionally does not implement `Debug`, `Display`, `Clone` or
/// `Serialize`. Bytes are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedSecret([u8; 32]);

impl DerivedSecret {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Key for the challenge MAC: the secret's lowercase hex rendering.
    pub fn mac_key(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0))
    }

    /// Constant-time equality.
    pub fn ct_eq(&self, other: &DerivedSecret) -> bool {
        constant_time_eq(&self.0, &other.0)
    }
}

/// Derive the secret a voter proves knowledge of.
///
/// Both sides run this: the credential store at registration and the prover
/// when answering a challenge, using the public salt.
pub fn derive_secret(voter_id: &str, password: &str, salt_hex: &str) -> DerivedSecret {
    DerivedSecret(sha3_256_multi(&[
        voter_id.as_bytes(),
        password.as_bytes(),
        salt_hex.as_bytes(),
    ]))
}
