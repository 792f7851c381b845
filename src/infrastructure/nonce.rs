use crate::domain::ports::NonceSource;
use rand::Rng;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;

/// Nonces drawn from the operating system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsNonceSource;

impl NonceSource for OsNonceSource {
    fn nonce(&self, len: usize) -> String {
        OsRng
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect()
    }
}
