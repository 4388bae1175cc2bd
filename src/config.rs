//! Codec configuration.

use sequoia_openpgp as openpgp;
use openpgp::crypto::S2K;

use crate::CipherAlgorithm;

/// Parameters for generating and wrapping session keys.
///
/// # Examples
///
/// ```
/// use sequoia_openpgp as openpgp;
/// use openpgp::crypto::S2K;
/// use openpgp::types::HashAlgorithm;
/// use sequoia_session_key::{CipherAlgorithm, Config};
///
/// let config = Config::default()
///     .set_default_cipher(CipherAlgorithm::AES128)
///     .set_s2k(S2K::Iterated {
///         hash: HashAlgorithm::SHA256,
///         salt: [0x5a; 8],
///         hash_bytes: 65536,
///     });
/// assert_eq!(config.default_cipher(), CipherAlgorithm::AES128);
/// assert!(config.s2k().is_some());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Config {
    default_cipher: CipherAlgorithm,
    s2k: Option<S2K>,
}

impl Config {
    /// Sets the cipher used for fresh session keys.
    ///
    /// Defaults to [`CipherAlgorithm::AES256`].
    pub fn set_default_cipher(mut self, algorithm: CipherAlgorithm) -> Self {
        self.default_cipher = algorithm;
        self
    }

    /// Returns the cipher used for fresh session keys.
    pub fn default_cipher(&self) -> CipherAlgorithm {
        self.default_cipher
    }

    /// Sets the S2K used to derive the key encryption key of SKESK
    /// packets.
    ///
    /// All packets serialized with this configuration share the
    /// salt.  If no S2K is set, every packet gets a fresh
    /// `S2K::default()`.
    pub fn set_s2k(mut self, s2k: S2K) -> Self {
        self.s2k = Some(s2k);
        self
    }

    /// Returns the S2K for SKESK packets, if one was set.
    pub fn s2k(&self) -> Option<&S2K> {
        self.s2k.as_ref()
    }
}
