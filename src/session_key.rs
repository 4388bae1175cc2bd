use std::fmt;

use sequoia_openpgp as openpgp;
use openpgp::crypto;
use openpgp::types::SymmetricAlgorithm;

use crate::{
    CipherAlgorithm,
    Config,
    Error,
    Result,
    random,
};

/// A symmetric session key and the algorithm it is used with.
///
/// The length of the key always matches the key size of the
/// algorithm.  The key material is kept in memory that is cleared
/// when the `SessionKey` is dropped.
pub struct SessionKey {
    key: crypto::SessionKey,
    algorithm: CipherAlgorithm,
}

impl SessionKey {
    /// Creates a session key from existing key material.
    ///
    /// Fails with [`Error::InvalidSessionKey`] if the length of `key`
    /// does not match `algorithm`.
    pub fn new<K>(algorithm: CipherAlgorithm, key: K) -> Result<Self>
        where K: Into<crypto::SessionKey>
    {
        let key = key.into();
        let expected = algorithm.key_size();
        if key.len() != expected {
            return Err(Error::InvalidSessionKey {
                expected,
                got: key.len(),
            });
        }

        Ok(SessionKey { key, algorithm })
    }

    /// Generates a fresh random session key for `algorithm`.
    pub fn generate(algorithm: CipherAlgorithm) -> Result<Self> {
        let key: crypto::SessionKey = random::generate_for(algorithm)?.into();
        Self::new(algorithm, key)
    }

    /// Generates a fresh random session key for the configured default
    /// cipher.
    pub fn generate_default_with(config: &Config) -> Result<Self> {
        Self::generate(config.default_cipher())
    }

    /// Returns the key material.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub(crate) fn as_openpgp(&self) -> &crypto::SessionKey {
        &self.key
    }

    /// Returns the algorithm.
    pub fn algorithm(&self) -> CipherAlgorithm {
        self.algorithm
    }

    /// Returns the cipher function to use when serializing this key.
    pub fn cipher_function(&self) -> SymmetricAlgorithm {
        self.algorithm.wire_id()
    }
}

impl Clone for SessionKey {
    fn clone(&self) -> Self {
        SessionKey {
            key: self.key().to_vec().into(),
            algorithm: self.algorithm,
        }
    }
}

impl PartialEq for SessionKey {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm && self.key() == other.key()
    }
}

impl Eq for SessionKey {}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SessionKey")
            .field("algorithm", &self.algorithm)
            .field("key", &format_args!("<{} bytes>", self.key.len()))
            .finish()
    }
}
