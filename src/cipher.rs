//! The cipher registry.
//!
//! Maps between the named symmetric algorithms this crate supports
//! and the cipher function identifiers used on the wire, see
//! [Section 9.2 of RFC 4880].
//!
//!   [Section 9.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-9.2

use std::fmt;
use std::str::FromStr;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use sequoia_openpgp as openpgp;
use openpgp::types::SymmetricAlgorithm;

use crate::{Error, Result};

/// A symmetric algorithm that may protect a session key.
///
/// Every variant corresponds to exactly one OpenPGP cipher function,
/// and has a fixed key size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CipherAlgorithm {
    /// TripleDES (DES-EDE, 168 bit key derived from 192).
    TripleDES,
    /// CAST5 (128 bit key, as per RFC2144).
    CAST5,
    /// Blowfish (128 bit key, 16 rounds).
    Blowfish,
    /// AES with 128-bit key.
    AES128,
    /// AES with 192-bit key.
    AES192,
    /// AES with 256-bit key.
    AES256,
}

impl CipherAlgorithm {
    /// All supported algorithms, weakest first.
    pub const ALL: [CipherAlgorithm; 6] = [
        CipherAlgorithm::TripleDES,
        CipherAlgorithm::CAST5,
        CipherAlgorithm::Blowfish,
        CipherAlgorithm::AES128,
        CipherAlgorithm::AES192,
        CipherAlgorithm::AES256,
    ];

    /// Returns the cipher function identifying this algorithm on the
    /// wire.
    pub fn wire_id(self) -> SymmetricAlgorithm {
        wire_id_for(self)
    }

    /// Returns the size of a key for this algorithm in bytes.
    pub fn key_size(self) -> usize {
        key_size(self)
    }

    /// Returns the canonical name of this algorithm.
    pub fn name(self) -> &'static str {
        match self {
            CipherAlgorithm::TripleDES => "3des",
            CipherAlgorithm::CAST5 => "cast5",
            CipherAlgorithm::Blowfish => "blowfish",
            CipherAlgorithm::AES128 => "aes128",
            CipherAlgorithm::AES192 => "aes192",
            CipherAlgorithm::AES256 => "aes256",
        }
    }
}

impl Default for CipherAlgorithm {
    fn default() -> Self {
        CipherAlgorithm::AES256
    }
}

impl fmt::Display for CipherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CipherAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "3des" | "tripledes" => Ok(CipherAlgorithm::TripleDES),
            "cast5" => Ok(CipherAlgorithm::CAST5),
            "blowfish" => Ok(CipherAlgorithm::Blowfish),
            "aes128" => Ok(CipherAlgorithm::AES128),
            "aes192" => Ok(CipherAlgorithm::AES192),
            "aes256" => Ok(CipherAlgorithm::AES256),
            _ => Err(Error::UnsupportedAlgorithm(s.into())),
        }
    }
}

impl From<CipherAlgorithm> for SymmetricAlgorithm {
    fn from(a: CipherAlgorithm) -> Self {
        wire_id_for(a)
    }
}

impl From<SymmetricAlgorithm> for CipherAlgorithm {
    fn from(s: SymmetricAlgorithm) -> Self {
        algorithm_for(s)
    }
}

#[cfg(test)]
impl Arbitrary for CipherAlgorithm {
    fn arbitrary(g: &mut Gen) -> Self {
        *g.choose(&CipherAlgorithm::ALL).unwrap()
    }
}

/// Returns the cipher function for `algorithm`.
pub fn wire_id_for(algorithm: CipherAlgorithm) -> SymmetricAlgorithm {
    match algorithm {
        CipherAlgorithm::TripleDES => SymmetricAlgorithm::TripleDES,
        CipherAlgorithm::CAST5 => SymmetricAlgorithm::CAST5,
        CipherAlgorithm::Blowfish => SymmetricAlgorithm::Blowfish,
        CipherAlgorithm::AES128 => SymmetricAlgorithm::AES128,
        CipherAlgorithm::AES192 => SymmetricAlgorithm::AES192,
        CipherAlgorithm::AES256 => SymmetricAlgorithm::AES256,
    }
}

/// Returns the algorithm for the cipher function `wire_id`.
///
/// Cipher functions this crate does not support resolve to
/// [`CipherAlgorithm::AES256`] instead of failing.  Use
/// [`lookup`] to detect them.
pub fn algorithm_for(wire_id: SymmetricAlgorithm) -> CipherAlgorithm {
    lookup(wire_id).unwrap_or_default()
}

/// Returns the algorithm for the cipher function `wire_id`, if it is
/// supported.
pub fn lookup(wire_id: SymmetricAlgorithm) -> Option<CipherAlgorithm> {
    CipherAlgorithm::ALL.iter().copied().find(|a| wire_id_for(*a) == wire_id)
}

/// Returns the key size of `algorithm` in bytes.
pub fn key_size(algorithm: CipherAlgorithm) -> usize {
    match algorithm {
        CipherAlgorithm::TripleDES => 24,
        CipherAlgorithm::CAST5 => 16,
        CipherAlgorithm::Blowfish => 16,
        CipherAlgorithm::AES128 => 16,
        CipherAlgorithm::AES192 => 24,
        CipherAlgorithm::AES256 => 32,
    }
}
