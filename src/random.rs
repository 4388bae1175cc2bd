//! Random tokens for session keys.

use rand::RngCore;
use rand::rngs::OsRng;

use crate::{
    CipherAlgorithm,
    Config,
    Result,
};

/// Returns `size` bytes from the operating system's random number
/// generator.
///
/// If the generator fails, no bytes are returned.
pub fn generate(size: usize) -> Result<Vec<u8>> {
    let mut token = vec![0u8; size];
    OsRng.try_fill_bytes(&mut token)?;
    Ok(token)
}

/// Returns a random token the size of a key for `algorithm`.
pub fn generate_for(algorithm: CipherAlgorithm) -> Result<Vec<u8>> {
    generate(algorithm.key_size())
}

/// Returns a random token the size of a key for the default cipher.
pub fn generate_default() -> Result<Vec<u8>> {
    generate_for(CipherAlgorithm::default())
}

/// Returns a random token the size of a key for the cipher configured
/// in `config`.
pub fn generate_for_config(config: &Config) -> Result<Vec<u8>> {
    generate_for(config.default_cipher())
}
