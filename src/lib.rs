//! OpenPGP session key packets.
//!
//! This crate converts between a symmetric session key and the two
//! packets that deliver it to the recipients of an OpenPGP message:
//!
//!   - [`pkesk`]: the [Public-Key Encrypted Session Key] packet, which
//!     encrypts the session key to a recipient's public key, and
//!   - [`skesk`]: the [Symmetric-Key Encrypted Session Key] packet,
//!     which protects the session key with a password.
//!
//! Packet framing, the public key algorithms, and the key derivation
//! are provided by [`sequoia-openpgp`].
//!
//!   [Public-Key Encrypted Session Key]: https://tools.ietf.org/html/rfc4880#section-5.1
//!   [Symmetric-Key Encrypted Session Key]: https://tools.ietf.org/html/rfc4880#section-5.3
//!   [`sequoia-openpgp`]: https://docs.rs/sequoia-openpgp
//!
//! # Examples
//!
//! ```
//! use sequoia_session_key::{CipherAlgorithm, SessionKey, skesk};
//! # fn main() -> sequoia_session_key::Result<()> {
//!
//! let sk = SessionKey::generate(CipherAlgorithm::AES256)?;
//! let packet = skesk::encrypt(&sk, "streng geheim")?;
//! assert_eq!(skesk::decrypt(&packet, "streng geheim")?, sk);
//! # Ok(()) }
//! ```

#![warn(missing_docs)]

pub mod cipher;
pub mod config;
mod error;
pub mod keyring;
pub mod pkesk;
pub mod random;
mod session_key;
pub mod selection;
pub mod skesk;

pub use cipher::CipherAlgorithm;
pub use config::Config;
pub use error::{Error, Result};
pub use session_key::SessionKey;
