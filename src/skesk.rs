//! Symmetric-Key Encrypted Session Key packets.
//!
//! An SKESK packet protects a session key with a key derived from a
//! password.  See [Section 5.3 of RFC 4880] for details.
//!
//! Version 4 SKESK packets carry no integrity protection.  Decrypting
//! one with the wrong password usually yields an unknown algorithm or
//! a key of the wrong size, which is rejected here, but occasionally
//! it yields a plausible looking key.  Such a key will fail to decrypt
//! the message it belongs to.
//!
//!   [Section 5.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.3

use sequoia_openpgp as openpgp;
use openpgp::{
    Packet,
    crypto::{Password, S2K},
    packet::{SKESK, skesk::SKESK4},
    parse::{Parse, PacketParser, PacketParserResult},
    serialize::SerializeInto,
};

use crate::{
    Config,
    Error,
    Result,
    SessionKey,
    cipher,
};

/// Decrypts the session key in the binary SKESK packets `packets`
/// using `password`.
///
/// All SKESK packets in `packets` are tried in order, other packets
/// are ignored.  Returns [`Error::PasswordIncorrect`] if there are no
/// SKESK packets, the password is empty, or no packet could be
/// decrypted.
pub fn decrypt(packets: &[u8], password: &str) -> Result<SessionKey> {
    let skesks = collect(packets);
    log::trace!("skesk::decrypt: found {} SKESK packets", skesks.len());

    if skesks.is_empty() || password.is_empty() {
        return Err(Error::PasswordIncorrect);
    }

    let password = Password::from(password);
    for (i, skesk) in skesks.iter().enumerate() {
        let (algo, sk) = match skesk.decrypt(&password) {
            Ok(r) => r,
            Err(_) => continue,
        };

        // A wrong password decrypts to garbage.
        if let Some(algo) = cipher::lookup(algo) {
            if let Ok(sk) = SessionKey::new(algo, sk) {
                log::debug!("skesk::decrypt: SKESK {} decrypted", i);
                return Ok(sk);
            }
        }
    }

    Err(Error::PasswordIncorrect)
}

/// Returns the SKESK packets in `packets`.
///
/// Stops at the first packet that cannot be parsed.
fn collect(packets: &[u8]) -> Vec<SKESK> {
    let mut skesks = Vec::new();

    let mut ppr = match PacketParser::from_bytes(packets) {
        Ok(ppr) => ppr,
        Err(_) => return skesks,
    };
    while let PacketParserResult::Some(pp) = ppr {
        let (packet, next) = match pp.next() {
            Ok(r) => r,
            Err(_) => break,
        };

        if let Packet::SKESK(skesk) = packet {
            skesks.push(skesk);
        }
        ppr = next;
    }

    skesks
}

/// Protects `session_key` with `password`.
///
/// The existing session key is wrapped, no new key is generated.
/// Returns the binary SKESK packet.
pub fn encrypt(session_key: &SessionKey, password: &str) -> Result<Vec<u8>> {
    encrypt_with(session_key, password, &Config::default())
}

/// Protects `session_key` with `password`, using the S2K from
/// `config`.
pub fn encrypt_with(session_key: &SessionKey, password: &str, config: &Config)
                    -> Result<Vec<u8>>
{
    if password.is_empty() {
        return Err(Error::EmptyPassword);
    }

    let s2k = config.s2k().cloned().unwrap_or_else(S2K::default);
    let algo = session_key.cipher_function();
    let skesk = SKESK4::with_password(algo, algo, s2k,
                                      session_key.as_openpgp(),
                                      &Password::from(password))
        .map_err(Error::serialization("cannot protect session key"))?;

    Packet::from(skesk).to_vec()
        .map_err(Error::serialization("cannot serialize key packet"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use openpgp::types::HashAlgorithm;

    use crate::CipherAlgorithm;

    /// A configuration with a fixed salt and few iterations.
    pub(crate) fn fast_config() -> Config {
        Config::default().set_s2k(S2K::Iterated {
            hash: HashAlgorithm::SHA256,
            salt: [0x37, 0x12, 0xa5, 0x09, 0x6c, 0xee, 0x31, 0x80],
            hash_bytes: 1024,
        })
    }

    #[test]
    fn roundtrip() {
        let config = fast_config();
        for a in CipherAlgorithm::ALL.iter() {
            let sk = SessionKey::generate(*a).unwrap();
            let packet = encrypt_with(&sk, "correct horse", &config).unwrap();
            assert_eq!(decrypt(&packet, "correct horse").unwrap(), sk);
        }
    }

    #[test]
    fn default_s2k() {
        let sk = SessionKey::generate(CipherAlgorithm::AES256).unwrap();
        let a = encrypt(&sk, "password").unwrap();
        let b = encrypt(&sk, "password").unwrap();
        // Fresh salts.
        assert_ne!(a, b);
        assert_eq!(decrypt(&a, "password").unwrap(), sk);
    }

    #[test]
    fn wrong_password() {
        let sk = SessionKey::generate(CipherAlgorithm::AES256).unwrap();
        let packet = encrypt_with(&sk, "password", &fast_config()).unwrap();
        assert!(matches!(decrypt(&packet, "hunter2"),
                         Err(Error::PasswordIncorrect)));
        assert!(matches!(decrypt(&packet, ""),
                         Err(Error::PasswordIncorrect)));
    }

    #[test]
    fn empty_password() {
        let sk = SessionKey::generate(CipherAlgorithm::AES256).unwrap();
        assert!(matches!(encrypt(&sk, ""), Err(Error::EmptyPassword)));
    }

    #[test]
    fn no_packets() {
        assert!(matches!(decrypt(b"", "password"),
                         Err(Error::PasswordIncorrect)));
        assert!(matches!(decrypt(b"\x00\x01garbage", "password"),
                         Err(Error::PasswordIncorrect)));
    }

    #[test]
    fn several_packets() {
        let config = fast_config();
        let sk = SessionKey::generate(CipherAlgorithm::AES128).unwrap();
        let mut packets = encrypt_with(&sk, "first", &config).unwrap();
        packets.extend(encrypt_with(&sk, "second", &config).unwrap());

        assert_eq!(decrypt(&packets, "first").unwrap(), sk);
        assert_eq!(decrypt(&packets, "second").unwrap(), sk);
    }
}
