//! Public-Key Encrypted Session Key packets.
//!
//! A PKESK packet holds a session key encrypted to a recipient's
//! public key.  See [Section 5.1 of RFC 4880] for details.
//!
//!   [Section 5.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.1

use sequoia_openpgp as openpgp;
use openpgp::{
    Packet,
    crypto::Password,
    packet::{PKESK, pkesk::PKESK3},
    parse::{Parse, PacketParser, PacketParserResult},
    serialize::SerializeInto,
};

use crate::{
    Error,
    Result,
    SessionKey,
    cipher,
    error::{UnexpectedEof, UnexpectedPacket},
    keyring::{self, DecryptionKey},
    selection::{self, EncryptionKeySelection},
};

/// Decrypts the session key in the binary PKESK packet `packet`.
///
/// The candidates are tried in order, and the first key that decrypts
/// the packet wins.  Candidates with encrypted secret key material are
/// unlocked using `passphrase` first; candidates that cannot be
/// unlocked are skipped.  The candidates themselves are not modified.
///
/// Only the first packet in `packet` is considered.
pub fn decrypt(packet: &[u8], candidates: &[DecryptionKey], passphrase: &str)
               -> Result<SessionKey>
{
    let pkesk = parse(packet)?;
    let passphrase = Password::from(passphrase);

    for (i, candidate) in candidates.iter().enumerate() {
        let mut key = match candidate.clone().unlock(&passphrase) {
            Ok(key) => key,
            Err(_) => continue,
        };

        if let Some((algo, sk)) = pkesk.decrypt(key.keypair(), None) {
            log::debug!("pkesk::decrypt: candidate {} ({}) decrypted the \
                         session key", i, key.fingerprint());
            // Rejects empty and truncated keys.
            return SessionKey::new(cipher::algorithm_for(algo), sk);
        }
    }

    Err(Error::DecryptionFailed)
}

/// Parses exactly one leading PKESK packet.
fn parse(packet: &[u8]) -> Result<PKESK> {
    match PacketParser::from_bytes(packet).map_err(Error::malformed)? {
        PacketParserResult::Some(pp) => {
            let (packet, _) = pp.next().map_err(Error::malformed)?;
            match packet {
                Packet::PKESK(pkesk) => Ok(pkesk),
                p => Err(Error::malformed(UnexpectedPacket(p.tag()))),
            }
        },
        PacketParserResult::EOF(_) => Err(Error::malformed(UnexpectedEof)),
    }
}

/// Encrypts `session_key` to the binary certificate `recipient`.
///
/// The key is chosen by [`selection::select_in_order`] from the first
/// certificate in `recipient`, with the subkeys in the order they
/// appear in `recipient`.  Returns the binary PKESK packet.
pub fn encrypt(session_key: &SessionKey, recipient: &[u8]) -> Result<Vec<u8>> {
    let certs = keyring::parse_certificates(recipient)?;
    let cert = certs.first().ok_or(Error::NoUsableKey)?;

    let order = keyring::subkey_order(recipient);
    let order = order.get(&cert.fingerprint())
        .map(Vec::as_slice).unwrap_or(&[]);
    let selection = selection::select_in_order(cert, order,
                                               session_key.algorithm())
        .ok_or(Error::NoUsableKey)?;
    encrypt_to(session_key, &selection)
}

/// Encrypts `session_key` to the ASCII armored certificate
/// `recipient`.
pub fn encrypt_armored(session_key: &SessionKey, recipient: &str)
                       -> Result<Vec<u8>>
{
    let recipient = keyring::unarmor(recipient)?;
    encrypt(session_key, &recipient)
}

/// Encrypts `session_key` to the selected key.
pub fn encrypt_to(session_key: &SessionKey, selection: &EncryptionKeySelection)
                  -> Result<Vec<u8>>
{
    let pkesk = PKESK3::for_recipient(selection.cipher_function(),
                                      session_key.as_openpgp(),
                                      selection.key())
        .map_err(Error::serialization("cannot set key"))?;

    Packet::PKESK(pkesk.into()).to_vec()
        .map_err(Error::serialization("cannot serialize key packet"))
}
