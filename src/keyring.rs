//! Adapters for keys supplied by the caller's key ring.
//!
//! The codecs do not store or look up keys.  PKESK decryption iterates
//! over a caller supplied list of [`DecryptionKey`]s, PKESK
//! serialization consumes certificates parsed by
//! [`parse_certificates`].

use std::collections::HashMap;
use std::fmt;
use std::io::Read;

use sequoia_openpgp as openpgp;
use openpgp::{
    Cert,
    Fingerprint,
    KeyID,
    Packet,
    armor,
    cert::CertParser,
    crypto::{KeyPair, Password},
    packet::{Key, key},
    parse::{Parse, PacketParser, PacketParserResult},
};

use crate::{
    Error,
    Result,
    selection,
};

/// A secret key that may be used to decrypt PKESK packets.
///
/// The secret key material may be encrypted.  Use
/// [`DecryptionKey::unlock`] to obtain an [`UnlockedKey`].
#[derive(Clone)]
pub struct DecryptionKey {
    key: Key<key::SecretParts, key::UnspecifiedRole>,
}

impl fmt::Debug for DecryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DecryptionKey")
            .field("fingerprint", &self.key.fingerprint())
            .field("protected", &self.is_passphrase_protected())
            .finish()
    }
}

impl From<Key<key::SecretParts, key::UnspecifiedRole>> for DecryptionKey {
    fn from(key: Key<key::SecretParts, key::UnspecifiedRole>) -> Self {
        DecryptionKey { key }
    }
}

impl DecryptionKey {
    /// Returns the decryption capable secret keys of `cert`.
    ///
    /// Subkeys are returned in the order [`Cert`] keeps them, which is
    /// not necessarily the serialized order.  See
    /// [`DecryptionKey::from_cert_in_order`] and
    /// [`DecryptionKey::from_keyring`].
    pub fn from_cert(cert: &Cert) -> Vec<DecryptionKey> {
        Self::from_cert_in_order(cert, &[])
    }

    /// Returns the decryption capable secret keys of `cert`, with the
    /// subkeys ordered by `order`.
    ///
    /// Subkeys are returned if their binding signature either carries
    /// no key flags or marks them for encryption.  They are ordered by
    /// the position of their fingerprint in `order`; subkeys missing
    /// from `order` follow in the order [`Cert`] keeps them.  The
    /// primary key is returned last, and only if the self signature of
    /// the first User ID marks it for encryption.  Keys without secret
    /// key material are skipped.
    pub fn from_cert_in_order(cert: &Cert, order: &[Fingerprint])
                              -> Vec<DecryptionKey>
    {
        let mut subkeys: Vec<_> = cert.keys().subkeys().secret()
            .filter(|ka| selection::subkey_qualifies(
                selection::binding_signature(&**ka)))
            .map(|ka| ka.key().clone())
            .collect();
        // Stable, ties keep their relative order.
        subkeys.sort_by_key(|k| selection::rank(order, &k.fingerprint()));

        let mut keys: Vec<DecryptionKey> = subkeys.into_iter()
            .map(|k| k.role_into_unspecified().into())
            .collect();

        if selection::primary_qualifies(cert) {
            if let Ok(primary) =
                cert.primary_key().key().clone().parts_into_secret()
            {
                keys.push(primary.role_into_unspecified().into());
            }
        }

        keys
    }

    /// Returns the decryption capable secret keys of the key ring
    /// `bytes`.
    ///
    /// Certificates are visited in order, and the subkeys of each
    /// certificate are ordered as they appear in `bytes`.
    pub fn from_keyring(bytes: &[u8]) -> Result<Vec<DecryptionKey>> {
        let order = subkey_order(bytes);
        Ok(parse_certificates(bytes)?.iter()
           .flat_map(|cert| {
               let order = order.get(&cert.fingerprint())
                   .map(Vec::as_slice).unwrap_or(&[]);
               Self::from_cert_in_order(cert, order)
           })
           .collect())
    }

    /// Returns the key's fingerprint.
    pub fn fingerprint(&self) -> Fingerprint {
        self.key.fingerprint()
    }

    /// Returns the key's Key ID.
    pub fn keyid(&self) -> KeyID {
        self.key.keyid()
    }

    /// Returns whether the secret key material is encrypted.
    pub fn is_passphrase_protected(&self) -> bool {
        self.key.secret().is_encrypted()
    }

    /// Unlocks the key.
    ///
    /// If the secret key material is encrypted, it is decrypted using
    /// `passphrase`.  Otherwise, `passphrase` is ignored.
    pub fn unlock(self, passphrase: &Password) -> Result<UnlockedKey> {
        let key = if self.is_passphrase_protected() {
            self.key.decrypt_secret(passphrase)
                .map_err(|_| Error::DecryptionFailed)?
        } else {
            self.key
        };

        let keypair = key.into_keypair()
            .map_err(|_| Error::DecryptionFailed)?;
        Ok(UnlockedKey { keypair })
    }
}

/// A secret key with usable secret key material.
pub struct UnlockedKey {
    keypair: KeyPair,
}

impl UnlockedKey {
    /// Returns the key's fingerprint.
    pub fn fingerprint(&self) -> Fingerprint {
        self.keypair.public().fingerprint()
    }

    pub(crate) fn keypair(&mut self) -> &mut KeyPair {
        &mut self.keypair
    }
}

/// Parses a key ring.
///
/// `bytes` may be binary or ASCII armored.  Empty input yields an
/// empty key ring.
pub fn parse_certificates(bytes: &[u8]) -> Result<Vec<Cert>> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }

    CertParser::from_bytes(bytes)
        .map_err(Error::malformed)?
        .collect::<openpgp::Result<Vec<Cert>>>()
        .map_err(Error::malformed)
}

/// Returns the order in which subkeys appear in the key ring `bytes`.
///
/// The result maps the fingerprint of each primary key to the
/// fingerprints of the subkeys following it.  A subkey that appears
/// more than once is listed at its first position.  Scanning stops at
/// the first packet that cannot be parsed.
pub fn subkey_order(bytes: &[u8]) -> HashMap<Fingerprint, Vec<Fingerprint>> {
    let mut order: HashMap<Fingerprint, Vec<Fingerprint>> = HashMap::new();
    let mut primary: Option<Fingerprint> = None;

    let mut ppr = match PacketParser::from_bytes(bytes) {
        Ok(ppr) => ppr,
        Err(_) => return order,
    };
    while let PacketParserResult::Some(pp) = ppr {
        let subkey = match &pp.packet {
            Packet::PublicKey(k) => {
                primary = Some(k.fingerprint());
                None
            },
            Packet::SecretKey(k) => {
                primary = Some(k.fingerprint());
                None
            },
            Packet::PublicSubkey(k) => Some(k.fingerprint()),
            Packet::SecretSubkey(k) => Some(k.fingerprint()),
            _ => None,
        };

        if let (Some(primary), Some(subkey)) = (primary.as_ref(), subkey) {
            let subkeys = order.entry(primary.clone()).or_default();
            if ! subkeys.contains(&subkey) {
                subkeys.push(subkey);
            }
        }

        ppr = match pp.next() {
            Ok((_, next)) => next,
            Err(_) => break,
        };
    }

    order
}

/// Removes the ASCII armor from `armored`.
pub fn unarmor(armored: &str) -> Result<Vec<u8>> {
    let mut reader = armor::Reader::from_bytes(
        armored.as_bytes(), armor::ReaderMode::Tolerant(None));
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(Error::malformed)?;
    Ok(bytes)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use openpgp::PacketPile;
    use openpgp::cert::CertBuilder;
    use openpgp::serialize::SerializeInto;

    /// Reserializes the key ring `bytes` with the subkeys and their
    /// signatures in reverse order.  Also returns the subkey
    /// fingerprints in the new order.
    pub(crate) fn reverse_subkeys(bytes: &[u8]) -> (Vec<u8>, Vec<Fingerprint>) {
        let mut head = Vec::new();
        let mut subkeys: Vec<Vec<Packet>> = Vec::new();
        for p in PacketPile::from_bytes(bytes).unwrap().into_children() {
            match p {
                Packet::PublicSubkey(_) | Packet::SecretSubkey(_) =>
                    subkeys.push(vec![p]),
                p => match subkeys.last_mut() {
                    Some(subkey) => subkey.push(p),
                    None => head.push(p),
                },
            }
        }
        subkeys.reverse();

        let mut reversed = Vec::new();
        let mut order = Vec::new();
        for p in head.iter().chain(subkeys.iter().flatten()) {
            match p {
                Packet::PublicSubkey(k) => order.push(k.fingerprint()),
                Packet::SecretSubkey(k) => order.push(k.fingerprint()),
                _ => (),
            }
            reversed.extend(p.to_vec().unwrap());
        }
        (reversed, order)
    }

    pub(crate) fn two_encryption_subkeys() -> Cert {
        let (cert, _) = CertBuilder::new()
            .add_userid("alice@example.org")
            .add_transport_encryption_subkey()
            .add_transport_encryption_subkey()
            .generate().unwrap();
        cert
    }

    #[test]
    fn candidates_from_cert() {
        let (cert, _) = CertBuilder::new()
            .add_userid("alice@example.org")
            .add_signing_subkey()
            .add_transport_encryption_subkey()
            .generate().unwrap();

        let keys = DecryptionKey::from_cert(&cert);
        assert_eq!(keys.len(), 1);
        let null = openpgp::policy::NullPolicy::new();
        let subkey = cert.keys().subkeys()
            .find(|ka| ka.binding_signature(&null, None).ok()
                  .and_then(|s| s.key_flags())
                  .map(|f| f.for_transport_encryption())
                  .unwrap_or(false))
            .unwrap();
        assert_eq!(keys[0].fingerprint(), subkey.key().fingerprint());
        assert!(! keys[0].is_passphrase_protected());
    }

    #[test]
    fn public_cert_has_no_candidates() {
        let (cert, _) = CertBuilder::new()
            .add_userid("alice@example.org")
            .add_transport_encryption_subkey()
            .generate().unwrap();
        let cert = Cert::from_bytes(&cert.to_vec().unwrap()).unwrap();
        assert!(DecryptionKey::from_cert(&cert).is_empty());
    }

    #[test]
    fn unlock() {
        let (cert, _) = CertBuilder::new()
            .add_userid("alice@example.org")
            .add_transport_encryption_subkey()
            .set_password(Some("streng geheim".into()))
            .generate().unwrap();

        let key = DecryptionKey::from_cert(&cert).pop().unwrap();
        assert!(key.is_passphrase_protected());
        assert!(key.clone().unlock(&"wrong".into()).is_err());
        let unlocked = key.clone().unlock(&"streng geheim".into()).unwrap();
        assert_eq!(unlocked.fingerprint(), key.fingerprint());
    }

    #[test]
    fn parse_armored_and_binary() {
        let (cert, _) = CertBuilder::new()
            .add_userid("alice@example.org")
            .generate().unwrap();

        let binary = cert.to_vec().unwrap();
        let armored = String::from_utf8(cert.armored().to_vec().unwrap())
            .unwrap();

        assert_eq!(parse_certificates(&binary).unwrap().len(), 1);
        assert_eq!(parse_certificates(armored.as_bytes()).unwrap().len(), 1);
        assert_eq!(unarmor(&armored).unwrap(), binary);
        assert!(parse_certificates(b"").unwrap().is_empty());
    }

    #[test]
    fn subkey_order_follows_packets() {
        let cert = two_encryption_subkeys();
        let canonical = cert.as_tsk().to_vec().unwrap();
        let stored: Vec<Fingerprint> = cert.keys().subkeys()
            .map(|ka| ka.key().fingerprint())
            .collect();
        assert_eq!(subkey_order(&canonical)[&cert.fingerprint()], stored);

        let (reversed, order) = reverse_subkeys(&canonical);
        assert_eq!(order.len(), 2);
        assert_ne!(order, stored);
        assert_eq!(subkey_order(&reversed)[&cert.fingerprint()], order);
        assert!(subkey_order(b"").is_empty());
    }

    #[test]
    fn candidates_in_keyring_order() {
        let cert = two_encryption_subkeys();
        let canonical = cert.as_tsk().to_vec().unwrap();
        let (reversed, order) = reverse_subkeys(&canonical);

        // The certificate does not preserve the serialized order.
        let parsed = parse_certificates(&reversed).unwrap().remove(0);
        assert_eq!(parsed.fingerprint(), cert.fingerprint());
        assert_eq!(parsed.keys().subkeys().map(|ka| ka.key().fingerprint())
                   .collect::<Vec<_>>(),
                   cert.keys().subkeys().map(|ka| ka.key().fingerprint())
                   .collect::<Vec<_>>());

        let fingerprints = |keys: Vec<DecryptionKey>| -> Vec<Fingerprint> {
            keys.iter().map(|k| k.fingerprint()).collect()
        };
        assert_eq!(fingerprints(DecryptionKey::from_keyring(&reversed).unwrap()),
                   order);
        assert_eq!(fingerprints(DecryptionKey::from_keyring(&canonical).unwrap()),
                   fingerprints(DecryptionKey::from_cert(&cert)));
        assert_eq!(fingerprints(DecryptionKey::from_cert_in_order(&cert, &order)),
                   order);
    }
}
