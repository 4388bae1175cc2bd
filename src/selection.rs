//! Selects the key a session key is encrypted to.
//!
//! This is a simple heuristic, not a full evaluation of the
//! certificate.  Signatures are looked at without regard to
//! expiration, revocation, or the algorithms used:
//!
//!   1. The first subkey, in the order the subkeys appear in the
//!      serialized key ring, whose binding signature carries no key
//!      flags at all, or marks it for storage or transport encryption.
//!      [`Cert`] canonicalizes its subkeys, so the order has to be
//!      recovered from the packets, see
//!      [`crate::keyring::subkey_order`].
//!
//!   2. Otherwise, the primary key, if the binding signature of the
//!      first User ID carries key flags marking it for storage or
//!      transport encryption.
//!
//! Only one certificate is considered.

use sequoia_openpgp as openpgp;
use openpgp::{
    Cert,
    Fingerprint,
    cert::amalgamation::ComponentAmalgamation,
    packet::{Key, Signature, key},
    policy::NullPolicy,
    types::SymmetricAlgorithm,
};

use crate::CipherAlgorithm;

/// The key chosen to encrypt a session key to.
#[derive(Clone, Debug)]
pub struct EncryptionKeySelection {
    key: Key<key::PublicParts, key::UnspecifiedRole>,
    primary: bool,
    algorithm: CipherAlgorithm,
}

impl EncryptionKeySelection {
    /// Returns the selected key.
    pub fn key(&self) -> &Key<key::PublicParts, key::UnspecifiedRole> {
        &self.key
    }

    /// Returns whether the selected key is the primary key.
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// Returns the cipher function of the session key.
    pub fn cipher_function(&self) -> SymmetricAlgorithm {
        self.algorithm.wire_id()
    }
}

/// Selects the key of `cert` to encrypt a session key for
/// `algorithm` to.
///
/// Subkeys are considered in the order [`Cert`] keeps them.  Use
/// [`select_in_order`] if the serialized order is known.
///
/// Returns `None` if no key qualifies.
pub fn select(cert: &Cert, algorithm: CipherAlgorithm)
              -> Option<EncryptionKeySelection>
{
    select_in_order(cert, &[], algorithm)
}

/// Selects the key of `cert` to encrypt a session key for
/// `algorithm` to, considering the subkeys in the order given by
/// `order`.
///
/// `order` lists subkey fingerprints as they appear in the serialized
/// certificate.  Subkeys missing from `order` come last.
pub fn select_in_order(cert: &Cert, order: &[Fingerprint],
                       algorithm: CipherAlgorithm)
                       -> Option<EncryptionKeySelection>
{
    if let Some(key) = select_subkey(cert, order) {
        log::trace!("select: using subkey {}", key.fingerprint());
        return Some(EncryptionKeySelection {
            key,
            primary: false,
            algorithm,
        });
    }

    if primary_qualifies(cert) {
        log::trace!("select: using primary key {}", cert.fingerprint());
        return Some(EncryptionKeySelection {
            key: cert.primary_key().key().clone().role_into_unspecified(),
            primary: true,
            algorithm,
        });
    }

    log::trace!("select: no key of {} qualifies", cert.fingerprint());
    None
}

/// Selects the key from the first certificate of `certs`.
pub fn select_first(certs: &[Cert], algorithm: CipherAlgorithm)
                    -> Option<EncryptionKeySelection>
{
    certs.first().and_then(|cert| select(cert, algorithm))
}

fn select_subkey(cert: &Cert, order: &[Fingerprint])
                 -> Option<Key<key::PublicParts, key::UnspecifiedRole>>
{
    cert.keys().subkeys()
        .filter(|ka| subkey_qualifies(binding_signature(&**ka)))
        // The first of equally ranked keys wins.
        .min_by_key(|ka| rank(order, &ka.key().fingerprint()))
        .map(|ka| ka.key().clone().role_into_unspecified())
}

/// Returns the position of `fingerprint` in `order`.
pub(crate) fn rank(order: &[Fingerprint], fingerprint: &Fingerprint) -> usize {
    order.iter().position(|fp| fp == fingerprint).unwrap_or(order.len())
}

/// Returns the binding signature of the component.
pub(crate) fn binding_signature<'a, C>(ca: &'a ComponentAmalgamation<'a, C>)
                                       -> Option<&'a Signature>
{
    let null = NullPolicy::new();
    ca.binding_signature(&null, None).ok()
}

/// Returns whether a subkey with the binding signature `sig` may be
/// used for encryption.
pub(crate) fn subkey_qualifies(sig: Option<&Signature>) -> bool {
    match sig.map(|s| s.key_flags()) {
        Some(Some(flags)) =>
            flags.for_storage_encryption() || flags.for_transport_encryption(),
        // No key flags subpacket.
        Some(None) => true,
        None => false,
    }
}

/// Returns whether the primary key of `cert` may be used for
/// encryption, according to the first User ID.
pub(crate) fn primary_qualifies(cert: &Cert) -> bool {
    cert.userids().next()
        .map(|ua| binding_signature(&ua)
             .and_then(|sig| sig.key_flags())
             .map(|flags| flags.for_storage_encryption()
                  || flags.for_transport_encryption())
             .unwrap_or(false))
        .unwrap_or(false)
}
