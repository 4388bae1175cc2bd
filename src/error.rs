use sequoia_openpgp as openpgp;

/// Result specialization
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the session key codecs.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The packet framing could not be parsed, or the packet is not
    /// of the expected type
    #[error("Malformed packet")]
    MalformedPacket(#[source] anyhow::Error),
    /// The key ring is empty, or no key in it may be used for
    /// encryption
    #[error("No public key available for encryption")]
    NoUsableKey,
    /// None of the candidate keys decrypted the session key
    #[error("Cannot decrypt session key packet")]
    DecryptionFailed,
    /// No SKESK packet could be decrypted with the password
    #[error("Password incorrect")]
    PasswordIncorrect,
    /// An SKESK packet cannot be protected by an empty password
    #[error("Password can't be empty")]
    EmptyPassword,
    /// The session key does not match the algorithm's key size
    #[error("Invalid session key: expected {expected} bytes, got {got}")]
    InvalidSessionKey {
        /// Key size of the algorithm
        expected: usize,
        /// Length of the key
        got: usize,
    },
    /// The random number generator failed
    #[error("Random source failed")]
    RandomSourceError(#[from] rand::Error),
    /// The packet could not be serialized
    #[error("{context}")]
    SerializationError {
        /// What was being serialized
        context: String,
        /// The underlying error
        #[source]
        source: anyhow::Error,
    },
    /// The cipher name is not known
    #[error("Unsupported symmetric algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

impl Error {
    pub(crate) fn malformed<E>(e: E) -> Self
        where E: Into<anyhow::Error>
    {
        Error::MalformedPacket(e.into())
    }

    pub(crate) fn serialization<C>(context: C)
        -> impl FnOnce(anyhow::Error) -> Self
        where C: Into<String>
    {
        let context = context.into();
        move |source| Error::SerializationError { context, source }
    }

    /// Returns the packet that could not be parsed as expected, if
    /// the error carries one.
    pub fn unexpected_tag(&self) -> Option<openpgp::packet::Tag> {
        match self {
            Error::MalformedPacket(e) =>
                e.downcast_ref::<UnexpectedPacket>().map(|u| u.0),
            _ => None,
        }
    }
}

/// A packet of an unexpected kind was found.
#[derive(thiserror::Error, Debug)]
#[error("Unexpected packet: {0}")]
pub(crate) struct UnexpectedPacket(pub(crate) openpgp::packet::Tag);

/// The input ended before a packet was found.
#[derive(thiserror::Error, Debug)]
#[error("Unexpected end of input")]
pub(crate) struct UnexpectedEof;
