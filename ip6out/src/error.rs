use thiserror::Error;

/// The result type used across this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the send path.
///
/// None of them are transient: a packet that fails here should be dropped by
/// the caller. Failures coming from the hook chain or the transmission
/// collaborator are carried through untouched.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// The requested byte range is not present in the packet buffer.
    #[error("buffer range unavailable: {len} bytes at offset {offset}")]
    BufferUnavailable {
        /// Start of the requested range, relative to the buffer data.
        offset: usize,
        /// Length of the requested range.
        len: usize,
    },

    /// An extension header overruns the buffer or the maximum payload size.
    #[error("malformed extension header chain at offset {offset}")]
    MalformedChain {
        /// Offset of the offending header, relative to the network header.
        offset: usize,
    },

    /// The chain ended at the buffer tail while still naming an interior header.
    #[error("no fragment header insertion point before offset {offset}")]
    NoInsertionPoint {
        /// Offset where the walk ran out of bytes.
        offset: usize,
    },

    /// The packet carries no resolved route.
    #[error("packet has no route attached")]
    NoRoute,

    /// A hook dropped the packet.
    #[error("packet dropped by hook")]
    Dropped,

    /// The hook chain failed with the given error number.
    #[error("hook chain error (errno {0})")]
    Hook(i32),

    /// Transmission failed with the given error number.
    #[error("transmission error (errno {0})")]
    Xmit(i32),
}

impl Error {
    /// Whether the error comes from an unparseable extension header chain.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::MalformedChain { .. } | Error::NoInsertionPoint { .. }
        )
    }
}
