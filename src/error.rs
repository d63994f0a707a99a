use thiserror::Error;

/// Errors reported by the rasterizer.
///
/// Drawing calls never fail hard: degenerate input (empty clip, zero-size
/// shapes, out-of-palette indices) is a silent no-op. Operations with a
/// meaningful failure mode return `Result<_, Error>`; soft draw-time failures
/// are recorded on the [`Canvas`](crate::Canvas) and retrievable with
/// [`Canvas::take_error`](crate::Canvas::take_error).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("unknown error")]
    Unknown,
    #[error("no framebuffer")]
    NoBuffer,
    #[error("out of memory")]
    NoMemory,
    #[error("invalid parameters")]
    BadParam,
    #[error("infinite parameters")]
    InfiniteParam,
    #[error("out of bounds")]
    OutOfBounds,
    #[error("matrix stack underflow")]
    StackUnderflow,
    #[error("out of data")]
    OutOfData,
    #[error("decoding error")]
    Decode,
    #[error("unsupported operation")]
    Unsupported,
    #[error("corrupted data")]
    Corrupt,
    #[error("encoding error")]
    Encode,
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
