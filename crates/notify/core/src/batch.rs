//! Batch splitting.

use std::num::NonZeroUsize;

/// Hard per-call token limit of the provider's multicast endpoint.
pub const MAX_MULTICAST_TOKENS: usize = 500;

/// Default number of tokens per batch.
pub const DEFAULT_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(MAX_MULTICAST_TOKENS) {
    Some(n) => n,
    None => unreachable!(),
};

/// Partition `tokens` into ordered slices of `batch_size`.
///
/// Every slice has exactly `batch_size` elements except possibly the last.
/// An empty input yields no batches.
pub fn split<T: Clone>(tokens: &[T], batch_size: NonZeroUsize) -> Vec<Vec<T>> {
    tokens
        .chunks(batch_size.get())
        .map(<[T]>::to_vec)
        .collect()
}

/// Number of batches `split` produces for `len` tokens.
pub fn batch_count(len: usize, batch_size: NonZeroUsize) -> usize {
    len.div_ceil(batch_size.get())
}

/// Clamp a requested batch size into `1..=MAX_MULTICAST_TOKENS`.
pub fn clamp_batch_size(requested: usize) -> NonZeroUsize {
    NonZeroUsize::new(requested.clamp(1, MAX_MULTICAST_TOKENS)).unwrap_or(DEFAULT_BATCH_SIZE)
}
