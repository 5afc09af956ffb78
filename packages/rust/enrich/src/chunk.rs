//! Fixed-size chunking for bounded enrichment requests.

/// Split `items` into contiguous chunks of `size`, preserving order.
///
/// Every chunk has exactly `size` elements except possibly the last.
///
/// # Panics
///
/// Panics if `size` is zero. A zero chunk size is a caller bug, not a
/// runtime input: the configured size is validated at config load.
pub fn chunks<T>(items: &[T], size: usize) -> Vec<&[T]> {
    assert!(size > 0, "chunk size must be positive");
    items.chunks(size).collect()
}
