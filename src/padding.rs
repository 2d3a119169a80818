//! Block alignment for entry data.

/// Size of a header record and the alignment unit of entry data.
pub const BLOCK_SIZE: usize = 512;

/// Length of `len` bytes once padded: the smallest multiple of [`BLOCK_SIZE`] that is at least
/// `len + 1`. Data that already fills whole blocks still gets one extra zero block.
pub fn padded_len(len: usize) -> usize {
    (len / BLOCK_SIZE + 1) * BLOCK_SIZE
}

/// Copy `data` into a new buffer, null-padded to [`padded_len`].
pub fn pad_to_block(data: &[u8]) -> Vec<u8> {
    let mut padded = Vec::with_capacity(padded_len(data.len()));
    padded.extend_from_slice(data);
    padded.resize(padded_len(data.len()), 0);
    padded
}
