//! Zero-sum checksum for option ROM images.
//!
//! The last byte of the image is reserved for the checksum. Its previous value is never part of
//! the sum, so patching is idempotent.

use crate::error::{BootRomError, Result};

/// Outcome of [`patch_checksum`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumPatch {
    /// Value of the checksum slot before patching.
    pub previous: u8,
    /// Value written into the checksum slot.
    pub checksum: u8,
}

impl ChecksumPatch {
    pub fn changed(&self) -> bool {
        self.previous != self.checksum
    }
}

/// Wrapping (mod 256) sum of `bytes`.
pub fn byte_sum(bytes: &[u8]) -> u8 {
    bytes.iter().copied().fold(0u8, u8::wrapping_add)
}

/// Value the last byte must hold for the whole image to sum to zero.
pub fn checksum_correction(bytes: &[u8]) -> Result<u8> {
    let (_slot, payload) = bytes.split_last().ok_or(BootRomError::EmptyImage)?;
    Ok(byte_sum(payload).wrapping_neg())
}

/// Overwrite the last byte of `bytes` with the checksum correction.
pub fn patch_checksum(bytes: &mut [u8]) -> Result<ChecksumPatch> {
    let checksum = checksum_correction(bytes)?;
    let slot = bytes.last_mut().ok_or(BootRomError::EmptyImage)?;
    let previous = std::mem::replace(slot, checksum);
    Ok(ChecksumPatch { previous, checksum })
}

pub fn is_checksum_valid(bytes: &[u8]) -> bool {
    !bytes.is_empty() && byte_sum(bytes) == 0
}
