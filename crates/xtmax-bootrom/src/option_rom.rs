//! PC option ROM header inspection.
//!
//! An option ROM starts with the `55 AA` signature followed by its length in 512-byte blocks.
//! The BIOS sums exactly that many bytes when validating the ROM.

use crate::checksum::{byte_sum, is_checksum_valid};

pub const OPTION_ROM_SIGNATURE: [u8; 2] = [0x55, 0xAA];
pub const OPTION_ROM_BLOCK_SIZE: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionRomHeader {
    /// Raw size byte (offset 2).
    pub blocks: u8,
}

impl OptionRomHeader {
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0x55, 0xAA, blocks, ..] => Some(Self { blocks: *blocks }),
            _ => None,
        }
    }

    pub fn declared_len(&self) -> usize {
        usize::from(self.blocks) * OPTION_ROM_BLOCK_SIZE
    }
}

/// Summary of a ROM image, as printed by `bootrom_gen verify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomReport {
    pub len: usize,
    pub sum: u8,
    pub checksum_valid: bool,
    pub header: Option<OptionRomHeader>,
}

impl RomReport {
    /// True when the image carries a header whose size byte disagrees with the file length.
    pub fn declared_len_mismatch(&self) -> bool {
        self.header.is_some_and(|h| h.declared_len() != self.len)
    }
}

pub fn inspect_image(bytes: &[u8]) -> RomReport {
    let sum = byte_sum(bytes);
    RomReport {
        len: bytes.len(),
        sum,
        checksum_valid: is_checksum_valid(bytes),
        header: OptionRomHeader::parse(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::patch_checksum;

    fn option_rom(blocks: u8, len: usize) -> Vec<u8> {
        let mut rom = vec![0u8; len];
        rom[..2].copy_from_slice(&OPTION_ROM_SIGNATURE);
        rom[2] = blocks;
        rom[3] = 0xCB; // RETF
        rom
    }

    #[test]
    fn parses_signature_and_size() {
        let rom = option_rom(4, 2048);
        let header = OptionRomHeader::parse(&rom).unwrap();
        assert_eq!(header.blocks, 4);
        assert_eq!(header.declared_len(), 2048);
    }

    #[test]
    fn missing_signature_is_none() {
        assert_eq!(OptionRomHeader::parse(&[0xAA, 0x55, 0x04]), None);
        assert_eq!(OptionRomHeader::parse(&[0x55, 0xAA]), None);
        assert_eq!(OptionRomHeader::parse(&[]), None);
    }

    #[test]
    fn report_tracks_checksum_and_length() {
        let mut rom = option_rom(4, 2048);
        let report = inspect_image(&rom);
        assert!(!report.checksum_valid);
        assert!(!report.declared_len_mismatch());

        patch_checksum(&mut rom).unwrap();
        let report = inspect_image(&rom);
        assert!(report.checksum_valid);
        assert_eq!(report.sum, 0);
        assert_eq!(report.len, 2048);
    }

    #[test]
    fn report_flags_size_mismatch() {
        let rom = option_rom(1, 2048);
        assert!(inspect_image(&rom).declared_len_mismatch());

        // Images without a header have nothing to disagree with.
        assert!(!inspect_image(&[1, 2, 0xFD]).declared_len_mismatch());
    }

    #[test]
    fn empty_image_is_never_valid() {
        let report = inspect_image(&[]);
        assert!(!report.checksum_valid);
        assert_eq!(report.header, None);
    }
}
