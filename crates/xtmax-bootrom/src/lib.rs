#![forbid(unsafe_code)]

//! Build-time post-processing for the XTMax boot ROM.
//!
//! The boot ROM is assembled by NASM into a raw image. Before the firmware build can embed it,
//! two things have to happen:
//! - the trailing byte is rewritten so the whole image sums to zero mod 256 (the PC BIOS skips
//!   option ROMs that fail this check), and
//! - the image is rendered into a C header (`bootrom.h`) as `unsigned char BOOTROM[]` together
//!   with `#define BOOTROM_ADDR`, the linear address the card maps the ROM at.
//!
//! The pure pieces ([`checksum`], [`carray`], [`segment`], [`header`], [`option_rom`]) never
//! touch the filesystem. [`fs`] wraps them into whole-file operations with atomic writes.

pub mod carray;
pub mod checksum;
pub mod error;
pub mod fs;
pub mod header;
pub mod option_rom;
pub mod segment;

pub use carray::{to_c_array, ElementFormat};
pub use checksum::{
    byte_sum, checksum_correction, is_checksum_valid, patch_checksum, ChecksumPatch,
};
pub use error::{BootRomError, Result};
pub use fs::{
    check_header_file, emit_header_file, patch_image_file, resolve_address, HeaderReport,
};
pub use header::{render_header, AddressSource, HeaderOptions, DEFAULT_COLUMNS};
pub use option_rom::{inspect_image, OptionRomHeader, RomReport};
pub use segment::{find_rom_segment, RomSegment, ROM_SEGMENT_DIRECTIVE};

/// Linear address the XTMax maps its boot ROM at when no assembly source is consulted.
///
/// This is segment `0xCE00`, i.e. `0xCE00 << 4`.
pub const DEFAULT_BOOTROM_ADDR: u64 = 0xCE000;
