//! `bootrom.h` generation.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::carray::{to_c_array, ElementFormat};
use crate::DEFAULT_BOOTROM_ADDR;

/// Elements per row in the generated array.
pub const DEFAULT_COLUMNS: NonZeroUsize = match NonZeroUsize::new(16) {
    Some(n) => n,
    None => panic!("column count must be non-zero"),
};

/// Where the `BOOTROM_ADDR` value comes from.
///
/// An assembly source must contain the `ROM_SEGMENT` directive; it is never replaced by a
/// fallback. Without a source, the address is the fixed value given here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressSource {
    /// Linear address used verbatim.
    Fixed(u64),
    /// NASM source to scan for `%define ROM_SEGMENT (<hex>)`.
    AsmSource(PathBuf),
}

impl Default for AddressSource {
    fn default() -> Self {
        Self::Fixed(DEFAULT_BOOTROM_ADDR)
    }
}

/// Shape of the generated header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderOptions {
    pub addr_macro: String,
    pub ctype: String,
    pub array_name: String,
    pub columns: NonZeroUsize,
    pub element_format: ElementFormat,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            addr_macro: "BOOTROM_ADDR".to_string(),
            ctype: "unsigned char".to_string(),
            array_name: "BOOTROM".to_string(),
            columns: DEFAULT_COLUMNS,
            element_format: ElementFormat::Decimal,
        }
    }
}

/// Render the complete header for `image` mapped at linear address `addr`.
///
/// The output has no trailing newline after `};`.
pub fn render_header(addr: u64, image: &[u8], opts: &HeaderOptions) -> String {
    let array = to_c_array(
        image,
        &opts.ctype,
        &opts.array_name,
        |b| opts.element_format.format(*b),
        opts.columns,
    );
    format!("#define {} {addr:#x}\n{array}", opts.addr_macro)
}
