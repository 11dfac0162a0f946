//! Extraction of the ROM load segment from the boot ROM's NASM source.
//!
//! The source declares its own placement with a line such as:
//!
//! ```text
//! %define ROM_SEGMENT (0xCE00)
//! ```

use tracing::debug;

use crate::error::{BootRomError, Result};

pub const ROM_SEGMENT_DIRECTIVE: &str = "%define ROM_SEGMENT";

/// A real-mode segment value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomSegment(pub u32);

impl RomSegment {
    /// Linear address of offset 0 within this segment.
    pub fn linear_addr(self) -> u64 {
        u64::from(self.0) << 4
    }
}

/// Find the first `%define ROM_SEGMENT` directive in `source`.
///
/// Returns `Ok(None)` when no line carries the directive. Only the first directive is
/// considered; a malformed first directive is an error even if a later one would parse.
pub fn find_rom_segment(source: &str) -> Result<Option<RomSegment>> {
    for (idx, line) in source.lines().enumerate() {
        let Some(rest) = directive_operand(line) else {
            continue;
        };

        let segment = parse_hex_operand(rest).ok_or_else(|| BootRomError::MalformedSegment {
            line: idx + 1,
            text: line.trim().to_string(),
        })?;
        debug!(line = idx + 1, segment = segment.0, "found ROM_SEGMENT");
        return Ok(Some(segment));
    }

    Ok(None)
}

/// Text following the directive token, if `line` is a `ROM_SEGMENT` directive.
fn directive_operand(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix(ROM_SEGMENT_DIRECTIVE)?;
    // `%define ROM_SEGMENT_SIZE ...` is a different macro.
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() || c == '(' => Some(rest),
        Some(_) => None,
    }
}

fn parse_hex_operand(operand: &str) -> Option<RomSegment> {
    let operand = match operand.split_once(';') {
        Some((value, _comment)) => value,
        None => operand,
    };
    let literal = operand.trim_matches(|c: char| c.is_whitespace() || c == '(' || c == ')');

    let digits = if let Some(hex) = literal
        .strip_prefix("0x")
        .or_else(|| literal.strip_prefix("0X"))
    {
        hex
    } else if let Some(hex) = literal
        .strip_suffix('h')
        .or_else(|| literal.strip_suffix('H'))
    {
        hex
    } else {
        literal
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok().map(RomSegment)
}
