//! Rendering of value sequences as C array initializers.

use std::num::NonZeroUsize;

/// Stock element formatters for byte arrays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ElementFormat {
    /// `255`
    #[default]
    Decimal,
    /// `0xFF`
    Hex,
}

impl ElementFormat {
    pub fn format(self, value: u8) -> String {
        match self {
            Self::Decimal => value.to_string(),
            Self::Hex => format!("0x{value:02X}"),
        }
    }
}

/// Render `values` as `<ctype> <name>[] = { ... };`, `columns` elements per row.
///
/// Rows after the first are indented by four spaces. The closing `};` follows the last element
/// directly. An empty sequence still yields a well-formed (empty) initializer.
pub fn to_c_array<T, F>(
    values: &[T],
    ctype: &str,
    name: &str,
    formatter: F,
    columns: NonZeroUsize,
) -> String
where
    F: Fn(&T) -> String,
{
    let body = values
        .chunks(columns.get())
        .map(|row| row.iter().map(&formatter).collect::<Vec<_>>().join(", "))
        .collect::<Vec<_>>()
        .join(",\n    ");

    format!("{ctype} {name}[] = {{\n    {body}}};")
}
