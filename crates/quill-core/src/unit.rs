#![forbid(unsafe_code)]

//! UTF-16 text-unit helpers.
//!
//! Every row-local offset in the editor model (columns, span offsets,
//! visual-line boundaries, composition pins) counts UTF-16 code units.

/// Encode a row as UTF-16 units.
#[inline]
#[must_use]
pub fn to_units(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

/// Number of UTF-16 units in `text`.
#[inline]
#[must_use]
pub fn unit_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Decode a slice of UTF-16 units, replacing unpaired surrogates.
#[inline]
#[must_use]
pub fn units_to_string(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

/// Whether `unit` is the leading half of a surrogate pair.
#[inline]
#[must_use]
pub const fn is_high_surrogate(unit: u16) -> bool {
    matches!(unit, 0xD800..=0xDBFF)
}

/// Whether `unit` is the trailing half of a surrogate pair.
#[inline]
#[must_use]
pub const fn is_low_surrogate(unit: u16) -> bool {
    matches!(unit, 0xDC00..=0xDFFF)
}

/// Whether `unit` is an ISO control character (C0, DEL, or C1).
#[inline]
#[must_use]
pub const fn is_control(unit: u16) -> bool {
    matches!(unit, 0x00..=0x1F | 0x7F..=0x9F)
}

/// Convert a UTF-16 column into a byte offset into `text`.
///
/// Columns past the end clamp to `text.len()`. A column that falls between
/// the halves of a surrogate pair resolves to the start of that character.
#[must_use]
pub fn col_to_byte(text: &str, col: usize) -> usize {
    let mut units = 0;
    for (byte, ch) in text.char_indices() {
        let next = units + ch.len_utf16();
        if next > col {
            return byte;
        }
        units = next;
    }
    text.len()
}

/// Convert a byte offset into `text` to a UTF-16 column.
///
/// Offsets past the end clamp to the unit length of `text`; offsets inside
/// a multi-byte character resolve to that character's start.
#[must_use]
pub fn byte_to_col(text: &str, byte: usize) -> usize {
    let mut units = 0;
    for (at, ch) in text.char_indices() {
        if at >= byte {
            return units;
        }
        if at + ch.len_utf8() > byte {
            return units;
        }
        units += ch.len_utf16();
    }
    units
}
