//! Hex formatting and parsing for report offsets.
//!
//! Absolute offsets are written as lowercase `0x`-prefixed hex. Relative
//! offsets are signed; negative values carry a leading `-` (`-0x40`).

use crate::error::{Error, Result};

/// Format an address as a hex string with 0x prefix.
///
/// # Examples
///
/// ```
/// use zdb_offsets::format_address;
///
/// assert_eq!(format_address(0x1000), "0x1000");
/// ```
pub fn format_address(addr: u64) -> String {
    format!("{:#x}", addr)
}

/// Format a signed distance between two addresses.
///
/// # Examples
///
/// ```
/// use zdb_offsets::format_relative;
///
/// assert_eq!(format_relative(0x1000), "0x1000");
/// assert_eq!(format_relative(-0x40), "-0x40");
/// ```
pub fn format_relative(delta: i64) -> String {
    let sign = if delta < 0 { "-" } else { "" };
    format!("{}{:#x}", sign, delta.unsigned_abs())
}

/// Parse a hex address string (with or without 0x prefix).
pub fn parse_address(s: &str) -> Result<u64> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|e| Error::InvalidHex(format!("'{}': {}", s, e)))
}

/// Parse a signed relative offset as written by [`format_relative`].
pub fn parse_relative(s: &str) -> Result<i64> {
    let (negative, magnitude) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let value = parse_address(magnitude)?;
    let out_of_range = || Error::InvalidHex(format!("'{}': out of range for i64", s));

    if negative {
        0i64.checked_sub_unsigned(value).ok_or_else(out_of_range)
    } else {
        i64::try_from(value).map_err(|_| out_of_range())
    }
}

/// Signed distance from `reference` to `target`.
///
/// Computed in two's complement, so symbols placed before the anchor yield
/// negative values.
pub fn relative_offset(target: u64, reference: u64) -> i64 {
    target.wrapping_sub(reference) as i64
}
