//! Numeric text decoders.
//!
//! Text-protocol numbers arrive as ASCII. Only types that fit a native
//! number without loss are parsed here; BIGINT, BIT and DECIMAL stay text.

/// Parse an integer cell (TINYINT..INT, MEDIUMINT, YEAR).
///
/// Returns `None` if the text is not an integer.
pub fn parse_integer(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

/// Parse a FLOAT/DOUBLE cell.
///
/// Returns `None` if the text is not a number.
pub fn parse_float(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}
