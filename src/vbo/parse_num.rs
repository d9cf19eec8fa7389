//! Parsers for the numbers found in vertex data rows.
//!
//! Integers follow the C conventions for base 0: `0x` introduces a hexadecimal number and a
//! leading `0` an octal one. A float or double starting with `0x` is the hexadecimal bit
//! pattern of the value, so that exact values such as NaNs and denormals can be written.

use std::fmt;

/// Error returned when a token isn't a valid number of the requested type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The token is not a number.
    Invalid,
    /// A negative sign was used for an unsigned type.
    Negative,
    /// The number doesn't fit in the type.
    OutOfRange,
}

impl fmt::Display for ParseError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Invalid => fmt.write_str("Invalid number"),
            ParseError::Negative => fmt.write_str("Number can't be negated"),
            ParseError::OutOfRange => fmt.write_str("Number out of range for type"),
        }
    }
}

impl std::error::Error for ParseError {}

struct NumAnalysis<'a> {
    negative: bool,
    radix: u32,
    digits: &'a str,
}

fn analyse_num(token: &str) -> NumAnalysis<'_> {
    let (negative, rest) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };

    let (radix, digits) = if let Some(hex) = rest.strip_prefix("0x")
                                                 .or_else(|| rest.strip_prefix("0X"))
    {
        (16, hex)
    } else if rest.len() > 1 && rest.starts_with('0') {
        (8, &rest[1..])
    } else {
        (10, rest)
    };

    NumAnalysis { negative, radix, digits }
}

/// Parses the magnitude of an integer token in base 16, 8 or 10.
fn parse_magnitude(analysis: &NumAnalysis<'_>) -> Result<u64, ParseError> {
    let digits = analysis.digits;

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(analysis.radix)) {
        return Err(ParseError::Invalid);
    }

    u64::from_str_radix(digits, analysis.radix).map_err(|_| ParseError::OutOfRange)
}

/// Parses a signed 32-bit integer.
pub fn parse_i32(token: &str) -> Result<i32, ParseError> {
    let analysis = analyse_num(token);
    let num = parse_magnitude(&analysis)?;

    if analysis.negative {
        if num > i32::MAX as u64 + 1 {
            Err(ParseError::OutOfRange)
        } else {
            // negating in the unsigned type keeps i32::MIN representable
            Ok((!num).wrapping_add(1) as i32)
        }
    } else if num > i32::MAX as u64 {
        Err(ParseError::OutOfRange)
    } else {
        Ok(num as i32)
    }
}

/// Parses an unsigned 32-bit integer.
pub fn parse_u32(token: &str) -> Result<u32, ParseError> {
    let analysis = analyse_num(token);
    let num = parse_magnitude(&analysis)?;

    if analysis.negative {
        Err(ParseError::Negative)
    } else if num > u32::MAX as u64 {
        Err(ParseError::OutOfRange)
    } else {
        Ok(num as u32)
    }
}

fn hex_bits(token: &str) -> Option<&str> {
    token.strip_prefix("0x").or_else(|| token.strip_prefix("0X"))
}

/// Rejects a decimal token whose value overflowed to infinity or underflowed to zero.
///
/// `inf` and `infinity` spelled out are accepted, as are zeros written as such.
fn check_decimal_range(token: &str, infinite: bool, zero: bool) -> Result<(), ParseError> {
    let token = token.to_ascii_lowercase();

    if infinite && !token.contains("inf") {
        return Err(ParseError::OutOfRange);
    }

    if zero {
        let mantissa = token.split('e').next().unwrap_or("");
        if mantissa.chars().any(|c| ('1' ..= '9').contains(&c)) {
            return Err(ParseError::OutOfRange);
        }
    }

    Ok(())
}

/// Parses a float, either decimal or as a `0x` bit pattern.
pub fn parse_f32(token: &str) -> Result<f32, ParseError> {
    match hex_bits(token) {
        Some(bits) => {
            if bits.is_empty() || !bits.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ParseError::Invalid);
            }
            u32::from_str_radix(bits, 16)
                .map(f32::from_bits)
                .map_err(|_| ParseError::OutOfRange)
        },
        None => {
            let value: f32 = token.parse().map_err(|_| ParseError::Invalid)?;
            check_decimal_range(token, value.is_infinite(), value == 0.0)?;
            Ok(value)
        },
    }
}

/// Parses a double, either decimal or as a `0x` bit pattern.
pub fn parse_f64(token: &str) -> Result<f64, ParseError> {
    match hex_bits(token) {
        Some(bits) => {
            if bits.is_empty() || !bits.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ParseError::Invalid);
            }
            u64::from_str_radix(bits, 16)
                .map(f64::from_bits)
                .map_err(|_| ParseError::OutOfRange)
        },
        None => {
            let value: f64 = token.parse().map_err(|_| ParseError::Invalid)?;
            check_decimal_range(token, value.is_infinite(), value == 0.0)?;
            Ok(value)
        },
    }
}
