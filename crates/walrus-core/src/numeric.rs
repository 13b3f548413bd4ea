//! Bit-size inference and range checks for numeric values.

/// Integer widths in ascending order.
pub const INTEGER_WIDTHS: [u8; 5] = [8, 16, 32, 64, 128];

/// Significant digits an `f32` represents exactly.
const F32_DIGITS: usize = 7;

/// Smallest signed width that can hold `value`.
pub fn integer_bits(value: i128) -> u8 {
    INTEGER_WIDTHS
        .into_iter()
        .find(|bits| fits(value, *bits, true))
        .unwrap_or(128)
}

/// Width of a float literal: 32 when its digits survive a round-trip through
/// `f32`, 64 otherwise.
pub fn float_bits(text: &str, value: f64) -> u8 {
    let digits = text
        .chars()
        .filter(char::is_ascii_digit)
        .skip_while(|c| *c == '0')
        .count();
    let narrowed = value as f32;
    if digits <= F32_DIGITS && narrowed.is_finite() {
        32
    } else {
        64
    }
}

/// Whether `value` is representable by an integer of the given width.
pub fn fits(value: i128, bits: u8, signed: bool) -> bool {
    match (bits, signed) {
        (128, true) => true,
        (128, false) => value >= 0,
        (bits, true) => {
            let max = (1i128 << (bits - 1)) - 1;
            let min = -(1i128 << (bits - 1));
            (min..=max).contains(&value)
        }
        (bits, false) => {
            let max = (1i128 << bits) - 1;
            (0..=max).contains(&value)
        }
    }
}

/// Width needed for the result of combining two integer operands.
///
/// Starts from the wider operand and grows until `value` fits.
pub fn result_bits(left: u8, right: u8, value: i128, signed: bool) -> u8 {
    let floor = left.max(right);
    INTEGER_WIDTHS
        .into_iter()
        .filter(|bits| *bits >= floor)
        .find(|bits| fits(value, *bits, signed))
        .unwrap_or(128)
}

/// Name of an integer type, e.g. `i32` or `u8`.
pub fn integer_type_name(bits: u8, signed: bool) -> String {
    format!("{}{}", if signed { 'i' } else { 'u' }, bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_bits() {
        assert_eq!(integer_bits(0), 8);
        assert_eq!(integer_bits(127), 8);
        assert_eq!(integer_bits(128), 16);
        assert_eq!(integer_bits(-129), 16);
        assert_eq!(integer_bits(70_000), 32);
        assert_eq!(integer_bits(i64::MAX as i128), 64);
        assert_eq!(integer_bits(i64::MAX as i128 + 1), 128);
    }

    #[test]
    fn test_float_bits() {
        assert_eq!(float_bits("1.5", 1.5), 32);
        assert_eq!(float_bits("0.0001", 0.0001), 32);
        assert_eq!(float_bits("3.14159265", 3.14159265), 64);
    }

    #[test]
    fn test_fits_unsigned() {
        assert!(fits(255, 8, false));
        assert!(!fits(256, 8, false));
        assert!(!fits(-1, 64, false));
        assert!(fits(u64::MAX as i128, 64, false));
    }

    #[test]
    fn test_result_bits_grows() {
        assert_eq!(result_bits(8, 8, 100, true), 8);
        assert_eq!(result_bits(8, 8, 200, true), 16);
        assert_eq!(result_bits(32, 8, 5, true), 32);
    }
}
