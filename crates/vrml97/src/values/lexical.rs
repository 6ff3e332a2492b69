//! Lexical predicates for numeric field values.
//!
//! These only look at token text, so the parser can probe upcoming tokens
//! without building anything.

/// SFFloat: optional sign, digits with an optional fraction (at least one
/// digit before any exponent), optional exponent with required digits.
pub fn is_float(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_digits = count_digits(&bytes[i..]);
    i += int_digits;
    let mut frac_digits = 0;
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        frac_digits = count_digits(&bytes[i..]);
        i += frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return false;
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_digits = count_digits(&bytes[i..]);
        if exp_digits == 0 {
            return false;
        }
        i += exp_digits;
    }
    i == bytes.len()
}

/// SFInt32: optional sign followed by decimal digits only.
pub fn is_int(text: &str) -> bool {
    let digits = text
        .strip_prefix('-')
        .or_else(|| text.strip_prefix('+'))
        .unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// SFImage pixel: decimal, or hexadecimal where `x` may only appear at
/// position 0, or at position 1 after a `0`.
pub fn is_pixel(text: &str) -> bool {
    let bytes = text.as_bytes();
    let marker = bytes.iter().position(|b| matches!(b, b'x' | b'X'));
    match marker {
        None => !bytes.is_empty() && bytes.iter().all(u8::is_ascii_digit),
        Some(0) => hex_digits(&bytes[1..]),
        Some(1) if bytes[0] == b'0' => hex_digits(&bytes[2..]),
        Some(_) => false,
    }
}

fn hex_digits(bytes: &[u8]) -> bool {
    !bytes.is_empty() && bytes.iter().all(u8::is_ascii_hexdigit)
}

/// Colour component in `[0,1]`.
///
/// Plain decimals are checked by digit pattern: any integer part other than
/// zeros must be exactly `1` with an all-zero fraction. Exponent forms are
/// parsed and range checked.
pub fn is_color_component(text: &str) -> bool {
    if !is_float(text) {
        return false;
    }
    if text.contains(['e', 'E']) {
        return text
            .parse::<f64>()
            .is_ok_and(|v| (0.0..=1.0).contains(&v));
    }

    let (negative, unsigned) = match text.as_bytes()[0] {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let int_part = int_part.trim_start_matches('0');
    let frac_is_zero = frac_part.bytes().all(|b| b == b'0');

    if negative {
        return int_part.is_empty() && frac_is_zero;
    }
    match int_part {
        "" => true,
        "1" => frac_is_zero,
        _ => false,
    }
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
