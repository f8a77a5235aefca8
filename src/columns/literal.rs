//! Classification of literal option values.

/// True when `s` is an optional sign followed by one or more ASCII digits.
pub fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// True when `s` is a number as JSON writes it, so it can be copied to the
/// output unquoted.
///
/// Accepts an optional `-`, an integer part without leading zeros, an
/// optional fraction with at least one digit and an optional exponent such
/// as `e-3`.
pub fn is_numeric(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (mantissa, None),
    };

    let digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    if !digits(int_part) || (int_part.len() > 1 && int_part.starts_with('0')) {
        return false;
    }
    if frac_part.is_some_and(|f| !digits(f)) {
        return false;
    }
    match exponent {
        Some(exp) => is_integer(exp),
        None => true,
    }
}
