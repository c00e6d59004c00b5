// Numeric literal classification.
//
// A numeric token is read twice, with the prefix rules of C `strtol`
// (base 0) and `strtod`. Which of the two readings is kept is decided
// by `classify`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ini::Value;

static RE_INT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    let re = r"^([+-]?)(?:0[xX]([0-9a-fA-F]+)|(0[0-7]*)|([1-9][0-9]*))";
    Regex::new(re).expect("could not compile RE_INT_PREFIX regexp")
});

static RE_FLOAT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    let re = r"(?xi)^([+-]?)(?:
        (?P<inf>inf(?:inity)?)
        | (?P<nan>nan)(?:\([0-9a-z_]*\))?
        | 0x(?P<hex>[0-9a-f]+\.?[0-9a-f]*|\.[0-9a-f]+)(?:p(?P<hexp>[+-]?[0-9]+))?
        | (?P<dec>(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:e[+-]?[0-9]+)?)
    )";
    Regex::new(re).expect("could not compile RE_FLOAT_PREFIX regexp")
});

/// Integer reading, saturating at the `i64` bounds. 0 if there is no number.
pub(crate) fn parse_int_prefix(s: &str) -> i64 {
    let caps = match RE_INT_PREFIX.captures(s) {
        Some(caps) => caps,
        None => return 0,
    };
    let negative = &caps[1] == "-";
    let (digits, radix) = if let Some(m) = caps.get(2) {
        (m.as_str(), 16)
    } else if let Some(m) = caps.get(3) {
        (m.as_str(), 8)
    } else {
        (&caps[4], 10)
    };

    // Accumulate the magnitude, stop once it is out of range anyway.
    let limit = i64::MAX as i128 + 1;
    let mut n: i128 = 0;
    for c in digits.chars() {
        let d = c.to_digit(radix).unwrap_or(0) as i128;
        n = n * radix as i128 + d;
        if n > limit {
            n = limit;
            break;
        }
    }
    if negative {
        (-n).max(i64::MIN as i128) as i64
    } else {
        n.min(i64::MAX as i128) as i64
    }
}

/// Floating point reading. 0.0 if there is no number.
pub(crate) fn parse_double_prefix(s: &str) -> f64 {
    let caps = match RE_FLOAT_PREFIX.captures(s) {
        Some(caps) => caps,
        None => return 0.0,
    };
    let value = if caps.name("inf").is_some() {
        f64::INFINITY
    } else if caps.name("nan").is_some() {
        f64::NAN
    } else if let Some(hex) = caps.name("hex") {
        let exp = caps.name("hexp").map_or(0, |m| saturating_exp(m.as_str()));
        hex_float(hex.as_str(), exp)
    } else {
        caps.name("dec").and_then(|m| m.as_str().parse::<f64>().ok()).unwrap_or(0.0)
    };
    if &caps[1] == "-" {
        -value
    } else {
        value
    }
}

// Exponent digits, clamped to the i32 range. Way past what an f64 can
// hold, so the value still overflows or underflows.
fn saturating_exp(s: &str) -> i32 {
    match s.parse::<i64>() {
        Ok(n) => n.max(i32::MIN as i64).min(i32::MAX as i64) as i32,
        Err(_) if s.starts_with('-') => i32::MIN,
        Err(_) => i32::MAX,
    }
}

// "1f.8" with binary exponent `exp`.
fn hex_float(digits: &str, exp: i32) -> f64 {
    let mut mantissa = 0.0f64;
    let mut scale = 0i32;
    let mut fraction = false;
    for c in digits.chars() {
        if c == '.' {
            fraction = true;
            continue;
        }
        mantissa = mantissa * 16.0 + c.to_digit(16).unwrap_or(0) as f64;
        if fraction {
            scale -= 4;
        }
    }
    if mantissa == 0.0 {
        return 0.0;
    }
    // Scale in two steps, 2^exp alone may over- or underflow.
    let exp = exp.saturating_add(scale);
    let half = exp / 2;
    mantissa * 2f64.powi(half) * 2f64.powi(exp - half)
}

/// Decide between the integer and the floating point reading of `token`.
///
/// If only one of the readings is nonzero that one wins. If both are
/// nonzero (or both zero) the token is a double iff it contains one of
/// `.eEnN`, the `n` catching `inf` and `nan` spellings.
pub(crate) fn classify(token: &str) -> Value {
    let l = parse_int_prefix(token);
    let d = parse_double_prefix(token);

    if d == 0.0 && l != 0 {
        Value::Int(l)
    } else if l == 0 && d != 0.0 {
        Value::Double(d)
    } else if token.contains(|c: char| matches!(c, '.' | 'e' | 'E' | 'n' | 'N')) {
        Value::Double(d)
    } else {
        Value::Int(l)
    }
}
