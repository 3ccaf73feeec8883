//! printf-style float formatting (`%.Nf`, `%.Ng`) with lowercase `nan`/`inf`.
//!
//! Summary text is compared byte-for-byte across runs, so the rendering of
//! non-finite values and of `g` precision has to be fixed here rather than
//! left to `Display`.

fn non_finite(x: f64) -> Option<&'static str> {
    if x.is_nan() {
        Some("nan")
    } else if x == f64::INFINITY {
        Some("inf")
    } else if x == f64::NEG_INFINITY {
        Some("-inf")
    } else {
        None
    }
}

/// `%.{decimals}f`
pub fn fixed(x: f64, decimals: usize) -> String {
    match non_finite(x) {
        Some(s) => s.to_string(),
        None => format!("{x:.decimals$}"),
    }
}

/// `%.{precision}g`: `precision` significant digits, trailing zeros removed,
/// scientific notation when the exponent is below -4 or at least `precision`.
pub fn general(x: f64, precision: usize) -> String {
    if let Some(s) = non_finite(x) {
        return s.to_string();
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let p = precision.max(1);
    // Rounds to p significant digits; the exponent reflects any carry (9.99 -> 1.00e1).
    let sci = format!("{:.*e}", p - 1, x);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= p as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", strip_trailing_zeros(mantissa), exp.unsigned_abs())
    } else {
        let decimals = (p as i32 - 1 - exp).max(0) as usize;
        strip_trailing_zeros(&format!("{x:.decimals$}")).to_string()
    }
}

fn strip_trailing_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_matches_printf() {
        assert_eq!(fixed(0.0015, 6), "0.001500");
        assert_eq!(fixed(8.1317, 2), "8.13");
        assert_eq!(fixed(-0.25, 3), "-0.250");
        assert_eq!(fixed(f64::NAN, 2), "nan");
        assert_eq!(fixed(f64::INFINITY, 2), "inf");
        assert_eq!(fixed(f64::NEG_INFINITY, 2), "-inf");
    }

    #[test]
    fn general_three_significant_digits() {
        assert_eq!(general(0.0013, 3), "0.0013");
        assert_eq!(general(0.001302, 3), "0.0013");
        assert_eq!(general(0.05, 3), "0.05");
        assert_eq!(general(0.12345, 3), "0.123");
        assert_eq!(general(0.5, 3), "0.5");
        assert_eq!(general(1.0, 3), "1");
        assert_eq!(general(123.4, 3), "123");
        assert_eq!(general(1234.0, 3), "1.23e+03");
        assert_eq!(general(0.0001, 3), "0.0001");
        assert_eq!(general(0.00001234, 3), "1.23e-05");
        assert_eq!(general(2.5e-12, 3), "2.5e-12");
        assert_eq!(general(0.0, 3), "0");
    }

    #[test]
    fn general_rounding_carries_into_exponent() {
        assert_eq!(general(0.99999, 3), "1");
        assert_eq!(general(999.9, 3), "1e+03");
    }

    #[test]
    fn general_non_finite_lowercase() {
        assert_eq!(general(f64::NAN, 3), "nan");
        assert_eq!(general(f64::INFINITY, 3), "inf");
    }
}
