// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Numeric policy shared by the sizing/alignment engine and the SVG
//! transformer pipeline: all intermediate rational arithmetic is limited to
//! 9 fractional digits, and trailing zeros are stripped before the value is
//! emitted into an SVG attribute. Locale is always fixed-point with `.`.

const FRACTIONAL_DIGITS: u32 = 9;

/// Rounds `v` to [`FRACTIONAL_DIGITS`] fractional digits.
pub fn round9(v: f64) -> f64 {
    let scale = 10f64.powi(FRACTIONAL_DIGITS as i32);
    (v * scale).round() / scale
}

/// Formats `v`, rounded to 9 fractional digits, with trailing zeros (and a
/// trailing decimal point, if no fraction remains) stripped.
pub fn format_trimmed(v: f64) -> String {
    let v = round9(v);
    if v == 0.0 {
        // avoid emitting "-0"
        return "0".to_string();
    }

    let s = format!("{:.*}", FRACTIONAL_DIGITS as usize, v);
    let s = s.trim_end_matches('0');
    let s = s.trim_end_matches('.');
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_zeros() {
        assert_eq!(format_trimmed(1.5), "1.5");
        assert_eq!(format_trimmed(1.0), "1");
        assert_eq!(format_trimmed(-2.400000001), "-2.400000001");
    }

    #[test]
    fn round9_limits_fractional_digits() {
        let v = round9(1.0 / 3.0);
        assert_eq!(format!("{:.10}", v), format!("{:.10}", 0.333333333));
    }

    #[test]
    fn negative_zero_formats_as_zero() {
        assert_eq!(format_trimmed(-0.0000000001), "0");
    }
}
