// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Anchor points and the `bias-<token>(-<token>)*` class-name grammar.

use std::fmt;

use crate::geom::f64_bound;

/// How an anchor's bias offset should be combined with the stroke/fill
/// offsets in effect at render time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BiasMode {
    StrokeInside,
    StrokeOutside,
    FillInside,
    FillOutside,
    StrokeBase,
    StrokeBaseOutside,
}

/// A per-anchor direction and mode, parsed from a `bias-...` class name.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bias {
    pub dx: f64,
    pub dy: f64,
    pub mode: BiasMode,
}

impl Bias {
    /// The bias of an anchor with no `bias-` class: no directional offset,
    /// mode is irrelevant since it is always multiplied by a zero magnitude.
    pub fn neutral() -> Self {
        Bias { dx: 0.0, dy: 0.0, mode: BiasMode::StrokeInside }
    }

    /// Returns the signed offset magnitude selected by this bias's mode,
    /// given the current stroke and fill offsets in source units.
    fn offset(&self, stroke_off: f64, fill_off: f64) -> f64 {
        match self.mode {
            BiasMode::StrokeInside => stroke_off,
            BiasMode::StrokeOutside => -stroke_off,
            BiasMode::FillInside => fill_off,
            BiasMode::FillOutside => -fill_off,
            BiasMode::StrokeBase => stroke_off - fill_off,
            BiasMode::StrokeBaseOutside => fill_off - stroke_off,
        }
    }
}

/// A point in source user units, together with the bias that tells the
/// alignment engine how much (and in which direction) to nudge it for
/// stroke/fill offsets before it is pixel-snapped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnchorPoint {
    pub x: f64,
    pub y: f64,
    pub bias: Bias,
}

impl AnchorPoint {
    pub fn new(x: f64, y: f64, bias: Bias) -> Self {
        AnchorPoint { x, y, bias }
    }

    /// `pointWithOffset(strokeOff, fillOff)`: the anchor's coordinates
    /// nudged by its bias for the given stroke/fill offsets.
    pub fn point_with_offset(&self, stroke_off: f64, fill_off: f64) -> (f64, f64) {
        let o = self.bias.offset(stroke_off, fill_off);
        (self.x + self.bias.dx * o, self.y + self.bias.dy * o)
    }
}

/// Error parsing a `bias-...` class token.
#[derive(Debug)]
pub struct InvalidBias(pub String);

impl fmt::Display for InvalidBias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid bias token: '{}'", self.0)
    }
}

impl std::error::Error for InvalidBias {}

#[derive(Default)]
struct BiasFlags {
    half: bool,
    fill: bool,
    base: bool,
    outside: bool,
}

/// Parses the token string that follows the `bias-` prefix of a class name,
/// e.g. `"center"`, `"left-top"`, `"l50-b50"`, `"top-right-half"`.
pub fn parse_bias(tokens: &str) -> Result<Bias, InvalidBias> {
    if tokens.is_empty() {
        return Ok(Bias::neutral());
    }

    let mut dx = 0.0f64;
    let mut dy = 0.0f64;
    let mut flags = BiasFlags::default();

    for token in tokens.split('-') {
        if token.is_empty() {
            continue;
        }

        match token {
            "half" => {
                flags.half = true;
                continue;
            }
            "stroke" => continue, // explicit but equivalent to the default
            "fill" => {
                flags.fill = true;
                continue;
            }
            "base" => {
                flags.base = true;
                continue;
            }
            "outside" => {
                flags.outside = true;
                continue;
            }
            _ => {}
        }

        // Longest match first: full words before single-letter abbreviations,
        // so "left"/"top"/... never get misparsed as "l"/"t" plus a
        // non-numeric magnitude suffix.
        #[derive(Clone, Copy, PartialEq)]
        enum Axis {
            X,
            Y,
            Center,
        }

        let (axis, direction, rest) = if let Some(rest) = token.strip_prefix("left") {
            (Axis::X, -1.0, rest)
        } else if let Some(rest) = token.strip_prefix("right") {
            (Axis::X, 1.0, rest)
        } else if let Some(rest) = token.strip_prefix("top") {
            (Axis::Y, -1.0, rest)
        } else if let Some(rest) = token.strip_prefix("bottom") {
            (Axis::Y, 1.0, rest)
        } else if let Some(rest) = token.strip_prefix("center") {
            (Axis::Center, 0.0, rest)
        } else if let Some(rest) = token.strip_prefix('l') {
            (Axis::X, -1.0, rest)
        } else if let Some(rest) = token.strip_prefix('r') {
            (Axis::X, 1.0, rest)
        } else if let Some(rest) = token.strip_prefix('t') {
            (Axis::Y, -1.0, rest)
        } else if let Some(rest) = token.strip_prefix('b') {
            (Axis::Y, 1.0, rest)
        } else if let Some(rest) = token.strip_prefix('c') {
            (Axis::Center, 0.0, rest)
        } else {
            return Err(InvalidBias(token.to_string()));
        };

        let magnitude = if rest.is_empty() {
            1.0
        } else {
            let pct: f64 = rest.parse().map_err(|_| InvalidBias(token.to_string()))?;
            f64_bound(0.0, pct / 100.0, 1.0)
        };

        match axis {
            Axis::Center => {} // contributes no directional offset on either axis.
            Axis::X => dx = direction * magnitude,
            Axis::Y => dy = direction * magnitude,
        }
    }

    if flags.half {
        dx /= 2.0;
        dy /= 2.0;
        flags.base = true;
    }

    let mode = match (flags.base, flags.fill, flags.outside) {
        (true, _, true) => BiasMode::StrokeBaseOutside,
        (true, _, false) => BiasMode::StrokeBase,
        (false, true, true) => BiasMode::FillOutside,
        (false, true, false) => BiasMode::FillInside,
        (false, false, true) => BiasMode::StrokeOutside,
        (false, false, false) => BiasMode::StrokeInside,
    };

    Ok(Bias { dx, dy, mode })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_neutral() {
        let b = parse_bias("").unwrap();
        assert_eq!((b.dx, b.dy), (0.0, 0.0));
    }

    #[test]
    fn center_is_neutral() {
        let b = parse_bias("center").unwrap();
        assert_eq!((b.dx, b.dy), (0.0, 0.0));
    }

    #[test]
    fn left_top_full_words() {
        let b = parse_bias("left-top").unwrap();
        assert_eq!((b.dx, b.dy), (-1.0, -1.0));
        assert_eq!(b.mode, BiasMode::StrokeInside);
    }

    #[test]
    fn abbreviations_with_magnitude() {
        let b = parse_bias("l50-b50").unwrap();
        assert_eq!((b.dx, b.dy), (-0.5, 0.5));
        assert_eq!(b.mode, BiasMode::StrokeInside);
    }

    #[test]
    fn half_halves_and_implies_base() {
        let b = parse_bias("top-right-half").unwrap();
        assert_eq!((b.dx, b.dy), (0.5, -0.5));
        assert_eq!(b.mode, BiasMode::StrokeBase);

        let (x, y) = AnchorPoint::new(0.0, 0.0, b).point_with_offset(4.0, 1.0);
        assert!((x - 1.5).abs() < 1e-9);
        assert!((y - -1.5).abs() < 1e-9);
    }

    #[test]
    fn bottom_fill_outside() {
        let b = parse_bias("bottom-fill-outside").unwrap();
        assert_eq!((b.dx, b.dy), (0.0, 1.0));
        assert_eq!(b.mode, BiasMode::FillOutside);
    }

    #[test]
    fn unrecognized_token_errors() {
        assert!(parse_bias("zzz").is_err());
    }
}
