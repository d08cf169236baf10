// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Animation-frame filename convention: `<name>-<NN>.svg` is frame `NN` of
//! the animation `<name>`; a bare `<name>.svg` is a static, single-frame
//! cursor.

/// Splits a source file's stem into `(cursor_name, frame_index)`. The
/// suffix must be two or more ASCII digits, immediately preceded by a
/// hyphen, to avoid misreading a cursor legitimately named e.g.
/// `zoom-1x`.
pub fn split_frame_suffix(stem: &str) -> (String, Option<u32>) {
    match stem.rsplit_once('-') {
        Some((base, suffix)) if suffix.len() >= 2 && suffix.chars().all(|c| c.is_ascii_digit()) => {
            match suffix.parse::<u32>() {
                Ok(frame) => (base.to_string(), Some(frame)),
                Err(_) => (stem.to_string(), None),
            }
        }
        _ => (stem.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_two_digit_frame_suffix() {
        assert_eq!(split_frame_suffix("spin-00"), ("spin".to_string(), Some(0)));
        assert_eq!(split_frame_suffix("spin-07"), ("spin".to_string(), Some(7)));
    }

    #[test]
    fn leaves_single_digit_and_non_numeric_suffixes_alone() {
        assert_eq!(split_frame_suffix("zoom-1x"), ("zoom-1x".to_string(), None));
        assert_eq!(split_frame_suffix("pointer"), ("pointer".to_string(), None));
    }
}
