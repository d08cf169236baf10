// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Xcursor writer (C1d): `xcursorgen` config files plus `index.theme` and
//! the symlink alias list, not the Xcursor binary format itself — this
//! system hands rasterized PNGs to the platform's own `xcursorgen` rather
//! than assembling the Xcursor container directly.

use std::collections::BTreeSet;
use std::fmt::Write as _;

/// One line of an `xcursorgen` config: `<size> <xhot> <yhot> <filename> [<ms-delay>]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigLine {
    pub nominal_size: u32,
    pub hotspot: (u32, u32),
    pub filename: String,
    pub delay_ms: Option<u32>,
    pub num_colors: u8,
    pub frame_no: u32,
}

/// Builds an `xcursorgen` config body from `lines`, de-duplicating by
/// `(nominalSize, numColors, frameNo)` (later entries win) and sorting the
/// result by `(numColors, size, frameNo)`. Any `comments` (full lines
/// including a leading `#`) are emitted verbatim before the generated
/// lines, preserving read-modify-write round trips.
pub fn render_config(lines: &[ConfigLine], comments: &[String]) -> String {
    let mut deduped: Vec<ConfigLine> = Vec::new();
    for line in lines {
        let key = (line.nominal_size, line.num_colors, line.frame_no);
        if let Some(existing) = deduped
            .iter_mut()
            .find(|l| (l.nominal_size, l.num_colors, l.frame_no) == key)
        {
            *existing = line.clone();
        } else {
            deduped.push(line.clone());
        }
    }

    deduped.sort_by_key(|l| (l.num_colors, l.nominal_size, l.frame_no));

    let mut out = String::new();
    for comment in comments {
        let _ = writeln!(out, "{comment}");
    }
    for line in &deduped {
        match line.delay_ms {
            Some(delay) => {
                let _ = writeln!(
                    out,
                    "{} {} {} {} {}",
                    line.nominal_size, line.hotspot.0, line.hotspot.1, line.filename, delay
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "{} {} {} {}",
                    line.nominal_size, line.hotspot.0, line.hotspot.1, line.filename
                );
            }
        }
    }
    out
}

/// Splits a previously-written config file back into its comment lines and
/// its data [`ConfigLine`]s (with `num_colors`/`frame_no` left at `0` since
/// the text format does not carry them; callers that round-trip within one
/// build should re-merge with their own in-memory line list instead of a
/// reparsed one of these).
pub fn parse_config(body: &str) -> (Vec<String>, Vec<ConfigLine>) {
    let mut comments = Vec::new();
    let mut lines = Vec::new();

    for raw in body.lines() {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with('#') {
            comments.push(raw.to_string());
            continue;
        }

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        if parts.len() < 4 {
            continue;
        }

        let (Ok(size), Ok(hx), Ok(hy)) =
            (parts[0].parse(), parts[1].parse(), parts[2].parse())
        else {
            continue;
        };

        let (filename, delay_ms) = if parts.len() >= 5 {
            if let Ok(delay) = parts[parts.len() - 1].parse::<u32>() {
                (parts[3..parts.len() - 1].join(" "), Some(delay))
            } else {
                (parts[3..].join(" "), None)
            }
        } else {
            (parts[3].to_string(), None)
        };

        lines.push(ConfigLine {
            nominal_size: size,
            hotspot: (hx, hy),
            filename,
            delay_ms,
            num_colors: 0,
            frame_no: 0,
        });
    }

    (comments, lines)
}

/// Minimal `index.theme` file: `[Icon Theme]` section naming the theme and,
/// optionally, the themes it inherits from.
pub fn render_index_theme(name: &str, comment: &str, inherits: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[Icon Theme]");
    let _ = writeln!(out, "Name={name}");
    let _ = writeln!(out, "Comment={comment}");
    if !inherits.is_empty() {
        let _ = writeln!(out, "Inherits={}", inherits.join(","));
    }
    out
}

/// One recognized X11 cursor name plus the aliases that should symlink to
/// it, the first of `names` being the concrete, on-disk file.
#[derive(Clone, Debug)]
pub struct CursorAlias {
    pub names: Vec<String>,
}

/// Returns `(concrete_name, alias_names)` pairs for every alias group,
/// skipping any alias name already claimed by an earlier group (first
/// writer wins, matching a theme's own explicit names taking priority over
/// generated aliases).
pub fn resolve_aliases(groups: &[CursorAlias]) -> Vec<(String, Vec<String>)> {
    let mut claimed: BTreeSet<String> = BTreeSet::new();
    let mut out = Vec::new();

    for group in groups {
        let Some((concrete, rest)) = group.names.split_first() else { continue };
        if !claimed.insert(concrete.clone()) {
            continue;
        }

        let aliases: Vec<String> = rest
            .iter()
            .filter(|alias| claimed.insert((*alias).clone()))
            .cloned()
            .collect();

        out.push((concrete.clone(), aliases));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(size: u32, colors: u8, frame: u32) -> ConfigLine {
        ConfigLine {
            nominal_size: size,
            hotspot: (size / 2, size / 2),
            filename: format!("c{colors}-{size}_{frame}.png"),
            delay_ms: None,
            num_colors: colors,
            frame_no: frame,
        }
    }

    #[test]
    fn sorts_by_colors_then_size_then_frame() {
        let lines = vec![line(32, 8, 0), line(16, 8, 0), line(32, 4, 0)];
        let body = render_config(&lines, &[]);
        let rendered_order: Vec<&str> = body.lines().collect();
        assert_eq!(rendered_order[0], "32 16 16 c4-32_0.png");
        assert_eq!(rendered_order[1], "16 8 8 c8-16_0.png");
        assert_eq!(rendered_order[2], "32 16 16 c8-32_0.png");
    }

    #[test]
    fn dedups_by_size_colors_frame_keeping_latest() {
        let mut first = line(32, 8, 0);
        first.filename = "old.png".to_string();
        let mut second = line(32, 8, 0);
        second.filename = "new.png".to_string();

        let body = render_config(&[first, second], &[]);
        assert_eq!(body.trim(), "32 16 16 new.png");
    }

    #[test]
    fn comments_survive_round_trip() {
        let rendered = render_config(&[line(32, 1, 0)], &["# generated by cursorsmith".to_string()]);
        let (comments, lines) = parse_config(&rendered);
        assert_eq!(comments, vec!["# generated by cursorsmith".to_string()]);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn aliases_skip_already_claimed_names() {
        let groups = vec![
            CursorAlias { names: vec!["left_ptr".to_string(), "arrow".to_string()] },
            CursorAlias { names: vec!["default".to_string(), "arrow".to_string()] },
        ];
        let resolved = resolve_aliases(&groups);
        assert_eq!(resolved[0], ("left_ptr".to_string(), vec!["arrow".to_string()]));
        assert_eq!(resolved[1], ("default".to_string(), vec![]));
    }
}
