// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Variant expansion engine (C6): turns a declarative manifest into the
//! concrete cartesian product of rendering jobs, suppressing redundant
//! re-encodings and assigning each job a deterministic name.
//!
//! Axis nesting, outermost to innermost: source config, stroke width,
//! pointer shadow, size scheme, color. Source stays outermost so that every
//! variant of one source document is produced before the engine moves to
//! the next; stroke width and shadow stay just inside it because changing
//! either requires re-running the SVG transformer pipeline, while size and
//! color are cheap attribute/canvas mutations the renderer can replay
//! against the same transformed DOM.

use std::collections::BTreeMap;

use crate::config::{ConfigError, DropShadow, StrokeWidth, ThemeConfig};
use crate::sizing::SizeScheme;

/// One manifest-declared source, before expansion. `name` may contain a
/// single `*` wildcard splitting it into a prefix/suffix that variant tags
/// are inserted between.
#[derive(Clone, Debug, Default)]
pub struct SourceConfig {
    pub name: String,
    pub dir: String,
    pub out: String,
    /// Set for ad-hoc CLI `--source` entries given without an explicit
    /// `--name`: `name` is then just this source's directory leaf, and
    /// `expand` replaces it with the shared token-prefix extracted across
    /// every other deferred source sharing `dir` (see
    /// [`extract_theme_prefix`]), rather than splitting it for a wildcard.
    pub deferred_name: bool,
    pub cursors: Option<Vec<String>>,
    /// `render.json`'s own `colors` field: a fixed match/replace map for
    /// this source, overriding the CLI's `--color` palette axis entirely
    /// rather than being cartesian-producted with it.
    pub fixed_colors: Option<BTreeMap<String, String>>,
    /// `render.json`'s own `sizes` field, overriding the CLI's `-s` axis
    /// for this source when set.
    pub sizes: Option<Vec<SizeScheme>>,
    /// `render.json`'s own `resolutions` field, overriding the CLI's `-r`
    /// defaults for this source's rendered jobs when set.
    pub resolutions: Option<Vec<u32>>,
}

/// A named color palette option. `map = None` means "no color replacement"
/// and is tagged with an empty name (no `-<color>` suffix).
#[derive(Clone, Debug)]
pub struct ColorOption {
    pub name: String,
    pub map: Option<BTreeMap<String, String>>,
}

fn split_wildcard(name: &str) -> (String, String) {
    match name.split_once('*') {
        Some((prefix, suffix)) => (prefix.to_string(), suffix.to_string()),
        None => (name.to_string(), String::new()),
    }
}

/// Builds the `Double? -> name` mapping for a set of stroke widths,
/// disambiguating case-insensitive name collisions with a numeric suffix.
fn resolve_stroke_names(strokes: &[StrokeWidth]) -> Vec<StrokeWidth> {
    let mut seen_lower: Vec<String> = Vec::new();
    let mut resolved = Vec::with_capacity(strokes.len());

    for sw in strokes {
        let base_name = if sw.name.is_empty() {
            sw.value.map(StrokeWidth::default_name).unwrap_or_default()
        } else {
            sw.name.clone()
        };

        let mut candidate = base_name.clone();
        let mut suffix = 2u32;
        while !candidate.is_empty() && seen_lower.contains(&candidate.to_lowercase()) {
            candidate = format!("{base_name}{suffix}");
            suffix += 1;
        }

        if !candidate.is_empty() {
            seen_lower.push(candidate.to_lowercase());
        }

        resolved.push(StrokeWidth { value: sw.value, name: candidate });
    }

    resolved
}

fn stroke_axis(strokes: &[StrokeWidth], default_stroke_also: bool) -> Vec<StrokeWidth> {
    if strokes.is_empty() {
        return vec![StrokeWidth::base()];
    }

    let mut resolved = resolve_stroke_names(strokes);
    if default_stroke_also {
        resolved.insert(0, StrokeWidth::base());
    }
    resolved
}

fn shadow_axis(shadow: Option<DropShadow>, no_shadow_also: bool) -> Vec<Option<DropShadow>> {
    match shadow {
        None => vec![None],
        Some(s) => {
            if no_shadow_also {
                vec![None, Some(s)]
            } else {
                vec![Some(s)]
            }
        }
    }
}

fn size_axis(sizes: &[SizeScheme]) -> Vec<SizeScheme> {
    if sizes.is_empty() {
        vec![SizeScheme::source()]
    } else {
        sizes.to_vec()
    }
}

fn color_axis(colors: &[ColorOption]) -> Vec<ColorOption> {
    if colors.is_empty() {
        vec![ColorOption { name: String::new(), map: None }]
    } else {
        colors.to_vec()
    }
}

fn join_tags(tags: &[&str]) -> String {
    tags.iter().filter(|t| !t.is_empty()).cloned().collect::<Vec<_>>().join("-")
}

/// The last non-empty `/`- or `\`-separated segment of `dir`, used as the
/// fallback base name when a group of deferred-name sources shares no
/// common token prefix.
fn dir_leaf(dir: &str) -> &str {
    dir.trim_end_matches(['/', '\\']).rsplit(['/', '\\']).next().filter(|s| !s.is_empty()).unwrap_or(dir)
}

/// Expands `sources` over the five option axes into the concrete list of
/// [`ThemeConfig`]s, in deterministic, deduplication-aware order.
pub fn expand(
    sources: &[SourceConfig],
    strokes: &[StrokeWidth],
    default_stroke_also: bool,
    shadow: Option<DropShadow>,
    no_shadow_also: bool,
    colors: &[ColorOption],
    sizes: &[SizeScheme],
) -> Result<Vec<ThemeConfig>, ConfigError> {
    let strokes = stroke_axis(strokes, default_stroke_also);
    let shadows = shadow_axis(shadow, no_shadow_also);
    let default_sizes = size_axis(sizes);
    let default_colors = color_axis(colors);

    // Deferred-name sources (ad-hoc CLI `--source` dirs given without a
    // `--name`) don't carry an author-chosen name to split on `*`; group
    // them by `dir` instead and let the shared token prefix stand in for
    // one, so that several such sources pointed at the same directory
    // collapse to one base name rather than repeating the leaf per source.
    let mut deferred_names_by_dir: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for source in sources {
        if source.deferred_name {
            deferred_names_by_dir.entry(source.dir.as_str()).or_default().push(source.name.as_str());
        }
    }
    let deferred_prefix_by_dir: BTreeMap<&str, String> = deferred_names_by_dir
        .into_iter()
        .map(|(dir, names)| (dir, extract_theme_prefix(&names, dir_leaf(dir))))
        .collect();

    let mut out: Vec<ThemeConfig> = Vec::new();

    for source in sources {
        if source.name.trim().is_empty() {
            return Err(ConfigError::BlankThemeName);
        }

        let (base_prefix, base_suffix) = if source.deferred_name {
            let prefix = deferred_prefix_by_dir
                .get(source.dir.as_str())
                .cloned()
                .unwrap_or_else(|| source.name.clone());
            (prefix, String::new())
        } else {
            split_wildcard(&source.name)
        };

        // `render.json`'s own `sizes`/`colors` fields override the CLI's
        // axis defaults for this source rather than being cartesian-
        // producted with them, per §3's "missing optional fields inherit
        // from the command-line defaults."
        let source_sizes = source.sizes.clone().unwrap_or_else(|| default_sizes.clone());
        let source_colors = match &source.fixed_colors {
            Some(map) => vec![ColorOption { name: String::new(), map: Some(map.clone()) }],
            None => default_colors.clone(),
        };

        for stroke in &strokes {
            for shadow_opt in &shadows {
                for size in &source_sizes {
                    for color in &source_colors {
                        let size_tag = if size.permanent { size.name.as_str() } else { "" };
                        let stroke_tag = stroke.name.as_str();
                        let shadow_tag = if shadow_opt.is_some() { "Shadow" } else { "" };

                        let candidate_name = join_tags(&[
                            &base_prefix,
                            &color.name,
                            size_tag,
                            stroke_tag,
                            shadow_tag,
                            &base_suffix,
                        ]);

                        let candidate_name = if candidate_name.is_empty() {
                            source.name.clone()
                        } else {
                            candidate_name
                        };

                        let candidate = ThemeConfig {
                            name: candidate_name,
                            dir: source.dir.clone(),
                            out: source.out.clone(),
                            colors: color.map.clone(),
                            cursors: source.cursors.clone(),
                            size_scheme: size.clone(),
                            stroke_width: stroke.clone(),
                            pointer_shadow: shadow_opt.clone(),
                            resolutions: source.resolutions.clone(),
                        };

                        let is_duplicate =
                            out.iter().any(|existing| existing.identity_key() == candidate.identity_key());

                        if !is_duplicate {
                            out.push(candidate);
                        }
                    }
                }
            }
        }
    }

    Ok(out)
}

/// Derives a shared name prefix for theme configs under the same source
/// `dir` that were not explicitly wildcard-named: tokenizes each name on
/// alphanumeric/non-alphanumeric transitions, finds the longest common
/// prefix (case-insensitive), trims a trailing non-alphanumeric token, and
/// falls back to the directory's leaf name if nothing remains.
pub fn extract_theme_prefix(names: &[&str], dir_leaf: &str) -> String {
    fn tokenize(name: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut current_is_alnum: Option<bool> = None;

        for c in name.chars() {
            let is_alnum = c.is_alphanumeric();
            if current_is_alnum == Some(is_alnum) {
                current.push(c);
            } else {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                current.push(c);
                current_is_alnum = Some(is_alnum);
            }
        }
        if !current.is_empty() {
            tokens.push(current);
        }
        tokens
    }

    if names.is_empty() {
        return dir_leaf.to_string();
    }

    let tokenized: Vec<Vec<String>> = names.iter().map(|n| tokenize(n)).collect();
    let mut common: Vec<String> = tokenized[0].clone();

    for tokens in &tokenized[1..] {
        let mut next = Vec::new();
        for (a, b) in common.iter().zip(tokens.iter()) {
            if a.to_lowercase() == b.to_lowercase() {
                next.push(a.clone());
            } else {
                break;
            }
        }
        common = next;
        if common.is_empty() {
            break;
        }
    }

    while common.last().map(|t| !t.chars().next().unwrap_or(' ').is_alphanumeric()).unwrap_or(false) {
        common.pop();
    }

    if common.is_empty() {
        dir_leaf.to_string()
    } else {
        common.concat()
    }
}
