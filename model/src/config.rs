// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Config/manifest model (C8): typed records for `render.json`,
//! `colors.json`, `animations.json`, `cursor-names.json`, and the concrete,
//! post-merge [`ThemeConfig`] the variant expansion engine produces.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::sizing::SizeScheme;

/// Build-time constant: the stroke width a drawing is authored at.
pub const BASE_STROKE_WIDTH: f64 = 16.0;

#[derive(Debug)]
pub enum ConfigError {
    BlankThemeName,
    UnknownPalette(String),
    InvalidJson(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::BlankThemeName => write!(f, "a theme config has a blank name"),
            ConfigError::UnknownPalette(name) => write!(f, "unknown color palette: '{name}'"),
            ConfigError::InvalidJson(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::InvalidJson(e.to_string())
    }
}

/// A single `match` -> `replace` color rule, as written in `render.json`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ColorReplace {
    #[serde(rename = "match")]
    pub match_hex: String,
    pub replace: String,
}

/// One entry of `render.json`'s top-level map.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct ThemeManifestEntry {
    pub dir: String,
    pub out: Option<String>,
    pub cursors: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
    pub resolutions: Option<Vec<u32>>,
    pub colors: Option<Vec<ColorReplace>>,
}

/// `render.json`: `{ <theme-name>: { dir, out?, cursors?, sizes?, ... } }`.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct RenderManifest(pub BTreeMap<String, ThemeManifestEntry>);

/// `colors.json`: `{ <palette-name>: { <sourceHex>: <targetHex> } }`.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct ColorsFile(pub BTreeMap<String, BTreeMap<String, String>>);

/// `animations.json`: `{ <cursorName>: { frames, duration } }`.
#[derive(Clone, Debug, Deserialize)]
pub struct AnimationEntry {
    pub frames: u32,
    /// Duration in milliseconds.
    pub duration: u32,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AnimationsFile(pub BTreeMap<String, AnimationEntry>);

/// `cursor-names.json`: `{ <svgBaseName>: <targetName> }`.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct CursorNamesFile(pub BTreeMap<String, String>);

/// `cursor-aliases.json`: `{ <concreteCursorName>: [<aliasName>, ...] }`,
/// consumed by the Xcursor writer to create extra theme-directory entries
/// (e.g. `left_ptr` also resolving as `default`/`arrow`) pointing at the
/// same rendered cursor.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct CursorAliasesFile(pub BTreeMap<String, Vec<String>>);

/// An animation definition, in jiffies (1/60 s), as used by the ANI writer.
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    pub name: String,
    pub frame_count: u32,
    pub jiffies: u32,
}

impl Animation {
    /// Jiffies are rounded from milliseconds: `1 jiffy ~= 1000/60 ms`.
    pub fn from_millis(name: impl Into<String>, frame_count: u32, duration_ms: u32) -> Self {
        let jiffies = ((duration_ms as f64) * 60.0 / 1000.0).round() as u32;
        Animation { name: name.into(), frame_count, jiffies: jiffies.max(1) }
    }
}

/// `(value, name)`. `value = None` means "use the base stroke width
/// unmodified", emitted with an empty name by convention.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeWidth {
    pub value: Option<f64>,
    pub name: String,
}

impl StrokeWidth {
    pub fn base() -> Self {
        StrokeWidth { value: None, name: String::new() }
    }

    pub fn new(value: f64, name: impl Into<String>) -> Self {
        StrokeWidth { value: Some(value), name: name.into() }
    }

    /// The name this width would get if left unnamed by the caller.
    pub fn default_name(value: f64) -> String {
        use std::cmp::Ordering;
        match value.partial_cmp(&BASE_STROKE_WIDTH) {
            Some(Ordering::Less) => "Thin".to_string(),
            Some(Ordering::Greater) => "Thick".to_string(),
            _ => String::new(),
        }
    }

    /// The effective numeric width, resolving `None` to [`BASE_STROKE_WIDTH`].
    pub fn resolved_value(&self) -> f64 {
        self.value.unwrap_or(BASE_STROKE_WIDTH)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShadowTarget {
    Svg,
    Bmp,
}

/// `(target, blur, dx, dy, opacity, color)`. `color` is `0xAARRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropShadow {
    pub target: ShadowTarget,
    pub blur: f64,
    pub dx: f64,
    pub dy: f64,
    pub opacity: f64,
    pub color: u32,
}

/// A fully resolved, immutable rendering job: one concrete choice per
/// option axis, ready for the theme driver / cursor renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct ThemeConfig {
    pub name: String,
    pub dir: String,
    pub out: String,
    pub colors: Option<BTreeMap<String, String>>,
    pub cursors: Option<Vec<String>>,
    pub size_scheme: SizeScheme,
    pub stroke_width: StrokeWidth,
    pub pointer_shadow: Option<DropShadow>,
    /// Per-theme target pixel sizes, overriding the CLI's `-r` defaults
    /// when set (`render.json`'s `resolutions` field).
    pub resolutions: Option<Vec<u32>>,
}

impl ThemeConfig {
    /// The `(dir, colors, sizeScheme, strokeWidth, pointerShadow)` tuple
    /// whose uniqueness the variant expansion engine guarantees.
    pub fn identity_key(&self) -> ThemeIdentity<'_> {
        ThemeIdentity {
            dir: &self.dir,
            colors: &self.colors,
            size_scheme_name: &self.size_scheme.name,
            stroke_value: self.stroke_width.value.map(|v| v.to_bits()),
            shadow: self.pointer_shadow,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct ThemeIdentity<'a> {
    dir: &'a str,
    colors: &'a Option<BTreeMap<String, String>>,
    size_scheme_name: &'a str,
    stroke_value: Option<u64>,
    shadow: Option<DropShadow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stroke_width_default_names() {
        assert_eq!(StrokeWidth::default_name(8.0), "Thin");
        assert_eq!(StrokeWidth::default_name(24.0), "Thick");
        assert_eq!(StrokeWidth::default_name(16.0), "");
    }

    #[test]
    fn animation_converts_millis_to_jiffies() {
        let anim = Animation::from_millis("spin", 6, 50);
        assert_eq!(anim.jiffies, 3);
    }

    #[test]
    fn render_manifest_deserializes() {
        let json = r#"{
            "Default": { "dir": "svg", "colors": [{"match": "#000000", "replace": "#ffffff"}] }
        }"#;
        let manifest: RenderManifest = serde_json::from_str(json).unwrap();
        let entry = &manifest.0["Default"];
        assert_eq!(entry.dir, "svg");
        assert_eq!(entry.colors.as_ref().unwrap()[0].match_hex, "#000000");
    }
}
