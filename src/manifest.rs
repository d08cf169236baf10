// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Loads `render.json`/`colors.json`/`animations.json`/`cursor-names.json`
//! and merges the CLI's ad-hoc flags into the same option-axis lists the
//! variant expansion engine consumes.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use cursorsmith_model::config::{
    Animation, AnimationsFile, ColorsFile, CursorAliasesFile, CursorNamesFile, DropShadow,
    RenderManifest, ShadowTarget, StrokeWidth, ThemeConfig,
};
use cursorsmith_model::sizing::SizeScheme;
use cursorsmith_model::variants::{self, ColorOption, SourceConfig};
use cursorsmith_model::ConfigError;

use crate::cli::{CliArgs, SizeSchemeArg};
use crate::error::Error;

pub struct LoadedProject {
    pub themes: Vec<ThemeConfig>,
    pub animations: BTreeMap<String, Animation>,
    pub windows_cursor_names: Option<BTreeMap<String, String>>,
    pub linux_cursor_names: Option<BTreeMap<String, String>>,
    pub cursor_aliases: BTreeMap<String, Vec<String>>,
    pub macos_cursor_names: Option<BTreeMap<String, String>>,
    pub build_dir: PathBuf,
}

fn read_json_file<T: serde::de::DeserializeOwned + Default>(path: &Path) -> Result<T, Error> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(serde_json::from_str(&contents).map_err(ConfigError::from)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(Error::Io(e)),
    }
}

fn read_name_map(path: &Path) -> Result<BTreeMap<String, String>, Error> {
    let file: CursorNamesFile = read_json_file(path)?;
    Ok(file.0)
}

/// Resolves one of `render.json`'s own `sizes` string entries (always a
/// bare preset name, unlike the CLI's `-s name:canvas:nominal[:permanent]`
/// form) to a concrete [`SizeScheme`].
fn size_scheme_from_preset_name(name: &str) -> SizeScheme {
    match name {
        "Source" => SizeScheme::source(),
        "N" => SizeScheme::normal(),
        "L" => SizeScheme::large(),
        "XL" => SizeScheme::extra_large(),
        other => SizeScheme::new(other, 1.0, 1.0, false),
    }
}

fn size_scheme_from_arg(arg: &SizeSchemeArg) -> SizeScheme {
    match arg {
        SizeSchemeArg::Preset(name) => size_scheme_from_preset_name(name),
        SizeSchemeArg::Custom { name, canvas, nominal, permanent } => {
            SizeScheme::new(name.clone(), *canvas, *nominal, *permanent)
        }
    }
}

/// Loads every manifest file under `cli.project_path` and combines them
/// with the CLI's ad-hoc `--source`/`--color`/`--stroke-width`/... flags
/// into the concrete list of rendering jobs.
pub fn load(cli: &CliArgs) -> Result<LoadedProject, Error> {
    let project = &cli.project_path;

    let render_manifest: RenderManifest = read_json_file(&project.join("render.json"))?;
    let colors_path = cli.color_map.clone().unwrap_or_else(|| project.join("colors.json"));
    let colors_file: ColorsFile = read_json_file(&colors_path)?;
    let animations_path = cli.animations_file.clone().unwrap_or_else(|| project.join("animations.json"));
    let animations_file: AnimationsFile = read_json_file(&animations_path)?;

    let mut sources: Vec<SourceConfig> = Vec::new();

    for (name, entry) in &render_manifest.0 {
        if !cli.themes.is_empty() && !cli.themes.iter().any(|t| t == name) {
            continue;
        }
        let fixed_colors = entry.colors.as_ref().map(|rules| {
            rules.iter().map(|r| (r.match_hex.clone(), r.replace.clone())).collect::<BTreeMap<_, _>>()
        });
        let sizes = entry.sizes.as_ref().map(|names| names.iter().map(|n| size_scheme_from_preset_name(n)).collect());

        sources.push(SourceConfig {
            name: name.clone(),
            dir: entry.dir.clone(),
            out: entry.out.clone().unwrap_or_else(|| name.clone()),
            cursors: entry.cursors.clone(),
            fixed_colors,
            sizes,
            resolutions: entry.resolutions.clone(),
        });
    }

    for (src, name) in cli.sources.iter().zip(cli.names.iter().chain(std::iter::repeat(&String::new()))) {
        let dir = src.to_string_lossy().into_owned();
        let leaf = src.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| dir.clone());
        let deferred_name = name.is_empty();
        let name = if deferred_name { leaf.clone() } else { name.clone() };
        sources.push(SourceConfig {
            name,
            dir: dir.clone(),
            out: leaf,
            cursors: None,
            deferred_name,
            ..Default::default()
        });
    }

    let cursor_filter: Option<Vec<String>> = if cli.cursors.is_empty() || cli.all_cursors {
        None
    } else {
        Some(cli.cursors.clone())
    };
    if let Some(filter) = &cursor_filter {
        for source in &mut sources {
            source.cursors = Some(filter.clone());
        }
    }

    let mut colors: Vec<ColorOption> = Vec::new();
    for palette_name in &cli.colors {
        let map = colors_file
            .0
            .get(palette_name)
            .ok_or_else(|| ConfigError::UnknownPalette(palette_name.clone()))?
            .clone();
        colors.push(ColorOption { name: palette_name.clone(), map: Some(map) });
    }

    let strokes: Vec<StrokeWidth> = cli
        .stroke_widths
        .iter()
        .map(|sw| StrokeWidth { value: Some(sw.value), name: sw.name.clone().unwrap_or_default() })
        .collect();

    let pointer_shadow: Option<DropShadow> = match &cli.pointer_shadow {
        None => None,
        Some(None) => Some(DropShadow {
            target: ShadowTarget::Svg,
            blur: 2.0,
            dx: 0.0,
            dy: 2.0,
            opacity: 0.5,
            color: 0xFF00_0000,
        }),
        Some(Some(s)) => Some(DropShadow {
            target: ShadowTarget::Svg,
            blur: s.blur,
            dx: s.dx,
            dy: s.dy,
            opacity: s.opacity,
            color: s.color,
        }),
    };

    let sizes: Vec<SizeScheme> = cli.size_schemes.iter().map(size_scheme_from_arg).collect();

    let themes = variants::expand(
        &sources,
        &strokes,
        cli.default_stroke_also,
        pointer_shadow,
        cli.no_shadow_also,
        &colors,
        &sizes,
    )?;

    let animations = animations_file
        .0
        .into_iter()
        .map(|(name, entry)| {
            let anim = Animation::from_millis(name.clone(), entry.frames, entry.duration);
            (name, anim)
        })
        .collect();

    let windows_cursor_names = match &cli.windows_cursors {
        Some(Some(path)) => Some(read_name_map(path)?),
        Some(None) => Some(BTreeMap::new()),
        None => None,
    };
    let linux_cursor_names = match &cli.linux_cursors {
        Some(Some(path)) => Some(read_name_map(path)?),
        Some(None) => Some(BTreeMap::new()),
        None => None,
    };
    let macos_cursor_names = match &cli.macos_cursors {
        Some(Some(path)) => Some(read_name_map(path)?),
        Some(None) => Some(BTreeMap::new()),
        None => None,
    };

    let cursor_aliases = match &cli.cursor_aliases {
        Some(path) => {
            let file: CursorAliasesFile = read_json_file(path)?;
            file.0
        }
        None => BTreeMap::new(),
    };

    let build_dir = cli.build_dir.clone().unwrap_or_else(|| project.join("build"));

    Ok(LoadedProject {
        themes,
        animations,
        windows_cursor_names,
        linux_cursor_names,
        cursor_aliases,
        macos_cursor_names,
        build_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_scheme_preset_resolves_known_names() {
        let s = size_scheme_from_arg(&SizeSchemeArg::Preset("L".to_string()));
        assert_eq!(s, SizeScheme::large());
    }

    #[test]
    fn missing_manifest_files_default_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cli = CliArgs {
            project_path: dir.path().to_path_buf(),
            build_dir: None,
            sources: vec![dir.path().join("svg")],
            names: vec!["Demo".to_string()],
            animations_file: None,
            colors: vec![],
            color_map: None,
            windows_cursors: None,
            linux_cursors: None,
            cursor_aliases: None,
            macos_cursors: None,
            pointer_shadow: None,
            no_shadow_also: false,
            stroke_widths: vec![],
            default_stroke_also: false,
            base_stroke_width: 16.0,
            min_stroke_width: 1.0,
            expand_fill: None,
            thin_stroke: false,
            all_variants: false,
            size_schemes: vec![],
            resolutions: vec![],
            themes: vec![],
            cursors: vec![],
            all_cursors: false,
            update_existing: false,
            verbosity: 0,
        };

        let loaded = load(&cli).unwrap();
        assert_eq!(loaded.themes.len(), 1);
        assert_eq!(loaded.themes[0].name, "Demo");
        assert!(loaded.animations.is_empty());
    }

    #[test]
    fn render_json_entry_overrides_win_over_cli_axis_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("render.json"),
            r#"{"Default": {"dir": "svg", "sizes": ["XL"], "resolutions": [16, 24],
                "colors": [{"match": "#000000", "replace": "#ffffff"}]}}"#,
        )
        .unwrap();

        let cli = CliArgs {
            project_path: dir.path().to_path_buf(),
            build_dir: None,
            sources: vec![],
            names: vec![],
            animations_file: None,
            colors: vec![],
            color_map: None,
            windows_cursors: None,
            linux_cursors: None,
            cursor_aliases: None,
            macos_cursors: None,
            pointer_shadow: None,
            no_shadow_also: false,
            stroke_widths: vec![],
            default_stroke_also: false,
            base_stroke_width: 16.0,
            min_stroke_width: 1.0,
            expand_fill: None,
            thin_stroke: false,
            all_variants: false,
            size_schemes: vec![SizeSchemeArg::Preset("L".to_string())],
            resolutions: vec![32, 48],
            themes: vec![],
            cursors: vec![],
            all_cursors: false,
            update_existing: false,
            verbosity: 0,
        };

        let loaded = load(&cli).unwrap();
        assert_eq!(loaded.themes.len(), 1);
        let theme = &loaded.themes[0];
        assert_eq!(theme.size_scheme, SizeScheme::extra_large());
        assert_eq!(theme.resolutions, Some(vec![16, 24]));
        assert_eq!(theme.colors.as_ref().unwrap().get("#000000"), Some(&"#ffffff".to_string()));
    }

    #[test]
    fn unnamed_cli_sources_sharing_a_dir_use_the_extracted_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let svg_dir = dir.path().join("svg");
        fs::create_dir_all(&svg_dir).unwrap();

        let cli = CliArgs {
            project_path: dir.path().to_path_buf(),
            build_dir: None,
            sources: vec![svg_dir.clone(), svg_dir.clone()],
            names: vec![],
            animations_file: None,
            colors: vec![],
            color_map: None,
            windows_cursors: None,
            linux_cursors: None,
            cursor_aliases: None,
            macos_cursors: None,
            pointer_shadow: None,
            no_shadow_also: false,
            stroke_widths: vec![],
            default_stroke_also: false,
            base_stroke_width: 16.0,
            min_stroke_width: 1.0,
            expand_fill: None,
            thin_stroke: false,
            all_variants: false,
            size_schemes: vec![],
            resolutions: vec![],
            themes: vec![],
            cursors: vec![],
            all_cursors: false,
            update_existing: false,
            verbosity: 0,
        };

        let loaded = load(&cli).unwrap();
        // neither `--source` got a `--name`, so both defer to the dir-leaf
        // prefix extraction; pointed at the same directory with no axis
        // spread, the second is also a genuine duplicate render job.
        assert_eq!(loaded.themes.len(), 1);
        assert_eq!(loaded.themes[0].name, "svg");
    }
}
