// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! CLI parsing, in the teacher binary's own style: a hand-rolled pass over
//! `pico_args::Arguments`, not a declarative derive macro.

use std::path::PathBuf;

use crate::error::Error;

pub const HELP: &str = "\
cursorsmith renders platform-native mouse-cursor themes from SVG drawings
and a declarative theme manifest.

USAGE:
  cursorsmith render [<project-path>] [OPTIONS]

OPTIONS:
      --build-dir <dir>          Output directory [default: <project-path>/build]
      --source <svg-dir>         Adds an ad-hoc SVG source directory (repeatable)
      --name <theme-name>        Names the ad-hoc source directory added by the
                                  preceding --source (repeatable, paired in order)
      --animations <file>        Path to animations.json [default: animations.json]
      --color <palette>         Selects a named palette from colors.json as a
                                  color-axis option (repeatable)
      --color-map <file>         Path to colors.json [default: colors.json]
      --windows-cursors[=<file>] Render Windows CUR/ANI output, optionally with a
                                  cursor-name map file
      --linux-cursors[=<file>]   Render Xcursor output, optionally with a
                                  cursor-name map file
      --cursor-aliases <file>    Path to cursor-aliases.json, resolved into
                                  Xcursor symlink aliases
      --macos-cursors[=<file>]   Render a Mousecape .cape bundle, optionally
                                  with a cursor-name map file
      --pointer-shadow[=<p>]     Adds a drop-shadow variant; <p> is
                                  'blur,dx,dy,opacity,aarrggbb'
      --no-shadow-also           Also emit the shadow-less variant
      --stroke-width=<w>[:<n>]   Adds a stroke-width variant (repeatable)
      --default-stroke-also      Also emit the base-stroke-width variant
      --base-stroke-width <w>    Overrides the base stroke width [default: 16]
      --min-stroke-width <w>     Hair-width promotion threshold [default: 1]
      --expand-fill[=<limit>]    Enables fill-offset promotion
      --thin-stroke               Forces the thin-stroke pass even at base width
      --all-variants             Expands the full cartesian product regardless
                                  of -t/-f filters
  -s <size-scheme>                Adds a size scheme: Source|N|L|XL or
                                  name:canvas:nominal[:permanent] (repeatable)
  -r <target-size>                Adds a target pixel resolution (repeatable)
  -t <theme>                      Restricts rendering to this manifest theme
                                  (repeatable)
  -f <cursor>                     Restricts rendering to this cursor name
                                  (repeatable)
      --all-cursors               Disables the -f cursor filter
      --update-existing            Skip rewriting a cursor whose existing output
                                  already matches
  -v                               Raises log verbosity (repeatable)
  -q                               Lowers log verbosity
      --help                       Prints this help
";

#[derive(Clone, Debug, PartialEq)]
pub struct StrokeWidthArg {
    pub value: f64,
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShadowArg {
    pub blur: f64,
    pub dx: f64,
    pub dy: f64,
    pub opacity: f64,
    pub color: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SizeSchemeArg {
    Preset(String),
    Custom { name: String, canvas: f64, nominal: f64, permanent: bool },
}

#[derive(Debug)]
pub struct CliArgs {
    pub project_path: PathBuf,
    pub build_dir: Option<PathBuf>,
    pub sources: Vec<PathBuf>,
    pub names: Vec<String>,
    pub animations_file: Option<PathBuf>,
    pub colors: Vec<String>,
    pub color_map: Option<PathBuf>,
    pub windows_cursors: Option<Option<PathBuf>>,
    pub linux_cursors: Option<Option<PathBuf>>,
    pub cursor_aliases: Option<PathBuf>,
    pub macos_cursors: Option<Option<PathBuf>>,
    pub pointer_shadow: Option<Option<ShadowArg>>,
    pub no_shadow_also: bool,
    pub stroke_widths: Vec<StrokeWidthArg>,
    pub default_stroke_also: bool,
    pub base_stroke_width: f64,
    pub min_stroke_width: f64,
    pub expand_fill: Option<Option<f64>>,
    pub thin_stroke: bool,
    pub all_variants: bool,
    pub size_schemes: Vec<SizeSchemeArg>,
    pub resolutions: Vec<u32>,
    pub themes: Vec<String>,
    pub cursors: Vec<String>,
    pub all_cursors: bool,
    pub update_existing: bool,
    pub verbosity: i32,
}

/// Scans `args` for a flag that may carry an inline `=value`, removing the
/// matched token. Returns `Some(None)` for a bare flag, `Some(Some(v))` for
/// `--flag=v`, `None` if the flag was not present at all. Kept as an
/// explicit pre-pass rather than relying on `pico_args`'s value parsing,
/// since these flags' value is optional (a plain `opt_value_from_str` call
/// would require one).
fn take_optional_value_flag(args: &mut Vec<String>, flag: &str) -> Option<Option<String>> {
    let prefix = format!("{flag}=");
    let pos = args.iter().position(|a| a == flag || a.starts_with(&prefix))?;
    let raw = args.remove(pos);
    if raw == flag {
        Some(None)
    } else {
        Some(Some(raw[prefix.len()..].to_string()))
    }
}

fn parse_stroke_width(s: &str) -> Result<StrokeWidthArg, String> {
    match s.split_once(':') {
        Some((value, name)) => {
            let value: f64 = value.parse().map_err(|_| format!("invalid stroke width '{value}'"))?;
            Ok(StrokeWidthArg { value, name: Some(name.to_string()) })
        }
        None => {
            let value: f64 = s.parse().map_err(|_| format!("invalid stroke width '{s}'"))?;
            Ok(StrokeWidthArg { value, name: None })
        }
    }
}

fn parse_shadow(s: &str) -> Result<ShadowArg, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 5 {
        return Err("expected 'blur,dx,dy,opacity,aarrggbb'".to_string());
    }
    let blur: f64 = parts[0].parse().map_err(|_| "invalid blur".to_string())?;
    let dx: f64 = parts[1].parse().map_err(|_| "invalid dx".to_string())?;
    let dy: f64 = parts[2].parse().map_err(|_| "invalid dy".to_string())?;
    let opacity: f64 = parts[3].parse().map_err(|_| "invalid opacity".to_string())?;
    let color = u32::from_str_radix(parts[4].trim_start_matches("0x"), 16)
        .map_err(|_| "invalid aarrggbb color".to_string())?;
    Ok(ShadowArg { blur, dx, dy, opacity, color })
}

fn parse_size_scheme(s: &str) -> Result<SizeSchemeArg, String> {
    if matches!(s, "Source" | "N" | "L" | "XL") {
        return Ok(SizeSchemeArg::Preset(s.to_string()));
    }

    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() < 3 {
        return Ok(SizeSchemeArg::Preset(s.to_string()));
    }

    let canvas: f64 = parts[1].parse().map_err(|_| format!("invalid canvas size in '{s}'"))?;
    let nominal: f64 = parts[2].parse().map_err(|_| format!("invalid nominal size in '{s}'"))?;
    let permanent = parts.get(3).map(|p| *p == "permanent").unwrap_or(false);
    Ok(SizeSchemeArg::Custom { name: parts[0].to_string(), canvas, nominal, permanent })
}

pub fn collect_args(raw: Vec<String>) -> Result<CliArgs, Error> {
    let mut raw = raw;

    if raw.first().map(String::as_str) == Some("render") {
        raw.remove(0);
    }

    let windows_cursors = take_optional_value_flag(&mut raw, "--windows-cursors").map(|v| v.map(PathBuf::from));
    let linux_cursors = take_optional_value_flag(&mut raw, "--linux-cursors").map(|v| v.map(PathBuf::from));
    let macos_cursors = take_optional_value_flag(&mut raw, "--macos-cursors").map(|v| v.map(PathBuf::from));
    let pointer_shadow = match take_optional_value_flag(&mut raw, "--pointer-shadow") {
        Some(Some(v)) => Some(Some(parse_shadow(&v).map_err(Error::Arg)?)),
        Some(None) => Some(None),
        None => None,
    };
    let expand_fill = match take_optional_value_flag(&mut raw, "--expand-fill") {
        Some(Some(v)) => Some(Some(v.parse::<f64>().map_err(|_| Error::Arg(format!("invalid --expand-fill limit '{v}'")))?)),
        Some(None) => Some(None),
        None => None,
    };

    let mut input = pico_args::Arguments::from_vec(raw.into_iter().map(std::ffi::OsString::from).collect());

    if input.contains("--help") {
        print!("{HELP}");
        std::process::exit(0);
    }

    let verbosity = {
        let mut v = 0i32;
        while input.contains("-v") {
            v += 1;
        }
        while input.contains("-q") {
            v -= 1;
        }
        v
    };

    let args = CliArgs {
        build_dir: input.opt_value_from_str("--build-dir")?,
        sources: input.values_from_str("--source")?,
        names: input.values_from_str("--name")?,
        animations_file: input.opt_value_from_str("--animations")?,
        colors: input.values_from_str("--color")?,
        color_map: input.opt_value_from_str("--color-map")?,
        windows_cursors,
        linux_cursors,
        cursor_aliases: input.opt_value_from_str("--cursor-aliases")?,
        macos_cursors,
        pointer_shadow,
        no_shadow_also: input.contains("--no-shadow-also"),
        stroke_widths: input.values_from_fn("--stroke-width", parse_stroke_width)?,
        default_stroke_also: input.contains("--default-stroke-also"),
        base_stroke_width: input.opt_value_from_str("--base-stroke-width")?.unwrap_or(cursorsmith_model::config::BASE_STROKE_WIDTH),
        min_stroke_width: input.opt_value_from_str("--min-stroke-width")?.unwrap_or(1.0),
        expand_fill,
        thin_stroke: input.contains("--thin-stroke"),
        all_variants: input.contains("--all-variants"),
        size_schemes: input.values_from_fn("-s", parse_size_scheme)?,
        resolutions: input.values_from_str("-r")?,
        themes: input.values_from_str("-t")?,
        cursors: input.values_from_str("-f")?,
        all_cursors: input.contains("--all-cursors"),
        update_existing: input.contains("--update-existing"),
        verbosity,
        project_path: input.opt_free_from_str()?.unwrap_or_else(|| PathBuf::from(".")),
    };

    let remaining = input.finish();
    if !remaining.is_empty() {
        return Err(Error::Arg(format!("unexpected arguments: {remaining:?}")));
    }

    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stroke_width_with_name() {
        let sw = parse_stroke_width("20:Thick").unwrap();
        assert_eq!(sw, StrokeWidthArg { value: 20.0, name: Some("Thick".to_string()) });
    }

    #[test]
    fn parses_stroke_width_without_name() {
        let sw = parse_stroke_width("8").unwrap();
        assert_eq!(sw, StrokeWidthArg { value: 8.0, name: None });
    }

    #[test]
    fn parses_shadow_params() {
        let s = parse_shadow("2,1,1,0.5,ff000000").unwrap();
        assert_eq!(s, ShadowArg { blur: 2.0, dx: 1.0, dy: 1.0, opacity: 0.5, color: 0xFF000000 });
    }

    #[test]
    fn optional_value_flag_detects_bare_and_inline() {
        let mut args = vec!["--windows-cursors".to_string(), "-t".to_string(), "Default".to_string()];
        assert_eq!(take_optional_value_flag(&mut args, "--windows-cursors"), Some(None));
        assert_eq!(args, vec!["-t".to_string(), "Default".to_string()]);

        let mut args = vec!["--windows-cursors=names.json".to_string()];
        assert_eq!(
            take_optional_value_flag(&mut args, "--windows-cursors"),
            Some(Some("names.json".to_string()))
        );
    }

    #[test]
    fn size_scheme_preset_vs_custom() {
        assert_eq!(parse_size_scheme("L").unwrap(), SizeSchemeArg::Preset("L".to_string()));
        assert_eq!(
            parse_size_scheme("Huge:2.0:2.0:permanent").unwrap(),
            SizeSchemeArg::Custom { name: "Huge".to_string(), canvas: 2.0, nominal: 2.0, permanent: true }
        );
    }
}
