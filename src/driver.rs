// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Theme driver (C7): walks each theme's source directory, dispatches every
//! cursor to the renderer, flushes animation frames once complete, and
//! hands finished frames to the container writers for whichever platforms
//! were requested. Themes render in parallel — each owns a disjoint output
//! directory, so there is no shared mutable state across the `rayon`
//! fan-out except stderr logging.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cursorsmith_containers::cur::{write_cur, write_ico};
use cursorsmith_containers::ani::write_ani;
use cursorsmith_containers::mousecape::{write_cape, CapeMeta, CursorEntry, Representation};
use cursorsmith_containers::xcursor::{render_config, render_index_theme, resolve_aliases, ConfigLine, CursorAlias};
use cursorsmith_containers::CursorImage;
use cursorsmith_model::config::{Animation, ThemeConfig};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::animation::split_frame_suffix;
use crate::error::Error;
use crate::hotspots::{Hotspot, HotspotLedger};
use crate::manifest::LoadedProject;
use crate::raster::RasterBackend;
use crate::renderer::{CursorRenderer, RenderedFrame};

/// One SVG source file discovered under a theme's directory.
struct SourceFile {
    path: PathBuf,
    cursor_name: String,
    frame_index: Option<u32>,
}

fn discover_sources(dir: &Path, cursor_filter: Option<&[String]>) -> Vec<SourceFile> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("svg") {
            continue;
        }
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let (cursor_name, frame_index) = split_frame_suffix(stem);

        if let Some(filter) = cursor_filter {
            if !filter.iter().any(|c| c == &cursor_name) {
                continue;
            }
        }

        files.push(SourceFile { path: path.to_path_buf(), cursor_name, frame_index });
    }
    files
}

/// Renders one theme's every cursor at every target resolution, returning
/// the finished frames grouped by cursor name.
fn render_theme(
    theme: &ThemeConfig,
    resolutions: &[u32],
    animations: &BTreeMap<String, Animation>,
    base_stroke_width: f64,
    min_stroke_width: f64,
    fill_offset: f64,
    raster: &dyn RasterBackend,
) -> Result<BTreeMap<String, Vec<RenderedFrame>>, Error> {
    let cursor_filter = theme.cursors.as_deref();
    let sources = discover_sources(Path::new(&theme.dir), cursor_filter);

    let targets: Vec<f64> = if resolutions.is_empty() {
        vec![32.0]
    } else {
        resolutions.iter().map(|&r| r as f64).collect()
    };

    let mut by_cursor: BTreeMap<String, Vec<SourceFile>> = BTreeMap::new();
    for file in sources {
        by_cursor.entry(file.cursor_name.clone()).or_default().push(file);
    }

    let mut rendered: BTreeMap<String, Vec<RenderedFrame>> = BTreeMap::new();

    for (cursor_name, mut files) in by_cursor {
        files.sort_by_key(|f| f.frame_index.unwrap_or(0));

        let mut renderer = CursorRenderer::load_file(&files[0].path)?;
        renderer.set_colors(theme.colors.clone());
        renderer.set_stroke_width(theme.stroke_width.value, base_stroke_width, min_stroke_width);
        renderer.set_pointer_shadow(theme.pointer_shadow);
        renderer.set_fill_offset(fill_offset);
        renderer.set_canvas_size(theme.size_scheme.canvas_size, theme.size_scheme.permanent);

        let mut frames = Vec::new();
        for (index, file) in files.iter().enumerate() {
            // Every frame is its own SVG document; only the first reuses the
            // renderer already loaded above.
            let mut loaded_here = None;
            let active = if index == 0 {
                &mut renderer
            } else {
                let mut r = CursorRenderer::load_file(&file.path)?;
                r.set_colors(theme.colors.clone());
                r.set_stroke_width(theme.stroke_width.value, base_stroke_width, min_stroke_width);
                r.set_pointer_shadow(theme.pointer_shadow);
                r.set_fill_offset(fill_offset);
                r.set_canvas_size(theme.size_scheme.canvas_size, theme.size_scheme.permanent);
                loaded_here = Some(r);
                loaded_here.as_mut().unwrap()
            };

            let images = active.render_target_sizes(&targets, raster)?;

            match file.frame_index {
                None => frames.push(active.save_current(cursor_name.clone(), images)),
                Some(idx) => {
                    active.save_deferred(cursor_name.clone(), idx, images);
                    frames.extend(active.take_deferred(&cursor_name));
                }
            }
        }

        let is_animated = files.len() > 1 || files.iter().any(|f| f.frame_index.is_some());
        if is_animated && !animations.contains_key(&cursor_name) {
            log::warn!(
                "'{cursor_name}' has {} animation frame(s) but no matching entry in animations.json; \
                 defaulting to a 6-jiffy (100ms) frame duration",
                files.len()
            );
        }

        rendered.insert(cursor_name, frames);
    }

    Ok(rendered)
}

/// `(width, height, hotspot)` per image, used to compare a freshly rendered
/// set of frames against what an existing CUR/ANI file already on disk
/// decodes to.
fn image_signature(images: &[CursorImage]) -> Vec<(u32, u32, (u16, u16))> {
    images.iter().map(|i| (i.width, i.height, i.hotspot)).collect()
}

fn existing_cur_matches(path: &Path, images: &[CursorImage]) -> bool {
    std::fs::read(path)
        .ok()
        .and_then(|bytes| cursorsmith_containers::cur::read_cur(&bytes).ok())
        .map(|existing| image_signature(&existing) == image_signature(images))
        .unwrap_or(false)
}

fn existing_ani_matches(path: &Path, images: &[CursorImage]) -> bool {
    std::fs::read(path)
        .ok()
        .and_then(|bytes| cursorsmith_containers::ani::read_ani(&bytes).ok())
        .map(|parsed| image_signature(&parsed.frames) == image_signature(images))
        .unwrap_or(false)
}

fn write_windows_outputs(
    out_dir: &Path,
    cursor_name: &str,
    frames: &[RenderedFrame],
    animations: &BTreeMap<String, Animation>,
    name_map: &BTreeMap<String, String>,
    update_existing: bool,
) -> Result<(), Error> {
    std::fs::create_dir_all(out_dir)?;
    let target_name = name_map.get(cursor_name).cloned().unwrap_or_else(|| cursor_name.to_string());

    if frames.len() == 1 && frames[0].frame_index.is_none() {
        let cur_path = out_dir.join(format!("{target_name}.cur"));
        if update_existing && existing_cur_matches(&cur_path, &frames[0].images) {
            log::info!("'{target_name}' unchanged, skipping CUR/ICO rewrite");
            return Ok(());
        }

        let bytes = write_cur(&frames[0].images)?;
        std::fs::write(&cur_path, bytes)?;
        let ico_bytes = write_ico(&frames[0].images)?;
        std::fs::write(out_dir.join(format!("{target_name}.ico")), ico_bytes)?;
        return Ok(());
    }

    let largest_per_frame: Vec<CursorImage> =
        frames.iter().filter_map(|f| f.images.last().cloned()).collect();
    let ani_path = out_dir.join(format!("{target_name}.ani"));
    if update_existing && existing_ani_matches(&ani_path, &largest_per_frame) {
        log::info!("'{target_name}' unchanged, skipping ANI rewrite");
        return Ok(());
    }

    let jiffies = animations.get(cursor_name).map(|a| a.jiffies).unwrap_or(6);
    let bytes = write_ani(&largest_per_frame, jiffies)?;
    std::fs::write(&ani_path, bytes)?;
    Ok(())
}

/// Writes each alias group's extra filenames as relative symlinks onto the
/// concrete cursor's `.config`, falling back to a plain file copy on
/// platforms without `std::os::unix::fs::symlink` (e.g. a Windows build
/// host).
fn link_alias(cursors_dir: &Path, concrete_name: &str, alias_name: &str) -> Result<(), Error> {
    let concrete_path = cursors_dir.join(format!("{concrete_name}.config"));
    let alias_path = cursors_dir.join(format!("{alias_name}.config"));
    if !concrete_path.exists() {
        return Ok(());
    }
    let _ = std::fs::remove_file(&alias_path);

    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(format!("{concrete_name}.config"), &alias_path)?;
    }
    #[cfg(not(unix))]
    {
        std::fs::copy(&concrete_path, &alias_path)?;
    }
    Ok(())
}

fn write_linux_outputs(
    out_dir: &Path,
    theme_name: &str,
    all_frames: &BTreeMap<String, Vec<RenderedFrame>>,
    resolutions: &[u32],
    name_map: &BTreeMap<String, String>,
    aliases: &BTreeMap<String, Vec<String>>,
) -> Result<(), Error> {
    let cursors_dir = out_dir.join("cursors");
    std::fs::create_dir_all(&cursors_dir)?;

    let mut config_lines = Vec::new();
    for (cursor_name, frames) in all_frames {
        let target_name = name_map.get(cursor_name).cloned().unwrap_or_else(|| cursor_name.to_string());
        for frame in frames {
            for (size_index, image) in frame.images.iter().enumerate() {
                let nominal_size = resolutions.get(size_index).copied().unwrap_or(image.width);
                let filename = format!(
                    "{target_name}-{}x{}{}.png",
                    nominal_size,
                    nominal_size,
                    frame.frame_index.map(|i| format!("-{i}")).unwrap_or_default()
                );
                std::fs::write(
                    cursors_dir.join(&filename),
                    cursorsmith_containers::image::encode_png(image.width, image.height, &image.rgba)?,
                )?;

                config_lines.push(ConfigLine {
                    nominal_size,
                    hotspot: (image.hotspot.0 as u32, image.hotspot.1 as u32),
                    filename,
                    delay_ms: None,
                    num_colors: image.color_count().unwrap_or(255),
                    frame_no: frame.frame_index.unwrap_or(0),
                });
            }
        }

        let config_path = cursors_dir.join(format!("{target_name}.config"));
        std::fs::write(&config_path, render_config(&config_lines, &[]))?;
        config_lines.clear();
    }

    let groups: Vec<CursorAlias> = all_frames
        .keys()
        .filter_map(|cursor_name| {
            let target_name = name_map.get(cursor_name).cloned().unwrap_or_else(|| cursor_name.to_string());
            let extra = aliases.get(cursor_name).or_else(|| aliases.get(&target_name))?;
            let mut names = vec![target_name];
            names.extend(extra.iter().cloned());
            Some(CursorAlias { names })
        })
        .collect();
    for (concrete_name, alias_names) in resolve_aliases(&groups) {
        for alias_name in alias_names {
            link_alias(&cursors_dir, &concrete_name, &alias_name)?;
        }
    }

    let index_theme = render_index_theme(theme_name, "Generated cursor theme", &[]);
    std::fs::write(out_dir.join("index.theme"), index_theme)?;
    Ok(())
}

/// Writes one theme's Mousecape `.cape` bundle: each cursor becomes a
/// `Cursors` entry whose representations are that cursor's per-resolution
/// animation-frame filmstrips, smallest resolution first.
fn write_macos_outputs(
    out_dir: &Path,
    theme_name: &str,
    all_frames: &BTreeMap<String, Vec<RenderedFrame>>,
    animations: &BTreeMap<String, Animation>,
    name_map: &BTreeMap<String, String>,
) -> Result<(), Error> {
    std::fs::create_dir_all(out_dir)?;

    let mut cursors = Vec::new();
    for (cursor_name, frames) in all_frames {
        let resolution_count = frames.first().map(|f| f.images.len()).unwrap_or(0);
        if resolution_count == 0 {
            continue;
        }

        let mut representations: Vec<Representation> = (0..resolution_count)
            .map(|size_index| Representation {
                frames: frames.iter().filter_map(|f| f.images.get(size_index).cloned()).collect(),
            })
            .collect();
        representations.sort_by_key(|r| r.frames.first().map(|f| f.width).unwrap_or(0));

        let identifier = name_map
            .get(cursor_name)
            .cloned()
            .unwrap_or_else(|| format!("com.apple.cursor.{cursor_name}"));
        let frame_duration_secs =
            animations.get(cursor_name).map(|a| a.jiffies as f64 / 60.0).unwrap_or(0.0);

        cursors.push(CursorEntry { identifier, frame_duration_secs, representations });
    }

    let meta = CapeMeta {
        author: "cursorsmith".to_string(),
        cape_name: theme_name.to_string(),
        cape_version: 1.0,
        cloud: false,
        hidpi: true,
        identifier: format!("com.cursorsmith.{theme_name}"),
    };

    let plist = write_cape(&meta, &cursors)?;
    std::fs::write(out_dir.join(format!("{theme_name}.cape")), plist)?;
    Ok(())
}

/// Renders and writes every theme in `project`, in parallel across themes.
pub fn run(
    project: &LoadedProject,
    cli: &crate::cli::CliArgs,
    raster: &(dyn RasterBackend + Sync),
) -> Result<(), Error> {
    let results: Vec<Result<(), Error>> = project
        .themes
        .par_iter()
        .map(|theme| -> Result<(), Error> {
            log::info!("rendering theme '{}'", theme.name);

            let out_dir = project.build_dir.join(&theme.out);
            std::fs::create_dir_all(&out_dir)?;

            let mut ledger = HotspotLedger::load(&out_dir)?;

            // `render.json`'s own per-theme `resolutions` field overrides
            // the CLI's `-r` defaults when set.
            let resolutions: Vec<u32> = theme.resolutions.clone().unwrap_or_else(|| cli.resolutions.clone());

            let rendered = render_theme(
                theme,
                &resolutions,
                &project.animations,
                cli.base_stroke_width,
                cli.min_stroke_width,
                cli.expand_fill.flatten().unwrap_or(0.0),
                raster,
            )?;

            for (cursor_name, frames) in &rendered {
                if let Some(first) = frames.first().and_then(|f| f.images.first()) {
                    ledger.set(cursor_name.clone(), Hotspot { x: first.hotspot.0, y: first.hotspot.1 });
                }
            }

            if let Some(name_map) = &project.windows_cursor_names {
                let win_dir = out_dir.join("windows");
                for (cursor_name, frames) in &rendered {
                    write_windows_outputs(
                        &win_dir,
                        cursor_name,
                        frames,
                        &project.animations,
                        name_map,
                        cli.update_existing,
                    )?;
                }
            }

            if let Some(name_map) = &project.linux_cursor_names {
                let linux_dir = out_dir.join("linux");
                write_linux_outputs(
                    &linux_dir,
                    &theme.name,
                    &rendered,
                    &resolutions,
                    name_map,
                    &project.cursor_aliases,
                )?;
            }

            if let Some(name_map) = &project.macos_cursor_names {
                let macos_dir = out_dir.join("macos");
                write_macos_outputs(&macos_dir, &theme.name, &rendered, &project.animations, name_map)?;
            }

            ledger.save(&out_dir)?;
            Ok(())
        })
        .collect();

    for result in results {
        result?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RenderedFrame;

    fn frame(name: &str) -> RenderedFrame {
        RenderedFrame {
            cursor_name: name.to_string(),
            frame_index: None,
            images: vec![CursorImage::new(32, 32, (4, 4), vec![0u8; 32 * 32 * 4])],
        }
    }

    #[test]
    fn linux_output_materializes_symlinked_aliases() {
        let dir = tempfile::tempdir().unwrap();
        let mut all_frames = BTreeMap::new();
        all_frames.insert("left_ptr".to_string(), vec![frame("left_ptr")]);

        let mut aliases = BTreeMap::new();
        aliases.insert("left_ptr".to_string(), vec!["default".to_string(), "arrow".to_string()]);

        write_linux_outputs(
            dir.path(),
            "Demo",
            &all_frames,
            &[32],
            &BTreeMap::new(),
            &aliases,
        )
        .unwrap();

        let cursors_dir = dir.path().join("cursors");
        assert!(cursors_dir.join("left_ptr.config").exists());
        for alias in ["default", "arrow"] {
            let alias_path = cursors_dir.join(format!("{alias}.config"));
            let meta = std::fs::symlink_metadata(&alias_path).unwrap();
            assert!(meta.file_type().is_symlink() || meta.len() > 0);
        }
    }

    #[test]
    fn render_theme_renders_every_frame_even_without_an_animations_entry() {
        let dir = tempfile::tempdir().unwrap();
        let svg = r#"<svg viewBox="0 0 32 32">
            <circle class="hotspot bias-center" cx="16" cy="16" r="0"/>
            <path d="M0,0" fill="#ff0000" stroke-width="16"/>
        </svg>"#;
        std::fs::write(dir.path().join("spin-00.svg"), svg).unwrap();
        std::fs::write(dir.path().join("spin-01.svg"), svg).unwrap();

        let theme = ThemeConfig {
            name: "Demo".to_string(),
            dir: dir.path().to_string_lossy().into_owned(),
            out: "demo".to_string(),
            colors: None,
            cursors: None,
            size_scheme: cursorsmith_model::sizing::SizeScheme::source(),
            stroke_width: cursorsmith_model::config::StrokeWidth::base(),
            pointer_shadow: None,
            resolutions: None,
        };

        let backend = crate::raster::test_support::SolidColorBackend { color: [0, 0, 0, 255] };
        // No "spin" entry in the animations map: render_theme should still
        // produce both frames and only log a warning, not fail.
        let rendered = render_theme(&theme, &[32], &BTreeMap::new(), 16.0, 1.0, 0.0, &backend).unwrap();

        assert_eq!(rendered.get("spin").map(|f| f.len()), Some(2));
    }

    #[test]
    fn missing_alias_entries_leave_the_theme_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut all_frames = BTreeMap::new();
        all_frames.insert("left_ptr".to_string(), vec![frame("left_ptr")]);

        write_linux_outputs(
            dir.path(),
            "Demo",
            &all_frames,
            &[32],
            &BTreeMap::new(),
            &BTreeMap::new(),
        )
        .unwrap();

        let cursors_dir = dir.path().join("cursors");
        assert!(cursors_dir.join("left_ptr.config").exists());
        assert!(!cursors_dir.join("default.config").exists());
    }
}
