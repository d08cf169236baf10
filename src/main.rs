// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `cursorsmith`: renders platform-native mouse-cursor themes from SVG
//! drawings and a declarative manifest.

mod animation;
mod cli;
mod driver;
mod error;
mod hotspots;
mod logger;
mod manifest;
mod raster;
mod renderer;

use error::Error;

/// The only `RasterBackend` this binary ships with: a placeholder that
/// rejects every document. A real build wires in an actual SVG rasterizer
/// here; the rest of the pipeline is agnostic to which one.
struct UnimplementedRasterBackend;

impl raster::RasterBackend for UnimplementedRasterBackend {
    fn rasterize(&self, _svg: &xmltree::Element, _size: u32) -> Result<raster::RasterImage, raster::RasterError> {
        Err(raster::RasterError::Backend(
            "no SVG rasterizer backend is linked into this build".to_string(),
        ))
    }
}

fn run() -> Result<(), Error> {
    let raw_args: Vec<String> = std::env::args().skip(1).collect();
    let cli_args = cli::collect_args(raw_args)?;

    logger::init(cli_args.verbosity);

    let project = manifest::load(&cli_args)?;
    log::info!("{} theme(s) to render", project.themes.len());

    let raster = UnimplementedRasterBackend;
    driver::run(&project, &cli_args, &raster)
}

fn main() {
    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(e.exit_code());
    }
}
