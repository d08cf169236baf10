// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Geometry, metadata, and configuration model shared by the cursor theme
//! renderer: view-box/transform math, anchor-bias parsing, the sizing and
//! alignment engine, the SVG transformer pipeline, and the variant
//! expansion engine that turns a manifest into concrete rendering jobs.

pub mod anchor;
pub mod config;
pub mod geom;
pub mod metadata;
pub mod numbers;
pub mod path;
pub mod sizing;
pub mod transform_pipeline;
pub mod variants;

pub use anchor::{AnchorPoint, Bias, BiasMode, InvalidBias};
pub use config::{
    Animation, ColorReplace, ConfigError, DropShadow, RenderManifest, ShadowTarget, StrokeWidth,
    ThemeConfig, ThemeManifestEntry,
};
pub use geom::{Rect, Transform};
pub use metadata::{extract_metadata, SvgError, SvgMetadata};
pub use path::{ElementPath, PathStep};
pub use sizing::{compute_alignment, AlignmentError, AlignmentInput, Alignment, SizeScheme};
pub use transform_pipeline::Pipeline;
pub use variants::{expand, ColorOption, SourceConfig};
