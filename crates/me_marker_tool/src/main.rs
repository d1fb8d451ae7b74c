mod config;
mod report;

use cap_std::{ambient_authority, fs_utf8::Dir};
use me_core::init::{get_data_dir, load_json_config};
use me_core::trace::{install_miette_panic_hooks, install_tracing};
use me_marker::{
    io::load_marker_file, LayoutContext, MarkerDescriptor, MarkerLayer, TextureCache,
};
use miette::{bail, Context, IntoDiagnostic, Result};
use tracing::{info, warn};

use config::{ToolConfig, TOOL_CONFIG_NAME};

const USAGE: &str = "usage: me_marker_tool <markers.json> [level]";

fn main() -> Result<()> {
    let (data_dir_path, data_dir) = get_data_dir()?;
    let _guard = install_tracing(&data_dir)?;
    install_miette_panic_hooks()?;
    info!("Application Name: {}", env!("CARGO_PKG_NAME"));
    info!("Application Version: {}", env!("CARGO_PKG_VERSION"));
    info!(?data_dir_path, "using data directory");

    let mut args = std::env::args().skip(1);
    let Some(markers_path) = args.next() else {
        bail!(USAGE);
    };
    let mut config: ToolConfig = load_json_config(&data_dir, TOOL_CONFIG_NAME)?;
    if let Some(level) = args.next() {
        config.level = level
            .parse()
            .into_diagnostic()
            .wrap_err_with(|| format!("invalid level: {level}. {USAGE}"))?;
    }

    let mut cache = TextureCache::new();
    if data_dir.exists(&config.texture_dir) {
        let texture_dir = data_dir
            .open_dir(&config.texture_dir)
            .into_diagnostic()
            .wrap_err("failed to open texture directory")?;
        for (file_name, e) in cache.load_dir(&texture_dir)? {
            warn!(?e, %file_name, "failed to load texture");
        }
    } else {
        warn!(texture_dir = %config.texture_dir, "texture directory doesn't exist");
    }

    let markers_path = std::path::Path::new(&markers_path);
    let parent = match markers_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => std::path::Path::new("."),
    };
    let (Some(parent), Some(file_name)) = (
        parent.to_str(),
        markers_path.file_name().and_then(|name| name.to_str()),
    ) else {
        bail!("marker file path is not utf-8: {markers_path:?}");
    };
    let markers_dir = Dir::open_ambient_dir(parent, ambient_authority())
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to open directory {parent}"))?;
    let file = load_marker_file(&markers_dir, file_name)?;

    let descriptors = file.descriptors();
    for marker in descriptors.iter() {
        for warning in marker.validate() {
            warn!(name = %marker.name, %warning, "marker validation");
        }
    }

    let layer = MarkerLayer::new(config.layer.clone());
    let context = layer.context(config.level, config.map_heading);
    let default_image = config.default_image.clone();
    let mut delegate = |marker: &mut MarkerDescriptor, _context: &LayoutContext| {
        if marker.cached_image_name.is_none() {
            marker.cached_image_name = default_image.clone();
        }
    };
    let engine_output = layer.layout_engine_managed(&file.records, &mut delegate, &cache, &context);
    let descriptor_output = layer.layout_descriptors(descriptors.iter(), &cache, &context);

    report::print_output("engine managed markers", &engine_output);
    report::print_output("markers", &descriptor_output);
    info!(
        resolved = engine_output.markers.len() + descriptor_output.markers.len(),
        skipped = engine_output.skipped.len() + descriptor_output.skipped.len(),
        "layout pass done"
    );
    Ok(())
}
