use me_core::prelude::*;
use me_marker::MarkerLayerConfig;

pub const TOOL_CONFIG_NAME: &str = "tool_config.json";

/// Configuration of the marker tool. lives in the data directory as `tool_config.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub layer: MarkerLayerConfig,
    /// directory (relative to the data dir) with png files. each png is cached under its file stem.
    pub texture_dir: String,
    /// cached image name that the delegate gives to engine managed markers.
    pub default_image: Option<SmolStr>,
    /// zoom level for the layout pass, unless given on the command line
    pub level: u32,
    /// map rotation in degrees
    pub map_heading: f64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            layer: MarkerLayerConfig::default(),
            texture_dir: "textures".to_string(),
            default_image: None,
            level: 0,
            map_heading: 0.0,
        }
    }
}
