use serde::{Deserialize, Serialize};
use std::path::Path;

/// Horizontal and vertical clearance inserted between a node's far edge and
/// the next node, in layout units.
pub const DEFAULT_GAP: f32 = 30.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub gap: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self { gap: DEFAULT_GAP }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub layout: LayoutConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    gap: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    layout: Option<LayoutConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed = parse_config_file(&contents)?;

    if let Some(layout) = parsed.layout {
        if let Some(gap) = layout.gap {
            if !gap.is_finite() || gap < 0.0 {
                return Err(anyhow::anyhow!(
                    "layout.gap must be a finite, non-negative number (got {gap})"
                ));
            }
            config.layout.gap = gap;
        }
    }

    Ok(config)
}

fn parse_config_file(contents: &str) -> anyhow::Result<ConfigFile> {
    match serde_json::from_str::<ConfigFile>(contents) {
        Ok(parsed) => Ok(parsed),
        // Hand-written configs may carry comments or trailing commas.
        Err(json_err) => json5::from_str::<ConfigFile>(contents)
            .map_err(|_| anyhow::anyhow!("invalid config file: {json_err}")),
    }
}
