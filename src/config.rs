use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::error::{InspectorError, InspectorResult};
use crate::grouping::GroupingConfig;

const DEFAULT_WAVE_COLOR: &str = "#3E80D1";

/// Captions for every inspector button and label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct InspectorLabels {
    pub previous_step: String,
    pub next_step: String,
    pub start: String,
    pub end: String,
    pub play: String,
    pub pause: String,
    pub channel_top: String,
    pub channel_bottom: String,
    pub zoom_in_selection: String,
    pub zoom_in: String,
    pub zoom_out: String,
    pub reset_zoom: String,
    pub zoom: String,
}

impl Default for InspectorLabels {
    fn default() -> Self {
        Self {
            previous_step: "Previous Step".into(),
            next_step: "Next Step".into(),
            start: "Go to Start".into(),
            end: "Go to End".into(),
            play: "Play".into(),
            pause: "Pause".into(),
            channel_top: "Heard".into(),
            channel_bottom: "Replied With".into(),
            zoom_in_selection: "Zoom Selection".into(),
            zoom_in: "Zoom In".into(),
            zoom_out: "Zoom Out".into(),
            reset_zoom: "Reset Zoom".into(),
            zoom: "Zoom".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct InspectorConfig {
    pub labels: InspectorLabels,
    pub zoom_increment_percent: f64,
    pub grouping_factor_percent: f64,
    pub wave_color: String,
    /// Content for the toolbar's left utility slot
    pub left_slot: Option<String>,
    /// Content for the toolbar's right utility slot
    pub right_slot: Option<String>,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            labels: InspectorLabels::default(),
            zoom_increment_percent: 100.0,
            grouping_factor_percent: 2.0,
            wave_color: DEFAULT_WAVE_COLOR.into(),
            left_slot: None,
            right_slot: None,
        }
    }
}

impl InspectorConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Failed to parse inspector config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> InspectorResult<()> {
        if !self.zoom_increment_percent.is_finite() || self.zoom_increment_percent < 0.0 {
            return Err(InspectorError::Config(format!(
                "zoomIncrementPercent must be a non-negative number, got {}",
                self.zoom_increment_percent
            )));
        }
        if !self.grouping_factor_percent.is_finite() || self.grouping_factor_percent < 0.0 {
            return Err(InspectorError::Config(format!(
                "groupingFactorPercent must be a non-negative number, got {}",
                self.grouping_factor_percent
            )));
        }
        self.wave_rgba()?;
        Ok(())
    }

    pub fn grouping(&self) -> GroupingConfig {
        GroupingConfig::new(self.grouping_factor_percent)
    }

    /// Wave colour as an opaque `rgba(...)` string for the renderer.
    pub fn wave_rgba(&self) -> InspectorResult<String> {
        let (r, g, b) = parse_hex_color(&self.wave_color).ok_or_else(|| {
            InspectorError::Config(format!("waveColor is not a hex colour: {}", self.wave_color))
        })?;
        Ok(format!("rgba({},{},{}, 1)", r, g, b))
    }
}

fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// File-backed inspector configuration.
pub struct ConfigStore {
    path: PathBuf,
    data: RwLock<InspectorConfig>,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read inspector config from {}", path.display()))?;
            InspectorConfig::from_json_str(&contents)
                .with_context(|| format!("Invalid inspector config in {}", path.display()))?
        } else {
            InspectorConfig::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn config(&self) -> InspectorConfig {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update(&self, config: InspectorConfig) -> Result<()> {
        config.validate()?;
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow::anyhow!("inspector config lock poisoned"))?;
        *guard = config;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read inspector config from {}", self.path.display()))?;
        let data = InspectorConfig::from_json_str(&contents)?;
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow::anyhow!("inspector config lock poisoned"))?;
        *guard = data;
        Ok(())
    }

    fn persist(&self, data: &InspectorConfig) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write inspector config to {}", self.path.display()))
    }
}
