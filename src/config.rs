//! `golem.json`: everything the UI needs to start.
use crate::sprite::{FrameLayout, SpriteSheetOptions};
use crate::widget::WidgetOptions;
use anyhow::{bail, Result};
use log::LevelFilter;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::str::FromStr;

pub const CONFIG_PATH: &str = "golem.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiOptions {
    pub canvas_id: String,
    /// width / height
    pub aspect_ratio: f64,
    /// share of the viewport the canvas may take
    pub viewport_ratio: f64,
    pub fps: f64,
    pub log_level: String,
    pub sprite_sheets: BTreeMap<String, SpriteSheetOptions>,
    pub widgets: Vec<WidgetOptions>,
}

impl Default for UiOptions {
    fn default() -> Self {
        UiOptions {
            canvas_id: String::from("canvas"),
            aspect_ratio: 8.0 / 6.0,
            viewport_ratio: 0.98,
            fps: 60.0,
            log_level: String::from("info"),
            sprite_sheets: BTreeMap::new(),
            widgets: Vec::new(),
        }
    }
}

impl UiOptions {
    /// Catch what would otherwise fail (or silently misbehave) after the
    /// stage is up.
    pub fn validate(&self) -> Result<()> {
        if self.canvas_id.is_empty() {
            bail!("canvasId must not be empty");
        }
        if !(self.aspect_ratio > 0.0) {
            bail!("aspectRatio must be positive, got {}", self.aspect_ratio);
        }
        if !(self.viewport_ratio > 0.0 && self.viewport_ratio <= 1.0) {
            bail!("viewportRatio must be in (0, 1], got {}", self.viewport_ratio);
        }
        if !(self.fps > 0.0) {
            bail!("fps must be positive, got {}", self.fps);
        }

        for (name, sheet) in &self.sprite_sheets {
            if let FrameLayout::Grid { width, height, .. } = sheet.frames {
                if !(width > 0.0 && height > 0.0) {
                    bail!("sprite sheet '{}': frame size {}x{} is not positive", name, width, height);
                }
            }
        }

        for (position, widget) in self.widgets.iter().enumerate() {
            if let WidgetOptions::ButtonBar(bar) = widget {
                if bar.rows == 0 || bar.columns == 0 {
                    bail!("widget {}: a ButtonBar needs at least one row and column", position);
                }
            }
        }
        Ok(())
    }

    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or_else(|_| {
            log::warn!("unknown log level '{}', using info", self.log_level);
            LevelFilter::Info
        })
    }
}
