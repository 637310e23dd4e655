use std::ops::RangeInclusive;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{document::DEFAULT_FILENAME, error::SettingsError};

pub const FONT_SIZE_RANGE: RangeInclusive<u16> = 12..=24;
pub const MARGIN_RANGE: RangeInclusive<u16> = 0..=200;
pub const MARGIN_STEP: u16 = 4;

/// User preferences, persisted as one JSON blob.
///
/// Fields are public so a control surface can bind to them; every write
/// path goes through [`Settings::normalized`] before it is kept.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    #[serde(deserialize_with = "saturating_px")]
    pub font_size_px: u16,
    pub is_dark_mode: bool,
    /// Count words when set, characters otherwise.
    pub show_word_count: bool,
    pub show_count_display: bool,
    #[serde(deserialize_with = "saturating_px")]
    pub left_margin_px: u16,
    #[serde(deserialize_with = "saturating_px")]
    pub right_margin_px: u16,
    pub current_filename: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_size_px: 16,
            is_dark_mode: false,
            show_word_count: true,
            show_count_display: true,
            left_margin_px: 40,
            right_margin_px: 40,
            current_filename: DEFAULT_FILENAME.to_owned(),
        }
    }
}

impl Settings {
    /// Parse a stored blob. Unknown keys are ignored, missing keys take their
    /// defaults and out-of-range numbers are pulled back into range.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.normalized())
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(self)?)
    }

    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.font_size_px = clamp(self.font_size_px, &FONT_SIZE_RANGE);
        self.left_margin_px = snap_margin(self.left_margin_px);
        self.right_margin_px = snap_margin(self.right_margin_px);
        if self.current_filename.trim().is_empty() {
            DEFAULT_FILENAME.clone_into(&mut self.current_filename);
        }
        self
    }

    /// Move the font size by `delta` pixels, staying in range.
    pub fn step_font_size(&mut self, delta: i32) {
        let next = i32::from(self.font_size_px).saturating_add(delta);
        let next = u16::try_from(next.max(0)).unwrap_or(u16::MAX);
        self.font_size_px = clamp(next, &FONT_SIZE_RANGE);
    }
}

/// Accept any JSON number for a pixel field: fractions round, negatives
/// become zero and huge values saturate. [`Settings::normalized`] then pulls
/// the result into the field's own range.
fn saturating_px<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.is_nan() {
        return Ok(0);
    }
    Ok(value.round().clamp(0.0, f64::from(u16::MAX)) as u16)
}

fn clamp(value: u16, range: &RangeInclusive<u16>) -> u16 {
    value.clamp(*range.start(), *range.end())
}

fn snap_margin(value: u16) -> u16 {
    let value = clamp(value, &MARGIN_RANGE);
    let snapped = (value + MARGIN_STEP / 2) / MARGIN_STEP * MARGIN_STEP;
    clamp(snapped, &MARGIN_RANGE)
}
