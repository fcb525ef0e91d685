use serde::{Deserialize, Serialize};

/// Heading size presets: `report` is 16/14/12 pt, `simple` is 18/16/14 pt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum StyleProfile {
    #[default]
    Report,
    Simple,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    pub body_font: String,
    pub heading_font: String,
    pub code_font: String,
    pub body_size: f32,
    pub title_size: f32,
    pub subtitle_size: f32,
    pub header_size: f32,
    pub code_size: f32,
    pub code_indent_inches: f32,
    pub separator_width: usize,
}

impl StyleSheet {
    pub fn for_profile(profile: StyleProfile) -> Self {
        let (title_size, subtitle_size, header_size) = match profile {
            StyleProfile::Report => (16.0, 14.0, 12.0),
            StyleProfile::Simple => (18.0, 16.0, 14.0),
        };

        Self {
            body_font: "Calibri".to_string(),
            heading_font: "Arial".to_string(),
            code_font: "Courier New".to_string(),
            body_size: 11.0,
            title_size,
            subtitle_size,
            header_size,
            code_size: 10.0,
            code_indent_inches: 0.5,
            separator_width: 50,
        }
    }

    pub fn separator(&self) -> String {
        "_".repeat(self.separator_width)
    }

    pub fn code_indent_twips(&self) -> u32 {
        inches_to_twips(self.code_indent_inches)
    }
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::for_profile(StyleProfile::default())
    }
}

/// WordprocessingML sizes are in half-points.
pub fn half_points(points: f32) -> u32 {
    (points * 2.0).round().max(0.0) as u32
}

pub fn inches_to_twips(inches: f32) -> u32 {
    (inches * 1440.0).round().max(0.0) as u32
}
