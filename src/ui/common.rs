//! Shared styling for the dashboard panels.

use eframe::egui::{Color32, Frame, Stroke};

use crate::sync::LogLevel;

/// Dark theme palette
pub struct UiColors;

impl UiColors {
    /// Primary background color for main content areas (RGB: 30, 30, 30)
    pub const MAIN_BG: Color32 = Color32::from_rgb(30, 30, 30);

    /// Secondary background color for nested components (RGB: 25, 25, 25)
    pub const INNER_BG: Color32 = Color32::from_rgb(25, 25, 25);

    /// Deepest background, used behind the chart and log lines (RGB: 20, 20, 20)
    pub const EXTREME_BG: Color32 = Color32::from_rgb(20, 20, 20);

    pub const BORDER: Color32 = Color32::from_rgb(60, 60, 60);

    /// Connected, device on
    pub const ACTIVE: Color32 = Color32::from_rgb(50, 200, 20);

    /// Disconnected, device off
    pub const INACTIVE: Color32 = Color32::from_rgb(200, 50, 20);

    /// Stale values and warnings
    pub const WARNING: Color32 = Color32::from_rgb(220, 160, 20);

    pub const CHART_LINE: Color32 = Color32::from_rgb(37, 99, 235);

    pub const TEXT_DIM: Color32 = Color32::from_rgb(140, 140, 140);
}

pub fn create_frame(bg_color: Color32, border_color: Color32) -> Frame {
    Frame::new()
        .stroke(Stroke::new(1.0, border_color))
        .fill(bg_color)
        .inner_margin(4)
        .outer_margin(2)
}

pub fn log_color(level: LogLevel) -> Color32 {
    match level {
        LogLevel::Info => Color32::LIGHT_GRAY,
        LogLevel::Warn => UiColors::WARNING,
        LogLevel::Error => UiColors::INACTIVE,
    }
}
