//! Dashboard view model and panels
//!
//! [`DashboardView`] is the [`Presentation`] the sync session reports to. It
//! only mirrors what it is told, the session stays the source of truth.
//! Panels return the [`Intent`]s produced by the user this frame.

use std::collections::BTreeMap;

use eframe::egui::{self, pos2, vec2, Align2, Button, FontId, Label, RichText, ScrollArea, Sense, Shape, Slider, Stroke, Ui};
use tracing::debug;

use super::common::{create_frame, log_color, UiColors};
use super::message_log::MessageLog;
use crate::sync::{
    AlarmPhase, ConnectionStatus, DeviceId, DeviceKind, DeviceState, Intent, LogLevel, Presentation, SensorId,
};

const CHART_HEIGHT: f32 = 160.0;
const BUTTON_SIZE: egui::Vec2 = egui::Vec2 { x: 160.0, y: 28.0 };

#[derive(Debug, Clone)]
pub struct DashboardView {
    devices: BTreeMap<DeviceId, DeviceState>,
    temperature: Vec<f64>,
    latest_temperature: Option<f64>,
    humidity: Option<f64>,
    status: ConnectionStatus,
    stale: bool,
    unrecognized: usize,
    log: MessageLog,
    /// Slider positions while the user is dragging
    pending_levels: BTreeMap<DeviceId, u8>,
}

impl DashboardView {
    pub fn new(log_capacity: usize) -> Self {
        Self {
            devices: DeviceId::ALL
                .iter()
                .map(|&device| (device, DeviceState::initial(device.kind())))
                .collect(),
            temperature: Vec::new(),
            latest_temperature: None,
            humidity: None,
            status: ConnectionStatus::Disconnected,
            stale: false,
            unrecognized: 0,
            log: MessageLog::new(log_capacity),
            pending_levels: BTreeMap::new(),
        }
    }

    pub fn device(&self, device: DeviceId) -> DeviceState {
        self.devices
            .get(&device)
            .copied()
            .unwrap_or_else(|| DeviceState::initial(device.kind()))
    }

    pub fn temperature(&self) -> &[f64] {
        &self.temperature
    }

    pub fn latest_temperature(&self) -> Option<f64> {
        self.latest_temperature
    }

    pub fn humidity(&self) -> Option<f64> {
        self.humidity
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn unrecognized(&self) -> usize {
        self.unrecognized
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut MessageLog {
        &mut self.log
    }

    pub fn status_bar(&self, ui: &mut Ui) {
        let (color, text) = match self.status {
            ConnectionStatus::Connected => (UiColors::ACTIVE, "Connected"),
            ConnectionStatus::Disconnected => (UiColors::INACTIVE, "Disconnected"),
        };
        ui.colored_label(color, "\u{2B24}");
        ui.label(text);
        if self.stale {
            ui.colored_label(UiColors::WARNING, "values may be outdated");
        }
    }

    pub fn sensor_panel(&self, ui: &mut Ui) {
        create_frame(UiColors::MAIN_BG, UiColors::BORDER).show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("Temperature").strong());
                ui.label(format_reading(self.latest_temperature, "°C"));
                ui.add_space(24.0);
                ui.label(RichText::new("Humidity").strong());
                ui.label(format_reading(self.humidity, "%"));
            });
            ui.add_space(4.0);
            self.temperature_chart(ui);
        });
    }

    fn temperature_chart(&self, ui: &mut Ui) {
        let width = ui.available_width();
        let (response, painter) = ui.allocate_painter(vec2(width, CHART_HEIGHT), Sense::hover());
        let rect = response.rect;
        painter.rect_filled(rect, 2.0, UiColors::EXTREME_BG);

        let Some((min, max)) = value_range(&self.temperature) else {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "no readings yet",
                FontId::proportional(12.0),
                UiColors::TEXT_DIM,
            );
            return;
        };

        let plot = rect.shrink(12.0);
        let last = self.temperature.len().saturating_sub(1).max(1) as f32;
        let points: Vec<_> = self
            .temperature
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let x = egui::remap(i as f32, 0.0..=last, plot.left()..=plot.right());
                let y = egui::remap(*value as f32, min as f32..=max as f32, plot.bottom()..=plot.top());
                pos2(x, y)
            })
            .collect();

        for point in &points {
            painter.circle_filled(*point, 2.5, UiColors::CHART_LINE);
        }
        painter.add(Shape::line(points, Stroke::new(2.0, UiColors::CHART_LINE)));

        let font = FontId::monospace(10.0);
        painter.text(rect.left_top(), Align2::LEFT_TOP, format!("{max:.1}"), font.clone(), UiColors::TEXT_DIM);
        painter.text(rect.left_bottom(), Align2::LEFT_BOTTOM, format!("{min:.1}"), font, UiColors::TEXT_DIM);
    }

    /// Buttons and sliders for every device. Returns what the user asked for.
    pub fn device_panel(&mut self, ui: &mut Ui) -> Vec<Intent> {
        let mut intents = Vec::new();

        create_frame(UiColors::MAIN_BG, UiColors::BORDER).show(ui, |ui| {
            ui.label(RichText::new("Devices").strong());
            for device in DeviceId::ALL {
                let state = self.device(device);
                ui.horizontal(|ui| match device.kind() {
                    DeviceKind::Switch => {
                        intents.extend(self.power_button(ui, device, state));
                    }
                    DeviceKind::Dimmable => {
                        intents.extend(self.power_button(ui, device, state));
                        intents.extend(self.level_slider(ui, device, state));
                    }
                    DeviceKind::Alarm => {
                        intents.extend(self.alarm_controls(ui, device, state));
                    }
                });
            }
        });

        intents
    }

    fn power_button(&self, ui: &mut Ui, device: DeviceId, state: DeviceState) -> Option<Intent> {
        let power = state.power().unwrap_or_default();
        let fill = if power.is_on() {
            UiColors::ACTIVE
        } else {
            UiColors::INACTIVE
        };
        let button = Button::new(format!("{}: {}", device.label(), power))
            .fill(fill)
            .min_size(BUTTON_SIZE);
        ui.add(button).clicked().then_some(Intent::Toggle(device))
    }

    fn level_slider(&mut self, ui: &mut Ui, device: DeviceId, state: DeviceState) -> Option<Intent> {
        let current = state.level().unwrap_or_default();
        let mut level = self.pending_levels.get(&device).copied().unwrap_or(current);
        let response = ui.add(Slider::new(&mut level, 0..=100).suffix("%"));

        if response.dragged() {
            self.pending_levels.insert(device, level);
            return None;
        }
        // dragging ended or keyboard/click change
        let released = self.pending_levels.remove(&device).is_some() && response.drag_stopped();
        if released || response.changed() {
            debug!("{} slider at {}", device, level);
            return Some(Intent::SetLevel { device, level });
        }
        None
    }

    fn alarm_controls(&self, ui: &mut Ui, device: DeviceId, state: DeviceState) -> Option<Intent> {
        let phase = state.phase().unwrap_or_default();
        let (text, fill) = match phase {
            AlarmPhase::Disarmed => ("Arm alarm", UiColors::INACTIVE),
            _ => ("Disarm alarm", UiColors::ACTIVE),
        };
        let clicked = ui.add(Button::new(text).fill(fill).min_size(BUTTON_SIZE)).clicked();

        let phase_color = match phase {
            AlarmPhase::Activated => UiColors::INACTIVE,
            AlarmPhase::Identification | AlarmPhase::Arming => UiColors::WARNING,
            AlarmPhase::Armed => UiColors::ACTIVE,
            AlarmPhase::Disarmed => UiColors::TEXT_DIM,
        };
        ui.colored_label(phase_color, phase.label());

        clicked.then_some(Intent::Toggle(device))
    }

    pub fn log_panel(&self, ui: &mut Ui) {
        ui.label(RichText::new("Message log").strong());
        create_frame(UiColors::INNER_BG, UiColors::BORDER).show(ui, |ui| {
            ScrollArea::vertical().stick_to_bottom(true).show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                for entry in self.log.entries() {
                    ui.add(
                        Label::new(RichText::new(entry.render()).monospace().color(log_color(entry.level)))
                            .wrap(),
                    );
                }
            });
        });
    }
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::new(MessageLog::default().capacity())
    }
}

impl Presentation for DashboardView {
    fn on_device_state_changed(&mut self, device: DeviceId, state: &DeviceState) {
        self.devices.insert(device, *state);
    }

    fn on_telemetry_updated(&mut self, snapshot: &[f64]) {
        self.temperature = snapshot.to_vec();
        // empty snapshot only comes from a session reset
        if snapshot.is_empty() {
            self.latest_temperature = None;
            self.humidity = None;
        }
    }

    fn on_unrecognized_message(&mut self, topic: &str, payload: &str) {
        debug!("Unrecognized [{}] {:?}", topic, payload);
        self.unrecognized += 1;
    }

    fn on_reading(&mut self, sensor: SensorId, value: f64) {
        match sensor {
            SensorId::Temperature => self.latest_temperature = Some(value),
            SensorId::Humidity => self.humidity = Some(value),
        }
    }

    fn on_connection_changed(&mut self, status: ConnectionStatus, stale: bool) {
        self.status = status;
        self.stale = stale;
    }

    fn on_log(&mut self, level: LogLevel, message: &str) {
        self.log.push(level, message);
    }
}

/// One decimal, as the readings are shown on the panel
pub fn format_reading(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(value) => format!("{value:.1} {unit}"),
        None => format!("-- {unit}"),
    }
}

/// Chart y range. A flat series gets some headroom so the line is centered.
fn value_range(values: &[f64]) -> Option<(f64, f64)> {
    let min = values.iter().copied().reduce(f64::min)?;
    let max = values.iter().copied().reduce(f64::max)?;
    if (max - min).abs() < f64::EPSILON {
        Some((min - 0.5, max + 0.5))
    } else {
        Some((min, max))
    }
}
