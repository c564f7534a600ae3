//! # Dashboard UI
//!
//! eframe application that owns the [`SyncSession`] and is its only writer.
//! Every frame it drains the transport channel into the session, draws the
//! panels and feeds the user's intents back through the session.
//!
//! ```text
//! ui/
//! ├── mod.rs          - DashboardApp, frame loop and broker form
//! ├── dashboard.rs    - Presentation impl and device/sensor panels
//! ├── message_log.rs  - capped, timestamped user log
//! └── common.rs       - colors and frame helpers
//! ```
//!
//! Layout: broker form and status on top, message log on the right, sensors
//! and device controls in the center.

pub mod common;
pub mod dashboard;
pub mod message_log;

use std::time::Duration;

use eframe::egui::{self, DragValue, TextEdit};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::mqtt::{MqttConfig, MqttHandle, TransportEvent, TransportEventKind};
use crate::sync::{Intent, LogLevel, Presentation, SyncSession, TopicRegistry};

use self::dashboard::DashboardView;

pub struct DashboardApp {
    session: SyncSession,
    view: DashboardView,
    transport: MqttHandle,
    events: mpsc::Receiver<TransportEvent>,
    /// Broker form, applied on connect
    mqtt_config: MqttConfig,
    repaint: Duration,
}

impl DashboardApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: &AppConfig,
        registry: TopicRegistry,
        transport: MqttHandle,
        events: mpsc::Receiver<TransportEvent>,
    ) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);
        Self::from_parts(config, registry, transport, events)
    }

    /// Everything but the egui context setup
    pub fn from_parts(
        config: &AppConfig,
        registry: TopicRegistry,
        transport: MqttHandle,
        events: mpsc::Receiver<TransportEvent>,
    ) -> Self {
        DashboardApp {
            session: SyncSession::new(registry),
            view: DashboardView::new(config.ui.log_capacity),
            transport,
            events,
            mqtt_config: config.mqtt.clone(),
            repaint: Duration::from_millis(config.ui.repaint_ms),
        }
    }

    pub fn session(&self) -> &SyncSession {
        &self.session
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    /// Feeds queued transport events into the session. Returns how many were
    /// applied.
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            if event.generation != self.transport.generation() {
                debug!("Dropping event from connection attempt {}", event.generation);
                continue;
            }
            match event.kind {
                TransportEventKind::Connection(connection) => {
                    self.session
                        .handle_connection(connection, &mut self.transport, &mut self.view);
                }
                TransportEventKind::Message(msg) => {
                    if let Err(e) = self.session.handle_message(&msg.topic, &msg.content, &mut self.view) {
                        debug!("Message on {} not applied: {}", msg.topic, e);
                    }
                }
            }
            applied += 1;
        }
        applied
    }

    pub fn submit(&mut self, intent: Intent) {
        if let Err(e) = self.session.handle_intent(intent, &mut self.transport, &mut self.view) {
            debug!("Intent {} not dispatched: {}", intent, e);
        }
    }

    pub fn connect(&mut self) {
        info!("Connecting to {}", self.mqtt_config.endpoint());
        self.view.on_log(LogLevel::Info, "Connecting to broker...");
        self.transport.connect(&self.mqtt_config);
    }

    pub fn disconnect(&mut self) {
        if self.transport.is_active() {
            self.transport.disconnect();
        }
    }

    fn broker_form(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Smart Home");
            ui.add_space(16.0);
            ui.label("Host");
            ui.add(TextEdit::singleline(&mut self.mqtt_config.host).desired_width(160.0));
            ui.label("Port");
            ui.add(DragValue::new(&mut self.mqtt_config.port).range(1..=u16::MAX));

            if ui.button("Connect").clicked() {
                self.connect();
            }
            if ui
                .add_enabled(self.transport.is_active(), egui::Button::new("Disconnect"))
                .clicked()
            {
                self.disconnect();
            }

            ui.add_space(16.0);
            self.view.status_bar(ui);
        });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        ctx.request_repaint_after(self.repaint);

        egui::TopBottomPanel::top("broker_panel").show(ctx, |ui| {
            self.broker_form(ui);
        });

        egui::SidePanel::right("log_panel")
            .default_width(320.0)
            .show(ctx, |ui| {
                self.view.log_panel(ui);
            });

        let intents = egui::CentralPanel::default()
            .show(ctx, |ui| {
                self.view.sensor_panel(ui);
                ui.add_space(8.0);
                self.view.device_panel(ui)
            })
            .inner;

        for intent in intents {
            self.submit(intent);
        }
    }
}
