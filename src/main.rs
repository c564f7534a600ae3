use color_eyre::{eyre::eyre, Result};
use eframe::egui;
use smarthome_bridge::config::{self, AppConfig};
use smarthome_bridge::mqtt::MqttHandle;
use smarthome_bridge::ui::DashboardApp;
use tokio::sync::mpsc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config_path = config::default_config_path();
    let config = AppConfig::load_or_init(&config_path).await?;
    setup_logging_env(config.level()?);
    info!("Using config {}", config_path.display());

    let registry = config.registry()?;

    // Kanal MQTT-Task -> UI
    let (event_tx, event_rx) = mpsc::channel(config.mqtt.channel_capacity.max(1));
    let transport = MqttHandle::new(tokio::runtime::Handle::current(), event_tx);

    // UI starten
    info!("Starting dashboard");
    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = egui::ViewportBuilder::default()
        .with_title("Smart Home")
        .with_inner_size([1100.0, 720.0]);

    eframe::run_native(
        "smarthome-bridge",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(DashboardApp::new(
                cc, &config, registry, transport, event_rx,
            )))
        }),
    )
    .map_err(|e| eyre!("Dashboard exited with error: {}", e))?;

    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    Ok(())
}

fn setup_logging_env(level: Level) {
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
