//! Exit workflow server executable

mod auth;
mod http;

use std::sync::Arc;

use clap::{Arg, Command};

use exitflow_core::{
    ExitWorkflow, ExitflowConfig, FileDirectory, FileNotificationStore, MailerClient, Notifier,
};
use http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with INFO as default if RUST_LOG not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("exitflow-server")
        .version("1.0.0")
        .about("HR exit workflow server")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/app/config/exitflow.json"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Override the directory data root from the config file"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Override the bind host from the config file"),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .value_name("PORT")
                .help("Override the bind port from the config file"),
        )
        .get_matches();

    // Load configuration
    let config_path = matches.get_one::<String>("config").unwrap();
    let mut config = ExitflowConfig::from_file(config_path)?;
    log::info!("Loaded configuration from {}", config_path);

    // CLI overrides
    if let Some(data_dir) = matches.get_one::<String>("data-dir") {
        config.directory.data_dir = data_dir.clone();
    }
    if let Some(host) = matches.get_one::<String>("host") {
        config.server.host = host.clone();
    }
    if let Some(port) = matches.get_one::<String>("port") {
        config.server.port = port.parse()?;
    }

    log::info!("Using data directory: {}", config.directory.data_dir);

    // Wire up the directory and notification adapters
    let directory = Arc::new(FileDirectory::new(&config.directory.data_dir)?);
    let store = FileNotificationStore::new(&config.directory.data_dir)?;

    let mailer = if config.mailer.enabled {
        Some(MailerClient::new(config.mailer.clone()))
    } else {
        log::warn!("Mailer disabled, workflow emails will be skipped");
        None
    };
    let notifier = Arc::new(Notifier::new(store, mailer));

    let workflow = Arc::new(ExitWorkflow::new(directory, notifier));
    let app = create_router(AppState { workflow });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    log::info!("Starting exit workflow server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
