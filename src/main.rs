use std::fs::File;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use lingo::core::clients::AzureClients;
use lingo::core::config::{self, CliOverrides, ResolvedConfig};
use lingo::core::controller::SessionController;
use lingo::core::state::{App, SessionPhase};
use lingo::tui;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "lingo", about = "Terminal client for Azure Translator")]
struct Args {
    /// Translator endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Azure region of the Translator resource
    #[arg(long)]
    region: Option<String>,

    /// Source language code (e.g. "en")
    #[arg(long)]
    from: Option<String>,

    /// Target language code (e.g. "it")
    #[arg(long)]
    to: Option<String>,

    /// Translate this text, print the result, and exit without the TUI
    #[arg(long)]
    text: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<ExitCode> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to lingo.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("lingo.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };
    let cli = CliOverrides {
        endpoint: args.endpoint,
        region: args.region,
        from: args.from,
        to: args.to,
    };
    let resolved = config::resolve(&file_config, &cli);

    log::info!("Lingo starting up: {:?}", resolved);

    match args.text {
        Some(text) => Ok(translate_once(resolved, text).await),
        None => {
            tui::run(resolved, Arc::new(AzureClients))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Headless mode: configure, translate `text`, print the result.
async fn translate_once(config: ResolvedConfig, text: String) -> ExitCode {
    let mut controller = SessionController::new(App::new(Arc::new(AzureClients), &config));

    controller.on_configuration_changed().await;
    if controller.app().phase() != SessionPhase::Configured {
        eprintln!("Error: {}", controller.app().output);
        return ExitCode::FAILURE;
    }

    controller.translate(text).await;
    let app = controller.app();
    if app.output_is_error {
        eprintln!("Error: {}", app.output);
        return ExitCode::FAILURE;
    }

    println!("{}", app.output);
    ExitCode::SUCCESS
}
