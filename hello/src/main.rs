//! `hello` - serve the greeting application.

use std::process::ExitCode;

use clap::Parser;
use hello::config::{self, Config};
use hello::observability::TracingConfig;

#[derive(Parser)]
#[command(name = "hello")]
#[command(version, about = "Serve the greeting web application", long_about = None)]
struct Cli {
    /// Host to bind to (overrides HELLO_HOST)
    #[arg(long)]
    host: Option<String>,
    /// Port to listen on (overrides HELLO_PORT)
    #[arg(short, long)]
    port: Option<u16>,
    /// Emit logs as JSON lines (overrides HELLO_LOG_JSON)
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn apply(self, mut config: Config) -> Config {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        config.log_json |= self.json_logs;
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    config::load_dotenv();
    run(Cli::parse()).await
}

async fn run(cli: Cli) -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => cli.apply(config),
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = TracingConfig::from_config(&config).try_init() {
        eprintln!("error: failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!(name = %config.name, testing = config.testing, "starting");

    match hello::app(&config).listen(&config.addr()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, addr = %config.addr(), "server failed");
            ExitCode::FAILURE
        }
    }
}
