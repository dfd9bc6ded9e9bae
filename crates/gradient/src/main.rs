// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gradient - a chat learning assistant with material recommendations.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod ask;
mod recommend;
mod serve;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use gradient_config::GradientConfig;

/// Gradient - a chat learning assistant with material recommendations.
#[derive(Parser, Debug)]
#[command(name = "gradient", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the gateway server.
    Serve,
    /// Chat interactively with a running server.
    Shell {
        /// Gateway URL. Defaults to the configured host and port.
        #[arg(long)]
        server: Option<String>,
    },
    /// Send one message and print the streamed answer.
    Ask {
        message: String,
        /// Continue an existing chat.
        #[arg(long)]
        chat: Option<String>,
        /// Attach an image file.
        #[arg(long)]
        image: Option<PathBuf>,
        /// Gateway URL. Defaults to the configured host and port.
        #[arg(long)]
        server: Option<String>,
    },
    /// Rank catalog materials for a query without contacting a server.
    Recommend {
        query: String,
        #[arg(long)]
        limit: Option<usize>,
        /// Print the materials as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => gradient_config::load_and_validate_path(path),
        None => gradient_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            gradient_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => {
            init_tracing(&config.assistant.log_level);
            serve::run_serve(config).await
        }
        Some(Commands::Shell { server }) => {
            init_tracing("warn");
            let url = server.unwrap_or_else(|| gateway_url(&config));
            shell::run_shell(&config, &url).await
        }
        Some(Commands::Ask {
            message,
            chat,
            image,
            server,
        }) => {
            init_tracing("warn");
            let url = server.unwrap_or_else(|| gateway_url(&config));
            ask::run_ask(&url, message, chat, image.as_deref()).await
        }
        Some(Commands::Recommend { query, limit, json }) => {
            init_tracing("warn");
            recommend::run_recommend(&config, &query, limit, json)
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => {
                print!("{rendered}");
                Ok(())
            }
            Err(e) => Err(gradient_core::GradientError::Config(format!(
                "failed to render configuration: {e}"
            ))),
        },
        None => {
            println!("gradient: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

/// Where the CLI expects the gateway, derived from the server section.
fn gateway_url(config: &GradientConfig) -> String {
    let host = match config.server.host.as_str() {
        "0.0.0.0" | "::" => "127.0.0.1",
        host => host,
    };
    format!("http://{host}:{}", config.server.port)
}

/// Installs the global tracing subscriber. `RUST_LOG` wins when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gradient={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
