mod ai;
mod app;
mod command;
mod config;
mod constants;
mod error;
mod mail;
mod terminal;

use anyhow::Result;
use std::env;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::config::Config;

fn setup_logging() {
    use std::fs::OpenOptions;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,mailchat=debug"));

    // Log to a file so output does not interleave with the chat prompt
    let log_file = Config::config_dir()
        .ok()
        .and_then(|dir| std::fs::create_dir_all(&dir).ok().map(|_| dir))
        .map(|dir| dir.join("mailchat.log"))
        .and_then(|path| {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path)
                .ok()
        });

    if let Some(file) = log_file {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
    } else {
        // Fallback to stderr if file logging fails
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_usage() {
    eprintln!(
        r#"mailchat - Ask questions about your recent emails

Usage: mailchat [command]

Commands:
    (none)      Start an interactive session
    config      Print the configuration file path
    help        Show this help message

Configuration file: ~/.config/mailchat/config.toml
API token: [ai] api_token, or MAILCHAT_API_TOKEN / FRIENDLI_TOKEN
"#
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("help") | Some("--help") | Some("-h") => {
            print_usage();
            Ok(())
        }
        Some("config") => {
            println!("{}", Config::config_path()?.display());
            Ok(())
        }
        Some(cmd) => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            std::process::exit(1);
        }
        None => {
            setup_logging();

            let config = Config::load()?;
            tracing::info!(
                "Starting session (fetch cap {}, prompt bodies {}, body chars {})",
                config.limits.max_emails_to_fetch,
                config.limits.max_bodies_in_prompt,
                config.limits.max_body_chars
            );

            let mut app = App::new(config);
            app.run().await
        }
    }
}
