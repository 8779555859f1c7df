use std::path::PathBuf;

use anyhow::Context;
use bookstore_app::Application;
use bookstore_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookstore", version, about = "Bookstore backend")]
struct Cli {
    /// Environment overlay to load (local, staging, production)
    #[arg(long, global = true)]
    env: Option<String>,

    /// Directory holding base.toml and the environment overlays
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Print the effective settings, secrets omitted
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load_with(cli.config_dir, cli.env)
        .context("failed to load bookstore settings")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            bookstore_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = settings.environment.as_str(), "starting bookstore server");
            Application::build(settings).await?.serve().await
        }
        Command::Migrate => {
            bookstore_telemetry::init(&settings.telemetry)?;
            let app = Application::build(settings).await?;
            let applied = app.migrate().await?;
            tracing::info!(applied, "migrate finished");
            Ok(())
        }
        Command::Config => {
            print_settings(&settings);
            Ok(())
        }
    }
}

fn print_settings(settings: &Settings) {
    let auth = &settings.auth;
    let password = &auth.password;

    println!("environment            = {}", settings.environment.as_str());
    println!("server.host            = {}", settings.server.host);
    println!("server.port            = {}", settings.server.port);
    println!("server.request_timeout = {}ms", settings.server.request_timeout_ms);
    println!("database.backend       = {:?}", settings.database.backend);
    println!("database.pool          = {}", settings.database.max_connections);
    println!("telemetry.format       = {:?}", settings.telemetry.log_format);
    println!("telemetry.filter       = {}", settings.telemetry.log_filter);
    println!("auth.issuer            = {}", auth.jwt_issuer);
    println!("auth.audience          = {}", auth.jwt_audience);
    println!("auth.token_ttl         = {}m", auth.token_ttl_minutes);
    println!("auth.require_token     = {}", auth.require_token);
    println!("auth.password.min_len  = {}", password.min_length);
}
