pub mod commands;

use bikerent_core::config::{AppConfig, LoadOptions, LogFormat};
use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::coupon::CouponArgs;
use commands::extend::ExtendArgs;
use commands::quote::QuoteArgs;
use commands::window::WindowArgs;

#[derive(Debug, Parser)]
#[command(
    name = "bikerent",
    about = "Bike rental booking CLI",
    long_about = "Price rentals, check booking windows and coupons, price extensions, and inspect client configuration.",
    after_help = "Examples:\n  bikerent quote --period week --start '2025-06-01 10:00' --per-day 100 --per-week 630\n  bikerent window --start '2025-06-01 10:00' --end '2025-06-03 10:00'\n  bikerent doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Compute a rental quote from dates, rates and an optional coupon")]
    Quote(QuoteArgs),
    #[command(about = "Check that a booking window starts in the future and ends after it starts")]
    Window(WindowArgs),
    #[command(about = "Apply a coupon to a subtotal")]
    Coupon(CouponArgs),
    #[command(about = "Price a booking extension by hours or days")]
    Extend(ExtendArgs),
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, session storage, and rental API reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    if let Ok(config) = AppConfig::load(LoadOptions::default()) {
        init_logging(&config);
    }

    let result = match cli.command {
        Command::Quote(args) => commands::quote::run(&args),
        Command::Window(args) => commands::window::run(&args),
        Command::Coupon(args) => commands::coupon::run(&args),
        Command::Extend(args) => commands::extend::run(&args),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so that stdout stays a clean JSON payload.
fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
