use bikerent_core::config::{AppConfig, LoadOptions};
use bikerent_core::domain::extension::{BookingExtensionRequest, ExtendBy};
use bikerent_core::errors::ApplicationError;
use bikerent_core::pricing::compute_extension;
use chrono::NaiveDateTime;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::json;

use crate::commands::{parse_date_time, CommandResult, EXIT_CONFIG, EXIT_REJECTED};

#[derive(Debug, Clone, Args)]
pub struct ExtendArgs {
    #[arg(long, help = "Extension unit: hour or day")]
    pub by: ExtendBy,
    #[arg(long, allow_hyphen_values = true)]
    pub amount: i64,
    #[arg(long, value_parser = parse_date_time, help = "Current booking end")]
    pub current_end: NaiveDateTime,
    #[arg(long, default_value = "0")]
    pub hourly_rate: Decimal,
    #[arg(long, default_value = "0")]
    pub daily_rate: Decimal,
}

pub fn run(args: &ExtendArgs) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "extend",
                "config_validation",
                ApplicationError::Configuration(error.to_string()),
                EXIT_CONFIG,
            );
        }
    };

    if let Err(error) = config.booking.ensure_extension_within(args.by, args.amount) {
        return CommandResult::failure("extend", "extension", error, EXIT_REJECTED);
    }

    let request = BookingExtensionRequest {
        extend_by: args.by,
        amount: args.amount,
        current_end: args.current_end,
        hourly_rate: args.hourly_rate,
        daily_rate: args.daily_rate,
    };
    match compute_extension(&request) {
        Ok(extension) => CommandResult::success_with_data(
            "extend",
            format!(
                "extend by {} {} until {} for {}",
                extension.amount,
                args.by.unit(),
                extension.new_end,
                extension.extension_price.round_dp(2)
            ),
            Some(json!({ "extension": extension })),
        ),
        Err(error) => {
            CommandResult::failure("extend", "extension", error, EXIT_REJECTED)
        }
    }
}
