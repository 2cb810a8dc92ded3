use bikerent_core::pricing::validate_booking_window;
use chrono::NaiveDateTime;
use clap::Args;

use crate::commands::{local_now, parse_date_time, CommandResult, EXIT_REJECTED};

#[derive(Debug, Clone, Args)]
pub struct WindowArgs {
    #[arg(long, value_parser = parse_date_time)]
    pub start: NaiveDateTime,
    #[arg(long, value_parser = parse_date_time)]
    pub end: NaiveDateTime,
    #[arg(long, value_parser = parse_date_time, help = "Reference time (default: now)")]
    pub now: Option<NaiveDateTime>,
}

pub fn run(args: &WindowArgs) -> CommandResult {
    let now = args.now.unwrap_or_else(local_now);

    match validate_booking_window(args.start, args.end, now) {
        Ok(()) => CommandResult::success("window", "booking window is valid"),
        Err(error) => {
            CommandResult::failure("window", "booking_window", error, EXIT_REJECTED)
        }
    }
}
