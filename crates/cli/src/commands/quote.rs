use bikerent_core::domain::coupon::Coupon;
use bikerent_core::domain::rental::{PricingPeriod, RentalQuoteRequest, RentalRates};
use bikerent_core::pricing::compute_quote;
use chrono::{NaiveDate, NaiveDateTime};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::json;

use crate::commands::{local_today, parse_date, parse_date_time, CommandResult, EXIT_INVALID_INPUT};

#[derive(Debug, Clone, Args)]
pub struct QuoteArgs {
    #[arg(long, default_value = "day", help = "Pricing period: day, week or month")]
    pub period: PricingPeriod,
    #[arg(long, value_parser = parse_date_time, help = "Rental start (YYYY-MM-DD HH:MM)")]
    pub start: Option<NaiveDateTime>,
    #[arg(
        long,
        value_parser = parse_date_time,
        help = "Rental end; derived from the start for week and month"
    )]
    pub end: Option<NaiveDateTime>,
    #[arg(long)]
    pub per_day: Decimal,
    #[arg(long)]
    pub per_week: Option<Decimal>,
    #[arg(long)]
    pub per_month: Option<Decimal>,
    #[arg(long, requires = "discount_percent")]
    pub coupon_code: Option<String>,
    #[arg(long)]
    pub discount_percent: Option<Decimal>,
    #[arg(long, value_parser = parse_date)]
    pub coupon_expires: Option<NaiveDate>,
    #[arg(long, help = "Treat the coupon as deactivated")]
    pub coupon_inactive: bool,
    #[arg(long, value_parser = parse_date, help = "Day used for coupon expiry (default: today)")]
    pub today: Option<NaiveDate>,
}

pub fn run(args: &QuoteArgs) -> CommandResult {
    let rates = RentalRates {
        per_day: args.per_day,
        per_week: args.per_week,
        per_month: args.per_month,
    };
    if let Err(error) = rates.validate() {
        return CommandResult::failure("quote", "invalid_input", error, EXIT_INVALID_INPUT);
    }

    let today = args.today.unwrap_or_else(local_today);
    let mut request = RentalQuoteRequest::new(args.period, rates, today);
    // End first so that a weekly or monthly start can still overwrite it.
    if let Some(end) = args.end {
        request = request.with_end(end);
    }
    if let Some(start) = args.start {
        request = request.with_start(start);
    }

    let coupon = build_coupon(args);
    let coupon_issue = coupon
        .as_ref()
        .and_then(|coupon| coupon.ensure_usable_on(today).err())
        .map(|error| error.to_string());
    if let Some(coupon) = coupon {
        request = request.with_coupon(coupon);
    }

    let quote = compute_quote(&request);
    let message = if quote.is_bookable() {
        format!(
            "{} day(s) at {}/day: subtotal {}, discount {}, total {}",
            quote.duration_days,
            quote.effective_daily_rate.round_dp(2),
            quote.subtotal.round_dp(2),
            quote.discount_amount.round_dp(2),
            quote.total.round_dp(2),
        )
    } else if request.start.is_some() && request.end.is_some() {
        "start and end are the same instant; a rental lasts at least one day".to_string()
    } else {
        "start and end are both required for a quote".to_string()
    };

    let data = json!({
        "start": request.start,
        "end": request.end,
        "quote": quote,
        "coupon_issue": coupon_issue,
    });
    CommandResult::success_with_data("quote", message, Some(data))
}

fn build_coupon(args: &QuoteArgs) -> Option<Coupon> {
    let code = args.coupon_code.as_deref()?;
    let mut coupon = Coupon::percent_off(code, args.discount_percent.unwrap_or(Decimal::ZERO));
    coupon.expiry_date = args.coupon_expires;
    coupon.is_active = !args.coupon_inactive;
    Some(coupon)
}
