use bikerent_core::domain::coupon::Coupon;
use bikerent_core::errors::DomainError;
use bikerent_core::pricing::apply_coupon;
use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::json;

use crate::commands::{local_today, parse_date, CommandResult, EXIT_REJECTED};

#[derive(Debug, Clone, Args)]
pub struct CouponArgs {
    #[arg(long)]
    pub code: String,
    #[arg(long, help = "Discount percentage, 0 to 100")]
    pub percent: Decimal,
    #[arg(long, help = "Pre-discount subtotal")]
    pub subtotal: Decimal,
    #[arg(long, value_parser = parse_date)]
    pub expires: Option<NaiveDate>,
    #[arg(long)]
    pub inactive: bool,
    #[arg(long, value_parser = parse_date, help = "Day used for expiry (default: today)")]
    pub today: Option<NaiveDate>,
}

pub fn run(args: &CouponArgs) -> CommandResult {
    let mut coupon = Coupon::percent_off(args.code.clone(), args.percent);
    coupon.expiry_date = args.expires;
    coupon.is_active = !args.inactive;
    let today = args.today.unwrap_or_else(local_today);

    match apply_coupon(&coupon, args.subtotal, today) {
        Ok(discount) => {
            let total = (args.subtotal - discount).max(Decimal::ZERO);
            CommandResult::success_with_data(
                "coupon",
                format!("coupon {} takes {} off", coupon.code, discount.round_dp(2)),
                Some(json!({ "discount": discount, "total": total })),
            )
        }
        Err(error) => {
            CommandResult::failure("coupon", "coupon", DomainError::from(error), EXIT_REJECTED)
        }
    }
}
