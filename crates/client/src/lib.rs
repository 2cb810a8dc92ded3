pub mod http;
pub mod service;

pub use http::HttpRentalApi;
pub use service::{
    BookingDraft, BookingService, BookingSettings, CouponIssue, QuoteOutcome, SubmittedBooking,
};
