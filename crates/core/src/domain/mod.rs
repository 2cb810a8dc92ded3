pub mod booking;
pub mod catalog;
pub mod coupon;
pub mod extension;
pub mod rental;
