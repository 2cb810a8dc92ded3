pub mod api;
pub mod config;
pub mod domain;
pub mod errors;
pub mod payment;
pub mod pricing;
pub mod session;

pub use api::{ApiEnvelope, ApiError, Credentials, RentalApi, SessionGrant};
pub use domain::booking::{Booking, BookingId, BookingStatus};
pub use domain::catalog::{Account, Bike, BikeId, Place, PlaceId};
pub use domain::coupon::{Coupon, CouponCode};
pub use domain::extension::{BookingExtension, BookingExtensionRequest, ExtendBy};
pub use domain::rental::{PricingPeriod, RentalQuote, RentalQuoteRequest, RentalRates};
pub use errors::{
    ApplicationError, BookingWindowError, CouponError, DomainError, ExtensionError, InterfaceError,
};
pub use payment::{PaymentError, PaymentGateway, PaymentReceipt, PaymentRequest};
pub use pricing::{DeterministicQuoteCalculator, QuoteCalculator};
pub use session::{FileSessionStore, InMemorySessionStore, SessionError, SessionStore};
