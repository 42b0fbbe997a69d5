pub mod coupon;
pub mod order;

pub use coupon::{ApplyTicket, CouponMessage, CouponSession, CouponState, MessageKind};
pub use order::{Checkout, OrderForm, PlacedOrder, PriceSummary};
