pub mod coupon;
pub mod file;
pub mod membership;
pub mod order;
pub mod payment;
pub mod product;
pub mod user;

pub use coupon::{AppliedCoupon, Coupon, CouponDraft, CouponValidation, DiscountType};
pub use file::{FileType, ProductFileInfo};
pub use membership::{Membership, PurchaseMembershipRequest};
pub use order::{CheckoutItem, Order, OrderStatus, PlaceOrderRequest};
pub use payment::{PaymentMethod, PaymentSettings};
pub use product::{Package, Product, ProductCategory};
pub use user::UserProfile;
