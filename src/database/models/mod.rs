pub mod feature_flag;
pub mod order;
pub mod user;

pub use feature_flag::FeatureFlag;
pub use order::{DeliveryPreference, Order, OrderStatus, SuggestedItem};
pub use user::User;
