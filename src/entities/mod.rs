pub mod bookings;
pub mod cart_items;
pub mod listings;
pub mod order_items;
pub mod orders;
pub mod profiles;
pub mod user_wallets;
pub mod vendors;

pub use bookings as booking_entity;
pub use cart_items as cart_item_entity;
pub use listings as listing_entity;
pub use order_items as order_item_entity;
pub use orders as order_entity;
pub use profiles as profile_entity;
pub use user_wallets as user_wallet_entity;
pub use vendors as vendor_entity;
