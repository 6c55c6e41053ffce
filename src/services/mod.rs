pub mod cart_service;
pub mod diagnostic_service;
pub mod notification_service;
pub mod order_service;
pub mod profile_service;
pub mod settlement_service;
pub mod token_service;
pub mod wallet_service;

pub use cart_service::*;
pub use diagnostic_service::*;
pub use notification_service::*;
pub use order_service::*;
pub use profile_service::*;
pub use settlement_service::*;
pub use token_service::*;
pub use wallet_service::*;
