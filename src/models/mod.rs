pub mod cart;
pub mod common;
pub mod diagnostic;
pub mod order;
pub mod pagination;
pub mod payment;
pub mod token;

pub use cart::*;
pub use common::*;
pub use diagnostic::*;
pub use order::*;
pub use pagination::*;
pub use payment::*;
pub use token::*;
