pub mod contract;
pub mod email;
pub mod verification;

pub use contract::*;
pub use email::*;
pub use verification::*;
