pub mod address;
pub mod jwt;
pub mod pricing;
pub mod wei;

pub use address::{is_valid_address, parse_address};
pub use jwt::*;
pub use pricing::{CartTotals, compute_cart_totals, line_amounts, requires_approval};
pub use wei::{amount_to_wei, format_token_amount, parse_wei, wei_to_amount};
