pub mod client;
pub mod types;
pub mod validation;

pub use client::SolanaClient;
pub use types::*;
pub use validation::{dedupe_addresses, parse_address_list, validate_address, validate_addresses};
