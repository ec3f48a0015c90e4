use shared::{Error, Result};
use solana_sdk::pubkey::Pubkey;
use std::collections::HashSet;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::types::Deduplicated;

/// Split newline-separated input into trimmed, non-blank entries
pub fn parse_address_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Remove repeated addresses, keeping the first occurrence of each
pub fn dedupe_addresses(addresses: &[String]) -> Deduplicated {
    let mut seen = HashSet::with_capacity(addresses.len());
    let mut unique = Vec::with_capacity(addresses.len());
    for address in addresses {
        if seen.insert(address.as_str()) {
            unique.push(address.clone());
        }
    }

    let duplicates_removed = addresses.len() - unique.len();
    if duplicates_removed > 0 {
        debug!("Removed {} duplicate addresses", duplicates_removed);
    }

    Deduplicated {
        addresses: unique,
        duplicates_removed,
    }
}

/// Validate a Solana address (base-58, 32 bytes)
pub fn validate_address(address: &str) -> Result<Pubkey> {
    if address.is_empty() {
        return Err(Error::EmptyInput("address".to_string()));
    }

    Pubkey::from_str(address).map_err(|e| {
        warn!("Invalid address format: {} - {}", address, e);
        Error::InvalidAddress(address.to_string())
    })
}

/// Validate a non-empty list of addresses, failing on the first bad entry
///
/// `field` names the list in the error raised when it is empty.
pub fn validate_addresses(addresses: &[String], field: &str) -> Result<Vec<Pubkey>> {
    if addresses.is_empty() {
        return Err(Error::EmptyInput(field.to_string()));
    }

    addresses.iter().map(|a| validate_address(a)).collect()
}
