//! Decimal ETH and wei conversion.
//!
//! Conversions are exact at the wei level: fractional parts beyond 18 digits
//! are rejected rather than rounded, and no float ever touches an amount.

use alloy::primitives::utils::{format_ether, parse_ether, UnitsError};
use alloy::primitives::U256;

/// Parses an operator-entered decimal ETH string into wei.
pub fn to_wei(amount: &str) -> Result<U256, UnitsError> {
    parse_ether(amount.trim())
}

/// Renders a wei amount as decimal ETH with trailing zeros trimmed, keeping
/// one fractional digit ("1.0", never "1.").
pub fn from_wei(wei: U256) -> String {
    let full = format_ether(wei);
    match full.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                format!("{whole}.0")
            } else {
                format!("{whole}.{frac}")
            }
        }
        None => format!("{full}.0"),
    }
}
