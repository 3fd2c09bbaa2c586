//! Token amount codec
//!
//! Converts between human-readable decimal strings ("10.5") and integer
//! base-unit representations (`10_500_000` at 6 decimals). Using the wrong
//! decimals for a chain/token pair silently mis-scales amounts by orders of
//! magnitude, so all conversion goes through this one module.
//!
//! Excess fractional digits are truncated, never rounded up: an approval
//! must not exceed what the user asked for.

use alloy::primitives::U256;

use crate::error::EncodingError;

/// Parse a decimal string into token base units (`amount * 10^decimals`).
///
/// Fractional digits beyond `decimals` are truncated. Returns an error for
/// empty, negative, malformed, or overflowing inputs. Zero is representable
/// here; callers that need positivity check it separately.
pub fn parse_base_units(amount: &str, decimals: u8) -> Result<U256, EncodingError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(EncodingError::InvalidAmount("empty amount".to_string()));
    }

    let (int_part, frac_part) = match amount.split_once('.') {
        Some((i, f)) => (i, f),
        None => (amount, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(EncodingError::InvalidAmount(format!(
            "malformed amount '{amount}'"
        )));
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(EncodingError::InvalidAmount(format!(
            "malformed amount '{amount}'"
        )));
    }

    let scale = pow10(decimals)?;

    let int_units = if int_part.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(int_part, 10)
            .map_err(|_| EncodingError::InvalidAmount(format!("malformed amount '{amount}'")))?
            .checked_mul(scale)
            .ok_or_else(|| EncodingError::InvalidAmount(format!("amount '{amount}' overflows")))?
    };

    // Truncate, never round: keep at most `decimals` fractional digits
    let kept: String = frac_part.chars().take(decimals as usize).collect();
    let frac_units = if kept.is_empty() {
        U256::ZERO
    } else {
        let parsed = U256::from_str_radix(&kept, 10)
            .map_err(|_| EncodingError::InvalidAmount(format!("malformed amount '{amount}'")))?;
        // Scale up for omitted trailing digits: "5" at 6 decimals is 500000
        parsed
            .checked_mul(pow10(decimals - kept.len() as u8)?)
            .ok_or_else(|| EncodingError::InvalidAmount(format!("amount '{amount}' overflows")))?
    };

    int_units
        .checked_add(frac_units)
        .ok_or_else(|| EncodingError::InvalidAmount(format!("amount '{amount}' overflows")))
}

/// Format base units back into a decimal string, trimming trailing
/// fractional zeros. The inverse of [`parse_base_units`] for values it can
/// represent exactly.
pub fn format_base_units(units: U256, decimals: u8) -> String {
    if decimals == 0 {
        return units.to_string();
    }
    let raw = units.to_string();
    let decimals = decimals as usize;
    let (int_part, frac_part) = if raw.len() > decimals {
        let split = raw.len() - decimals;
        (raw[..split].to_string(), raw[split..].to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", raw, width = decimals))
    };
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part
    } else {
        format!("{int_part}.{frac_part}")
    }
}

fn pow10(exp: u8) -> Result<U256, EncodingError> {
    U256::from(10u64)
        .checked_pow(U256::from(exp))
        .ok_or_else(|| EncodingError::InvalidAmount(format!("unsupported decimals {exp}")))
}
