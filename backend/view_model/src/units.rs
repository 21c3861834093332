//! Atomic ↔ display currency conversion.
//!
//! The chain stores integers of the smallest indivisible unit; people read
//! and type decimal display units. `1 display unit = 10^6 atomic units`.

use crate::errors::{Result, ViewError};

/// Atomic units per display unit.
pub const ATOMIC_SCALE: u64 = 1_000_000;

/// Fractional digits a display amount may carry.
pub const DISPLAY_DECIMALS: usize = 6;

/// Convert atomic units to display units.
pub fn to_display_units(atomic: u64) -> f64 {
    atomic as f64 / ATOMIC_SCALE as f64
}

/// Convert display units to atomic units.
///
/// Fails on negative or non-finite input, on more than six fractional
/// digits, and when the result would not fit in a `u64`.
pub fn to_atomic_units(display: f64) -> Result<u64> {
    if !display.is_finite() {
        return Err(ViewError::InvalidAmount(format!(
            "{display} is not a finite number"
        )));
    }
    if display < 0.0 {
        return Err(ViewError::InvalidAmount(format!("{display} is negative")));
    }

    let scaled = display * ATOMIC_SCALE as f64;
    if scaled >= u64::MAX as f64 {
        return Err(ViewError::InvalidAmount(format!("{display} is too large")));
    }

    // A six-decimal value converts back to the very same float; anything
    // carrying further digits, however small, does not.
    let atomic = scaled.round() as u64;
    if to_display_units(atomic) != display {
        return Err(ViewError::InvalidAmount(format!(
            "{display} has more than {DISPLAY_DECIMALS} decimal places"
        )));
    }

    Ok(atomic)
}

/// Parse a user-typed display amount (e.g. `"12.5"`) into atomic units.
///
/// Exact: no floating point is involved.
pub fn parse_display_amount(input: &str) -> Result<u64> {
    let text = input.trim();
    if text.is_empty() {
        return Err(ViewError::InvalidAmount("amount is empty".to_string()));
    }
    if text.starts_with('-') {
        return Err(ViewError::InvalidAmount(format!("{text} is negative")));
    }

    let (whole, fraction) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(ViewError::InvalidAmount(format!("{text} is not a number")));
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) {
        return Err(ViewError::InvalidAmount(format!("{text} is not a number")));
    }
    if fraction.len() > DISPLAY_DECIMALS {
        return Err(ViewError::InvalidAmount(format!(
            "{text} has more than {DISPLAY_DECIMALS} decimal places"
        )));
    }

    let overflow = || ViewError::InvalidAmount(format!("{text} is too large"));

    let whole_units: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let padded = format!("{fraction:0<width$}", width = DISPLAY_DECIMALS);
    let fraction_units: u64 = padded.parse().map_err(|_| overflow())?;

    whole_units
        .checked_mul(ATOMIC_SCALE)
        .and_then(|w| w.checked_add(fraction_units))
        .ok_or_else(overflow)
}

/// Render atomic units as a display string with trailing zeros trimmed.
pub fn format_display_amount(atomic: u64) -> String {
    let whole = atomic / ATOMIC_SCALE;
    let fraction = atomic % ATOMIC_SCALE;
    if fraction == 0 {
        return whole.to_string();
    }
    let digits = format!("{fraction:0width$}", width = DISPLAY_DECIMALS);
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
