//! Lamport/SOL conversion.
//!
//! Lamports are the source of truth everywhere; SOL only exists at the
//! presentation boundary, and user input is parsed as an exact decimal.

use crate::error::VaultError;

/// 1 SOL = 1,000,000,000 lamports.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

const SOL_DECIMALS: usize = 9;

/// Parse a decimal SOL amount such as `"1.5"` into lamports, exactly.
pub fn parse_sol(amount: &str) -> Result<u64, VaultError> {
    let invalid = |why: &str| VaultError::Encoding(format!("invalid SOL amount {amount:?}: {why}"));

    let trimmed = amount.trim();
    let (whole, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));

    if whole.is_empty() && frac.is_empty() {
        return Err(invalid("no digits"));
    }
    if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid("only digits and one decimal point are allowed"));
    }
    if frac.len() > SOL_DECIMALS {
        return Err(invalid("more than 9 decimal places"));
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("too large"))?
    };
    let frac_lamports: u64 = if frac.is_empty() {
        0
    } else {
        // Right-pad to nine digits: "5" -> 500_000_000.
        format!("{frac:0<width$}", width = SOL_DECIMALS)
            .parse()
            .map_err(|_| invalid("bad fraction"))?
    };

    whole
        .checked_mul(LAMPORTS_PER_SOL)
        .and_then(|l| l.checked_add(frac_lamports))
        .ok_or_else(|| invalid("too large"))
}

/// Render lamports as SOL with `decimals` places, rounding half up.
pub fn format_sol(lamports: u64, decimals: usize) -> String {
    let decimals = decimals.min(SOL_DECIMALS);
    let scale = 10u128.pow((SOL_DECIMALS - decimals) as u32);
    let rounded = (u128::from(lamports) + scale / 2) / scale;

    if decimals == 0 {
        return rounded.to_string();
    }
    let unit = 10u128.pow(decimals as u32);
    format!(
        "{}.{:0width$}",
        rounded / unit,
        rounded % unit,
        width = decimals
    )
}

/// Floating-point SOL, for display only.
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fractional_amounts_exactly() {
        assert_eq!(parse_sol("1.5").unwrap(), 1_500_000_000);
        assert_eq!(parse_sol("0.000000001").unwrap(), 1);
        assert_eq!(parse_sol(".25").unwrap(), 250_000_000);
        assert_eq!(parse_sol("2").unwrap(), 2 * LAMPORTS_PER_SOL);
        assert_eq!(parse_sol(" 3. ").unwrap(), 3 * LAMPORTS_PER_SOL);
    }

    #[test]
    fn parses_largest_representable_amount() {
        assert_eq!(parse_sol("18446744073.709551615").unwrap(), u64::MAX);
        assert!(parse_sol("18446744073.709551616").is_err());
    }

    #[test]
    fn rejects_malformed_amounts() {
        for input in ["", ".", "-1", "1.2.3", "1e9", "abc", "0.0000000001", "1,5"] {
            assert!(
                matches!(parse_sol(input), Err(VaultError::Encoding(_))),
                "{input:?} parsed"
            );
        }
    }

    #[test]
    fn formats_with_rounding() {
        assert_eq!(format_sol(1_500_000_000, 2), "1.50");
        assert_eq!(format_sol(1_005_000_000, 2), "1.01");
        assert_eq!(format_sol(1_004_999_999, 2), "1.00");
        assert_eq!(format_sol(1, 9), "0.000000001");
        assert_eq!(format_sol(2_600_000_000, 0), "3");
        assert_eq!(format_sol(u64::MAX, 9), "18446744073.709551615");
    }

    #[test]
    fn float_view_is_for_display_only() {
        assert_eq!(lamports_to_sol(1_500_000_000), 1.5);
    }
}
