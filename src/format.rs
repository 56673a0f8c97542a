//! Number formatting for the price card
//!
//! Everything here is pure and deterministic. Rounding is half-up on the
//! magnitude (ties move away from zero), which `format!("{:.2}")` does not
//! guarantee, so fixed precision rounds the exact decimal expansion by hand.

use crate::constants::TREND_STEP_PERCENT;

/// Fraction digits needed to print any finite `f64` exactly (2^-1074 is the
/// smallest subnormal)
const EXACT_FRACTION_DIGITS: usize = 1074;

/// Renders `value` rounded to `decimals` places as `<int>.<fraction>`
///
/// The fraction is always zero-padded to `decimals` digits, so `1.5` at four
/// decimals is `"1.5000"`. The sign is kept, except when the rounded value is
/// zero (no `"-0.00"`). With `decimals == 0` only the integer part is printed.
///
/// Rounding works on the stored binary value, not on the literal that
/// produced it: `1.005` is stored as `1.00499999...` and rounds to `"1.00"`.
///
/// ```
/// use xrp_ticker::format::format_fixed;
///
/// assert_eq!(format_fixed(1.5, 4), "1.5000");
/// assert_eq!(format_fixed(-1.236, 2), "-1.24");
/// assert_eq!(format_fixed(0.125, 2), "0.13");
/// ```
pub fn format_fixed(value: f64, decimals: u32) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let decimals = decimals as usize;
    let exact = format!("{:.*}", EXACT_FRACTION_DIGITS, value.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));

    let mut digits: Vec<u8> = int_part.bytes().collect();
    digits.extend(frac_part.bytes().take(decimals));
    digits.resize(int_part.len() + decimals, b'0');

    let round_up = frac_part.as_bytes().get(decimals).is_some_and(|d| *d >= b'5');
    let mut int_len = int_part.len();
    if round_up && !carry_one(&mut digits) {
        digits.insert(0, b'1');
        int_len += 1;
    }

    let negative = value.is_sign_negative() && digits.iter().any(|d| *d != b'0');
    let mut out = String::with_capacity(digits.len() + 2);
    if negative {
        out.push('-');
    }
    out.extend(digits[..int_len].iter().map(|d| char::from(*d)));
    if decimals > 0 {
        out.push('.');
        out.extend(digits[int_len..].iter().map(|d| char::from(*d)));
    }
    out
}

/// Adds one to the last digit; false when the carry runs off the front
fn carry_one(digits: &mut [u8]) -> bool {
    for digit in digits.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            return true;
        }
    }
    false
}

/// Renders a USD amount, e.g. `$0.532`
pub fn format_usd(value: f64, decimals: u32) -> String {
    format!("${}", format_fixed(value, decimals))
}

/// Renders a large USD amount with a B/M/K suffix and two decimals
///
/// Values below one thousand are printed as the raw integer.
///
/// ```
/// use xrp_ticker::format::format_abbreviated;
///
/// assert_eq!(format_abbreviated(1_500_000_000), "$1.50B");
/// assert_eq!(format_abbreviated(999), "$999");
/// ```
pub fn format_abbreviated(value: i64) -> String {
    match value {
        v if v >= 1_000_000_000 => format!("${}B", format_fixed(v as f64 / 1e9, 2)),
        v if v >= 1_000_000 => format!("${}M", format_fixed(v as f64 / 1e6, 2)),
        v if v >= 1_000 => format!("${}K", format_fixed(v as f64 / 1e3, 2)),
        v => format!("${v}"),
    }
}

/// Like `format_fixed`, with a leading `+` when the value is strictly positive
pub fn format_signed(value: f64, decimals: u32) -> String {
    let body = format_fixed(value, decimals);
    if value > 0.0 {
        format!("+{body}")
    } else {
        body
    }
}

/// Renders a 24h change as a signed percentage, e.g. `+3.10%`
pub fn format_percent(value: f64) -> String {
    format!("{}%", format_signed(value, 2))
}

/// Direction of the 24h move, used to pick colours and glyphs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    /// Also used for an unchanged price
    Down,
}

impl Trend {
    /// Up only when the change is strictly positive; zero counts as down
    pub fn from_change(change_percent: f64) -> Self {
        if change_percent > 0.0 {
            Trend::Up
        } else {
            Trend::Down
        }
    }

    pub fn glyph(&self) -> char {
        match self {
            Trend::Up => '▲',
            Trend::Down => '▼',
        }
    }
}

/// Number of emphasis glyphs for a 24h change: one per full 5 points
pub fn trend_intensity(change_percent: f64) -> usize {
    // NaN saturates to 0
    (change_percent.abs() / TREND_STEP_PERCENT).floor() as usize
}

/// Emphasis glyphs for a 24h change, empty below 5 points
pub fn trend_glyphs(change_percent: f64) -> String {
    let glyph = Trend::from_change(change_percent).glyph();
    std::iter::repeat(glyph)
        .take(trend_intensity(change_percent))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_fixed_pads_fraction() {
        assert_eq!(format_fixed(1.5, 4), "1.5000");
        assert_eq!(format_fixed(0.0, 2), "0.00");
        assert_eq!(format_fixed(0.05, 3), "0.050");
        assert_eq!(format_fixed(12.0, 1), "12.0");
    }

    #[test]
    fn test_format_fixed_rounds_half_up() {
        assert_eq!(format_fixed(0.125, 2), "0.13");
        assert_eq!(format_fixed(2.5, 0), "3");
        assert_eq!(format_fixed(0.5321, 3), "0.532");
        assert_eq!(format_fixed(9.999, 2), "10.00");
    }

    #[test]
    fn test_format_fixed_keeps_sign() {
        assert_eq!(format_fixed(-1.236, 2), "-1.24");
        assert_eq!(format_fixed(-0.5, 2), "-0.50");
        assert_eq!(format_fixed(-0.001, 2), "0.00");
        assert_eq!(format_fixed(-0.0, 2), "0.00");
    }

    #[test]
    fn test_format_fixed_rounds_stored_value() {
        // 1.005 is stored just below the tie
        assert_eq!(format_fixed(1.005, 2), "1.00");
        // 2^-20 = 0.00000095367431640625 is an exact tie at 19 places
        assert_eq!(format_fixed(2f64.powi(-20), 19), "0.0000009536743164063");
        assert_eq!(format_fixed(99.5, 0), "100");
    }

    #[test]
    fn test_format_fixed_wide_and_large_values() {
        assert_eq!(format_fixed(1.0, 20), format!("1.{}", "0".repeat(20)));
        assert_eq!(
            format_fixed(1e21, 18),
            format!("1000000000000000000000.{}", "0".repeat(18))
        );
        assert_eq!(
            format_fixed(1e37, 2),
            "9999999999999999538762658202121142272.00"
        );
        assert_eq!(format_fixed(-1e300, 0).len(), 302);
    }

    #[test]
    fn test_format_fixed_non_finite() {
        assert_eq!(format_fixed(f64::NAN, 2), "NaN");
        assert_eq!(format_fixed(f64::INFINITY, 2), "inf");
    }

    #[test]
    fn test_format_abbreviated_thresholds() {
        assert_eq!(format_abbreviated(1_500_000_000), "$1.50B");
        assert_eq!(format_abbreviated(1_000_000_000), "$1.00B");
        assert_eq!(format_abbreviated(999_999_999), "$1000.00M");
        assert_eq!(format_abbreviated(2_346_000), "$2.35M");
        assert_eq!(format_abbreviated(1_000), "$1.00K");
        assert_eq!(format_abbreviated(999), "$999");
        assert_eq!(format_abbreviated(0), "$0");
    }

    #[test]
    fn test_signed_and_percent() {
        assert_eq!(format_percent(3.1), "+3.10%");
        assert_eq!(format_percent(-2.456), "-2.46%");
        assert_eq!(format_percent(0.0), "0.00%");
        assert_eq!(format_signed(0.01, 3), "+0.010");
        assert_eq!(format_usd(0.53219, 4), "$0.5322");
    }

    #[test]
    fn test_trend_boundary_at_zero() {
        assert_eq!(Trend::from_change(0.0001), Trend::Up);
        assert_eq!(Trend::from_change(0.0), Trend::Down);
        assert_eq!(Trend::from_change(-3.0), Trend::Down);
    }

    #[test]
    fn test_trend_intensity() {
        assert_eq!(trend_intensity(4.99), 0);
        assert_eq!(trend_intensity(5.0), 1);
        assert_eq!(trend_intensity(-12.3), 2);
        assert_eq!(trend_intensity(f64::NAN), 0);
        assert_eq!(trend_glyphs(10.2), "▲▲");
        assert_eq!(trend_glyphs(-15.0), "▼▼▼");
        assert_eq!(trend_glyphs(1.0), "");
    }
}
