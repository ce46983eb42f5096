//! Numeric display helpers: fraction approximation, DMS angles, number
//! naming, humanized durations, and decimal expansion of exact
//! rationals.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

const MAX_DENOM_TO_TEST: i64 = 10_000;

/// Best small fraction for a decimal, searching denominators up to
/// 10 000. Returns `None` when nothing lands within `max_error`.
pub fn approx_fraction(decimal: f64, max_error: f64) -> Option<(i64, i64)> {
    if !decimal.is_finite() {
        return None;
    }
    let mut best: Option<(i64, i64, f64)> = None;
    for d in 1..=MAX_DENOM_TO_TEST {
        let n = (decimal * d as f64).round();
        let err = (decimal - n / d as f64).abs();
        if err < max_error && best.map_or(true, |(_, _, e)| err < e) {
            best = Some((n as i64, d, err));
            if err == 0.0 {
                break;
            }
        }
    }
    best.map(|(n, d, _)| (n, d))
}

/// `0.25` -> `"1 / 4"`. Falls back to the exact float-to-rational
/// conversion when the bounded search fails.
pub fn to_fraction(num: f64, max_error: f64) -> String {
    match approx_fraction(num, max_error) {
        Some((n, d)) => format!("{} / {}", n, d),
        None => match BigRational::from_float(num) {
            Some(r) => format!("{} / {}", r.numer(), r.denom()),
            None => num.to_string(),
        },
    }
}

/// `2.5` -> `"2 1 / 2"`, `-0.75` -> `"-3 / 4"`.
pub fn to_mixed_fraction(num: f64, max_error: f64) -> String {
    let (n, d) = match approx_fraction(num.abs(), max_error) {
        Some(f) => f,
        None => return to_fraction(num, max_error),
    };
    let int_part = n / d;
    let rem = n % d;
    let sign = if num < 0.0 { "-" } else { "" };
    match (int_part, rem) {
        (0, 0) => "0".to_string(),
        (0, _) => format!("{}{} / {}", sign, rem, d),
        (_, 0) => format!("{}{}", sign, int_part),
        _ => format!("{}{} {} / {}", sign, int_part, rem, d),
    }
}

/// Degrees to a degree-minute-second string, seconds to 5 decimals.
pub fn format_dms(angle: f64) -> String {
    let deg = angle.floor();
    let min = (60.0 * (angle - deg)).floor();
    let sec = (60.0 * (angle - deg) - min) * 60.0;
    format!("{}° {}' {:.5}\"", deg, min, sec)
}

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];
const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];
const SCALES: [&str; 12] = [
    "", "thousand", "million", "billion", "trillion", "quadrillion", "quintillion",
    "sextillion", "septillion", "octillion", "nonillion", "decillion",
];

fn name_under_1000(n: u64, out: &mut Vec<String>) {
    let hundreds = n / 100;
    let rest = n % 100;
    if hundreds > 0 {
        out.push(format!("{} hundred", ONES[hundreds as usize]));
    }
    if rest >= 20 {
        let tens = rest / 10;
        let ones = rest % 10;
        if ones > 0 {
            out.push(format!("{}-{}", TENS[tens as usize], ONES[ones as usize]));
        } else {
            out.push(TENS[tens as usize].to_string());
        }
    } else if rest > 0 {
        out.push(ONES[rest as usize].to_string());
    }
}

/// Short-scale English name of an integer: `1000` -> `"one thousand"`.
/// Input is truncated to its integer part.
pub fn number_name(num: f64) -> String {
    if !num.is_finite() {
        return num.to_string();
    }
    let negative = num < 0.0;
    let mut n = num.abs().trunc();
    if n == 0.0 {
        return "zero".to_string();
    }

    // Split into base-1000 groups, least significant first
    let mut groups = Vec::new();
    while n >= 1.0 {
        groups.push((n % 1000.0) as u64);
        n = (n / 1000.0).trunc();
    }
    if groups.len() > SCALES.len() {
        return format!("{:e}", num);
    }

    let mut parts = Vec::new();
    for (i, &g) in groups.iter().enumerate().rev() {
        if g == 0 {
            continue;
        }
        let mut words = Vec::new();
        name_under_1000(g, &mut words);
        let mut chunk = words.join(" ");
        if !SCALES[i].is_empty() {
            chunk.push(' ');
            chunk.push_str(SCALES[i]);
        }
        parts.push(chunk);
    }

    let body = parts.join(" ");
    if negative {
        format!("negative {}", body)
    } else {
        body
    }
}

/// Humanize a duration in seconds: `3661.5` -> `"1 hour, 1 minute, 1.5 seconds"`.
pub fn format_seconds(seconds: f64) -> String {
    if !seconds.is_finite() {
        return seconds.to_string();
    }
    let negative = seconds < 0.0;
    let mut rem = seconds.abs();

    const UNITS: [(&str, f64); 4] = [
        ("year", 31_536_000.0),
        ("day", 86_400.0),
        ("hour", 3_600.0),
        ("minute", 60.0),
    ];

    let mut parts = Vec::new();
    for (name, span) in UNITS {
        let count = (rem / span).trunc();
        if count >= 1.0 {
            rem -= count * span;
            let plural = if count == 1.0 { "" } else { "s" };
            parts.push(format!("{} {}{}", count, name, plural));
        }
    }
    if parts.is_empty() || rem > 0.0 {
        let secs = (rem * 1e6).round() / 1e6;
        let plural = if secs == 1.0 { "" } else { "s" };
        parts.push(format!("{} second{}", secs, plural));
    }

    let body = parts.join(", ");
    if negative {
        format!("-{}", body)
    } else {
        body
    }
}

/// Decimal expansion of an exact rational with `precision` significant
/// digits, used by the big-number display mode. Falls back to exponent
/// notation outside a readable magnitude window.
pub fn decimal_str(r: &BigRational, precision: u32) -> String {
    if r.is_zero() {
        return "0".to_string();
    }
    let precision = precision.max(1) as i64;
    let negative = r.is_negative();
    let a = r.abs();

    // Order of magnitude: largest e with 10^e <= a
    let mut e: i64 = (a.numer().to_string().len() as i64) - (a.denom().to_string().len() as i64);
    let ten = BigInt::from(10);
    let pow10 = |k: i64| -> BigRational {
        if k >= 0 {
            BigRational::from_integer(ten.pow(k as u32))
        } else {
            BigRational::new(BigInt::from(1), ten.pow((-k) as u32))
        }
    };
    while pow10(e) > a {
        e -= 1;
    }
    while pow10(e + 1) <= a {
        e += 1;
    }

    // Round to `precision` significant digits (half away from zero)
    let scaled = &a * pow10(precision - 1 - e);
    let mut digits_int: BigInt = (scaled.numer() * 2 + scaled.denom()) / (scaled.denom() * 2);
    let mut digits = digits_int.to_string();
    if digits.len() as i64 > precision {
        // 999.97 rounded up to 1000...
        e += 1;
        digits_int /= &ten;
        digits = digits_int.to_string();
    }

    let trim = |s: &str| -> String {
        if s.contains('.') {
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            s.to_string()
        }
    };

    let sign = if negative { "-" } else { "" };
    if e >= -6 && e < precision {
        let body = if e >= 0 {
            let point = (e + 1) as usize;
            if point >= digits.len() {
                format!("{}{}", digits, "0".repeat(point - digits.len()))
            } else {
                trim(&format!("{}.{}", &digits[..point], &digits[point..]))
            }
        } else {
            let zeros = "0".repeat((-e - 1) as usize);
            trim(&format!("0.{}{}", zeros, digits))
        };
        format!("{}{}", sign, body)
    } else {
        let mantissa = if digits.len() > 1 {
            trim(&format!("{}.{}", &digits[..1], &digits[1..]))
        } else {
            digits
        };
        format!("{}{}e{}{}", sign, mantissa, if e >= 0 { "+" } else { "" }, e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn approx_fraction_finds_simple_ratios() {
        assert_eq!(approx_fraction(0.25, 0.01), Some((1, 4)));
        assert_eq!(approx_fraction(1.0 / 3.0, 0.0001), Some((1, 3)));
        assert_eq!(to_fraction(0.5, 0.01), "1 / 2");
    }

    #[test]
    fn mixed_fraction_forms() {
        assert_eq!(to_mixed_fraction(2.5, 0.01), "2 1 / 2");
        assert_eq!(to_mixed_fraction(-0.75, 0.01), "-3 / 4");
        assert_eq!(to_mixed_fraction(3.0, 0.01), "3");
    }

    #[test]
    fn dms_formats_degrees() {
        assert_eq!(format_dms(30.5), "30° 30' 0.00000\"");
    }

    #[test]
    fn number_names() {
        assert_eq!(number_name(0.0), "zero");
        assert_eq!(number_name(21.0), "twenty-one");
        assert_eq!(number_name(1000.0), "one thousand");
        assert_eq!(
            number_name(1_234_567.0),
            "one million two hundred thirty-four thousand five hundred sixty-seven"
        );
        assert_eq!(number_name(-5.0), "negative five");
    }

    #[test]
    fn seconds_humanized() {
        assert_eq!(format_seconds(0.0), "0 seconds");
        assert_eq!(format_seconds(61.0), "1 minute, 1 second");
        assert_eq!(format_seconds(3661.5), "1 hour, 1 minute, 1.5 seconds");
    }

    #[test]
    fn decimal_expansion_of_rationals() {
        let third = BigRational::new(BigInt::from(1), BigInt::from(3));
        assert_eq!(decimal_str(&third, 10), "0.3333333333");
        let neg = BigRational::new(BigInt::from(-1), BigInt::from(8));
        assert_eq!(decimal_str(&neg, 10), "-0.125");
        let big = BigRational::from_integer(BigInt::from(5050));
        assert_eq!(decimal_str(&big, 10), "5050");
        let tiny = BigRational::new(BigInt::from(1), BigInt::from(10_000_000_000u64));
        assert_eq!(decimal_str(&tiny, 4), "1e-10");
    }

    #[test]
    fn decimal_rounding_carries() {
        let x = BigRational::new(BigInt::from(99999), BigInt::from(100));
        // 999.99 at 4 significant digits rounds to 1000
        assert_eq!(decimal_str(&x, 4), "1000");
    }
}
