//! Lenient text-to-value coercions shared by query parsing and the CSV importer.

use chrono::NaiveDate;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Integer prefix of `s`: optional sign followed by at least one digit, after leading
/// whitespace. Trailing garbage is ignored, so `"45.9"` is 45 and `"12kg"` is 12.
pub fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    rest[..digits].parse::<i64>().ok().map(|n| sign * n)
}

fn digit_run(b: &[u8], from: usize) -> usize {
    b[from..].iter().take_while(|c| c.is_ascii_digit()).count()
}

/// Longest decimal prefix of `s` after leading whitespace: sign, digits, optional
/// fraction and exponent. `"1234.5 USD"` is 1234.5; `"$5"` and non-finite values
/// are absent.
pub fn amount(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let b = s.as_bytes();
    let mut end = usize::from(matches!(b.first(), Some(b'-' | b'+')));
    let int_digits = digit_run(b, end);
    end += int_digits;
    let mut frac_digits = 0;
    if b.get(end) == Some(&b'.') {
        frac_digits = digit_run(b, end + 1);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }
    if matches!(b.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(b.get(end + 1), Some(b'-' | b'+')));
        let exp_digits = digit_run(b, end + 1 + sign);
        if exp_digits > 0 {
            end += 1 + sign + exp_digits;
        }
    }
    s[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Calendar date in ISO or US month/day/year form.
pub fn date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_int_takes_prefix() {
        assert_eq!(leading_int("45"), Some(45));
        assert_eq!(leading_int(" 45.9"), Some(45));
        assert_eq!(leading_int("-3"), Some(-3));
        assert_eq!(leading_int("12kg"), Some(12));
        assert_eq!(leading_int(""), None);
        assert_eq!(leading_int("abc"), None);
        assert_eq!(leading_int("-"), None);
    }

    #[test]
    fn amount_rejects_non_finite() {
        assert_eq!(amount("18856.28"), Some(18856.28));
        assert_eq!(amount(" 5000 "), Some(5000.0));
        assert_eq!(amount("NaN"), None);
        assert_eq!(amount("inf"), None);
        assert_eq!(amount("n/a"), None);
        assert_eq!(amount("1e999"), None);
    }

    #[test]
    fn amount_takes_numeric_prefix() {
        assert_eq!(amount("1234.5 USD"), Some(1234.5));
        assert_eq!(amount("$5"), None);
        assert_eq!(amount("-12.75abc"), Some(-12.75));
        assert_eq!(amount(".5"), Some(0.5));
        assert_eq!(amount("7."), Some(7.0));
        assert_eq!(amount("2e3kg"), Some(2000.0));
        assert_eq!(amount("3e"), Some(3.0));
        assert_eq!(amount("."), None);
        assert_eq!(amount("-"), None);
    }

    #[test]
    fn date_accepts_iso_and_us() {
        let want = NaiveDate::from_ymd_opt(2024, 1, 31);
        assert_eq!(date("2024-01-31"), want);
        assert_eq!(date("01/31/2024"), want);
        assert_eq!(date("31.01.2024"), None);
    }
}
