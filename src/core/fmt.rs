use chrono::{Datelike, NaiveDate};

/// Currency display used across every renderer, fixed "$" prefix.
pub fn money(amount: f64) -> String {
    let formatted = number(amount.abs(), 2);
    if amount < 0.0 {
        format!("-${}", formatted)
    } else {
        format!("${}", formatted)
    }
}

/// Number with thousands separators and a fixed decimal count.
pub fn number(num: f64, decimals: usize) -> String {
    let formatted = format!("{:.decimals$}", num, decimals = decimals);
    let mut parts = formatted.splitn(2, '.');
    let integer = parts.next().unwrap_or("0");
    let decimal = parts.next();

    let mut grouped = String::new();
    let mut count = 0;
    for c in integer.chars().rev() {
        if count == 3 {
            grouped.push(',');
            count = 0;
        }
        grouped.push(c);
        count += 1;
    }
    let integer_grouped: String = grouped.chars().rev().collect();

    match decimal {
        Some(d) => format!("{}.{}", integer_grouped, d),
        None => integer_grouped,
    }
}

/// Percentage already scaled to 0..=100.
pub fn percentage(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Long-form date used on covers and timelines, e.g. "March 3, 2025".
pub fn long_date(date: NaiveDate) -> String {
    format!("{} {}, {}", date.format("%B"), date.day(), date.year())
}

/// Compact date for footers and spreadsheet cells.
pub fn short_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(1234.5), "$1,234.50");
        assert_eq!(money(1_000_000.0), "$1,000,000.00");
        assert_eq!(money(-42.0), "-$42.00");
    }

    #[test]
    fn number_respects_decimal_count() {
        assert_eq!(number(1234.567, 2), "1,234.57");
        assert_eq!(number(1234.567, 0), "1,235");
        assert_eq!(number(12.0, 1), "12.0");
    }

    #[test]
    fn percentage_renders_one_decimal() {
        assert_eq!(percentage(80.0), "80.0%");
        assert_eq!(percentage(33.333), "33.3%");
    }

    #[test]
    fn dates_format_for_covers_and_footers() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        assert_eq!(long_date(date), "March 3, 2025");
        assert_eq!(short_date(date), "03/03/2025");
    }
}
