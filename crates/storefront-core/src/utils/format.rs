/// Format an amount as dollars with thousands separators, e.g. `$1,200,000.00`
pub fn format_amount(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Format a decimal price string as sent by the server.
/// Returns the input unchanged if it is not a number.
pub fn format_price(price: &str) -> String {
    match price.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() => format_amount(amount),
        _ => price.to_string(),
    }
}

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        s.chars().take(max_chars).collect()
    } else {
        let truncated: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if date.len() >= 10 && date.is_char_boundary(10) {
        // Keep the YYYY-MM-DD part
        date[..10].to_string()
    } else {
        date.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "$0.00");
        assert_eq!(format_amount(99.9), "$99.90");
        assert_eq!(format_amount(1200000.0), "$1,200,000.00");
        assert_eq!(format_amount(-1234.5), "-$1,234.50");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price("1500000.00"), "$1,500,000.00");
        assert_eq!(format_price("12"), "$12.00");
        assert_eq!(format_price("n/a"), "n/a");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
        assert_eq!(truncate("Sepatu Lari Pria", 9), "Sepatu...");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-05-01T10:00:00.000000Z"), "May 01, 2024");
        assert_eq!(format_date("2024-05-01 10:00:00"), "2024-05-01");
        assert_eq!(format_date("soon"), "soon");
    }
}
