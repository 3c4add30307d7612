//! Number formatting for the report tables.

/// `$`-prefixed price. Sub-0.0001 prices keep up to 10 decimals, trailing zeros trimmed.
pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) if p > 0.0 && p < 0.0001 => {
            let s = format!("{:.10}", p);
            format!("${}", s.trim_end_matches('0').trim_end_matches('.'))
        }
        Some(p) if p > 0.0 => format!("${:.6}", p),
        _ => "-".to_string(),
    }
}

/// `$`-prefixed amount with thousands separators, or `-` when absent.
pub fn format_usd(amount: Option<f64>) -> String {
    match amount {
        Some(a) if a > 0.0 => format!("${}", format_amount(a)),
        _ => "-".to_string(),
    }
}

pub fn format_percent(pct: Option<f64>) -> String {
    pct.filter(|p| p.is_finite())
        .map_or_else(|| "-".to_string(), |p| format!("{:.2}%", p))
}

pub fn format_count(n: u64) -> String {
    group_thousands(&n.to_string())
}

/// Thousands separators, at most three decimals, trailing zeros trimmed.
pub fn format_amount(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let s = format!("{:.3}", v.abs());
    let (int, frac) = s.split_once('.').unwrap_or((s.as_str(), ""));
    let frac = frac.trim_end_matches('0');
    let sign = if v < 0.0 { "-" } else { "" };
    if frac.is_empty() {
        format!("{}{}", sign, group_thousands(int))
    } else {
        format!("{}{}.{}", sign, group_thousands(int), frac)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
