// ---------------------------------------------------------------------------
// Display formatting helpers shared by the page renderers
// ---------------------------------------------------------------------------

/// `5_400_000.0` → `$5.4M`
pub fn format_millions(v: f64) -> String {
    format!("${:.1}M", v / 1_000_000.0)
}

/// Value already expressed in millions: `2.5` → `$2.5M`
pub fn format_in_millions(v: f64) -> String {
    format!("${v:.1}M")
}

/// `12_345.0` → `$12.3K`
pub fn format_thousands(v: f64) -> String {
    format!("${:.1}K", v / 1_000.0)
}

/// `1234.5` → `$1,235`
pub fn format_currency_whole(v: f64) -> String {
    let s = format!("{:.0}", v.abs());
    let sign = if v < 0.0 && s != "0" { "-" } else { "" };
    format!("{sign}${}", group_thousands(&s))
}

/// `23.456` → `$23.46`
pub fn format_currency(v: f64) -> String {
    format!("${v:.2}")
}

/// `1234567` → `1,234,567`
pub fn format_count(n: u64) -> String {
    group_thousands(&n.to_string())
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
