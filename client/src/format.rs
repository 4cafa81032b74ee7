use prioritas_shared::colors::ColorStop;

/// Cell text for an indicator value. Missing values render as an empty cell.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        None => String::new(),
        Some(v) if !v.is_finite() => String::new(),
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
        Some(v) => format!("{v}"),
    }
}

/// Compact label for color bar ticks.
pub fn format_tick(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else if value.abs() >= 100.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

pub fn gradient_css(stops: &[ColorStop]) -> String {
    let parts: Vec<String> = stops
        .iter()
        .map(|stop| format!("{} {:.0}%", stop.color, stop.offset * 100.0))
        .collect();
    format!("linear-gradient(to right, {})", parts.join(", "))
}

/// 1-based "page x of y"; an empty table still reads as one page.
pub fn pager_label(page: usize, page_count: usize) -> String {
    let total = page_count.max(1);
    let current = (page + 1).min(total);
    format!("Halaman {current} dari {total}")
}
