//! Savings report rendering.
//!
//! Thin presentation layer: takes the two scalar metrics and prints a
//! boxed Metric/Amount table with a centered title. Currency formatting is
//! driven by the [`CurrencyFormat`] config value, never by process-global
//! locale state.

use console::style;

use crate::config::CurrencyFormat;
use crate::metrics::ContractMetrics;

/// Render an amount like `$1,234,567.89` (or `-$12.00`).
pub fn format_currency(amount: f64, fmt: &CurrencyFormat) -> String {
    let negative = amount.is_sign_negative() && amount != 0.0;
    let cents = (amount.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(fmt.thousands_separator);
        }
        grouped.push(digit);
    }

    format!(
        "{}{}{}{}{:02}",
        if negative { "-" } else { "" },
        fmt.symbol,
        grouped,
        fmt.decimal_separator,
        fraction
    )
}

/// Build the full savings report: bold centered title, rule, boxed table.
pub fn savings_report(metrics: &ContractMetrics, fmt: &CurrencyFormat) -> String {
    let rows = [
        ("Total Contract Value", format_currency(metrics.total_value, fmt)),
        ("Total Obligated Amount", format_currency(metrics.obligated, fmt)),
        ("Potential Savings", format_currency(metrics.savings(), fmt)),
    ];
    let table = render_grid(("Metric", "Amount"), &rows);

    let width = table.lines().next().map(|line| line.chars().count()).unwrap_or(0);
    let title = style("Contract Savings").bold().to_string();
    // Center by visible length, not by the styled string with its escapes.
    let pad = width.saturating_sub("Contract Savings".len()) / 2;

    format!("{}{title}\n{}\n{table}", " ".repeat(pad), "─".repeat(width))
}

/// Two-column box-drawing table in the fancy-grid style.
fn render_grid(headers: (&str, &str), rows: &[(&str, String)]) -> String {
    let left_width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .chain([headers.0.chars().count()])
        .max()
        .unwrap_or(0);
    let right_width = rows
        .iter()
        .map(|(_, amount)| amount.chars().count())
        .chain([headers.1.chars().count()])
        .max()
        .unwrap_or(0);

    let line = |l: char, fill: char, mid: char, r: char| {
        format!(
            "{l}{}{mid}{}{r}",
            fill.to_string().repeat(left_width + 2),
            fill.to_string().repeat(right_width + 2)
        )
    };
    let row = |left: &str, right: &str| {
        format!("│ {left:<left_width$} │ {right:<right_width$} │")
    };

    let mut out = Vec::new();
    out.push(line('╒', '═', '╤', '╕'));
    out.push(row(headers.0, headers.1));
    out.push(line('╞', '═', '╪', '╡'));
    for (i, (label, amount)) in rows.iter().enumerate() {
        if i > 0 {
            out.push(line('├', '─', '┼', '┤'));
        }
        out.push(row(label, amount));
    }
    out.push(line('╘', '═', '╧', '╛'));
    out.join("\n")
}
