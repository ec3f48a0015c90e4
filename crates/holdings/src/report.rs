use shared::models::{RunReport, TokenFailure, TokenReport};
use std::fmt;

/// Balance with up to six decimals, trailing zeros removed
pub fn format_amount(amount: f64) -> String {
    let formatted = format!("{:.6}", amount);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn format_percentage(percentage: f64) -> String {
    format!("{:.4}%", percentage)
}

pub fn render_json(report: &RunReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

pub fn render_text(report: &RunReport) -> String {
    TextReport(report).to_string()
}

/// Plain-text rendering of a run, one block per token
struct TextReport<'a>(&'a RunReport);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;

        for outcome in &report.tokens {
            match outcome {
                Ok(token) => write_token(f, token)?,
                Err(failure) => write_failure(f, failure)?,
            }
            writeln!(f)?;
        }

        writeln!(f, "Wallets checked: {}", report.wallet_count)?;
        if report.duplicates_removed > 0 {
            writeln!(f, "Duplicates removed: {}", report.duplicates_removed)?;
        }
        let elapsed = report.finished_at - report.started_at;
        writeln!(f, "Completed in {} ms", elapsed.num_milliseconds())
    }
}

fn write_token(f: &mut fmt::Formatter<'_>, token: &TokenReport) -> fmt::Result {
    match token.info.as_ref().and_then(|i| i.label()) {
        Some(label) => writeln!(f, "== {} ({})", label, token.token_address)?,
        None => writeln!(f, "== {}", token.token_address)?,
    }

    writeln!(f, "Total supply: {}", format_amount(token.total_supply))?;

    if let Some(info) = &token.info {
        if let Some(usd) = info.usd_price {
            write!(f, "Price: ${}", usd)?;
            if let Some(sol) = info.sol_price {
                write!(f, " ({} SOL)", sol)?;
            }
            writeln!(f)?;
        }
    }

    let width = token
        .balances
        .iter()
        .map(|b| b.address.len())
        .max()
        .unwrap_or(0);

    for record in &token.balances {
        write!(
            f,
            "  {:<width$}  {:>20}  {:>10}",
            record.address,
            format_amount(record.balance),
            format_percentage(record.percentage),
            width = width
        )?;
        if let Some(error) = &record.error {
            write!(f, "  error: {}", error)?;
        }
        writeln!(f)?;
    }

    writeln!(f, "Total balance: {}", format_amount(token.total_balance))?;
    writeln!(
        f,
        "Percentage of supply: {}",
        format_percentage(token.percentage_of_supply)
    )?;

    if let Some(usd) = token.total_value_usd() {
        write!(f, "Value: ${:.2}", usd)?;
        if let Some(sol) = token.total_value_sol() {
            write!(f, " ({:.4} SOL)", sol)?;
        }
        writeln!(f)?;
    }

    Ok(())
}

fn write_failure(f: &mut fmt::Formatter<'_>, failure: &TokenFailure) -> fmt::Result {
    writeln!(f, "== {}", failure.token_address)?;
    writeln!(f, "Error: {}", failure.error)
}
