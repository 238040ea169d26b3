use crate::args::HistoryArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::FinancialRecord;
use crate::{Config, Result};
use tracing::debug;

/// Lists the stored records, oldest first. With `--last N` only the final `N` rows are shown.
pub fn history(config: &Config, args: &HistoryArgs) -> Result<Out<Vec<FinancialRecord>>> {
    let ledger = config.ledger();
    let mut records = ledger
        .load(config.categories())
        .pub_result(ErrorType::Persistence)?;
    debug!(
        "Loaded {} records from {}",
        records.len(),
        ledger.path().display()
    );

    if records.is_empty() {
        return Ok(Out::new(
            format!("No records in {}", ledger.path().display()),
            records,
        ));
    }

    if let Some(last) = args.last() {
        let skip = records.len().saturating_sub(last);
        records.drain(..skip);
    }

    let lines: Vec<String> = records
        .iter()
        .map(|r| {
            format!(
                "{}  salary {}  expenses {}  savings {}  {}",
                r.timestamp_string(),
                r.salary(),
                r.monthly_expenses(),
                r.monthly_savings(),
                r.status()
            )
        })
        .collect();
    Ok(Out::new(lines.join("\n"), records))
}
