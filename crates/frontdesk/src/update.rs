use anyhow::Result;
use frontdesk_core::UpdateOutcome;

use crate::cli::{RecordArgs, SearchArgs};
use crate::config::Config;
use crate::logging;

pub fn run(config: &Config, action: String, search: SearchArgs, updates: RecordArgs) -> Result<()> {
    let store = config.store()?;
    let criteria = search.into_criteria();
    let updates = updates.into_updates();
    logging::verbose(format!(
        "searching for name={:?} phone={:?} date={:?} time={:?}",
        criteria.name, criteria.phone, criteria.date, criteria.time
    ));
    let outcome = store.update_appointment(&criteria, &action, &updates);
    match &outcome {
        UpdateOutcome::Updated { sheet, moved, .. } => {
            let verb = if *moved { "relocated to" } else { "updated on" };
            logging::stage("update", format!("{verb} worksheet {sheet}"));
        }
        UpdateOutcome::NotFound => logging::stage("update", "no matching appointment"),
        UpdateOutcome::MultipleMatches { matches } => {
            logging::stage("update", format!("{} candidates matched", matches.len()));
        }
        UpdateOutcome::MissingSearch => logging::stage("update", "no search criteria supplied"),
        UpdateOutcome::Error { code, message } => {
            logging::stage("update", format!("failed ({code}): {message}"));
        }
    }
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
