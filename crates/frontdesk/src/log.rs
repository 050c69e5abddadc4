use anyhow::Result;
use frontdesk_core::LogOutcome;

use crate::cli::RecordArgs;
use crate::config::Config;
use crate::logging;

pub fn run(config: &Config, action: String, record: RecordArgs) -> Result<()> {
    let store = config.store()?;
    let record = record.into_record(action);
    logging::verbose(format!(
        "logging appointment for {}",
        record.patient_name.as_deref().unwrap_or("(unnamed)")
    ));
    let outcome = store.log_appointment(&record);
    match &outcome {
        LogOutcome::Logged { sheet, path } => {
            logging::stage("log", format!("recorded on worksheet {sheet} in {path}"));
        }
        LogOutcome::Error { code, message } => {
            logging::stage("log", format!("failed ({code}): {message}"));
        }
    }
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
