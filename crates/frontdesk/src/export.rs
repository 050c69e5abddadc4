use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::logging;

pub fn run(config: &Config, worksheet: Option<String>, output: String) -> Result<()> {
    let store = config.store()?;
    let sheet = worksheet.unwrap_or_else(|| config.sheet_name.clone());
    let rows = store
        .export_worksheet(&sheet, Path::new(&output))
        .with_context(|| format!("failed to export worksheet {sheet}"))?;
    logging::stage("export", format!("wrote {rows} row(s) to {output}"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::RecordArgs;
    use crate::log;
    use tempfile::TempDir;

    #[test]
    fn export_writes_csv_next_to_the_ledger() {
        let dir = TempDir::new().unwrap();
        let ledger = dir.path().join("ledger.json");
        let csv_path = dir.path().join("out.csv");
        let config = Config::from_env().with_overrides(
            Some(ledger.display().to_string()),
            Some("single".to_string()),
            Some("Appointments".to_string()),
        );
        let record = RecordArgs {
            patient_name: Some("Maria Lopez".to_string()),
            ..RecordArgs::default()
        };
        log::run(&config, "book".to_string(), record).unwrap();

        run(&config, None, csv_path.display().to_string()).unwrap();
        let contents = std::fs::read_to_string(&csv_path).unwrap();
        assert!(contents.starts_with("logged_at,action,patient_name"));
        assert!(contents.contains("Maria Lopez"));
    }

    #[test]
    fn exporting_a_missing_worksheet_fails() {
        let dir = TempDir::new().unwrap();
        let config = Config::from_env().with_overrides(
            Some(dir.path().join("ledger.json").display().to_string()),
            Some("single".to_string()),
            Some("Appointments".to_string()),
        );
        let result = run(
            &config,
            Some("Nope".to_string()),
            dir.path().join("out.csv").display().to_string(),
        );
        assert!(result.is_err());
    }
}
