use clap::{ArgAction, Args, Parser, Subcommand};
use frontdesk_core::{AppointmentRecord, FieldUpdates, SearchCriteria};

#[derive(Parser, Debug)]
#[command(name = "frontdesk", about = "Appointment ledger CLI")]
pub struct Cli {
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,
    #[arg(long, global = true)]
    pub ledger: Option<String>,
    #[arg(long, global = true)]
    pub routing: Option<String>,
    #[arg(long, global = true)]
    pub sheet: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Log {
        #[arg(long, default_value = "book")]
        action: String,
        #[command(flatten)]
        record: RecordArgs,
    },
    Update {
        #[arg(long)]
        action: String,
        #[command(flatten)]
        search: SearchArgs,
        #[command(flatten)]
        updates: RecordArgs,
    },
    Show {
        #[arg(long)]
        worksheet: Option<String>,
    },
    Export {
        #[arg(long)]
        worksheet: Option<String>,
        #[arg(long, default_value = "appointments.csv")]
        output: String,
    },
}

/// Appointment fields shared by the log and update commands.
#[derive(Args, Clone, Debug, Default)]
pub struct RecordArgs {
    #[arg(long)]
    pub patient_name: Option<String>,
    #[arg(long)]
    pub patient_age_or_dob: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub department_or_doctor: Option<String>,
    #[arg(long)]
    pub reason: Option<String>,
    #[arg(long)]
    pub preferred_date: Option<String>,
    #[arg(long)]
    pub preferred_time: Option<String>,
    #[arg(long)]
    pub visit_type: Option<String>,
    #[arg(long)]
    pub existing_appointment: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl RecordArgs {
    pub fn into_record(self, action: String) -> AppointmentRecord {
        AppointmentRecord {
            action,
            patient_name: self.patient_name,
            patient_age_or_dob: self.patient_age_or_dob,
            phone: self.phone,
            department_or_doctor: self.department_or_doctor,
            reason: self.reason,
            preferred_date: self.preferred_date,
            preferred_time: self.preferred_time,
            visit_type: self.visit_type,
            existing_appointment: self.existing_appointment,
            notes: self.notes,
        }
    }

    pub fn into_updates(self) -> FieldUpdates {
        FieldUpdates {
            patient_name: self.patient_name,
            patient_age_or_dob: self.patient_age_or_dob,
            phone: self.phone,
            department_or_doctor: self.department_or_doctor,
            reason: self.reason,
            preferred_date: self.preferred_date,
            preferred_time: self.preferred_time,
            visit_type: self.visit_type,
            existing_appointment: self.existing_appointment,
            notes: self.notes,
        }
    }
}

#[derive(Args, Clone, Debug, Default)]
pub struct SearchArgs {
    #[arg(long)]
    pub search_name: Option<String>,
    #[arg(long)]
    pub search_phone: Option<String>,
    #[arg(long)]
    pub search_date: Option<String>,
    #[arg(long)]
    pub search_time: Option<String>,
}

impl SearchArgs {
    pub fn into_criteria(self) -> SearchCriteria {
        SearchCriteria {
            name: self.search_name,
            phone: self.search_phone,
            date: self.search_date,
            time: self.search_time,
        }
    }
}
