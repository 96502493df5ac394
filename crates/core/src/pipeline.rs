use crate::activity::{ActivityLog, ACTION_GENERATED};
use crate::config::AdvisorIdentity;
use crate::document::{compose, document_filename, render_pdf};
use crate::domain::recommendation::{classify, Classification};
use crate::intake::Intake;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub classification: Classification,
}

/// Form submission in, PDF out. The activity row is written only after the document exists.
pub fn generate_summary(
    form: &HashMap<String, String>,
    identity: &AdvisorIdentity,
    log: &ActivityLog,
    today: NaiveDate,
) -> anyhow::Result<GeneratedDocument> {
    let intake = Intake::from_form(form);
    let classification = classify(intake.profile.age, &intake.profile.risk);

    let layout = compose(&intake, &classification, identity, today)?;
    let bytes = render_pdf(&layout)?;

    log.record(&intake.profile.name, ACTION_GENERATED)?;

    tracing::info!(
        client = %intake.profile.name,
        bucket = %classification.bucket,
        goals = classification.goals.len(),
        bytes = bytes.len(),
        "generated financial summary"
    );

    Ok(GeneratedDocument {
        filename: document_filename(&intake.profile.name),
        bytes,
        classification,
    })
}
