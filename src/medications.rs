//! Medication list operations on the user record.

use serde::Deserialize;
use thiserror::Error;

use crate::models::record::{Medication, UserRecord};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MedicationError {
    #[error("Medication name is required")]
    EmptyName,

    #[error("Medication time is required")]
    EmptyTime,
}

/// Medication entry as submitted by the user.
#[derive(Debug, Clone, Deserialize)]
pub struct MedicationInput {
    pub name: String,
    pub time: String,
}

/// Append a medication, not yet taken.
pub fn add_medication(
    record: &mut UserRecord,
    input: &MedicationInput,
) -> Result<(), MedicationError> {
    let name = input.name.trim();
    let time = input.time.trim();
    if name.is_empty() {
        return Err(MedicationError::EmptyName);
    }
    if time.is_empty() {
        return Err(MedicationError::EmptyTime);
    }
    record.medications.push(Medication::new(name, time));
    Ok(())
}

/// Mark the first medication with this name as taken.
/// Returns whether one matched. Score fields are left alone.
pub fn mark_medication_taken(record: &mut UserRecord, name: &str) -> bool {
    match record.medications.iter_mut().find(|m| m.name == name) {
        Some(medication) => {
            medication.taken = true;
            true
        }
        None => false,
    }
}

/// (taken, total) for today's list.
pub fn adherence(record: &UserRecord) -> (usize, usize) {
    let taken = record.medications.iter().filter(|m| m.taken).count();
    (taken, record.medications.len())
}
