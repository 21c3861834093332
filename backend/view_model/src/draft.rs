//! Validation of the "start a fundraiser" form before it reaches the chain.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::is_known_category;
use crate::units::{parse_display_amount, ATOMIC_SCALE};

pub const MAX_DESCRIPTION_CHARS: usize = 180;
pub const MIN_MILESTONES: usize = 1;
pub const MAX_MILESTONES: usize = 5;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneDraft {
    pub name: String,
    /// Display units as typed.
    pub amount: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDraft {
    pub name: String,
    pub title: String,
    pub description: String,
    pub category: String,
    /// Display units as typed.
    pub amount_required: String,
    pub milestones: Vec<MilestoneDraft>,
}

/// A draft that passed validation, amounts in atomic units.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedDraft {
    pub name: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub amount_required: u64,
    pub milestones: Vec<(String, u64)>,
}

/// Field name → message, keyed the way the form renders them
/// (`milestone_2_amount`, `milestones_total`, ...).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DraftErrors(pub BTreeMap<String, String>);

impl DraftErrors {
    fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }
}

impl ProposalDraft {
    pub fn validate(&self) -> Result<ValidatedDraft, DraftErrors> {
        let mut errors = DraftErrors::default();

        for (field, value) in [
            ("name", &self.name),
            ("title", &self.title),
            ("description", &self.description),
        ] {
            if value.trim().is_empty() {
                errors.add(field, format!("{} is required", capitalise(field)));
            }
        }
        if self.description.chars().count() > MAX_DESCRIPTION_CHARS {
            errors.add(
                "description",
                format!("Description must be at most {MAX_DESCRIPTION_CHARS} characters"),
            );
        }
        if self.category.is_empty() {
            errors.add("category", "Category is required");
        } else if !is_known_category(&self.category) {
            errors.add("category", "Unknown category");
        }

        let amount_required = match parse_display_amount(&self.amount_required) {
            Ok(a) if a >= ATOMIC_SCALE => Some(a),
            _ => {
                errors.add("amountRequired", "Amount required must be at least 1");
                None
            }
        };

        if self.milestones.len() < MIN_MILESTONES || self.milestones.len() > MAX_MILESTONES {
            errors.add(
                "milestones",
                format!("Between {MIN_MILESTONES} and {MAX_MILESTONES} milestones are required"),
            );
        }

        let mut milestones = Vec::with_capacity(self.milestones.len());
        let mut total: u128 = 0;
        for (i, m) in self.milestones.iter().enumerate() {
            if m.name.trim().is_empty() {
                errors.add(format!("milestone_{i}_name"), "Milestone name is required");
            }
            match parse_display_amount(&m.amount) {
                Ok(amount) => {
                    total += amount as u128;
                    milestones.push((m.name.trim().to_string(), amount));
                }
                Err(_) => errors.add(format!("milestone_{i}_amount"), "Amount must be 0 or greater"),
            }
        }

        if let Some(required) = amount_required {
            if total != required as u128 {
                errors.add(
                    "milestones_total",
                    "Total milestone amounts must equal the required amount",
                );
            }
        }

        match amount_required {
            Some(amount_required) if errors.is_empty() => Ok(ValidatedDraft {
                name: self.name.trim().to_string(),
                title: self.title.trim().to_string(),
                description: self.description.trim().to_string(),
                category: self.category.clone(),
                amount_required,
                milestones,
            }),
            _ => Err(errors),
        }
    }
}

fn capitalise(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
