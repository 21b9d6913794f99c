//! Proposal creation input, validated before anything reaches the ledger.

use std::fmt;

use ballot_types::NewProposal;
use serde::{Deserialize, Serialize};

pub const MIN_TITLE_LEN: usize = 5;
pub const MIN_DESCRIPTION_LEN: usize = 10;
pub const MIN_CANDIDATES: usize = 2;
pub const DEFAULT_DURATION_DAYS: u32 = 7;

/// One problem with one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Raw proposal input as a user typed it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalForm {
    pub title: String,
    pub description: String,
    #[serde(default = "default_candidates")]
    pub candidates: Vec<String>,
    #[serde(default = "default_duration_days")]
    pub duration_days: u32,
}

fn default_candidates() -> Vec<String> {
    vec!["Yes".to_string(), "No".to_string()]
}

fn default_duration_days() -> u32 {
    DEFAULT_DURATION_DAYS
}

impl Default for ProposalForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            candidates: default_candidates(),
            duration_days: default_duration_days(),
        }
    }
}

/// A form that passed validation. The configuration string is attached later.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidProposal {
    pub title: String,
    pub description: String,
    pub candidate_names: Vec<String>,
    pub duration_days: u32,
}

impl ValidProposal {
    pub fn into_new_proposal(self, zkp_configuration: String) -> NewProposal {
        NewProposal {
            title: self.title,
            description: self.description,
            candidate_names: self.candidate_names,
            duration_days: self.duration_days,
            zkp_configuration,
        }
    }
}

impl ProposalForm {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidates = candidates.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_duration_days(mut self, days: u32) -> Self {
        self.duration_days = days;
        self
    }

    /// Trim every field and check it, reporting all problems at once.
    pub fn validate(&self) -> Result<ValidProposal, Vec<FieldError>> {
        let mut errors = Vec::new();

        let title = self.title.trim().to_string();
        if title.chars().count() < MIN_TITLE_LEN {
            errors.push(FieldError {
                field: "title",
                message: format!("must be at least {MIN_TITLE_LEN} characters long"),
            });
        }

        let description = self.description.trim().to_string();
        if description.chars().count() < MIN_DESCRIPTION_LEN {
            errors.push(FieldError {
                field: "description",
                message: format!("must be at least {MIN_DESCRIPTION_LEN} characters long"),
            });
        }

        let candidate_names: Vec<String> = self
            .candidates
            .iter()
            .map(|c| c.trim().to_string())
            .collect();
        if candidate_names.iter().any(String::is_empty) {
            errors.push(FieldError {
                field: "candidates",
                message: "candidate names must not be empty".to_string(),
            });
        }
        if candidate_names.len() < MIN_CANDIDATES {
            errors.push(FieldError {
                field: "candidates",
                message: format!("provide at least {MIN_CANDIDATES} candidates"),
            });
        }

        if self.duration_days < 1 {
            errors.push(FieldError {
                field: "duration_days",
                message: "must be at least 1 day".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(ValidProposal {
                title,
                description,
                candidate_names,
                duration_days: self.duration_days,
            })
        } else {
            Err(errors)
        }
    }
}
