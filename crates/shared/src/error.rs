use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Problem-details body the booking API returns on non-success statuses.
///
/// Every field is optional; bodies that are not JSON objects do not decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{}", display_text(self))]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ApiError {
    pub fn from_body(body: &str) -> Option<Self> {
        serde_json::from_str::<Self>(body.trim()).ok()
    }

    /// One-line description, preferring `detail` over `title`, followed by field errors.
    pub fn summary(&self) -> Option<String> {
        let head = self
            .detail
            .as_deref()
            .or(self.title.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty());

        let fields: Vec<String> = self
            .errors
            .iter()
            .flat_map(|(field, messages)| {
                messages.iter().map(move |message| format!("{field}: {message}"))
            })
            .collect();

        match (head, fields.is_empty()) {
            (Some(head), true) => Some(head.to_string()),
            (Some(head), false) => Some(format!("{head} ({})", fields.join("; "))),
            (None, false) => Some(fields.join("; ")),
            (None, true) => None,
        }
    }
}

fn display_text(problem: &ApiError) -> String {
    problem
        .summary()
        .unwrap_or_else(|| "unspecified API error".to_string())
}
