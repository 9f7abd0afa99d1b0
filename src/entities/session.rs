//! Styling session record of the customer history screen

use crate::core::validation::{RecordRules, filters, validators};
use crate::{impl_record, impl_status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Completed,
    Failed,
    #[default]
    Processing,
}

impl_status!(SessionStatus {
    Completed => "completed",
    Failed => "failed",
    Processing => "processing",
});

/// A product recommended by an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopMatch {
    pub product_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub price: f64,
}

/// One photo analysis run by a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub id: Uuid,
    pub upload_date: DateTime<Utc>,
    pub occasion: String,
    #[serde(default)]
    pub status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_thumbnail: Option<String>,
    #[serde(default)]
    pub body_type: Option<String>,
    #[serde(default)]
    pub recommended_size: Option<String>,
    #[serde(default)]
    pub product_count: u32,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub top_matches: Vec<TopMatch>,
}

impl Session {
    pub fn new(upload_date: DateTime<Utc>, occasion: &str, status: SessionStatus) -> Self {
        Self {
            id: Uuid::nil(),
            upload_date,
            occasion: occasion.to_string(),
            status,
            photo_thumbnail: None,
            body_type: None,
            recommended_size: None,
            product_count: 0,
            error_message: None,
            top_matches: Vec::new(),
        }
    }

    /// Record the analysis result of a completed session
    pub fn with_result(mut self, body_type: &str, recommended_size: &str, product_count: u32) -> Self {
        self.body_type = Some(body_type.to_string());
        self.recommended_size = Some(recommended_size.to_string());
        self.product_count = product_count;
        self
    }

    pub fn with_error(mut self, message: &str) -> Self {
        self.error_message = Some(message.to_string());
        self
    }

    pub fn with_top_matches(mut self, matches: Vec<TopMatch>) -> Self {
        self.top_matches = matches;
        self
    }

    /// Names of the recommended products
    pub fn top_match_names(&self) -> Vec<String> {
        self.top_matches.iter().map(|m| m.name.clone()).collect()
    }
}

fn session_rules() -> &'static RecordRules {
    static RULES: OnceLock<RecordRules> = OnceLock::new();
    RULES.get_or_init(|| {
        RecordRules::new()
            .filter("occasion", filters::trim())
            .validate("occasion", validators::required())
    })
}

impl_record!(Session, "sessions",
    fields: [
        upload_date, occasion, status, photo_thumbnail, body_type,
        recommended_size, product_count, error_message,
    ],
    {
        fn rules() -> Option<&'static RecordRules> {
            Some(session_rules())
        }
    }
);
