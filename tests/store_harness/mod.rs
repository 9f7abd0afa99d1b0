//! Shared test harness for collection store testing
//!
//! Provides `Ticket`, a small record defined through the public macros with
//! a natural key, status transitions and validation rules, plus helpers to
//! build catalog products for view-level scenarios.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//! use store_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
mod contract;

use catalog::core::entity::StatusTransition;
use catalog::core::validation::{RecordRules, filters, validators};
use catalog::entities::{Product, ProductStatus};
use catalog::{impl_record, impl_status};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Ticket: a record defined entirely outside the crate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    #[default]
    Open,
    Closed,
}

impl_status!(TicketStatus {
    Open => "open",
    Closed => "closed",
});

/// Test record with fields of every kind the filters care about
///
/// - `code`: natural key, normalized to uppercase
/// - `title`: display name
/// - `priority`: integer, for range and numeric sorting
/// - `tags`: list, for membership filters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(default)]
    pub id: Uuid,
    pub code: String,
    pub title: String,
    pub priority: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: TicketStatus,
}

fn ticket_rules() -> &'static RecordRules {
    static RULES: OnceLock<RecordRules> = OnceLock::new();
    RULES.get_or_init(|| {
        RecordRules::new()
            .filter("code", filters::trim())
            .filter("code", filters::uppercase())
            .validate("code", validators::required())
            .validate("title", validators::required())
    })
}

impl_record!(Ticket, "tickets",
    fields: [code, title, priority, tags, status],
    {
        fn natural_key_field() -> Option<&'static str> {
            Some("code")
        }

        fn display_name_field() -> Option<&'static str> {
            Some("title")
        }

        fn status_for(transition: StatusTransition) -> Option<&'static str> {
            Some(match transition {
                StatusTransition::Activate => TicketStatus::Open.as_str(),
                StatusTransition::Deactivate => TicketStatus::Closed.as_str(),
            })
        }

        fn rules() -> Option<&'static RecordRules> {
            Some(ticket_rules())
        }
    }
);

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create an open ticket with a nil id (the store assigns one)
pub fn ticket(code: &str, title: &str, priority: i64) -> Ticket {
    Ticket {
        id: Uuid::nil(),
        code: code.to_string(),
        title: title.to_string(),
        priority,
        tags: Vec::new(),
        status: TicketStatus::Open,
    }
}

/// Create a ticket carrying tags
pub fn tagged_ticket(code: &str, title: &str, priority: i64, tags: &[&str]) -> Ticket {
    Ticket {
        tags: tags.iter().map(|t| t.to_string()).collect(),
        ..ticket(code, title, priority)
    }
}

/// Create `n` tickets T-000, T-001, ... with increasing priorities
pub fn sample_batch(n: usize) -> Vec<Ticket> {
    (0..n)
        .map(|i| ticket(&format!("T-{:03}", i), &format!("Ticket {}", i), i as i64))
        .collect()
}

/// A product that passes every catalog rule
pub fn valid_product(sku: &str, name: &str, price: f64, status: ProductStatus) -> Product {
    Product::new(sku, name, price)
        .with_sizes(["S", "M", "L"])
        .with_colors(["#FFFFFF"])
        .with_fit("regular")
        .with_occasions(["casual"])
        .with_status(status)
}

/// Assert two id sequences are equal, with a readable message
pub fn assert_ids(actual: &[Uuid], expected: &[Uuid]) {
    assert_eq!(
        actual, expected,
        "expected ids {:?}, got {:?}",
        expected, actual
    );
}
