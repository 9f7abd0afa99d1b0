//! Product record of the catalog administration screen

use crate::core::entity::StatusTransition;
use crate::core::validation::{RecordRules, filters, validators};
use crate::{impl_record, impl_status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    Draft,
}

impl_status!(ProductStatus {
    Active => "active",
    Inactive => "inactive",
    Draft => "draft",
});

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub fit: String,
    #[serde(default)]
    pub occasions: Vec<String>,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// New active product without sizes, colors, fit or occasions
    ///
    /// The store rejects it until those are filled in.
    pub fn new(sku: &str, name: &str, price: f64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::nil(),
            sku: sku.to_string(),
            name: name.to_string(),
            description: String::new(),
            price,
            sizes: Vec::new(),
            colors: Vec::new(),
            fit: String::new(),
            occasions: Vec::new(),
            status: ProductStatus::Active,
            image: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_sizes<I: IntoIterator<Item = S>, S: Into<String>>(mut self, sizes: I) -> Self {
        self.sizes = sizes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_colors<I: IntoIterator<Item = S>, S: Into<String>>(mut self, colors: I) -> Self {
        self.colors = colors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_occasions<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        occasions: I,
    ) -> Self {
        self.occasions = occasions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fit(mut self, fit: &str) -> Self {
        self.fit = fit.to_string();
        self
    }

    pub fn with_status(mut self, status: ProductStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_image(mut self, image: &str) -> Self {
        self.image = Some(image.to_string());
        self
    }
}

fn product_rules() -> &'static RecordRules {
    static RULES: OnceLock<RecordRules> = OnceLock::new();
    RULES.get_or_init(|| {
        RecordRules::new()
            .filter("sku", filters::trim())
            .filter("sku", filters::uppercase())
            .filter("name", filters::trim())
            .filter("fit", filters::trim())
            .filter("fit", filters::lowercase())
            .filter("price", filters::round_decimals(2))
            .filter("sizes", filters::dedup_list())
            .filter("colors", filters::dedup_list())
            .filter("occasions", filters::dedup_list())
            .validate("sku", validators::required())
            .validate("sku", validators::string_length(1, 32))
            .validate("name", validators::required())
            .validate("price", validators::positive())
            .validate("sizes", validators::non_empty_list())
            .validate("colors", validators::non_empty_list())
            .validate(
                "colors",
                validators::matches(validators::hex_color(), "#RRGGBB color codes"),
            )
            .validate("fit", validators::required())
            .validate("occasions", validators::non_empty_list())
    })
}

impl_record!(Product, "products",
    fields: [
        sku, name, description, price, sizes, colors, fit, occasions,
        status, image, created_at, updated_at,
    ],
    {
        fn natural_key_field() -> Option<&'static str> {
            Some("sku")
        }

        fn display_name_field() -> Option<&'static str> {
            Some("name")
        }

        fn status_for(transition: StatusTransition) -> Option<&'static str> {
            Some(match transition {
                StatusTransition::Activate => ProductStatus::Active.as_str(),
                StatusTransition::Deactivate => ProductStatus::Inactive.as_str(),
            })
        }

        fn on_create(&mut self) {
            let now = Utc::now();
            self.created_at = now;
            self.updated_at = now;
        }

        fn on_update(&mut self) {
            self.updated_at = Utc::now();
        }

        fn rules() -> Option<&'static RecordRules> {
            Some(product_rules())
        }
    }
);

/// Headline figures of the product catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductSummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub draft: usize,
    /// Mean price, absent for an empty catalog
    pub average_price: Option<f64>,
}

impl ProductSummary {
    pub fn from_records(products: &[Product]) -> Self {
        let count = |status: ProductStatus| products.iter().filter(|p| p.status == status).count();
        let average_price = if products.is_empty() {
            None
        } else {
            let total: f64 = products.iter().map(|p| p.price).sum();
            Some((total / products.len() as f64 * 100.0).round() / 100.0)
        };

        Self {
            total: products.len(),
            active: count(ProductStatus::Active),
            inactive: count(ProductStatus::Inactive),
            draft: count(ProductStatus::Draft),
            average_price,
        }
    }
}
