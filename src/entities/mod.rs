//! Record types of the catalog console
//!
//! - [`Product`]: catalog administration (natural key `sku`, activate/deactivate, duplicate)
//! - [`Session`]: customer styling-session history (delete and export only)

pub mod macros;
pub mod product;
pub mod session;

pub use product::{Product, ProductStatus, ProductSummary};
pub use session::{Session, SessionStatus, TopMatch};
