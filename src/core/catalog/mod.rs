//! Product attribute registry
//!
//! Config-driven schemas for the per-type product attributes, plus the
//! endpoints the dashboard uses to fetch and check them.

#[cfg(feature = "ssr")]
pub mod api;
pub mod registry;

#[cfg(feature = "ssr")]
pub use api::catalog_api_router;
pub use registry::{
    AttributeError, AttributeField, AttributeSchema, AttributeValue, FieldKind,
    ProductAttributes, ProductTypeRegistry,
};
