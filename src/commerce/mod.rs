pub mod shopify;

pub use shopify::{search_catalog, CommerceError, ProductSummary};
