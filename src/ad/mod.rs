pub mod catalog;

pub use catalog::{AdCatalog, AdSegment};
