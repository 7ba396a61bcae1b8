//! Data module
//!
//! Loads pre-computed feature tables and binary label arrays from JSON and
//! pairs them into index-aligned datasets.

pub mod dataset;
pub mod loader;

pub use dataset::{columns_to_array2, Dataset, DatasetInfo};
pub use loader::JsonLoader;
