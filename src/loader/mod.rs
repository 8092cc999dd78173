pub mod dataset;
pub mod schema;

pub use dataset::{load, DatasetBundle, SourcePaths};
