pub mod error;
pub mod labels;
pub mod syncer;
pub mod types;
