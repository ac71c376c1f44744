//! Pipeline module - the transformation stages and their persistence

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputer;
pub mod loader;
pub mod metrics;
pub mod rank;
pub mod runner;
pub mod schema;
pub mod writer;

pub use cleaner::*;
pub use config::*;
pub use error::*;
pub use imputer::*;
pub use loader::*;
pub use metrics::*;
pub use rank::*;
pub use runner::*;
pub use schema::*;
pub use writer::*;
