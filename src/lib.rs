//! popstat: silver/gold batch stage for per-country statistics
//!
//! Reads a table of country statistics, normalizes its schema, deduplicates
//! the country key, imputes missing numbers, derives population density, and
//! writes the cleaned table to the silver tier and top-N rankings to the gold
//! tier as Parquet.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
