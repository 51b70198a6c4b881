pub mod attributes;
pub mod fetch;
pub mod geometry;
pub mod location;
pub mod output;
pub mod parser;
pub mod sanitize;
pub mod stats;
pub mod transform;
