pub mod analyzer;
pub mod logical;
