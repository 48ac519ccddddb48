pub mod aggregate;
pub mod evaluator;
pub mod executor;
pub mod reduce;
