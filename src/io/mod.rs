//! Loaders that turn line-oriented text into a [`Table`](crate::Table).

pub mod delimited;
pub mod json;
