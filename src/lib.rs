//! In-memory lazy evaluation of tabular queries.
//!
//! A [`DataFrame`] wraps an immutable [`Table`] and a chain of deferred
//! steps (select, filter, group by, join, order by, ...). Nothing is
//! evaluated until an action such as [`DataFrame::count`] or
//! [`DataFrame::collect`] runs, and every action evaluates the chain again
//! from the base table.
//!
//! ```
//! use skiff::{ColumnDef, DataType, Schema, Session, SessionConfig, col};
//!
//! let schema = Schema::new(vec![
//!     ColumnDef::new("name", DataType::Text, false),
//!     ColumnDef::new("hdr", DataType::Bool, false),
//!     ColumnDef::new("team1", DataType::Text, false),
//! ]);
//! let session = Session::new(SessionConfig::default());
//! let people = session
//!     .read_delimited_str("Ada;True;EDP\nBo;False;EDP\nCy;True;GA\n", schema)
//!     .unwrap();
//!
//! let per_team = people
//!     .filter(col("hdr"))
//!     .unwrap()
//!     .group_by("team1")
//!     .unwrap()
//!     .count()
//!     .unwrap()
//!     .collect_map()
//!     .unwrap();
//! assert_eq!(per_team.len(), 2);
//! ```

pub(crate) mod common;
pub(crate) mod core;
pub mod directory;
pub mod display;
pub(crate) mod exec;
pub mod expr;
pub(crate) mod frame;
pub mod io;
pub mod logging;
pub(crate) mod plan;
pub mod session;

pub use common::error::{FrameError, JoinSide, Result};
pub use crate::core::types::{DataType, Value, parse_bool};
pub use exec::executor::{Execution, PlanState};
pub use expr::{Expression, Operator, col, lit};
pub use frame::{
    column_def::ColumnDef,
    dataframe::{DataFrame, GroupedData, GroupedResult, count_ratio},
    row::Row,
    schema::{Schema, SchemaRef},
    table::Table,
};
pub use plan::logical::{
    AggregateFunction, Aggregation, JoinType, Plan, RowPredicate, count, max, min, sum,
};
pub use session::{Session, SessionConfig};
