pub mod column_def;
pub mod dataframe;
pub mod row;
pub mod schema;
pub mod table;
