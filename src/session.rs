use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    common::error::Result,
    frame::{dataframe::DataFrame, row::Row, schema::SchemaRef, table::Table},
    io::{
        delimited::{self, DelimitedOptions},
        json,
    },
};

/// Settings shared by everything a [`Session`] loads or prints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub app_name: String,
    /// Field separator for delimited input.
    pub delimiter: u8,
    /// Skip the first line of delimited input.
    pub has_headers: bool,
    /// Rows printed by [`Session::show`].
    pub show_rows: usize,
    /// Placeholder that marks an absent value in text columns, e.g. a second
    /// team.
    pub null_sentinel: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            app_name: "skiff".to_owned(),
            delimiter: b';',
            has_headers: false,
            show_rows: 20,
            null_sentinel: "NA".to_owned(),
        }
    }
}

impl SessionConfig {
    /// Defaults overlaid with `SKIFF_DELIMITER`, `SKIFF_HAS_HEADERS` and
    /// `SKIFF_SHOW_ROWS`. Unusable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup("SKIFF_DELIMITER") {
            match parse_delimiter(&raw) {
                Some(delimiter) => self.delimiter = delimiter,
                None => warn!(value = %raw, "ignoring SKIFF_DELIMITER, expected one ASCII character"),
            }
        }
        if let Some(raw) = lookup("SKIFF_HAS_HEADERS") {
            match raw.parse() {
                Ok(has_headers) => self.has_headers = has_headers,
                Err(_) => warn!(value = %raw, "ignoring SKIFF_HAS_HEADERS, expected true or false"),
            }
        }
        if let Some(raw) = lookup("SKIFF_SHOW_ROWS") {
            match raw.parse() {
                Ok(show_rows) => self.show_rows = show_rows,
                Err(_) => warn!(value = %raw, "ignoring SKIFF_SHOW_ROWS, expected a row count"),
            }
        }

        self
    }

    #[must_use]
    pub fn with_app_name(mut self, name: &str) -> Self {
        name.clone_into(&mut self.app_name);
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    #[must_use]
    pub fn with_show_rows(mut self, rows: usize) -> Self {
        self.show_rows = rows;
        self
    }

    #[must_use]
    pub fn with_null_sentinel(mut self, sentinel: &str) -> Self {
        sentinel.clone_into(&mut self.null_sentinel);
        self
    }

    fn delimited_options(&self) -> DelimitedOptions {
        DelimitedOptions {
            delimiter: self.delimiter,
            has_headers: self.has_headers,
        }
    }
}

/// Accepts a single ASCII character, or `\t` / `tab` for a tab.
pub fn parse_delimiter(raw: &str) -> Option<u8> {
    match raw {
        "\\t" | "tab" => Some(b'\t'),
        _ => match raw.as_bytes() {
            [byte] if byte.is_ascii() => Some(*byte),
            _ => None,
        },
    }
}

/// Entry point for loading data.
///
/// A session only carries configuration. Frames it creates stay valid after
/// [`Session::stop`].
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        info!(app = %config.app_name, "session started");
        Self { config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn read_delimited(
        &self,
        path: impl AsRef<Path>,
        schema: impl Into<SchemaRef>,
    ) -> Result<DataFrame> {
        let path = path.as_ref();
        info!(path = %path.display(), "reading delimited file");

        let file = File::open(path)?;
        self.read_delimited_from(file, schema)
    }

    pub fn read_delimited_str(&self, text: &str, schema: impl Into<SchemaRef>) -> Result<DataFrame> {
        self.read_delimited_from(text.as_bytes(), schema)
    }

    pub fn read_delimited_from<R: Read>(
        &self,
        reader: R,
        schema: impl Into<SchemaRef>,
    ) -> Result<DataFrame> {
        let table = delimited::load(reader, schema, self.config.delimited_options())?;
        Ok(DataFrame::new(table))
    }

    /// Reads a JSON Lines file.
    pub fn read_json(&self, path: impl AsRef<Path>, schema: impl Into<SchemaRef>) -> Result<DataFrame> {
        let path = path.as_ref();
        info!(path = %path.display(), "reading json file");

        let file = File::open(path)?;
        let table = json::load(BufReader::new(file), schema)?;
        Ok(DataFrame::new(table))
    }

    /// Builds a frame from rows already in memory, checking them against
    /// `schema`.
    pub fn create_dataframe(&self, schema: impl Into<SchemaRef>, rows: Vec<Row>) -> Result<DataFrame> {
        Table::try_new(schema, rows).map(DataFrame::new)
    }

    /// Prints `df` with the configured row limit.
    pub fn show(&self, df: &DataFrame) -> Result<()> {
        df.show(self.config.show_rows)
    }

    pub fn stop(self) {
        info!(app = %self.config.app_name, "session stopped");
    }
}
