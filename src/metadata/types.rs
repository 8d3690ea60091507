//! Value objects describing tables and columns.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::MetadataError;

/// Separator placed between a table id and a column name to build column ids.
pub const COLUMN_ID_SEPARATOR: &str = "_SPLITTER_";

static NUMERIC_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(u?int\d*|integer|bigint|smallint|tinyint|mediumint|(big|small)?serial\d*|float\d*|double|decimal|numeric|number|real|long|money)\b",
    )
    .expect("numeric type pattern is valid")
});

static STRING_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(str|string|object|text|char|character|varchar|nvarchar|nchar|category|uuid|json)\b",
    )
    .expect("string type pattern is valid")
});

/// Coarse datatype class used for comparisons across platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatatypeClass {
    Numeric,
    String,
    Datetime,
    Boolean,
    Other,
}

impl DatatypeClass {
    /// All classes, in a fixed order.
    pub const ALL: [DatatypeClass; 5] = [
        DatatypeClass::Numeric,
        DatatypeClass::String,
        DatatypeClass::Datetime,
        DatatypeClass::Boolean,
        DatatypeClass::Other,
    ];

    /// Normalize a declared datatype (`int64`, `VARCHAR(255)`, `datetime64[ns]`, ...).
    ///
    /// Anything unrecognized, including the empty string, maps to `Other`.
    pub fn parse(declared: &str) -> Self {
        let lower = declared.trim().to_lowercase();
        if lower.is_empty() {
            return Self::Other;
        }
        if lower.contains("bool") || lower == "bit" {
            return Self::Boolean;
        }
        // Durations are neither points in time nor plain numbers
        if lower.contains("timedelta") || lower.contains("interval") {
            return Self::Other;
        }
        if lower.contains("date") || lower.contains("time") {
            return Self::Datetime;
        }
        if NUMERIC_TYPE.is_match(&lower) {
            return Self::Numeric;
        }
        if STRING_TYPE.is_match(&lower) {
            return Self::String;
        }
        Self::Other
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::String => "string",
            Self::Datetime => "datetime",
            Self::Boolean => "boolean",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for DatatypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Table-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    platform: String,
    table_id: String,
}

impl TableMetadata {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        platform: impl Into<String>,
        table_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            platform: platform.into(),
            table_id: table_id.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }
}

/// Column-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    datatype: String,
    #[serde(default)]
    dataset_name: String,
    column_id: String,
}

impl ColumnMetadata {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        datatype: impl Into<String>,
        dataset_name: impl Into<String>,
        column_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            datatype: datatype.into(),
            dataset_name: dataset_name.into(),
            column_id: column_id.into(),
        }
    }

    /// Build metadata for a column of `table_id`, deriving the column id.
    ///
    /// The owning dataset name is the table id.
    pub fn for_table(
        table_id: &str,
        name: impl Into<String>,
        description: impl Into<String>,
        datatype: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let column_id = Self::compose_id(table_id, &name);
        Self::new(name, description, datatype, table_id, column_id)
    }

    /// `<table-id>_SPLITTER_<column-name>`.
    pub fn compose_id(table_id: &str, column_name: &str) -> String {
        format!("{table_id}{COLUMN_ID_SEPARATOR}{column_name}")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The declared datatype, as given by the source platform.
    pub fn datatype(&self) -> &str {
        &self.datatype
    }

    pub fn datatype_class(&self) -> DatatypeClass {
        DatatypeClass::parse(&self.datatype)
    }

    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    pub fn column_id(&self) -> &str {
        &self.column_id
    }
}

/// A semantic type guess attached to a column by the infotype classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfotypeProposal {
    pub label: String,
    pub confidence: f64,
    #[serde(default)]
    pub debug_info: BTreeMap<String, serde_json::Value>,
}

impl InfotypeProposal {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
            debug_info: BTreeMap::new(),
        }
    }
}

/// A column together with sampled values and classifier output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    metadata: ColumnMetadata,
    #[serde(default)]
    values: Vec<serde_json::Value>,
    #[serde(default)]
    infotype_proposals: Vec<InfotypeProposal>,
    /// Provenance for logical copies; `None` entries mark columns with no parent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_columns: Option<Vec<Option<String>>>,
}

impl ColumnInfo {
    pub fn new(metadata: ColumnMetadata) -> Self {
        Self {
            metadata,
            values: Vec::new(),
            infotype_proposals: Vec::new(),
            parent_columns: None,
        }
    }

    /// Builder: attach sampled values.
    pub fn with_values(mut self, values: Vec<serde_json::Value>) -> Self {
        self.values = values;
        self
    }

    pub fn metadata(&self) -> &ColumnMetadata {
        &self.metadata
    }

    pub fn column_id(&self) -> &str {
        self.metadata.column_id()
    }

    pub fn values(&self) -> &[serde_json::Value] {
        &self.values
    }

    pub fn set_values(&mut self, values: Vec<serde_json::Value>) {
        self.values = values;
    }

    pub fn infotype_proposals(&self) -> &[InfotypeProposal] {
        &self.infotype_proposals
    }

    /// Append a proposal from the infotype classifier.
    pub fn push_proposal(&mut self, proposal: InfotypeProposal) {
        self.infotype_proposals.push(proposal);
    }

    pub fn parent_columns(&self) -> Option<&[Option<String>]> {
        self.parent_columns.as_deref()
    }

    pub fn set_parent_columns(&mut self, parents: Vec<Option<String>>) {
        self.parent_columns = Some(parents);
    }
}

/// A table and its columns.
///
/// Column ids are unique within a table; both the constructor and
/// deserialization enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableInfoRecord")]
pub struct TableInfo {
    metadata: TableMetadata,
    columns: Vec<ColumnInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_tables: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct TableInfoRecord {
    metadata: TableMetadata,
    #[serde(default)]
    columns: Vec<ColumnInfo>,
    #[serde(default)]
    parent_tables: Option<Vec<String>>,
}

impl TryFrom<TableInfoRecord> for TableInfo {
    type Error = MetadataError;

    fn try_from(record: TableInfoRecord) -> Result<Self, Self::Error> {
        let mut table = TableInfo::new(record.metadata, record.columns)?;
        table.parent_tables = record.parent_tables;
        Ok(table)
    }
}

impl TableInfo {
    pub fn new(metadata: TableMetadata, columns: Vec<ColumnInfo>) -> Result<Self, MetadataError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.column_id()) {
                return Err(MetadataError::DuplicateColumnId {
                    table_id: metadata.table_id().to_string(),
                    column_id: column.column_id().to_string(),
                });
            }
        }

        Ok(Self {
            metadata,
            columns,
            parent_tables: None,
        })
    }

    /// Builder: record the tables this one was derived from.
    pub fn with_parent_tables(mut self, parents: Vec<String>) -> Self {
        self.parent_tables = Some(parents);
        self
    }

    pub fn metadata(&self) -> &TableMetadata {
        &self.metadata
    }

    pub fn table_id(&self) -> &str {
        self.metadata.table_id()
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn parent_tables(&self) -> Option<&[String]> {
        self.parent_tables.as_deref()
    }

    /// Infotype classifiers append proposals through this.
    pub fn columns_mut(&mut self) -> impl Iterator<Item = &mut ColumnInfo> {
        self.columns.iter_mut()
    }
}
