//! Metadata model.
//!
//! Tables and columns as handed to the engine by loaders and classifiers.
//! The engine only reads these; loaders build them once per dataset and
//! share them by reference across every comparison.
//!
//! # Example
//!
//! ```
//! use tablesim::metadata::{ColumnInfo, ColumnMetadata, TableInfo, TableMetadata};
//!
//! let meta = TableMetadata::new("orders", "Customer orders", "postgres", "orders");
//! let columns = vec![
//!     ColumnInfo::new(ColumnMetadata::for_table("orders", "order_id", "Order key", "int64")),
//!     ColumnInfo::new(ColumnMetadata::for_table("orders", "placed_at", "", "datetime64[ns]")),
//! ];
//! let table = TableInfo::new(meta, columns).unwrap();
//! assert_eq!(table.columns()[0].column_id(), "orders_SPLITTER_order_id");
//! ```

mod types;

pub use types::{
    ColumnInfo, ColumnMetadata, DatatypeClass, InfotypeProposal, TableInfo, TableMetadata,
    COLUMN_ID_SEPARATOR,
};
