//! Synthetic logical copies for recall checks.
//!
//! A logical copy stands for the same entity as its source table under
//! perturbed column names: punctuation and digits are inserted between
//! words, each word's case is swapped on a coin flip (see
//! [`LogicalCopy::with_swap_probability`]), descriptions are replaced with the
//! original column names and a couple of unrelated columns are borrowed
//! from a donor table. Values are kept, and provenance is recorded so the
//! expected column matches are known.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::MetadataError;
use crate::metadata::{ColumnInfo, ColumnMetadata, TableInfo, TableMetadata};

/// Characters inserted around the words of a column name.
const VARIATIONS: &[char] = &[
    '#', '$', '%', '&', '*', '-', '.', ':', ';', '?', '@', '_', '~', '0', '1', '2', '3', '4', '5',
    '6', '7', '8', '9',
];

/// Seeded generator of logical copies.
#[derive(Debug, Clone)]
pub struct LogicalCopy {
    rng: StdRng,
    donor_columns: usize,
    swap_probability: f64,
}

impl LogicalCopy {
    /// Appended to the source table name and id.
    pub const SUFFIX: &'static str = "_LOGICAL_COPY";

    /// A generator seeded with `seed`; equal seeds give equal copies.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            donor_columns: 2,
            swap_probability: 0.5,
        }
    }

    /// Builder: chance that a word has its case swapped, clamped to [0, 1].
    ///
    /// Defaults to 0.5. Use 1.0 to swap every word.
    pub fn with_swap_probability(mut self, probability: f64) -> Self {
        self.swap_probability = if probability.is_nan() {
            0.5
        } else {
            probability.clamp(0.0, 1.0)
        };
        self
    }

    /// Builder: how many donor columns to append.
    pub fn with_donor_columns(mut self, count: usize) -> Self {
        self.donor_columns = count;
        self
    }

    /// Derive a logical copy of `source`, borrowing columns from `donor`.
    ///
    /// Donor columns whose names clash with a source column are passed over.
    /// Fails only when two source columns share a name.
    pub fn derive(
        &mut self,
        source: &TableInfo,
        donor: &TableInfo,
    ) -> Result<TableInfo, MetadataError> {
        let meta = source.metadata();
        let copy_id = format!("{}{}", meta.table_id(), Self::SUFFIX);
        let copy_meta = TableMetadata::new(
            format!("{}{}", meta.name(), Self::SUFFIX),
            meta.name(),
            meta.platform(),
            copy_id.clone(),
        );

        let mut columns: Vec<ColumnInfo> = source
            .columns()
            .iter()
            .map(|c| {
                let mut copy = self.copy_column(&copy_id, c);
                copy.set_parent_columns(vec![Some(c.column_id().to_string())]);
                copy
            })
            .collect();

        let donors: Vec<&ColumnInfo> = donor
            .columns()
            .iter()
            .filter(|d| {
                !source
                    .columns()
                    .iter()
                    .any(|c| c.metadata().name() == d.metadata().name())
            })
            .take(self.donor_columns)
            .collect();
        for d in donors {
            let mut copy = self.copy_column(&copy_id, d);
            copy.set_parent_columns(vec![None]);
            columns.push(copy);
        }

        let table = TableInfo::new(copy_meta, columns)?;
        Ok(table.with_parent_tables(vec![source.table_id().to_string()]))
    }

    fn copy_column(&mut self, table_id: &str, column: &ColumnInfo) -> ColumnInfo {
        let meta = column.metadata();
        let name = meta.name();
        let copy = ColumnMetadata::new(
            self.perturb_name(name),
            name,
            meta.datatype(),
            table_id,
            ColumnMetadata::compose_id(table_id, name),
        );
        ColumnInfo::new(copy).with_values(column.values().to_vec())
    }

    /// Insert random separators around each word and swap its case with the
    /// configured probability.
    pub fn perturb_name(&mut self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() * 2);
        out.push(self.variation());
        for word in name.split(|c: char| !c.is_alphabetic()) {
            if self.rng.random_bool(self.swap_probability) {
                out.extend(word.chars().map(swap_case));
            } else {
                out.push_str(word);
            }
            out.push(self.variation());
        }
        out
    }

    fn variation(&mut self) -> char {
        VARIATIONS[self.rng.random_range(0..VARIATIONS.len())]
    }
}

fn swap_case(c: char) -> char {
    if c.is_ascii_uppercase() {
        c.to_ascii_lowercase()
    } else {
        c.to_ascii_uppercase()
    }
}
