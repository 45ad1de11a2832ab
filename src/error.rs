use sea_orm::DbErr;

use crate::entity::Table;

/// An error from a store, search or report operation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A foreign key points at a row that does not exist
    #[error("{table}.{column} = {value} references a missing {target}")]
    ConstraintViolation {
        table: Table,
        column: &'static str,
        value: i32,
        target: &'static str,
    },
    /// A delete was refused because other rows still depend on the target
    #[error("cannot delete {} {id}: {dependents} dependent row(s) in {dependent_table}", .table.entity_name())]
    ReferentialBlock {
        table: Table,
        id: i32,
        dependent_table: Table,
        dependents: u64,
    },
    /// Caller supplied data that fails a field rule
    #[error("invalid `{field}`: {message}")]
    Validation { field: String, message: String },
    /// No row with the given id, or no report with the given number
    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: i64 },
    /// Tabular input could not be read or decoded
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    /// The storage engine failed
    #[error("storage error: {0}")]
    Storage(#[from] DbErr),
    /// A bulk load was rolled back; the store keeps its previous contents
    #[error("bulk load failed on {table}{}: {source}", row_suffix(.row))]
    LoadFailed {
        table: Table,
        row: Option<usize>,
        #[source]
        source: Box<Error>,
    },
}

/// Coarse classification of [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConstraintViolation,
    ReferentialBlock,
    Validation,
    NotFound,
    Storage,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn not_found(table: Table, id: i32) -> Self {
        Self::NotFound {
            what: table.entity_name(),
            id: id.into(),
        }
    }

    /// Bulk load failures count as storage errors whatever caused them.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConstraintViolation { .. } => ErrorKind::ConstraintViolation,
            Self::ReferentialBlock { .. } => ErrorKind::ReferentialBlock,
            Self::Validation { .. } | Self::Csv(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Storage(_) | Self::LoadFailed { .. } => ErrorKind::Storage,
        }
    }
}

fn row_suffix(row: &Option<usize>) -> String {
    match row {
        Some(row) => format!(" row {row}"),
        None => String::new(),
    }
}
