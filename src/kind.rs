//! The closed set of kinds a TOML node can have.

use std::fmt;

/// Kind of a document node, as recorded in [`Metadata`](crate::Metadata).
///
/// Arrays written with `[[header]]` syntax are recorded as
/// [`Kind::ArrayOfTables`]; inline arrays are [`Kind::Array`] whatever their
/// elements are.
///
/// ```rust
/// use serde_tomlkit::Kind;
///
/// assert!(Kind::ArrayOfTables.is_table_like());
/// assert!(!Kind::Array.is_table_like());
/// assert_eq!(Kind::LocalDate.to_string(), "LocalDate");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Integer,
    Float,
    String,
    Bool,
    OffsetDatetime,
    LocalDatetime,
    LocalDate,
    LocalTime,
    Array,
    Table,
    ArrayOfTables,
}

impl Kind {
    /// Table and array-of-tables are the two table-like kinds.
    #[must_use]
    #[inline]
    pub const fn is_table_like(self) -> bool {
        matches!(self, Kind::Table | Kind::ArrayOfTables)
    }

    #[must_use]
    #[inline]
    pub const fn is_datetime(self) -> bool {
        matches!(
            self,
            Kind::OffsetDatetime | Kind::LocalDatetime | Kind::LocalDate | Kind::LocalTime
        )
    }

    #[must_use]
    #[inline]
    pub const fn is_scalar(self) -> bool {
        !matches!(self, Kind::Array | Kind::Table | Kind::ArrayOfTables)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Kind::Integer => "Integer",
            Kind::Float => "Float",
            Kind::String => "String",
            Kind::Bool => "Bool",
            Kind::OffsetDatetime => "OffsetDatetime",
            Kind::LocalDatetime => "LocalDatetime",
            Kind::LocalDate => "LocalDate",
            Kind::LocalTime => "LocalTime",
            Kind::Array => "Array",
            Kind::Table => "Table",
            Kind::ArrayOfTables => "ArrayOfTables",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
