use strum_macros::{Display, EnumIter};

/// Scalar type of a result field or declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Display)]
pub enum FieldType {
    /// `TINYINT`; a display width of 1 marks a boolean.
    Tiny,
    /// `SMALLINT`.
    Short,
    /// `MEDIUMINT`.
    Int24,
    /// `INT` / `INTEGER`.
    Long,
    /// `BIGINT` and other names with integer affinity.
    LongLong,
    /// `DECIMAL` / `NUMERIC`, written as stored.
    Decimal,
    /// `FLOAT`.
    Float,
    /// `DOUBLE` / `REAL`.
    Double,
    /// Character types.
    Text,
    /// Binary types.
    Blob,
    /// Dates and times, written as strings.
    Temporal,
    /// No declared type.
    Null,
}

impl FieldType {
    /// Whole-number types.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            FieldType::Tiny
                | FieldType::Short
                | FieldType::Int24
                | FieldType::Long
                | FieldType::LongLong
        )
    }

    /// Fixed or floating point types.
    pub fn is_decimal(self) -> bool {
        matches!(self, FieldType::Decimal | FieldType::Float | FieldType::Double)
    }

    /// Maps a declared SQL type such as `TINYINT(1)` or `DECIMAL(10,2)` to a
    /// field type and its display width, if one was declared.
    ///
    /// Unknown names fall back to SQLite's affinity rules: anything containing
    /// `INT` is an integer, anything containing `CHAR`, `CLOB` or `TEXT` is text.
    pub fn from_declared(declared: &str) -> (FieldType, Option<u32>) {
        let upper = declared.trim().to_ascii_uppercase();
        let (base, width) = match upper.find('(') {
            Some(open) => {
                let width = upper[open + 1..]
                    .split([',', ')'])
                    .next()
                    .and_then(|w| w.trim().parse::<u32>().ok());
                (upper[..open].trim(), width)
            }
            None => (upper.as_str(), None),
        };
        let base = base.trim_end_matches(" UNSIGNED").trim();

        let field_type = match base {
            "" | "NULL" => FieldType::Null,
            "BOOL" | "BOOLEAN" => return (FieldType::Tiny, Some(1)),
            "TINYINT" => FieldType::Tiny,
            "SMALLINT" => FieldType::Short,
            "MEDIUMINT" => FieldType::Int24,
            "INT" | "INTEGER" => FieldType::Long,
            "BIGINT" => FieldType::LongLong,
            "DECIMAL" | "DEC" | "NUMERIC" | "FIXED" => FieldType::Decimal,
            "FLOAT" => FieldType::Float,
            "REAL" | "DOUBLE" | "DOUBLE PRECISION" => FieldType::Double,
            "DATE" | "TIME" | "DATETIME" | "TIMESTAMP" | "YEAR" => FieldType::Temporal,
            "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" => {
                FieldType::Blob
            }
            other if other.contains("INT") => FieldType::LongLong,
            _ => FieldType::Text,
        };
        (field_type, width)
    }
}

/// Metadata of one field of a query result or one declared table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMeta {
    /// Field name as reported by the database.
    pub name: String,
    /// Scalar type.
    pub field_type: FieldType,
    /// Part of the primary key.
    pub primary_key: bool,
    /// Declared display width, e.g. 1 for `TINYINT(1)`.
    pub display_width: Option<u32>,
}

impl FieldMeta {
    /// Builds metadata from a declared type string.
    pub fn from_declared(name: impl Into<String>, declared: &str, primary_key: bool) -> Self {
        let (field_type, display_width) = FieldType::from_declared(declared);
        Self {
            name: name.into(),
            field_type,
            primary_key,
            display_width,
        }
    }
}
