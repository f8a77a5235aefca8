use bitflags::bitflags;

bitflags! {
    /// Attributes of an output column.
    ///
    /// `INTEGER` and `BOOLEAN` include the `NUMERIC` bit, so
    /// `flags.contains(ColumnFlags::INTEGER)` only holds when both are set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ColumnFlags: u32 {
        /// Always written as a JSON string.
        const QUOTED = 0x0001;
        /// Written as raw text, never quoted.
        const UNQUOTED = 0x0002;
        /// Omitted from the object when the value is an empty string.
        const EMPTY_IGNORED = 0x0004;
        /// Value comes from `--col-value`, not from the database.
        const FIXED = 0x0008;
        /// The current row's value is NULL.
        const CURRENTLY_NULL = 0x0010;
        /// Present in the table or result set.
        const FROM_SOURCE = 0x0020;
        /// Written unquoted.
        const NUMERIC = 0x0040;
        /// Whole-number value.
        const INTEGER = 0x0080 | Self::NUMERIC.bits();
        /// Written as `true` / `false`.
        const BOOLEAN = 0x0100 | Self::NUMERIC.bits();
        /// Keyset pagination column.
        const BATCH = 0x0200;
        /// Never written.
        const SKIP = 0x0400;
        /// Part of the table's primary key.
        const PRIMARY_KEY = 0x0800;
    }
}

/// A literal value given with `--col-value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixedValue {
    /// Whole number; the only kind an increment applies to.
    Integer(i64),
    /// Well-formed decimal, kept as written.
    Decimal(String),
    /// Anything else, written as a JSON string.
    Text(String),
}

impl FixedValue {
    /// Classifies a raw option value.
    pub fn parse(raw: &str) -> Self {
        if super::literal::is_integer(raw) {
            if let Ok(v) = raw.parse::<i64>() {
                return FixedValue::Integer(v);
            }
        }
        if super::literal::is_numeric(raw) {
            FixedValue::Decimal(raw.to_string())
        } else {
            FixedValue::Text(raw.to_string())
        }
    }
}

/// One logical output column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Source identifier, matched case-insensitively.
    pub name: String,
    /// Output key, already JSON-escaped.
    pub json_name: String,
    /// Literal value for fixed columns.
    pub fixed: Option<FixedValue>,
    /// Step added to an integer fixed value after each row.
    pub increment: i64,
    /// The next increment would leave the `i64` range.
    pub increment_exhausted: bool,
    /// Batching column value of the last row written.
    pub previous_cursor_value: Option<Vec<u8>>,
    /// Position in the current result row, once resolved.
    pub source_ordinal: Option<usize>,
    /// Current row's bytes, `None` when NULL.
    pub value: Option<Vec<u8>>,
    /// Attributes.
    pub flags: ColumnFlags,
}

impl ColumnDescriptor {
    /// Creates a placeholder column whose JSON key is its escaped name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            json_name: crate::serialize::escape_json(name.as_bytes()),
            fixed: None,
            increment: 0,
            increment_exhausted: false,
            previous_cursor_value: None,
            source_ordinal: None,
            value: None,
            flags: ColumnFlags::empty(),
        }
    }

    /// Creates a fixed-value column from a raw `--col-value` value.
    pub fn fixed(name: &str, raw: &str) -> Self {
        let mut column = Self::new(name);
        column.set_fixed(raw);
        column
    }

    /// Replaces the fixed value, updating the type flags to match.
    pub fn set_fixed(&mut self, raw: &str) {
        let fixed = FixedValue::parse(raw);
        self.flags.remove(ColumnFlags::INTEGER | ColumnFlags::BOOLEAN);
        self.flags.insert(ColumnFlags::FIXED);
        match fixed {
            FixedValue::Integer(_) => self.flags.insert(ColumnFlags::INTEGER),
            FixedValue::Decimal(_) => self.flags.insert(ColumnFlags::NUMERIC),
            FixedValue::Text(_) => {}
        }
        self.fixed = Some(fixed);
    }

    /// Case-insensitive name comparison.
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Has a configured value.
    pub fn is_fixed(&self) -> bool {
        self.flags.contains(ColumnFlags::FIXED)
    }

    /// Left out of the output.
    pub fn is_skipped(&self) -> bool {
        self.flags.contains(ColumnFlags::SKIP)
    }

    /// Present in the table or result.
    pub fn is_from_source(&self) -> bool {
        self.flags.contains(ColumnFlags::FROM_SOURCE)
    }

    /// Marked as the batching column.
    pub fn is_batch(&self) -> bool {
        self.flags.contains(ColumnFlags::BATCH)
    }

    /// Whether a cursor value for this column must be a quoted SQL literal.
    pub fn needs_quoted_literal(&self) -> bool {
        self.flags.contains(ColumnFlags::QUOTED) || !self.flags.contains(ColumnFlags::NUMERIC)
    }

    /// Loads the current row's value.
    pub fn set_value(&mut self, value: Option<Vec<u8>>) {
        self.flags.set(ColumnFlags::CURRENTLY_NULL, value.is_none());
        self.value = value;
    }
}
