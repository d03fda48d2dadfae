//! Column layout of the tilbudsugen.dk search result table.
//!
//! The result table carries no machine-readable cell labels, so fields are
//! located purely by their 1-based column position inside a `<tr>`.
//!
//! **Update process**: when the site changes its table, capture an HTML
//! sample, update `COLUMNS`, and refresh the test fixture.

/// Semantic meaning of a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Store,
    Item,
    Brand,
    PricePerUnit,
    Validity,
}

impl Field {
    /// The terminal field commits the assembled row.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Field::Validity)
    }

    /// Whether inline markup (e.g. a logo `<img/>`) counts as cell content.
    pub fn accepts_markup(&self) -> bool {
        matches!(self, Field::Store)
    }
}

/// Column index to field mapping, ordered left to right.
pub const COLUMNS: &[(usize, Field)] = &[
    (1, Field::Store),
    (3, Field::Item),
    (4, Field::Brand),
    (7, Field::PricePerUnit),
    (9, Field::Validity),
];

/// Column whose content completes a row.
pub const TERMINAL_COLUMN: usize = 9;

/// Tag that opens a row.
pub const ROW_TAG: &[u8] = b"tr";

/// Tag that opens a cell.
pub const CELL_TAG: &[u8] = b"td";

/// End tags that do not pop the nesting tracker.
pub const UNCOUNTED_CLOSE_TAGS: &[&[u8]] = &[b"img"];

/// Returns the field stored in `column`, if any.
pub fn field_for(column: usize) -> Option<Field> {
    COLUMNS.iter().find(|(index, _)| *index == column).map(|(_, field)| *field)
}

/// ASCII case-insensitive tag comparison.
pub fn tag_is(name: &[u8], tag: &[u8]) -> bool {
    name.eq_ignore_ascii_case(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_for_mapped_columns() {
        assert_eq!(field_for(1), Some(Field::Store));
        assert_eq!(field_for(3), Some(Field::Item));
        assert_eq!(field_for(4), Some(Field::Brand));
        assert_eq!(field_for(7), Some(Field::PricePerUnit));
        assert_eq!(field_for(9), Some(Field::Validity));
    }

    #[test]
    fn test_field_for_unmapped_columns() {
        for column in [0, 2, 5, 6, 8, 10, 42] {
            assert_eq!(field_for(column), None, "column {} should be unmapped", column);
        }
    }

    #[test]
    fn test_columns_strictly_increasing() {
        assert!(COLUMNS.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }

    #[test]
    fn test_only_last_column_is_terminal() {
        let terminal: Vec<_> = COLUMNS.iter().filter(|(_, field)| field.is_terminal()).collect();
        assert_eq!(terminal.len(), 1);
        assert_eq!(terminal[0].0, TERMINAL_COLUMN);
        assert_eq!(COLUMNS.last().map(|(index, _)| *index), Some(TERMINAL_COLUMN));
    }

    #[test]
    fn test_accepts_markup() {
        assert!(Field::Store.accepts_markup());
        assert!(!Field::Item.accepts_markup());
        assert!(!Field::Validity.accepts_markup());
    }

    #[test]
    fn test_tag_is_case_insensitive() {
        assert!(tag_is(b"TD", CELL_TAG));
        assert!(tag_is(b"tr", ROW_TAG));
        assert!(!tag_is(b"th", CELL_TAG));
        assert!(!tag_is(b"tbody", ROW_TAG));
    }
}
