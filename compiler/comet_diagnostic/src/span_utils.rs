//! Line and column lookup for byte offsets.

/// Pre-computed line offset table for O(log L) line/column lookup.
///
/// ```
/// use comet_diagnostic::span_utils::LineOffsetTable;
///
/// let source = "line1\nline2\nline3";
/// let table = LineOffsetTable::build(source);
///
/// assert_eq!(table.offset_to_line_col(source, 0), (1, 1));
/// assert_eq!(table.offset_to_line_col(source, 6), (2, 1));
/// assert_eq!(table.offset_to_line_col(source, 14), (3, 3));
/// ```
#[derive(Clone, Debug, Default)]
pub struct LineOffsetTable {
    /// Byte offset of each line start; `offsets[0] == 0`.
    offsets: Vec<u32>,
}

impl LineOffsetTable {
    /// Build a line offset table from source text.
    pub fn build(source: &str) -> Self {
        let mut offsets = vec![0u32];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                offsets.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        LineOffsetTable { offsets }
    }

    /// 1-based line containing `offset`.
    #[inline]
    pub fn line_from_offset(&self, offset: u32) -> u32 {
        let line_idx = match self.offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        u32::try_from(line_idx).unwrap_or(u32::MAX - 1) + 1
    }

    /// 1-based (line, column); the column counts characters, not bytes.
    pub fn offset_to_line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let line = self.line_from_offset(offset);
        let line_start = self.offsets.get((line - 1) as usize).copied().unwrap_or(0) as usize;
        let end = (offset as usize).min(source.len());

        let col = source
            .get(line_start..end)
            .map_or(0, |prefix| prefix.chars().count());
        (line, u32::try_from(col).unwrap_or(u32::MAX - 1) + 1)
    }

    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_line_table_lookup() {
        let source = "let a = 1\nlet b = a / 0\n";
        let table = LineOffsetTable::build(source);
        assert_eq!(table.line_count(), 3);
        assert_eq!(table.offset_to_line_col(source, 0), (1, 1));
        assert_eq!(table.offset_to_line_col(source, 10), (2, 1));
        assert_eq!(table.offset_to_line_col(source, 22), (2, 13));
    }

    #[test]
    fn test_columns_count_chars() {
        let source = "é = 1";
        let table = LineOffsetTable::build(source);
        // 'é' is two bytes; '=' starts at byte 3.
        assert_eq!(table.offset_to_line_col(source, 3), (1, 3));
    }

    #[test]
    fn test_offset_past_end_clamps() {
        let source = "ab";
        let table = LineOffsetTable::build(source);
        assert_eq!(table.offset_to_line_col(source, 99), (1, 3));
    }
}
