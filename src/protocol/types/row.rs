//! Raw (undecoded) row types.

use bytes::Bytes;

/// One raw cell: `None` for SQL NULL, otherwise the cell bytes.
///
/// The slice length is the cell length; data may contain zero bytes.
pub type RawCell<'a> = Option<&'a [u8]>;

/// A row borrowed from the handle's current row buffer.
///
/// Valid until the next fetch on the same handle.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow<'a> {
    cells: Vec<RawCell<'a>>,
}

impl<'a> RawRow<'a> {
    /// Create a row from borrowed cells.
    pub fn new(cells: Vec<RawCell<'a>>) -> Self {
        Self { cells }
    }

    /// Get a cell by column index.
    pub fn get(&self, index: usize) -> Option<RawCell<'a>> {
        self.cells.get(index).copied()
    }

    /// Get the number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Byte length of each cell (0 for NULL).
    pub fn lengths(&self) -> Vec<u64> {
        self.cells
            .iter()
            .map(|c| c.map_or(0, |data| data.len() as u64))
            .collect()
    }

    /// Iterate over cells.
    pub fn iter(&self) -> impl Iterator<Item = RawCell<'a>> + '_ {
        self.cells.iter().copied()
    }

    /// Copy the cells out of the driver buffer.
    pub fn to_owned_row(&self) -> OwnedRow {
        OwnedRow::new(
            self.cells
                .iter()
                .map(|c| c.map(Bytes::copy_from_slice))
                .collect(),
        )
    }
}

/// A row whose cells have been copied out of the driver buffer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OwnedRow {
    cells: Vec<Option<Bytes>>,
}

impl OwnedRow {
    /// Create a row from owned cells.
    pub fn new(cells: Vec<Option<Bytes>>) -> Self {
        Self { cells }
    }

    /// Borrow as a raw row.
    pub fn as_raw(&self) -> RawRow<'_> {
        RawRow::new(self.cells.iter().map(|c| c.as_deref()).collect())
    }

    /// Get the number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Consume into the cell vector.
    pub fn into_cells(self) -> Vec<Option<Bytes>> {
        self.cells
    }
}

impl<T: Into<Bytes>> FromIterator<Option<T>> for OwnedRow {
    fn from_iter<I: IntoIterator<Item = Option<T>>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|c| c.map(Into::into)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owned_round_trip_keeps_nulls_and_zero_bytes() {
        let owned: OwnedRow = vec![Some(&b"a\0b"[..]), None, Some(&b""[..])]
            .into_iter()
            .map(|c| c.map(Bytes::copy_from_slice))
            .collect();
        let raw = owned.as_raw();

        assert_eq!(raw.len(), 3);
        assert_eq!(raw.get(0), Some(Some(&b"a\0b"[..])));
        assert_eq!(raw.get(1), Some(None));
        assert_eq!(raw.lengths(), vec![3, 0, 0]);
        assert_eq!(raw.to_owned_row(), owned);
    }
}
