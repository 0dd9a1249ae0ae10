/// One cell of a tokenized row: absent, or right-trimmed text.
pub type Cell = Option<String>;

/// A positional row recovered from a BCP export.
///
/// Cells are addressed by index; the exports carry no header, so each
/// consumer hard-codes which column holds which field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    cells: Vec<Cell>,
}

impl Record {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Present cell at `index`; absent and out-of-range cells are both `None`.
    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells.get(index).and_then(|c| c.as_deref())
    }

    /// Cell text, with absent cells read as the empty string.
    pub fn text(&self, index: usize) -> &str {
        self.cell(index).unwrap_or("")
    }

    /// True when every cell is present and non-empty.
    pub fn is_complete(&self) -> bool {
        self.cells
            .iter()
            .all(|c| c.as_deref().is_some_and(|s| !s.is_empty()))
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }
}

impl From<Vec<Cell>> for Record {
    fn from(cells: Vec<Cell>) -> Self {
        Self::new(cells)
    }
}

impl From<Vec<String>> for Record {
    fn from(cells: Vec<String>) -> Self {
        Self::new(cells.into_iter().map(Some).collect())
    }
}
