//! Table sub-model
//!
//! A rectangular grid with private fields so every row always has exactly
//! one cell per header. The four grid operations mutate header and body
//! together; remove operations are no-ops at the 1-column/1-row floor.

use serde::{Deserialize, Serialize};

use super::error::OutOfRange;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableGrid {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Default for TableGrid {
    fn default() -> Self {
        TableGrid::new()
    }
}

impl TableGrid {
    /// Factory default: 1x1 grid.
    pub fn new() -> TableGrid {
        TableGrid {
            headers: vec!["Header 1".to_string()],
            rows: vec![vec!["Data 1".to_string()]],
        }
    }

    /// Build a grid from persisted parts, normalizing to the width
    /// invariant: empty headers fall back to the factory single header,
    /// and every row is resized to the header count. Loaded documents may
    /// legitimately carry zero rows; the min-1-row floor binds the remove
    /// operation, not the loader.
    pub fn from_parts(headers: Vec<String>, rows: Vec<Vec<String>>) -> TableGrid {
        let headers = if headers.is_empty() {
            vec!["Header 1".to_string()]
        } else {
            headers
        };
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        TableGrid { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Append a column: a synthesized `Header N` label plus one empty cell
    /// in every row. Existing (possibly user-edited) headers are never
    /// renamed.
    pub fn add_column(&mut self) {
        let n = self.headers.len() + 1;
        self.headers.push(format!("Header {n}"));
        for row in &mut self.rows {
            row.push(String::new());
        }
    }

    /// Drop the last column from header and every row. No-op at one column.
    pub fn remove_column(&mut self) {
        if self.headers.len() <= 1 {
            return;
        }
        self.headers.pop();
        for row in &mut self.rows {
            row.pop();
        }
    }

    /// Append a row of empty cells at the current width.
    pub fn add_row(&mut self) {
        self.rows.push(vec![String::new(); self.headers.len()]);
    }

    /// Drop the last row. No-op at one row.
    pub fn remove_row(&mut self) {
        if self.rows.len() <= 1 {
            return;
        }
        self.rows.pop();
    }

    pub fn set_header(&mut self, col: usize, text: impl Into<String>) -> Result<(), OutOfRange> {
        let len = self.headers.len();
        match self.headers.get_mut(col) {
            Some(header) => {
                *header = text.into();
                Ok(())
            }
            None => Err(OutOfRange { index: col, len }),
        }
    }

    pub fn set_cell(
        &mut self,
        row: usize,
        col: usize,
        text: impl Into<String>,
    ) -> Result<(), OutOfRange> {
        let row_count = self.rows.len();
        let row_cells = self
            .rows
            .get_mut(row)
            .ok_or(OutOfRange {
                index: row,
                len: row_count,
            })?;
        let width = row_cells.len();
        match row_cells.get_mut(col) {
            Some(cell) => {
                *cell = text.into();
                Ok(())
            }
            None => Err(OutOfRange {
                index: col,
                len: width,
            }),
        }
    }

    /// Width invariant check, used by tests and debug assertions.
    pub fn is_rectangular(&self) -> bool {
        let width = self.headers.len();
        self.rows.iter().all(|row| row.len() == width)
    }
}
