use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::evaluate::LetterStatus;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellStatus {
    #[default]
    Empty,
    Pending,
    Correct,
    Present,
    Absent,
}

impl From<LetterStatus> for CellStatus {
    fn from(s: LetterStatus) -> Self {
        match s {
            LetterStatus::Correct => CellStatus::Correct,
            LetterStatus::Present => CellStatus::Present,
            LetterStatus::Absent => CellStatus::Absent,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub letter: Option<char>,
    pub status: CellStatus,
}

impl Cell {
    pub fn is_filled(&self) -> bool {
        self.letter.is_some()
    }
}

/// Write position, 1-based. `column == columns + 1` means the row is full.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub row: usize,
    pub column: usize,
}

impl Default for Cursor {
    fn default() -> Self {
        Self { row: 1, column: 1 }
    }
}

/// Fixed-size board of `rows x columns` cells addressed by 1-based (row, column).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![Cell::default(); rows * columns],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    fn index(&self, row: usize, column: usize) -> Result<usize, GameError> {
        if row == 0 || column == 0 || row > self.rows || column > self.columns {
            return Err(GameError::OutOfBounds { row, column });
        }
        Ok((row - 1) * self.columns + (column - 1))
    }

    pub fn get(&self, row: usize, column: usize) -> Result<&Cell, GameError> {
        let idx = self.index(row, column)?;
        Ok(&self.cells[idx])
    }

    pub fn get_mut(&mut self, row: usize, column: usize) -> Result<&mut Cell, GameError> {
        let idx = self.index(row, column)?;
        Ok(&mut self.cells[idx])
    }

    pub fn set_letter(&mut self, row: usize, column: usize, letter: char) -> Result<(), GameError> {
        let cell = self.get_mut(row, column)?;
        cell.letter = Some(letter);
        cell.status = CellStatus::Pending;
        Ok(())
    }

    pub fn clear(&mut self, row: usize, column: usize) -> Result<(), GameError> {
        *self.get_mut(row, column)? = Cell::default();
        Ok(())
    }

    pub fn row(&self, row: usize) -> Result<&[Cell], GameError> {
        let start = self.index(row, 1)?;
        Ok(&self.cells[start..start + self.columns])
    }

    /// Letters of a row joined into a word; empty cells are skipped.
    pub fn row_word(&self, row: usize) -> Result<String, GameError> {
        Ok(self.row(row)?.iter().filter_map(|c| c.letter).collect())
    }

    pub fn apply_statuses(&mut self, row: usize, statuses: &[LetterStatus]) -> Result<(), GameError> {
        if statuses.len() != self.columns {
            return Err(GameError::InvalidGuessLength {
                expected: self.columns,
                actual: statuses.len(),
            });
        }
        let start = self.index(row, 1)?;
        for (cell, status) in self.cells[start..start + self.columns].iter_mut().zip(statuses) {
            cell.status = (*status).into();
        }
        Ok(())
    }

    /// Rows in order, for rendering.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.columns.max(1))
    }

    /// A deserialized grid is only usable if its cell count matches its shape.
    pub fn is_well_formed(&self) -> bool {
        self.cells.len() == self.rows * self.columns
            && self
                .cells
                .iter()
                .all(|c| c.letter.is_some() == (c.status != CellStatus::Empty))
    }

    /// Number of rows whose every cell carries a scored status.
    pub fn scored_rows(&self) -> usize {
        self.iter_rows()
            .filter(|row| {
                !row.is_empty()
                    && row.iter().all(|c| {
                        matches!(
                            c.status,
                            CellStatus::Correct | CellStatus::Present | CellStatus::Absent
                        )
                    })
            })
            .count()
    }
}
