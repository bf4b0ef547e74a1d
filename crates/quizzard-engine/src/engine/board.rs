use serde::{Deserialize, Serialize};

use crate::core::{Clue, Round};

/// Maximum clues per board column.
pub const COLUMN_CAPACITY: usize = 5;

/// One board cell: a clue with its positional ladder value and reveal flag.
///
/// `revealed` is monotone: once set it never reverts for the lifetime of the
/// board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardCell {
    clue: Clue,
    value: Option<u32>,
    revealed: bool,
}

impl BoardCell {
    #[must_use]
    pub fn clue(&self) -> &Clue {
        &self.clue
    }

    /// Nominal value assigned from the round's ladder; `None` in the final
    /// round.
    #[must_use]
    pub fn value(&self) -> Option<u32> {
        self.value
    }

    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }
}

/// One category column of up to [`COLUMN_CAPACITY`] cells.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardColumn {
    category: String,
    cells: Vec<BoardCell>,
}

impl BoardColumn {
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn cells(&self) -> &[BoardCell] {
        &self.cells
    }
}

/// The grid of clues for one active round.
///
/// Built fresh per round-selection event and discarded when the round
/// changes or the session ends. For the `single` and `double` rounds the
/// board is a category-by-value grid; the `final` round is a singleton
/// column holding one unvalued cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    round: Round,
    columns: Vec<BoardColumn>,
}

impl Board {
    /// Builds a board from per-category clue lists, assigning nominal values
    /// positionally from the round's value ladder.
    ///
    /// Each category contributes at most [`COLUMN_CAPACITY`] cells; every
    /// cell starts unrevealed.
    #[must_use]
    pub fn from_columns(round: Round, columns: Vec<(String, Vec<Clue>)>) -> Self {
        let ladder = round.value_ladder();
        let columns = columns
            .into_iter()
            .map(|(category, clues)| BoardColumn {
                category,
                cells: clues
                    .into_iter()
                    .take(COLUMN_CAPACITY)
                    .enumerate()
                    .map(|(row, clue)| BoardCell {
                        clue,
                        value: ladder.map(|values| values[row]),
                        revealed: false,
                    })
                    .collect(),
            })
            .collect();
        Self { round, columns }
    }

    #[must_use]
    pub fn round(&self) -> Round {
        self.round
    }

    #[must_use]
    pub fn columns(&self) -> &[BoardColumn] {
        &self.columns
    }

    #[must_use]
    pub fn cell(&self, column: usize, row: usize) -> Option<&BoardCell> {
        self.columns.get(column)?.cells.get(row)
    }

    /// Marks a cell revealed. Reveals are one-way.
    pub(crate) fn reveal(&mut self, column: usize, row: usize) {
        if let Some(col) = self.columns.get_mut(column)
            && let Some(cell) = col.cells.get_mut(row)
        {
            cell.revealed = true;
        }
    }

    #[must_use]
    pub fn revealed_count(&self) -> usize {
        self.columns
            .iter()
            .flat_map(|c| &c.cells)
            .filter(|cell| cell.revealed)
            .count()
    }

    /// True once every cell has been revealed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.columns
            .iter()
            .flat_map(|c| &c.cells)
            .all(|cell| cell.revealed)
    }

    /// Observable view of the board for the presentation boundary.
    ///
    /// Prompts and answers are intentionally absent; they are exposed only
    /// through the active-clue interaction.
    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            round: self.round,
            columns: self
                .columns
                .iter()
                .map(|column| ColumnSnapshot {
                    category: column.category.clone(),
                    cells: column
                        .cells
                        .iter()
                        .map(|cell| CellSnapshot {
                            value: cell.value,
                            revealed: cell.revealed,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Serializable board view: cell values and reveal flags only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub round: Round,
    pub columns: Vec<ColumnSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSnapshot {
    pub category: String,
    pub cells: Vec<CellSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub value: Option<u32>,
    pub revealed: bool,
}
