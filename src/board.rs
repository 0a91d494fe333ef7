use serde::{Deserialize, Serialize};


#[derive(
    Clone, Copy, PartialEq, Eq, Hash, Debug,
    Serialize, Deserialize, strum::Display, strum::EnumString,
)]
pub enum Symbol {
    X,
    O,
}

// Room lifecycle stage as reported by the server. The client mirrors the
// reported value verbatim and never validates transitions.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GamePhase {
    Waiting,
    Playing,
    Finished,
    Draw,
}

// Index of a board cell, valid by construction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Cell(u8);

impl Cell {
    pub const COUNT: u8 = 9;

    pub fn new(index: u8) -> Option<Self> { (index < Self::COUNT).then_some(Cell(index)) }
    pub fn index(self) -> usize { self.0.into() }
    pub fn all() -> impl Iterator<Item = Cell> { (0..Self::COUNT).map(Cell) }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> Self { cell.0 }
}

impl TryFrom<u8> for Cell {
    type Error = String;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Cell::new(index).ok_or_else(|| format!("Cell index out of range: {}", index))
    }
}

// On the wire each cell is a string: "X", "O" or "" for a free cell.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Board {
    cells: [Option<Symbol>; Cell::COUNT as usize],
}

impl Board {
    pub fn empty() -> Self { Board::default() }

    pub fn cell(&self, cell: Cell) -> Option<Symbol> { self.cells[cell.index()] }
    pub fn is_free(&self, cell: Cell) -> bool { self.cell(cell).is_none() }
}

impl From<Board> for Vec<String> {
    fn from(board: Board) -> Self {
        board
            .cells
            .iter()
            .map(|cell| cell.map(|symbol| symbol.to_string()).unwrap_or_default())
            .collect()
    }
}

impl TryFrom<Vec<String>> for Board {
    type Error = String;

    fn try_from(cells: Vec<String>) -> Result<Self, Self::Error> {
        let parsed = cells
            .iter()
            .map(|cell| {
                if cell.is_empty() {
                    Ok(None)
                } else {
                    cell.parse::<Symbol>()
                        .map(Some)
                        .map_err(|_| format!("Unexpected cell value: {:?}", cell))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        let cells: [Option<Symbol>; Cell::COUNT as usize] = parsed
            .try_into()
            .map_err(|bad: Vec<_>| format!("Expected {} cells, got {}", Cell::COUNT, bad.len()))?;
        Ok(Board { cells })
    }
}
