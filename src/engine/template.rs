use std::fmt;

/// Glyph drawn for a blank that has not been typed yet.
pub const SLOT_MARKER: char = '_';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    /// An alphanumeric position the user has to type.
    Blank,
    /// Any other character, shown as-is and never typed directly.
    Literal(char),
}

impl Cell {
    pub fn is_blank(self) -> bool {
        matches!(self, Cell::Blank)
    }

    pub fn glyph(self) -> char {
        match self {
            Cell::Blank => SLOT_MARKER,
            Cell::Literal(ch) => ch,
        }
    }
}

/// A sentence with every `[A-Za-z0-9]` character replaced by a blank.
///
/// Always has exactly one cell per `char` of the source sentence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Template {
    cells: Vec<Cell>,
}

impl Template {
    pub fn build(sentence: &str) -> Self {
        let cells = sentence
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() {
                    Cell::Blank
                } else {
                    Cell::Literal(ch)
                }
            })
            .collect();
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, idx: usize) -> Option<Cell> {
        self.cells.get(idx).copied()
    }

    pub fn blank_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_blank()).count()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cell in &self.cells {
            write!(f, "{}", cell.glyph())?;
        }
        Ok(())
    }
}
