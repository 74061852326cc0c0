use crate::config::LayoutCode;
use crate::engine::{Board, Cell, Monster, Stone, Tier, SPAWN_LEVEL};
use crate::error::EngineError;

/// Parses row strings into a fully specified `Board`.
///
/// Each string is one row, starting from row 0. Cells are separated by
/// whitespace and every row must have the same number of cells. Cell tokens:
/// - `.`: `Cell::Empty`
/// - `#<hp>`: a `Cell::Stone` with the given hit points, e.g. `#3`
/// - `<id><tier>[<level>]`: a `Cell::Monster` whose type id is the first
///   character, tier is `A`, `B` or `C`, and level defaults to 1, e.g. `XC`,
///   `YB4`
///
/// # Arguments
/// * `rows`: The board rows, top first.
/// * `catalog`: The monster type ids the board draws from.
///
/// # Returns
/// * `Ok(Board)` if every token parses and the rows form a rectangle.
/// * `Err(EngineError)` for an unrecognized token, ragged rows, an empty
///   input, or a monster whose type id is missing from `catalog`.
///
/// # Examples
/// ```
/// use monster_merge::utils::board_from_str_array;
/// use monster_merge::engine::{Cell, Tier};
///
/// let board = board_from_str_array(&["XC YB2", "#3 ."], &["X", "Y"]).unwrap();
/// assert_eq!(board.rows(), 2);
/// assert_eq!(board.get(1).as_monster().unwrap().tier, Tier::B);
/// assert_eq!(board.get(1).as_monster().unwrap().level, 2);
/// assert!(matches!(board.get(2), Cell::Stone(s) if s.hp == 3));
/// assert_eq!(board.get(3), &Cell::Empty);
///
/// assert!(board_from_str_array(&["XQ"], &["X"]).is_err());
/// ```
pub fn board_from_str_array(rows: &[&str], catalog: &[&str]) -> Result<Board, EngineError> {
    let mut cells = Vec::new();
    let mut cols = None;

    for (r, row_str) in rows.iter().enumerate() {
        let tokens: Vec<&str> = row_str.split_whitespace().collect();
        let expected = *cols.get_or_insert(tokens.len());
        if tokens.len() != expected {
            return Err(EngineError::LayoutMismatch {
                expected: expected * rows.len(),
                found: cells.len() + tokens.len(),
            });
        }
        for (c, token) in tokens.iter().enumerate() {
            let index = cells.len();
            cells.push(parse_cell_token(token, index).ok_or_else(|| {
                EngineError::UnknownCellCode {
                    code: token.to_string(),
                    row: r,
                    col: c,
                }
            })?);
        }
    }

    Board::from_cells(
        rows.len(),
        cols.unwrap_or(0),
        cells,
        catalog.iter().map(|id| id.to_string()).collect(),
    )
}

fn parse_cell_token(token: &str, index: usize) -> Option<Cell> {
    if token == "." {
        return Some(Cell::Empty);
    }
    if let Some(hp) = token.strip_prefix('#') {
        return hp.parse().ok().map(|hp| Cell::Stone(Stone::new(index, hp)));
    }

    let mut chars = token.chars();
    let kind = chars.next()?;
    let tier = Tier::from_char(chars.next()?)?;
    let rest = chars.as_str();
    let level = if rest.is_empty() {
        SPAWN_LEVEL
    } else {
        rest.parse().ok()?
    };
    Some(Cell::Monster(Monster::new(index, kind.to_string(), tier, level)))
}

/// Parses layout rows into `(rows, cols, codes)`.
///
/// Each character is one cell: `M` monster, `S` stone, `.` empty. All rows
/// must have the same length.
///
/// # Examples
/// ```
/// use monster_merge::utils::layout_from_str_array;
/// use monster_merge::config::LayoutCode;
///
/// let (rows, cols, codes) = layout_from_str_array(&["MS", "M."]).unwrap();
/// assert_eq!((rows, cols), (2, 2));
/// assert_eq!(codes[1], LayoutCode::Stone);
/// assert_eq!(codes[3], LayoutCode::Empty);
/// ```
pub fn layout_from_str_array<S: AsRef<str>>(
    rows: &[S],
) -> Result<(usize, usize, Vec<LayoutCode>), EngineError> {
    let cols = rows.first().map_or(0, |row| row.as_ref().chars().count());
    let mut codes = Vec::with_capacity(rows.len() * cols);

    for (r, row_str) in rows.iter().enumerate() {
        let row_str = row_str.as_ref();
        if row_str.chars().count() != cols {
            return Err(EngineError::LayoutMismatch {
                expected: rows.len() * cols,
                found: codes.len() + row_str.chars().count(),
            });
        }
        for (c, ch) in row_str.chars().enumerate() {
            codes.push(match ch {
                'M' => LayoutCode::Monster,
                'S' => LayoutCode::Stone,
                '.' => LayoutCode::Empty,
                _ => {
                    return Err(EngineError::UnknownCellCode {
                        code: ch.to_string(),
                        row: r,
                        col: c,
                    })
                }
            });
        }
    }

    Ok((rows.len(), cols, codes))
}
