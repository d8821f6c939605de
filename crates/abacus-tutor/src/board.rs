//! Projection of a long-division step sequence onto a display grid.
//!
//! The board is recomputed from scratch for every cursor position. It is a
//! sparse map keyed by `(row, col)`; the dimensions are known up front from
//! the number of dividend digits and the width of the divisor:
//!
//! ```text
//!   133      row 0: quotient
//!   ---
//! 4)532      row 1: divisor, bracket, dividend
//!  -4        row 2: first product
//!   -
//!   13       row 3: first difference + brought-down digit
//!  ...
//! ```
//!
//! Columns `0..margin` hold the divisor and the bracket glyph; dividend
//! column `i` is board column `margin + i`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

use crate::division::{digits_of, Step, StepKind};

/// Glyph drawn between the divisor and the dividend.
pub const BRACKET: &str = ")";

/// Interaction mode of the division board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Free playback of worked steps.
    #[default]
    Learn,
    /// The learner answers each step.
    Practice,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Learn => write!(f, "learn"),
            Self::Practice => write!(f, "practice"),
        }
    }
}

/// What a cell shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellContent {
    /// Settled text (one character).
    Text {
        /// The character(s) to draw.
        text: String,
    },
    /// Input box for the step being answered, spanning `width` columns
    /// starting at this cell.
    Input {
        /// Number of digits expected.
        width: usize,
    },
}

/// Presentation hints for a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    /// Emphasis for cells touched by the active step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<StepKind>,
    /// Line above the cell (the bracket overline on the dividend).
    pub border_top: bool,
    /// Line below the cell (under a product to subtract).
    pub border_bottom: bool,
    /// Draw a minus sign to the left of the cell.
    pub minus: bool,
}

/// One positioned cell of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Board row.
    pub row: usize,
    /// Board column (including the margin).
    pub col: usize,
    /// Content of the cell.
    pub content: CellContent,
    /// Presentation hints.
    pub style: CellStyle,
}

impl Cell {
    fn text(row: usize, col: usize, text: impl Into<String>) -> Self {
        Self {
            row,
            col,
            content: CellContent::Text { text: text.into() },
            style: CellStyle::default(),
        }
    }

    fn input(row: usize, col: usize, width: usize) -> Self {
        Self {
            row,
            col,
            content: CellContent::Input { width },
            style: CellStyle::default(),
        }
    }

    /// Returns the settled text, if any.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            CellContent::Text { text } => Some(text),
            CellContent::Input { .. } => None,
        }
    }

    /// Returns `true` if this cell is an input placeholder.
    #[must_use]
    pub const fn is_input(&self) -> bool {
        matches!(self.content, CellContent::Input { .. })
    }
}

/// Result shown once the `Finish` step is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSummary {
    /// Final quotient.
    pub quotient: u64,
    /// Final remainder.
    pub remainder: u64,
}

/// A projected long-division board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    /// Number of rows (`2 × digits + 2`).
    pub rows: usize,
    /// Number of columns (`margin + digits`).
    pub cols: usize,
    /// Columns reserved for the divisor and bracket.
    pub margin: usize,
    /// Index of the step being shown or answered.
    pub active_step: Option<usize>,
    /// Final result, once reached.
    pub summary: Option<BoardSummary>,
    #[serde(serialize_with = "serialize_cells")]
    cells: BTreeMap<(usize, usize), Cell>,
}

fn serialize_cells<S>(
    cells: &BTreeMap<(usize, usize), Cell>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(cells.values())
}

impl Board {
    /// Returns the cell at `(row, col)`.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Iterates cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// Returns the number of occupied cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if nothing is drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the input placeholder, if one is shown.
    #[must_use]
    pub fn input_cell(&self) -> Option<&Cell> {
        self.cells.values().find(|cell| cell.is_input())
    }

    /// Reads the revealed quotient digits left to right.
    #[must_use]
    pub fn quotient_row(&self) -> String {
        self.cells
            .range((0, 0)..(1, 0))
            .filter_map(|(_, cell)| cell.as_text())
            .collect()
    }

    /// Renders the board as monospaced text.
    ///
    /// Input placeholders draw as `?` per expected digit; borders draw as a
    /// separate line of `-` between rows.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();

        for row in 0..self.rows {
            let mut line = vec![' '; self.cols];
            for col in 0..self.cols {
                let Some(cell) = self.cell(row, col) else {
                    continue;
                };
                match &cell.content {
                    CellContent::Text { text } => {
                        if let Some(ch) = text.chars().next() {
                            line[col] = ch;
                        }
                    }
                    CellContent::Input { width } => {
                        for offset in 0..*width {
                            if let Some(slot) = line.get_mut(col + offset) {
                                *slot = '?';
                            }
                        }
                    }
                }
                if cell.style.minus && col > 0 {
                    line[col - 1] = '-';
                }
            }
            lines.push(line.into_iter().collect::<String>().trim_end().to_string());

            let rule: String = (0..self.cols)
                .map(|col| {
                    let below = self
                        .cell(row, col)
                        .is_some_and(|cell| cell.style.border_bottom);
                    let above = self
                        .cell(row + 1, col)
                        .is_some_and(|cell| cell.style.border_top);
                    if below || above {
                        '-'
                    } else {
                        ' '
                    }
                })
                .collect();
            if rule.contains('-') {
                lines.push(rule.trim_end().to_string());
            }
        }

        while lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }
        // The quotient row stays blank until the first Divide settles.
        let first = lines.iter().position(|line| !line.is_empty()).unwrap_or(lines.len());
        lines[first..].join("\n")
    }

    fn put(&mut self, cell: Cell) {
        self.cells.insert((cell.row, cell.col), cell);
    }

    fn highlight(&mut self, row: usize, col: usize, kind: StepKind) {
        if let Some(cell) = self.cells.get_mut(&(row, col)) {
            cell.style.highlight = Some(kind);
        }
    }

    /// Writes `value` right-aligned so its last digit lands on `last_col`.
    fn put_number(&mut self, row: usize, last_col: usize, value: u64, product_row: bool) {
        let digits = digits_of(value);
        let first_col = (last_col + 1).saturating_sub(digits.len());
        for (offset, digit) in digits.iter().enumerate() {
            let mut cell = Cell::text(row, first_col + offset, digit.to_string());
            cell.style.border_bottom = product_row;
            cell.style.minus = product_row && offset == 0;
            self.put(cell);
        }
    }

    fn highlight_number(&mut self, row: usize, last_col: usize, value: u64, kind: StepKind) {
        let width = digits_of(value).len();
        let first_col = (last_col + 1).saturating_sub(width);
        for col in first_col..=last_col {
            self.highlight(row, col, kind);
        }
    }
}

/// Projects `steps` onto a board.
///
/// In [`Mode::Learn`] the steps `0..=cursor` are drawn and the cursor step is
/// highlighted. In [`Mode::Practice`] the steps `0..cursor` are drawn and the
/// cursor step becomes an input placeholder sized to its expected answer.
/// Later steps are never drawn, so a quotient digit appears only once its
/// column's `Divide` step has been passed.
#[must_use]
pub fn project(steps: &[Step], cursor: usize, mode: Mode) -> Board {
    let mut dividend_digits = Vec::new();
    let mut divisor = None;
    for step in steps {
        match step {
            Step::Focus { value, .. } => dividend_digits.push(*value),
            Step::BringDown { digit, .. } => dividend_digits.push(*digit),
            Step::Divide { divisor: d, .. } if divisor.is_none() => divisor = Some(*d),
            _ => {}
        }
    }

    let n = dividend_digits.len();
    let divisor_text = divisor.map(|d| d.to_string()).unwrap_or_default();
    let margin = divisor_text.len() + 1;

    let mut board = Board {
        rows: 2 * n + 2,
        cols: margin + n,
        margin,
        active_step: None,
        summary: None,
        cells: BTreeMap::new(),
    };

    if steps.is_empty() {
        return board;
    }

    // Divisor, bracket and dividend are always visible.
    for (offset, ch) in divisor_text.chars().enumerate() {
        board.put(Cell::text(1, offset, ch.to_string()));
    }
    board.put(Cell::text(1, margin - 1, BRACKET));
    for (i, digit) in dividend_digits.iter().enumerate() {
        let mut cell = Cell::text(1, margin + i, digit.to_string());
        cell.style.border_top = true;
        board.put(cell);
    }

    let last = steps.len() - 1;
    let cursor = cursor.min(last);
    let settled_end = match mode {
        Mode::Learn => cursor + 1,
        Mode::Practice => cursor,
    };
    board.active_step = Some(cursor);

    for step in &steps[..settled_end] {
        draw_settled(&mut board, step);
    }

    let active = &steps[cursor];
    match mode {
        Mode::Learn => highlight_active(&mut board, active),
        Mode::Practice => draw_placeholder(&mut board, active),
    }

    board
}

fn draw_settled(board: &mut Board, step: &Step) {
    let margin = board.margin;
    match step {
        Step::Focus { .. } => {}
        Step::BringDown { digit, col, row, .. } => {
            board.put(Cell::text(*row, margin + col, digit.to_string()));
        }
        Step::Divide {
            quotient_digit,
            col,
            ..
        } => {
            board.put(Cell::text(0, margin + col, quotient_digit.to_string()));
        }
        Step::Multiply {
            product, col, row, ..
        } => board.put_number(*row, margin + col, *product, true),
        Step::Subtract {
            difference,
            col,
            row,
            ..
        } => board.put_number(*row, margin + col, *difference, false),
        Step::Finish {
            quotient,
            remainder,
        } => {
            board.summary = Some(BoardSummary {
                quotient: *quotient,
                remainder: *remainder,
            });
        }
    }
}

fn highlight_active(board: &mut Board, step: &Step) {
    let margin = board.margin;
    let kind = step.kind();
    match step {
        Step::Focus { index, .. } => board.highlight(1, margin + index, kind),
        Step::BringDown { col, row, .. } => {
            board.highlight(1, margin + col, kind);
            board.highlight(*row, margin + col, kind);
        }
        Step::Divide { col, .. } => board.highlight(0, margin + col, kind),
        Step::Multiply {
            product, col, row, ..
        } => board.highlight_number(*row, margin + col, *product, kind),
        Step::Subtract {
            difference,
            col,
            row,
            ..
        } => board.highlight_number(*row, margin + col, *difference, kind),
        Step::Finish { .. } => {}
    }
}

fn draw_placeholder(board: &mut Board, step: &Step) {
    let margin = board.margin;
    let kind = step.kind();
    let width = step.expected_answer().map_or(0, str::len);

    let (row, last_col, product_row) = match step {
        Step::BringDown { col, row, .. } => {
            board.highlight(1, margin + col, kind);
            (*row, margin + col, false)
        }
        Step::Divide { col, .. } => (0, margin + col, false),
        Step::Multiply { col, row, .. } => (*row, margin + col, true),
        Step::Subtract { col, row, .. } => (*row, margin + col, false),
        Step::Focus { .. } | Step::Finish { .. } => {
            draw_settled(board, step);
            return;
        }
    };

    let first_col = (last_col + 1).saturating_sub(width);
    let mut cell = Cell::input(row, first_col, width);
    cell.style.highlight = Some(kind);
    cell.style.border_bottom = product_row;
    cell.style.minus = product_row;
    board.put(cell);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use crate::division::generate_steps;

    fn steps(dividend: u64, divisor: u32) -> Vec<Step> {
        generate_steps(dividend, NonZeroU32::new(divisor).unwrap())
    }

    #[test]
    fn test_dimensions() {
        let board = project(&steps(532, 4), 0, Mode::Learn);
        assert_eq!(board.rows, 8);
        assert_eq!(board.margin, 2);
        assert_eq!(board.cols, 5);
    }

    #[test]
    fn test_static_cells_always_drawn() {
        let board = project(&steps(532, 4), 0, Mode::Learn);
        assert_eq!(board.cell(1, 0).unwrap().as_text(), Some("4"));
        assert_eq!(board.cell(1, 1).unwrap().as_text(), Some(")"));
        assert_eq!(board.cell(1, 2).unwrap().as_text(), Some("5"));
        assert_eq!(board.cell(1, 4).unwrap().as_text(), Some("2"));
        assert!(board.cell(1, 3).unwrap().style.border_top);
        assert_eq!(board.quotient_row(), "");
    }

    #[test]
    fn test_focus_highlights_first_digit() {
        let board = project(&steps(532, 4), 0, Mode::Learn);
        assert_eq!(
            board.cell(1, 2).unwrap().style.highlight,
            Some(StepKind::Focus)
        );
        assert_eq!(board.cell(1, 3).unwrap().style.highlight, None);
    }

    #[test]
    fn test_learn_final_subtract_shows_full_quotient() {
        let steps = steps(532, 4);
        let board = project(&steps, 11, Mode::Learn);
        assert_eq!(board.quotient_row(), "133");
        assert_eq!(board.summary, None);
        assert_eq!(
            board.cell(7, 4).unwrap().style.highlight,
            Some(StepKind::Subtract)
        );
    }

    #[test]
    fn test_quotient_hidden_until_divide_reached() {
        let steps = steps(532, 4);
        // Cursor on the second BringDown: column 2 has not been divided yet
        let board = project(&steps, 8, Mode::Learn);
        assert_eq!(board.quotient_row(), "13");
        assert!(board.cell(0, 4).is_none());

        // Cursor on the final Divide: it is reached, so it shows
        let board = project(&steps, 9, Mode::Learn);
        assert_eq!(board.quotient_row(), "133");
    }

    #[test]
    fn test_practice_divide_is_placeholder() {
        let steps = steps(532, 4);
        let board = project(&steps, 9, Mode::Practice);
        assert_eq!(board.quotient_row(), "13");
        let input = board.input_cell().unwrap();
        assert_eq!((input.row, input.col), (0, 4));
        assert_eq!(input.content, CellContent::Input { width: 1 });
        assert_eq!(input.style.highlight, Some(StepKind::Divide));
    }

    #[test]
    fn test_practice_multiply_placeholder_right_aligned() {
        let steps = steps(532, 4);
        // Step 6 is Multiply 3 × 4 = 12 anchored at dividend column 1
        let board = project(&steps, 6, Mode::Practice);
        let input = board.input_cell().unwrap();
        assert_eq!((input.row, input.col), (4, 2));
        assert_eq!(input.content, CellContent::Input { width: 2 });
        assert!(input.style.minus);
        assert!(input.style.border_bottom);
        // The product itself is not drawn
        assert!(board.cell(4, 3).is_none());
    }

    #[test]
    fn test_practice_future_steps_invisible() {
        let steps = steps(532, 4);
        let board = project(&steps, 1, Mode::Practice);
        assert_eq!(board.quotient_row(), "");
        for row in 2..board.rows {
            for col in 0..board.cols {
                assert!(board.cell(row, col).is_none());
            }
        }
    }

    #[test]
    fn test_bring_down_lands_next_to_difference() {
        let steps = steps(532, 4);
        let board = project(&steps, 4, Mode::Learn);
        assert_eq!(board.cell(3, 2).unwrap().as_text(), Some("1"));
        assert_eq!(board.cell(3, 3).unwrap().as_text(), Some("3"));
        assert_eq!(
            board.cell(1, 3).unwrap().style.highlight,
            Some(StepKind::BringDown)
        );
    }

    #[test]
    fn test_finish_sets_summary() {
        let steps = steps(17, 5);
        let board = project(&steps, steps.len() - 1, Mode::Learn);
        assert_eq!(
            board.summary,
            Some(BoardSummary {
                quotient: 3,
                remainder: 2
            })
        );
        assert!(board.input_cell().is_none());
    }

    #[test]
    fn test_cursor_is_clamped() {
        let steps = steps(17, 5);
        let board = project(&steps, 999, Mode::Learn);
        assert_eq!(board.active_step, Some(steps.len() - 1));
    }

    #[test]
    fn test_empty_steps_give_empty_board() {
        let board = project(&[], 0, Mode::Learn);
        assert!(board.is_empty());
        assert_eq!(board.active_step, None);
    }

    #[test]
    fn test_two_digit_divisor_margin() {
        let board = project(&steps(9_999, 12), 0, Mode::Learn);
        assert_eq!(board.margin, 3);
        assert_eq!(board.cell(1, 0).unwrap().as_text(), Some("1"));
        assert_eq!(board.cell(1, 1).unwrap().as_text(), Some("2"));
        assert_eq!(board.cell(1, 2).unwrap().as_text(), Some(")"));
    }

    #[test]
    fn test_to_text_full_board() {
        let steps = steps(532, 4);
        let board = project(&steps, steps.len() - 1, Mode::Learn);
        let expected = [
            "  133", "  ---", "4)532", " -4", "  -", "  13", " -12", "  --", "   12", "  -12",
            "   --", "    0",
        ]
        .join("\n");
        assert_eq!(board.to_text(), expected);
    }

    #[test]
    fn test_to_text_skips_blank_quotient_row() {
        let board = project(&steps(532, 4), 0, Mode::Learn);
        assert_eq!(board.to_text(), ["  ---", "4)532"].join("\n"));

        let board = project(&steps(532, 4), 1, Mode::Practice);
        assert!(!board.to_text().starts_with('\n'));
    }

    #[test]
    fn test_to_text_practice_placeholder() {
        let steps = steps(532, 4);
        let board = project(&steps, 6, Mode::Practice);
        let expected = ["  13", "  ---", "4)532", " -4", "  -", "  13", " -??", "  --"].join("\n");
        assert_eq!(board.to_text(), expected);
    }

    #[test]
    fn test_board_serialization() {
        let board = project(&steps(17, 5), 1, Mode::Practice);
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json["rows"], 6);
        assert_eq!(json["margin"], 2);
        assert_eq!(json["activeStep"], 1);
        let cells = json["cells"].as_array().unwrap();
        assert!(cells
            .iter()
            .any(|cell| cell["content"]["type"] == "input" && cell["content"]["width"] == 1));
    }

    #[test]
    fn test_mode_display_and_serde() {
        assert_eq!(Mode::Learn.to_string(), "learn");
        assert_eq!(
            serde_json::to_string(&Mode::Practice).unwrap(),
            r#""practice""#
        );
        assert_eq!(Mode::default(), Mode::Learn);
    }
}
