//! Unpivoting: turning a crosstab block into one row per measure cell.
//!
//! The walk visits the data sheet's rows in document order and every row's
//! cells left to right, with implicit empty cells filling the gaps. Cells
//! above the data origin feed the horizontal label stripes, cells left of it
//! feed the vertical ones, and every other cell is a measure.
//!
//! Labels stay in effect from the position where they appear until a new
//! label shows up in the same stripe. A new label in an outer stripe also
//! ends every label of the inner stripes, so nested headers collapse the way
//! they read on screen.

use crate::xlsx::{CellContents, KeyedRow, RowElement};
use std::collections::VecDeque;

/// One output row: the measure, then horizontal labels, then vertical labels.
///
/// Only the measure may be `None`; a dimension without a label in effect is
/// left out.
pub type PivotRow = Vec<(String, Option<String>)>;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Label {
    offset: u32,
    value: String,
}

/// Label history of one orientation, one list per rank.
#[derive(Debug, Clone, Default)]
struct LabelStripe {
    ranks: Vec<Vec<Label>>,
}

impl LabelStripe {
    fn new(depth: usize) -> Self {
        Self {
            ranks: vec![Vec::new(); depth],
        }
    }

    fn depth(&self) -> usize {
        self.ranks.len()
    }

    fn push(&mut self, rank: usize, offset: u32, value: &str) {
        self.ranks[rank].push(Label {
            offset,
            value: value.to_string(),
        });
    }

    /// Start a new label at `rank`, dropping its history and that of every
    /// deeper rank.
    fn restart(&mut self, rank: usize, offset: u32, value: &str) {
        for labels in &mut self.ranks[rank..] {
            labels.clear();
        }
        self.push(rank, offset, value);
    }

    /// Labels in effect at `position`, as (rank, text).
    ///
    /// A deeper label only counts when it starts at or after the label in
    /// effect on the rank above it.
    fn labels_at(&self, position: u32) -> Vec<(usize, &str)> {
        let mut floor = 0;
        let mut found = Vec::with_capacity(self.ranks.len());
        for (rank, labels) in self.ranks.iter().enumerate() {
            let label = labels
                .iter()
                .rev()
                .find(|l| l.offset <= position && l.offset >= floor);
            if let Some(label) = label {
                floor = label.offset;
                found.push((rank, label.value.as_str()));
            }
        }
        found
    }
}

/// Rank of a stripe cell, counted from the outermost stripe; `None` when the
/// cell lies beyond the stripes.
fn stripe_rank(position: u32, origin: u32, depth: usize) -> Option<usize> {
    let rank = i64::from(position) - i64::from(origin) + depth as i64;
    usize::try_from(rank).ok()
}

/// Single pass over a crosstab region.
#[derive(Debug)]
pub struct Unpivot<'t> {
    rows: std::slice::Iter<'t, RowElement>,
    contents: CellContents<'t>,
    measure: &'t str,
    horizontal_names: Vec<&'t str>,
    vertical_names: Vec<&'t str>,
    data_column: u32,
    data_row: u32,
    horizontal: LabelStripe,
    vertical: LabelStripe,
    max_column: u32,
    max_row: u32,
    pending: VecDeque<PivotRow>,
}

impl<'t> Unpivot<'t> {
    /// Start a pass over `rows`, with the first measure cell at the 0-based
    /// `data_origin` (column, row).
    pub fn new(
        rows: &'t [RowElement],
        contents: CellContents<'t>,
        measure: &'t str,
        horizontal_names: Vec<&'t str>,
        vertical_names: Vec<&'t str>,
        data_origin: (u32, u32),
    ) -> Self {
        let (data_column, data_row) = data_origin;
        Self {
            rows: rows.iter(),
            contents,
            measure,
            horizontal: LabelStripe::new(horizontal_names.len()),
            vertical: LabelStripe::new(vertical_names.len()),
            horizontal_names,
            vertical_names,
            data_column,
            data_row,
            max_column: 0,
            max_row: 0,
            pending: VecDeque::new(),
        }
    }

    /// Rightmost column and lowest row of the region seen so far.
    pub fn extent(&self) -> (u32, u32) {
        (self.max_column, self.max_row)
    }

    fn walk(&mut self, row: &RowElement) {
        let values = self.contents.values(row);
        let width = values.len() as u32;
        for (column, value) in values.into_iter().enumerate() {
            self.observe(value, column as u32, row.index);
        }
        // Pad to the widest row so far
        let mut column = width;
        while column <= self.max_column {
            self.observe(None, column, row.index);
            column += 1;
        }
    }

    fn observe(&mut self, value: Option<String>, column: u32, row: u32) {
        let label = value.as_deref().filter(|v| !v.is_empty());

        if row < self.data_row {
            let rank = stripe_rank(row, self.data_row, self.horizontal.depth());
            if let (Some(rank), Some(label)) = (rank, label) {
                if column >= self.data_column {
                    self.horizontal.push(rank, column, label);
                    self.max_column = self.max_column.max(column);
                }
            }
            return;
        }

        if column < self.data_column {
            let rank = stripe_rank(column, self.data_column, self.vertical.depth());
            if let (Some(rank), Some(label)) = (rank, label) {
                self.vertical.restart(rank, row, label);
                self.max_row = self.max_row.max(row);
            }
            return;
        }

        self.max_column = self.max_column.max(column);
        self.max_row = self.max_row.max(row);
        let output = self.output_row(value, column, row);
        self.pending.push_back(output);
    }

    fn output_row(&self, value: Option<String>, column: u32, row: u32) -> PivotRow {
        let mut output = Vec::with_capacity(1 + self.horizontal.depth() + self.vertical.depth());
        output.push((self.measure.to_string(), value));
        for (rank, label) in self.horizontal.labels_at(column) {
            output.push((self.horizontal_names[rank].to_string(), Some(label.to_string())));
        }
        for (rank, label) in self.vertical.labels_at(row) {
            output.push((self.vertical_names[rank].to_string(), Some(label.to_string())));
        }
        output
    }
}

impl Iterator for Unpivot<'_> {
    type Item = PivotRow;

    fn next(&mut self) -> Option<PivotRow> {
        loop {
            if let Some(output) = self.pending.pop_front() {
                return Some(output);
            }
            let row = self.rows.next()?;
            self.walk(row);
        }
    }
}

enum Source<'t> {
    Empty,
    Plain(Box<dyn Iterator<Item = KeyedRow> + 't>),
    Pivot(Unpivot<'t>),
}

/// Rows of a pivot table: unpivoted, or the plain rows of a table without
/// dimensions.
pub struct TableRows<'t> {
    source: Source<'t>,
}

impl<'t> TableRows<'t> {
    pub(crate) fn empty() -> Self {
        Self {
            source: Source::Empty,
        }
    }

    pub(crate) fn plain(rows: Box<dyn Iterator<Item = KeyedRow> + 't>) -> Self {
        Self {
            source: Source::Plain(rows),
        }
    }

    pub(crate) fn pivot(rows: Unpivot<'t>) -> Self {
        Self {
            source: Source::Pivot(rows),
        }
    }
}

impl Iterator for TableRows<'_> {
    type Item = PivotRow;

    fn next(&mut self) -> Option<PivotRow> {
        match &mut self.source {
            Source::Empty => None,
            Source::Plain(rows) => rows
                .next()
                .map(|row| row.into_iter().map(|(k, v)| (k, Some(v))).collect()),
            Source::Pivot(rows) => rows.next(),
        }
    }
}

impl std::fmt::Debug for TableRows<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.source {
            Source::Empty => "empty",
            Source::Plain(_) => "plain",
            Source::Pivot(_) => "pivot",
        };
        f.debug_struct("TableRows").field("source", &kind).finish()
    }
}
