use crate::document::{CellId, DocumentPath};

/// Zero-based line and column, columns counted in chars
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Position {
        Position { line, column }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Backwards selections get flipped so that `start <= end`
    pub fn new(a: Position, b: Position) -> Range {
        match a <= b {
            true => Range { start: a, end: b },
            false => Range { start: b, end: a },
        }
    }
}

/// How much a re-resolved selection anchor can be trusted after the
/// underlying text was edited
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Freshness {
    /// The snapshot text is still at the recorded offset
    Exact,

    /// The snapshot text was found elsewhere, the closest occurrence is used
    Relocated,

    /// The snapshot text is gone, the recorded range is clamped to the text
    Stale,
}

/// A stored target resolved back to a live region of an open document
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Anchor {
    Document {
        path: DocumentPath,
    },
    Cell {
        path: DocumentPath,
        cell: CellId,
        index: usize,
    },
    CellSelection {
        path: DocumentPath,
        cell: CellId,
        index: usize,
        range: Range,
        freshness: Freshness,
    },
    TextSelection {
        path: DocumentPath,
        range: Range,
        freshness: Freshness,
    },
}

impl Anchor {
    pub fn path(&self) -> &DocumentPath {
        match self {
            Anchor::Document { path }
            | Anchor::Cell { path, .. }
            | Anchor::CellSelection { path, .. }
            | Anchor::TextSelection { path, .. } => path,
        }
    }

    pub fn freshness(&self) -> Freshness {
        match self {
            Anchor::Document { .. } | Anchor::Cell { .. } => Freshness::Exact,
            Anchor::CellSelection { freshness, .. } | Anchor::TextSelection { freshness, .. } => {
                *freshness
            }
        }
    }
}

/// What selection-based targets persist to find their selection again after
/// other collaborators edited the text
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SelectionSnapshot {
    pub start: Position,
    pub end: Position,

    /// Char offset of `start` at snapshot time
    pub offset: usize,

    /// Selected text at snapshot time
    pub anchor: String,
}

impl SelectionSnapshot {
    pub fn take(text: &str, range: Range) -> SelectionSnapshot {
        let range = Range::new(range.start, range.end);
        let start = offset_of(text, range.start);
        let end = offset_of(text, range.end).max(start);
        SelectionSnapshot {
            start: range.start,
            end: range.end,
            offset: start,
            anchor: text.chars().skip(start).take(end - start).collect(),
        }
    }

    pub fn locate(&self, text: &str) -> (Range, Freshness) {
        let anchor_len = self.anchor.chars().count();
        let (start, freshness) = relocate(text, self.offset, &self.anchor);
        let end = match freshness {
            Freshness::Stale => (start + anchor_len).min(text.chars().count()),
            Freshness::Exact | Freshness::Relocated => start + anchor_len,
        };
        let range = Range {
            start: position_of(text, start),
            end: position_of(text, end),
        };
        (range, freshness)
    }
}

/// Char offset of `pos` in `text`. Columns past the end of their line clamp to
/// the line end, lines past the end of the text clamp to the text end.
pub fn offset_of(text: &str, pos: Position) -> usize {
    let (mut line, mut column) = (0, 0);
    for (i, c) in text.chars().enumerate() {
        if line == pos.line && column == pos.column {
            return i;
        }
        if c == '\n' {
            if line == pos.line {
                return i;
            }
            line += 1;
            column = 0;
        } else {
            column += 1;
        }
    }
    text.chars().count()
}

pub fn position_of(text: &str, offset: usize) -> Position {
    let mut pos = Position::default();
    for c in text.chars().take(offset) {
        if c == '\n' {
            pos.line += 1;
            pos.column = 0;
        } else {
            pos.column += 1;
        }
    }
    pos
}

fn relocate(text: &str, offset: usize, anchor: &str) -> (usize, Freshness) {
    let len = text.chars().count();
    if anchor.is_empty() {
        return match offset <= len {
            true => (offset, Freshness::Exact),
            false => (len, Freshness::Stale),
        };
    }
    let anchor_len = anchor.chars().count();
    // offsets come from stored descriptors and may be arbitrarily large
    let fits = offset.checked_add(anchor_len).map_or(false, |end| end <= len);
    if fits
        && text.chars().skip(offset).take(anchor_len).eq(anchor.chars())
    {
        return (offset, Freshness::Exact);
    }
    let closest = text
        .match_indices(anchor)
        .map(|(byte_idx, _)| text[..byte_idx].chars().count())
        .min_by_key(|found| found.abs_diff(offset));
    match closest {
        Some(found) => (found, Freshness::Relocated),
        None => (offset.min(len), Freshness::Stale),
    }
}
