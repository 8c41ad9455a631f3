use ratatui::layout::Rect;
use tapthru::{point_field::Location, Bounds, SessionSnapshot};

/// Columns reserved at the right edge so the widest label still fits
const LABEL_RESERVE: u16 = 6;

pub fn label(number: u32) -> String {
    format!("({number})")
}

/// Maps playfield coordinates onto terminal cells inside `inner`
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    inner: Rect,
    bounds: Bounds,
}

impl Projection {
    pub fn new(inner: Rect, bounds: Bounds) -> Self {
        Self { inner, bounds }
    }

    /// Top-left cell of the label for a point at `location`
    pub fn to_cell(&self, location: Location) -> (u16, u16) {
        let cols = self.inner.width.saturating_sub(LABEL_RESERVE);
        let rows = self.inner.height.saturating_sub(2);
        let col = scale(location.x, self.bounds.max_x(), cols);
        let row = scale(location.y, self.bounds.max_y(), rows);
        (self.inner.x + col, self.inner.y + row)
    }

    /// Number of the topmost point whose label covers (`column`, `row`).
    ///
    /// Points are drawn from the highest number down, so lower numbers
    /// sit on top and win when labels overlap.
    pub fn hit_test(&self, snapshot: &SessionSnapshot, column: u16, row: u16) -> Option<u32> {
        snapshot.points.iter().find_map(|p| {
            let (c, r) = self.to_cell(p.location);
            let width = label(p.number).len() as u16;
            (r == row && (c..c + width).contains(&column)).then_some(p.number)
        })
    }
}

// Maps 1..=max onto 0..=span
fn scale(value: u32, max: u32, span: u16) -> u16 {
    let range = max.saturating_sub(1).max(1) as u64;
    let offset = value.saturating_sub(1).min(max.saturating_sub(1)) as u64;
    (offset * span as u64 / range) as u16
}
