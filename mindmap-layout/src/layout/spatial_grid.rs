// Spatial hash grid for overlap queries while placing orphans.
//
// Instead of checking a candidate against every placed rectangle, rectangles are
// bucketed into square cells and only the cells a candidate touches are scanned.

use std::collections::{HashMap, HashSet};

use super::Rect;

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f64,
    /// Cell coordinates -> indices into `rects`.
    cells: HashMap<(i64, i64), Vec<usize>>,
    rects: Vec<Rect>,
}

impl SpatialGrid {
    /// Cell size should be roughly the size of the largest expected item.
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size: cell_size.max(1.0),
            cells: HashMap::new(),
            rects: Vec::new(),
        }
    }

    fn cell_range(&self, rect: &Rect) -> Vec<(i64, i64)> {
        let min_x = (rect.x / self.cell_size).floor() as i64;
        let max_x = (rect.right() / self.cell_size).floor() as i64;
        let min_y = (rect.y / self.cell_size).floor() as i64;
        let max_y = (rect.bottom() / self.cell_size).floor() as i64;
        let mut cells = Vec::new();
        for cx in min_x..=max_x {
            for cy in min_y..=max_y {
                cells.push((cx, cy));
            }
        }
        cells
    }

    pub fn insert(&mut self, rect: Rect) {
        let idx = self.rects.len();
        self.rects.push(rect);
        for cell in self.cell_range(&rect) {
            self.cells.entry(cell).or_default().push(idx);
        }
    }

    /// Rectangles sharing a cell with `rect`. May include false positives.
    pub fn query(&self, rect: &Rect) -> Vec<Rect> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for cell in self.cell_range(rect) {
            if let Some(indices) = self.cells.get(&cell) {
                for &i in indices {
                    if seen.insert(i) {
                        result.push(self.rects[i]);
                    }
                }
            }
        }
        result
    }

    pub fn overlaps_any(&self, rect: &Rect) -> bool {
        self.query(rect).iter().any(|r| rect.overlaps(r))
    }
}
