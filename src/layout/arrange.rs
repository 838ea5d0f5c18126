//! Row, column and grid placement of sibling slots inside a content rectangle.
//!
//! A [`Distribution`] is planned once per pass from the visible siblings'
//! [`Sizing`], then asked for one rectangle at a time. Row and column
//! placement chain off the previous sibling's final rectangle, so the caller
//! must finish a sibling (including any growth of its own) before placing the
//! next one.

use serde::Serialize;

use super::constraint::{Axis, Sizing};
use super::grid::GridDims;
use crate::geometry::{Rect, Size, clamp_extent};

/// How a node partitions its content rectangle among children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arrangement {
    /// Left to right, sharing the full content height.
    Row,
    /// Top to bottom, sharing the full content width.
    #[default]
    Column,
    Grid,
}

impl Arrangement {
    /// Axis along which siblings are distributed. Grids distribute both.
    pub fn main_axis(self) -> Option<Axis> {
        match self {
            Arrangement::Row => Some(Axis::Width),
            Arrangement::Column => Some(Axis::Height),
            Arrangement::Grid => None,
        }
    }

    /// Minimum size of `children` laid out under this policy.
    pub fn aggregate_min(self, spacing: f32, children: &[Size]) -> Size {
        if children.is_empty() {
            return Size::ZERO;
        }
        let n = children.len();
        let gaps = spacing * (n - 1) as f32;
        let widest = children.iter().map(|s| s.width).fold(0.0, f32::max);
        let tallest = children.iter().map(|s| s.height).fold(0.0, f32::max);
        match self {
            Arrangement::Row => {
                let total: f32 = children.iter().map(|s| s.width).sum();
                Size::new(total + gaps, tallest)
            }
            Arrangement::Column => {
                let total: f32 = children.iter().map(|s| s.height).sum();
                Size::new(widest, total + gaps)
            }
            Arrangement::Grid => {
                let dims = GridDims::for_children(n);
                Size::new(
                    dims.cols as f32 * widest + spacing * (dims.cols + 1) as f32,
                    dims.rows as f32 * tallest + spacing * (dims.rows + 1) as f32,
                )
            }
        }
    }
}

/// A placed rectangle plus whether either extent had to be clamped to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub rect: Rect,
    pub clamped: bool,
}

/// Per-pass distribution plan for one set of siblings.
#[derive(Debug, Clone)]
pub struct Distribution {
    arrangement: Arrangement,
    content: Rect,
    spacing: f32,
    flexible_share: f32,
    grid: GridDims,
}

impl Distribution {
    /// Plan a pass over `siblings`, which must already exclude invisible ones.
    pub fn plan(
        arrangement: Arrangement,
        content: Rect,
        spacing: f32,
        siblings: &[Sizing],
    ) -> Self {
        let count = siblings.len();
        let flexible_share = match arrangement.main_axis() {
            Some(axis) => {
                let (fixed_total, flexible) =
                    siblings
                        .iter()
                        .fold((0.0_f32, 0_usize), |(total, flexible), sizing| {
                            match sizing.axis(axis).fixed() {
                                Some(fixed) => (total + fixed, flexible),
                                None => (total, flexible + 1),
                            }
                        });
                if flexible == 0 {
                    0.0
                } else {
                    let main = match axis {
                        Axis::Width => content.width,
                        Axis::Height => content.height,
                    };
                    let gaps = spacing * count.saturating_sub(1) as f32;
                    clamp_extent(main - fixed_total - gaps) / flexible as f32
                }
            }
            None => 0.0,
        };

        Self {
            arrangement,
            content,
            spacing,
            flexible_share,
            grid: GridDims::for_children(count),
        }
    }

    pub fn content(&self) -> Rect {
        self.content
    }

    pub fn grid(&self) -> GridDims {
        self.grid
    }

    /// Rectangle for the sibling at visible ordinal `index`.
    ///
    /// `previous` is the final rectangle of the preceding visible sibling.
    pub fn place(&self, index: usize, sizing: &Sizing, previous: Option<Rect>) -> Placement {
        let content = self.content;
        let (x, y, raw_width, raw_height) = match self.arrangement {
            Arrangement::Row => {
                let x = match previous {
                    Some(prev) => prev.right() + self.spacing,
                    None => content.x + sizing.spacing,
                };
                (
                    x,
                    content.y + sizing.spacing,
                    sizing.sanitize_unclamped(Axis::Width, self.flexible_share),
                    sizing.sanitize_unclamped(Axis::Height, content.height),
                )
            }
            Arrangement::Column => {
                let y = match previous {
                    Some(prev) => prev.bottom() + self.spacing,
                    None => content.y + sizing.spacing,
                };
                (
                    content.x + sizing.spacing,
                    y,
                    sizing.sanitize_unclamped(Axis::Width, content.width),
                    sizing.sanitize_unclamped(Axis::Height, self.flexible_share),
                )
            }
            Arrangement::Grid => {
                let GridDims { cols, rows } = self.grid;
                let (row, col) = self.grid.cell_of(index);
                let cell_width =
                    clamp_extent(content.width - self.spacing * (cols + 1) as f32) / cols as f32;
                let cell_height =
                    clamp_extent(content.height - self.spacing * (rows + 1) as f32) / rows as f32;
                let x = content.x + self.spacing * (col + 1) as f32 + col as f32 * cell_width;
                let y = content.y + self.spacing * (row + 1) as f32 + row as f32 * cell_height;
                (
                    x + sizing.spacing,
                    y + sizing.spacing,
                    sizing.sanitize_unclamped(Axis::Width, cell_width),
                    sizing.sanitize_unclamped(Axis::Height, cell_height),
                )
            }
        };

        Placement {
            rect: Rect::new(x, y, clamp_extent(raw_width), clamp_extent(raw_height)),
            clamped: raw_width < 0.0 || raw_height < 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place_all(distribution: &Distribution, siblings: &[Sizing]) -> Vec<Rect> {
        let mut placed: Vec<Rect> = Vec::new();
        for (idx, sizing) in siblings.iter().enumerate() {
            let rect = distribution.place(idx, sizing, placed.last().copied()).rect;
            placed.push(rect);
        }
        placed
    }

    #[test]
    fn row_splits_space_between_flexible_children() {
        let siblings = vec![Sizing::default(); 3];
        let plan = Distribution::plan(
            Arrangement::Row,
            Rect::new(0.0, 0.0, 300.0, 100.0),
            10.0,
            &siblings,
        );
        let rects = place_all(&plan, &siblings);
        let share = 280.0 / 3.0;
        for rect in &rects {
            assert!((rect.width - share).abs() < 1e-3);
            assert_eq!(rect.height, 100.0);
        }
        assert!((rects[1].x - (rects[0].x + share + 10.0)).abs() < 1e-3);
        assert!((rects[2].right() - 300.0).abs() < 1e-3);
    }

    #[test]
    fn column_gives_fixed_child_its_footprint() {
        let mut fixed = Sizing {
            spacing: 5.0,
            ..Sizing::default()
        };
        fixed.height.set_fixed(50.0);
        let flexible = Sizing {
            spacing: 5.0,
            ..Sizing::default()
        };
        let siblings = [fixed, flexible];
        let plan = Distribution::plan(
            Arrangement::Column,
            Rect::new(0.0, 0.0, 120.0, 200.0),
            5.0,
            &siblings,
        );
        let rects = place_all(&plan, &siblings);
        assert_eq!(rects[0].height, 45.0);
        assert_eq!(rects[1].height, 140.0);
        assert_eq!(rects[1].y, rects[0].y + rects[0].height + 5.0);
        assert_eq!(rects[0].width, 115.0);
    }

    #[test]
    fn all_fixed_row_has_no_flexible_share() {
        let mut a = Sizing::default();
        a.width.set_fixed(40.0);
        let mut b = Sizing::default();
        b.width.set_fixed(60.0);
        let siblings = [a, b];
        let plan = Distribution::plan(
            Arrangement::Row,
            Rect::new(0.0, 0.0, 500.0, 10.0),
            0.0,
            &siblings,
        );
        let rects = place_all(&plan, &siblings);
        assert_eq!(rects[0].width, 40.0);
        assert_eq!(rects[1].width, 60.0);
        assert_eq!(rects[1].x, 40.0);
    }

    #[test]
    fn oversized_spacing_clamps_instead_of_going_negative() {
        let sizing = Sizing {
            spacing: 30.0,
            ..Sizing::default()
        };
        let plan = Distribution::plan(
            Arrangement::Row,
            Rect::new(0.0, 0.0, 20.0, 20.0),
            0.0,
            &[sizing],
        );
        let placement = plan.place(0, &sizing, None);
        assert!(placement.clamped);
        assert_eq!(placement.rect.width, 0.0);
        assert_eq!(placement.rect.height, 0.0);
    }

    #[test]
    fn grid_places_cells_row_major() {
        let siblings = vec![Sizing::default(); 4];
        let plan = Distribution::plan(
            Arrangement::Grid,
            Rect::new(0.0, 0.0, 130.0, 70.0),
            10.0,
            &siblings,
        );
        let rects = place_all(&plan, &siblings);
        // usable 130 - 30 = 100 -> 50 per column; 70 - 30 = 40 -> 20 per row
        assert_eq!(rects[0], Rect::new(10.0, 10.0, 50.0, 20.0));
        assert_eq!(rects[1], Rect::new(70.0, 10.0, 50.0, 20.0));
        assert_eq!(rects[2], Rect::new(10.0, 40.0, 50.0, 20.0));
        assert_eq!(rects[3], Rect::new(70.0, 40.0, 50.0, 20.0));
    }

    #[test]
    fn grid_fixed_child_keeps_cell_origin() {
        let mut fixed = Sizing::default();
        fixed.width.set_fixed(15.0);
        let siblings = [Sizing::default(), fixed];
        let plan = Distribution::plan(
            Arrangement::Grid,
            Rect::new(0.0, 0.0, 100.0, 50.0),
            0.0,
            &siblings,
        );
        let rects = place_all(&plan, &siblings);
        assert_eq!(rects[1].x, 50.0);
        assert_eq!(rects[1].width, 15.0);
    }

    #[test]
    fn aggregate_min_row_and_column() {
        let sizes = [Size::new(10.0, 5.0), Size::new(20.0, 8.0)];
        assert_eq!(Arrangement::Row.aggregate_min(4.0, &sizes), Size::new(34.0, 8.0));
        assert_eq!(Arrangement::Column.aggregate_min(4.0, &sizes), Size::new(20.0, 17.0));
        assert_eq!(Arrangement::Grid.aggregate_min(4.0, &sizes), Size::new(52.0, 16.0));
        assert_eq!(Arrangement::Row.aggregate_min(4.0, &[]), Size::ZERO);
    }
}
