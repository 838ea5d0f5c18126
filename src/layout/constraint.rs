use std::fmt;

use serde::Serialize;

use crate::geometry::clamp_extent;

/// Axis a constraint or extent applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Width,
    Height,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Width => f.write_str("width"),
            Axis::Height => f.write_str("height"),
        }
    }
}

/// Which bound of an axis rejected a new value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum BoundConflict {
    /// The requested minimum exceeds this maximum.
    Maximum(f32),
    /// The requested maximum is below this minimum.
    Minimum(f32),
}

impl BoundConflict {
    pub(crate) fn existing(self) -> f32 {
        match self {
            BoundConflict::Maximum(v) | BoundConflict::Minimum(v) => v,
        }
    }
}

/// Sizing constraints for one axis of a node's outer footprint.
///
/// `fixed` is mutually exclusive with `min`/`max`: the last setter wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AxisConstraint {
    fixed: Option<f32>,
    min: Option<f32>,
    max: Option<f32>,
}

impl AxisConstraint {
    pub fn fixed(&self) -> Option<f32> {
        self.fixed.filter(|v| *v > 0.0)
    }

    pub fn min(&self) -> Option<f32> {
        self.min.filter(|v| *v > 0.0)
    }

    pub fn max(&self) -> Option<f32> {
        self.max.filter(|v| *v > 0.0)
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed().is_some()
    }

    pub(crate) fn set_fixed(&mut self, value: f32) {
        self.fixed = Some(value);
        self.min = None;
        self.max = None;
    }

    pub(crate) fn clear_fixed(&mut self) {
        self.fixed = None;
    }

    pub(crate) fn set_min(&mut self, value: f32) -> Result<(), BoundConflict> {
        if let Some(max) = self.max() {
            if value > max {
                return Err(BoundConflict::Maximum(max));
            }
        }
        self.min = Some(value);
        self.fixed = None;
        Ok(())
    }

    pub(crate) fn set_max(&mut self, value: f32) -> Result<(), BoundConflict> {
        if let Some(min) = self.min() {
            if value < min {
                return Err(BoundConflict::Minimum(min));
            }
        }
        self.max = Some(value);
        self.fixed = None;
        Ok(())
    }

    /// Resolve a proposed extent against these bounds, net of `spacing`.
    ///
    /// Precedence is fixed > max > min > proposed. The result may be negative;
    /// callers clamp it.
    pub fn resolve_unclamped(&self, proposed: f32, spacing: f32) -> f32 {
        if let Some(fixed) = self.fixed() {
            return fixed - spacing;
        }
        if let Some(max) = self.max() {
            if proposed > max {
                return max - spacing;
            }
        }
        if let Some(min) = self.min() {
            if proposed < min {
                return min - spacing;
            }
        }
        proposed - spacing
    }

    pub fn resolve(&self, proposed: f32, spacing: f32) -> f32 {
        clamp_extent(self.resolve_unclamped(proposed, spacing))
    }

    /// Smallest outer footprint these bounds admit on their own.
    pub fn floor(&self) -> f32 {
        self.fixed().or(self.min()).unwrap_or(0.0)
    }
}

/// Both axes of constraints plus the node's own spacing allowance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Sizing {
    pub width: AxisConstraint,
    pub height: AxisConstraint,
    pub spacing: f32,
}

impl Sizing {
    /// Sizing for an opaque widget: only a content floor, no spacing.
    pub fn with_floor(min_width: f32, min_height: f32) -> Self {
        let mut sizing = Sizing::default();
        if min_width > 0.0 {
            sizing.width.min = Some(min_width);
        }
        if min_height > 0.0 {
            sizing.height.min = Some(min_height);
        }
        sizing
    }

    pub fn axis(&self, axis: Axis) -> &AxisConstraint {
        match axis {
            Axis::Width => &self.width,
            Axis::Height => &self.height,
        }
    }

    /// The constraint resolver: sanitized extent for `axis`, clamped to zero.
    pub fn sanitize(&self, axis: Axis, proposed: f32) -> f32 {
        self.axis(axis).resolve(proposed, self.spacing)
    }

    pub fn sanitize_unclamped(&self, axis: Axis, proposed: f32) -> f32 {
        self.axis(axis).resolve_unclamped(proposed, self.spacing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spaced(spacing: f32) -> Sizing {
        Sizing {
            spacing,
            ..Sizing::default()
        }
    }

    #[test]
    fn fixed_beats_everything() {
        let mut sizing = spaced(4.0);
        sizing.width.set_fixed(60.0);
        assert_eq!(sizing.sanitize(Axis::Width, 10.0), 56.0);
        assert_eq!(sizing.sanitize(Axis::Width, 1000.0), 56.0);
    }

    #[test]
    fn max_applies_before_min() {
        let mut sizing = spaced(2.0);
        sizing.width.set_min(20.0).unwrap();
        sizing.width.set_max(50.0).unwrap();
        assert_eq!(sizing.sanitize(Axis::Width, 80.0), 48.0);
        assert_eq!(sizing.sanitize(Axis::Width, 5.0), 18.0);
        assert_eq!(sizing.sanitize(Axis::Width, 30.0), 28.0);
    }

    #[test]
    fn spacing_is_subtracted_once_and_clamped() {
        let sizing = spaced(10.0);
        assert_eq!(sizing.sanitize(Axis::Height, 25.0), 15.0);
        assert_eq!(sizing.sanitize(Axis::Height, 4.0), 0.0);
        assert_eq!(sizing.sanitize_unclamped(Axis::Height, 4.0), -6.0);
    }

    #[test]
    fn fixed_clears_bounds_and_bounds_clear_fixed() {
        let mut axis = AxisConstraint::default();
        axis.set_min(10.0).unwrap();
        axis.set_max(40.0).unwrap();
        axis.set_fixed(25.0);
        assert_eq!(axis.min(), None);
        assert_eq!(axis.max(), None);
        assert_eq!(axis.fixed(), Some(25.0));

        axis.set_max(30.0).unwrap();
        assert_eq!(axis.fixed(), None);
        assert_eq!(axis.max(), Some(30.0));
    }

    #[test]
    fn conflicting_bounds_leave_state_untouched() {
        let mut axis = AxisConstraint::default();
        axis.set_max(50.0).unwrap();
        assert_eq!(axis.set_min(100.0), Err(BoundConflict::Maximum(50.0)));
        assert_eq!(axis.min(), None);

        axis.set_min(20.0).unwrap();
        assert_eq!(axis.set_max(10.0), Err(BoundConflict::Minimum(20.0)));
        assert_eq!(axis.max(), Some(50.0));
    }

    #[test]
    fn zero_fixed_is_treated_as_unset() {
        let mut sizing = Sizing::default();
        sizing.height.set_fixed(0.0);
        assert!(!sizing.height.is_fixed());
        assert_eq!(sizing.sanitize(Axis::Height, 42.0), 42.0);
    }

    #[test]
    fn widget_floor_acts_as_minimum() {
        let sizing = Sizing::with_floor(30.0, 0.0);
        assert_eq!(sizing.sanitize(Axis::Width, 12.0), 30.0);
        assert_eq!(sizing.sanitize(Axis::Height, 12.0), 12.0);
    }
}
