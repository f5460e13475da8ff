//! Camera arcs between saved locations

use crate::foundation::math::{Transform, Vec3};
use serde::{Deserialize, Serialize};

/// Shape of the arc inserted between two camera positions
///
/// Two variants of these constants have been used historically; both are
/// available as presets and any other values may be configured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcProfile {
    /// Fraction of the way from start to end for the first arc point
    pub first_fraction: f32,
    /// Fraction of the way from start to end for the second arc point
    pub second_fraction: f32,
    /// Arc points are lifted by `distance / lift_divisor`
    pub lift_divisor: f32,
}

impl ArcProfile {
    /// Quarter points, lifted by half the distance
    pub const QUARTERS: Self = Self {
        first_fraction: 0.25,
        second_fraction: 0.75,
        lift_divisor: 2.0,
    };

    /// Third points, lifted by a tenth of the distance
    pub const THIRDS: Self = Self {
        first_fraction: 0.33,
        second_fraction: 0.67,
        lift_divisor: 10.0,
    };

    /// Check that the profile describes a usable arc
    pub fn validate(&self) -> Result<(), String> {
        let in_range = |f: f32| (0.0..=1.0).contains(&f);
        if !in_range(self.first_fraction) || !in_range(self.second_fraction) {
            return Err("arc fractions must lie in [0, 1]".to_string());
        }
        if self.first_fraction > self.second_fraction {
            return Err("first arc fraction must not exceed the second".to_string());
        }
        if !(self.lift_divisor > 0.0 && self.lift_divisor.is_finite()) {
            return Err("arc lift divisor must be positive".to_string());
        }
        Ok(())
    }
}

impl Default for ArcProfile {
    fn default() -> Self {
        Self::QUARTERS
    }
}

/// Builds the two intermediate transforms of a camera arc
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PathInterpolator {
    profile: ArcProfile,
}

impl PathInterpolator {
    /// Create an interpolator for a profile
    pub fn new(profile: ArcProfile) -> Self {
        Self { profile }
    }

    /// The profile in use
    pub fn profile(&self) -> ArcProfile {
        self.profile
    }

    /// Two arc points between `start` and `end`
    ///
    /// The lift direction is the normal of the plane through both positions
    /// and a point one unit above the start. When that plane is degenerate
    /// (vertical moves, coincident points) the points stay on the line. The
    /// first point keeps the start rotation and the second the end rotation.
    pub fn interpolate(&self, start: &Transform, end: &Transform) -> [Transform; 2] {
        let p1 = start.position;
        let p2 = end.position;
        let p3 = p1 + Vec3::z();

        let distance = (p2 - p1).magnitude();
        let lift = (p3 - p2)
            .cross(&(p1 - p2))
            .try_normalize(f32::EPSILON)
            .map_or_else(Vec3::zeros, |normal| normal * (distance / self.profile.lift_divisor));

        let along = |fraction: f32| p1 + (p2 - p1) * fraction + lift;

        [
            start.with_position(along(self.profile.first_fraction)),
            end.with_position(along(self.profile.second_fraction)),
        ]
    }

    /// Full path from `start` to `end`: `[start, a, b, end]`
    pub fn arc_path(&self, start: &Transform, end: &Transform) -> Vec<Transform> {
        let [a, b] = self.interpolate(start, end);
        vec![*start, a, b, *end]
    }
}
