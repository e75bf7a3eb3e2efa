//! Distance-based damage curves.
//!
//! A curve is two piecewise-linear bands (min and max damage) over a distance
//! domain. Evaluation lerps each band at the travelled distance and mixes
//! them by a random sample, so falloff-by-range is pure configuration.

/// One configured point on the curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveKey {
    pub distance: f32,
    pub min: f32,
    pub max: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DamageCurve {
    /// Sorted by distance; never empty.
    keys: Vec<CurveKey>,
}

impl DamageCurve {
    /// Curve from `(distance, min, max)` triples. Panics on an empty slice:
    /// a weapon without a damage curve is a configuration error.
    pub fn new(points: &[(f32, f32, f32)]) -> Self {
        assert!(!points.is_empty(), "damage curve needs at least one key");

        let mut keys: Vec<CurveKey> = points
            .iter()
            .map(|&(distance, min, max)| CurveKey {
                distance,
                min: min.min(max),
                max: max.max(min),
            })
            .collect();
        keys.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        Self { keys }
    }

    /// Flat curve: every distance and every sample yields `value`.
    pub fn constant(value: f32) -> Self {
        Self::new(&[(0.0, value, value)])
    }

    /// Evaluate at `distance`, mixing the min/max bands by `t01`.
    ///
    /// Outside the configured domain the end keys extend flat, matching how
    /// the original curves were authored.
    pub fn evaluate(&self, distance: f32, t01: f32) -> f32 {
        let t01 = t01.clamp(0.0, 1.0);
        let (min, max) = self.bands_at(distance);
        min + (max - min) * t01
    }

    fn bands_at(&self, distance: f32) -> (f32, f32) {
        let first = self.keys.first().expect("curve is never empty");
        if distance <= first.distance {
            return (first.min, first.max);
        }

        let last = self.keys.last().expect("curve is never empty");
        if distance >= last.distance {
            return (last.min, last.max);
        }

        // Find the bracketing pair and lerp both bands.
        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if distance <= b.distance {
                let span = (b.distance - a.distance).max(f32::EPSILON);
                let f = (distance - a.distance) / span;
                return (a.min + (b.min - a.min) * f, a.max + (b.max - a.max) * f);
            }
        }

        (last.min, last.max)
    }
}
