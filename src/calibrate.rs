use serde::{Deserialize, Serialize};

/// Operator-tunable mapping from raw sensor coordinates to display
/// coordinates. `Copy` on purpose: the tick loop takes one snapshot per
/// frame so live tuning never changes parameters mid-computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub scale_x: f64,
    pub scale_y: f64,
    /// Rotation about the display origin, in degrees.
    pub degrees: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        // Stretch factors for a 640x480 depth image projected onto a
        // 1920x1080 wall, measured on the original installation.
        Self {
            scale_x: 4.2,
            scale_y: 3.1,
            degrees: 0.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }
}

impl Calibration {
    /// Forward map: per-axis scale, then translation, then rotation.
    /// Pure and side-effect free; results outside the display bounds are
    /// left to callers, which treat them as non-hits.
    pub fn apply(&self, raw_x: f64, raw_y: f64) -> (f64, f64) {
        let x = raw_x * self.scale_x + self.translate_x;
        let y = raw_y * self.scale_y + self.translate_y;
        let theta = self.degrees.to_radians();
        let (sin, cos) = theta.sin_cos();
        (x * cos - y * sin, x * sin + y * cos)
    }

    /// The inverse map is never needed at runtime, but the parameters must
    /// keep it possible: a zero scale collapses an axis.
    pub fn is_invertible(&self) -> bool {
        self.scale_x != 0.0 && self.scale_y != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY: Calibration = Calibration {
        scale_x: 1.0,
        scale_y: 1.0,
        degrees: 0.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    #[test]
    fn identity_passes_points_through() {
        assert_eq!(IDENTITY.apply(320.0, 240.0), (320.0, 240.0));
        assert_eq!(IDENTITY.apply(0.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn apply_is_idempotent_for_fixed_parameters() {
        let cal = Calibration {
            scale_x: 4.2,
            scale_y: 3.1,
            degrees: 12.5,
            translate_x: -40.0,
            translate_y: 8.0,
        };
        assert_eq!(cal.apply(123.0, 456.0), cal.apply(123.0, 456.0));
    }

    #[test]
    fn rotation_by_90_degrees_maps_x_axis_onto_y_axis() {
        let cal = Calibration {
            degrees: 90.0,
            ..IDENTITY
        };
        let (x, y) = cal.apply(1.0, 0.0);
        assert!(x.abs() < 1e-12);
        assert!((y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pipeline_order_is_scale_then_translate_then_rotate() {
        let cal = Calibration {
            scale_x: 2.0,
            translate_x: 1.0,
            degrees: 90.0,
            ..IDENTITY
        };
        // (1, 0) -> scale (2, 0) -> translate (3, 0) -> rotate (0, 3)
        let (x, y) = cal.apply(1.0, 0.0);
        assert!(x.abs() < 1e-12);
        assert!((y - 3.0).abs() < 1e-12);
    }

    #[test]
    fn zero_scale_is_not_invertible() {
        let cal = Calibration {
            scale_x: 0.0,
            ..IDENTITY
        };
        assert!(!cal.is_invertible());
        assert!(Calibration::default().is_invertible());
    }
}
