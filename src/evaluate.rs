use crate::layout::Circle;
use crate::sensor::TrackedPoint;

/// Result of one containment pass over the active layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Occupancy {
    /// Gameplay circles whose occupancy equals their required count.
    pub satisfied: usize,
    /// Total gameplay circles in the layout.
    pub total: usize,
}

impl Occupancy {
    pub fn all_satisfied(&self) -> bool {
        self.total > 0 && self.satisfied == self.total
    }
}

/// One pass per tick: resets every circle's occupancy, counts each present
/// point into every circle containing it, and reports how many gameplay
/// circles hit their target exactly. Occupancy never carries over between
/// ticks.
pub fn evaluate(circles: &mut [Circle], points: &[TrackedPoint]) -> Occupancy {
    for circle in circles.iter_mut() {
        circle.current = 0;
    }
    for point in points {
        if let Some(pos) = point.position() {
            for circle in circles.iter_mut() {
                if circle.contains(pos) {
                    circle.current += 1;
                }
            }
        }
    }
    let mut occupancy = Occupancy::default();
    for circle in circles.iter() {
        if let Some(required) = circle.required() {
            occupancy.total += 1;
            if circle.current == required {
                occupancy.satisfied += 1;
            }
        }
    }
    occupancy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{CircleRole, Point, Rgb};

    fn gameplay(x: f64, y: f64, radius: f64, required: u32) -> Circle {
        Circle::new(
            Point::new(x, y),
            radius,
            Rgb(255, 255, 255),
            CircleRole::Gameplay { required },
        )
    }

    fn at(x: f64, y: f64) -> TrackedPoint {
        TrackedPoint::At(Point::new(x, y))
    }

    #[test]
    fn three_points_in_one_circle_satisfy_a_required_three() {
        let mut circles = vec![gameplay(500.0, 500.0, 200.0, 3)];
        let points = [at(450.0, 500.0), at(550.0, 500.0), at(500.0, 560.0)];
        let occ = evaluate(&mut circles, &points);
        assert_eq!(circles[0].current, 3);
        assert_eq!(occ, Occupancy { satisfied: 1, total: 1 });
        assert!(occ.all_satisfied());
    }

    #[test]
    fn overshooting_the_target_does_not_satisfy() {
        let mut circles = vec![gameplay(500.0, 500.0, 200.0, 1)];
        let points = [at(450.0, 500.0), at(550.0, 500.0)];
        let occ = evaluate(&mut circles, &points);
        assert_eq!(circles[0].current, 2);
        assert!(!occ.all_satisfied());
    }

    #[test]
    fn absent_points_are_ignored() {
        let mut circles = vec![gameplay(500.0, 500.0, 200.0, 1)];
        let points = [TrackedPoint::Absent, at(500.0, 500.0)];
        let occ = evaluate(&mut circles, &points);
        assert_eq!(circles[0].current, 1);
        assert!(occ.all_satisfied());
    }

    #[test]
    fn a_point_on_the_rim_counts_as_inside() {
        let mut circles = vec![gameplay(100.0, 100.0, 50.0, 1)];
        let occ = evaluate(&mut circles, &[at(150.0, 100.0)]);
        assert!(occ.all_satisfied());
    }

    #[test]
    fn occupancy_never_accumulates_across_passes() {
        let mut circles = vec![gameplay(500.0, 500.0, 200.0, 2)];
        let points = [at(500.0, 500.0)];
        evaluate(&mut circles, &points);
        evaluate(&mut circles, &points);
        assert_eq!(circles[0].current, 1);
    }

    #[test]
    fn an_empty_layout_is_never_satisfied() {
        let mut circles: Vec<Circle> = Vec::new();
        let occ = evaluate(&mut circles, &[at(0.0, 0.0)]);
        assert!(!occ.all_satisfied());
        assert_eq!(occ, Occupancy::default());
    }

    #[test]
    fn non_gameplay_circles_count_occupancy_but_not_satisfaction() {
        let mut circles = vec![Circle::new(
            Point::new(100.0, 100.0),
            50.0,
            Rgb(0, 0, 0),
            CircleRole::MenuHub,
        )];
        let occ = evaluate(&mut circles, &[at(100.0, 100.0)]);
        assert_eq!(circles[0].current, 1);
        assert_eq!(occ.total, 0);
        assert!(!occ.all_satisfied());
    }

    #[test]
    fn identical_frames_and_layout_give_identical_results() {
        let frame = [at(480.0, 520.0), at(900.0, 300.0), TrackedPoint::Absent];
        let make = || vec![gameplay(500.0, 500.0, 150.0, 1), gameplay(900.0, 300.0, 100.0, 1)];
        let mut a = make();
        let mut b = make();
        assert_eq!(evaluate(&mut a, &frame), evaluate(&mut b, &frame));
        assert_eq!(a, b);
    }
}
