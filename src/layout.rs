use rand::Rng;

/// Gap kept between any circle and the display edge, and between the rims of
/// any two circles in a round layout.
pub const PLACEMENT_MARGIN: f64 = 20.0;

// Radius band per required group size: base + 100 per person, with a 50-unit
// spread so same-sized groups still vary a little.
const RADIUS_BASE: f64 = 150.0;
const RADIUS_SPREAD: f64 = 50.0;
const RADIUS_PER_PERSON: f64 = 100.0;

// Rejection-sampling bounds. After `MAX_ATTEMPTS` failed placements the
// radius band is halved, up to `MAX_SHRINKS` times, before giving up on the
// sampled group and falling back to a single-person circle.
const MAX_ATTEMPTS: u32 = 64;
const MAX_SHRINKS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// What a circle means to the game, instead of sign-overloading the
/// expected-occupancy number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircleRole {
    /// Round target: exactly `required` people must stand inside.
    Gameplay { required: u32 },
    /// Main-menu "start" hub; dwelling inside it begins a session.
    MenuHub,
    /// Main-menu player-count selector.
    MenuSelector { players: u32 },
    /// End-screen "play again" hub.
    ReplayHub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
    pub color: Rgb,
    pub role: CircleRole,
    /// Occupancy this tick; reset at the start of every evaluation pass.
    pub current: u32,
}

impl Circle {
    pub fn new(center: Point, radius: f64, color: Rgb, role: CircleRole) -> Self {
        Self {
            center,
            radius,
            color,
            role,
            current: 0,
        }
    }

    /// Boundary-inclusive membership: a point exactly on the rim counts.
    pub fn contains(&self, p: Point) -> bool {
        self.center.distance_to(p) <= self.radius
    }

    pub fn required(&self) -> Option<u32> {
        match self.role {
            CircleRole::Gameplay { required } => Some(required),
            _ => None,
        }
    }

    pub fn label(&self) -> String {
        match self.role {
            CircleRole::Gameplay { required } => required.to_string(),
            CircleRole::MenuHub => "START".to_string(),
            CircleRole::MenuSelector { players } => players.to_string(),
            CircleRole::ReplayHub => "AGAIN".to_string(),
        }
    }
}

fn random_color(rng: &mut impl Rng) -> Rgb {
    // Bright band only; circles sit on a black field.
    Rgb(
        rng.gen_range(100..=255),
        rng.gen_range(100..=255),
        rng.gen_range(100..=255),
    )
}

fn separated(center: Point, radius: f64, placed: &[Circle]) -> bool {
    placed
        .iter()
        .all(|c| center.distance_to(c.center) >= radius + c.radius + PLACEMENT_MARGIN)
}

fn radius_band(group: u32) -> (f64, f64) {
    let lo = RADIUS_BASE + RADIUS_PER_PERSON * group as f64;
    (lo, lo + RADIUS_SPREAD)
}

fn try_place(
    rng: &mut impl Rng,
    group: u32,
    width: f64,
    height: f64,
    placed: &[Circle],
) -> Option<Circle> {
    let (band_lo, band_hi) = radius_band(group);
    for shrink in 0..=MAX_SHRINKS {
        let factor = 0.5_f64.powi(shrink);
        let (lo, hi) = (band_lo * factor, band_hi * factor);
        for _ in 0..MAX_ATTEMPTS {
            let radius = rng.gen_range(lo..=hi);
            let inset = radius + PLACEMENT_MARGIN;
            if width <= 2.0 * inset || height <= 2.0 * inset {
                break; // circle cannot fit at this band, shrink
            }
            let center = Point::new(
                rng.gen_range(inset..=width - inset),
                rng.gen_range(inset..=height - inset),
            );
            if separated(center, radius, placed) {
                return Some(Circle::new(
                    center,
                    radius,
                    random_color(rng),
                    CircleRole::Gameplay { required: group },
                ));
            }
        }
    }
    None
}

/// Saturated-display escape hatch: a single-person circle at the grid point
/// with the most clearance from everything already placed, radius clamped to
/// whatever room is left. May violate the separation margin; that is the
/// price of guaranteed termination.
fn place_fallback(rng: &mut impl Rng, width: f64, height: f64, placed: &[Circle]) -> Circle {
    const GRID: i32 = 16;
    let mut best = Point::new(width / 2.0, height / 2.0);
    let mut best_clearance = f64::MIN;
    for gy in 1..GRID {
        for gx in 1..GRID {
            let p = Point::new(
                width * gx as f64 / GRID as f64,
                height * gy as f64 / GRID as f64,
            );
            let edge = p.x.min(width - p.x).min(p.y).min(height - p.y);
            let clearance = placed
                .iter()
                .map(|c| p.distance_to(c.center) - c.radius)
                .fold(edge, f64::min);
            if clearance > best_clearance {
                best_clearance = clearance;
                best = p;
            }
        }
    }
    let radius = (best_clearance - PLACEMENT_MARGIN).clamp(10.0, radius_band(1).0);
    tracing::warn!(
        x = best.x,
        y = best.y,
        radius,
        "layout saturated, placing fallback circle"
    );
    Circle::new(
        best,
        radius,
        random_color(rng),
        CircleRole::Gameplay { required: 1 },
    )
}

/// Partitions `total_people` into non-overlapping circles: repeatedly peels a
/// uniform group size off the remainder and rejection-samples a position for
/// it. Required counts always sum to `total_people`.
pub fn generate_round_layout(
    rng: &mut impl Rng,
    total_people: u32,
    width: f64,
    height: f64,
) -> Vec<Circle> {
    let mut circles = Vec::new();
    let mut remaining = total_people;
    while remaining > 0 {
        let group = rng.gen_range(1..=remaining);
        match try_place(rng, group, width, height, &circles) {
            Some(circle) => {
                remaining -= group;
                circles.push(circle);
            }
            None => {
                remaining -= 1;
                circles.push(place_fallback(rng, width, height, &circles));
            }
        }
    }
    circles
}

/// Fixed main-menu arrangement: a start hub up top and one selector circle
/// per offered player count along the lower half. Never randomized.
pub fn main_menu_layout(width: f64, height: f64, selector_counts: &[u32]) -> Vec<Circle> {
    let mut circles = vec![Circle::new(
        Point::new(width / 2.0, height * 0.3),
        height * 0.22,
        Rgb(0, 200, 120),
        CircleRole::MenuHub,
    )];
    let n = selector_counts.len();
    for (i, &players) in selector_counts.iter().enumerate() {
        let x = width * (i + 1) as f64 / (n + 1) as f64;
        circles.push(Circle::new(
            Point::new(x, height * 0.78),
            height * 0.11,
            Rgb(120, 160, 255),
            CircleRole::MenuSelector { players },
        ));
    }
    circles
}

/// Fixed end-screen arrangement: one replay hub below the score readout.
pub fn end_screen_layout(width: f64, height: f64) -> Vec<Circle> {
    vec![Circle::new(
        Point::new(width / 2.0, height * 0.72),
        height * 0.18,
        Rgb(0, 200, 120),
        CircleRole::ReplayHub,
    )]
}
