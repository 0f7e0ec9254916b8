use crate::calibrate::Calibration;
use crate::layout::Point;

/// One contiguous region reported by the depth pipeline for one tick, in raw
/// sensor coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blob {
    pub area: f64,
    pub cx: f64,
    pub cy: f64,
}

impl Blob {
    pub fn new(area: f64, cx: f64, cy: f64) -> Self {
        Self { area, cx, cy }
    }
}

/// Calibrated display-space position of a blob, or `Absent` when the region
/// was rejected. The slot is kept so callers can zip against stable indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackedPoint {
    At(Point),
    Absent,
}

impl TrackedPoint {
    pub fn position(self) -> Option<Point> {
        match self {
            TrackedPoint::At(p) => Some(p),
            TrackedPoint::Absent => None,
        }
    }
}

/// Upstream sensor boundary. `poll` returns `None` when no new frame is
/// ready this tick; the feed then reuses the previous result instead of
/// blocking.
pub trait SensorSource {
    fn poll(&mut self) -> Option<Vec<Blob>>;
}

/// Stand-in for a sensor that failed to open: every tick is a fresh, empty
/// frame, so the game keeps running with nobody detected.
#[derive(Debug, Default)]
pub struct NullSensor;

impl SensorSource for NullSensor {
    fn poll(&mut self) -> Option<Vec<Blob>> {
        Some(Vec::new())
    }
}

/// Operator-driven stand-in for the depth pipeline: a handful of "bodies" in
/// raw sensor space, each reported as a fixed-area blob. Lets the
/// installation be rehearsed at a keyboard.
#[derive(Debug)]
pub struct SimulatedSensor {
    bodies: Vec<(f64, f64)>,
    active: usize,
    area: f64,
}

impl SimulatedSensor {
    /// Sensor-space bounds of the simulated field (matches a 640x480 depth
    /// image).
    pub const WIDTH: f64 = 640.0;
    pub const HEIGHT: f64 = 480.0;

    pub fn new(area: f64) -> Self {
        Self {
            bodies: vec![(Self::WIDTH / 2.0, Self::HEIGHT / 2.0)],
            active: 0,
            area,
        }
    }

    pub fn add_body(&mut self) {
        self.bodies.push((Self::WIDTH / 2.0, Self::HEIGHT / 2.0));
        self.active = self.bodies.len() - 1;
    }

    pub fn remove_body(&mut self) {
        if self.bodies.len() > 1 {
            self.bodies.remove(self.active);
            self.active = self.active.min(self.bodies.len() - 1);
        }
    }

    pub fn select_next(&mut self) {
        if !self.bodies.is_empty() {
            self.active = (self.active + 1) % self.bodies.len();
        }
    }

    pub fn nudge_active(&mut self, dx: f64, dy: f64) {
        if let Some(body) = self.bodies.get_mut(self.active) {
            body.0 = (body.0 + dx).clamp(0.0, Self::WIDTH);
            body.1 = (body.1 + dy).clamp(0.0, Self::HEIGHT);
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

impl SensorSource for SimulatedSensor {
    fn poll(&mut self) -> Option<Vec<Blob>> {
        Some(
            self.bodies
                .iter()
                .map(|&(x, y)| Blob::new(self.area, x, y))
                .collect(),
        )
    }
}

/// Scripted source for tests: plays back a fixed sequence of frames, then
/// reports no new data.
#[derive(Debug, Default)]
pub struct ScriptedSensor {
    frames: std::collections::VecDeque<Option<Vec<Blob>>>,
}

impl ScriptedSensor {
    pub fn new(frames: Vec<Option<Vec<Blob>>>) -> Self {
        Self {
            frames: frames.into(),
        }
    }
}

impl SensorSource for ScriptedSensor {
    fn poll(&mut self) -> Option<Vec<Blob>> {
        self.frames.pop_front().flatten()
    }
}

/// Converts raw regions into display-space tracked points: keeps a region
/// only when its area lies within the configured band, otherwise emits
/// `Absent` for that slot. Caches the last frame so a tick without new
/// sensor data is stale-but-valid rather than empty.
#[derive(Debug)]
pub struct BlobFeed {
    pub min_blob_size: f64,
    pub max_blob_size: f64,
    last: Vec<TrackedPoint>,
}

impl BlobFeed {
    pub fn new(min_blob_size: f64, max_blob_size: f64) -> Self {
        Self {
            min_blob_size,
            max_blob_size,
            last: Vec::new(),
        }
    }

    /// One call per tick. `calibration` is the tick's snapshot; it is applied
    /// to every kept centroid in this frame.
    pub fn poll_frame(
        &mut self,
        source: &mut dyn SensorSource,
        calibration: Calibration,
    ) -> &[TrackedPoint] {
        if let Some(blobs) = source.poll() {
            self.last = blobs
                .iter()
                .map(|blob| {
                    if blob.area >= self.min_blob_size && blob.area <= self.max_blob_size {
                        let (x, y) = calibration.apply(blob.cx, blob.cy);
                        TrackedPoint::At(Point::new(x, y))
                    } else {
                        TrackedPoint::Absent
                    }
                })
                .collect();
        }
        &self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn identity() -> Calibration {
        Calibration {
            scale_x: 1.0,
            scale_y: 1.0,
            degrees: 0.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }

    #[test]
    fn out_of_band_regions_keep_their_slot_as_absent() {
        let mut source = ScriptedSensor::new(vec![Some(vec![
            Blob::new(799.0, 10.0, 10.0),   // below band
            Blob::new(1000.0, 20.0, 30.0),  // kept
            Blob::new(20001.0, 40.0, 40.0), // above band
        ])]);
        let mut feed = BlobFeed::new(800.0, 20000.0);
        let points = feed.poll_frame(&mut source, identity());
        assert_eq!(points.len(), 3);
        assert_matches!(points[0], TrackedPoint::Absent);
        assert_eq!(points[1], TrackedPoint::At(Point::new(20.0, 30.0)));
        assert_matches!(points[2], TrackedPoint::Absent);
    }

    #[test]
    fn band_bounds_are_inclusive() {
        let mut source = ScriptedSensor::new(vec![Some(vec![
            Blob::new(800.0, 1.0, 1.0),
            Blob::new(20000.0, 2.0, 2.0),
        ])]);
        let mut feed = BlobFeed::new(800.0, 20000.0);
        let points = feed.poll_frame(&mut source, identity());
        assert!(points.iter().all(|p| p.position().is_some()));
    }

    #[test]
    fn missing_frame_reuses_previous_result() {
        let mut source = ScriptedSensor::new(vec![
            Some(vec![Blob::new(1000.0, 5.0, 6.0)]),
            None,
            None,
        ]);
        let mut feed = BlobFeed::new(800.0, 20000.0);
        let cal = identity();
        let first = feed.poll_frame(&mut source, cal).to_vec();
        assert_eq!(feed.poll_frame(&mut source, cal), first.as_slice());
        assert_eq!(feed.poll_frame(&mut source, cal), first.as_slice());
    }

    #[test]
    fn centroids_go_through_the_calibration_snapshot() {
        let cal = Calibration {
            scale_x: 2.0,
            scale_y: 3.0,
            degrees: 0.0,
            translate_x: 10.0,
            translate_y: -5.0,
        };
        let mut source = ScriptedSensor::new(vec![Some(vec![Blob::new(1000.0, 4.0, 2.0)])]);
        let mut feed = BlobFeed::new(800.0, 20000.0);
        let points = feed.poll_frame(&mut source, cal);
        assert_eq!(points[0], TrackedPoint::At(Point::new(18.0, 1.0)));
    }

    #[test]
    fn null_sensor_yields_empty_frames_forever() {
        let mut source = NullSensor;
        let mut feed = BlobFeed::new(800.0, 20000.0);
        assert!(feed.poll_frame(&mut source, identity()).is_empty());
        assert!(feed.poll_frame(&mut source, identity()).is_empty());
    }

    #[test]
    fn simulated_sensor_tracks_body_edits() {
        let mut sim = SimulatedSensor::new(1000.0);
        sim.nudge_active(10.0, -5.0);
        sim.add_body();
        assert_eq!(sim.body_count(), 2);
        let blobs = sim.poll().unwrap();
        assert_eq!(blobs.len(), 2);
        assert_eq!(blobs[0].cx, SimulatedSensor::WIDTH / 2.0 + 10.0);
        sim.remove_body();
        assert_eq!(sim.body_count(), 1);
        sim.remove_body(); // last body is never removed
        assert_eq!(sim.body_count(), 1);
    }
}
