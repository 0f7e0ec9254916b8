mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use kreis::app_dirs::AppDirs;
use kreis::audio::{AudioSink, Cue, LogAudio};
use kreis::calibrate::Calibration;
use kreis::config::{Config, ConfigStore, FileConfigStore};
use kreis::runtime::{CrosstermInputSource, InputEvent, Runner};
use kreis::scores::ScoreDb;
use kreis::sensor::{BlobFeed, NullSensor, SensorSource, SimulatedSensor, TrackedPoint};
use kreis::session::Session;
use kreis::{TICK_RATE_MS, TICK_SECS};

/// sensor-driven party game: fill the circles with the right number of people
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "An installation game for a depth sensor pointed at a floor: players are tracked as blobs and must arrange themselves so every circle holds exactly the number it asks for before the round timer runs out."
)]
pub struct Cli {
    /// player count preselected before anyone touches the menu
    #[clap(short = 'p', long)]
    players: Option<u32>,

    /// rounds per session
    #[clap(short = 'r', long)]
    rounds: Option<u32>,

    /// seconds per round
    #[clap(short = 's', long)]
    round_secs: Option<f64>,

    /// settings file to use instead of the default location
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// sensor backend feeding the blob stream
    #[clap(long, value_enum, default_value_t = SensorBackend::Simulated)]
    sensor: SensorBackend,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
pub enum SensorBackend {
    /// Keyboard-driven bodies, for rehearsing without hardware.
    Simulated,
    /// No sensor attached; the feed stays empty.
    None,
}

/// The concrete sensor wired in at startup. Real depth hardware lives behind
/// an external process; the game only ever sees `SensorSource`.
pub enum Sensor {
    Simulated(SimulatedSensor),
    Disconnected(NullSensor),
}

impl Sensor {
    fn as_source(&mut self) -> &mut dyn SensorSource {
        match self {
            Sensor::Simulated(sim) => sim,
            Sensor::Disconnected(null) => null,
        }
    }

    fn simulated_mut(&mut self) -> Option<&mut SimulatedSensor> {
        match self {
            Sensor::Simulated(sim) => Some(sim),
            Sensor::Disconnected(_) => None,
        }
    }
}

pub struct App {
    pub session: Session,
    pub feed: BlobFeed,
    pub sensor: Sensor,
    /// Last frame's calibrated points, kept for rendering.
    pub points: Vec<TrackedPoint>,
    pub audio: LogAudio,
    rng: StdRng,
}

impl App {
    pub fn new(config: Config, scores: Option<ScoreDb>, sensor: Sensor) -> Self {
        let feed = BlobFeed::new(config.min_blob_size, config.max_blob_size);
        Self {
            session: Session::new(config, scores, TICK_SECS),
            feed,
            sensor,
            points: Vec::new(),
            audio: LogAudio,
            rng: StdRng::from_entropy(),
        }
    }

    /// One whole frame: poll the sensor, calibrate, evaluate, advance the
    /// state machine, fire cues.
    pub fn on_tick(&mut self) {
        // one snapshot per tick, so live tuning never splits a frame
        let calibration = self.session.config.calibration;
        self.feed.min_blob_size = self.session.config.min_blob_size;
        self.feed.max_blob_size = self.session.config.max_blob_size;
        self.points = self
            .feed
            .poll_frame(self.sensor.as_source(), calibration)
            .to_vec();
        let cues = self.session.tick(&self.points, &mut self.rng);
        for cue in cues {
            self.audio.play(cue);
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let mut config = store.load();
    if let Some(players) = cli.players {
        config.players = players.max(1);
    }
    if let Some(rounds) = cli.rounds {
        config.rounds = rounds.max(1);
    }
    if let Some(secs) = cli.round_secs {
        config.round_secs = secs.max(1.0);
    }
    if !config.calibration.is_invertible() {
        tracing::warn!("persisted calibration has a zero scale, resetting to defaults");
        config.calibration = Calibration::default();
    }

    let scores = match ScoreDb::new() {
        Ok(db) => Some(db),
        Err(e) => {
            tracing::warn!(error = %e, "score store unavailable, highscores disabled");
            None
        }
    };

    let sensor = match cli.sensor {
        SensorBackend::Simulated => {
            let area = (config.min_blob_size + config.max_blob_size) / 2.0;
            Sensor::Simulated(SimulatedSensor::new(area))
        }
        SensorBackend::None => {
            tracing::warn!("no sensor attached, running with an empty blob feed");
            Sensor::Disconnected(NullSensor)
        }
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, scores, sensor);
    app.audio.play(Cue::AmbientQuiet);
    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Teardown always persists the live-tuned calibration and blob band,
    // even when the loop ended with an error.
    let mut persist = store.load();
    persist.calibration = app.session.config.calibration;
    persist.min_blob_size = app.session.config.min_blob_size;
    persist.max_blob_size = app.session.config.max_blob_size;
    if let Err(e) = store.save(&persist) {
        tracing::warn!(error = %e, "failed to persist settings");
    }

    res
}

fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(file) = std::fs::File::options().create(true).append(true).open(&path) else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init();
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermInputSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    loop {
        match runner.step() {
            InputEvent::Tick => {
                app.on_tick();
                terminal.draw(|f| ui(app, f))?;
            }
            InputEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            InputEvent::Key(key) => {
                if handle_key(app, key) {
                    break;
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

/// Operator surface: simulated-body controls plus live calibration and
/// blob-band tuning. Returns true when the loop should quit.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    const NUDGE: f64 = 5.0;
    const SHIFT: f64 = 10.0;
    const BAND_MIN_STEP: f64 = 100.0;
    const BAND_MAX_STEP: f64 = 1000.0;

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Left => nudge(app, -NUDGE, 0.0),
        KeyCode::Right => nudge(app, NUDGE, 0.0),
        KeyCode::Up => nudge(app, 0.0, -NUDGE),
        KeyCode::Down => nudge(app, 0.0, NUDGE),
        KeyCode::Tab => {
            if let Some(sim) = app.sensor.simulated_mut() {
                sim.select_next();
            }
        }
        KeyCode::Char('a') => {
            if let Some(sim) = app.sensor.simulated_mut() {
                sim.add_body();
            }
        }
        KeyCode::Char('d') => {
            if let Some(sim) = app.sensor.simulated_mut() {
                sim.remove_body();
            }
        }
        KeyCode::Char('[') => app.session.config.calibration.degrees -= 1.0,
        KeyCode::Char(']') => app.session.config.calibration.degrees += 1.0,
        KeyCode::Char('-') => scale(app, 0.98),
        KeyCode::Char('=') => scale(app, 1.02),
        KeyCode::Char(',') => band(app, -BAND_MIN_STEP, 0.0),
        KeyCode::Char('.') => band(app, BAND_MIN_STEP, 0.0),
        KeyCode::Char('<') => band(app, 0.0, -BAND_MAX_STEP),
        KeyCode::Char('>') => band(app, 0.0, BAND_MAX_STEP),
        KeyCode::Char('h') => app.session.config.calibration.translate_x -= SHIFT,
        KeyCode::Char('l') => app.session.config.calibration.translate_x += SHIFT,
        KeyCode::Char('k') => app.session.config.calibration.translate_y -= SHIFT,
        KeyCode::Char('j') => app.session.config.calibration.translate_y += SHIFT,
        _ => {}
    }
    false
}

fn nudge(app: &mut App, dx: f64, dy: f64) {
    if let Some(sim) = app.sensor.simulated_mut() {
        sim.nudge_active(dx, dy);
    }
}

fn scale(app: &mut App, factor: f64) {
    let cal = &mut app.session.config.calibration;
    cal.scale_x *= factor;
    cal.scale_y *= factor;
}

/// The band bounds can never cross each other or go negative.
fn band(app: &mut App, d_min: f64, d_max: f64) {
    let cfg = &mut app.session.config;
    cfg.min_blob_size = (cfg.min_blob_size + d_min).clamp(0.0, cfg.max_blob_size);
    cfg.max_blob_size = (cfg.max_blob_size + d_max).max(cfg.min_blob_size);
}
