//! handvox-app: terminal front end for handvox
//!
//! Runs the single-threaded frame loop: poll keys, sample the simulated
//! hand, step the editor, render the world, rasterize and present.
//!
//! Controls:
//! - Arrows: move the hand
//! - `[` / `]`: hand away from / toward the camera
//! - `1`-`4`: aim, pinch, fist, open palm
//! - `h`: hide or show the hand
//! - `c`: next color
//! - `p`: take the color of the voxel nearest the cursor
//! - Esc or `q`: quit

pub mod simulator;
pub mod terminal;

use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{self, Event as CrosstermEvent, KeyEvent},
    execute,
    terminal::{self as term, EnterAlternateScreen, LeaveAlternateScreen},
};
use handvox_core::render::project_point;
use handvox_core::{
    CameraMode, Canvas, Color, ConfigError, Editor, FrameReport, HandDetector, HandvoxConfig,
    RenderPipeline,
};

use simulator::{HandSimulator, SimCommand};
use terminal::TerminalSurface;

/// Half-length of the cursor cross, in pixels
const MARKER_ARM: f32 = 2.0;

/// Loop pacing and length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub fps: u32,
    /// Stop after this many frames; 0 runs until quit
    pub max_frames: u64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            fps: 30,
            max_frames: 0,
        }
    }
}

impl RunOptions {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.fps.max(1)))
    }
}

/// Everything one frame touches, free of terminal I/O
pub struct Session {
    editor: Editor,
    pipeline: RenderPipeline,
    canvas: Canvas,
    simulator: HandSimulator,
    background: Color,
    fixed_viewport: bool,
    frame: u64,
    last_report: Option<FrameReport>,
    running: bool,
}

impl Session {
    /// `width`/`height` is the drawable area in pixels; a viewport set in the
    /// configuration takes precedence.
    pub fn new(config: &HandvoxConfig, width: usize, height: usize) -> Result<Self, ConfigError> {
        let editor = Editor::from_config(config)?;
        let settings = config.render_settings(to_u32(width), to_u32(height))?;
        let background = config.render.background;
        let canvas = Canvas::new(settings.width as usize, settings.height as usize, background)
            .with_depth_test(config.render.depth_test);
        let simulator = HandSimulator::new()
            .with_depth_range(config.cursor.depth_source_min, config.cursor.depth_source_max);

        Ok(Self {
            editor,
            pipeline: RenderPipeline::new(settings)?,
            canvas,
            simulator,
            background,
            fixed_viewport: config.render.width > 0,
            frame: 0,
            last_report: None,
            running: true,
        })
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn simulator(&self) -> &HandSimulator {
        &self.simulator
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn last_report(&self) -> Option<&FrameReport> {
        self.last_report.as_ref()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.simulator.process_key(key) {
            SimCommand::None => {}
            SimCommand::CycleColor => {
                let color = self.editor.palette_mut().cycle();
                tracing::debug!(?color, "active color changed");
            }
            SimCommand::PickColor => match self.editor.pick_color() {
                Some(color) => tracing::debug!(?color, "active color picked"),
                None => tracing::debug!("nothing to pick under the cursor"),
            },
            SimCommand::Quit => self.running = false,
        }
    }

    /// Follow the terminal size unless the viewport is fixed by configuration
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), ConfigError> {
        if self.fixed_viewport {
            return Ok(());
        }
        let (width, height) = (to_u32(width), to_u32(height));
        let current = self.pipeline.settings();
        if (current.width, current.height) == (width, height) {
            return Ok(());
        }
        self.pipeline.set_viewport(width, height)?;
        self.canvas
            .resize(width as usize, height as usize, self.background);
        tracing::debug!(width, height, "viewport resized");
        Ok(())
    }

    /// Detect, edit, render and rasterize one frame
    pub fn tick(&mut self) -> &FrameReport {
        let hand = match self.simulator.detect() {
            Ok(hand) => hand,
            Err(e) => {
                tracing::warn!("hand sample rejected: {}", e);
                None
            }
        };
        let report = self.editor.step(hand.as_ref());

        let primitives = self.pipeline.render(self.editor.world(), self.editor.camera());
        self.canvas.clear(self.background);
        self.canvas.rasterize(&primitives);
        let marker = self
            .editor
            .cursor()
            .and_then(|p| project_point(p, self.editor.camera(), self.pipeline.settings()));
        if let Some(at) = marker {
            self.canvas.draw_marker(at, MARKER_ARM, Color::WHITE);
        }

        self.frame += 1;
        self.last_report.insert(report)
    }

    /// Status and key help for the bottom of the screen
    pub fn hud_lines(&self) -> Vec<String> {
        let world = self.editor.world();
        let stats = self.pipeline.stats();
        let state = self.editor.gesture_state();
        let cell = self
            .last_report
            .as_ref()
            .and_then(|r| r.gesture.cursor)
            .map(|c| c.cell.to_string())
            .unwrap_or_else(|| "-".to_string());
        let capacity = world
            .capacity_limit()
            .map(|n| format!("/{}", n))
            .unwrap_or_default();
        let extent = world
            .bounds()
            .map(|(min, max)| format!("{}..{}", min, max))
            .unwrap_or_else(|| "empty".to_string());
        let mode = match self.editor.camera_mode() {
            CameraMode::AutoRotate => "auto",
            CameraMode::GestureOrbit => "orbit",
        };
        let hand = if self.simulator.is_visible() {
            self.simulator.pose().label()
        } else {
            "hidden"
        };

        vec![
            format!(
                " {} | hand {} | cell {} | voxels {}{} {} | faces {} | camera {} | color {}",
                state.label(),
                hand,
                cell,
                world.len(),
                capacity,
                extent,
                stats.emitted,
                mode,
                self.editor.palette().active_index() + 1,
            ),
            " arrows move  [ ] depth  1-4 aim/pinch/fist/palm  h hide  c color  p pick  q quit"
                .to_string(),
        ]
    }
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n.max(1)).unwrap_or(u32::MAX)
}

/// Puts the terminal back the way the session found it
///
/// Created once raw mode is on; dropping it, on any exit path, leaves the
/// alternate screen, shows the cursor and disables raw mode.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        term::enable_raw_mode().context("failed to enable raw mode")?;
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen).context("failed to enter alternate screen")?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show) {
            tracing::warn!("failed to leave alternate screen: {}", e);
        }
        if let Err(e) = term::disable_raw_mode() {
            tracing::warn!("failed to disable raw mode: {}", e);
        }
    }
}

/// Run the interactive session until quit or `max_frames`
pub fn run(config: &HandvoxConfig, options: RunOptions) -> Result<()> {
    let mut surface = TerminalSurface::from_terminal(config.render.background)
        .context("failed to query terminal size")?;
    let (width, height) = surface.canvas_size();
    let mut session =
        Session::new(config, width, height).context("failed to start sculpting session")?;

    let guard = TerminalGuard::enter()?;
    tracing::info!(fps = options.fps, "session started");

    let result = run_loop(&mut session, &mut surface, options);

    drop(guard);
    tracing::info!(
        frames = session.frame(),
        voxels = session.editor().world().len(),
        "session ended"
    );
    result
}

fn run_loop(
    session: &mut Session,
    surface: &mut TerminalSurface,
    options: RunOptions,
) -> Result<()> {
    let tick_rate = options.frame_interval();
    let mut last_tick = Instant::now();

    while session.is_running() {
        let timeout = tick_rate.checked_sub(last_tick.elapsed()).unwrap_or_default();

        if event::poll(timeout)? {
            match event::read()? {
                CrosstermEvent::Key(key) => session.handle_key(key),
                CrosstermEvent::Resize(cols, rows) => {
                    surface.resize(cols, rows);
                    let (width, height) = surface.canvas_size();
                    if let Err(e) = session.resize(width, height) {
                        tracing::warn!("resize ignored: {}", e);
                    }
                }
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            let elapsed = last_tick.elapsed();
            last_tick = Instant::now();

            session.tick();
            surface.compose(session.canvas(), &session.hud_lines());
            surface.flush().context("failed to draw frame")?;

            if elapsed > tick_rate * 2 {
                tracing::debug!(?elapsed, "frame over budget");
            }
            if options.max_frames > 0 && session.frame() >= options.max_frames {
                break;
            }
        }
    }
    Ok(())
}
