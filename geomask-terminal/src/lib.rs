//! Terminal host for the GeoMask silhouette
use crossterm::{
    cursor,
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self},
};
use geomask_core::{EnvironmentError, FrameTicket, InputEvent, Settings, SilhouetteRenderer};
use std::io::{self, stdout, IsTerminal, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::CellCanvas;

/// Page offset added or removed per wheel notch
const SCROLL_STEP: f32 = 40.0;

const TARGET_FRAME_TIME: Duration = Duration::from_millis(1000 / 30);

/// Poll interval while rendering is suspended
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Main application struct for terminal silhouette rendering
pub struct TerminalApp {
    renderer: SilhouetteRenderer,
    canvas: CellCanvas,
    ticket: Option<FrameTicket>,
    scroll: f32,
    running: bool,
    started: Instant,
    last_fps_sample: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// Build the app for the current terminal.
    ///
    /// When stdout is not a terminal, or reports no size, the app is created
    /// with its render task disabled and `run` returns immediately.
    pub fn new(settings: Settings) -> io::Result<Self> {
        Self::with_surface(
            settings,
            detect_surface(stdout().is_terminal(), terminal::size()),
        )
    }

    /// Build the app for a surface of `columns` x `rows` cells, or a disabled
    /// app when no surface is available
    pub fn with_surface(
        settings: Settings,
        surface: Result<(u16, u16), EnvironmentError>,
    ) -> io::Result<Self> {
        let started = Instant::now();
        let mut renderer = SilhouetteRenderer::new(settings, 0.0)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;

        let canvas = match surface {
            Ok((columns, rows)) => {
                let canvas = CellCanvas::new(columns, rows);
                let (width, height) = canvas.logical_size();
                renderer.resize(width, height);
                canvas
            }
            Err(err) => {
                log::warn!("silhouette disabled: {err}");
                renderer.shutdown();
                CellCanvas::new(0, 0)
            }
        };

        Ok(Self {
            renderer,
            canvas,
            ticket: None,
            scroll: 0.0,
            running: true,
            started,
            last_fps_sample: started,
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn is_disabled(&self) -> bool {
        self.renderer.task().is_disabled()
    }

    pub fn run(&mut self) -> io::Result<()> {
        if self.is_disabled() {
            return Ok(());
        }

        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture,
            EnableFocusChange
        )?;

        let result = self.main_loop();

        // Cleanup
        self.renderer.shutdown();
        execute!(
            stdout(),
            DisableFocusChange,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    /// Milliseconds since the app was created
    fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    fn main_loop(&mut self) -> io::Result<()> {
        self.ticket = self.renderer.start();
        let mut next_frame = Instant::now();

        while self.running {
            let timeout = if self.ticket.is_some() {
                next_frame.saturating_duration_since(Instant::now())
            } else {
                IDLE_POLL
            };

            // Handle input, draining whatever queued up meanwhile
            if event::poll(timeout)? {
                self.handle_event(event::read()?);
                while event::poll(Duration::ZERO)? {
                    self.handle_event(event::read()?);
                }
            }

            if self.ticket.is_some() && Instant::now() >= next_frame {
                if let Some(ticket) = self.ticket.take() {
                    next_frame = Instant::now() + TARGET_FRAME_TIME;
                    self.render(ticket)?;
                }
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        let now = self.now();
        let input = match event {
            Event::Key(KeyEvent {
                code: KeyCode::Char('q') | KeyCode::Esc,
                kind: KeyEventKind::Press,
                ..
            }) => {
                self.running = false;
                None
            }
            Event::Mouse(mouse) => self.pointer_event(mouse),
            Event::FocusLost => {
                self.forward(InputEvent::PointerLeave, now);
                Some(InputEvent::Visibility { visible: false })
            }
            Event::FocusGained => Some(InputEvent::Visibility { visible: true }),
            Event::Resize(columns, rows) => {
                self.resize(columns, rows);
                None
            }
            _ => None,
        };

        if let Some(input) = input {
            self.forward(input, now);
        }
    }

    fn forward(&mut self, input: InputEvent, now: f64) {
        if let Some(ticket) = self.renderer.handle_event(input, now) {
            self.ticket = Some(ticket);
        }
    }

    fn pointer_event(&mut self, mouse: MouseEvent) -> Option<InputEvent> {
        let position = self.canvas.cell_center(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(MouseButton::Left) => {
                Some(InputEvent::PointerMove { position })
            }
            MouseEventKind::Down(MouseButton::Left) => Some(InputEvent::PointerDown { position }),
            MouseEventKind::Up(MouseButton::Left) => Some(InputEvent::PointerUp),
            MouseEventKind::ScrollDown => {
                self.scroll += SCROLL_STEP;
                Some(InputEvent::Scroll {
                    offset: self.scroll,
                })
            }
            MouseEventKind::ScrollUp => {
                self.scroll = (self.scroll - SCROLL_STEP).max(0.0);
                Some(InputEvent::Scroll {
                    offset: self.scroll,
                })
            }
            _ => None,
        }
    }

    fn resize(&mut self, columns: u16, rows: u16) {
        self.canvas.resize(columns, rows);
        let (width, height) = self.canvas.logical_size();
        self.renderer.resize(width, height);
    }

    fn render(&mut self, ticket: FrameTicket) -> io::Result<()> {
        let now = self.now();
        self.ticket = self.renderer.render_frame(ticket, &mut self.canvas, now);

        // Output to terminal
        let mut stdout = stdout();
        self.canvas.present(&mut stdout)?;

        // Update FPS counter
        self.frame_count += 1;
        let elapsed = self.last_fps_sample.elapsed();
        if elapsed.as_secs() >= 1 {
            self.fps = self.frame_count as f32 / elapsed.as_secs_f32();
            self.frame_count = 0;
            self.last_fps_sample = Instant::now();
        }

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Rgb {
                r: 0,
                g: 220,
                b: 255
            }),
            SetBackgroundColor(Color::Reset),
            Print(format!(
                "GeoMask | FPS: {:.1} | Drag=Rotate Wheel=Fade Q=Quit",
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// Size of the attached terminal in cells
fn detect_surface(
    is_terminal: bool,
    size: io::Result<(u16, u16)>,
) -> Result<(u16, u16), EnvironmentError> {
    if !is_terminal {
        return Err(EnvironmentError::NoSurface);
    }
    match size {
        Ok((columns, rows)) if columns > 0 && rows > 0 => Ok((columns, rows)),
        Ok(_) => Err(EnvironmentError::NoSurface),
        Err(err) => Err(EnvironmentError::NoContext(err.to_string())),
    }
}
