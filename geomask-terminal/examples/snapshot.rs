//! Example: Print a single frame of the silhouette without entering raw mode
//!
//! Usage: cargo run --example snapshot -- [columns] [rows] [millis]
use std::env;
use std::io::{self, stdout, Write};

use crossterm::{
    execute,
    terminal::{Clear, ClearType},
};
use geomask_core::{Settings, SilhouetteRenderer};
use geomask_terminal::CellCanvas;

fn main() -> io::Result<()> {
    let args: Vec<u32> = env::args()
        .skip(1)
        .map(|arg| {
            arg.parse()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{arg}: {e}")))
        })
        .collect::<io::Result<_>>()?;
    let columns = args.first().copied().unwrap_or(80) as u16;
    let rows = args.get(1).copied().unwrap_or(30) as u16;
    let millis = f64::from(args.get(2).copied().unwrap_or(1000));

    let mut renderer = SilhouetteRenderer::with_seed(Settings::default(), 0.0, 1)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let mut canvas = CellCanvas::new(columns, rows);
    let (width, height) = canvas.logical_size();
    renderer.resize(width, height);

    // Let the animation settle before the captured frame
    let mut now = 0.0;
    while now < millis {
        renderer.update(now);
        now += 1000.0 / 60.0;
    }

    if let Some(ticket) = renderer.start() {
        renderer.render_frame(ticket, &mut canvas, millis);
    }

    let mut stdout = stdout();
    execute!(stdout, Clear(ClearType::All))?;
    canvas.present(&mut stdout)?;
    writeln!(stdout)?;
    stdout.flush()
}
