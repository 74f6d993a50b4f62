//! GeoMask Terminal Demo - Animated Silhouette
//!
//! Renders the geometric face in truecolor half blocks.
//! Controls:
//!   - Mouse move: Eyes follow, head tilts
//!   - Drag: Rotate the head
//!   - Wheel: Scroll fade
//!   - Q/ESC: Quit
use std::io;

use geomask_core::Settings;
use geomask_terminal::TerminalApp;

fn main() -> io::Result<()> {
    // Silent unless RUST_LOG is set; log lines would tear the alternate screen
    env_logger::init();

    let mut app = TerminalApp::new(Settings::default())?;
    if app.is_disabled() {
        eprintln!("GeoMask needs an interactive terminal.");
        return Ok(());
    }

    app.run()
}
