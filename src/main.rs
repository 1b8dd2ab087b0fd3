use filescape::{actions, app, config, event, fsops, ui};

use anyhow::Result;
use app::{AppState, TreeSource};
use clap::Parser;
use config::{load_config, CliArgs};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};

/// Frame budget of the continuously-animating render loop.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    // Parse command line arguments and load layered configuration
    let args = CliArgs::parse();
    let config = load_config(&args)?;

    if args.debug_config {
        println!("Configuration:");
        println!("{config:#?}");
        return Ok(());
    }

    // Create application state; a directory argument starts a background
    // scan so the entry screen never blocks on I/O
    let mut app = AppState::new(config);
    if let Some(directory) = app.config.directory.clone() {
        let directory = directory.canonicalize().unwrap_or(directory);
        app.source = TreeSource::Real(directory.clone());
        app.scanning = true;
        app.set_message(format!("Scanning {}…", directory.display()));
        fsops::spawn_scan(
            directory,
            app.config.scan_depth,
            app.config.scan_limit,
            app.worker_sender(),
        );
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    // key-release events for held-key movement, where the terminal has them
    let enhanced_keys = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced_keys {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    if enhanced_keys {
        let _ = execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Handle any errors from the main loop
    if let Err(err) = res {
        eprintln!("Error: {err}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
) -> Result<()> {
    let mut last_frame = Instant::now();

    while app.running {
        // Apply finished background work (scans, file operations, analysis)
        app.poll_background();

        // Advance the animation clock and integrate held movement keys
        let now = Instant::now();
        let dt = now.duration_since(last_frame);
        last_frame = now;
        app.tick(dt);

        // Draw the frame
        terminal.draw(|frame| ui::render(frame, app))?;

        // Handle whatever input arrived within this frame's budget
        let budget = FRAME_INTERVAL.saturating_sub(last_frame.elapsed());
        for action in event::poll_actions(app, budget)? {
            actions::execute_action(action, app)?;
        }
    }

    Ok(())
}
