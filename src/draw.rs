use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        mpsc, Arc, Mutex,
    },
    thread,
    time::Duration,
};

use anyhow::Result;
use crossterm::{
    cursor::{Hide, RestorePosition, SavePosition, Show},
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{
        self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
        SetTitle,
    },
};
use tracing::debug;

use crate::{engine::Engine, patterns};

/// Tick delays in ms, fastest to slowest.
static DELAYS: [u64; 14] = [1, 10, 20, 40, 60, 100, 150, 200, 300, 450, 800, 1200, 1500, 2000];

const MIN_SIZE: usize = 10;
const MAX_SIZE: usize = 100;
const SIZE_STEP: usize = 10;

/// Shared session state. The driver loop owns stepping and all board
/// mutation; the keyboard thread only flips the atomics and queues
/// commands, so edits never interleave with a transition in progress.
pub struct App {
    pub engine: Mutex<Engine>,
    pub should_exit: AtomicBool,
    pub pause: AtomicBool,
    pub upd_timeout: AtomicU64,
}

/// Board edits requested by the keyboard thread, applied between ticks.
enum Cmd {
    Step,
    Clear,
    Randomize,
    Toggle,
    Move(isize, isize),
    Stamp(usize),
    Grow,
    Shrink,
}

impl App {
    #[inline]
    pub fn new(engine: Engine, delay_ms: u64) -> Self {
        App {
            engine: Mutex::new(engine),
            should_exit: false.into(),
            pause: false.into(),
            upd_timeout: delay_ms.into(),
        }
    }

    #[inline]
    pub fn should_exit(&self) -> bool {
        self.should_exit.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn pause(&self) -> bool {
        self.pause.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn upd_timeout(&self) -> u64 {
        self.upd_timeout.load(Ordering::Relaxed)
    }
}

pub fn run(a: App) -> Result<()> {
    runup()?;
    clear()?;
    let d = drive(a);
    shutdown()?;
    d
}

fn runup() -> Result<()> {
    execute!(std::io::stderr(), EnterAlternateScreen, SetTitle("gridlife"), Hide)?;
    enable_raw_mode()?;
    clear()?;
    execute!(std::io::stdout(), SavePosition)?;
    Ok(())
}

fn shutdown() -> Result<()> {
    execute!(std::io::stderr(), LeaveAlternateScreen, Show)?;
    disable_raw_mode()?;
    Ok(())
}

fn drive(a: App) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let a = Arc::new(a);

    let arc_keys = Arc::clone(&a);
    let start_delay = a.upd_timeout();
    let _ = thread::Builder::new().name("Keyboard input".into()).spawn(move || {
        let a = arc_keys;
        // start on the ladder rung closest to the configured delay
        let mut delay_idx = DELAYS
            .iter()
            .position(|&d| d >= start_delay)
            .unwrap_or(DELAYS.len() - 1);
        while !a.should_exit() {
            let _ = hotkeys(&a, &tx, &mut delay_idx);
        }
    });

    let mut cursor = (0usize, 0usize);
    while !a.should_exit() {
        let paused = a.pause();
        {
            let mut engine = a.engine.lock().unwrap();
            while let Ok(cmd) = rx.try_recv() {
                apply(&a, &mut engine, &mut cursor, cmd);
            }
            if !a.pause() {
                engine.step();
            }
            render(&engine, cursor, a.pause(), a.upd_timeout())?;
        }
        // stay responsive to edits while paused
        let ms = if paused { 50 } else { a.upd_timeout() };
        sleep_ms(ms);
    }
    Ok(())
}

/// Board edits land only while the loop is paused; bulk seeding pauses
/// the loop itself first.
fn apply(a: &App, engine: &mut Engine, cursor: &mut (usize, usize), cmd: Cmd) {
    let paused = a.pause();
    match cmd {
        Cmd::Step if paused => engine.step(),
        Cmd::Toggle if paused => engine.toggle(cursor.0, cursor.1),
        Cmd::Move(dr, dc) if paused => {
            let last = engine.size() - 1;
            cursor.0 = cursor.0.saturating_add_signed(dr).min(last);
            cursor.1 = cursor.1.saturating_add_signed(dc).min(last);
        }
        Cmd::Clear => {
            a.pause.store(true, Ordering::Relaxed);
            engine.clear();
            debug!("board cleared");
        }
        Cmd::Randomize => {
            a.pause.store(true, Ordering::Relaxed);
            engine.randomize();
            debug!(alive = engine.living_count(), "board randomized");
        }
        Cmd::Stamp(i) => {
            if let Some(pattern) = patterns::PATTERNS.get(i) {
                a.pause.store(true, Ordering::Relaxed);
                let cells = pattern.cells();
                let (row, col) = patterns::centered_origin(engine.size(), &cells);
                engine.stamp_pattern(&cells, row, col);
                debug!(pattern = pattern.name, "pattern stamped");
            }
        }
        Cmd::Grow | Cmd::Shrink if paused => {
            let size = match cmd {
                Cmd::Grow => (engine.size() + SIZE_STEP).min(MAX_SIZE),
                _ => engine.size().saturating_sub(SIZE_STEP).max(MIN_SIZE),
            };
            if size != engine.size() {
                let _ = engine.resize(size);
                *cursor = (0, 0);
                debug!(size, "board resized");
            }
        }
        _ => {}
    }
}

fn render(engine: &Engine, cursor: (usize, usize), paused: bool, delay: u64) -> Result<()> {
    let (term_w, term_h) = terminal::size()?;
    let visible_rows = (term_h as usize).saturating_sub(3);
    let visible_cols = term_w as usize;

    clear()?;
    print!(
        "gen {}  alive {}  {}ms  {}\n\r",
        engine.generation(),
        engine.living_count(),
        delay,
        if paused { "paused" } else { "running" },
    );
    if paused {
        print!("arrows move, enter toggles, s steps, c clears, r randomizes, 1-6 patterns, +/- resize, p runs, q quits\n\r");
    } else {
        print!("p pauses (edit), j/k speed, q quits\n\r");
    }

    for (i, row) in engine.rows().iter().take(visible_rows).enumerate() {
        for (j, &alive) in row.iter().take(visible_cols).enumerate() {
            if paused && (i, j) == cursor {
                print!("{}", if alive { "@" } else { "+" });
            } else {
                print!("{}", if alive { "#" } else { " " });
            }
        }
        print!("\n\r");
    }
    Ok(())
}

fn clear() -> Result<()> {
    use std::io::stdout;
    use terminal::{Clear, ClearType};

    execute!(stdout(), Clear(ClearType::Purge))?;
    execute!(stdout(), RestorePosition)?;
    Ok(())
}

fn sleep_ms(t: u64) {
    thread::sleep(Duration::from_millis(t))
}

fn hotkeys(a: &Arc<App>, tx: &mpsc::Sender<Cmd>, delay_idx: &mut usize) -> Result<()> {
    if event::poll(Duration::from_millis(150))? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    if key.code == KeyCode::Char('c') {
                        a.should_exit.store(true, Ordering::Relaxed);
                    }
                } else {
                    match key.code {
                        KeyCode::Char('q') => a.should_exit.store(true, Ordering::Relaxed),
                        KeyCode::Char('p') | KeyCode::Char(' ') => {
                            let p = a.pause();
                            a.pause.store(!p, Ordering::Relaxed);
                        }
                        KeyCode::Char('j') => {
                            *delay_idx = delay_idx.saturating_sub(1);
                            a.upd_timeout.store(DELAYS[*delay_idx], Ordering::Relaxed);
                        }
                        KeyCode::Char('k') => {
                            *delay_idx = (*delay_idx + 1).min(DELAYS.len() - 1);
                            a.upd_timeout.store(DELAYS[*delay_idx], Ordering::Relaxed);
                        }
                        KeyCode::Char('s') => tx.send(Cmd::Step)?,
                        KeyCode::Char('c') => tx.send(Cmd::Clear)?,
                        KeyCode::Char('r') => tx.send(Cmd::Randomize)?,
                        KeyCode::Char('t') | KeyCode::Enter => tx.send(Cmd::Toggle)?,
                        KeyCode::Up => tx.send(Cmd::Move(-1, 0))?,
                        KeyCode::Down => tx.send(Cmd::Move(1, 0))?,
                        KeyCode::Left => tx.send(Cmd::Move(0, -1))?,
                        KeyCode::Right => tx.send(Cmd::Move(0, 1))?,
                        KeyCode::Char('+') | KeyCode::Char('=') => tx.send(Cmd::Grow)?,
                        KeyCode::Char(c @ '1'..='6') => {
                            tx.send(Cmd::Stamp(c as usize - '1' as usize))?
                        }
                        KeyCode::Char('-') => tx.send(Cmd::Shrink)?,
                        _ => {}
                    }
                }
            }
        }
    }
    Ok(())
}
