use crate::config::{Args, Palette, Tuning};
use crate::driver::FrameDriver;
use crate::field::Field;
use crate::render::{CellSink, Terminal, Viewport};
use crate::rng::make_rng;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rand::rngs::StdRng;
use std::time::{Duration, Instant};
use tracing::info;

pub(crate) struct App {
    palette: Palette,
    viewport: Viewport,
    field: Field,
    driver: FrameDriver,
    rng: StdRng,
    term: Terminal,
    frame_dt: Duration,
    should_quit: bool,
}

impl App {
    fn init(args: &Args) -> anyhow::Result<Self> {
        let tuning = Tuning::from_args(args);
        let term = Terminal::begin()?;

        Ok(Self {
            palette: Palette::from_args(args),
            viewport: Viewport::new(tuning.row_height),
            field: Field::new(tuning),
            driver: FrameDriver::new(tuning.advance_reset_max),
            rng: make_rng(args.seed),
            term,
            frame_dt: Duration::from_millis(args.ms.clamp(1, 1000)),
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let (cols, rows) = (self.term.cols, self.term.rows);
        self.resized(cols, rows)?;

        while !self.should_quit {
            let start = Instant::now();
            self.pump_events()?;
            if self.should_quit {
                break;
            }
            self.render_frame()?;
            spin_sleep(self.frame_dt, start);
        }
        Ok(())
    }

    fn pump_events(&mut self) -> anyhow::Result<()> {
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(k) if is_quit(&k) => {
                    self.should_quit = true;
                    return Ok(());
                }
                Event::Resize(c, r) => self.resized(c, r)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn resized(&mut self, cols: u16, rows: u16) -> anyhow::Result<()> {
        self.term.resize(cols, rows)?;
        let (w, h) = self.viewport.logical_size(cols, rows);
        self.field.on_resize(w, h, &mut self.rng);
        Ok(())
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        self.term.cur.clear();
        if !self.field.is_built() {
            return self.term.present();
        }
        let mut sink = CellSink {
            buf: &mut self.term.cur,
            viewport: self.viewport,
            palette: &self.palette,
        };
        self.driver.frame(&mut self.field, &mut self.rng, &mut sink);
        self.term.present()
    }
}

fn is_quit(k: &KeyEvent) -> bool {
    if k.kind == KeyEventKind::Release {
        return false;
    }
    match k.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') => k.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

pub(crate) fn run(args: &Args) -> anyhow::Result<()> {
    let mut app = App::init(args)?;
    info!(seed = ?args.seed, ms = args.ms, "starting");
    let result = app.run();
    // restore the terminal even when the loop failed
    app.term.end()?;
    info!(ok = result.is_ok(), "stopped");
    result
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, start: Instant) {
    let end = start + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
