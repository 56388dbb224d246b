use anyhow::{Context, Result};
use clap::Parser;
use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "coderain", version, about = "falling glyph streams for the terminal")]
pub(crate) struct Args {
    /// ms per frame (lower = faster)
    #[arg(long, default_value_t = 16)]
    pub(crate) ms: u64,

    /// fixed RNG seed; omit for a fresh run every time
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// logical units per glyph row (a cell is half as wide)
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(i32).range(2..))]
    pub(crate) row_height: i32,

    /// chance per glyph per frame of a random character swap
    #[arg(long, default_value_t = 0.003)]
    pub(crate) flicker: f32,

    /// paint a faint glow behind each glyph
    #[arg(long, default_value_t = false)]
    pub(crate) shadow: bool,

    /// write tracing output to this file
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,
}

// Speeds are frame divisors: smaller ticks more often.
const SPEED_BASE: i32 = 16;

/// One of the two stream populations laid across the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Population {
    pub(crate) speed_min: i32,
    pub(crate) speed_max: i32,
    pub(crate) max_glyphs: i32,
    pub(crate) fixed_alpha: Option<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Tuning {
    pub(crate) row_height: i32,
    pub(crate) min_glyphs: i32,
    /// rows laid out above the canvas top when a stream is built
    pub(crate) lead_rows: i32,
    pub(crate) highlight_count: usize,
    pub(crate) flicker_chance: f32,
    pub(crate) alpha_floor: u8,
    pub(crate) spacing_delta: i32,
    pub(crate) advance_reset_max: u32,
    pub(crate) background: Population,
    pub(crate) foreground: Population,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            row_height: 30,
            min_glyphs: 10,
            lead_rows: 10,
            highlight_count: 3,
            flicker_chance: 0.003,
            alpha_floor: 40,
            spacing_delta: 15,
            advance_reset_max: 5,
            background: Population {
                speed_min: SPEED_BASE / 2,
                speed_max: SPEED_BASE * 2,
                max_glyphs: 20,
                fixed_alpha: Some(25),
            },
            foreground: Population {
                speed_min: SPEED_BASE / 4,
                speed_max: SPEED_BASE / 2,
                max_glyphs: 50,
                fixed_alpha: None,
            },
        }
    }
}

impl Tuning {
    pub(crate) fn from_args(args: &Args) -> Self {
        Self {
            row_height: args.row_height.max(2),
            flicker_chance: args.flicker.clamp(0.0, 1.0),
            ..Self::default()
        }
    }

    pub(crate) fn row(&self) -> i32 {
        self.row_height.max(1)
    }

    /// y of the first glyph row before the phase offset is applied
    pub(crate) fn start_offset(&self) -> i32 {
        -(self.lead_rows * self.row())
    }

    pub(crate) fn background_stride(&self) -> i32 {
        self.row() * 2
    }

    pub(crate) fn foreground_stride(&self) -> i32 {
        (self.row() + self.spacing_delta).max(1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl Rgb {
    pub(crate) const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Shadow {
    pub(crate) enabled: bool,
    pub(crate) color: Rgb,
    /// fraction of the glyph alpha used for the glow
    pub(crate) strength: f32,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Rgb::new(122, 250, 220),
            strength: 0.25,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Palette {
    pub(crate) base: Rgb,
    pub(crate) secondary: Rgb,
    pub(crate) brightest: Rgb,
    pub(crate) shadow: Shadow,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            base: Rgb::new(0, 253, 32),
            secondary: Rgb::new(187, 250, 217),
            brightest: Rgb::new(225, 254, 233),
            shadow: Shadow::default(),
        }
    }
}

impl Palette {
    pub(crate) fn from_args(args: &Args) -> Self {
        let mut p = Self::default();
        p.shadow.enabled = args.shadow;
        p
    }
}

/// Installs a file-backed subscriber. The terminal belongs to the renderer,
/// so without a path nothing is installed.
pub(crate) fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("could not create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .map_err(|e| anyhow::anyhow!("could not install logger: {e}"))?;
    Ok(())
}
