use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use whitted_renderer::RenderConfig;

/// Log levels selectable on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "whitted")]
#[command(about = "Grid-accelerated Whitted ray tracer")]
pub struct Args {
    /// Scene file to render
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output PNG
    #[arg(short, long, default_value = "output.png")]
    pub output: PathBuf,

    /// Reference image to compare the render against
    #[arg(short, long)]
    pub solution: Option<PathBuf>,

    /// Write the comparison statistic to this file instead of stdout
    #[arg(short = 'f', long = "stats")]
    pub stats: Option<PathBuf>,

    /// Column of a pixel to trace with full logging
    #[arg(short = 'x', requires = "debug_y")]
    pub debug_x: Option<u32>,

    /// Row of a pixel to trace with full logging (row 0 is the bottom)
    #[arg(short = 'y', requires = "debug_x")]
    pub debug_y: Option<u32>,

    /// Test every object per ray instead of using the grid
    #[arg(long)]
    pub no_acceleration: bool,

    /// Grid resolution, either "n" or "nx,ny,nz"
    #[arg(short = 'z', long = "grid", value_parser = parse_grid)]
    pub grid: Option<[usize; 3]>,

    /// Worker threads (0 for one per core)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Bucket edge length in pixels
    #[arg(long)]
    pub bucket_size: Option<u32>,

    /// TOML file with render settings; flags override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    pub fn debug_pixel(&self) -> Option<(u32, u32)> {
        self.debug_x.zip(self.debug_y)
    }

    /// Apply command line overrides on top of `config`.
    pub fn apply_overrides(&self, mut config: RenderConfig) -> RenderConfig {
        if self.no_acceleration {
            config.acceleration_enabled = false;
        }
        if let Some(grid) = self.grid {
            config.grid_resolution = grid;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(bucket_size) = self.bucket_size {
            config.bucket_size = bucket_size;
        }
        config
    }
}

fn parse_grid(value: &str) -> Result<[usize; 3], String> {
    let counts = value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<usize>()
                .map_err(|e| format!("invalid cell count '{}': {}", part, e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    match counts.as_slice() {
        [n] => Ok([*n; 3]),
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(format!("expected 1 or 3 cell counts, got {}", counts.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grid() {
        assert_eq!(parse_grid("8"), Ok([8, 8, 8]));
        assert_eq!(parse_grid("4,5, 6"), Ok([4, 5, 6]));
        assert!(parse_grid("1,2").is_err());
        assert!(parse_grid("a").is_err());
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["whitted", "-i", "scene.txt"]).unwrap();
        assert_eq!(args.output, PathBuf::from("output.png"));
        assert_eq!(args.debug_pixel(), None);
        assert_eq!(args.apply_overrides(RenderConfig::default()), RenderConfig::default());
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "whitted",
            "-i",
            "scene.txt",
            "-z",
            "3,4,5",
            "--no-acceleration",
            "--bucket-size",
            "16",
            "-x",
            "10",
            "-y",
            "20",
        ])
        .unwrap();

        let config = args.apply_overrides(RenderConfig::default());
        assert!(!config.acceleration_enabled);
        assert_eq!(config.grid_resolution, [3, 4, 5]);
        assert_eq!(config.bucket_size, 16);
        assert_eq!(config.threads, 0);
        assert_eq!(args.debug_pixel(), Some((10, 20)));
    }

    #[test]
    fn test_debug_pixel_needs_both_coordinates() {
        assert!(Args::try_parse_from(["whitted", "-i", "scene.txt", "-x", "3"]).is_err());
    }

    #[test]
    fn test_input_required() {
        assert!(Args::try_parse_from(["whitted"]).is_err());
    }
}
