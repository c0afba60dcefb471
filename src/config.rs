use clap::Parser;

use tennis_odds::bridge::grid::{DEFAULT_GRID_MAX, DEFAULT_GRID_MIN, DEFAULT_GRID_SIZE};
use tennis_odds::bridge::{GridSpec, Interpolation, Level, PrecomputeOptions};
use tennis_odds::score::{MatchFormat, SetEnding};

/// Precompute tennis win-probability grids into SQLite
#[derive(Parser, Debug, Clone)]
#[command(name = "tennis-odds", version, about)]
pub struct Config {
    /// SQLite database path
    #[arg(long, env = "DATABASE_PATH", default_value = "tennis-odds.db")]
    pub database_path: String,

    /// Levels to precompute (comma separated)
    #[arg(
        long = "level",
        env = "GRID_LEVELS",
        value_enum,
        value_delimiter = ',',
        default_values_t = Level::ALL.to_vec()
    )]
    pub levels: Vec<Level>,

    /// Points per grid axis
    #[arg(long, env = "GRID_SIZE", default_value_t = DEFAULT_GRID_SIZE)]
    pub grid_size: usize,

    /// Smallest serve probability on the grid
    #[arg(long, env = "GRID_MIN", default_value_t = DEFAULT_GRID_MIN)]
    pub grid_min: f64,

    /// Largest serve probability on the grid
    #[arg(long, env = "GRID_MAX", default_value_t = DEFAULT_GRID_MAX)]
    pub grid_max: f64,

    /// Sets in the match (odd)
    #[arg(long, env = "BEST_OF", default_value = "3")]
    pub best_of: u32,

    /// Games needed to win a set
    #[arg(long, env = "SET_LENGTH", default_value = "6")]
    pub set_length: u32,

    /// How regular sets are decided at a tie
    #[arg(long, env = "SET_ENDING", value_enum, default_value = "tiebreak")]
    pub set_ending: SetEnding,

    /// How the final set is decided at a tie
    #[arg(long, env = "FINAL_SET_ENDING", value_enum, default_value = "tiebreak")]
    pub final_set_ending: SetEnding,

    /// Play games with a deciding point at deuce
    #[arg(long, env = "NO_AD", default_value = "false")]
    pub no_ad: bool,

    /// Replace the deciding set with a 10-point match tiebreak
    #[arg(long, env = "MATCH_TIEBREAK", default_value = "false")]
    pub match_tiebreak: bool,

    /// Interpolation used when reusing lower-level grids
    #[arg(long, env = "INTERPOLATION", value_enum, default_value = "cubic")]
    pub interpolation: Interpolation,

    /// Only precompute each contest from its blank score
    #[arg(long, env = "BLANK_ONLY", default_value = "false")]
    pub blank_only: bool,

    /// Worker threads for grid evaluation (0 = one per core)
    #[arg(long, env = "THREADS", default_value = "0")]
    pub threads: usize,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.levels.is_empty() {
            anyhow::bail!("at least one level is required");
        }
        if self.grid_size < 2 {
            anyhow::bail!("grid_size must be at least 2");
        }
        if !(0.0..=1.0).contains(&self.grid_min) || !(0.0..=1.0).contains(&self.grid_max) {
            anyhow::bail!("grid_min and grid_max must be between 0.0 and 1.0");
        }
        if self.grid_min >= self.grid_max {
            anyhow::bail!("grid_min must be below grid_max");
        }
        if self.best_of == 0 || self.best_of % 2 == 0 {
            anyhow::bail!("best_of must be a positive odd number");
        }
        if self.set_length == 0 {
            anyhow::bail!("set_length must be at least 1");
        }
        self.format().validate()?;
        Ok(())
    }

    pub fn format(&self) -> MatchFormat {
        MatchFormat::best_of(self.best_of)
            .with_set_length(self.set_length)
            .with_set_ending(self.set_ending)
            .with_final_set_ending(self.final_set_ending)
            .with_no_ad(self.no_ad)
            .with_match_tiebreak(self.match_tiebreak)
    }

    pub fn precompute_options(&self) -> anyhow::Result<PrecomputeOptions> {
        Ok(PrecomputeOptions {
            spec: GridSpec::new(self.grid_min, self.grid_max, self.grid_size)?,
            blank_only: self.blank_only,
            method: self.interpolation,
        })
    }
}
