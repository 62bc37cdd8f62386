//! Command-line arguments for the terminal binary.

use anyhow::{anyhow, Result};

use crate::core::EngineConfig;

pub const USAGE: &str = "\
usage: match3 [--size N] [--types K] [--seed S] [--instant]

  --size N     board edge length (3..=16, default 8)
  --types K    number of tile colours (3..=12, default 6)
  --seed S     RNG seed (default: clock)
  --instant    skip the pauses between cascade stages

Environment: MATCH3_BOARD_SIZE, MATCH3_TILE_TYPES, MATCH3_POINTS_PER_TILE,
MATCH3_SEED, MATCH3_INSTANT, MATCH3_LOG_PATH (default match3.log), RUST_LOG.";

/// Parsed command-line overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub size: Option<u8>,
    pub types: Option<u8>,
    pub seed: Option<u32>,
    pub instant: bool,
    pub help: bool,
}

impl CliArgs {
    /// Layer the overrides on top of `config`
    pub fn apply(&self, mut config: EngineConfig) -> EngineConfig {
        if let Some(size) = self.size {
            config.board_size = size;
        }
        if let Some(types) = self.types {
            config.tile_types = types;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if self.instant {
            config = config.instant();
        }
        config
    }
}

/// Parse arguments (without the program name)
pub fn parse_args(args: &[String]) -> Result<CliArgs> {
    fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
        args.get(i)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("missing value for {}", flag))
    }

    let mut out = CliArgs::default();
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--size" => {
                i += 1;
                let v = value(args, i, "--size")?;
                out.size = Some(
                    v.parse::<u8>()
                        .map_err(|_| anyhow!("invalid --size value: {}", v))?,
                );
            }
            "--types" => {
                i += 1;
                let v = value(args, i, "--types")?;
                out.types = Some(
                    v.parse::<u8>()
                        .map_err(|_| anyhow!("invalid --types value: {}", v))?,
                );
            }
            "--seed" => {
                i += 1;
                let v = value(args, i, "--seed")?;
                out.seed = Some(
                    v.parse::<u32>()
                        .map_err(|_| anyhow!("invalid --seed value: {}", v))?,
                );
            }
            "--instant" => out.instant = true,
            "-h" | "--help" => out.help = true,
            other => return Err(anyhow!("unknown argument: {}", other)),
        }
        i += 1;
    }

    Ok(out)
}
