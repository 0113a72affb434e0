use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, SketchError};
use crate::sketch::cell::Cell;

const MB: u64 = 1024 * 1024;
const GB: u64 = MB * 1024;

/// Grid shape. Fixed for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SketchConfig {
    /// Side length of each round's `width × width` plane.
    pub width: usize,
    /// Number of independent hash rounds.
    pub depth: usize,
    /// Distinct edges a cell keeps while tied at its minimal rank.
    pub conflict_limit: usize,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            depth: 5,
            conflict_limit: 3,
        }
    }
}

impl SketchConfig {
    pub fn new(width: usize, depth: usize, conflict_limit: usize) -> Result<Self> {
        let cfg = Self {
            width,
            depth,
            conflict_limit,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("width", self.width),
            ("depth", self.depth),
            ("conflict_limit", self.conflict_limit),
        ] {
            if value == 0 {
                return Err(SketchError::InvalidConfig { field, value });
            }
        }
        // the backing buffer must fit in isize::MAX bytes
        let addressable = self
            .cell_count()
            .and_then(|n| n.checked_mul(size_of::<Cell>()))
            .is_some_and(|bytes| bytes <= isize::MAX as usize);
        if !addressable {
            return Err(SketchError::GridTooLarge {
                depth: self.depth,
                width: self.width,
            });
        }
        Ok(())
    }

    fn cell_count(&self) -> Option<usize> {
        self.width
            .checked_mul(self.width)
            .and_then(|plane| plane.checked_mul(self.depth))
    }

    /// Exact for any validated config; saturates otherwise.
    #[inline]
    pub fn total_cells(&self) -> usize {
        self.cell_count().unwrap_or(usize::MAX)
    }

    /// Defaults overridden by `SKETCH_WIDTH`, `SKETCH_DEPTH`, `SKETCH_CONFLICT_LIMIT`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let cfg = Self {
            width: parse_var(&lookup, "SKETCH_WIDTH")?.unwrap_or(d.width),
            depth: parse_var(&lookup, "SKETCH_DEPTH")?.unwrap_or(d.depth),
            conflict_limit: parse_var(&lookup, "SKETCH_CONFLICT_LIMIT")?
                .unwrap_or(d.conflict_limit),
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Knobs for the in-process stream driver.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverConfig {
    pub batch_size: usize,
    pub poll_interval: Duration,
    /// Abort ingestion once resident memory exceeds this many bytes.
    pub memory_budget: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            poll_interval: Duration::from_secs(2),
            memory_budget: None,
        }
    }
}

impl DriverConfig {
    /// `SKETCH_BATCH_SIZE`, `SKETCH_POLL_MS`, `SKETCH_MAX_RSS_{BYTES,MB,GB}`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let batch_size = positive_var(&lookup, "SKETCH_BATCH_SIZE")?.unwrap_or(d.batch_size);
        let poll_interval = positive_var(&lookup, "SKETCH_POLL_MS")?
            .map(Duration::from_millis)
            .unwrap_or(d.poll_interval);

        // first unit that is set wins
        let bytes = positive_var::<u64, _>(&lookup, "SKETCH_MAX_RSS_BYTES")?;
        let mb = positive_var::<u64, _>(&lookup, "SKETCH_MAX_RSS_MB")?;
        let gb = positive_var::<u64, _>(&lookup, "SKETCH_MAX_RSS_GB")?;
        let memory_budget = bytes
            .or(mb.map(|v| v.saturating_mul(MB)))
            .or(gb.map(|v| v.saturating_mul(GB)));

        Ok(Self {
            batch_size,
            poll_interval,
            memory_budget,
        })
    }
}

/// Unset or blank means "use the default"; anything else must parse.
fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|_| SketchError::InvalidEnv {
        key,
        value: raw.to_string(),
    })
}

fn positive_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>>
where
    T: FromStr + Default + PartialEq + ToString,
    F: Fn(&str) -> Option<String>,
{
    match parse_var::<T, F>(lookup, key)? {
        Some(v) if v == T::default() => Err(SketchError::InvalidEnv {
            key,
            value: v.to_string(),
        }),
        v => Ok(v),
    }
}
