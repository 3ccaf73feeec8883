use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upper bound for any window length, in trading days (about 40 years).
pub const MAX_WINDOW_DAYS: usize = 10_000;

/// Typed parameters for one study run.
///
/// Passed explicitly to every stage; there is no process-wide default state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub pre_days: usize,
    pub post_days: usize,
    pub baseline_window: usize,
    pub min_n: usize,
    pub alpha: f64,
    /// Keep only the most recent N events (after sorting by date). `None` keeps all.
    pub event_tail: Option<usize>,
    /// Pre/post observation count for the correlation-delta panel.
    pub corr_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pre_days: 5,
            post_days: 5,
            baseline_window: 20,
            min_n: 5,
            alpha: 0.05,
            event_tail: None,
            corr_window: 20,
        }
    }
}

impl EngineConfig {
    /// Read from merged config JSON. Absent keys keep their defaults.
    ///
    /// Numbers may be given as YAML numbers or numeric strings. Anything out of
    /// range is a `CONFIG_INVALID` error naming the key.
    pub fn from_config_json(cfg: &Value) -> Result<Self> {
        let d = Self::default();

        let pre_days = read_count(cfg, "/windows/pre_days", d.pre_days, 1, MAX_WINDOW_DAYS)?;
        let post_days = read_count(cfg, "/windows/post_days", d.post_days, 1, MAX_WINDOW_DAYS)?;
        let baseline_window =
            read_count(cfg, "/impact/baseline_window", d.baseline_window, 1, MAX_WINDOW_DAYS)?;
        let min_n = read_count(cfg, "/testing/min_n", d.min_n, 2, usize::MAX)?;
        let corr_window = read_count(cfg, "/corr/window", d.corr_window, 2, MAX_WINDOW_DAYS)?;

        let alpha = match cfg.pointer("/testing/alpha") {
            None | Some(Value::Null) => d.alpha,
            Some(v) => as_f64(v).ok_or_else(|| invalid("/testing/alpha", v, "a number"))?,
        };
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(anyhow!(
                "CONFIG_INVALID key=/testing/alpha: must be in (0, 1), got {alpha}"
            ));
        }

        let event_tail = match cfg.pointer("/events/tail") {
            None | Some(Value::Null) => None,
            Some(_) => Some(read_count(cfg, "/events/tail", 0, 1, usize::MAX)?),
        };

        Ok(Self {
            pre_days,
            post_days,
            baseline_window,
            min_n,
            alpha,
            event_tail,
            corr_window,
        })
    }
}

fn read_count(cfg: &Value, ptr: &str, default: usize, min: usize, max: usize) -> Result<usize> {
    let v = match cfg.pointer(ptr) {
        None | Some(Value::Null) => return Ok(default),
        Some(v) => v,
    };
    let n = as_u64(v).ok_or_else(|| invalid(ptr, v, "a non-negative integer"))?;
    let n = usize::try_from(n).map_err(|_| invalid(ptr, v, "a non-negative integer"))?;
    if n < min {
        return Err(anyhow!("CONFIG_INVALID key={ptr}: must be >= {min}, got {n}"));
    }
    if n > max {
        return Err(anyhow!("CONFIG_INVALID key={ptr}: must be <= {max}, got {n}"));
    }
    Ok(n)
}

fn as_u64(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn invalid(ptr: &str, v: &Value, expected: &str) -> anyhow::Error {
    anyhow!("CONFIG_INVALID key={ptr}: expected {expected}, got {v}")
}
