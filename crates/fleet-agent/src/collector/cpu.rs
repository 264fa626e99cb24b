//! CPU usage sampling from `/proc/stat`, matching the original's
//! `CollectCpuUsage()`: parse the aggregate `cpu` line, compute
//! `1 - Δidle/Δtotal` where `total = user + system + idle` (`nice` is
//! excluded by design), and keep a fixed-size moving average.

use std::collections::VecDeque;
use std::sync::Mutex;

use tracing::warn;

const WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
struct RawSample {
    user: u64,
    system: u64,
    idle: u64,
}

pub struct CpuSampler {
    last: Mutex<Option<RawSample>>,
    window: Mutex<VecDeque<f64>>,
}

impl CpuSampler {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(None),
            window: Mutex::new(VecDeque::with_capacity(WINDOW)),
        }
    }

    /// Reads `/proc/stat`, folds in one more sample, and returns the
    /// current moving average. Returns the prior average (or `0.0` before
    /// the first pair of samples) if the read or parse fails.
    pub fn sample(&self) -> f64 {
        match read_proc_stat() {
            Ok(raw) => self.push(raw),
            Err(e) => {
                warn!(error = %e, "failed to read /proc/stat");
                self.average()
            }
        }
    }

    fn push(&self, raw: RawSample) -> f64 {
        let mut last = self.last.lock().unwrap();
        if let Some(prev) = *last {
            let total_prev = prev.user + prev.system + prev.idle;
            let total_now = raw.user + raw.system + raw.idle;
            let d_total = total_now.saturating_sub(total_prev);
            let d_idle = raw.idle.saturating_sub(prev.idle);
            if d_total > 0 {
                let usage = 1.0 - (d_idle as f64 / d_total as f64);
                let mut window = self.window.lock().unwrap();
                if window.len() == WINDOW {
                    window.pop_front();
                }
                window.push_back(usage);
            }
        }
        *last = Some(raw);
        self.average()
    }

    fn average(&self) -> f64 {
        let window = self.window.lock().unwrap();
        if window.is_empty() {
            return 0.0;
        }
        window.iter().sum::<f64>() / window.len() as f64
    }
}

impl Default for CpuSampler {
    fn default() -> Self {
        Self::new()
    }
}

fn read_proc_stat() -> std::io::Result<RawSample> {
    let contents = std::fs::read_to_string("/proc/stat")?;
    let first_line = contents
        .lines()
        .next()
        .ok_or_else(|| std::io::Error::other("empty /proc/stat"))?;
    parse_cpu_line(first_line)
        .ok_or_else(|| std::io::Error::other("malformed cpu line in /proc/stat"))
}

fn parse_cpu_line(line: &str) -> Option<RawSample> {
    let mut fields = line.split_whitespace();
    if fields.next()? != "cpu" {
        return None;
    }
    let user: u64 = fields.next()?.parse().ok()?;
    let _nice: u64 = fields.next()?.parse().ok()?;
    let system: u64 = fields.next()?.parse().ok()?;
    let idle: u64 = fields.next()?.parse().ok()?;
    Some(RawSample { user, system, idle })
}
