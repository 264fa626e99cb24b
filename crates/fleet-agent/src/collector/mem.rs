//! Memory usage from `/proc/meminfo`, matching the original's
//! `GetMemoryUsage()`: `1 - MemAvailable/MemTotal`, parsed fresh on every
//! call (no moving average, unlike CPU).

pub fn sample() -> std::io::Result<f64> {
    let contents = std::fs::read_to_string("/proc/meminfo")?;
    let mut total = None;
    let mut available = None;
    for line in contents.lines() {
        if let Some(rest) = line.strip_prefix("MemTotal:") {
            total = parse_kb(rest);
        } else if let Some(rest) = line.strip_prefix("MemAvailable:") {
            available = parse_kb(rest);
        }
    }
    match (total, available) {
        (Some(total), Some(available)) if total > 0.0 => Ok(1.0 - available / total),
        _ => Err(std::io::Error::other(
            "missing MemTotal/MemAvailable in /proc/meminfo",
        )),
    }
}

fn parse_kb(field: &str) -> Option<f64> {
    field.trim().split_whitespace().next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(contents: &str) -> std::io::Result<f64> {
        let mut total = None;
        let mut available = None;
        for line in contents.lines() {
            if let Some(rest) = line.strip_prefix("MemTotal:") {
                total = parse_kb(rest);
            } else if let Some(rest) = line.strip_prefix("MemAvailable:") {
                available = parse_kb(rest);
            }
        }
        match (total, available) {
            (Some(total), Some(available)) if total > 0.0 => Ok(1.0 - available / total),
            _ => Err(std::io::Error::other("missing fields")),
        }
    }

    #[test]
    fn computes_used_fraction() {
        let contents = "MemTotal:       1000000 kB\nMemFree:         100000 kB\nMemAvailable:    400000 kB\n";
        let used = parse(contents).unwrap();
        assert!((used - 0.6).abs() < 1e-9);
    }

    #[test]
    fn missing_field_is_an_error() {
        let contents = "MemTotal:       1000000 kB\n";
        assert!(parse(contents).is_err());
    }
}
