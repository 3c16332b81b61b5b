use std::fs;
use std::sync::Mutex;

use nix::sys::statvfs::statvfs;

use super::SECTION_SEPARATOR;

/// One `/proc/stat` CPU sample, reduced to the totals the delta needs
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CpuTicks {
    /// Sum of user, nice, system, idle, iowait, irq and softirq ticks
    pub total: u64,
    /// Idle plus iowait ticks
    pub idle: u64,
}

/// Parse the aggregate `cpu` line of `/proc/stat`
pub fn parse_cpu_line(line: &str) -> Option<CpuTicks> {
    let mut fields = line.split_whitespace();
    if fields.next()? != "cpu" {
        return None;
    }

    let values: Vec<u64> = fields.take(7).map(|v| v.parse().ok()).collect::<Option<_>>()?;
    if values.len() < 7 {
        return None;
    }

    Some(CpuTicks {
        total: values.iter().sum(),
        idle: values[3] + values[4],
    })
}

/// Delta-based CPU usage percentage between two samples.
///
/// Returns `None` when the counters went backwards or did not advance,
/// which happens on the very first sample of a freshly booted counter or
/// after a wrap.
pub fn cpu_percent(prev: CpuTicks, current: CpuTicks) -> Option<f64> {
    let delta_total = current.total.checked_sub(prev.total)?;
    let delta_idle = current.idle.checked_sub(prev.idle)?;
    if delta_total == 0 || delta_idle > delta_total {
        return None;
    }
    Some((delta_total - delta_idle) as f64 * 100.0 / delta_total as f64)
}

/// Memory usage percentage from `/proc/meminfo` text
pub fn memory_percent(meminfo: &str) -> Option<f64> {
    let mut total = None;
    let mut available = None;
    for line in meminfo.lines() {
        if line.starts_with("MemTotal:") {
            total = meminfo_kb(line);
        } else if line.starts_with("MemAvailable:") {
            available = meminfo_kb(line);
        }
    }

    let total = total.filter(|t| *t > 0)?;
    let available = available?;
    Some((total.saturating_sub(available)) as f64 * 100.0 / total as f64)
}

fn meminfo_kb(line: &str) -> Option<u64> {
    line.split_whitespace().nth(1)?.parse().ok()
}

/// RX/TX byte counters for one `/proc/net/dev` line, physical
/// ethernet/wireless interfaces only
pub fn parse_net_dev_line(line: &str) -> Option<(String, u64, u64)> {
    let (name, counters) = line.split_once(':')?;
    let name = name.trim();
    if !name.starts_with("enp") && !name.starts_with("wlp") {
        return None;
    }

    let fields: Vec<&str> = counters.split_whitespace().collect();
    // Receive bytes is the first column, transmit bytes the ninth.
    let rx = fields.first()?.parse().ok()?;
    let tx = fields.get(8)?.parse().ok()?;
    Some((name.to_string(), rx, tx))
}

/// Build the System Usage report. Reads `/proc` directly and queries the
/// root volume; no subprocess is involved.
pub(super) fn fetch(ticks: &Mutex<CpuTicks>) -> String {
    let mut lines: Vec<String> = Vec::new();

    match fs::read_to_string("/proc/stat") {
        Ok(stat) => {
            lines.push(cpu_usage_line(ticks, &stat));
            lines.push(SECTION_SEPARATOR.to_string());
        }
        Err(_) => return "Cannot open /proc/stat".to_string(),
    }

    match fs::read_to_string("/proc/meminfo") {
        Ok(meminfo) => {
            match memory_percent(&meminfo) {
                Some(pct) => lines.push(format!("Memory Usage: {:.2}%", pct)),
                None => lines.push("Memory Usage: unavailable".to_string()),
            }
            lines.push(SECTION_SEPARATOR.to_string());
        }
        Err(_) => return "Cannot open /proc/meminfo".to_string(),
    }

    lines.push(root_disk_line());
    lines.push(SECTION_SEPARATOR.to_string());

    match fs::read_to_string("/proc/net/dev") {
        Ok(netdev) => {
            for line in netdev.lines() {
                if let Some((iface, rx, tx)) = parse_net_dev_line(line) {
                    lines.push(format!("Network ({}):", iface));
                    lines.push(format!("RX: {} bytes", rx));
                    lines.push(format!("TX: {} bytes", tx));
                    lines.push(SECTION_SEPARATOR.to_string());
                }
            }
        }
        Err(_) => return "Cannot open /proc/net/dev".to_string(),
    }

    lines.join("\n")
}

fn cpu_usage_line(ticks: &Mutex<CpuTicks>, stat: &str) -> String {
    let current = stat.lines().next().and_then(parse_cpu_line);

    let Some(current) = current else {
        return "CPU Usage: unavailable".to_string();
    };

    let mut prev = ticks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let pct = cpu_percent(*prev, current);
    *prev = current;

    match pct {
        Some(pct) => format!("CPU Usage: {:.2}%", pct),
        None => "CPU Usage: unavailable".to_string(),
    }
}

fn root_disk_line() -> String {
    match statvfs("/") {
        Ok(stat) => {
            let total = stat.blocks() as f64 * stat.fragment_size() as f64;
            let free = stat.blocks_free() as f64 * stat.fragment_size() as f64;
            if total > 0.0 {
                format!("Disk Usage (/): {:.2}%", (total - free) * 100.0 / total)
            } else {
                "Disk Usage (/): unavailable".to_string()
            }
        }
        Err(_) => "Disk Usage (/): unavailable".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cpu_line() {
        let ticks = parse_cpu_line("cpu 100 0 50 800 10 0 0 0 0 0").unwrap();
        assert_eq!(ticks.total, 960);
        assert_eq!(ticks.idle, 810);
    }

    #[test]
    fn test_parse_cpu_line_rejects_per_core_lines() {
        assert!(parse_cpu_line("cpu0 100 0 50 800 10 0 0").is_none());
        assert!(parse_cpu_line("intr 12345").is_none());
        assert!(parse_cpu_line("").is_none());
    }

    #[test]
    fn test_parse_cpu_line_requires_seven_fields() {
        assert!(parse_cpu_line("cpu 100 0 50").is_none());
    }

    #[test]
    fn test_cpu_percent_is_delta_based() {
        let first = parse_cpu_line("cpu 100 0 50 800 10 0 0").unwrap();
        let second = parse_cpu_line("cpu 150 0 70 820 15 0 0").unwrap();

        // Busy delta is 70 ticks of a 95-tick window.
        let pct = cpu_percent(first, second).unwrap();
        assert!((pct - 7000.0 / 95.0).abs() < 1e-9);
    }

    #[test]
    fn test_cpu_percent_rejects_stagnant_or_regressing_counters() {
        let sample = parse_cpu_line("cpu 100 0 50 800 10 0 0").unwrap();
        assert!(cpu_percent(sample, sample).is_none());

        let earlier = parse_cpu_line("cpu 90 0 40 700 10 0 0").unwrap();
        assert!(cpu_percent(sample, earlier).is_none());
    }

    #[test]
    fn test_memory_percent() {
        let meminfo = "MemTotal:       16000000 kB\n\
                       MemFree:         2000000 kB\n\
                       MemAvailable:    8000000 kB\n\
                       Buffers:          500000 kB\n";

        let pct = memory_percent(meminfo).unwrap();
        assert!((pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_memory_percent_missing_fields() {
        assert!(memory_percent("MemFree: 100 kB\n").is_none());
        assert!(memory_percent("").is_none());
    }

    #[test]
    fn test_parse_net_dev_line() {
        let line = "enp3s0: 123456    987    0    0    0     0          0      1000 654321     456    0    0    0     0       0          0";
        let (iface, rx, tx) = parse_net_dev_line(line).unwrap();
        assert_eq!(iface, "enp3s0");
        assert_eq!(rx, 123456);
        assert_eq!(tx, 654321);
    }

    #[test]
    fn test_parse_net_dev_line_skips_other_interfaces() {
        let lo = "    lo: 100 1 0 0 0 0 0 0 100 1 0 0 0 0 0 0";
        assert!(parse_net_dev_line(lo).is_none());

        let docker = "docker0: 100 1 0 0 0 0 0 0 100 1 0 0 0 0 0 0";
        assert!(parse_net_dev_line(docker).is_none());

        let header = "Inter-|   Receive";
        assert!(parse_net_dev_line(header).is_none());
    }

    #[test]
    fn test_fetch_keeps_delta_state_between_calls() {
        // Two consecutive fetches must not report the same absolute ratio:
        // the second call sees the stored counters from the first.
        let ticks = Mutex::new(CpuTicks::default());

        let first = cpu_usage_line(&ticks, "cpu 100 0 50 800 10 0 0\n");
        assert!(first.starts_with("CPU Usage:"));

        let stored = *ticks.lock().unwrap();
        assert_eq!(stored.total, 960);
        assert_eq!(stored.idle, 810);

        let second = cpu_usage_line(&ticks, "cpu 150 0 70 820 15 0 0\n");
        assert_eq!(second, format!("CPU Usage: {:.2}%", 7000.0 / 95.0));
    }
}
