use crate::exec::CommandRunner;
use crate::probe::Probe;

const FIELDS: &[&str] = &[
    "Model name:",
    "CPU(s):",
    "Thread(s) per core:",
    "Core(s) per socket:",
    "Socket(s):",
    "CPU MHz:",
];

pub(super) async fn fetch(runner: &CommandRunner, probe: &Probe) -> String {
    if !probe.installed("lscpu") {
        return "lscpu utility not found\nPlease install the util-linux package".to_string();
    }

    let output = runner.run("lscpu 2>/dev/null").await;
    if output.is_failure() {
        return "lscpu produced no output\nPlease check the util-linux installation".to_string();
    }

    let report = filter_lscpu(&output.text);
    if report.is_empty() {
        "No CPU data found".to_string()
    } else {
        report
    }
}

fn filter_lscpu(raw: &str) -> String {
    raw.lines()
        .filter(|line| FIELDS.iter().any(|field| line.contains(field)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LSCPU_OUTPUT: &str = "\
Architecture:        x86_64
CPU op-mode(s):      32-bit, 64-bit
CPU(s):              16
Thread(s) per core:  2
Core(s) per socket:  8
Socket(s):           1
Model name:          AMD Ryzen 7 5800X 8-Core Processor
CPU MHz:             3800.000
L3 cache:            32 MiB";

    #[test]
    fn test_filter_keeps_expected_fields() {
        let report = filter_lscpu(LSCPU_OUTPUT);

        assert!(report.contains("Model name:"));
        assert!(report.contains("CPU(s):              16"));
        assert!(report.contains("Thread(s) per core:"));
        assert!(report.contains("Core(s) per socket:"));
        assert!(report.contains("Socket(s):"));
        assert!(report.contains("CPU MHz:"));
        assert!(!report.contains("Architecture"));
        assert!(!report.contains("L3 cache"));
    }

    #[test]
    fn test_filter_with_no_matching_lines() {
        assert!(filter_lscpu("Architecture: riscv64\n").is_empty());
        assert!(filter_lscpu("").is_empty());
    }
}
