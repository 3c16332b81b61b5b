use crate::exec::CommandRunner;
use crate::probe::Probe;

use super::SECTION_SEPARATOR;

const FIELDS: &[&str] = &["Size:", "Type:", "Speed:", "Manufacturer:", "Part Number:"];

pub(super) async fn fetch(runner: &CommandRunner, probe: &Probe) -> String {
    if !probe.is_root() {
        return "dmidecode requires root privileges\nRun with sudo for full information"
            .to_string();
    }
    if !probe.installed("dmidecode") {
        return "dmidecode utility not found\nPlease install the dmidecode package".to_string();
    }

    let output = runner.run("dmidecode -t memory 2>/dev/null").await;
    if output.is_failure() {
        return "dmidecode produced no output\nPlease check the dmidecode installation"
            .to_string();
    }

    let report = filter_memory_devices(&output.text);
    if report.is_empty() {
        "No memory data found".to_string()
    } else {
        report
    }
}

/// Keep the interesting fields of each `Memory Device` block, with a
/// separator between modules.
fn filter_memory_devices(raw: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut in_device = false;

    for line in raw.lines() {
        if line.contains("Memory Device") {
            if in_device {
                lines.push(SECTION_SEPARATOR.to_string());
            }
            in_device = true;
            continue;
        }
        if in_device && FIELDS.iter().any(|field| line.contains(field)) {
            lines.push(line.trim_start().to_string());
        }
    }

    lines.join("\n")
}
