use crate::exec::CommandRunner;
use crate::probe::Probe;

use super::SECTION_SEPARATOR;

pub(super) async fn fetch(runner: &CommandRunner, probe: &Probe) -> String {
    if !probe.installed("lsblk") {
        return "lsblk utility not found\nPlease install the util-linux package".to_string();
    }

    let output = runner.run("lsblk -d -o NAME,SIZE,MODEL 2>/dev/null").await;
    if output.is_failure() {
        return "lsblk produced no output\nPlease check the util-linux installation".to_string();
    }

    let report = device_list(&output.text);
    if report.is_empty() {
        "No disk data found".to_string()
    } else {
        report
    }
}

/// Drop the header row and separate the remaining devices
fn device_list(raw: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in raw.lines() {
        if line.contains("NAME") || line.trim().is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(SECTION_SEPARATOR);
        }
        lines.push(line);
    }
    lines.join("\n")
}
