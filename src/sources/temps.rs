use crate::exec::CommandRunner;
use crate::probe::Probe;

use super::SECTION_SEPARATOR;

pub(super) async fn fetch(runner: &CommandRunner, probe: &Probe) -> String {
    if !probe.installed("sensors") {
        return "sensors utility not found\nPlease install lm_sensors and run 'sudo sensors-detect'"
            .to_string();
    }

    let output = runner.run("sensors 2>/dev/null").await;
    if output.is_failure() {
        return "sensors produced no output\nRun 'sudo sensors-detect' to configure sensors"
            .to_string();
    }

    let report = sectioned(&output.text);
    if report.is_empty() {
        "No temperature data found\nRun 'sudo sensors-detect' to configure sensors".to_string()
    } else {
        report
    }
}

/// Pass sensor output through, inserting a separator at each blank line
/// (sensors prints one chip per paragraph).
fn sectioned(raw: &str) -> String {
    let mut lines = Vec::new();
    for line in raw.lines() {
        if line.is_empty() {
            lines.push(SECTION_SEPARATOR);
        } else {
            lines.push(line);
        }
    }
    lines.join("\n")
}
