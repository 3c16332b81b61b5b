use crate::exec::CommandRunner;
use crate::probe::Probe;

use super::SECTION_SEPARATOR;

pub(super) async fn fetch(runner: &CommandRunner, probe: &Probe) -> String {
    if !probe.installed("ip") {
        return "ip utility not found\nPlease install the iproute package".to_string();
    }

    let output = runner.run("ip -br link 2>/dev/null").await;
    if output.is_failure() {
        return "ip produced no output\nPlease check the iproute installation".to_string();
    }

    let mut lines = adapter_lines(&output.text);

    if probe.installed("bluetoothctl") {
        let bt = runner.run("bluetoothctl show 2>/dev/null").await;
        if !bt.is_failure() && bt.text.contains("Controller") {
            lines.push("Bluetooth: Enabled".to_string());
        } else {
            lines.push("Bluetooth: Disabled or not found".to_string());
        }
    } else {
        lines.push("Bluetooth: bluetoothctl not found".to_string());
    }

    lines.join("\n")
}

/// Adapter/state pairs for physical ethernet and wireless interfaces
fn adapter_lines(raw: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for line in raw.lines() {
        let mut fields = line.split_whitespace();
        let (Some(iface), Some(state)) = (fields.next(), fields.next()) else {
            continue;
        };
        if !iface.starts_with("enp") && !iface.starts_with("wlp") {
            continue;
        }
        lines.push(format!("Adapter: {}", iface));
        lines.push(format!("State: {}", state));
        lines.push(SECTION_SEPARATOR.to_string());
    }
    lines
}
