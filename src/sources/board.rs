use crate::exec::CommandRunner;
use crate::probe::Probe;

pub(super) async fn fetch(runner: &CommandRunner, probe: &Probe) -> String {
    if !probe.is_root() {
        return "dmidecode requires root privileges\nRun with sudo for full information"
            .to_string();
    }
    if !probe.installed("dmidecode") {
        return "dmidecode utility not found\nPlease install the dmidecode package".to_string();
    }

    let output = runner.run("dmidecode -t baseboard 2>/dev/null").await;
    if output.is_failure() {
        return "dmidecode produced no output\nPlease check the dmidecode installation"
            .to_string();
    }

    if output.text.trim().is_empty() {
        "No motherboard data found".to_string()
    } else {
        output.text
    }
}
