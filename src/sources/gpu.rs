use crate::exec::CommandRunner;
use crate::probe::Probe;

use super::{SECTION_SEPARATOR, VENDOR_TOOL_TIMEOUT};

const NVIDIA_QUERY: &str = "nvidia-smi --query-gpu=name,driver_version,memory.total,memory.used,utilization.gpu,temperature.gpu --format=csv,noheader 2>/dev/null";
const RADEON_DUMP: &str = "LC_ALL=en_US.UTF-8 radeontop -d - -l 1 2>/dev/null";

pub(super) async fn fetch(runner: &CommandRunner, probe: &Probe) -> String {
    if !probe.installed("lspci") {
        return "lspci utility not found\nPlease install the pciutils package".to_string();
    }

    let lspci = runner.run("lspci 2>/dev/null | grep -E 'VGA|3D'").await;
    if lspci.timed_out {
        return "lspci produced no output\nPlease check the pciutils installation".to_string();
    }

    let models = model_lines(&lspci.text);

    let nvidia = if probe.installed("nvidia-smi") {
        let output = runner.run_with_timeout(NVIDIA_QUERY, VENDOR_TOOL_TIMEOUT).await;
        if output.is_failure() || output.text.trim().is_empty() {
            Some("NVIDIA GPU: Data unavailable".to_string())
        } else {
            Some(nvidia_section(&output.text))
        }
    } else {
        None
    };

    let radeon = if probe.installed("radeontop") {
        let output = runner.run_with_timeout(RADEON_DUMP, VENDOR_TOOL_TIMEOUT).await;
        if output.is_failure() || output.text.trim().is_empty() {
            Some("AMD GPU: Data unavailable".to_string())
        } else {
            Some(radeon_section(&output.text))
        }
    } else {
        None
    };

    let report = assemble_report(&models, nvidia.as_deref(), radeon.as_deref());
    if report.is_empty() {
        "No GPU data found".to_string()
    } else {
        report
    }
}

fn model_lines(lspci: &str) -> Vec<String> {
    lspci
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("GPU Model: {}", line))
        .collect()
}

/// One labeled block per CSV line of the nvidia-smi query
fn nvidia_section(csv: &str) -> String {
    const LABELS: &[&str] = &[
        "Name",
        "Driver Version",
        "Memory Total",
        "Memory Used",
        "GPU Utilization",
        "Temperature",
    ];

    let mut blocks = Vec::new();
    for line in csv.lines().filter(|line| !line.trim().is_empty()) {
        let mut block = vec!["NVIDIA GPU Details:".to_string()];
        for (label, value) in LABELS.iter().zip(line.split(',')) {
            block.push(format!("{}: {}", label, value.trim()));
        }
        blocks.push(block.join("\n"));
    }
    blocks.join(&format!("\n{}\n", SECTION_SEPARATOR))
}

/// Labeled usage figures scanned from a one-shot radeontop dump
fn radeon_section(dump: &str) -> String {
    let mut lines = vec!["AMD GPU Details:".to_string()];

    for line in dump.lines() {
        if line.contains("Dumping to") {
            continue;
        }
        if line.contains("Unknown Radeon card") {
            lines.push(format!("Warning: {}", line));
            continue;
        }

        let mut tokens = line.split_whitespace();
        while let Some(token) = tokens.next() {
            let label = match token {
                "bus" => "Bus",
                "gpu" => "GPU Usage",
                "vram" => "VRAM Usage",
                "mclk" => "Memory Clock",
                "sclk" => "Shader Clock",
                _ => continue,
            };
            if let Some(value) = tokens.next() {
                lines.push(format!("{}: {}", label, value.trim_end_matches(',')));
            }
        }
    }

    lines.join("\n")
}

fn assemble_report(models: &[String], nvidia: Option<&str>, radeon: Option<&str>) -> String {
    let mut sections: Vec<String> = Vec::new();
    if !models.is_empty() {
        sections.push(models.join(&format!("\n{}\n", SECTION_SEPARATOR)));
    }
    if let Some(nvidia) = nvidia {
        sections.push(nvidia.to_string());
    }
    if let Some(radeon) = radeon {
        sections.push(radeon.to_string());
    }
    sections.join(&format!("\n{}\n", SECTION_SEPARATOR))
}
