use std::path::PathBuf;

use nix::unistd::Uid;

/// Directories searched for diagnostic binaries
const SYSTEM_BIN_DIRS: &[&str] = &["/usr/sbin", "/usr/bin", "/sbin", "/bin"];

/// Availability and privilege predicates consulted before a diagnostic
/// command is attempted
#[derive(Debug, Clone)]
pub struct Probe {
    bin_dirs: Vec<PathBuf>,
    effective_root: bool,
}

impl Probe {
    /// Probe against the real system binary directories and effective uid
    pub fn system() -> Self {
        Self {
            bin_dirs: SYSTEM_BIN_DIRS.iter().map(PathBuf::from).collect(),
            effective_root: Uid::effective().is_root(),
        }
    }

    /// Probe with explicit directories and privilege state (for testing)
    #[cfg(test)]
    pub fn with_overrides(bin_dirs: Vec<PathBuf>, effective_root: bool) -> Self {
        Self {
            bin_dirs,
            effective_root,
        }
    }

    /// Whether `utility` exists in any of the probed binary directories
    pub fn installed(&self, utility: &str) -> bool {
        self.bin_dirs.iter().any(|dir| dir.join(utility).exists())
    }

    /// Whether the process runs with an effective uid of root
    pub fn is_root(&self) -> bool {
        self.effective_root
    }
}
