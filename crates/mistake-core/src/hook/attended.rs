//! Is anyone watching, and is anyone already debugging us

use std::io::IsTerminal;

/// A person is at the terminal: stdin, stdout and stderr are all terminals
pub fn is_attended() -> bool {
    std::io::stdin().is_terminal()
        && std::io::stdout().is_terminal()
        && std::io::stderr().is_terminal()
}

/// Pull `TracerPid` out of `/proc/<pid>/status` text
pub fn parse_tracer_pid(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("TracerPid:"))
        .and_then(|value| value.trim().parse().ok())
}

/// Pid of the process tracing us, if any
pub fn tracer_pid() -> Option<u32> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    parse_tracer_pid(&status).filter(|pid| *pid != 0)
}

/// Whether a debugger is already attached
pub fn is_traced() -> bool {
    tracer_pid().is_some()
}

/// Facts about the session the hook is installed into
#[derive(Debug, Clone, Copy)]
pub struct HookEnvironment {
    pub attended: bool,
    /// Checked at panic time; a debugger may attach after install
    pub is_traced: fn() -> bool,
}

impl HookEnvironment {
    pub fn detect() -> Self {
        Self {
            attended: is_attended(),
            is_traced,
        }
    }

    /// An attended session that is never traced
    pub fn attended() -> Self {
        Self {
            attended: true,
            is_traced: || false,
        }
    }

    pub fn unattended() -> Self {
        Self {
            attended: false,
            is_traced: || false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS: &str = "Name:\tdemo\n\
                          State:\tS (sleeping)\n\
                          Tgid:\t812\n\
                          Pid:\t812\n\
                          PPid:\t700\n\
                          TracerPid:\t%\n\
                          Uid:\t1000\t1000\t1000\t1000\n";

    #[test]
    fn test_parse_tracer_pid() {
        assert_eq!(parse_tracer_pid(&STATUS.replace('%', "0")), Some(0));
        assert_eq!(parse_tracer_pid(&STATUS.replace('%', "4411")), Some(4411));
        assert_eq!(parse_tracer_pid("Name:\tdemo\n"), None);
    }

    #[test]
    fn test_environment_constructors() {
        let env = HookEnvironment::attended();
        assert!(env.attended);
        assert!(!(env.is_traced)());
        assert!(!HookEnvironment::unattended().attended);
    }
}
