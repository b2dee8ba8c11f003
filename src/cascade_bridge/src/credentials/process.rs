use regex::Regex;
use sysinfo::System;

/// One running Windsurf language-server process, with the fields parsed
/// out of its command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LanguageServerProcess {
    pub pid: u32,
    pub csrf_token: String,
    pub extension_server_port: u16,
    pub version: String,
}

const BINARY_MARKERS: &[&str] = &[
    "language_server_macos",
    "language_server_linux",
    "language_server_windows",
    "language_server",
];

/// Enumerates running processes and returns every one whose command line
/// looks like the vendor's local language server binary.
pub fn enumerate_language_servers() -> Vec<LanguageServerProcess> {
    let mut system = System::new_all();
    system.refresh_all();

    let csrf_re = Regex::new(r"--csrf_token[= ]([A-Za-z0-9-]+)").unwrap();
    let port_re = Regex::new(r"--extension_server_port[= ](\d+)").unwrap();
    let version_re = Regex::new(r"--windsurf_version[= ]([^\s]+)").unwrap();

    let own_pid = std::process::id();
    let mut found = Vec::new();
    for (pid, process) in system.processes() {
        if pid.as_u32() == own_pid {
            continue;
        }
        let cmdline: Vec<String> = process
            .cmd()
            .iter()
            .map(|s| s.to_string_lossy().to_string())
            .collect();
        let joined = cmdline.join(" ");
        if !BINARY_MARKERS.iter().any(|m| joined.contains(m)) {
            continue;
        }
        let Some(csrf) = csrf_re.captures(&joined).and_then(|c| c.get(1)) else {
            continue;
        };
        let Some(port) = port_re
            .captures(&joined)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u16>().ok())
        else {
            continue;
        };
        let version = version_re
            .captures(&joined)
            .and_then(|c| c.get(1))
            .map(|m| strip_build_suffix(m.as_str()))
            .unwrap_or_else(|| "1.0.0".to_string());

        found.push(LanguageServerProcess {
            pid: pid.as_u32(),
            csrf_token: csrf.as_str().to_string(),
            extension_server_port: port,
            version,
        });
    }
    found
}

fn strip_build_suffix(version: &str) -> String {
    version.split('+').next().unwrap_or(version).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_build_suffix_removes_plus_segment() {
        assert_eq!(strip_build_suffix("1.2.3+build.45"), "1.2.3");
    }

    #[test]
    fn strip_build_suffix_passes_through_plain_version() {
        assert_eq!(strip_build_suffix("1.2.3"), "1.2.3");
    }
}
