use std::collections::HashSet;
use tracing::debug;

/// Finds the gRPC port the language server is listening on, given the
/// `--extension_server_port` advertised on its command line. The two ports
/// are not a fixed offset apart, so this inspects the OS socket tables.
pub fn discover_grpc_port(pid: u32, extension_server_port: u16) -> u16 {
    let listening = listening_ports_for_pid(pid);
    debug!(pid, ?listening, "candidate listening ports for language server");
    select_port(&listening, extension_server_port)
}

/// Picks the smallest listening port strictly greater than `ext_port`;
/// failing that, the smallest listening port; failing that, `ext_port + 3`
/// as a last resort matching observed vendor behavior.
fn select_port(listening: &[u16], ext_port: u16) -> u16 {
    if let Some(p) = listening.iter().filter(|&&p| p > ext_port).min() {
        return *p;
    }
    if let Some(p) = listening.iter().min() {
        return *p;
    }
    ext_port + 3
}

#[cfg(target_os = "linux")]
fn listening_ports_for_pid(pid: u32) -> Vec<u16> {
    let inodes = socket_inodes_for_pid(pid);
    if inodes.is_empty() {
        return Vec::new();
    }
    let mut ports = Vec::new();
    for path in ["/proc/net/tcp", "/proc/net/tcp6"] {
        if let Ok(contents) = std::fs::read_to_string(path) {
            ports.extend(parse_proc_net_tcp(&contents, &inodes));
        }
    }
    if ports.is_empty() {
        ports = ss_fallback(pid);
    }
    ports
}

#[cfg(target_os = "linux")]
fn socket_inodes_for_pid(pid: u32) -> HashSet<u64> {
    let mut inodes = HashSet::new();
    let fd_dir = format!("/proc/{}/fd", pid);
    let Ok(entries) = std::fs::read_dir(&fd_dir) else {
        return inodes;
    };
    for entry in entries.flatten() {
        if let Ok(target) = std::fs::read_link(entry.path()) {
            if let Some(name) = target.to_str() {
                if let Some(inode) = parse_socket_inode(name) {
                    inodes.insert(inode);
                }
            }
        }
    }
    inodes
}

fn parse_socket_inode(link_target: &str) -> Option<u64> {
    let inner = link_target.strip_prefix("socket:[")?.strip_suffix(']')?;
    inner.parse().ok()
}

/// Parses `/proc/net/tcp[6]` rows, returning the decoded local port for
/// every LISTEN (state `0A`) row whose inode is in `inodes`.
fn parse_proc_net_tcp(contents: &str, inodes: &HashSet<u64>) -> Vec<u16> {
    let mut ports = Vec::new();
    for line in contents.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 {
            continue;
        }
        let local_address = fields[1];
        let state = fields[3];
        let inode_field = fields[9];
        if state != "0A" {
            continue;
        }
        let Ok(inode) = inode_field.parse::<u64>() else {
            continue;
        };
        if !inodes.contains(&inode) {
            continue;
        }
        let Some(port_hex) = local_address.rsplit(':').next() else {
            continue;
        };
        if let Ok(port) = u16::from_str_radix(port_hex, 16) {
            ports.push(port);
        }
    }
    ports
}

#[cfg(target_os = "linux")]
fn ss_fallback(pid: u32) -> Vec<u16> {
    let Ok(output) = std::process::Command::new("ss").args(["-tlnp"]).output() else {
        return Vec::new();
    };
    let text = String::from_utf8_lossy(&output.stdout);
    let marker = format!("pid={}", pid);
    text.lines()
        .filter(|line| line.contains(&marker))
        .filter_map(|line| line.split_whitespace().nth(3))
        .filter_map(|addr| addr.rsplit(':').next())
        .filter_map(|p| p.parse::<u16>().ok())
        .collect()
}

#[cfg(target_os = "macos")]
fn listening_ports_for_pid(pid: u32) -> Vec<u16> {
    let Ok(output) = std::process::Command::new("lsof")
        .args(["-a", "-p", &pid.to_string(), "-i", "-P", "-n"])
        .output()
    else {
        return Vec::new();
    };
    let text = String::from_utf8_lossy(&output.stdout);
    text.lines()
        .filter(|line| line.contains("(LISTEN)"))
        .filter_map(|line| line.rsplit_once(':'))
        .filter_map(|(_, rest)| rest.split_whitespace().next())
        .filter_map(|p| p.parse::<u16>().ok())
        .collect()
}

#[cfg(target_os = "windows")]
fn listening_ports_for_pid(pid: u32) -> Vec<u16> {
    let Ok(output) = std::process::Command::new("netstat").args(["-ano"]).output() else {
        return Vec::new();
    };
    let text = String::from_utf8_lossy(&output.stdout);
    let marker = pid.to_string();
    text.lines()
        .filter(|line| line.contains("LISTENING") && line.trim_end().ends_with(marker.as_str()))
        .filter_map(|line| line.split_whitespace().nth(1))
        .filter_map(|addr| addr.rsplit(':').next())
        .filter_map(|p| p.parse::<u16>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_smallest_port_above_ext_port() {
        assert_eq!(select_port(&[3000, 3005, 4000], 3002), 3005);
    }

    #[test]
    fn falls_back_to_smallest_listening_port() {
        assert_eq!(select_port(&[2000, 2500], 3000), 2000);
    }

    #[test]
    fn falls_back_to_ext_port_plus_three_when_nothing_listening() {
        assert_eq!(select_port(&[], 3000), 3003);
    }

    #[test]
    fn parses_proc_net_tcp_listen_rows() {
        let contents = "\
  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 0100007F:1F40 00000000:0000 0A 00000000:00000000 00:00000000 00000000  1000        0 12345 1 0000000000000000 100 0 0 10 0
   1: 0100007F:1F41 00000000:0000 06 00000000:00000000 00:00000000 00000000  1000        0 12346 1 0000000000000000 100 0 0 10 0
";
        let mut inodes = HashSet::new();
        inodes.insert(12345);
        let ports = parse_proc_net_tcp(contents, &inodes);
        assert_eq!(ports, vec![0x1F40]);
    }

    #[test]
    fn parse_socket_inode_extracts_number() {
        assert_eq!(parse_socket_inode("socket:[98765]"), Some(98765));
        assert_eq!(parse_socket_inode("pipe:[1]"), None);
    }
}
