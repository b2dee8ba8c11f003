use sha2::{Digest, Sha256};
use sysinfo::Networks;

/// Computes `hex(sha256("<sorted mac addresses>,<serial or empty>,<username>"))`,
/// matching the fingerprint the vendor's own client sends. Best-effort: any
/// component that cannot be determined is left empty rather than failing
/// the whole request.
pub fn device_fingerprint() -> String {
    let macs = sorted_mac_addresses().join(",");
    let serial = read_serial().unwrap_or_default();
    let username = current_username();

    let input = format!("{macs},{serial},{username}");
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

fn sorted_mac_addresses() -> Vec<String> {
    let networks = Networks::new_with_refreshed_list();
    let mut macs: Vec<String> = networks
        .values()
        .map(|n| n.mac_address().to_string())
        .filter(|m| m != "00:00:00:00:00:00")
        .collect();
    macs.sort();
    macs.dedup();
    macs
}

#[cfg(target_os = "linux")]
fn read_serial() -> Option<String> {
    std::fs::read_to_string("/sys/class/dmi/id/product_serial")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(not(target_os = "linux"))]
fn read_serial() -> Option<String> {
    None
}

fn current_username() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_for_same_inputs() {
        let mut hasher1 = Sha256::new();
        hasher1.update(b"aa:bb,serial1,alice");
        let digest1 = hex::encode(hasher1.finalize());

        let mut hasher2 = Sha256::new();
        hasher2.update(b"aa:bb,serial1,alice");
        let digest2 = hex::encode(hasher2.finalize());

        assert_eq!(digest1, digest2);
    }

    #[test]
    fn device_fingerprint_is_64_hex_chars() {
        let fp = device_fingerprint();
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
