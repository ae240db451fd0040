//! Mount table parsing.

use std::collections::BTreeSet;

use serde::Serialize;

/// Kernel mount table read by the mount-point module.
pub const MOUNT_TABLE: &str = "/proc/mounts";

/// One mount table record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountPoint {
    pub device: String,
    pub mountpoint: String,
    pub filesystem: String,
    pub options: BTreeSet<String>,
}

impl MountPoint {
    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.contains(option)
    }

    /// Requested options that are not set, in the order given.
    #[must_use]
    pub fn missing_options<'a>(&self, wanted: &'a [String]) -> Vec<&'a str> {
        wanted
            .iter()
            .filter(|o| !self.has_option(o))
            .map(String::as_str)
            .collect()
    }
}

/// Parse `/proc/mounts` (fstab format). Malformed lines are skipped.
#[must_use]
pub fn parse_mounts(table: &str) -> Vec<MountPoint> {
    table
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let device = fields.next()?;
            let mountpoint = fields.next()?;
            let filesystem = fields.next()?;
            let options = fields.next()?;
            Some(MountPoint {
                device: unescape(device),
                mountpoint: unescape(mountpoint),
                filesystem: filesystem.to_string(),
                options: options.split(',').map(str::to_string).collect(),
            })
        })
        .collect()
}

/// Find the effective mount at `path`. Later entries shadow earlier ones.
#[must_use]
pub fn find_mount<'a>(mounts: &'a [MountPoint], path: &str) -> Option<&'a MountPoint> {
    let path = normalize(path);
    mounts.iter().rev().find(|m| m.mountpoint == path)
}

fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

/// Decode the octal escapes (`\040` etc.) the kernel uses for whitespace.
fn unescape(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            if let Some(value) = bytes.get(i + 1..i + 4).and_then(octal_byte) {
                out.push(value);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn octal_byte(digits: &[u8]) -> Option<u8> {
    digits.iter().try_fold(0u32, |acc, d| match d {
        b'0'..=b'7' => Some(acc * 8 + u32::from(d - b'0')),
        _ => None,
    })
    .and_then(|v| u8::try_from(v).ok())
}
