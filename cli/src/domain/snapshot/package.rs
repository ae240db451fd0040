//! Package snapshot and per-manager query translation.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::exec::{ExecOutput, shell_quote};

/// Platform package database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Rpm,
    Dpkg,
    Apk,
    Pacman,
}

impl PackageManager {
    /// Probe order for auto-detection. `dpkg-query` comes before `rpm`
    /// because Debian hosts sometimes carry the `rpm` tool.
    pub const DETECTION_ORDER: [Self; 4] = [Self::Dpkg, Self::Apk, Self::Pacman, Self::Rpm];

    /// The binary whose presence identifies this manager.
    #[must_use]
    pub fn query_program(self) -> &'static str {
        match self {
            Self::Rpm => "rpm",
            Self::Dpkg => "dpkg-query",
            Self::Apk => "apk",
            Self::Pacman => "pacman",
        }
    }

    /// Read-only query command for one package.
    #[must_use]
    pub fn query_command(self, name: &str) -> String {
        let name = shell_quote(name);
        match self {
            Self::Rpm => format!("rpm -q --queryformat '%{{VERSION}}-%{{RELEASE}}\\n' {name}"),
            Self::Dpkg => format!("dpkg-query -W -f '${{Status}}|${{Version}}\\n' {name}"),
            Self::Apk => format!("apk info -ve {name}"),
            Self::Pacman => format!("pacman -Q {name}"),
        }
    }

    /// Interpret the query output. A non-zero exit is a valid "absent" result.
    #[must_use]
    pub fn parse_query(self, name: &str, output: &ExecOutput) -> PackageSnapshot {
        let stdout = output.stdout_lossy();
        let first = stdout.lines().next().unwrap_or_default().trim();

        let (state, version) = if output.success() && !first.is_empty() {
            match self {
                Self::Rpm => (PackageState::Installed, Some(first.to_string())),
                Self::Dpkg => parse_dpkg_status(first),
                Self::Apk => (
                    PackageState::Installed,
                    first
                        .strip_prefix(name)
                        .and_then(|v| v.strip_prefix('-'))
                        .map(str::to_string),
                ),
                Self::Pacman => (
                    PackageState::Installed,
                    first.split_whitespace().nth(1).map(str::to_string),
                ),
            }
        } else {
            (PackageState::Absent, None)
        };

        PackageSnapshot {
            name: name.to_string(),
            manager: self,
            state,
            version,
            exit_code: output.exit_code,
        }
    }

    /// Pick the first manager whose program appears in `command -v` output.
    #[must_use]
    pub fn detect(command_v_output: &str) -> Option<Self> {
        let found: Vec<&str> = command_v_output
            .lines()
            .map(|l| l.trim().rsplit('/').next().unwrap_or_default())
            .collect();
        Self::DETECTION_ORDER
            .into_iter()
            .find(|m| found.contains(&m.query_program()))
    }

    /// Shell snippet listing which query programs exist.
    #[must_use]
    pub fn detection_command() -> String {
        let programs: Vec<&str> = Self::DETECTION_ORDER
            .iter()
            .map(|m| m.query_program())
            .collect();
        format!("command -v {} || true", programs.join(" "))
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rpm => "rpm",
            Self::Dpkg => "dpkg",
            Self::Apk => "apk",
            Self::Pacman => "pacman",
        })
    }
}

impl FromStr for PackageManager {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rpm" => Ok(Self::Rpm),
            "dpkg" | "deb" => Ok(Self::Dpkg),
            "apk" => Ok(Self::Apk),
            "pacman" => Ok(Self::Pacman),
            other => Err(format!("unknown package manager '{other}'")),
        }
    }
}

/// Installation state as recorded by the package database.
///
/// `Partial` keeps "known to the database but not fully installed" (e.g. dpkg
/// `config-files`) apart from `Absent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageState {
    Installed,
    Partial,
    Absent,
}

/// Package state at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageSnapshot {
    pub name: String,
    pub manager: PackageManager,
    pub state: PackageState,
    pub version: Option<String>,
    /// Exit code of the query command; non-zero for absent packages.
    pub exit_code: i32,
}

impl PackageSnapshot {
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.state == PackageState::Installed
    }
}

fn parse_dpkg_status(line: &str) -> (PackageState, Option<String>) {
    let (status, version) = line.split_once('|').unwrap_or((line, ""));
    let version = Some(version.trim().to_string()).filter(|v| !v.is_empty());
    match status.split_whitespace().last() {
        Some("installed") => (PackageState::Installed, version),
        Some("not-installed") | None => (PackageState::Absent, None),
        Some(_) => (PackageState::Partial, version),
    }
}
