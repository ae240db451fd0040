//! Declarative check suite schema, loading and validation.
//!
//! Pure functions only; the suite text and environment lookup are passed in.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::domain::error::SuiteError;
use crate::domain::exec::parse_mode;

#[allow(clippy::expect_used)] // literal pattern
static VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").expect("valid regex")
});

// ── Schema ────────────────────────────────────────────────────────────────────

/// A check suite document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Suite {
    #[serde(default)]
    pub checks: Vec<CheckSpec>,
}

/// One declared check.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Unconditional skip; the reason is reported verbatim.
    #[serde(default)]
    pub skip: Option<String>,
    /// Feature flags that must be enabled, otherwise the check is skipped.
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default, rename = "assert")]
    pub assertions: Vec<AssertionSpec>,
}

/// One expectation about one resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "resource", rename_all = "snake_case")]
pub enum AssertionSpec {
    File(FileExpect),
    Package(PackageExpect),
    Service(ServiceExpect),
    User(UserExpect),
    Group(GroupExpect),
    Mount(MountExpect),
    Sysctl(SysctlExpect),
    Command(CommandExpect),
}

/// Permission bits, written as a quoted octal string (`"0644"`, `"0o644"`).
///
/// YAML reads unquoted `0o644` as 420 and `644` as decimal, so numbers are
/// kept only to be rejected with a readable message.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ModeSpec {
    Text(String),
    Number(i64),
}

impl ModeSpec {
    /// Resolve to 0..=0o7777.
    ///
    /// # Errors
    ///
    /// Returns a message if the value is not a valid octal mode.
    pub fn resolve(&self) -> Result<u32, String> {
        match self {
            Self::Text(s) => parse_mode(s),
            Self::Number(n) => Err(format!(
                "mode {n} is an unquoted YAML number; quote it as an octal string such as \"0644\""
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileExpect {
    pub path: String,
    pub exists: Option<bool>,
    pub is_file: Option<bool>,
    pub is_directory: Option<bool>,
    pub executable: Option<bool>,
    pub owner: Option<String>,
    pub group: Option<String>,
    pub mode: Option<ModeSpec>,
    /// Literal, case-sensitive substrings the content must contain.
    #[serde(default)]
    pub contains: Vec<String>,
    #[serde(default)]
    pub not_contains: Vec<String>,
    /// Regular expressions the content must match.
    #[serde(default)]
    pub matches: Vec<String>,
}

impl FileExpect {
    /// Whether any expectation reads the file body.
    #[must_use]
    pub fn needs_content(&self) -> bool {
        !(self.contains.is_empty() && self.not_contains.is_empty() && self.matches.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackageExpect {
    pub name: String,
    pub installed: Option<bool>,
    /// Expected version prefix, e.g. `"4.5"` matches `4.5-3.fc40`.
    pub version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceExpect {
    pub name: String,
    pub exists: Option<bool>,
    pub running: Option<bool>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserExpect {
    pub name: String,
    pub exists: Option<bool>,
    pub uid: Option<u32>,
    pub home: Option<String>,
    pub shell: Option<String>,
    /// Groups the user must belong to.
    #[serde(default)]
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupExpect {
    pub name: String,
    pub exists: Option<bool>,
    pub gid: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MountExpect {
    pub path: String,
    pub exists: Option<bool>,
    pub filesystem: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    /// Only check options when the path is a mount point.
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SysctlExpect {
    pub key: String,
    /// Exact value from `sysctl -n KEY`.
    pub value: Option<String>,
    /// Substrings of the raw `sysctl KEY` output, e.g. `"net.ipv4.ip_forward = 0"`.
    #[serde(default)]
    pub contains: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandExpect {
    pub run: String,
    /// Expected exit code; 0 when omitted.
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub stdout_contains: Vec<String>,
    #[serde(default)]
    pub stderr_contains: Vec<String>,
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Parse and validate a suite, expanding `${VAR}` / `${VAR:-default}` in every
/// string value through `lookup`.
///
/// # Errors
///
/// Returns a `SuiteError` if the YAML is invalid, a variable is undefined, or
/// validation fails. No check runs for a suite that fails to load.
pub fn parse_suite(
    text: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Suite, SuiteError> {
    let mut value: serde_yaml::Value = serde_yaml::from_str(text)?;
    expand_value(&mut value, &lookup).map_err(|reason| SuiteError::InvalidAssertion {
        check: "<suite>".to_string(),
        reason,
    })?;
    let suite: Suite = serde_yaml::from_value(value)?;
    validate_suite(&suite)?;
    Ok(suite)
}

/// Expand `${VAR}` and `${VAR:-default}` references in `input`.
///
/// # Errors
///
/// Returns the variable name if it is unset and has no default.
pub fn expand_vars(input: &str, lookup: &impl Fn(&str) -> Option<String>) -> Result<String, String> {
    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    for caps in VAR_RE.captures_iter(input) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&input[last..whole.start()]);
        let name = &caps[1];
        match (lookup(name), caps.get(2)) {
            (Some(value), _) => out.push_str(&value),
            (None, Some(default)) => out.push_str(default.as_str()),
            (None, None) => return Err(format!("undefined variable '{name}'")),
        }
        last = whole.end();
    }
    out.push_str(&input[last..]);
    Ok(out)
}

fn expand_value(
    value: &mut serde_yaml::Value,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<(), String> {
    match value {
        serde_yaml::Value::String(s) => *s = expand_vars(s, lookup)?,
        serde_yaml::Value::Sequence(items) => {
            for item in items {
                expand_value(item, lookup)?;
            }
        }
        serde_yaml::Value::Mapping(map) => {
            for (_, item) in map.iter_mut() {
                expand_value(item, lookup)?;
            }
        }
        serde_yaml::Value::Tagged(tagged) => expand_value(&mut tagged.value, lookup)?,
        serde_yaml::Value::Null | serde_yaml::Value::Bool(_) | serde_yaml::Value::Number(_) => {}
    }
    Ok(())
}

/// Validate names and assertion parameters.
///
/// # Errors
///
/// Returns the first problem found.
pub fn validate_suite(suite: &Suite) -> Result<(), SuiteError> {
    let mut seen = HashSet::new();
    for (index, check) in suite.checks.iter().enumerate() {
        if check.name.trim().is_empty() {
            return Err(SuiteError::EmptyName { index });
        }
        if !seen.insert(check.name.as_str()) {
            return Err(SuiteError::DuplicateName(check.name.clone()));
        }
        let invalid = |reason: String| SuiteError::InvalidAssertion {
            check: check.name.clone(),
            reason,
        };
        if check.requires.iter().any(|f| f.trim().is_empty()) {
            return Err(invalid("empty feature name in 'requires'".to_string()));
        }
        if check.assertions.is_empty() && check.skip.is_none() {
            return Err(invalid("no assertions declared".to_string()));
        }
        for assertion in &check.assertions {
            validate_assertion(assertion).map_err(invalid)?;
        }
    }
    Ok(())
}

fn validate_assertion(assertion: &AssertionSpec) -> Result<(), String> {
    match assertion {
        AssertionSpec::File(f) => {
            non_empty("file path", &f.path)?;
            if let Some(mode) = &f.mode {
                mode.resolve()?;
            }
            for pattern in &f.matches {
                Regex::new(pattern).map_err(|e| format!("invalid regex '{pattern}': {e}"))?;
            }
            if f.exists == Some(false) && (f.needs_content() || f.mode.is_some()) {
                return Err(format!(
                    "{}: content or mode expectations contradict exists: false",
                    f.path
                ));
            }
        }
        AssertionSpec::Package(p) => non_empty("package name", &p.name)?,
        AssertionSpec::Service(s) => non_empty("service name", &s.name)?,
        AssertionSpec::User(u) => non_empty("user name", &u.name)?,
        AssertionSpec::Group(g) => non_empty("group name", &g.name)?,
        AssertionSpec::Mount(m) => {
            non_empty("mount path", &m.path)?;
            if !m.path.starts_with('/') {
                return Err(format!("mount path '{}' must be absolute", m.path));
            }
        }
        AssertionSpec::Sysctl(s) => non_empty("sysctl key", &s.key)?,
        AssertionSpec::Command(c) => non_empty("command", &c.run)?,
    }
    Ok(())
}

fn non_empty(what: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{what} must not be empty"))
    } else {
        Ok(())
    }
}
