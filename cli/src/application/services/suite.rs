//! Application service: declarative suite checks.
//!
//! Each suite entry becomes a `SuiteCheck` that evaluates its assertions
//! through the resource modules.

use anyhow::{Context, Result};

use crate::application::ports::Backend;
use crate::application::resources::Host;
use crate::application::services::runner::Check;
use crate::domain::check::{SkipContext, Verdict};
use crate::domain::snapshot::file::content_matches;
use crate::domain::suite::{
    AssertionSpec, CheckSpec, CommandExpect, FileExpect, GroupExpect, MountExpect, PackageExpect,
    ServiceExpect, Suite, SysctlExpect, UserExpect,
};

/// One declared suite entry.
#[derive(Debug, Clone)]
pub struct SuiteCheck {
    spec: CheckSpec,
}

impl SuiteCheck {
    #[must_use]
    pub fn new(spec: CheckSpec) -> Self {
        Self { spec }
    }

    /// All checks of a validated suite, in declaration order.
    #[must_use]
    pub fn from_suite(suite: Suite) -> Vec<Self> {
        suite.checks.into_iter().map(Self::new).collect()
    }
}

impl Check for SuiteCheck {
    fn id(&self) -> &str {
        &self.spec.name
    }

    fn description(&self) -> Option<&str> {
        self.spec.description.as_deref()
    }

    fn skip_reason(&self, ctx: &SkipContext) -> Option<String> {
        if let Some(reason) = &self.spec.skip {
            return Some(reason.clone());
        }
        ctx.missing_feature(&self.spec.requires)
            .map(|flag| format!("feature '{flag}' not enabled"))
    }

    async fn verify<B: Backend>(&self, host: &Host<B>) -> Result<Verdict> {
        let mut verdict = Verdict::new();
        for assertion in &self.spec.assertions {
            match assertion {
                AssertionSpec::File(f) => verify_file(host, f, &mut verdict).await?,
                AssertionSpec::Package(p) => verify_package(host, p, &mut verdict).await?,
                AssertionSpec::Service(s) => verify_service(host, s, &mut verdict).await?,
                AssertionSpec::User(u) => verify_user(host, u, &mut verdict).await?,
                AssertionSpec::Group(g) => verify_group(host, g, &mut verdict).await?,
                AssertionSpec::Mount(m) => verify_mount(host, m, &mut verdict).await?,
                AssertionSpec::Sysctl(s) => verify_sysctl(host, s, &mut verdict).await?,
                AssertionSpec::Command(c) => verify_command(host, c, &mut verdict).await?,
            }
        }
        Ok(verdict)
    }
}

fn expect_flag(verdict: &mut Verdict, what: &str, actual: bool, expected: Option<bool>) {
    if let Some(expected) = expected {
        verdict.check_eq(what, &actual, &expected);
    }
}

async fn verify_file<B: Backend>(host: &Host<B>, f: &FileExpect, v: &mut Verdict) -> Result<()> {
    let path = f.path.as_str();
    let file = host.file(path);
    let snap = file
        .snapshot()
        .await
        .with_context(|| format!("failed to stat {path}"))?;

    expect_flag(v, &format!("{path} exists"), snap.exists, f.exists);
    if !snap.exists {
        if f.exists.is_none() {
            v.check(false, format!("expected {path} to exist"));
        }
        return Ok(());
    }

    expect_flag(v, &format!("{path} is a file"), snap.is_file, f.is_file);
    expect_flag(v, &format!("{path} is a directory"), snap.is_dir, f.is_directory);
    expect_flag(v, &format!("{path} is executable"), snap.is_executable(), f.executable);
    if let Some(owner) = &f.owner {
        v.check_eq(&format!("{path} owner"), snap.owner.as_str(), owner.as_str());
    }
    if let Some(group) = &f.group {
        v.check_eq(&format!("{path} group"), snap.group.as_str(), group.as_str());
    }
    if let Some(mode) = &f.mode {
        let expected = mode.resolve().map_err(anyhow::Error::msg)?;
        v.check_eq(
            &format!("{path} mode"),
            snap.mode_octal().as_str(),
            format!("{expected:04o}").as_str(),
        );
    }
    if !f.needs_content() {
        return Ok(());
    }

    let content = file.content_string().await?;
    for needle in &f.contains {
        v.check(
            content.contains(needle.as_str()),
            format!("expected {path} to contain '{needle}'"),
        );
    }
    for needle in &f.not_contains {
        v.check(
            !content.contains(needle.as_str()),
            format!("expected {path} not to contain '{needle}'"),
        );
    }
    for pattern in &f.matches {
        let matched = content_matches(pattern, &content)?;
        v.check(matched, format!("expected {path} to match /{pattern}/"));
    }
    Ok(())
}

async fn verify_package<B: Backend>(
    host: &Host<B>,
    p: &PackageExpect,
    v: &mut Verdict,
) -> Result<()> {
    let name = p.name.as_str();
    let snap = host
        .package(name)
        .snapshot()
        .await
        .with_context(|| format!("failed to query package {name}"))?;
    expect_flag(v, &format!("package {name} installed"), snap.is_installed(), p.installed);
    if let Some(prefix) = &p.version {
        match &snap.version {
            Some(version) if snap.is_installed() => v.check(
                version.starts_with(prefix.as_str()),
                format!("package {name} version: expected {prefix}*, got {version}"),
            ),
            _ => v.check(
                false,
                format!("package {name} version: expected {prefix}*, but it is not installed"),
            ),
        };
    }
    Ok(())
}

async fn verify_service<B: Backend>(
    host: &Host<B>,
    s: &ServiceExpect,
    v: &mut Verdict,
) -> Result<()> {
    let name = s.name.as_str();
    let snap = host
        .service(name)
        .snapshot()
        .await
        .with_context(|| format!("failed to query service {name}"))?;
    expect_flag(v, &format!("service {name} exists"), snap.exists(), s.exists);
    expect_flag(v, &format!("service {name} running"), snap.running, s.running);
    expect_flag(v, &format!("service {name} enabled"), snap.enabled, s.enabled);
    Ok(())
}

async fn verify_user<B: Backend>(host: &Host<B>, u: &UserExpect, v: &mut Verdict) -> Result<()> {
    let name = u.name.as_str();
    let snap = host
        .user(name)
        .snapshot()
        .await
        .with_context(|| format!("failed to query user {name}"))?;
    expect_flag(v, &format!("user {name} exists"), snap.exists, u.exists);
    if !snap.exists {
        if u.exists.is_none() {
            v.check(false, format!("expected user {name} to exist"));
        }
        return Ok(());
    }
    if let (Some(expected), Some(actual)) = (u.uid, snap.uid) {
        v.check_eq(&format!("user {name} uid"), &actual, &expected);
    }
    if let Some(home) = &u.home {
        v.check_eq(&format!("user {name} home"), snap.home.as_str(), home.as_str());
    }
    if let Some(shell) = &u.shell {
        v.check_eq(&format!("user {name} shell"), snap.shell.as_str(), shell.as_str());
    }
    for group in &u.groups {
        v.check(
            snap.groups.contains(group),
            format!("expected user {name} to be in group {group}"),
        );
    }
    Ok(())
}

async fn verify_group<B: Backend>(host: &Host<B>, g: &GroupExpect, v: &mut Verdict) -> Result<()> {
    let name = g.name.as_str();
    let snap = host
        .group(name)
        .snapshot()
        .await
        .with_context(|| format!("failed to query group {name}"))?;
    expect_flag(v, &format!("group {name} exists"), snap.exists, g.exists);
    if let Some(expected) = g.gid {
        match snap.gid {
            Some(actual) => {
                v.check_eq(&format!("group {name} gid"), &actual, &expected);
            }
            None => {
                v.check(false, format!("expected group {name} to exist with gid {expected}"));
            }
        }
    }
    Ok(())
}

async fn verify_mount<B: Backend>(host: &Host<B>, m: &MountExpect, v: &mut Verdict) -> Result<()> {
    let path = m.path.as_str();
    let snap = host
        .mount_point(path)
        .snapshot()
        .await
        .with_context(|| format!("failed to read mount table for {path}"))?;
    expect_flag(v, &format!("{path} mounted"), snap.is_some(), m.exists);

    let Some(mount) = snap else {
        if !m.optional && m.exists.is_none() {
            v.check(false, format!("expected {path} to be a mount point"));
        }
        return Ok(());
    };
    if let Some(fs) = &m.filesystem {
        v.check_eq(&format!("{path} filesystem"), mount.filesystem.as_str(), fs.as_str());
    }
    if !m.options.is_empty() {
        let missing = mount.missing_options(&m.options);
        v.check(
            missing.is_empty(),
            format!("{path} is missing mount options: {}", missing.join(", ")),
        );
    }
    Ok(())
}

async fn verify_sysctl<B: Backend>(
    host: &Host<B>,
    s: &SysctlExpect,
    v: &mut Verdict,
) -> Result<()> {
    let key = s.key.as_str();
    let sysctl = host.sysctl(key);
    if let Some(expected) = &s.value {
        match sysctl
            .value()
            .await
            .with_context(|| format!("failed to read sysctl {key}"))?
        {
            Some(actual) => {
                v.check_eq(&format!("sysctl {key}"), actual.as_str(), expected.as_str());
            }
            None => {
                v.check(false, format!("expected sysctl {key} to exist"));
            }
        }
    }
    if !s.contains.is_empty() {
        let output = sysctl
            .run()
            .await
            .with_context(|| format!("failed to read sysctl {key}"))?;
        for needle in &s.contains {
            v.check(
                output.succeeded() && output.stdout.contains(needle.as_str()),
                format!(
                    "sysctl {key}: expected output containing '{needle}', got '{}'",
                    output.stdout.trim()
                ),
            );
        }
    }
    Ok(())
}

async fn verify_command<B: Backend>(
    host: &Host<B>,
    c: &CommandExpect,
    v: &mut Verdict,
) -> Result<()> {
    let output = host
        .run(&c.run)
        .await
        .with_context(|| format!("failed to run '{}'", c.run))?;
    let expected = c.exit_code.unwrap_or(0);
    v.check_eq(&format!("'{}' exit code", c.run), &output.exit_code, &expected);
    for needle in &c.stdout_contains {
        v.check(
            output.stdout.contains(needle.as_str()),
            format!("expected stdout of '{}' to contain '{needle}'", c.run),
        );
    }
    for needle in &c.stderr_contains {
        v.check(
            output.stderr.contains(needle.as_str()),
            format!("expected stderr of '{}' to contain '{needle}'", c.run),
        );
    }
    Ok(())
}
