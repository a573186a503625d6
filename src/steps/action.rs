//! Built-in step actions.
//!
//! Each action wraps one external effect: a shell command, a package
//! manager call, an HTTP download, a git clone, or a text/link edit.
//! None of them look at whether the work is already done; that is the
//! condition's job.

use anyhow::{bail, Context};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::shell::{execute, is_elevated};
use crate::steps::context::SystemContext;
use crate::steps::step::Action;

/// Supported system package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Apt,
    Dnf,
    Pacman,
    Brew,
}

impl PackageManager {
    /// Program and leading arguments for a non-interactive install.
    fn install_command(&self) -> (&'static str, &'static [&'static str]) {
        match self {
            PackageManager::Apt => ("apt-get", &["install", "-y", "-q"]),
            PackageManager::Dnf => ("dnf", &["install", "-y"]),
            PackageManager::Pacman => ("pacman", &["-S", "--noconfirm", "--needed"]),
            PackageManager::Brew => ("brew", &["install"]),
        }
    }

    fn refresh_command(&self) -> (&'static str, &'static [&'static str]) {
        match self {
            PackageManager::Apt => ("apt-get", &["update", "-q"]),
            PackageManager::Dnf => ("dnf", &["makecache"]),
            PackageManager::Pacman => ("pacman", &["-Sy"]),
            PackageManager::Brew => ("brew", &["update"]),
        }
    }

    /// Homebrew refuses to run as root; everything else needs it.
    fn needs_root(&self) -> bool {
        !matches!(self, PackageManager::Brew)
    }
}

/// Declarative action, as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionSpec {
    /// Run a shell command.
    Shell { command: String },

    /// Install system packages.
    Package {
        manager: PackageManager,
        packages: Vec<String>,
        /// Refresh package indexes first
        #[serde(default)]
        update: bool,
    },

    /// Fetch a file over HTTP(S).
    Download {
        url: String,
        dest: String,
        /// Expected hex SHA-256 of the body
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sha256: Option<String>,
        /// Mark the file executable (0755)
        #[serde(default)]
        executable: bool,
    },

    /// Clone a git repository.
    GitClone {
        repo: String,
        dest: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        depth: Option<u32>,
    },

    /// Append a line to a text file.
    AppendLine { path: String, line: String },

    /// Regex substitution across a whole file.
    ReplaceInFile {
        path: String,
        pattern: String,
        replacement: String,
    },

    /// Create a symbolic link at `dest` pointing to `source`.
    Symlink { source: String, dest: String },
}

impl Action for ActionSpec {
    fn apply(&self, ctx: &SystemContext) -> anyhow::Result<()> {
        match self {
            ActionSpec::Shell { command } => run_shell(command, ctx),
            ActionSpec::Package {
                manager,
                packages,
                update,
            } => install_packages(*manager, packages, *update, ctx),
            ActionSpec::Download {
                url,
                dest,
                sha256,
                executable,
            } => download(url, dest, sha256.as_deref(), *executable, ctx),
            ActionSpec::GitClone {
                repo,
                dest,
                branch,
                depth,
            } => git_clone(repo, dest, branch.as_deref(), *depth, ctx),
            ActionSpec::AppendLine { path, line } => append_line(path, line, ctx),
            ActionSpec::ReplaceInFile {
                path,
                pattern,
                replacement,
            } => replace_in_file(path, pattern, replacement, ctx),
            ActionSpec::Symlink { source, dest } => symlink(source, dest, ctx),
        }
    }

    fn describe(&self) -> String {
        match self {
            ActionSpec::Shell { command } => format!("run `{}`", command),
            ActionSpec::Package {
                manager, packages, ..
            } => {
                let (program, _) = manager.install_command();
                format!("{} install {}", program, packages.join(" "))
            }
            ActionSpec::Download { url, dest, .. } => format!("download {} -> {}", url, dest),
            ActionSpec::GitClone { repo, dest, .. } => format!("git clone {} {}", repo, dest),
            ActionSpec::AppendLine { path, line } => format!("append to {}: {}", path, line),
            ActionSpec::ReplaceInFile { path, pattern, .. } => {
                format!("replace /{}/ in {}", pattern, path)
            }
            ActionSpec::Symlink { source, dest } => format!("link {} -> {}", dest, source),
        }
    }
}

fn run_shell(command: &str, ctx: &SystemContext) -> anyhow::Result<()> {
    let result = execute(command, &ctx.command_options())?;
    if !result.success {
        let output = match result.stderr.trim() {
            "" => result.stdout.trim(),
            stderr => stderr,
        };
        bail!(
            "`{}` exited with code {:?}: {}",
            command,
            result.exit_code,
            output
        );
    }
    Ok(())
}

/// Run a program directly (no shell), failing on a non-zero exit.
fn run_program(program: &str, args: &[OsString], ctx: &SystemContext) -> anyhow::Result<()> {
    let path = match ctx.find_program(program) {
        Ok(p) => p,
        Err(e) => bail!("command not found: {}: {}", program, e),
    };

    tracing::debug!(program, ?args, "running");

    let output = Command::new(&path)
        .args(args)
        .envs(ctx.env())
        .current_dir(ctx.base_dir())
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("failed to start {}", program))?;

    if !output.status.success() {
        bail!(
            "{} exited with {}: {}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(())
}

fn run_package_command(
    manager: PackageManager,
    (program, base_args): (&str, &[&str]),
    extra: &[String],
    ctx: &SystemContext,
) -> anyhow::Result<()> {
    let mut args: Vec<OsString> = base_args.iter().map(OsString::from).collect();
    args.extend(extra.iter().map(OsString::from));

    if manager.needs_root() && !is_elevated() {
        let mut sudo_args = vec![OsString::from(program)];
        sudo_args.extend(args);
        run_program("sudo", &sudo_args, ctx)
    } else {
        run_program(program, &args, ctx)
    }
}

fn install_packages(
    manager: PackageManager,
    packages: &[String],
    update: bool,
    ctx: &SystemContext,
) -> anyhow::Result<()> {
    if packages.is_empty() {
        return Ok(());
    }

    if update {
        run_package_command(manager, manager.refresh_command(), &[], ctx)
            .context("refreshing package index")?;
    }

    run_package_command(manager, manager.install_command(), packages, ctx)
        .with_context(|| format!("installing {}", packages.join(", ")))
}

fn download(
    url: &str,
    dest: &str,
    sha256: Option<&str>,
    executable: bool,
    ctx: &SystemContext,
) -> anyhow::Result<()> {
    let dest = ctx.resolve_path(dest);

    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("groundwork/", env!("CARGO_PKG_VERSION")))
        .timeout(ctx.http_timeout())
        .build()
        .context("building HTTP client")?;

    let response = client
        .get(url)
        .send()
        .with_context(|| format!("requesting {}", url))?;

    if !response.status().is_success() {
        bail!("HTTP {} fetching {}", response.status(), url);
    }

    let body = response
        .bytes()
        .with_context(|| format!("reading body of {}", url))?;

    if let Some(expected) = sha256 {
        let actual = hex::encode(Sha256::digest(&body));
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            bail!(
                "checksum mismatch for {}: expected {}, got {}",
                url,
                expected,
                actual
            );
        }
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    // Write beside the destination and rename, so a failed run never
    // leaves a truncated file where a condition would find it.
    let mut partial = dest.clone().into_os_string();
    partial.push(".part");
    let partial = Path::new(&partial);
    fs::write(partial, &body).with_context(|| format!("writing {}", partial.display()))?;

    let finished = if executable {
        set_executable(partial)
    } else {
        Ok(())
    }
    .and_then(|()| {
        fs::rename(partial, &dest).with_context(|| format!("moving into {}", dest.display()))
    });
    if let Err(e) = finished {
        let _ = fs::remove_file(partial);
        return Err(e);
    }
    tracing::debug!(url, dest = %dest.display(), bytes = body.len(), "downloaded");
    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("chmod 755 {}", path.display()))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> anyhow::Result<()> {
    Ok(())
}

fn git_clone(
    repo: &str,
    dest: &str,
    branch: Option<&str>,
    depth: Option<u32>,
    ctx: &SystemContext,
) -> anyhow::Result<()> {
    let dest = ctx.resolve_path(dest);

    let mut args: Vec<OsString> = vec!["clone".into()];
    if let Some(depth) = depth {
        args.push("--depth".into());
        args.push(depth.to_string().into());
    }
    if let Some(branch) = branch {
        args.push("--branch".into());
        args.push(branch.into());
    }
    args.push(repo.into());
    args.push(dest.into_os_string());

    run_program("git", &args, ctx)
}

fn append_line(path: &str, line: &str, ctx: &SystemContext) -> anyhow::Result<()> {
    let path = ctx.resolve_path(path);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }

    let needs_separator = match fs::read(&path) {
        Ok(existing) => !existing.is_empty() && !existing.ends_with(b"\n"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;

    if needs_separator {
        writeln!(file)?;
    }
    writeln!(file, "{}", line).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn replace_in_file(
    path: &str,
    pattern: &str,
    replacement: &str,
    ctx: &SystemContext,
) -> anyhow::Result<()> {
    let re = Regex::new(pattern).with_context(|| format!("invalid pattern /{}/", pattern))?;
    let path = ctx.resolve_path(path);

    let content =
        fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    // Borrowed means nothing matched; leave the file untouched
    if let Cow::Owned(updated) = re.replace_all(&content, replacement) {
        fs::write(&path, updated).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

fn symlink(source: &str, dest: &str, ctx: &SystemContext) -> anyhow::Result<()> {
    let source = ctx.resolve_path(source);
    let dest = ctx.resolve_path(dest);

    match fs::symlink_metadata(&dest) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::remove_file(&dest)
                .with_context(|| format!("removing old link {}", dest.display()))?;
        }
        Ok(_) => bail!("{} exists and is not a symlink", dest.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e).with_context(|| format!("inspecting {}", dest.display())),
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }

    make_symlink(&source, &dest)
}

#[cfg(unix)]
fn make_symlink(source: &Path, dest: &Path) -> anyhow::Result<()> {
    std::os::unix::fs::symlink(source, dest)
        .with_context(|| format!("linking {} -> {}", dest.display(), source.display()))
}

#[cfg(not(unix))]
fn make_symlink(_source: &Path, _dest: &Path) -> anyhow::Result<()> {
    bail!("symlink actions are only supported on unix")
}
