//! Home directory resolution.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

/// Platform base for the default home: `%APPDATA%` on Windows, `$HOME` elsewhere.
fn platform_base() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        dirs::config_dir()
    }
    #[cfg(not(target_os = "windows"))]
    {
        dirs::home_dir()
    }
}

fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if raw == "~" || raw.starts_with("~/") || raw.starts_with("~\\") {
        let home = dirs::home_dir().ok_or_else(|| anyhow!("cannot expand '~': no home directory"))?;
        let rest = raw[1..].trim_start_matches(['/', '\\']);
        return Ok(if rest.is_empty() { home } else { home.join(rest) });
    }
    Ok(PathBuf::from(raw))
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("cannot read current directory")?;
    Ok(cwd.join(path))
}

/// Resolve the service home directory.
///
/// `None` (or blank) selects `<platform base>/<default_subdir>`. A leading `~`
/// expands to the user's home and relative paths are anchored at the current
/// directory. With `create` set the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let path = match configured.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => absolutize(&expand_tilde(raw)?)?,
        _ => platform_base()
            .ok_or_else(|| anyhow!("cannot determine a default home directory"))?
            .join(default_subdir),
    };

    if create {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("cannot create home directory {}", path.display()))?;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn explicit_absolute_path_is_created() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("a").join("b");
        let got = resolve_home_dir(Some(target.to_string_lossy().into_owned()), ".x", true).unwrap();
        assert_eq!(got, target);
        assert!(target.is_dir());
    }

    #[test]
    fn relative_path_is_made_absolute() {
        let got = resolve_home_dir(Some("relative/home".into()), ".x", false).unwrap();
        assert!(got.is_absolute());
        assert!(got.ends_with("relative/home"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let got = resolve_home_dir(Some("~/.users-test".into()), ".x", false).unwrap();
        assert_eq!(got, home.join(".users-test"));
    }

    #[test]
    fn blank_uses_default_subdir() {
        let Some(base) = platform_base() else {
            return;
        };
        let got = resolve_home_dir(Some("   ".into()), ".users-server", false).unwrap();
        assert_eq!(got, base.join(".users-server"));
    }
}
