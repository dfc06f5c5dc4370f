use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomeDirError {
    #[error("cannot determine the user home directory (set {0})")]
    NoHome(&'static str),
    #[error("cannot determine the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    #[error("failed to create directory '{path}': {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(target_os = "windows")]
const HOME_VAR: &str = "APPDATA";
#[cfg(not(target_os = "windows"))]
const HOME_VAR: &str = "HOME";

fn platform_home() -> Result<PathBuf, HomeDirError> {
    env::var_os(HOME_VAR)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or(HomeDirError::NoHome(HOME_VAR))
}

fn expand_tilde(raw: &str) -> Result<PathBuf, HomeDirError> {
    if raw == "~" {
        return platform_home();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(platform_home()?.join(rest));
    }
    Ok(PathBuf::from(raw))
}

fn absolutize(p: PathBuf) -> Result<PathBuf, HomeDirError> {
    if p.is_absolute() {
        return Ok(p);
    }
    let cwd = env::current_dir().map_err(HomeDirError::CurrentDir)?;
    Ok(cwd.join(p))
}

fn ensure_dir(p: &Path) -> Result<(), HomeDirError> {
    std::fs::create_dir_all(p).map_err(|source| HomeDirError::Create {
        path: p.to_path_buf(),
        source,
    })
}

/// Resolve the server home directory.
///
/// `configured` wins when present (`~` is expanded, relative paths are joined
/// with the current directory). Otherwise `<platform home>/<default_subdir>`.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    let resolved = match configured {
        Some(raw) => absolutize(expand_tilde(raw.trim())?)?,
        None => platform_home()?.join(default_subdir),
    };

    if create {
        ensure_dir(&resolved)?;
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absolute_path_is_kept_and_created() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("nested/home");
        let out =
            resolve_home_dir(Some(target.to_string_lossy().to_string()), ".x", true).unwrap();
        assert_eq!(out, target);
        assert!(out.is_dir());
    }

    #[test]
    fn relative_path_becomes_absolute() {
        let out = resolve_home_dir(Some("some/relative".into()), ".x", false).unwrap();
        assert!(out.is_absolute());
        assert!(out.ends_with("some/relative"));
    }
}
