//! Optional version-control metadata reader, used to derive a default
//! upload directory from the repository's remote URL.

use std::process::Command;

use log::debug;

/// Derive `<owner>-<repo>` from the `origin` remote of the current
/// repository. Returns `None` outside a git checkout or when the remote
/// URL has no recognizable shape; callers fall back to a fixed default.
pub fn default_directory() -> Option<String> {
    let output = Command::new("git")
        .args(["config", "--get", "remote.origin.url"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let remote = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if remote.is_empty() {
        return None;
    }
    let slug = repo_slug(&remote);
    debug!("Derived directory {:?} from remote {}", slug, remote);
    slug
}

/// Turn a git remote URL into a single `<owner>-<repo>` slug.
///
/// Handles the common shapes: `https://host/owner/repo.git`,
/// `git@host:owner/repo.git` and `ssh://git@host[:port]/owner/repo`.
pub fn repo_slug(remote: &str) -> Option<String> {
    let trimmed = remote.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    // With a scheme, everything up to the first `/` is the authority
    // (host, optional user and port). Without one the remote is scp-like
    // and the first `:` separates host from path instead.
    let path = match trimmed.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_authority, path)| path)?,
        None => match trimmed.split_once(':') {
            Some((_, path)) => path,
            None => trimmed.split_once('/').map(|(_, path)| path)?,
        },
    };

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        // a single path segment: no owner/repo pair to build a slug from
        return None;
    }

    let repo = segments[segments.len() - 1];
    let owner = segments[segments.len() - 2];
    Some(format!("{owner}-{repo}"))
}
