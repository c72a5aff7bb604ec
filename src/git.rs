use anyhow::{bail, Context, Result};
use tokio::process::Command;

use crate::model::work_item::WorkItem;

pub async fn is_repository() -> bool {
    Command::new("git")
        .args(["rev-parse", "--git-dir"])
        .output()
        .await
        .map(|out| out.status.success())
        .unwrap_or(false)
}

pub async fn has_uncommitted_changes() -> bool {
    Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .await
        .map(|out| !String::from_utf8_lossy(&out.stdout).trim().is_empty())
        .unwrap_or(false)
}

async fn branch_exists(name: &str) -> bool {
    Command::new("git")
        .args(["show-ref", "--verify", "--quiet", &format!("refs/heads/{name}")])
        .output()
        .await
        .map(|out| out.status.success())
        .unwrap_or(false)
}

/// Creates and checks out a new branch. Refuses if the branch exists.
pub async fn create_branch(name: &str) -> Result<()> {
    if branch_exists(name).await {
        bail!("branch '{name}' already exists");
    }
    let output = Command::new("git")
        .args(["checkout", "-b", name])
        .output()
        .await
        .context("running git checkout")?;
    if !output.status.success() {
        bail!(
            "creating branch: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

/// Suggests a branch name from the item: type-derived prefix, id, and a
/// slugified title capped at 40 chars, cut at a word boundary when one
/// lands past the halfway mark.
pub fn suggest_branch_name(item: &WorkItem) -> String {
    let prefix = match item.work_item_type.as_str() {
        "Bug" => "bugfix",
        "Task" => "task",
        "Epic" => "epic",
        _ => "feature",
    };

    let mut slug = String::new();
    let mut last_was_dash = true;
    for ch in item.title.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }
    let mut slug = slug.trim_matches('-').to_string();
    if slug.len() > 40 {
        slug.truncate(40);
        if let Some(cut) = slug.rfind('-') {
            if cut > 20 {
                slug.truncate(cut);
            }
        }
    }

    format!("{prefix}/{}-{slug}", item.id)
}

/// Validates a git branch name: no whitespace or `~^:?*[]\`, no leading or
/// trailing slash, no consecutive dots.
pub fn validate_branch_name(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("branch name cannot be empty".into());
    }
    if name
        .chars()
        .any(|c| c.is_whitespace() || "~^:?*[]\\".contains(c))
    {
        return Err("invalid branch name".into());
    }
    if name.starts_with('/') || name.ends_with('/') {
        return Err("branch name cannot start or end with '/'".into());
    }
    if name.contains("..") {
        return Err("branch name cannot contain '..'".into());
    }
    Ok(())
}
