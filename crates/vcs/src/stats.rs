//! File statistics and changed-file providers built on git numstat.

use crate::error::Result;
use crate::repository::{
    parse_porcelain_untracked, repository_root, run_git, uncommitted_files,
};
use depscope_depgraph::{AbsolutePath, FileStats};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Additions/deletions for the working tree against HEAD (staged plus
/// unstaged), with untracked files marked new.
pub fn working_tree_stats(repo_path: &Path) -> Result<BTreeMap<AbsolutePath, FileStats>> {
    let root = repository_root(repo_path)?;
    let mut stats = BTreeMap::new();

    for args in [
        &["diff", "--numstat", "HEAD"][..],
        &["diff", "--numstat", "--cached"][..],
    ] {
        let Ok(stdout) = run_git(repo_path, args) else {
            // A repository with no commits yet has no HEAD to diff against.
            continue;
        };
        merge_numstat(&mut stats, &root, &stdout);
    }

    let porcelain = run_git(repo_path, &["status", "--porcelain"])?;
    for relative in parse_porcelain_untracked(&porcelain) {
        let absolute = AbsolutePath::from_clean(root.join(&relative));
        let line_count = std::fs::read_to_string(absolute.as_path())
            .map(|contents| contents.lines().count() as u32)
            .unwrap_or(0);
        stats.insert(
            absolute,
            FileStats {
                additions: line_count,
                deletions: 0,
                is_new: true,
            },
        );
    }

    Ok(stats)
}

/// Additions/deletions between two commits; files absent from the base
/// commit are marked new.
pub fn commit_range_stats(
    repo_path: &Path,
    base: &str,
    target: &str,
) -> Result<BTreeMap<AbsolutePath, FileStats>> {
    let root = repository_root(repo_path)?;
    let range = format!("{base}..{target}");
    let stdout = run_git(repo_path, &["diff", "--numstat", &range])?;

    let mut stats = BTreeMap::new();
    merge_numstat(&mut stats, &root, &stdout);

    let added = run_git(
        repo_path,
        &["diff", "--name-only", "--diff-filter=A", &range],
    )?;
    for line in added.lines().filter(|l| !l.is_empty()) {
        let absolute = AbsolutePath::from_clean(root.join(line));
        if let Some(entry) = stats.get_mut(&absolute) {
            entry.is_new = true;
        }
    }

    Ok(stats)
}

/// Absolute paths of files changed between base and target revisions.
pub fn changed_files(
    repo_path: &Path,
    base: &str,
    target: Option<&str>,
) -> Result<BTreeSet<AbsolutePath>> {
    let root = repository_root(repo_path)?;
    let mut changed = BTreeSet::new();

    match target {
        Some(target) => {
            let range = format!("{base}..{target}");
            let stdout = run_git(repo_path, &["diff", "--name-only", &range])?;
            for line in stdout.lines().filter(|l| !l.is_empty()) {
                changed.insert(AbsolutePath::from_clean(root.join(line)));
            }
        }
        None => {
            for file in uncommitted_files(repo_path)? {
                changed.insert(AbsolutePath::from_clean(file));
            }
        }
    }

    Ok(changed)
}

/// Fold `git diff --numstat` output into the stats map. Binary files
/// report `-` counts and contribute zeros.
fn merge_numstat(stats: &mut BTreeMap<AbsolutePath, FileStats>, root: &Path, stdout: &str) {
    for (additions, deletions, relative) in parse_numstat(stdout) {
        let absolute = AbsolutePath::from_clean(root.join(&relative));
        let entry = stats.entry(absolute).or_default();
        entry.additions += additions;
        entry.deletions += deletions;
    }
}

/// Parse numstat lines: `<added>\t<deleted>\t<path>`, rename syntax
/// (`old => new`, `dir/{old => new}/file`) resolved to the new path.
pub(crate) fn parse_numstat(stdout: &str) -> Vec<(u32, u32, String)> {
    let mut parsed = Vec::new();

    for line in stdout.lines() {
        let mut parts = line.splitn(3, '\t');
        let (Some(added), Some(deleted), Some(path)) =
            (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };

        let additions = added.parse::<u32>().unwrap_or(0);
        let deletions = deleted.parse::<u32>().unwrap_or(0);
        let path = resolve_rename_syntax(path.trim());
        if !path.is_empty() {
            parsed.push((additions, deletions, path));
        }
    }

    parsed
}

fn resolve_rename_syntax(path: &str) -> String {
    if let (Some(open), Some(close)) = (path.find('{'), path.find('}')) {
        if open < close {
            let inner = &path[open + 1..close];
            let new_part = inner.split(" => ").last().unwrap_or(inner);
            let combined = format!("{}{}{}", &path[..open], new_part, &path[close + 1..]);
            return combined.replace("//", "/");
        }
    }
    if let Some((_, new_path)) = path.split_once(" => ") {
        return new_path.to_string();
    }
    path.to_string()
}
