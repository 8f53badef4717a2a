//! Git repository helpers built on the git CLI. Output parsing is split
//! from process invocation so the parsers stay testable without git.

use crate::error::{Result, VcsError};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Run a git subcommand in `repo_path`, returning raw stdout bytes.
pub(crate) fn run_git_bytes(repo_path: &Path, args: &[&str]) -> Result<Vec<u8>> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()
        .map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                VcsError::GitUnavailable
            } else {
                VcsError::Io(err)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(VcsError::GitFailed(if stderr.is_empty() {
            format!("git {} exited with {}", args.join(" "), output.status)
        } else {
            stderr
        }));
    }

    Ok(output.stdout)
}

/// Run a git subcommand in `repo_path`, returning stdout as text.
pub(crate) fn run_git(repo_path: &Path, args: &[&str]) -> Result<String> {
    run_git_bytes(repo_path, args).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

pub fn is_git_repository(path: &Path) -> bool {
    run_git(path, &["rev-parse", "--git-dir"]).is_ok()
}

/// Absolute path of the repository root, symlinks resolved so the root
/// agrees with canonicalized file paths.
pub fn repository_root(repo_path: &Path) -> Result<PathBuf> {
    if !repo_path.exists() {
        return Err(VcsError::MissingRepository(repo_path.to_path_buf()));
    }
    if !is_git_repository(repo_path) {
        return Err(VcsError::NotARepository(repo_path.to_path_buf()));
    }

    let stdout = run_git(repo_path, &["rev-parse", "--show-toplevel"])?;
    let root = PathBuf::from(stdout.trim());
    Ok(root.canonicalize().unwrap_or(root))
}

/// All files tracked at HEAD plus untracked-but-not-ignored files, as
/// absolute paths under the repository root.
pub fn list_project_files(repo_path: &Path) -> Result<Vec<PathBuf>> {
    let root = repository_root(repo_path)?;
    let stdout = run_git(
        repo_path,
        &["ls-files", "--cached", "--others", "--exclude-standard"],
    )?;

    let mut files: Vec<PathBuf> = stdout
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| root.join(line))
        .collect();
    files.sort();
    files.dedup();
    Ok(files)
}

/// Files listed by a commit (`git ls-tree -r --name-only <commit>`).
pub fn list_commit_files(repo_path: &Path, commit: &str) -> Result<Vec<PathBuf>> {
    let root = repository_root(repo_path)?;
    let stdout = run_git(repo_path, &["ls-tree", "-r", "--name-only", commit])?;

    let mut files: Vec<PathBuf> = stdout
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| root.join(line))
        .collect();
    files.sort();
    Ok(files)
}

/// Uncommitted files (staged, unstaged, untracked) as absolute paths.
pub fn uncommitted_files(repo_path: &Path) -> Result<Vec<PathBuf>> {
    let root = repository_root(repo_path)?;
    let stdout = run_git(repo_path, &["status", "--porcelain"])?;
    Ok(parse_porcelain_paths(&stdout)
        .into_iter()
        .map(|rel| root.join(rel))
        .collect())
}

/// Parse `git status --porcelain` output into repo-relative paths,
/// following renames to the new name.
pub(crate) fn parse_porcelain_paths(stdout: &str) -> Vec<String> {
    let mut files = Vec::new();
    for line in stdout.lines() {
        if line.len() < 4 {
            continue;
        }
        let mut path = line[3..].trim().to_string();
        if let Some((_, renamed)) = path.split_once(" -> ") {
            path = renamed.trim().to_string();
        }
        let path = path.trim_matches('"').to_string();
        if !path.is_empty() {
            files.push(path);
        }
    }
    files
}

/// Untracked files from porcelain output (`??` status), repo-relative.
pub(crate) fn parse_porcelain_untracked(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| line.starts_with("??"))
        .filter_map(|line| {
            let path = line[3..].trim().trim_matches('"');
            (!path.is_empty()).then(|| path.to_string())
        })
        .collect()
}

/// Resolve a revision spec (`HEAD`, branch, short hash) to a commit id.
pub fn resolve_commit(repo_path: &Path, rev: &str) -> Result<String> {
    let stdout = run_git(repo_path, &["rev-parse", "--verify", rev])?;
    Ok(stdout.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_porcelain_with_renames_and_quotes() {
        let stdout = " M src/main.rs\n?? notes.txt\nR  old.rs -> new.rs\nA  \"spaced name.rs\"\n";
        assert_eq!(
            parse_porcelain_paths(stdout),
            vec!["src/main.rs", "notes.txt", "new.rs", "spaced name.rs"]
        );
    }

    #[test]
    fn porcelain_untracked_only_keeps_question_marks() {
        let stdout = " M src/main.rs\n?? notes.txt\n?? new_dir/file.go\n";
        assert_eq!(
            parse_porcelain_untracked(stdout),
            vec!["notes.txt", "new_dir/file.go"]
        );
    }

    #[test]
    fn short_lines_are_skipped() {
        assert!(parse_porcelain_paths("M\n\n").is_empty());
    }

    #[test]
    fn missing_repository_is_reported() {
        let err = repository_root(Path::new("/definitely/missing/repo")).unwrap_err();
        assert!(matches!(err, VcsError::MissingRepository(_)));
    }
}
