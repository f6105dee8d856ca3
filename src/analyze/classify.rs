//! Change classification via ordered path and content rules.
//!
//! Each changed file contributes one vote from the first rule that
//! matches it; the commit type for the whole set is the majority across
//! votes. Rule order stays explicit so rules can be tested in isolation.

use std::fmt;
use std::str::FromStr;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyze::extract::FileChange;
use crate::repo::status::ChangeKind;

/// Conventional commit types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feat,
    Fix,
    Docs,
    Style,
    Refactor,
    Perf,
    Test,
    Build,
    Ci,
    Chore,
}

impl CommitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Feat => "feat",
            CommitType::Fix => "fix",
            CommitType::Docs => "docs",
            CommitType::Style => "style",
            CommitType::Refactor => "refactor",
            CommitType::Perf => "perf",
            CommitType::Test => "test",
            CommitType::Build => "build",
            CommitType::Ci => "ci",
            CommitType::Chore => "chore",
        }
    }

    /// Gitmoji-style marker for the emoji header style.
    pub fn emoji(&self) -> &'static str {
        match self {
            CommitType::Feat => "\u{2728}",          // ✨
            CommitType::Fix => "\u{1f41b}",          // 🐛
            CommitType::Docs => "\u{1f4dd}",         // 📝
            CommitType::Style => "\u{1f484}",        // 💄
            CommitType::Refactor => "\u{267b}\u{fe0f}", // ♻️
            CommitType::Perf => "\u{26a1}\u{fe0f}",  // ⚡️
            CommitType::Test => "\u{2705}",          // ✅
            CommitType::Build => "\u{1f4e6}",        // 📦
            CommitType::Ci => "\u{1f477}",           // 👷
            CommitType::Chore => "\u{1f527}",        // 🔧
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CommitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "feat" => Ok(Self::Feat),
            "fix" => Ok(Self::Fix),
            "docs" => Ok(Self::Docs),
            "style" => Ok(Self::Style),
            "refactor" => Ok(Self::Refactor),
            "perf" => Ok(Self::Perf),
            "test" => Ok(Self::Test),
            "build" => Ok(Self::Build),
            "ci" => Ok(Self::Ci),
            "chore" => Ok(Self::Chore),
            _ => Err(format!("Unknown commit type: {}", s)),
        }
    }
}

/// How trustworthy the inferred type is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
        }
    }
}

/// Classification of one logical change set.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub commit_type: CommitType,
    pub scope: Option<String>,
    pub confidence: Confidence,
    /// Ordered evidence strings, one per contributing signal.
    pub rationale: Vec<String>,
    /// Set when a public declaration was removed without a replacement.
    pub breaking: bool,
}

/// Which rule family produced a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleKind {
    Path,
    Content,
    Fallback,
}

#[derive(Debug, Clone)]
struct Vote {
    commit_type: CommitType,
    evidence: String,
    rule: RuleKind,
}

/// Tie-break order for the majority vote.
const TYPE_PRIORITY: [CommitType; 10] = [
    CommitType::Feat,
    CommitType::Fix,
    CommitType::Refactor,
    CommitType::Perf,
    CommitType::Docs,
    CommitType::Test,
    CommitType::Build,
    CommitType::Ci,
    CommitType::Style,
    CommitType::Chore,
];

/// Minimum agreement ratio below which confidence drops to low.
const AGREEMENT_THRESHOLD: f64 = 0.6;

/// Directory names that never become a scope on their own.
const GENERIC_ROOTS: &[&str] = &[
    "src", "lib", "app", "source", "crates", "packages", "pkg", "internal", "tests", "test",
    "docs", "doc",
];

/// Classify a non-empty change set into one [`Classification`].
///
/// The caller guarantees the set is non-empty (the extractor signals
/// `NoChanges` before the classifier runs).
pub fn classify_changes(changes: &[FileChange]) -> Classification {
    // A single rename with no content delta is a pure move.
    if let [only] = changes {
        if only.kind == ChangeKind::Renamed
            && only.hunks.iter().all(|h| h.added == 0 && h.removed == 0)
        {
            return Classification {
                commit_type: CommitType::Refactor,
                scope: infer_scope(changes),
                confidence: Confidence::High,
                rationale: vec![format!("{}: renamed with no content changes", only.path)],
                breaking: false,
            };
        }
    }

    let votes: Vec<Vote> = changes
        .iter()
        .map(|c| {
            path_rule(c)
                .or_else(|| content_rule(c))
                .unwrap_or_else(|| fallback_rule(c))
        })
        .collect();

    let mut rationale: Vec<String> = votes.iter().map(|v| v.evidence.clone()).collect();

    // Tests ride along with the code they test: when implementation votes
    // exist, test votes do not steer the commit type.
    let non_test: Vec<&Vote> = votes
        .iter()
        .filter(|v| v.commit_type != CommitType::Test)
        .collect();
    let effective: Vec<&Vote> = if non_test.is_empty() {
        votes.iter().collect()
    } else {
        non_test
    };

    let (commit_type, winner_count) = majority(&effective);
    let agreement = winner_count as f64 / effective.len() as f64;

    let all_agree = votes.iter().all(|v| v.commit_type == commit_type);
    let has_path_vote = votes
        .iter()
        .any(|v| v.rule == RuleKind::Path && v.commit_type == commit_type);

    // High requires an unambiguous path-rule match; anything that needed
    // content inference or a split vote lands on medium.
    let confidence = if agreement < AGREEMENT_THRESHOLD {
        Confidence::Low
    } else if all_agree && has_path_vote {
        Confidence::High
    } else {
        Confidence::Medium
    };

    if !all_agree {
        rationale.push(format!(
            "majority vote: {} of {} files favor {}",
            winner_count,
            effective.len(),
            commit_type
        ));
    }

    let breaking = match detect_breaking(changes) {
        Some(evidence) => {
            rationale.push(evidence);
            true
        }
        None => false,
    };

    let scope = infer_scope(changes);

    debug!(
        "classified {} files as {} (confidence {}, agreement {:.2})",
        changes.len(),
        commit_type,
        confidence,
        agreement
    );

    Classification {
        commit_type,
        scope,
        confidence,
        rationale,
        breaking,
    }
}

/// Majority vote with ties broken by [`TYPE_PRIORITY`] order.
fn majority(votes: &[&Vote]) -> (CommitType, usize) {
    let mut best = (CommitType::Chore, 0usize);
    for candidate in TYPE_PRIORITY {
        let count = votes
            .iter()
            .filter(|v| v.commit_type == candidate)
            .count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best
}

// ── Path rules ──

fn path_rule(change: &FileChange) -> Option<Vote> {
    let lower = change.path.to_lowercase();
    let file_name = lower.rsplit('/').next().unwrap_or(&lower);

    let (commit_type, what) = if is_test_path(&lower) {
        (CommitType::Test, "test file")
    } else if is_docs_path(&lower) {
        (CommitType::Docs, "documentation change")
    } else if is_build_path(file_name) {
        (CommitType::Build, "build manifest or lockfile")
    } else if is_ci_path(&lower, file_name) {
        (CommitType::Ci, "CI configuration")
    } else if is_style_config(file_name) {
        (CommitType::Style, "formatter or linter configuration")
    } else {
        return None;
    };

    Some(Vote {
        commit_type,
        evidence: format!("{}: {}", change.path, what),
        rule: RuleKind::Path,
    })
}

fn is_test_path(path: &str) -> bool {
    let mut parts: Vec<&str> = path.split('/').collect();
    let file = parts.pop().unwrap_or("");
    if parts
        .iter()
        .any(|d| matches!(*d, "tests" | "test" | "spec" | "specs" | "__tests__"))
    {
        return true;
    }
    let re = Regex::new(r"^test_|_test\.\w+$|\.test\.\w+$|_spec\.\w+$|\.spec\.\w+$").unwrap();
    re.is_match(file)
}

fn is_docs_path(path: &str) -> bool {
    let mut parts: Vec<&str> = path.split('/').collect();
    let file = parts.pop().unwrap_or("");
    if parts
        .iter()
        .any(|d| matches!(*d, "docs" | "doc" | "documentation"))
    {
        return true;
    }
    matches!(
        file.rsplit('.').next().unwrap_or(""),
        "md" | "markdown" | "rst" | "adoc"
    ) && file.contains('.')
}

fn is_build_path(file_name: &str) -> bool {
    matches!(
        file_name,
        "cargo.toml"
            | "cargo.lock"
            | "package.json"
            | "package-lock.json"
            | "yarn.lock"
            | "pnpm-lock.yaml"
            | "pyproject.toml"
            | "poetry.lock"
            | "requirements.txt"
            | "setup.py"
            | "setup.cfg"
            | "go.mod"
            | "go.sum"
            | "makefile"
            | "cmakelists.txt"
            | "dockerfile"
            | "build.gradle"
            | "pom.xml"
            | "gemfile"
            | "gemfile.lock"
    )
}

fn is_ci_path(path: &str, file_name: &str) -> bool {
    path.starts_with(".github/workflows/")
        || path.starts_with(".circleci/")
        || path.starts_with(".buildkite/")
        || matches!(
            file_name,
            ".gitlab-ci.yml" | "jenkinsfile" | ".travis.yml" | "azure-pipelines.yml" | ".drone.yml"
        )
}

fn is_style_config(file_name: &str) -> bool {
    matches!(
        file_name,
        ".rustfmt.toml" | "rustfmt.toml" | "clippy.toml" | ".editorconfig" | ".clang-format"
    ) || file_name.starts_with(".prettierrc")
        || file_name.starts_with(".eslintrc")
        || file_name.starts_with(".stylelintrc")
}

// ── Content rules (full mode only) ──

fn content_rule(change: &FileChange) -> Option<Vote> {
    if change.is_binary || change.hunks.is_empty() {
        return None;
    }

    let total_added: usize = change.hunks.iter().map(|h| h.added).sum();
    let total_removed: usize = change.hunks.iter().map(|h| h.removed).sum();
    let added: Vec<&str> = change
        .hunks
        .iter()
        .flat_map(|h| &h.added_lines)
        .map(String::as_str)
        .collect();
    let removed: Vec<&str> = change
        .hunks
        .iter()
        .flat_map(|h| &h.removed_lines)
        .map(String::as_str)
        .collect();

    // Equivalence rules need every line; skip them when sampling was capped.
    let complete = added.len() == total_added && removed.len() == total_removed;

    if complete && comment_only(&added, &removed) {
        return Some(vote_content(change, CommitType::Docs, "comment-only change"));
    }

    if complete && whitespace_equivalent(&added, &removed) {
        return Some(vote_content(
            change,
            CommitType::Style,
            "whitespace-only change",
        ));
    }

    let added_decls = count_declarations(&added);
    let removed_decls = count_declarations(&removed);

    if added_decls > 0 && removed_decls == 0 && total_removed == 0 {
        return Some(vote_content(
            change,
            CommitType::Feat,
            "new function or type added",
        ));
    }

    if total_removed > 0 {
        if contains_behavior_keywords(&added) {
            return Some(vote_content(
                change,
                CommitType::Fix,
                "behavior keywords in modified logic",
            ));
        }
        if total_added.abs_diff(total_removed) <= net_delta_threshold(total_added + total_removed)
        {
            return Some(vote_content(
                change,
                CommitType::Refactor,
                "balanced rewrite without behavior keywords",
            ));
        }
        // Default when uncertain: logic was removed and modified.
        return Some(vote_content(
            change,
            CommitType::Fix,
            "modified existing logic",
        ));
    }

    None
}

fn vote_content(change: &FileChange, commit_type: CommitType, what: &str) -> Vote {
    Vote {
        commit_type,
        evidence: format!("{}: {}", change.path, what),
        rule: RuleKind::Content,
    }
}

fn comment_only(added: &[&str], removed: &[&str]) -> bool {
    let mut saw_content = false;
    for line in added.iter().chain(removed.iter()) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !is_comment_line(trimmed) {
            return false;
        }
        saw_content = true;
    }
    saw_content
}

fn is_comment_line(trimmed: &str) -> bool {
    trimmed.starts_with("//")
        || trimmed.starts_with('#')
        || trimmed.starts_with('*')
        || trimmed.starts_with("/*")
        || trimmed.starts_with("*/")
        || trimmed.starts_with("--")
        || trimmed.starts_with("\"\"\"")
        || trimmed.starts_with("'''")
}

/// Whitespace-insensitive line comparison: both sides are identical after
/// every whitespace character is removed.
fn whitespace_equivalent(added: &[&str], removed: &[&str]) -> bool {
    let squash = |lines: &[&str]| -> String {
        lines
            .iter()
            .flat_map(|l| l.chars())
            .filter(|c| !c.is_whitespace())
            .collect()
    };
    let a = squash(added);
    let r = squash(removed);
    !a.is_empty() && a == r
}

fn count_declarations(lines: &[&str]) -> usize {
    let re = Regex::new(
        r"^\s*(?:pub(?:\(\w+\))?\s+)?(?:async\s+)?fn\s+\w+|^\s*(?:pub(?:\(\w+\))?\s+)?(?:struct|enum|trait)\s+\w+|^\s*(?:async\s+)?def\s+\w+|^\s*class\s+\w+|^\s*(?:export\s+)?(?:async\s+)?function\s+\w+",
    )
    .unwrap();
    lines.iter().filter(|l| re.is_match(l)).count()
}

fn contains_behavior_keywords(lines: &[&str]) -> bool {
    let re = Regex::new(r"\b(fix|fixes|fixed|bug|error|panic|issue|fail|fails|failed)\b").unwrap();
    lines.iter().any(|l| re.is_match(&l.to_lowercase()))
}

fn net_delta_threshold(total: usize) -> usize {
    (total / 10).max(2)
}

// ── Fallback rule (lite mode or no other signal) ──

fn fallback_rule(change: &FileChange) -> Vote {
    let (commit_type, what) = match change.kind {
        ChangeKind::Added | ChangeKind::Untracked => (CommitType::Feat, "new file added"),
        ChangeKind::Copied => (CommitType::Feat, "file copied"),
        ChangeKind::Deleted => (CommitType::Chore, "file removed"),
        ChangeKind::Renamed => (CommitType::Refactor, "file renamed"),
        ChangeKind::Modified => (CommitType::Chore, "modified without further signal"),
    };
    Vote {
        commit_type,
        evidence: format!("{}: {}", change.path, what),
        rule: RuleKind::Fallback,
    }
}

// ── Breaking-change heuristic ──

/// A removed public declaration whose name never reappears among the
/// added lines flags the change set as breaking.
fn detect_breaking(changes: &[FileChange]) -> Option<String> {
    let added_text: String = changes
        .iter()
        .flat_map(|c| &c.hunks)
        .flat_map(|h| &h.added_lines)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n");

    for change in changes {
        for hunk in &change.hunks {
            for line in &hunk.removed_lines {
                let Some(name) = public_declaration_name(line) else {
                    continue;
                };
                if name.starts_with('_') {
                    continue;
                }
                if !added_text.contains(&name) {
                    return Some(format!(
                        "{}: removed public declaration `{}`",
                        change.path, name
                    ));
                }
            }
        }
    }
    None
}

fn public_declaration_name(line: &str) -> Option<String> {
    let patterns = [
        r"^\s*pub\s+(?:async\s+)?fn\s+(\w+)",
        r"^\s*pub\s+(?:struct|enum|trait)\s+(\w+)",
        r"^\s*(?:async\s+)?def\s+(\w+)",
        r"^\s*class\s+(\w+)",
        r"^\s*(?:export\s+)?(?:async\s+)?function\s+(\w+)",
    ];
    for pattern in patterns {
        if let Some(caps) = Regex::new(pattern).unwrap().captures(line) {
            return caps.get(1).map(|m| m.as_str().to_string());
        }
    }
    None
}

// ── Scope inference ──

/// Longest common directory prefix across all changed paths, skipping
/// generic roots, truncated to one segment. `None` when files span
/// unrelated top-level directories or sit at the repository root.
pub fn infer_scope(changes: &[FileChange]) -> Option<String> {
    let mut iter = changes.iter();
    let first = iter.next()?;
    let mut prefix: Vec<&str> = parent_components(&first.path);

    for change in iter {
        let components = parent_components(&change.path);
        let common = prefix
            .iter()
            .zip(components.iter())
            .take_while(|(a, b)| a == b)
            .count();
        prefix.truncate(common);
        if prefix.is_empty() {
            return None;
        }
    }

    prefix
        .into_iter()
        .find(|c| !GENERIC_ROOTS.contains(&c.to_lowercase().as_str()))
        .map(str::to_string)
}

fn parent_components(path: &str) -> Vec<&str> {
    let mut components: Vec<&str> = path.split('/').collect();
    components.pop();
    components
}
