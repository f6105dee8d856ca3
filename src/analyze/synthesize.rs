//! Conventional Commit message assembly.
//!
//! Pure data-in, data-out: nothing here touches the repository. Soft
//! conditions (description over budget, missing breaking-change body)
//! produce warnings on the message, never failures.

use serde::Serialize;
use tracing::debug;

use crate::analyze::classify::Classification;
use crate::analyze::extract::FileChange;
use crate::config::{MessageConfig, MessageStyle};
use crate::repo::status::ChangeKind;

/// Column at which body text wraps.
const BODY_WRAP_COLUMN: usize = 72;

/// Body line inserted when a breaking change has no explanation yet.
const BREAKING_PLACEHOLDER: &str =
    "BREAKING CHANGE: describe the breaking change before committing";

/// The final commit message artifact.
#[derive(Debug, Clone, Serialize)]
pub struct CommitMessage {
    /// `type(scope): description`, within the configured length budget.
    pub header: String,
    pub body: Option<String>,
    pub breaking: bool,
    /// Soft warnings attached during synthesis. The message is still
    /// complete and usable.
    pub warnings: Vec<String>,
}

impl CommitMessage {
    /// Render as the full git commit message.
    pub fn format(&self) -> String {
        match &self.body {
            Some(body) if !body.trim().is_empty() => {
                format!("{}\n\n{}", self.header, body.trim_end())
            }
            _ => self.header.clone(),
        }
    }
}

/// Build a [`CommitMessage`] from a classification, an optional
/// caller-supplied description and body, and formatting configuration.
///
/// With no description, a placeholder is derived from the change set;
/// callers should treat that path as a draft for human editing.
pub fn synthesize_message(
    classification: &Classification,
    description: Option<&str>,
    body: Option<&str>,
    changes: &[FileChange],
    config: &MessageConfig,
) -> CommitMessage {
    let mut warnings = Vec::new();

    let scope_part = classification
        .scope
        .as_deref()
        .map(|s| format!("({s})"))
        .unwrap_or_default();
    let bang = if classification.breaking { "!" } else { "" };
    let marker = match config.style {
        MessageStyle::Conventional => String::new(),
        MessageStyle::Emoji => format!("{} ", classification.commit_type.emoji()),
    };
    let prefix = format!(
        "{}{}{}{}: ",
        marker, classification.commit_type, scope_part, bang
    );

    let mut description = match description {
        Some(d) => normalize_description(d, config),
        None => derived_description(changes, classification.scope.as_deref()),
    };

    let budget = config
        .description_max_length
        .saturating_sub(prefix.chars().count());
    if description.chars().count() > budget {
        description = description
            .chars()
            .take(budget)
            .collect::<String>()
            .trim_end()
            .to_string();
        warnings.push(format!(
            "description truncated to {budget} characters to fit the header length limit"
        ));
    }

    let header = format!("{prefix}{description}");

    let mut body_text = body.map(|b| wrap_text(b.trim(), BODY_WRAP_COLUMN));
    if classification.breaking {
        let has_footer = body_text
            .as_deref()
            .is_some_and(|b| b.contains("BREAKING CHANGE:"));
        if !has_footer {
            warnings.push(
                "breaking change detected; fill in the BREAKING CHANGE footer".to_string(),
            );
            body_text = Some(match body_text {
                Some(b) => format!("{b}\n\n{BREAKING_PLACEHOLDER}"),
                None => BREAKING_PLACEHOLDER.to_string(),
            });
        }
    }

    debug!("synthesized header: {header}");

    CommitMessage {
        header,
        body: body_text,
        breaking: classification.breaking,
        warnings,
    }
}

/// Apply the configured first-letter and trailing-period normalization.
fn normalize_description(raw: &str, config: &MessageConfig) -> String {
    let mut description = raw.trim().to_string();

    if config.remove_period {
        if let Some(stripped) = description.strip_suffix('.') {
            // Leave ellipses alone
            if !stripped.ends_with('.') {
                description = stripped.to_string();
            }
        }
    }

    if config.lowercase_first_letter {
        let mut chars = description.chars();
        if let Some(first) = chars.next() {
            description = first.to_lowercase().collect::<String>() + chars.as_str();
        }
    }

    description
}

/// Best-effort placeholder description when the caller supplied none.
fn derived_description(changes: &[FileChange], scope: Option<&str>) -> String {
    if let [only] = changes {
        let name = only.path.rsplit('/').next().unwrap_or(&only.path);
        let verb = match only.kind {
            ChangeKind::Added | ChangeKind::Untracked => "add",
            ChangeKind::Deleted => "remove",
            ChangeKind::Renamed => "rename",
            ChangeKind::Copied => "copy",
            ChangeKind::Modified => "update",
        };
        return format!("{verb} {name}");
    }

    let all_new = changes
        .iter()
        .all(|c| matches!(c.kind, ChangeKind::Added | ChangeKind::Untracked));
    let verb = if all_new { "add" } else { "update" };

    match scope {
        Some(s) => format!("{verb} {} files in {s}", changes.len()),
        None => format!("{verb} {} files", changes.len()),
    }
}

/// Word-wrap while preserving existing line breaks and blank lines.
fn wrap_text(text: &str, width: usize) -> String {
    let mut out = Vec::new();
    for line in text.lines() {
        if line.chars().count() <= width {
            out.push(line.to_string());
            continue;
        }
        let mut current = String::new();
        for word in line.split_whitespace() {
            if current.is_empty() {
                current = word.to_string();
            } else if current.chars().count() + 1 + word.chars().count() <= width {
                current.push(' ');
                current.push_str(word);
            } else {
                out.push(current);
                current = word.to_string();
            }
        }
        if !current.is_empty() {
            out.push(current);
        }
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::classify::{CommitType, Confidence};

    fn classification(commit_type: CommitType, scope: Option<&str>) -> Classification {
        Classification {
            commit_type,
            scope: scope.map(String::from),
            confidence: Confidence::High,
            rationale: Vec::new(),
            breaking: false,
        }
    }

    fn single_change(path: &str, kind: ChangeKind) -> Vec<FileChange> {
        vec![FileChange {
            path: path.to_string(),
            kind,
            staged: true,
            old_path: None,
            hunks: Vec::new(),
            is_binary: false,
        }]
    }

    #[test]
    fn test_header_with_scope() {
        let c = classification(CommitType::Feat, Some("auth"));
        let msg = synthesize_message(
            &c,
            Some("add session timeout"),
            None,
            &single_change("src/auth/session.py", ChangeKind::Modified),
            &MessageConfig::default(),
        );
        assert_eq!(msg.header, "feat(auth): add session timeout");
        assert!(msg.warnings.is_empty());
    }

    #[test]
    fn test_header_without_scope() {
        let c = classification(CommitType::Docs, None);
        let msg = synthesize_message(
            &c,
            None,
            None,
            &single_change("README.md", ChangeKind::Modified),
            &MessageConfig::default(),
        );
        assert_eq!(msg.header, "docs: update README.md");
    }

    #[test]
    fn test_description_normalization() {
        let c = classification(CommitType::Fix, None);
        let msg = synthesize_message(
            &c,
            Some("Resolve the timeout."),
            None,
            &single_change("src/net.rs", ChangeKind::Modified),
            &MessageConfig::default(),
        );
        assert_eq!(msg.header, "fix: resolve the timeout");
    }

    #[test]
    fn test_normalization_can_be_disabled() {
        let config = MessageConfig {
            lowercase_first_letter: false,
            remove_period: false,
            ..MessageConfig::default()
        };
        let c = classification(CommitType::Fix, None);
        let msg = synthesize_message(
            &c,
            Some("Resolve the timeout."),
            None,
            &single_change("src/net.rs", ChangeKind::Modified),
            &config,
        );
        assert_eq!(msg.header, "fix: Resolve the timeout.");
    }

    #[test]
    fn test_long_description_truncates_with_warning() {
        let c = classification(CommitType::Feat, None);
        let long = "a".repeat(200);
        let config = MessageConfig::default();
        let msg = synthesize_message(
            &c,
            Some(&long),
            None,
            &single_change("src/x.rs", ChangeKind::Modified),
            &config,
        );
        assert!(msg.header.chars().count() <= config.description_max_length);
        assert_eq!(msg.warnings.len(), 1);
        assert!(msg.warnings[0].contains("truncated"));
    }

    #[test]
    fn test_emoji_style_prefixes_marker() {
        let config = MessageConfig {
            style: MessageStyle::Emoji,
            ..MessageConfig::default()
        };
        let c = classification(CommitType::Feat, Some("auth"));
        let msg = synthesize_message(
            &c,
            Some("add login"),
            None,
            &single_change("src/auth/login.py", ChangeKind::Added),
            &config,
        );
        assert_eq!(msg.header, "\u{2728} feat(auth): add login");
    }

    #[test]
    fn test_breaking_adds_bang_and_placeholder() {
        let mut c = classification(CommitType::Feat, Some("api"));
        c.breaking = true;
        let msg = synthesize_message(
            &c,
            Some("drop legacy endpoint"),
            None,
            &single_change("src/api/mod.rs", ChangeKind::Modified),
            &MessageConfig::default(),
        );
        assert_eq!(msg.header, "feat(api)!: drop legacy endpoint");
        assert!(msg.body.as_deref().unwrap().contains("BREAKING CHANGE:"));
        assert!(msg.warnings.iter().any(|w| w.contains("BREAKING CHANGE")));
    }

    #[test]
    fn test_breaking_with_caller_footer_keeps_body() {
        let mut c = classification(CommitType::Feat, None);
        c.breaking = true;
        let msg = synthesize_message(
            &c,
            Some("drop legacy endpoint"),
            Some("BREAKING CHANGE: the /v1 endpoint is gone"),
            &single_change("src/api/mod.rs", ChangeKind::Modified),
            &MessageConfig::default(),
        );
        assert_eq!(
            msg.body.as_deref().unwrap(),
            "BREAKING CHANGE: the /v1 endpoint is gone"
        );
        assert!(msg.warnings.is_empty());
    }

    #[test]
    fn test_derived_description_multiple_files() {
        let c = classification(CommitType::Feat, Some("auth"));
        let changes = vec![
            FileChange {
                path: "src/auth/login.py".to_string(),
                kind: ChangeKind::Modified,
                staged: true,
                old_path: None,
                hunks: Vec::new(),
                is_binary: false,
            },
            FileChange {
                path: "src/auth/session.py".to_string(),
                kind: ChangeKind::Modified,
                staged: true,
                old_path: None,
                hunks: Vec::new(),
                is_binary: false,
            },
        ];
        let msg = synthesize_message(&c, None, None, &changes, &MessageConfig::default());
        assert_eq!(msg.header, "feat(auth): update 2 files in auth");
    }

    #[test]
    fn test_format_with_body() {
        let msg = CommitMessage {
            header: "fix(parser): resolve memory leak".to_string(),
            body: Some("The parser held stale references.".to_string()),
            breaking: false,
            warnings: Vec::new(),
        };
        assert_eq!(
            msg.format(),
            "fix(parser): resolve memory leak\n\nThe parser held stale references."
        );
    }

    #[test]
    fn test_format_header_only() {
        let msg = CommitMessage {
            header: "chore: bump deps".to_string(),
            body: None,
            breaking: false,
            warnings: Vec::new(),
        };
        assert_eq!(msg.format(), "chore: bump deps");
    }

    #[test]
    fn test_wrap_text_preserves_blank_lines() {
        let wrapped = wrap_text("first paragraph\n\nsecond paragraph", 72);
        assert_eq!(wrapped, "first paragraph\n\nsecond paragraph");
    }

    #[test]
    fn test_wrap_text_wraps_long_lines() {
        let long = "word ".repeat(30);
        let wrapped = wrap_text(long.trim(), 20);
        assert!(wrapped.lines().all(|l| l.chars().count() <= 20));
        assert!(wrapped.lines().count() > 1);
    }
}
