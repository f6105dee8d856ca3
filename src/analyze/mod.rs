//! Change analysis: extraction, classification, and message synthesis.

pub mod classify;
pub mod extract;
pub mod status;
pub mod synthesize;

pub use classify::{Classification, CommitType, Confidence, classify_changes, infer_scope};
pub use extract::{AnalysisMode, DEFAULT_CONTEXT_LINES, FileChange, Hunk, extract_changes};
pub use status::{StatusSnapshot, optimized_status};
pub use synthesize::{CommitMessage, synthesize_message};

use git2::Repository;
use serde::Serialize;
use tracing::debug;

use crate::config::MessageConfig;
use crate::error::AnalyzeError;

/// Caller inputs for one generate request.
///
/// `commit_type` and `scope`, when supplied, override classifier
/// inference entirely.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub commit_type: Option<CommitType>,
    pub scope: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    pub lite_mode: bool,
    pub context_lines: Option<u32>,
    pub config: MessageConfig,
}

/// The full response for a generate request: the message plus everything
/// a human or downstream model needs to judge it.
#[derive(Debug, Clone, Serialize)]
pub struct CommitReport {
    pub message: CommitMessage,
    pub commit_type: CommitType,
    pub scope: Option<String>,
    pub confidence: Confidence,
    pub rationale: Vec<String>,
    pub files: Vec<String>,
}

/// Analyze the working tree and synthesize a candidate commit message.
///
/// Deterministic for an unchanged repository snapshot: same changes in,
/// same message out. Read-only; safe to retry.
pub fn generate_commit_message(
    repo: &Repository,
    opts: &GenerateOptions,
) -> Result<CommitReport, AnalyzeError> {
    let mode = if opts.lite_mode {
        AnalysisMode::Lite
    } else {
        AnalysisMode::Full {
            context_lines: opts.context_lines.unwrap_or(DEFAULT_CONTEXT_LINES),
        }
    };

    let changes = extract_changes(repo, mode)?;
    let mut classification = classify_changes(&changes);

    if let Some(commit_type) = opts.commit_type {
        debug!("caller supplied commit type {commit_type}, overriding inference");
        classification.commit_type = commit_type;
        classification
            .rationale
            .push("commit type supplied by caller".to_string());
    }
    if let Some(scope) = &opts.scope {
        classification.scope = Some(scope.clone());
        classification
            .rationale
            .push("scope supplied by caller".to_string());
    }

    let message = synthesize_message(
        &classification,
        opts.description.as_deref(),
        opts.body.as_deref(),
        &changes,
        &opts.config,
    );

    // A derived description is a best-effort placeholder for human
    // editing, whatever the classifier thought of the type.
    let confidence = if opts.description.is_none() {
        Confidence::Low
    } else {
        classification.confidence
    };

    Ok(CommitReport {
        message,
        commit_type: classification.commit_type,
        scope: classification.scope,
        confidence,
        rationale: classification.rationale,
        files: changes.iter().map(|c| c.path.clone()).collect(),
    })
}
