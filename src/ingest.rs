//! Purpose: Turn raw CLI input into normalized envelopes with explicit, testable modes.
//! Exports: `IngestMode`, `ErrorPolicy`, `IngestConfig`, `IngestOutcome`, `IngestFailure`, `peel_input`.
//! Role: Input engine used by the `peel` command; isolates stream handling from main.
//! Invariants: Auto detection is deterministic: whole-input JSON first, JSONL second.
//! Invariants: Skip mode only continues at line boundaries.
//! Invariants: Failure snippets are truncated on character boundaries.
use bstr::ByteSlice;

use husk::api::{Error, ErrorKind, peel_str, peel_value, try_decode};
use serde_json::Value;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum IngestMode {
    Auto,
    Json,
    Jsonl,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorPolicy {
    Stop,
    Skip,
}

#[derive(Copy, Clone, Debug)]
pub struct IngestConfig {
    pub mode: IngestMode,
    pub errors: ErrorPolicy,
    pub max_snippet_bytes: usize,
}

#[derive(Copy, Clone, Debug, Default)]
pub struct IngestOutcome {
    pub records_total: u64,
    pub ok: u64,
    pub failed: u64,
}

#[derive(Clone, Debug)]
pub struct IngestFailure {
    pub record: u64,
    pub line: Option<u64>,
    pub reason: String,
    pub snippet: Option<String>,
}

pub fn peel_input<F, N>(
    raw: &[u8],
    config: IngestConfig,
    mut on_value: F,
    mut on_failure: N,
) -> Result<IngestOutcome, Error>
where
    F: FnMut(Value),
    N: FnMut(IngestFailure),
{
    let text = raw.to_str_lossy();
    let mut outcome = IngestOutcome::default();

    let mut handle_failure = |outcome: &mut IngestOutcome,
                              record: u64,
                              line: Option<u64>,
                              snippet: Option<String>|
     -> Result<(), Error> {
        match config.errors {
            ErrorPolicy::Stop => {
                let mut err = Error::new(ErrorKind::Parse)
                    .with_message("invalid envelope")
                    .with_record(record)
                    .with_hint("Use --errors skip to continue past bad records.");
                if let Some(line) = line {
                    err = err.with_line(line);
                }
                Err(err)
            }
            ErrorPolicy::Skip => {
                outcome.failed += 1;
                on_failure(IngestFailure {
                    record,
                    line,
                    reason: "invalid envelope".to_string(),
                    snippet,
                });
                Ok(())
            }
        }
    };

    match resolve_mode(config.mode, &text) {
        ResolvedMode::Single(Some(parsed)) => {
            // Auto mode already decoded the whole input.
            on_value(peel_value(parsed));
            outcome.ok += 1;
        }
        ResolvedMode::Single(None) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(outcome);
            }
            match peel_str(trimmed) {
                Some(value) => {
                    on_value(value);
                    outcome.ok += 1;
                }
                None => {
                    let snippet = truncate_snippet(trimmed, config.max_snippet_bytes);
                    handle_failure(&mut outcome, 1, None, Some(snippet))?;
                }
            }
        }
        ResolvedMode::Lines => {
            let mut record = 0u64;
            for (idx, raw_line) in text.lines().enumerate() {
                let line = raw_line.trim();
                if line.is_empty() {
                    continue;
                }
                record += 1;
                let line_no = idx as u64 + 1;
                match peel_str(line) {
                    Some(value) => {
                        on_value(value);
                        outcome.ok += 1;
                    }
                    None => {
                        let snippet = truncate_snippet(line, config.max_snippet_bytes);
                        handle_failure(&mut outcome, record, Some(line_no), Some(snippet))?;
                    }
                }
            }
        }
    }

    outcome.records_total = outcome.ok + outcome.failed;
    Ok(outcome)
}

enum ResolvedMode {
    /// One envelope covering the whole input; carries the value when auto
    /// detection already decoded it.
    Single(Option<Value>),
    Lines,
}

fn resolve_mode(mode: IngestMode, text: &str) -> ResolvedMode {
    match mode {
        IngestMode::Json => ResolvedMode::Single(None),
        IngestMode::Jsonl => ResolvedMode::Lines,
        IngestMode::Auto => match try_decode(text.trim()) {
            Some(value) => ResolvedMode::Single(Some(value)),
            None => ResolvedMode::Lines,
        },
    }
}

fn truncate_snippet(input: &str, max: usize) -> String {
    if input.len() <= max {
        return input.to_string();
    }
    let suffix = "...";
    if max <= suffix.len() {
        return suffix[..max].to_string();
    }
    let mut cut = max - suffix.len();
    while cut > 0 && !input.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{suffix}", &input[..cut])
}
