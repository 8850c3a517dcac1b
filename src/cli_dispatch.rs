//! Purpose: Hold top-level CLI command dispatch for `husk`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Command behavior, output envelopes, and exit code semantics stay unchanged.
//! Invariants: stdout carries payload JSON only; diagnostics go to stderr.

use super::*;

pub(super) fn dispatch_command(command: Command, color_mode: ColorMode) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "husk", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_value(
                json!({
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                }),
                false,
                color_mode,
            );
            Ok(RunOutcome::ok())
        }
        Command::Peel {
            data,
            file,
            input,
            errors,
            pretty,
        } => run_peel(data, file, input, errors, pretty, color_mode),
        Command::Flatten { data, file, pretty } => run_flatten(data, file, pretty, color_mode),
    }
}

fn run_peel(
    data: Option<String>,
    file: Option<String>,
    input: InputModeCli,
    errors: ErrorPolicyCli,
    pretty: bool,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    // Inline data is always a single textual envelope.
    let mode = if data.is_some() {
        IngestMode::Json
    } else {
        input.into()
    };
    let raw = read_input(data, file.as_deref())?;
    let config = IngestConfig {
        mode,
        errors: errors.into(),
        max_snippet_bytes: DEFAULT_MAX_SNIPPET_BYTES,
    };

    let outcome = peel_input(
        &raw,
        config,
        |value| emit_value(value, pretty, color_mode),
        |failure| emit_notice(&skip_notice("peel", &failure), color_mode),
    )?;

    if outcome.failed > 0 && outcome.ok == 0 {
        return Err(Error::new(ErrorKind::Parse)
            .with_message("no valid envelopes in input")
            .with_hint("Check the input, or select the correct mode with --in."));
    }
    Ok(RunOutcome::ok())
}

fn run_flatten(
    data: Option<String>,
    file: Option<String>,
    pretty: bool,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    let raw = read_input(data, file.as_deref())?;
    if raw.iter().all(|byte| byte.is_ascii_whitespace()) {
        emit_value(Value::Array(Vec::new()), pretty, color_mode);
        return Ok(RunOutcome::ok());
    }
    let batches: Vec<Value> = serde_json::from_slice(&raw).map_err(|err| {
        Error::new(ErrorKind::Parse)
            .with_message("invalid batch input")
            .with_hint("flatten expects a JSON array of batch output objects.")
            .with_source(err)
    })?;
    let records = flatten_outputs(&batches);
    let value = serde_json::to_value(records).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode records")
            .with_source(err)
    })?;
    emit_value(value, pretty, color_mode);
    Ok(RunOutcome::ok())
}

fn skip_notice(cmd: &str, failure: &IngestFailure) -> Notice {
    let mut details = Map::new();
    details.insert("record".to_string(), json!(failure.record));
    if let Some(line) = failure.line {
        details.insert("line".to_string(), json!(line));
    }
    details.insert("reason".to_string(), json!(failure.reason));
    if let Some(snippet) = &failure.snippet {
        details.insert("snippet".to_string(), json!(snippet));
    }
    Notice {
        kind: "skip".to_string(),
        time: notice_time_now().unwrap_or_default(),
        cmd: cmd.to_string(),
        message: format!("skipped record {}: {}", failure.record, failure.reason),
        details,
    }
}
