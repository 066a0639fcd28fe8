use std::{io::Write, path::Path};

use codespan_reporting::{
    diagnostic::{Diagnostic, Label, Severity},
    files::{Files, SimpleFile},
    term::{self, termcolor::WriteColor},
};

use crate::driver::CompileResult;

/// One `ERROR:`/`WARNING:` line printed by glslangValidator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolMessage {
    pub severity: Severity,
    pub file: String,
    /// 1-based, as printed by the tool.
    pub line: usize,
    pub message: String,
}

/// Extracts `<SEVERITY>: <file>:<line>: <message>` lines from the validator output.
///
/// Summary lines such as `ERROR: 1 compilation errors.  No code generated.` are skipped.
pub fn parse(output: &str) -> Vec<ToolMessage> {
    output.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<ToolMessage> {
    let line = line.trim_end();
    let (severity, rest) = if let Some(rest) = line.strip_prefix("ERROR: ") {
        (Severity::Error, rest)
    } else if let Some(rest) = line.strip_prefix("WARNING: ") {
        (Severity::Warning, rest)
    } else {
        return None;
    };

    // the file name may itself contain ':' (drive letters), so look for the first
    // segment that is a line number
    let segments: Vec<&str> = rest.split(':').collect();
    let index = (1..segments.len().saturating_sub(1)).find(|&i| {
        !segments[i].is_empty() && segments[i].bytes().all(|b| b.is_ascii_digit())
    })?;

    Some(ToolMessage {
        severity,
        file: segments[..index].join(":"),
        line: segments[index].parse().ok()?,
        message: segments[index + 1..].join(":").trim().to_owned(),
    })
}

/// Renders the validator's messages against `source`.
///
/// Returns the number of messages emitted. Messages about other files (includes) or pointing
/// outside the source are emitted without a label.
pub fn emit<W: WriteColor>(
    writer: &mut W,
    messages: &[ToolMessage],
    source: &str,
    path: &str,
) -> anyhow::Result<usize> {
    let files = SimpleFile::new(path, source);
    let config = term::Config::default();

    for message in messages {
        let mut diagnostic =
            Diagnostic::new(message.severity).with_message(message.message.clone());

        let range = message
            .line
            .checked_sub(1)
            .filter(|_| refers_to(&message.file, path))
            .and_then(|index| files.line_range((), index).ok());
        if let Some(range) = range {
            diagnostic = diagnostic.with_labels(vec![Label::primary((), range)]);
        }

        term::emit(writer, &config, &files, &diagnostic)?;
    }

    Ok(messages.len())
}

/// Prints what the validator said about a failed file, pointing into the source where possible.
///
/// Output without recognizable messages, or for a source that can no longer be read, is written
/// verbatim.
pub fn report_failure<W: WriteColor>(writer: &mut W, result: &CompileResult) {
    let output = format!("{}{}", result.stdout, result.stderr);
    let output = output.trim_end();
    let messages = parse(output);

    let source = match std::fs::read_to_string(&result.source) {
        Ok(source) if !messages.is_empty() => source,
        Ok(_) => {
            write_verbatim(writer, output);
            return;
        }
        Err(error) => {
            warn!("could not read {}: {error}", result.source.display());
            write_verbatim(writer, output);
            return;
        }
    };

    let path = result.source.display().to_string();
    if let Err(error) = emit(writer, &messages, &source, &path) {
        warn!("could not print diagnostics: {error:#}");
    }
}

fn write_verbatim<W: WriteColor>(writer: &mut W, output: &str) {
    if output.is_empty() {
        return;
    }
    if let Err(error) = writeln!(writer, "{output}") {
        warn!("could not print compiler output: {error}");
    }
}

fn refers_to(file: &str, path: &str) -> bool {
    file == path || Path::new(path).ends_with(file)
}
