use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use codespan_reporting::term::termcolor::WriteColor;

use crate::{
    error::Error,
    shader::{
        diagnostics,
        validate::{CompileRequest, Compiler, ToolOutput},
        OutputNaming, ShaderSet, ShaderStage,
    },
};

/// What to do after a file fails to compile.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the pass at the first failure.
    #[default]
    HaltOnFirst,
    /// Attempt every file and report all failures at the end.
    KeepGoing,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    Compiled,
    /// The compiler exited with a non-zero status (`None` if it was ended by a signal).
    Failed { exit_code: Option<i32> },
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct CompileResult {
    pub stage: ShaderStage,
    pub source: PathBuf,
    pub output: PathBuf,
    pub outcome: Outcome,
    /// Only kept for failures; on success this is the `-H` disassembly and is dropped.
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl CompileResult {
    pub fn succeeded(&self) -> bool {
        self.outcome == Outcome::Compiled
    }
}

/// Everything that happened during one pass over a [`ShaderSet`].
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub results: Vec<CompileResult>,
    /// Files were left unattempted because of an earlier failure.
    pub halted: bool,
}

impl RunSummary {
    pub fn failures(&self) -> impl Iterator<Item = &CompileResult> + '_ {
        self.results.iter().filter(|result| !result.succeeded())
    }

    pub fn compiled(&self) -> usize {
        self.results.iter().filter(|result| result.succeeded()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Turns the first failure into a [`Error::StageCompile`].
    pub fn into_result(self) -> Result<RunSummary, Error> {
        let first = self
            .failures()
            .next()
            .map(|failure| (failure.stage, failure.source.clone()));

        match first {
            Some((stage, path)) => Err(Error::StageCompile { stage, path }),
            None => Ok(self),
        }
    }
}

pub struct Driver<'a, C> {
    compiler: &'a C,
    naming: OutputNaming,
    policy: FailurePolicy,
}

impl<'a, C: Compiler> Driver<'a, C> {
    pub fn new(compiler: &'a C, naming: OutputNaming, policy: FailurePolicy) -> Self {
        Driver {
            compiler,
            naming,
            policy,
        }
    }

    pub fn output_path(&self, directory: &Path, stage: ShaderStage, name: &str) -> PathBuf {
        directory.join(self.naming.output_name(stage, name))
    }

    /// Discovers the shaders in `directory`, compiles them and writes the validator's
    /// diagnostics for every failed file to `diagnostics`.
    ///
    /// Returns [`Error::StageCompile`] for the first failed file.
    pub fn compile_directory<W: WriteColor>(
        &self,
        directory: &Path,
        diagnostics: &mut W,
    ) -> Result<RunSummary, Error> {
        let set = ShaderSet::discover(directory)?;
        if set.is_empty() {
            warn!("no shader files found in {}", set.directory().display());
        }

        let summary = self.run(&set)?;

        for result in summary.results.iter().filter(|result| result.succeeded()) {
            debug!(elapsed = ?result.elapsed, "wrote {}", result.output.display());
        }

        if !summary.is_success() {
            for failure in summary.failures() {
                diagnostics::report_failure(diagnostics, failure);
            }

            let failures = summary.failures().count();
            if summary.halted {
                warn!("remaining shader files were skipped after the first failure");
            } else if failures > 1 {
                error!("{failures} of {} shader files failed to compile", set.len());
            }
        }

        let summary = summary.into_result()?;
        info!(compiled = summary.compiled(), "completed");
        Ok(summary)
    }

    /// Compiles every file of `set`, vertex shaders first, then fragment, geometry and
    /// tessellation.
    ///
    /// Compile failures end up in the summary. Only a compiler that cannot be run at all is
    /// returned as an error.
    pub fn run(&self, set: &ShaderSet) -> Result<RunSummary, Error> {
        let mut summary = RunSummary::default();

        for (stage, name) in set.iter() {
            let source = set.directory().join(name);
            let output = self.output_path(set.directory(), stage, name);

            info!("compiling {stage} shader file: {name}");

            let request = CompileRequest {
                stage,
                source: &source,
                output: &output,
            };
            let tool = self.compiler.compile(&request)?;
            let result = Self::inspect(stage, source, output, tool);

            let failed = !result.succeeded();
            summary.results.push(result);

            if failed && self.policy == FailurePolicy::HaltOnFirst {
                summary.halted = summary.results.len() < set.len();
                break;
            }
        }

        Ok(summary)
    }

    fn inspect(
        stage: ShaderStage,
        source: PathBuf,
        output: PathBuf,
        tool: ToolOutput,
    ) -> CompileResult {
        let outcome = match tool.status {
            None => Outcome::TimedOut,
            Some(status) if status.success() => Outcome::Compiled,
            Some(status) => Outcome::Failed {
                exit_code: status.code(),
            },
        };

        if !tool.stdout.is_empty() {
            trace!(source = ?source, "{}", tool.stdout.trim_end());
        }

        match outcome {
            Outcome::Compiled => {
                if !output.is_file() {
                    warn!(
                        "compiler reported success but {} was not written",
                        output.display()
                    );
                }
            }
            Outcome::Failed { exit_code } => {
                error!(?exit_code, "failed to generate {stage} shader: {}", source.display());
            }
            Outcome::TimedOut => {
                error!(
                    elapsed = ?tool.elapsed,
                    "timed out generating {stage} shader: {}",
                    source.display()
                );
            }
        }

        let stdout = match outcome {
            Outcome::Compiled => String::new(),
            _ => tool.stdout,
        };

        CompileResult {
            stage,
            source,
            output,
            outcome,
            stdout,
            stderr: tool.stderr,
            elapsed: tool.elapsed,
        }
    }
}
