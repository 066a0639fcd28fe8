use std::{
    io::Read,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
    sync::mpsc::{self, Receiver},
    time::{Duration, Instant},
};

use super::ShaderStage;
use crate::error::{ConfigError, Error};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long to keep reading the pipes once the child is gone. Anything the child spawned may
/// still hold them open.
const READ_GRACE: Duration = Duration::from_secs(1);

#[cfg(windows)]
pub const VALIDATOR_EXECUTABLE: &str = "glslangValidator.exe";
#[cfg(not(windows))]
pub const VALIDATOR_EXECUTABLE: &str = "glslangValidator";

/// One source file to compile.
#[derive(Debug, Clone, Copy)]
pub struct CompileRequest<'a> {
    pub stage: ShaderStage,
    pub source: &'a Path,
    pub output: &'a Path,
}

/// What the compiler process did, with everything it printed.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// `None` if the process was killed after the timeout.
    pub status: Option<ExitStatus>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

/// Something that can turn a shader source into a compiled artifact.
pub trait Compiler {
    fn compile(&self, request: &CompileRequest) -> Result<ToolOutput, Error>;
}

/// `glslangValidator`, run once per file.
#[derive(Debug, Clone)]
pub struct Glslang {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl Glslang {
    pub fn new(program: impl Into<PathBuf>, timeout: Option<Duration>) -> Glslang {
        Glslang {
            program: program.into(),
            timeout,
        }
    }

    /// Locates the validator inside an SDK installation (`<root>/bin/glslangValidator`).
    pub fn in_sdk(sdk_root: &Path, timeout: Option<Duration>) -> Result<Glslang, ConfigError> {
        let program = sdk_root.join("bin").join(VALIDATOR_EXECUTABLE);
        if !program.is_file() {
            return Err(ConfigError::CompilerNotFound(program));
        }
        Ok(Glslang::new(program, timeout))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, request: &CompileRequest) -> Command {
        let mut command = Command::new(&self.program);
        // -V: validate and generate SPIR-V, -H: print human readable SPIR-V
        command
            .arg("-V")
            .arg("-H")
            .arg(request.source)
            .arg("-o")
            .arg(request.output);
        command
    }
}

impl Compiler for Glslang {
    fn compile(&self, request: &CompileRequest) -> Result<ToolOutput, Error> {
        debug!(
            stage = %request.stage,
            program = ?self.program,
            source = ?request.source,
            "invoking validator"
        );
        run_with_timeout(self.command(request), self.timeout).map_err(|source| {
            Error::ToolInvocation {
                program: self.program.clone(),
                source,
            }
        })
    }
}

/// Runs `command` to completion, capturing its output.
///
/// If `timeout` elapses first the child is killed and the returned status is `None`. With a
/// timeout the pipes are read for at most [`READ_GRACE`] after the child exits, so a leftover
/// grandchild holding them open cannot stall the caller.
pub fn run_with_timeout(
    mut command: Command,
    timeout: Option<Duration>,
) -> std::io::Result<ToolOutput> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let start = Instant::now();
    let mut child = command.spawn()?;

    // drain both pipes while waiting, otherwise a chatty child blocks on a full pipe
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = loop {
        if let Some(status) = child.try_wait()? {
            break Some(status);
        }

        if timeout.map_or(false, |limit| start.elapsed() >= limit) {
            let _ = child.kill();
            child.wait()?;
            break None;
        }

        std::thread::sleep(POLL_INTERVAL);
    };

    let grace = timeout.map(|_| Instant::now() + READ_GRACE);
    Ok(ToolOutput {
        status,
        stdout: collect(stdout, grace),
        stderr: collect(stderr, grace),
        elapsed: start.elapsed(),
    })
}

fn drain(pipe: Option<impl Read + Send + 'static>) -> Option<Receiver<Vec<u8>>> {
    let mut pipe = pipe?;
    let (sender, receiver) = mpsc::channel();
    std::thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = pipe.read_to_end(&mut buffer);
        let _ = sender.send(buffer);
    });
    Some(receiver)
}

/// Waits for a reader thread, giving up at `deadline` if there is one.
fn collect(receiver: Option<Receiver<Vec<u8>>>, deadline: Option<Instant>) -> String {
    let Some(receiver) = receiver else {
        return String::new();
    };

    let bytes = match deadline {
        Some(deadline) => {
            let remaining = deadline.saturating_duration_since(Instant::now());
            receiver.recv_timeout(remaining).unwrap_or_else(|_| {
                warn!("output pipe still open after the compiler exited, dropping its output");
                Vec::new()
            })
        }
        None => receiver.recv().unwrap_or_default(),
    };
    String::from_utf8_lossy(&bytes).into_owned()
}
