use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Parser;

use crate::{
    driver::FailurePolicy,
    error::ConfigError,
    shader::{validate::Glslang, BaseName, OutputNaming},
};

/// Environment variable pointing at the Vulkan SDK installation.
pub const SDK_VARIABLE: &str = "VULKAN_SDK";

/// Compile every shader in a directory with glslangValidator.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Directory containing the shader sources [default: the working directory]
    pub directory: Option<PathBuf>,

    /// glslangValidator to run instead of $VULKAN_SDK/bin/glslangValidator. A bare name is
    /// looked up on PATH
    #[arg(long, value_name = "PROGRAM")]
    pub compiler: Option<PathBuf>,

    /// Seconds to wait for each file before killing the compiler (0 waits forever)
    #[arg(long, value_name = "SECONDS", default_value_t = 120)]
    pub timeout: u64,

    /// Keep compiling after a failure and report every failed file at the end
    #[arg(long)]
    pub keep_going: bool,

    /// Legacy output names: cut at the first '.' and write tessellation shaders as .gspv
    #[arg(long)]
    pub legacy_naming: bool,

    /// Recompile whenever a shader source in the directory changes
    #[arg(long)]
    pub watch: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub directory: PathBuf,
    pub compiler: Glslang,
    pub naming: OutputNaming,
    pub policy: FailurePolicy,
    pub watch: bool,
}

impl Config {
    /// Validates the arguments once, up front.
    ///
    /// `sdk_root` is the value of [`SDK_VARIABLE`], only consulted when no compiler path was
    /// given explicitly.
    pub fn resolve(
        args: Args,
        sdk_root: Option<PathBuf>,
        working_directory: &Path,
    ) -> Result<Config, ConfigError> {
        let timeout = match args.timeout {
            0 => None,
            seconds => Some(Duration::from_secs(seconds)),
        };

        let compiler = match (args.compiler, sdk_root) {
            (Some(program), _) if is_bare_name(&program) || program.is_file() => {
                Glslang::new(program, timeout)
            }
            (Some(program), _) => return Err(ConfigError::CompilerNotFound(program)),
            (None, Some(root)) => Glslang::in_sdk(&root, timeout)?,
            (None, None) => return Err(ConfigError::MissingSdk(SDK_VARIABLE)),
        };

        let directory = match args.directory {
            Some(directory) => working_directory.join(directory),
            None => working_directory.to_path_buf(),
        };

        let naming = if args.legacy_naming {
            OutputNaming::legacy()
        } else {
            OutputNaming {
                base: BaseName::StripSuffix,
                tessellation_as_geometry: false,
            }
        };

        let policy = if args.keep_going {
            FailurePolicy::KeepGoing
        } else {
            FailurePolicy::HaltOnFirst
        };

        Ok(Config {
            directory,
            compiler,
            naming,
            policy,
            watch: args.watch,
        })
    }
}

/// A single relative component like `glslangValidator`, which the OS resolves through `PATH`.
fn is_bare_name(program: &Path) -> bool {
    program.is_relative() && program.components().count() == 1
}
