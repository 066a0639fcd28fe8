use std::path::PathBuf;

use crate::shader::ShaderStage;

/// Problems with the environment or arguments, detected before anything is compiled.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set and no --compiler was given")]
    MissingSdk(&'static str),

    #[error("shader compiler not found at {}", .0.display())]
    CompilerNotFound(PathBuf),

    #[error("no such directory: {}", .0.display())]
    DirectoryNotFound(PathBuf),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("could not read directory {}", path.display())]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("could not run {}", program.display())]
    ToolInvocation {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to generate {stage} shader")]
    StageCompile { stage: ShaderStage, path: PathBuf },

    #[error("could not watch {}", path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}
