pub mod diagnostics;
pub mod set;
pub mod validate;

use std::{fmt, path::Path};

pub use set::ShaderSet;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    Tessellation,
}

impl ShaderStage {
    /// All stages, in the order they are compiled.
    pub const ALL: [ShaderStage; 4] = [
        ShaderStage::Vertex,
        ShaderStage::Fragment,
        ShaderStage::Geometry,
        ShaderStage::Tessellation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Tessellation => "tessellation",
        }
    }

    pub fn source_suffix(self) -> &'static str {
        match self {
            ShaderStage::Vertex => ".vert",
            ShaderStage::Fragment => ".frag",
            ShaderStage::Geometry => ".geom",
            ShaderStage::Tessellation => ".tess",
        }
    }

    /// Classifies a file name by its exact (case-sensitive) suffix.
    pub fn from_file_name(name: &str) -> Option<ShaderStage> {
        Self::ALL
            .into_iter()
            .find(|stage| name.ends_with(stage.source_suffix()))
    }

    pub fn from_path(path: &Path) -> Option<ShaderStage> {
        Self::from_file_name(path.file_name()?.to_str()?)
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the part of the output name before its suffix is derived from the source name.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum BaseName {
    /// Remove only the stage's source suffix: `shader.v1.vert` -> `shader.v1`.
    #[default]
    StripSuffix,
    /// Keep everything before the first `.`: `shader.v1.vert` -> `shader`.
    FirstDot,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct OutputNaming {
    pub base: BaseName,
    /// Give tessellation shaders the geometry suffix (`.gspv`) instead of `.tspv`.
    pub tessellation_as_geometry: bool,
}

impl OutputNaming {
    /// First-dot base names and `.gspv` for tessellation.
    pub fn legacy() -> OutputNaming {
        OutputNaming {
            base: BaseName::FirstDot,
            tessellation_as_geometry: true,
        }
    }

    pub fn output_suffix(&self, stage: ShaderStage) -> &'static str {
        match stage {
            ShaderStage::Vertex => ".vspv",
            ShaderStage::Fragment => ".fspv",
            ShaderStage::Geometry => ".gspv",
            ShaderStage::Tessellation if self.tessellation_as_geometry => ".gspv",
            ShaderStage::Tessellation => ".tspv",
        }
    }

    pub fn output_name(&self, stage: ShaderStage, source_name: &str) -> String {
        let base = match self.base {
            BaseName::StripSuffix => source_name
                .strip_suffix(stage.source_suffix())
                .unwrap_or(source_name),
            BaseName::FirstDot => source_name.split('.').next().unwrap_or(source_name),
        };
        format!("{base}{}", self.output_suffix(stage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_exact_suffix() {
        assert_eq!(ShaderStage::from_file_name("a.vert"), Some(ShaderStage::Vertex));
        assert_eq!(ShaderStage::from_file_name("a.frag"), Some(ShaderStage::Fragment));
        assert_eq!(ShaderStage::from_file_name("a.geom"), Some(ShaderStage::Geometry));
        assert_eq!(
            ShaderStage::from_file_name("a.tess"),
            Some(ShaderStage::Tessellation)
        );

        assert_eq!(ShaderStage::from_file_name("a.VERT"), None);
        assert_eq!(ShaderStage::from_file_name("a.vert.bak"), None);
        assert_eq!(ShaderStage::from_file_name("a.vspv"), None);
        assert_eq!(ShaderStage::from_file_name("vert"), None);
        assert_eq!(ShaderStage::from_file_name(".vert"), Some(ShaderStage::Vertex));
    }

    #[test]
    fn default_naming_strips_only_the_source_suffix() {
        let naming = OutputNaming::default();
        assert_eq!(naming.output_name(ShaderStage::Vertex, "a.vert"), "a.vspv");
        assert_eq!(
            naming.output_name(ShaderStage::Vertex, "shader.v1.vert"),
            "shader.v1.vspv"
        );
        assert_eq!(naming.output_name(ShaderStage::Fragment, "lit.frag"), "lit.fspv");
        assert_eq!(naming.output_name(ShaderStage::Geometry, "g.geom"), "g.gspv");
        assert_eq!(naming.output_name(ShaderStage::Tessellation, "t.tess"), "t.tspv");
    }

    #[test]
    fn legacy_naming_truncates_at_first_dot() {
        let naming = OutputNaming::legacy();
        assert_eq!(
            naming.output_name(ShaderStage::Vertex, "shader.v1.vert"),
            "shader.vspv"
        );
        assert_eq!(naming.output_name(ShaderStage::Vertex, ".vert"), ".vspv");
        assert_eq!(naming.output_name(ShaderStage::Tessellation, "t.tess"), "t.gspv");
    }
}
