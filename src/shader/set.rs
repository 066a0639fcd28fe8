use std::path::{Path, PathBuf};

use super::ShaderStage;
use crate::error::{ConfigError, Error};

/// Shader sources found directly inside one directory, partitioned by stage.
///
/// Built once from a snapshot of the directory; later changes to the directory are not picked up.
#[derive(Debug, Clone)]
pub struct ShaderSet {
    directory: PathBuf,
    vertex: Vec<String>,
    fragment: Vec<String>,
    geometry: Vec<String>,
    tessellation: Vec<String>,
}

impl ShaderSet {
    pub fn new(directory: impl Into<PathBuf>) -> ShaderSet {
        ShaderSet {
            directory: directory.into(),
            vertex: Vec::new(),
            fragment: Vec::new(),
            geometry: Vec::new(),
            tessellation: Vec::new(),
        }
    }

    /// Lists the files directly inside `directory` and sorts the shader sources by suffix.
    ///
    /// Files with any other suffix are ignored. Emits a warning for every stage without files.
    pub fn discover(directory: impl AsRef<Path>) -> Result<ShaderSet, Error> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            return Err(ConfigError::DirectoryNotFound(directory.to_path_buf()).into());
        }

        let mut set = ShaderSet::new(directory);

        let entries = walkdir::WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()));

        for entry in entries {
            let entry = entry.map_err(|source| Error::ReadDirectory {
                path: directory.to_path_buf(),
                source,
            })?;

            // symlinks count when they point at a regular file
            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            if !is_file {
                continue;
            }

            let Some(name) = entry.file_name().to_str() else {
                debug!(path = ?entry.path(), "skipping file with a non UTF-8 name");
                continue;
            };

            if let Some(stage) = ShaderStage::from_file_name(name) {
                set.push(stage, name);
            }
        }

        for stage in set.missing_stages() {
            warn!("no {stage} shader files found");
        }

        Ok(set)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn push(&mut self, stage: ShaderStage, name: impl Into<String>) {
        self.files_mut(stage).push(name.into());
    }

    pub fn files(&self, stage: ShaderStage) -> &[String] {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
            ShaderStage::Geometry => &self.geometry,
            ShaderStage::Tessellation => &self.tessellation,
        }
    }

    fn files_mut(&mut self, stage: ShaderStage) -> &mut Vec<String> {
        match stage {
            ShaderStage::Vertex => &mut self.vertex,
            ShaderStage::Fragment => &mut self.fragment,
            ShaderStage::Geometry => &mut self.geometry,
            ShaderStage::Tessellation => &mut self.tessellation,
        }
    }

    /// Every file in compile order: by stage first, then in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (ShaderStage, &str)> + '_ {
        ShaderStage::ALL.into_iter().flat_map(move |stage| {
            self.files(stage)
                .iter()
                .map(move |name| (stage, name.as_str()))
        })
    }

    pub fn missing_stages(&self) -> Vec<ShaderStage> {
        ShaderStage::ALL
            .into_iter()
            .filter(|&stage| self.files(stage).is_empty())
            .collect()
    }

    pub fn len(&self) -> usize {
        ShaderStage::ALL
            .into_iter()
            .map(|stage| self.files(stage).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
