//! Read-only browsing of the FFmpeg source tree.

use std::{fs, path::PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lib::{
    errors::ToolError,
    paths::{self, RelativePathViolation},
};

/// Input for `get_ffmpeg_source_code` and `ls_ffmpeg_source_code`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SourcePathRequest {
    /// Path relative to the FFmpeg source root, e.g. `/libavfilter/src_movie.c`.
    #[schemars(length(min = 1))]
    pub path: String,
}

impl SourcePathRequest {
    pub fn validate(&self) -> Result<(), ToolError> {
        if self.path.is_empty() {
            return Err(ToolError::invalid_arguments("path", "Missing file path"));
        }
        Ok(())
    }
}

/// FFmpeg source checkout that client paths are resolved under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTree {
    root: PathBuf,
}

impl SourceTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Join `relative` under the root. An existing target must still be inside the root once
    /// symlinks are resolved; a missing one is returned as-is for the caller to report.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, ToolError> {
        let full_path =
            paths::join_under_root(&self.root, relative).map_err(|violation| match violation {
                RelativePathViolation::ParentTraversal => ToolError::invalid_arguments(
                    "path",
                    "`..` segments are not allowed; paths stay inside the source root",
                ),
                RelativePathViolation::PlatformPrefix => {
                    ToolError::invalid_arguments("path", "drive or UNC prefixes are not allowed")
                }
            })?;
        if !full_path.exists() {
            return Ok(full_path);
        }

        let canonical_error = |err: std::io::Error| {
            ToolError::handler_failed(format!("Error resolving {}: {err}", full_path.display()))
        };
        let root = self.root.canonicalize().map_err(canonical_error)?;
        let target = full_path.canonicalize().map_err(canonical_error)?;
        if !target.starts_with(&root) {
            debug!(
                target: "ffmpeg_mcp::tools",
                path = %full_path.display(),
                resolved = %target.display(),
                "Refused path resolving outside the source root"
            );
            return Err(ToolError::invalid_arguments(
                "path",
                "symlinks may not lead outside the source root",
            ));
        }
        Ok(full_path)
    }

    /// File contents, lossily decoded. A non-file target yields a descriptive message, not an error.
    pub fn read_file(&self, request: &SourcePathRequest) -> Result<String, ToolError> {
        request.validate()?;
        let full_path = self.resolve(&request.path)?;
        if !full_path.is_file() {
            return Ok(format!("Invalid path: {}", full_path.display()));
        }

        match fs::read(&full_path) {
            Ok(bytes) => {
                debug!(
                    target: "ffmpeg_mcp::tools",
                    path = %full_path.display(),
                    bytes = bytes.len(),
                    "Read source file"
                );
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            Err(err) => Ok(format!("Error reading file: {err}")),
        }
    }

    /// Sorted names of the immediate entries of a directory.
    pub fn list_dir(&self, request: &SourcePathRequest) -> Result<Vec<String>, ToolError> {
        request.validate()?;
        let full_path = self.resolve(&request.path)?;
        let read_error = |err: std::io::Error| {
            ToolError::handler_failed(format!(
                "Error reading directory {}: {err}",
                full_path.display()
            ))
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&full_path).map_err(read_error)? {
            let entry = entry.map_err(read_error)?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}
