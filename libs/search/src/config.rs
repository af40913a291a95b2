//! Compiler configuration
//!
//! Everything the compiler needs to know about the deployment is passed in
//! through [`CompilerConfig`]. The compiler never reads global state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Base URI of the repository. Human collection ids are resolved to
    /// `{base_uri}/collection/{id}`.
    pub base_uri: String,
    /// Substring that marks a canonical container id.
    pub container_marker: String,
    /// Target of the `ADMIN` grant that makes a user a system administrator.
    pub global_grant_target: String,
    /// License value stored on objects without a license.
    pub no_license: String,
    /// Radius used for geo queries without an explicit, non-zero radius.
    pub default_point_radius: String,
    /// Named file-type groups (lower-case name → extensions).
    pub file_types: BTreeMap<String, Vec<String>>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            base_uri: "http://localhost:8080/atrium".to_string(),
            container_marker: "/collection/".to_string(),
            global_grant_target: "http://localhost:8080/atrium/".to_string(),
            no_license: "no_license".to_string(),
            default_point_radius: "1cm".to_string(),
            file_types: default_file_types(),
        }
    }
}

impl CompilerConfig {
    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = base_uri.into();
        self
    }

    pub fn with_global_grant_target(mut self, target: impl Into<String>) -> Self {
        self.global_grant_target = target.into();
        self
    }

    pub fn with_file_type(mut self, name: &str, extensions: &[&str]) -> Self {
        self.file_types.insert(
            name.to_lowercase(),
            extensions.iter().map(|e| e.to_string()).collect(),
        );
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_uri.trim().is_empty() {
            return Err(Error::InvalidConfig("base_uri must not be empty".into()));
        }
        if self.container_marker.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "container_marker must not be empty".into(),
            ));
        }
        if self.global_grant_target.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "global_grant_target must not be empty".into(),
            ));
        }
        if let Some((name, _)) = self.file_types.iter().find(|(_, exts)| exts.is_empty()) {
            return Err(Error::InvalidConfig(format!(
                "file type '{name}' has no extensions"
            )));
        }
        Ok(())
    }

    /// Canonical container id for a human collection id.
    pub fn container_id(&self, id: &str) -> String {
        let id = id.replace('"', "");
        let id = id.trim();
        if id.contains(&self.container_marker) {
            return id.to_string();
        }
        format!(
            "{}{}{}",
            self.base_uri.trim_end_matches('/'),
            self.container_marker,
            id
        )
    }

    pub fn is_container_id(&self, id: &str) -> bool {
        id.contains(&self.container_marker)
    }

    /// Extensions of the named file-type group, case-insensitive.
    pub fn extensions_for(&self, file_type: &str) -> Option<&[String]> {
        self.file_types
            .get(&file_type.trim().to_lowercase())
            .map(Vec::as_slice)
    }
}

fn default_file_types() -> BTreeMap<String, Vec<String>> {
    let groups: [(&str, &[&str]); 4] = [
        (
            "image",
            &["jpg", "jpeg", "tif", "tiff", "jp2", "pbm", "gif", "png", "psd"],
        ),
        (
            "video",
            &[
                "wmv", "swf", "rm", "mp4", "mpg", "m4v", "avi", "mov", "asf", "flv", "srt", "vob",
            ],
        ),
        (
            "audio",
            &["aif", "iff", "m3u", "m4a", "mid", "mpa", "mp3", "ra", "wav", "wma"],
        ),
        (
            "document",
            &[
                "doc", "docx", "odt", "pages", "rtf", "tex", "bib", "csv", "ppt", "pps", "pptx",
                "key", "xls", "xlr", "xlsx", "ods", "pdf",
            ],
        ),
    ];
    groups
        .iter()
        .map(|(name, exts)| (name.to_string(), exts.iter().map(|e| e.to_string()).collect()))
        .collect()
}
