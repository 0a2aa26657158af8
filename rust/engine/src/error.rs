// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for model compilation.

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while normalizing or building a section.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The model is structurally invalid (empty subassembly, unknown element
    /// type, unusable dimension). Fatal: the build is aborted.
    #[error("malformed model: {0}")]
    MalformedModel(String),

    /// A texture could not be loaded. Recovered inside material resolution
    /// with a flat-color fallback; never returned from a build.
    #[error("could not load material texture {reference}: {reason}")]
    MaterialLoad { reference: String, reason: String },

    /// Options are outside their valid range.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// Model or options JSON could not be decoded.
    #[error("invalid document: {0}")]
    Document(#[from] serde_json::Error),

    /// Geometry kernel error.
    #[error("geometry error: {0}")]
    Geometry(#[from] section_geometry::Error),
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedModel(message.into())
    }
}
