//! Error handling for CarveKit
//!
//! Provides error types for the layers of the engine:
//! - Block errors (tree structure / capability dispatch)
//! - CAM errors (toolpath synthesis)
//!
//! Geometric "no solution" outcomes are deliberately *not* errors: they
//! surface as `Option`/empty results so callers can substitute fallbacks.
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Block tree / capability dispatch error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    /// The block variant does not implement the requested capability.
    #[error("Capability {capability} is not supported by {variant}")]
    Unsupported {
        /// The capability that was requested.
        capability: &'static str,
        /// The block variant it was requested on.
        variant: &'static str,
    },

    /// A block id refers to a slot that no longer holds a node.
    #[error("Stale block id")]
    StaleId,
}

/// Toolpath synthesis error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CamError {
    /// No Tool block precedes the construct being milled.
    #[error("No applicable tool found for block")]
    ToolNotFound,

    /// A sketch has no extrusion describing its depth profile.
    #[error("Sketch has no extrusion profile")]
    MissingExtrusion,

    /// The extrusion profile never reaches the queried depth.
    #[error("Depth profile undefined at z = {z}")]
    ProfileUndefined {
        /// The depth that was queried.
        z: f64,
    },

    /// The construct has no millable geometry left after pruning.
    #[error("No millable geometry: {reason}")]
    EmptyGeometry {
        /// Why nothing remained.
        reason: String,
    },
}

/// Top-level error type aggregating all engine layers.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Block tree error.
    #[error(transparent)]
    Block(#[from] BlockError),

    /// CAM error.
    #[error(transparent)]
    Cam(#[from] CamError),
}

/// Result alias using the aggregate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
