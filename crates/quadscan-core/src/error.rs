// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Quadscan.

use thiserror::Error;

/// Top-level error type for all Quadscan operations.
///
/// Only [`QuadscanError::InvalidImage`] can come out of the detection pipeline
/// itself. A photo without a quadrilateral is a normal result, not an error.
#[derive(Debug, Error)]
pub enum QuadscanError {
    // -- Pipeline input --
    #[error("invalid image: {0}")]
    InvalidImage(String),

    // -- Acquisition / presentation boundary --
    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, QuadscanError>;
