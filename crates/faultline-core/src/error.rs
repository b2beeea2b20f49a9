// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the capture core.

use thiserror::Error;

/// Errors that can occur in the capture core.
#[derive(Debug, Error)]
pub enum CoreError {
	#[error("unknown host family: {0}")]
	UnknownHostFamily(String),
}

/// Result type for capture core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
