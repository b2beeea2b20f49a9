// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the capture SDK.

use thiserror::Error;

/// Errors raised while installing the capture runtime.
#[derive(Debug, Error)]
pub enum SdkError {
	/// One of the supplied entry points is already a capture wrapper.
	#[error("capture already installed for these entry points")]
	AlreadyInstalled,

	/// The page address carries the capture opt-out token.
	#[error("capture disabled by page address opt-out")]
	OptedOut,

	/// No report handler was supplied to the builder.
	#[error("report handler is required")]
	MissingReportHandler,

	/// No host environment was supplied to the builder.
	#[error("host environment is required")]
	MissingHostEnv,
}

/// Convenient result alias for SDK operations.
pub type Result<T> = std::result::Result<T, SdkError>;
