// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Canonical capture records and the outbound wire shape.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fallback `name` for records whose capture context is unknown.
pub const FALLBACK_CONTEXT: &str = "unidentified host thread";

/// Best-effort source position of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
	pub line: u32,
	pub column: Option<u32>,
}

impl fmt::Display for SourceLocation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.column {
			Some(column) => write!(f, "{}:{}", self.line, column),
			None => write!(f, "{}", self.line),
		}
	}
}

/// Canonical structured description of a captured exception, ready for
/// transport.
///
/// By the time a record exists, `message`, `stack_trace`, and `context`
/// have been through redaction; raw strings never cross the reporting
/// boundary. `environment_info` is the host identification string, which
/// is not user data and stays unredacted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticRecord {
	pub message: String,
	/// Exception classification (a TypeError-equivalent name).
	pub kind: String,
	pub location: Option<SourceLocation>,
	/// Native or synthesized stack text, one frame per line.
	pub stack_trace: String,
	/// Where the catch occurred ("timer callback", "click listener").
	pub context: String,
	/// Seconds since epoch, by the host clock.
	pub timestamp: u64,
	/// Host identification string.
	pub environment_info: String,
}

impl DiagnosticRecord {
	/// Formats the record into the shape the collector consumes.
	///
	/// `redacted_address` is the page address after the embedder's
	/// address redactor has run; the record itself never stores it.
	pub fn to_wire(&self, redacted_address: &str) -> WireReport {
		let trace = format!(
			"Type: {}\nUser-agent: {}\nURL: {}\n\n{}",
			self.kind, self.environment_info, redacted_address, self.stack_trace
		);
		let name = if self.context.is_empty() {
			FALLBACK_CONTEXT.to_string()
		} else {
			self.context.clone()
		};
		WireReport {
			msg: self.message.clone(),
			line: self.location.map(|location| location.to_string()),
			trace: Some(trace),
			ts: self.timestamp,
			name: Some(name),
		}
	}
}

/// Outbound record handed to the report handler.
///
/// Field names are the collector's wire names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireReport {
	pub msg: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub line: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub trace: Option<String>,
	pub ts: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
}
