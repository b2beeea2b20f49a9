// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Normalization of thrown host values into a uniform error shape.
//!
//! Hosts disagree on where the interesting fields live: some expose a
//! `stacktrace` string, some only a `stack`, some bury the source line
//! inside the message text. Normalization flattens all of that into one
//! [`ErrorDetails`] that the engine can dispatch or merge with a later
//! global-hook report.

use std::sync::OnceLock;

use faultline_core::capability::HostFamily;
use faultline_core::redact::scrub_quoted_literals;
use regex::Regex;

use crate::host::{HostException, HostValue, Thrown};

/// Uniform shape of a caught error, pre-redaction.
#[derive(Debug, Clone)]
pub(crate) struct ErrorDetails {
	pub kind: String,
	pub message: String,
	pub stack: Option<String>,
	pub line: Option<u32>,
	pub column: Option<u32>,
	pub context: String,
	pub address: Option<String>,
}

impl Default for ErrorDetails {
	fn default() -> Self {
		ErrorDetails {
			kind: "Error".to_string(),
			message: String::new(),
			stack: None,
			line: None,
			column: None,
			context: String::new(),
			address: None,
		}
	}
}

/// Flattens a thrown value into [`ErrorDetails`].
pub(crate) fn normalize(thrown: &Thrown, context: &str, family: HostFamily) -> ErrorDetails {
	let mut details = ErrorDetails { context: context.to_string(), ..ErrorDetails::default() };
	match thrown {
		Thrown::Exception(exception) => fill_from_exception(&mut details, exception, family),
		Thrown::Value(value) => {
			details.message = raw_display(value);
		}
	}
	details
}

fn fill_from_exception(details: &mut ErrorDetails, exception: &HostException, family: HostFamily) {
	if let Some(name) = exception.name.as_ref().filter(|n| !n.is_empty()) {
		details.kind = name.clone();
	}
	details.message = exception.message.clone();
	details.stack = exception.stacktrace.clone().or_else(|| exception.stack.clone());
	if family == HostFamily::Gecko {
		// Gecko interpolates script literals into its stack strings.
		if let Some(stack) = details.stack.take() {
			details.stack = Some(scrub_quoted_literals(&stack));
		}
	}
	details.line = exception.line;
	details.column = exception.column;
	if details.line.is_none() {
		position_from_text(details, family);
	}
}

/// Recovers line/column from stack or message text when the exception
/// carries no structured position.
fn position_from_text(details: &mut ErrorDetails, family: HostFamily) {
	match family {
		HostFamily::Blink => {
			if let Some(stack) = details.stack.as_deref() {
				if let Some(caps) = blink_position().captures(stack) {
					details.line = caps.get(1).and_then(|m| m.as_str().parse().ok());
					details.column = caps.get(2).and_then(|m| m.as_str().parse().ok());
				}
			}
		}
		HostFamily::Presto => {
			if let Some(stack) = details.stack.as_deref() {
				if let Some(caps) = presto_position().captures(stack) {
					details.line = caps.get(1).and_then(|m| m.as_str().parse().ok());
					details.column = caps.get(2).and_then(|m| m.as_str().parse().ok());
				} else if let Some(caps) = presto_line_only().captures(stack) {
					details.line = caps.get(1).and_then(|m| m.as_str().parse().ok());
				}
			}
		}
		_ => {}
	}
}

/// Displays a non-exception thrown value without redaction; the engine
/// redacts the assembled message as a whole.
fn raw_display(value: &HostValue) -> String {
	match value {
		HostValue::Undefined => "undefined".to_string(),
		HostValue::Null => "null".to_string(),
		HostValue::Bool(b) => b.to_string(),
		HostValue::Number(n) => n.to_string(),
		HostValue::Str(s) => s.clone(),
		HostValue::Date(display) => display.clone(),
		HostValue::ArrayLike { len } => format!("[arraylike object, length = {len}]"),
		HostValue::Object { description } => description.clone(),
		HostValue::Function(callback) => {
			crate::describe::describe(&HostValue::Function(callback.clone()))
		}
	}
}

fn blink_position() -> &'static Regex {
	static PATTERN: OnceLock<Regex> = OnceLock::new();
	PATTERN.get_or_init(|| {
		Regex::new(r":(\d+):(\d+)\)?(\n|$)").expect("built-in position pattern should be valid")
	})
}

fn presto_position() -> &'static Regex {
	static PATTERN: OnceLock<Regex> = OnceLock::new();
	PATTERN.get_or_init(|| {
		Regex::new(r"Error thrown at line (\d+), column (\d+)")
			.expect("built-in position pattern should be valid")
	})
}

fn presto_line_only() -> &'static Regex {
	static PATTERN: OnceLock<Regex> = OnceLock::new();
	PATTERN.get_or_init(|| {
		Regex::new(r"Error thrown at line (\d+)")
			.expect("built-in position pattern should be valid")
	})
}
