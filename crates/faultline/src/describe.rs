// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Redactor-aware stringification of host values.
//!
//! Descriptions appear in capture context strings and synthesized stack
//! frames, so string content is replaced with the redaction marker here
//! rather than downstream. Description never fails: anything the rules
//! below do not recognize becomes a generic placeholder.

use std::sync::OnceLock;

use faultline_core::redact::{redact_string, shorten};
use regex::Regex;

use crate::host::{HostCallback, HostValue};

/// Maximum length of an anonymous-function source snippet.
const SNIPPET_LEN: usize = 90;

/// Describes an arbitrary host value as a safe string.
pub fn describe(value: &HostValue) -> String {
	match value {
		HostValue::Undefined => "undefined".to_string(),
		HostValue::Null => "null".to_string(),
		HostValue::Bool(b) => b.to_string(),
		HostValue::Number(n) => n.to_string(),
		HostValue::Str(s) => format!("\"{}\"", redact_string(s)),
		HostValue::Date(display) => format!("Date(\"{display}\")"),
		HostValue::ArrayLike { len } => format!("[arraylike object, length = {len}]"),
		HostValue::Object { description } => {
			// Bracketed native tags ("[object Window]") are not user data.
			if bracketed_tag().is_match(description) {
				description.clone()
			} else {
				"[object]".to_string()
			}
		}
		HostValue::Function(callback) => {
			format!("function {}", function_label(callback.name(), callback.source_text()))
		}
	}
}

/// Best-effort display name for a function-like host object.
///
/// Prefers the intrinsic name, then a name token pattern-matched out of
/// the source text, then an anonymous placeholder holding a shortened
/// source snippet. Inaccessible functions get a fixed placeholder.
pub(crate) fn function_label(name: Option<String>, source: Option<String>) -> String {
	if let Some(name) = name.filter(|n| !n.is_empty()) {
		return name;
	}
	match source {
		Some(source) => match name_from_source(&source) {
			Some(name) => name,
			None => format!("[anonymous function: {}]", shorten(&source, SNIPPET_LEN)),
		},
		None => "[inaccessible function]".to_string(),
	}
}

fn name_from_source(source: &str) -> Option<String> {
	static PATTERN: OnceLock<Regex> = OnceLock::new();
	let re = PATTERN.get_or_init(|| {
		Regex::new(r"function ([^(]+)").expect("built-in function-name pattern should be valid")
	});
	re.captures(source)
		.and_then(|c| c.get(1))
		.map(|m| m.as_str().trim().to_string())
		.filter(|name| !name.is_empty())
}

fn bracketed_tag() -> &'static Regex {
	static PATTERN: OnceLock<Regex> = OnceLock::new();
	PATTERN.get_or_init(|| {
		Regex::new(r"^\[[A-Za-z ]*\]$").expect("built-in bracketed-tag pattern should be valid")
	})
}
