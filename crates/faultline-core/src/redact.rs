// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! String redaction primitives for user privacy.
//!
//! Everything in this module is a pure function and must never fail: a
//! failure to make sense of the input degrades to the fixed marker or to
//! the input unchanged, never to a propagated error. Redaction is
//! irreversible by design.

use std::sync::OnceLock;

use regex::Regex;

/// Marker substituted for any string content judged sensitive.
pub const REDACTED: &str = "[string redacted]";

/// Replaces a string with the fixed redaction marker.
///
/// The output never depends on the input, which makes redaction
/// trivially idempotent: scrubbing an already-scrubbed string yields the
/// same marker, never a nested one.
pub fn redact_string(_s: &str) -> &'static str {
	REDACTED
}

/// Truncates `s` to at most `max_len` characters, appending an ellipsis
/// when anything was cut.
pub fn shorten(s: &str, max_len: usize) -> String {
	if s.chars().count() <= max_len {
		s.to_string()
	} else {
		let cut: String = s.chars().take(max_len).collect();
		format!("{cut}...")
	}
}

/// Default address redactor: blanks the values of `q=`-style query
/// parameters, the common case of sensitive content embedded in a page
/// address. Embedders with richer address schemes supply their own.
pub fn redact_query_values(s: &str) -> String {
	static PATTERN: OnceLock<Regex> = OnceLock::new();
	let re = PATTERN.get_or_init(|| {
		Regex::new(r"([#?&][Qq]=)[^=&#\s]*").expect("built-in query-value pattern should be valid")
	});
	re.replace_all(s, "${1}[redacted]").into_owned()
}

/// Scrubs quoted string literals out of a block of stack-trace text.
///
/// This is only correct for the one host family whose stack strings are
/// known to embed literal argument values with these quoting rules; the
/// capability detector gates its use. Quote characters preceded by an
/// odd number of consecutive backslashes are escaped and do not open or
/// close a literal:
///
/// ```text
/// \"    escaped quote
/// \\"   escaped backslash, unescaped quote
/// \\\"  escaped backslash, escaped quote
/// ```
///
/// Remaining quotes are paired left to right per line; an unpaired
/// trailing quote closes implicitly at end of line. The content between
/// each pair is replaced with the marker, leaving the quotes, the
/// backslash escaping, and the surrounding text untouched.
pub fn scrub_quoted_literals(text: &str) -> String {
	if !text.contains('"') {
		return text.to_string();
	}
	text.split('\n').map(scrub_line).collect::<Vec<_>>().join("\n")
}

fn scrub_line(line: &str) -> String {
	if !line.contains('"') {
		return line.to_string();
	}

	let bytes = line.as_bytes();
	let mut quotes: Vec<usize> = Vec::new();
	for (i, &b) in bytes.iter().enumerate() {
		if b != b'"' {
			continue;
		}
		let mut backslashes = 0usize;
		while backslashes < i && bytes[i - backslashes - 1] == b'\\' {
			backslashes += 1;
		}
		if backslashes % 2 == 0 {
			quotes.push(i);
		}
	}

	if quotes.len() % 2 == 1 {
		// Unpaired trailing quote closes implicitly at end of line.
		quotes.push(line.len());
	}

	// Replace right to left so earlier byte offsets stay valid.
	let mut scrubbed = line.to_string();
	let mut i = quotes.len();
	while i >= 2 {
		let open = quotes[i - 2];
		let close = quotes[i - 1];
		scrubbed.replace_range(open + 1..close, REDACTED);
		i -= 2;
	}
	scrubbed
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn redact_string_is_fixed_marker() {
		assert_eq!(redact_string("secret"), REDACTED);
		assert_eq!(redact_string(""), REDACTED);
		// Scrubbing an already-scrubbed string yields the same marker.
		assert_eq!(redact_string(REDACTED), REDACTED);
	}

	#[test]
	fn shorten_leaves_short_strings_alone() {
		assert_eq!(shorten("abc", 5), "abc");
		assert_eq!(shorten("abcde", 5), "abcde");
	}

	#[test]
	fn shorten_truncates_with_ellipsis() {
		assert_eq!(shorten("abcdef", 5), "abcde...");
	}

	#[test]
	fn shorten_is_multibyte_safe() {
		assert_eq!(shorten("αβγδε", 3), "αβγ...");
	}

	#[test]
	fn query_values_are_blanked() {
		assert_eq!(
			redact_query_values("https://example.com/search?q=ssn+123&page=2"),
			"https://example.com/search?q=[redacted]&page=2"
		);
		assert_eq!(redact_query_values("before &Q=topsecret after"), "before &Q=[redacted] after");
		assert_eq!(redact_query_values("no query here"), "no query here");
	}

	#[test]
	fn scrub_replaces_simple_literal() {
		assert_eq!(
			scrub_line(r#"frame("password")"#),
			format!(r#"frame("{REDACTED}")"#)
		);
	}

	#[test]
	fn scrub_without_quotes_is_identity() {
		assert_eq!(scrub_quoted_literals("frame(1,2)\nother()"), "frame(1,2)\nother()");
	}

	// Backslash-count classification per position before a quote:
	// 0 and 2 backslashes leave the quote unescaped, 1 and 3 escape it.
	#[test]
	fn scrub_backslash_parity_zero() {
		// Both quotes unescaped: content scrubbed.
		assert_eq!(scrub_line(r#"x"secret"y"#), format!(r#"x"{REDACTED}"y"#));
	}

	#[test]
	fn scrub_backslash_parity_one() {
		// he said \"hi\" -- both quotes escaped, contained in the outer
		// pair, so the outer literal is scrubbed as a unit.
		let input = r#"f("he said \"hi\"")"#;
		assert_eq!(scrub_line(input), format!(r#"f("{REDACTED}")"#));
	}

	#[test]
	fn scrub_backslash_parity_two() {
		// path\\" -- escaped backslash, unescaped quote: the quote closes
		// the literal and is not mis-paired with a later one.
		let input = r#"f("path\\", 3)"#;
		assert_eq!(scrub_line(input), format!(r#"f("{REDACTED}", 3)"#));
	}

	#[test]
	fn scrub_backslash_parity_three() {
		// \\\" -- escaped backslash then escaped quote: still inside the
		// literal, so the closing quote is the final unescaped one.
		let input = r#"f("a\\\"b")"#;
		assert_eq!(scrub_line(input), format!(r#"f("{REDACTED}")"#));
	}

	#[test]
	fn scrub_unpaired_quote_closes_at_end_of_line() {
		assert_eq!(scrub_line(r#"f("dangling"#), format!(r#"f("{REDACTED}"#));
	}

	#[test]
	fn scrub_handles_multiple_literals_per_line() {
		assert_eq!(
			scrub_line(r#"f("one", 2, "three")"#),
			format!(r#"f("{REDACTED}", 2, "{REDACTED}")"#)
		);
	}

	#[test]
	fn scrub_preserves_other_lines() {
		let input = "clean()\nf(\"secret\")\nalso_clean()";
		let expected = format!("clean()\nf(\"{REDACTED}\")\nalso_clean()");
		assert_eq!(scrub_quoted_literals(input), expected);
	}

	#[test]
	fn scrub_is_idempotent() {
		let once = scrub_quoted_literals(r#"f("secret", "more")"#);
		let twice = scrub_quoted_literals(&once);
		assert_eq!(once, twice);
	}

	proptest! {
		#[test]
		fn scrub_never_panics(input in ".*") {
			let _ = scrub_quoted_literals(&input);
		}

		#[test]
		fn scrub_is_idempotent_for_arbitrary_input(input in ".*") {
			let once = scrub_quoted_literals(&input);
			let twice = scrub_quoted_literals(&once);
			prop_assert_eq!(once, twice);
		}

		#[test]
		fn shorten_never_panics(input in ".*", max in 0usize..200) {
			let _ = shorten(&input, max);
		}
	}
}
