// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Host capability detection.
//!
//! Detection runs exactly once, at install time, over the host's
//! identification string, and produces the typed capability set the
//! installers consume. It is a pure function with no side effects and no
//! probing of live host objects.
//!
//! The `safe_wrapping` flag is deliberately conservative: it is true
//! only for host families whose stack-string format the redactor is
//! known to handle. An incorrectly-redacted record is worse than a
//! missing one, so unrecognized hosts get no wrapping rather than a
//! best-effort wrap.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::CoreError;

/// Minimum build stamp for which Gecko stack-string quoting is known to
/// match the quoted-literal scrubber.
const GECKO_MIN_BUILD: u64 = 20110830092941;

/// Minimum engine version with native stack support on WebKit hosts.
const WEBKIT_MIN_VERSION: u32 = 534;

/// Minimum interceptable Trident version.
const TRIDENT_MIN_VERSION: u32 = 9;

/// Host engine families with known exception-introspection behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostFamily {
	/// Blink/V8 hosts: native stack with trailing `:line:column)` frame
	/// positions.
	Blink,
	/// Gecko hosts: native stack that embeds literal argument values,
	/// which the quoted-literal scrubber knows how to strip.
	Gecko,
	/// WebKit hosts: native stack on recent engine versions, no
	/// positional information.
	WebKit,
	/// Presto hosts: a rich `stacktrace` field with prose positions and
	/// no global hook.
	Presto,
	/// Trident hosts: no native stack; caller-chain introspection from
	/// inside the global hook instead.
	Trident,
	/// Anything unrecognized. Gets the global hook at most.
	Unknown,
}

impl fmt::Display for HostFamily {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Blink => write!(f, "blink"),
			Self::Gecko => write!(f, "gecko"),
			Self::WebKit => write!(f, "webkit"),
			Self::Presto => write!(f, "presto"),
			Self::Trident => write!(f, "trident"),
			Self::Unknown => write!(f, "unknown"),
		}
	}
}

impl FromStr for HostFamily {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"blink" => Ok(Self::Blink),
			"gecko" => Ok(Self::Gecko),
			"webkit" => Ok(Self::WebKit),
			"presto" => Ok(Self::Presto),
			"trident" => Ok(Self::Trident),
			"unknown" => Ok(Self::Unknown),
			_ => Err(CoreError::UnknownHostFamily(s.to_string())),
		}
	}
}

/// What a host environment supports, decided once at install time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
	/// Detected engine family.
	pub family: HostFamily,
	/// Exceptions carry a native stack string.
	pub native_stack: bool,
	/// Live caller-chain references can be followed.
	pub caller_chain: bool,
	/// The host supports a global catch-all hook.
	pub global_hook: bool,
	/// The global hook can reach a stack through caller-chain
	/// introspection of its own invocation.
	pub global_hook_stack: bool,
	/// Entry-point wrapping is allowed: the redactor's heuristics are
	/// known to match this host's stack-string format.
	pub safe_wrapping: bool,
}

struct IdentPatterns {
	presto: Regex,
	blink: Regex,
	trident: Regex,
	gecko: Regex,
	webkit: Regex,
}

fn patterns() -> &'static IdentPatterns {
	static PATTERNS: OnceLock<IdentPatterns> = OnceLock::new();
	PATTERNS.get_or_init(|| IdentPatterns {
		presto: Regex::new(r"^Opera.*Presto/(\d+)\.(\d+)")
			.expect("built-in presto pattern should be valid"),
		blink: Regex::new(r"Chrom(e|ium)").expect("built-in blink pattern should be valid"),
		trident: Regex::new(r"MSIE (\d+)\.").expect("built-in trident pattern should be valid"),
		gecko: Regex::new(r"Gecko/(\d+)").expect("built-in gecko pattern should be valid"),
		webkit: Regex::new(r"AppleWebKit/(\d+)").expect("built-in webkit pattern should be valid"),
	})
}

fn capture_u32(re: &Regex, ident: &str, group: usize) -> Option<u32> {
	re.captures(ident)
		.and_then(|c| c.get(group))
		.and_then(|m| m.as_str().parse().ok())
}

/// Inspects a host identification string and returns the capability set.
///
/// Pure function of its input; host identification is not user data and
/// is never redacted.
pub fn detect(ident: &str) -> Capabilities {
	let p = patterns();

	if p.presto.is_match(ident) {
		let major = capture_u32(&p.presto, ident, 1).unwrap_or(0);
		let minor = capture_u32(&p.presto, ident, 2).unwrap_or(0);
		// Presto 2.9 shipped the stack-string format the scrubber knows.
		let safe = major > 2 || (major == 2 && minor >= 9);
		return Capabilities {
			family: HostFamily::Presto,
			native_stack: true,
			caller_chain: false,
			// No usable global hook on Presto hosts.
			global_hook: false,
			global_hook_stack: false,
			safe_wrapping: safe,
		};
	}

	if p.blink.is_match(ident) {
		return Capabilities {
			family: HostFamily::Blink,
			native_stack: true,
			caller_chain: false,
			global_hook: true,
			global_hook_stack: false,
			safe_wrapping: true,
		};
	}

	if let Some(version) = capture_u32(&p.trident, ident, 1) {
		return Capabilities {
			family: HostFamily::Trident,
			native_stack: false,
			caller_chain: true,
			global_hook: true,
			global_hook_stack: true,
			safe_wrapping: version >= TRIDENT_MIN_VERSION,
		};
	}

	// Blink idents contain "like Gecko" without a build stamp, so this
	// only matches real Gecko hosts; WebKit is still excluded explicitly
	// because some WebKit idents carry a Gecko build token.
	if !p.webkit.is_match(ident) {
		if let Some(captures) = p.gecko.captures(ident) {
			let build: u64 = captures
				.get(1)
				.and_then(|m| m.as_str().parse().ok())
				.unwrap_or(0);
			return Capabilities {
				family: HostFamily::Gecko,
				native_stack: true,
				caller_chain: false,
				global_hook: true,
				global_hook_stack: false,
				safe_wrapping: build >= GECKO_MIN_BUILD,
			};
		}
	}

	if let Some(version) = capture_u32(&p.webkit, ident, 1) {
		let recent = version >= WEBKIT_MIN_VERSION;
		return Capabilities {
			family: HostFamily::WebKit,
			native_stack: recent,
			caller_chain: false,
			global_hook: true,
			global_hook_stack: false,
			safe_wrapping: recent,
		};
	}

	Capabilities {
		family: HostFamily::Unknown,
		native_stack: false,
		caller_chain: false,
		// The hook costs nothing and still yields message and line.
		global_hook: true,
		global_hook_stack: false,
		safe_wrapping: false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const BLINK_IDENT: &str =
		"Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0 Safari/537.36";
	const GECKO_IDENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:9.0) Gecko/20111216093035 Firefox/9.0";
	const OLD_GECKO_IDENT: &str = "Mozilla/5.0 (X11; Linux i686; rv:2.0) Gecko/20100101 Firefox/4.0";
	const WEBKIT_IDENT: &str =
		"Mozilla/5.0 (Macintosh; Intel Mac OS X 10_7) AppleWebKit/534.48.3 (KHTML, like Gecko) Version/5.1 Safari/534.48.3";
	const OLD_WEBKIT_IDENT: &str =
		"Mozilla/5.0 (Macintosh; Intel Mac OS X 10_5) AppleWebKit/533.16 (KHTML, like Gecko) Version/5.0 Safari/533.16";
	const TRIDENT9_IDENT: &str = "Mozilla/5.0 (compatible; MSIE 9.0; Windows NT 6.1; Trident/5.0)";
	const TRIDENT8_IDENT: &str = "Mozilla/4.0 (compatible; MSIE 8.0; Windows NT 6.0)";
	const PRESTO_IDENT: &str = "Opera/9.80 (X11; Linux x86_64; U; en) Presto/2.9.168 Version/11.50";
	const OLD_PRESTO_IDENT: &str = "Opera/9.80 (X11; Linux x86_64; U; en) Presto/2.8.131 Version/11.10";

	#[test]
	fn blink_supports_wrapping_without_hook_stack() {
		let caps = detect(BLINK_IDENT);
		assert_eq!(caps.family, HostFamily::Blink);
		assert!(caps.native_stack);
		assert!(caps.safe_wrapping);
		assert!(caps.global_hook);
		assert!(!caps.global_hook_stack);
		assert!(!caps.caller_chain);
	}

	#[test]
	fn gecko_wrapping_is_build_gated() {
		let caps = detect(GECKO_IDENT);
		assert_eq!(caps.family, HostFamily::Gecko);
		assert!(caps.safe_wrapping);

		let old = detect(OLD_GECKO_IDENT);
		assert_eq!(old.family, HostFamily::Gecko);
		assert!(!old.safe_wrapping);
		assert!(old.native_stack);
	}

	#[test]
	fn webkit_wrapping_is_version_gated() {
		let caps = detect(WEBKIT_IDENT);
		assert_eq!(caps.family, HostFamily::WebKit);
		assert!(caps.safe_wrapping);
		assert!(caps.native_stack);

		let old = detect(OLD_WEBKIT_IDENT);
		assert_eq!(old.family, HostFamily::WebKit);
		assert!(!old.safe_wrapping);
		assert!(!old.native_stack);
	}

	#[test]
	fn trident_gets_hook_stack_and_caller_chain() {
		let caps = detect(TRIDENT9_IDENT);
		assert_eq!(caps.family, HostFamily::Trident);
		assert!(!caps.native_stack);
		assert!(caps.caller_chain);
		assert!(caps.global_hook);
		assert!(caps.global_hook_stack);
		assert!(caps.safe_wrapping);

		let old = detect(TRIDENT8_IDENT);
		assert!(!old.safe_wrapping);
		assert!(old.global_hook_stack);
	}

	#[test]
	fn presto_has_no_global_hook() {
		let caps = detect(PRESTO_IDENT);
		assert_eq!(caps.family, HostFamily::Presto);
		assert!(!caps.global_hook);
		assert!(caps.safe_wrapping);

		let old = detect(OLD_PRESTO_IDENT);
		assert!(!old.safe_wrapping);
	}

	#[test]
	fn unknown_hosts_get_hook_only() {
		let caps = detect("SomeEmbeddedRuntime/1.0");
		assert_eq!(caps.family, HostFamily::Unknown);
		assert!(!caps.safe_wrapping);
		assert!(!caps.native_stack);
		assert!(caps.global_hook);
	}

	#[test]
	fn family_roundtrips_through_strings() {
		for family in [
			HostFamily::Blink,
			HostFamily::Gecko,
			HostFamily::WebKit,
			HostFamily::Presto,
			HostFamily::Trident,
			HostFamily::Unknown,
		] {
			let parsed: HostFamily = family.to_string().parse().unwrap();
			assert_eq!(parsed, family);
		}
		assert!("chrome".parse::<HostFamily>().is_err());
	}
}
