// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rate limiting for outbound reports.
//!
//! A page stuck in an error loop must not flood the collector. Each
//! admitted report doubles the delay required before the next one;
//! reports arriving inside the window are dropped, never queued. The
//! delay never resets within a page lifetime.

/// Delay required before the second report, in milliseconds.
const INITIAL_DELAY_MS: u64 = 10;

/// Doubling-backoff admission gate.
#[derive(Debug)]
pub(crate) struct ReportGate {
	last_report_ms: u64,
	current_delay_ms: u64,
}

impl ReportGate {
	pub(crate) fn new() -> Self {
		ReportGate { last_report_ms: 0, current_delay_ms: INITIAL_DELAY_MS }
	}

	/// Returns whether a report at `now_ms` may be sent, updating the
	/// gate state on admission.
	pub(crate) fn admit(&mut self, now_ms: u64) -> bool {
		if now_ms.saturating_sub(self.last_report_ms) < self.current_delay_ms {
			return false;
		}
		self.last_report_ms = now_ms;
		self.current_delay_ms = self.current_delay_ms.saturating_mul(2);
		true
	}
}
