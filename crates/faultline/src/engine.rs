// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Capture engine: the single funnel between the wrappers, the global
//! hook, and the outbound report handler.
//!
//! Every caught exception passes through [`Engine::handle_caught`].
//! When a global hook is installed the engine stashes the normalized
//! details and asks the wrapper to re-throw, so the host's own hook
//! fires and contributes the fields only it knows (address, line,
//! sometimes a walkable caller chain); [`Engine::handle_hook`] then
//! merges the two views and dispatches once.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use faultline_core::capability::Capabilities;
use faultline_core::record::{DiagnosticRecord, SourceLocation};
use tracing::debug;

use crate::host::{HookReport, HostEnv, Thrown};
use crate::limiter::ReportGate;
use crate::normalize::{normalize, ErrorDetails};
use crate::walker;

pub(crate) type ReportHandler = Box<dyn Fn(faultline_core::record::WireReport)>;
pub(crate) type StringRedactor = Box<dyn Fn(&str) -> String>;

pub(crate) struct Engine {
	capabilities: Capabilities,
	env: Rc<dyn HostEnv>,
	report_handler: ReportHandler,
	/// Embedder-supplied scrub for free-form strings that may embed
	/// sensitive substrings, applied on top of the built-in redaction.
	scrub: StringRedactor,
	gate: RefCell<ReportGate>,
	/// Single-slot buffer for details awaiting their hook half. At most
	/// one exception is in flight between a wrapper re-throw and the
	/// hook firing.
	pending: RefCell<Option<ErrorDetails>>,
	hook_installed: Cell<bool>,
}

impl Engine {
	pub(crate) fn new(
		capabilities: Capabilities,
		env: Rc<dyn HostEnv>,
		report_handler: ReportHandler,
		scrub: StringRedactor,
	) -> Self {
		Engine {
			capabilities,
			env,
			report_handler,
			scrub,
			gate: RefCell::new(ReportGate::new()),
			pending: RefCell::new(None),
			hook_installed: Cell::new(false),
		}
	}

	pub(crate) fn capabilities(&self) -> &Capabilities {
		&self.capabilities
	}

	pub(crate) fn mark_hook_installed(&self) {
		self.hook_installed.set(true);
	}

	/// Handles an exception caught by a wrapper. Returns `Err` when the
	/// wrapper must re-throw so the global hook completes the record.
	pub(crate) fn handle_caught(&self, thrown: Thrown, context: &str) -> Result<(), Thrown> {
		let details = normalize(&thrown, context, self.capabilities.family);
		if self.hook_installed.get() {
			*self.pending.borrow_mut() = Some(details);
			return Err(thrown);
		}
		self.dispatch(details);
		Ok(())
	}

	/// Handles a global-hook invocation, merging it with pending wrapper
	/// details when present.
	pub(crate) fn handle_hook(&self, report: HookReport) {
		let mut details = self.pending.borrow_mut().take().unwrap_or_default();
		if details.message.is_empty() {
			details.message = report.message;
		}
		if details.address.is_none() {
			details.address = Some(report.address);
		}
		if details.line.is_none() {
			details.line = report.line;
		}
		if details.column.is_none() {
			details.column = report.character;
		}
		if details.stack.is_none() && self.capabilities.global_hook_stack {
			if let Some(caller) = report.caller {
				details.stack = Some(walker::synthesize(caller));
			}
		}
		self.dispatch(details);
	}

	pub(crate) fn dispatch(&self, details: ErrorDetails) {
		let now_ms = self.env.now_ms();
		if !self.gate.borrow_mut().admit(now_ms) {
			debug!(context = %details.context, "report dropped by rate limiter");
			return;
		}
		let location = details.line.map(|line| SourceLocation { line, column: details.column });
		// Value redaction happened upstream in the value stringifier and
		// the Gecko stack scrub; the embedder scrub runs here, over every
		// free-form field that can embed an address.
		let record = DiagnosticRecord {
			message: (self.scrub)(&details.message),
			kind: details.kind,
			location,
			stack_trace: details.stack.as_deref().map(&self.scrub).unwrap_or_default(),
			context: (self.scrub)(&details.context),
			timestamp: now_ms / 1000,
			environment_info: self.env.ident(),
		};
		let address = details.address.unwrap_or_else(|| self.env.page_address());
		let report = record.to_wire(&(self.scrub)(&address));
		debug!(context = report.name.as_deref().unwrap_or(""), ts = report.ts, "report dispatched");
		(self.report_handler)(report);
	}
}
