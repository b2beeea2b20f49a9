// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client surface: builder, installation, and manual capture.

use std::rc::Rc;

use faultline_core::capability::{detect, Capabilities};
use faultline_core::redact::redact_query_values;
use tracing::info;

use crate::engine::{Engine, ReportHandler, StringRedactor};
use crate::error::{Result, SdkError};
use crate::host::{EntryPoints, EventTarget, HostEnv, Thrown, TimerHost};
use crate::wrap::events::{ListenerTable, WrappedTarget};
use crate::wrap::timer::WrappedTimers;
use crate::{hook, wrap};

/// Page-address token that disables capture entirely.
const OPT_OUT_TOKEN: &str = "nocapture";

/// Builder for a [`CaptureClient`].
///
/// ```no_run
/// # use std::rc::Rc;
/// # use faultline::{CaptureClientBuilder, EntryPoints};
/// # fn demo(env: Rc<dyn faultline::HostEnv>, entry_points: EntryPoints) -> faultline::Result<()> {
/// let installed = CaptureClientBuilder::new()
/// 	.host_env(env)
/// 	.entry_points(entry_points)
/// 	.report_handler(|report| println!("{}", report.msg))
/// 	.install()?;
/// # let _ = installed;
/// # Ok(())
/// # }
/// ```
pub struct CaptureClientBuilder {
	env: Option<Rc<dyn HostEnv>>,
	entry_points: EntryPoints,
	report_handler: Option<ReportHandler>,
	redactor: Option<StringRedactor>,
}

impl Default for CaptureClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl CaptureClientBuilder {
	pub fn new() -> Self {
		CaptureClientBuilder {
			env: None,
			entry_points: EntryPoints::default(),
			report_handler: None,
			redactor: None,
		}
	}

	/// Host environment to instrument. Required.
	pub fn host_env(mut self, env: Rc<dyn HostEnv>) -> Self {
		self.env = Some(env);
		self
	}

	/// Entry points to intercept. Anything absent from the table simply
	/// is not instrumented.
	pub fn entry_points(mut self, entry_points: EntryPoints) -> Self {
		self.entry_points = entry_points;
		self
	}

	/// Sink for outbound reports. Required.
	pub fn report_handler(mut self, handler: impl Fn(faultline_core::record::WireReport) + 'static) -> Self {
		self.report_handler = Some(Box::new(handler));
		self
	}

	/// Replaces the default free-form string redactor (which blanks
	/// query parameter values). Applied to the message, context, page
	/// address, and stack text of every outgoing record, on top of the
	/// built-in value redaction.
	pub fn redactor(mut self, redactor: impl Fn(&str) -> String + 'static) -> Self {
		self.redactor = Some(Box::new(redactor));
		self
	}

	/// Detects capabilities, wraps the supplied entry points, and
	/// installs the global hook where the capability set calls for one.
	pub fn install(self) -> Result<Installed> {
		let env = self.env.ok_or(SdkError::MissingHostEnv)?;
		let report_handler = self.report_handler.ok_or(SdkError::MissingReportHandler)?;
		let scrub = self
			.redactor
			.unwrap_or_else(|| Box::new(|s: &str| redact_query_values(s)));

		let address = env.page_address();
		if address.contains(&format!("?{OPT_OUT_TOKEN}"))
			|| address.contains(&format!("&{OPT_OUT_TOKEN}"))
		{
			return Err(SdkError::OptedOut);
		}

		if let Some(timers) = &self.entry_points.timers {
			if timers.is_wrapper() {
				return Err(SdkError::AlreadyInstalled);
			}
		}
		if self.entry_points.event_targets.iter().any(|t| t.is_wrapper()) {
			return Err(SdkError::AlreadyInstalled);
		}

		let capabilities = detect(&env.ident());
		let engine = Rc::new(Engine::new(capabilities, env.clone(), report_handler, scrub));

		let mut timers: Option<Rc<dyn TimerHost>> = None;
		let mut event_targets: Vec<Rc<dyn EventTarget>> = Vec::new();
		if capabilities.safe_wrapping {
			if let Some(inner) = self.entry_points.timers {
				timers = Some(Rc::new(WrappedTimers::new(inner, engine.clone())));
			}
			// One table across every registration surface, so a callback
			// keeps a single wrapper identity wherever it is registered.
			let table = Rc::new(ListenerTable::new(engine.clone()));
			for inner in self.entry_points.event_targets {
				event_targets
					.push(Rc::new(WrappedTarget::new(inner, table.clone())) as Rc<dyn EventTarget>);
			}
			if let Some(requests) = &self.entry_points.requests {
				wrap::request::install(requests, engine.clone(), table);
			}
		}

		if hook::needed(&capabilities) {
			if let Some(host) = &self.entry_points.global_hook {
				engine.mark_hook_installed();
				hook::install(host, engine.clone());
			}
		}

		info!(
			family = %capabilities.family,
			wrapping = capabilities.safe_wrapping,
			"capture installed"
		);
		Ok(Installed { client: CaptureClient { engine }, timers, event_targets })
	}
}

/// Result of a successful installation: the client plus the wrapper
/// facades the embedder routes application traffic through.
pub struct Installed {
	pub client: CaptureClient,
	/// Wrapped scheduling primitives, when timers were supplied and
	/// wrapping is safe on this host.
	pub timers: Option<Rc<dyn TimerHost>>,
	/// Wrapped registration surfaces, in the order supplied.
	pub event_targets: Vec<Rc<dyn EventTarget>>,
}

/// Handle for manual capture after installation.
pub struct CaptureClient {
	engine: Rc<Engine>,
}

impl CaptureClient {
	/// Capabilities detected at install time.
	pub fn capabilities(&self) -> Capabilities {
		*self.engine.capabilities()
	}

	/// Reports an exception caught around initial script execution.
	///
	/// Returns `Err` when the caller must re-throw so the host's global
	/// hook completes the record.
	pub fn capture_startup(
		&self,
		thrown: Thrown,
		file: &str,
	) -> std::result::Result<(), Thrown> {
		let context = format!("initial script execution of {file}");
		self.engine.handle_caught(thrown, &context)
	}

	/// Reports an exception the application caught itself.
	pub fn capture_caught(&self, thrown: Thrown, context: &str) -> std::result::Result<(), Thrown> {
		self.engine.handle_caught(thrown, context)
	}
}
