// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Interception of asynchronous-request completion callbacks.
//!
//! The preferred path redefines the completion-callback property so
//! every assignment is wrapped as it happens. Hosts that refuse the
//! accessor redefinition fall back to send-time observation: a wrapped
//! completion-event listener fires before the directly-assigned
//! callback and replaces it with a wrapped form if the application
//! assigned one after sending.

use std::rc::Rc;

use tracing::debug;

use crate::engine::Engine;
use crate::host::{
	AsyncRequest, CompletionTap, EventTarget, HostCallback, HostValue, Listener, RequestHost,
	SendObserver, Thrown,
};
use crate::wrap::events::{ListenerTable, WrappedTarget};
use crate::wrap::CaughtCallback;

/// Context string for completion-callback captures.
const COMPLETION_CONTEXT: &str = "completion handler";

/// Event type the fallback path listens for.
const COMPLETION_EVENT: &str = "completion";

/// Accessor tap wrapping completion callbacks at assignment time.
struct CompletionPropertyTap {
	engine: Rc<Engine>,
}

impl CompletionTap for CompletionPropertyTap {
	fn on_assign(
		&self,
		_request: Rc<dyn AsyncRequest>,
		callback: Rc<dyn HostCallback>,
	) -> Rc<dyn HostCallback> {
		if callback.is_capture_wrapper() {
			return callback;
		}
		Rc::new(CaughtCallback::new(callback, COMPLETION_CONTEXT.to_string(), self.engine.clone()))
	}
}

/// Send-time observer installing a completion-event watcher on each
/// outgoing request.
struct SendTimeWrapper {
	engine: Rc<Engine>,
	table: Rc<ListenerTable>,
}

impl SendObserver for SendTimeWrapper {
	fn on_send(&self, request: Rc<dyn AsyncRequest>) {
		let target = WrappedTarget::new(request.as_event_target(), self.table.clone());
		let watcher: Rc<dyn HostCallback> =
			Rc::new(CompletionWatcher { request, engine: self.engine.clone() });
		target.add_listener(COMPLETION_EVENT, &Listener::Callback(watcher), false);
	}
}

/// Fires on each completion event and wraps a callback the application
/// assigned directly, which the accessor path never saw.
struct CompletionWatcher {
	request: Rc<dyn AsyncRequest>,
	engine: Rc<Engine>,
}

impl HostCallback for CompletionWatcher {
	fn invoke(&self, _this: &HostValue, _args: &[HostValue]) -> Result<HostValue, Thrown> {
		if let Some(callback) = self.request.completion_callback() {
			if !callback.is_capture_wrapper() {
				self.request.set_completion_callback(Rc::new(CaughtCallback::new(
					callback,
					COMPLETION_CONTEXT.to_string(),
					self.engine.clone(),
				)));
			}
		}
		Ok(HostValue::Undefined)
	}
}

/// Installs completion-callback interception on `host`.
pub(crate) fn install(host: &Rc<dyn RequestHost>, engine: Rc<Engine>, table: Rc<ListenerTable>) {
	let tap = Rc::new(CompletionPropertyTap { engine: engine.clone() });
	if host.intercept_completion_property(tap) {
		debug!("completion interception installed via property accessor");
		return;
	}
	host.observe_send(Rc::new(SendTimeWrapper { engine, table }));
	debug!("completion interception installed via send observation");
}
