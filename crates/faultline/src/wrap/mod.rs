// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Callback wrappers for the host's asynchronous entry points.
//!
//! Each wrapper is transparent on the success path: same receiver, same
//! arguments, same return value. On the failure path it routes the
//! thrown value through the engine, which decides whether the wrapper
//! swallows it or re-throws for the global hook.

use std::rc::Rc;

use crate::engine::Engine;
use crate::host::{HostCallback, HostValue, Thrown};

pub(crate) mod events;
pub(crate) mod request;
pub(crate) mod timer;

/// A host callback wrapped for capture.
pub(crate) struct CaughtCallback {
	inner: Rc<dyn HostCallback>,
	context: String,
	engine: Rc<Engine>,
}

impl CaughtCallback {
	pub(crate) fn new(inner: Rc<dyn HostCallback>, context: String, engine: Rc<Engine>) -> Self {
		CaughtCallback { inner, context, engine }
	}
}

impl HostCallback for CaughtCallback {
	fn invoke(&self, this: &HostValue, args: &[HostValue]) -> Result<HostValue, Thrown> {
		match self.inner.invoke(this, args) {
			Ok(value) => Ok(value),
			Err(thrown) => match self.engine.handle_caught(thrown, &self.context) {
				Ok(()) => Ok(HostValue::Undefined),
				Err(rethrown) => Err(rethrown),
			},
		}
	}

	fn name(&self) -> Option<String> {
		self.inner.name()
	}

	fn source_text(&self) -> Option<String> {
		self.inner.source_text()
	}

	fn is_capture_wrapper(&self) -> bool {
		true
	}
}
