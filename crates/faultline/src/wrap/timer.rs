// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wrapper facade over the host's delay-scheduling primitives.

use std::rc::Rc;

use crate::describe::describe;
use crate::engine::Engine;
use crate::host::{HostValue, TimerHost, TimerId, TimerTask};
use crate::wrap::CaughtCallback;

pub(crate) struct WrappedTimers {
	inner: Rc<dyn TimerHost>,
	engine: Rc<Engine>,
}

impl WrappedTimers {
	pub(crate) fn new(inner: Rc<dyn TimerHost>, engine: Rc<Engine>) -> Self {
		WrappedTimers { inner, engine }
	}

	fn wrap(&self, task: TimerTask, primitive: &str, delay_ms: u32) -> TimerTask {
		match task {
			// Source-text tasks are evaluated by the host, not called;
			// they pass through unwrapped.
			TimerTask::Source(source) => TimerTask::Source(source),
			TimerTask::Callback(callback) => {
				let context = format!(
					"{}({}, {})",
					primitive,
					describe(&HostValue::Function(callback.clone())),
					delay_ms
				);
				TimerTask::Callback(Rc::new(CaughtCallback::new(
					callback,
					context,
					self.engine.clone(),
				)))
			}
		}
	}
}

impl TimerHost for WrappedTimers {
	fn set_timeout(&self, task: TimerTask, delay_ms: u32) -> TimerId {
		self.inner.set_timeout(self.wrap(task, "set_timeout", delay_ms), delay_ms)
	}

	fn set_interval(&self, task: TimerTask, delay_ms: u32) -> TimerId {
		self.inner.set_interval(self.wrap(task, "set_interval", delay_ms), delay_ms)
	}

	fn is_wrapper(&self) -> bool {
		true
	}
}
