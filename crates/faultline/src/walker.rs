// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stack synthesis by walking the caller chain.
//!
//! Hosts without a native stack string can still expose the chain of
//! active call frames. The walker renders each frame as `name(args)`,
//! guards against recursive chains by remembering visited frames, and
//! hard-stops at a fixed depth. A cycle ends the walk with the repeated
//! frame rendered once more with placeholder arguments; frames whose
//! caller is inaccessible produce a final marker carrying the host's
//! refusal message.

use std::rc::Rc;

use crate::describe::{describe, function_label};
use crate::host::CallFrame;

/// Hard limit on synthesized frames.
const MAX_FRAMES: usize = 50;

/// Marker emitted when the walk hits the depth limit.
const TRUNCATION_MARKER: &str = "(...)";

/// Argument placeholder for the repeated frame at a cycle.
const CYCLE_ARGS: &str = "???";

/// Renders the caller chain rooted at `top` into a newline-terminated
/// stack string, innermost frame first.
pub fn synthesize(top: Rc<dyn CallFrame>) -> String {
	let mut out = String::new();
	for line in Walk::new(top) {
		out.push_str(&line);
		out.push('\n');
	}
	out
}

/// Iterator over rendered frame lines.
struct Walk {
	next: Option<Rc<dyn CallFrame>>,
	visited: Vec<usize>,
	pending: Option<String>,
	emitted: usize,
}

impl Walk {
	fn new(top: Rc<dyn CallFrame>) -> Self {
		Walk { next: Some(top), visited: Vec::new(), pending: None, emitted: 0 }
	}

	fn render(frame: &Rc<dyn CallFrame>) -> String {
		let label = function_label(frame.function_name(), frame.source_text());
		let args = match frame.arguments() {
			Ok(args) => args.iter().map(describe).collect::<Vec<_>>().join(", "),
			// Argument access can be refused on cross-origin frames.
			Err(_) => "...?".to_string(),
		};
		format!("{label}({args})")
	}
}

impl Iterator for Walk {
	type Item = String;

	fn next(&mut self) -> Option<String> {
		if let Some(marker) = self.pending.take() {
			self.next = None;
			return Some(marker);
		}
		let frame = self.next.take()?;
		if self.emitted >= MAX_FRAMES {
			return Some(TRUNCATION_MARKER.to_string());
		}
		self.emitted += 1;
		let line = Self::render(&frame);
		self.visited.push(frame.frame_id());
		match frame.caller() {
			Ok(Some(caller)) => {
				if self.visited.contains(&caller.frame_id()) {
					let label = function_label(caller.function_name(), caller.source_text());
					self.pending = Some(format!("{label}({CYCLE_ARGS})"));
				} else {
					self.next = Some(caller);
				}
			}
			Ok(None) => {}
			Err(message) => {
				self.pending = Some(format!("(???{message})"));
			}
		}
		Some(line)
	}
}

#[cfg(test)]
mod tests {
	use std::rc::Rc;

	use super::*;
	use crate::host::HostValue;

	struct FakeFrame {
		id: usize,
		name: Option<String>,
		args: Result<Vec<HostValue>, String>,
		caller: Result<Option<Rc<dyn CallFrame>>, String>,
	}

	impl CallFrame for FakeFrame {
		fn frame_id(&self) -> usize {
			self.id
		}

		fn function_name(&self) -> Option<String> {
			self.name.clone()
		}

		fn source_text(&self) -> Option<String> {
			None
		}

		fn arguments(&self) -> Result<Vec<HostValue>, String> {
			self.args.clone()
		}

		fn caller(&self) -> Result<Option<Rc<dyn CallFrame>>, String> {
			match &self.caller {
				Ok(next) => Ok(next.clone()),
				Err(message) => Err(message.clone()),
			}
		}
	}

	fn frame(
		id: usize,
		name: &str,
		args: Vec<HostValue>,
		caller: Option<Rc<dyn CallFrame>>,
	) -> Rc<dyn CallFrame> {
		Rc::new(FakeFrame { id, name: Some(name.into()), args: Ok(args), caller: Ok(caller) })
	}

	#[test]
	fn linear_chain_renders_innermost_first() {
		let outer = frame(3, "main", vec![], None);
		let mid = frame(2, "dispatch", vec![HostValue::Number(7.0)], Some(outer));
		let top = frame(1, "fail", vec![HostValue::Bool(true)], Some(mid));
		let stack = synthesize(top);
		assert_eq!(stack, "fail(true)\ndispatch(7)\nmain()\n");
	}

	#[test]
	fn cycles_stop_after_rendering_the_repeated_frame_once() {
		// b's caller reports the same frame id as the already-visited a.
		let back_to_a = frame(1, "a", vec![], None);
		let b = frame(2, "b", vec![], Some(back_to_a));
		let a = frame(1, "a", vec![], Some(b));
		let stack = synthesize(a);
		assert_eq!(stack, "a()\nb()\na(???)\n");
	}

	#[test]
	fn refused_caller_access_emits_message_marker() {
		let top = Rc::new(FakeFrame {
			id: 1,
			name: Some("handler".into()),
			args: Ok(vec![]),
			caller: Err("Permission denied".into()),
		});
		let stack = synthesize(top);
		assert_eq!(stack, "handler()\n(???Permission denied)\n");
	}

	#[test]
	fn refused_arguments_render_question_marks() {
		let top = Rc::new(FakeFrame {
			id: 1,
			name: Some("handler".into()),
			args: Err("Permission denied".into()),
			caller: Ok(None),
		});
		assert_eq!(synthesize(top), "handler(...?)\n");
	}

	#[test]
	fn deep_chains_stop_at_the_frame_limit() {
		let mut next: Option<Rc<dyn CallFrame>> = None;
		for id in (1..=80).rev() {
			next = Some(frame(id, "f", vec![], next));
		}
		let stack = synthesize(next.unwrap());
		let lines: Vec<&str> = stack.lines().collect();
		assert_eq!(lines.len(), 51);
		assert_eq!(lines[49], "f()");
		assert_eq!(lines[50], "(...)");
	}
}
