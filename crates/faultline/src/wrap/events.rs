// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wrapper facade over event-listener registration surfaces.
//!
//! The wrapped form of a callback listener is registered as a
//! listener-interface object, so dispatch hands the wrapper the full
//! event description and it can invoke the application callback with
//! the dispatch target as receiver.
//!
//! A registration table keyed by callback identity keeps one wrapper
//! per application callback, so removal can find the wrapped form the
//! host actually holds. The table is shared across all wrapped targets;
//! a refcount tracks how many registrations a wrapper is serving.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::describe::describe;
use crate::engine::Engine;
use crate::host::{
	callback_id, EventInfo, EventTarget, HostCallback, HostValue, Listener, ListenerObject, Thrown,
};
use crate::wrap::CaughtCallback;

/// One host-side registration: which target, event type, and capture
/// phase a wrapper is serving. Identical tuples are deduplicated by the
/// host, so the set never holds more slots than the host holds
/// registrations.
type RegistrationSlot = (usize, String, bool);

struct Registration {
	wrapper: Rc<CaughtListener>,
	active: HashSet<RegistrationSlot>,
}

/// Identity-keyed map from application callback to its capture wrapper.
pub(crate) struct ListenerTable {
	entries: RefCell<HashMap<usize, Registration>>,
	engine: Rc<Engine>,
}

impl ListenerTable {
	pub(crate) fn new(engine: Rc<Engine>) -> Self {
		ListenerTable { entries: RefCell::new(HashMap::new()), engine }
	}

	/// Returns the wrapper for `callback`, creating it on first use, and
	/// records the registration slot it is serving. Re-adding an
	/// identical slot is a no-op, mirroring host-side deduplication.
	fn acquire(&self, callback: &Rc<dyn HostCallback>, slot: RegistrationSlot) -> Rc<CaughtListener> {
		let mut entries = self.entries.borrow_mut();
		let entry = entries.entry(callback_id(callback)).or_insert_with(|| Registration {
			wrapper: Rc::new(CaughtListener {
				inner: callback.clone(),
				engine: self.engine.clone(),
			}),
			active: HashSet::new(),
		});
		entry.active.insert(slot);
		entry.wrapper.clone()
	}

	/// Releases the registration slot for `callback`, returning the
	/// wrapper the host holds so the caller can unregister it. The
	/// entry is dropped with its last slot.
	fn release(
		&self,
		callback: &Rc<dyn HostCallback>,
		slot: &RegistrationSlot,
	) -> Option<Rc<CaughtListener>> {
		let mut entries = self.entries.borrow_mut();
		let id = callback_id(callback);
		let entry = entries.get_mut(&id)?;
		let wrapper = entry.wrapper.clone();
		entry.active.remove(slot);
		if entry.active.is_empty() {
			entries.remove(&id);
		}
		Some(wrapper)
	}
}

/// The wrapped form a listener callback is registered under.
pub(crate) struct CaughtListener {
	inner: Rc<dyn HostCallback>,
	engine: Rc<Engine>,
}

impl ListenerObject for CaughtListener {
	fn handle_event(&self, event: &EventInfo) -> Result<HostValue, Thrown> {
		let args = [event.value.clone()];
		match self.inner.invoke(&event.target, &args) {
			Ok(value) => Ok(value),
			Err(thrown) => {
				let context = format!(
					"{} listener {} on {}",
					event.event_type,
					describe(&HostValue::Function(self.inner.clone())),
					describe(&event.current_target)
				);
				match self.engine.handle_caught(thrown, &context) {
					Ok(()) => Ok(HostValue::Undefined),
					Err(rethrown) => Err(rethrown),
				}
			}
		}
	}
}

/// A registration surface whose add/remove pair wraps callback
/// listeners.
pub(crate) struct WrappedTarget {
	inner: Rc<dyn EventTarget>,
	table: Rc<ListenerTable>,
}

impl WrappedTarget {
	pub(crate) fn new(inner: Rc<dyn EventTarget>, table: Rc<ListenerTable>) -> Self {
		WrappedTarget { inner, table }
	}

	fn slot(&self, event_type: &str, capture: bool) -> RegistrationSlot {
		(Rc::as_ptr(&self.inner) as *const () as usize, event_type.to_string(), capture)
	}
}

impl EventTarget for WrappedTarget {
	fn add_listener(&self, event_type: &str, listener: &Listener, capture: bool) {
		match listener {
			// Known gap: interface listeners pass through unwrapped.
			Listener::Interface(_) => self.inner.add_listener(event_type, listener, capture),
			Listener::Callback(callback) => {
				// A raw registration of the same callback made before
				// installation would otherwise fire alongside the
				// wrapped one.
				self.inner.remove_listener(event_type, listener, capture);
				let wrapper = self.table.acquire(callback, self.slot(event_type, capture));
				let wrapped = Listener::Interface(wrapper as Rc<dyn ListenerObject>);
				// Re-adding an identical registration must stay
				// idempotent, so drop any existing one first.
				self.inner.remove_listener(event_type, &wrapped, capture);
				self.inner.add_listener(event_type, &wrapped, capture);
			}
		}
	}

	fn remove_listener(&self, event_type: &str, listener: &Listener, capture: bool) {
		// Remove the raw form too, covering listeners added before
		// installation.
		self.inner.remove_listener(event_type, listener, capture);
		if let Listener::Callback(callback) = listener {
			let slot = self.slot(event_type, capture);
			if let Some(wrapper) = self.table.release(callback, &slot) {
				self.inner.remove_listener(event_type, &Listener::Interface(wrapper), capture);
			}
		}
	}

	fn description(&self) -> String {
		self.inner.description()
	}

	fn is_wrapper(&self) -> bool {
		true
	}
}
