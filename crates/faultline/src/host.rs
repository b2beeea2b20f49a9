// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Host-environment seams.
//!
//! The SDK never touches a platform directly. The embedder implements
//! these traits over the host runtime it instruments and hands the
//! resulting handles to [`CaptureClientBuilder`](crate::CaptureClientBuilder)
//! as an [`EntryPoints`] table; installation returns wrapper facades
//! implementing the same traits, which the embedder routes application
//! traffic through in place of the raw entry points.
//!
//! Everything here is single-threaded: the capture system runs on the
//! host's event loop, handles are shared with `Rc`, and none of the
//! seams are expected to be `Send`.

use std::fmt;
use std::rc::Rc;

/// Read-only access to host identification, page address, and clock.
pub trait HostEnv {
	/// Host identification string (engine family and versions). Not user
	/// data; reported unredacted.
	fn ident(&self) -> String;
	/// Address of the page being instrumented.
	fn page_address(&self) -> String;
	/// Milliseconds since epoch, by the host clock. The SDK has no time
	/// source of its own.
	fn now_ms(&self) -> u64;
}

/// Snapshot of an arbitrary host runtime value.
///
/// This is the input to the redactor-aware stringifier; it carries only
/// what that stringifier needs (strings are still raw here and are
/// replaced with the redaction marker at description time).
#[derive(Clone)]
pub enum HostValue {
	Undefined,
	Null,
	Bool(bool),
	Number(f64),
	Str(String),
	/// A date, carrying the host's display string for it.
	Date(String),
	/// An array-like object; only the length survives the snapshot.
	ArrayLike { len: u64 },
	/// Any other object, carrying the host's native description string.
	Object { description: String },
	/// A function value.
	Function(Rc<dyn HostCallback>),
}

impl fmt::Debug for HostValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Undefined => f.write_str("Undefined"),
			Self::Null => f.write_str("Null"),
			Self::Bool(b) => write!(f, "Bool({b})"),
			Self::Number(n) => write!(f, "Number({n})"),
			Self::Str(s) => write!(f, "Str({s:?})"),
			Self::Date(d) => write!(f, "Date({d:?})"),
			Self::ArrayLike { len } => write!(f, "ArrayLike {{ len: {len} }}"),
			Self::Object { description } => write!(f, "Object({description:?})"),
			Self::Function(_) => f.write_str("Function(..)"),
		}
	}
}

/// An invocable application callback owned by the host.
pub trait HostCallback {
	/// Invokes the callback with the given receiver and arguments.
	fn invoke(&self, this: &HostValue, args: &[HostValue]) -> Result<HostValue, Thrown>;

	/// Intrinsic name, when the host exposes one.
	fn name(&self) -> Option<String> {
		None
	}

	/// Source text, used for anonymous-function snippets.
	fn source_text(&self) -> Option<String> {
		None
	}

	/// True for the SDK's own capture wrappers. Host implementations
	/// never override this.
	fn is_capture_wrapper(&self) -> bool {
		false
	}
}

/// Identity key for a callback handle. Two clones of the same `Rc`
/// compare equal; value equality is never consulted.
pub(crate) fn callback_id(cb: &Rc<dyn HostCallback>) -> usize {
	Rc::as_ptr(cb) as *const () as usize
}

/// A structured host exception.
#[derive(Debug, Clone, Default)]
pub struct HostException {
	/// Classification name (a TypeError-equivalent).
	pub name: Option<String>,
	pub message: String,
	/// Terse native stack text.
	pub stack: Option<String>,
	/// Richer native stack text, where the host exposes both forms.
	pub stacktrace: Option<String>,
	pub line: Option<u32>,
	pub column: Option<u32>,
}

/// Anything a host callback can throw.
///
/// Hosts allow throwing arbitrary values, not just structured
/// exceptions; normalization coerces the value form.
#[derive(Debug, Clone)]
pub enum Thrown {
	Exception(HostException),
	Value(HostValue),
}

/// A frame in a live caller chain.
///
/// `caller` and `arguments` are fallible because hosts refuse both
/// across security boundaries; the error carries the host's failure
/// message and the stack walker degrades to a placeholder rather than
/// propagating it.
pub trait CallFrame {
	/// Stable identity, used for cycle detection.
	fn frame_id(&self) -> usize;
	fn function_name(&self) -> Option<String>;
	fn source_text(&self) -> Option<String>;
	fn arguments(&self) -> Result<Vec<HostValue>, String>;
	fn caller(&self) -> Result<Option<Rc<dyn CallFrame>>, String>;
}

/// Identifier returned by the scheduling primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Argument to the delay-scheduling primitives.
#[derive(Clone)]
pub enum TimerTask {
	Callback(Rc<dyn HostCallback>),
	/// Source text evaluated by the host. Never wrapped.
	Source(String),
}

/// The host's delay-scheduling primitives.
pub trait TimerHost {
	/// Fire-once scheduling.
	fn set_timeout(&self, task: TimerTask, delay_ms: u32) -> TimerId;
	/// Fire-repeating scheduling.
	fn set_interval(&self, task: TimerTask, delay_ms: u32) -> TimerId;

	/// True for the SDK's own wrapper facade. Host implementations never
	/// override this.
	fn is_wrapper(&self) -> bool {
		false
	}
}

/// A dispatched event as seen by a listener.
#[derive(Clone)]
pub struct EventInfo {
	/// Event type name ("click").
	pub event_type: String,
	/// Dispatch target; becomes the listener's receiver.
	pub target: HostValue,
	/// The target whose registration is being invoked.
	pub current_target: HostValue,
	/// The event object itself, as passed to the listener.
	pub value: HostValue,
}

/// Object implementing the host's listener interface.
pub trait ListenerObject {
	fn handle_event(&self, event: &EventInfo) -> Result<HostValue, Thrown>;
}

/// A listener argument to the add/remove-listener pair.
#[derive(Clone)]
pub enum Listener {
	/// A plain callback listener, invoked with the event's dispatch
	/// target as receiver and the event value as sole argument.
	Callback(Rc<dyn HostCallback>),
	/// A listener-interface object. Known gap: these pass through the
	/// wrapper layer unwrapped.
	Interface(Rc<dyn ListenerObject>),
}

/// A registration surface for event listeners.
///
/// Hosts are expected to deduplicate registrations of an identical
/// (event type, listener identity, capture) tuple and to match
/// listeners by identity on removal.
pub trait EventTarget {
	fn add_listener(&self, event_type: &str, listener: &Listener, capture: bool);
	fn remove_listener(&self, event_type: &str, listener: &Listener, capture: bool);

	/// Description used in capture context strings.
	fn description(&self) -> String;

	/// True for the SDK's own wrapper facade. Host implementations never
	/// override this.
	fn is_wrapper(&self) -> bool {
		false
	}
}

/// One in-flight asynchronous request object.
pub trait AsyncRequest {
	/// Stable identity for bookkeeping.
	fn request_id(&self) -> usize;
	/// The directly-assigned completion callback, if any.
	fn completion_callback(&self) -> Option<Rc<dyn HostCallback>>;
	/// Replaces the directly-assigned completion callback.
	fn set_completion_callback(&self, callback: Rc<dyn HostCallback>);
	/// The request viewed as an event target, for completion-event
	/// listening.
	fn as_event_target(&self) -> Rc<dyn EventTarget>;
}

/// Accessor tap for the completion-callback property.
pub trait CompletionTap {
	/// Called when the application assigns a completion callback. The
	/// returned callback is what the host stores and later invokes; the
	/// host keeps exposing the original on property reads so the
	/// interception stays invisible to the application.
	fn on_assign(
		&self,
		request: Rc<dyn AsyncRequest>,
		callback: Rc<dyn HostCallback>,
	) -> Rc<dyn HostCallback>;
}

/// Send-time observer for the fallback interception path.
pub trait SendObserver {
	fn on_send(&self, request: Rc<dyn AsyncRequest>);
}

/// Seam over the host's asynchronous request type.
pub trait RequestHost {
	/// Installs accessor interception for the completion-callback
	/// property. Returns false when the host cannot redefine the
	/// accessor, in which case the send-observation fallback is used
	/// instead.
	fn intercept_completion_property(&self, tap: Rc<dyn CompletionTap>) -> bool;

	/// Registers an observer invoked whenever a request is sent.
	fn observe_send(&self, observer: Rc<dyn SendObserver>);
}

/// What the host passes to the global catch-all hook.
pub struct HookReport {
	pub message: String,
	/// Address of the failing document.
	pub address: String,
	pub line: Option<u32>,
	/// Character offset within the line, from the host's side-channel
	/// state, on the families that expose one.
	pub character: Option<u32>,
	/// The hook invocation's own caller, on hosts that allow
	/// caller-chain introspection from inside the hook.
	pub caller: Option<Rc<dyn CallFrame>>,
}

/// Seam for the host's global catch-all hook.
pub trait GlobalHookHost {
	/// Installs `hook` as the catch-all for exceptions no wrapper saw.
	fn set_hook(&self, hook: Box<dyn Fn(HookReport)>);
}

/// The enumerated set of interceptable entry points a host exposes.
///
/// Every field is optional: whatever the host does not expose simply is
/// not instrumented. `event_targets` enumerates each registration
/// surface individually (generic element prototype, document,
/// window-equivalent, request object, and any concrete element
/// constructors that do not inherit the generic surface).
#[derive(Default)]
pub struct EntryPoints {
	pub timers: Option<Rc<dyn TimerHost>>,
	pub event_targets: Vec<Rc<dyn EventTarget>>,
	pub requests: Option<Rc<dyn RequestHost>>,
	pub global_hook: Option<Rc<dyn GlobalHookHost>>,
}
