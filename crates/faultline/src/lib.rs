// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client-side exception capture runtime.
//!
//! Wraps a host's asynchronous entry points (timers, event listeners,
//! request completion callbacks) so uncaught exceptions are caught at
//! the dispatch boundary, normalized, redacted, rate limited, and
//! handed to an embedder-supplied report handler. On hosts where
//! wrapping is unsafe or a caller chain is only reachable from the
//! global catch-all hook, the hook path is used instead of or alongside
//! the wrappers.
//!
//! The crate never touches a platform directly: the embedder implements
//! the seams in [`host`] and routes application traffic through the
//! wrapper facades returned by [`CaptureClientBuilder::install`].

pub mod host;
pub mod walker;

mod client;
mod describe;
mod engine;
mod error;
mod hook;
mod limiter;
mod normalize;
mod wrap;

pub use client::{CaptureClient, CaptureClientBuilder, Installed};
pub use error::{Result, SdkError};
pub use host::{
	AsyncRequest, CallFrame, CompletionTap, EntryPoints, EventInfo, EventTarget, GlobalHookHost,
	HookReport, HostCallback, HostEnv, HostException, HostValue, Listener, ListenerObject,
	RequestHost, SendObserver, Thrown, TimerHost, TimerId, TimerTask,
};

pub use faultline_core::capability::{detect, Capabilities, HostFamily};
pub use faultline_core::record::{DiagnosticRecord, SourceLocation, WireReport, FALLBACK_CONTEXT};
pub use faultline_core::redact::REDACTED;
