// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the faultline exception capture system.
//!
//! This crate provides the pieces of the capture pipeline that are pure
//! data and pure computation: the canonical diagnostic record and its
//! outbound wire shape, the string redaction primitives, and host
//! capability detection. It has no knowledge of any concrete host
//! environment and is shared by the SDK crate (`faultline`) and by
//! anything that needs to consume the wire format.
//!
//! # Overview
//!
//! The capture system supports:
//! - Capability detection over a host identification string, selecting
//!   which interception strategies are safe to activate
//! - Irreversible redaction of string content before it leaves the
//!   process, including quoted-literal scrubbing of stack text for the
//!   one host family that embeds argument values in stack strings
//! - A canonical [`DiagnosticRecord`] plus the [`WireReport`] shape the
//!   external collector consumes

pub mod capability;
pub mod error;
pub mod record;
pub mod redact;

pub use capability::{detect, Capabilities, HostFamily};
pub use error::{CoreError, Result};
pub use record::{DiagnosticRecord, SourceLocation, WireReport, FALLBACK_CONTEXT};
pub use redact::{redact_query_values, redact_string, scrub_quoted_literals, shorten, REDACTED};
