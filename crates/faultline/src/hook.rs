// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Global catch-all hook adapter.

use std::rc::Rc;

use faultline_core::capability::Capabilities;
use tracing::info;

use crate::engine::Engine;
use crate::host::GlobalHookHost;

/// Whether the capability set calls for installing the global hook.
///
/// The hook is the only capture path when wrapping is unsafe, and it is
/// also installed alongside wrapping when the hook invocation is the
/// only place a caller chain can be walked.
pub(crate) fn needed(capabilities: &Capabilities) -> bool {
	capabilities.global_hook
		&& (!capabilities.safe_wrapping
			|| (!capabilities.native_stack && capabilities.global_hook_stack))
}

pub(crate) fn install(host: &Rc<dyn GlobalHookHost>, engine: Rc<Engine>) {
	host.set_hook(Box::new(move |report| engine.handle_hook(report)));
	info!("global catch-all hook installed");
}
