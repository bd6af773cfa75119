//! Non-Windows stand-in: resolves nothing and refuses to install a hook.
//! Lets the rest of the workspace build and test its pure logic on any
//! host.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use super::{Platform, StopHandle};
use crate::axis::{Axis, Emitter};
use crate::error::EngineError;
use crate::hook::Dispatcher;
use crate::process::{NullProcessLookup, ProcessLookup};

pub struct StubPlatform;

struct NullEmitter;
impl Emitter for NullEmitter {
    fn emit(&self, _axis: Axis, _delta: i32) {}
}

impl Platform for StubPlatform {
    fn process_lookup(&self) -> Box<dyn ProcessLookup> {
        Box::new(NullProcessLookup)
    }

    fn emitter(&self) -> Arc<dyn Emitter> {
        Arc::new(NullEmitter)
    }

    fn run_hook_worker(
        &self,
        _dispatcher: Dispatcher,
        ready: Sender<Result<Box<dyn StopHandle>, EngineError>>,
    ) {
        let _ = ready.send(Err(EngineError::Unsupported));
    }
}
