//! Handler registry for gateway lifecycle events.
//!
//! One optional callback slot per event, registered through the typed `on_*`
//! methods on [`Gateway`](crate::gateway::Gateway). Unset hooks no-op, except
//! where the pipeline documents a fallback (segment persistence falls back to
//! the segment store) or an error (`receive` with no handler).

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::{
    error::{GatewayError, HandlerError},
    message::{CompositeId, Message, Outbound, Segment, TransmitOutcome},
    store::Persistence,
};

pub(crate) type ReceiveFn =
    Arc<dyn Fn(Message) -> BoxFuture<'static, Result<(), HandlerError>> + Send + Sync>;
pub(crate) type TransmitFn = Arc<dyn Fn(&Outbound, &TransmitOutcome) + Send + Sync>;
pub(crate) type ErrorFn = Arc<dyn Fn(&GatewayError) + Send + Sync>;
pub(crate) type SaveSegmentFn =
    Arc<dyn Fn(Segment) -> BoxFuture<'static, Result<Persistence, HandlerError>> + Send + Sync>;
pub(crate) type LoadSegmentsFn = Arc<
    dyn Fn(CompositeId) -> BoxFuture<'static, Result<Vec<Segment>, HandlerError>> + Send + Sync,
>;
pub(crate) type ReleaseSegmentsFn = Arc<dyn Fn(CompositeId) + Send + Sync>;

/// Callback table consulted by the pipeline phases.
///
/// Cloning produces a snapshot; phases clone once per use so registration
/// never races a handler invocation.
#[derive(Clone, Default)]
pub(crate) struct GatewayHooks {
    pub(crate) receive: Option<ReceiveFn>,
    pub(crate) transmit: Option<TransmitFn>,
    pub(crate) error: Option<ErrorFn>,
    pub(crate) receive_segment: Option<SaveSegmentFn>,
    pub(crate) return_segments: Option<LoadSegmentsFn>,
    pub(crate) release_segments: Option<ReleaseSegmentsFn>,
}

impl GatewayHooks {
    /// Run the `transmit` hook if registered.
    pub(crate) fn transmit(&self, item: &Outbound, outcome: &TransmitOutcome) {
        if let Some(hook) = &self.transmit {
            hook(item, outcome);
        }
    }

    /// Run the `error` hook if registered.
    pub(crate) fn error(&self, error: &GatewayError) {
        if let Some(hook) = &self.error {
            hook(error);
        }
    }
}
