//! Kind-keyed handler registrations with isolated dispatch.

use mullion_proto::{Envelope, Kinded};

/// Error a handler may fail with. Failures are logged and contained; they
/// never stop sibling handlers or future dispatches.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

type BoxedHandler<P, O> = Box<dyn FnMut(&Envelope<P>) -> Result<Vec<O>, HandlerError>>;

/// Token returned by [`HandlerRegistry::on`]; passing it to
/// [`HandlerRegistry::off`] removes exactly that registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

struct Registration<P: Kinded, O> {
    id: HandlerId,
    kind: P::Kind,
    handler: BoxedHandler<P, O>,
}

/// What one dispatch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchReport {
    /// Handlers invoked (including failing ones).
    pub invoked: usize,
    /// Handlers that returned an error.
    pub failed: usize,
}

/// Ordered set of handlers keyed by payload kind.
///
/// Handlers registered for a kind run in registration order. Each
/// invocation is isolated: a failing handler is logged and skipped, and
/// the outputs of the remaining handlers are still collected. Outputs are
/// whatever the owning endpoint executes after the dispatch - replies for
/// the shell side, events for the app side.
pub struct HandlerRegistry<P: Kinded, O> {
    registrations: Vec<Registration<P, O>>,
    next_id: u64,
}

impl<P: Kinded, O> HandlerRegistry<P, O> {
    /// Empty registry.
    pub fn new() -> Self {
        Self { registrations: Vec::new(), next_id: 0 }
    }

    /// Register `handler` for messages of `kind`.
    pub fn on(
        &mut self,
        kind: P::Kind,
        handler: impl FnMut(&Envelope<P>) -> Result<Vec<O>, HandlerError> + 'static,
    ) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.registrations.push(Registration { id, kind, handler: Box::new(handler) });
        id
    }

    /// Remove the registration identified by `id`.
    ///
    /// Returns false when the id was already removed (teardown functions
    /// may safely run twice).
    pub fn off(&mut self, id: HandlerId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|registration| registration.id != id);
        self.registrations.len() < before
    }

    /// Number of handlers registered for `kind`.
    pub fn count(&self, kind: P::Kind) -> usize {
        self.registrations.iter().filter(|registration| registration.kind == kind).count()
    }

    /// Total registrations across all kinds.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Drop every registration.
    pub fn clear(&mut self) {
        self.registrations.clear();
    }

    /// Invoke every handler registered for the envelope's kind, in
    /// registration order, collecting their outputs into `outputs`.
    pub fn dispatch(&mut self, envelope: &Envelope<P>, outputs: &mut Vec<O>) -> DispatchReport {
        let kind = envelope.payload.kind();
        let mut report = DispatchReport::default();
        for registration in &mut self.registrations {
            if registration.kind != kind {
                continue;
            }
            report.invoked += 1;
            match (registration.handler)(envelope) {
                Ok(mut produced) => outputs.append(&mut produced),
                Err(error) => {
                    report.failed += 1;
                    tracing::error!(%kind, %error, "message handler failed");
                },
            }
        }
        report
    }
}

impl<P: Kinded, O> Default for HandlerRegistry<P, O> {
    fn default() -> Self {
        Self::new()
    }
}
