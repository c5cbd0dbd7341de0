//! Control identifier to handler bindings.
//!
//! The [`HandlerRegistry`] is owned by the probe instance. Integrations
//! install their whole handler set with one [`HandlerRegistry::batch`] call at
//! start-up and remove it with another at shutdown. Both the batch update and
//! the lookup performed for each dispatch take the same lock, so a dispatcher
//! sees either the registry before a batch or the registry after it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use kubeprobe_report::{ControlRequest, ControlResponse};
use tracing::{debug, warn};

use crate::CONTROLS_TARGET;

/// Function invoked for every request addressed at a bound control.
pub type ControlHandler = Arc<dyn Fn(&ControlRequest) -> ControlResponse + Send + Sync>;

/// Registry of control handlers keyed by control identifier.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<String, ControlHandler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and installs handlers as one atomic update.
    ///
    /// Removals are applied before additions, so an identifier present in both
    /// lists ends up bound to the new handler. Removing an unknown identifier
    /// is not an error.
    pub fn batch<I>(&self, remove: &[&str], add: I)
    where
        I: IntoIterator<Item = (String, ControlHandler)>,
    {
        let additions: Vec<_> = add.into_iter().collect();
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for control in remove {
            handlers.remove(*control);
        }
        let added = additions.len();
        handlers.extend(additions);
        debug!(
            target: CONTROLS_TARGET,
            removed = remove.len(),
            added,
            bound = handlers.len(),
            "applied control batch"
        );
    }

    /// Binds a single control.
    pub fn register(&self, control: impl Into<String>, handler: ControlHandler) {
        self.batch(&[], [(control.into(), handler)]);
    }

    /// Unbinds a single control.
    pub fn deregister(&self, control: &str) {
        self.batch(&[control], []);
    }

    /// Dispatches a request to the handler bound to its control.
    ///
    /// The handler runs after the registry lock has been released, so a slow
    /// control never delays a concurrent batch update.
    pub fn handle(&self, request: &ControlRequest) -> ControlResponse {
        let Some(handler) = self.handler(request.control()) else {
            warn!(
                target: CONTROLS_TARGET,
                control = request.control(),
                node = request.node_id(),
                "control not recognised"
            );
            return ControlResponse::Error(format!(
                "Control \"{}\" not recognised",
                request.control()
            ));
        };

        debug!(
            target: CONTROLS_TARGET,
            control = request.control(),
            node = request.node_id(),
            app = request.app_id(),
            "dispatching control"
        );
        handler(request)
    }

    /// Returns `true` when the control is bound.
    #[must_use]
    pub fn contains(&self, control: &str) -> bool {
        self.read().contains_key(control)
    }

    /// Returns the bound control identifiers in sorted order.
    #[must_use]
    pub fn controls(&self) -> Vec<String> {
        let mut controls: Vec<_> = self.read().keys().cloned().collect();
        controls.sort_unstable();
        controls
    }

    /// Returns the number of bound controls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` when no control is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn handler(&self, control: &str) -> Option<ControlHandler> {
        self.read().get(control).cloned()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, ControlHandler>> {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HandlerRegistry")
            .field("controls", &self.controls())
            .finish()
    }
}
