//! Post-load callbacks.

use std::fmt;
use std::sync::Arc;

use crate::base::QualifiedName;

/// A handler run with the definition once its name is loaded.
pub type Handler<D> = Arc<dyn Fn(&D) + Send + Sync>;

struct Callback<D> {
    target: QualifiedName,
    handler: Handler<D>,
    fired: bool,
}

/// Registered callbacks, in registration order.
///
/// Callbacks stay registered after firing; only [`clear`](Callbacks::clear)
/// removes them.
pub(crate) struct Callbacks<D> {
    entries: Vec<Callback<D>>,
}

impl<D> Callbacks<D> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a handler. `fired` is set when the caller runs it right away.
    pub(crate) fn register(&mut self, target: QualifiedName, handler: Handler<D>, fired: bool) {
        self.entries.push(Callback {
            target,
            handler,
            fired,
        });
    }

    /// Mark every unfired callback for `name` as fired and hand back their
    /// handlers, so they can run without the registry locked.
    pub(crate) fn take_unfired(&mut self, name: &QualifiedName) -> Vec<Handler<D>> {
        self.entries
            .iter_mut()
            .filter(|c| !c.fired && &c.target == name)
            .map(|c| {
                c.fired = true;
                c.handler.clone()
            })
            .collect()
    }

    pub(crate) fn pending_for(&self, name: &QualifiedName) -> usize {
        self.entries
            .iter()
            .filter(|c| !c.fired && &c.target == name)
            .count()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<D> fmt::Debug for Callbacks<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("count", &self.entries.len())
            .field("fired", &self.entries.iter().filter(|c| c.fired).count())
            .finish()
    }
}
