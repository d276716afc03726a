// Interactive component registry - per-instance callbacks for follow-up
// interactions on messages we posted (poll/quiz select menus).
//
// A command cannot route these: every poll message needs its own closure
// over its own state, so entries are keyed by a caller-built opaque id
// (message id + sequence number), which never collides across live polls.
//
// Registration hands back a `ComponentHandle`. Callers remove entries by id
// or by that handle; there is no removal by handler identity.

use super::command_models::{CommandResult, ComponentEvent};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Token returned by `ComponentRegistry::register`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentHandle(u64);

/// Whether an entry survives its first interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentLifetime {
    /// Removed right before the handler runs for the first time.
    OneShot,
    /// Stays until explicitly unregistered.
    Persistent,
}

pub struct ComponentContext<'a, D> {
    pub event: &'a ComponentEvent,
    pub components: &'a Arc<ComponentRegistry<D>>,
    pub data: &'a Arc<D>,
}

#[async_trait]
pub trait ComponentHandler<D>: Send + Sync {
    async fn handle(&self, ctx: ComponentContext<'_, D>) -> CommandResult;
}

struct Entry<D> {
    handle: ComponentHandle,
    lifetime: ComponentLifetime,
    handler: Arc<dyn ComponentHandler<D>>,
}

/// Concurrent table of component callbacks.
///
/// **DashMap:** handlers register new components while other interactions
/// are being dispatched, so the table is mutated through `&self`.
pub struct ComponentRegistry<D> {
    entries: DashMap<String, Entry<D>>,
    ids_by_handle: DashMap<ComponentHandle, String>,
    next_handle: AtomicU64,
}

impl<D: Send + Sync + 'static> ComponentRegistry<D> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            ids_by_handle: DashMap::new(),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Insert the callback for `id`, replacing (and invalidating the handle
    /// of) any previous entry with the same id.
    pub fn register(
        &self,
        id: impl Into<String>,
        lifetime: ComponentLifetime,
        handler: Arc<dyn ComponentHandler<D>>,
    ) -> ComponentHandle {
        let id = id.into();
        let handle = ComponentHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));

        let previous = self.entries.insert(
            id.clone(),
            Entry {
                handle,
                lifetime,
                handler,
            },
        );
        if let Some(previous) = previous {
            self.ids_by_handle.remove(&previous.handle);
        }
        self.ids_by_handle.insert(handle, id);

        handle
    }

    /// Remove the entry for `id`. Returns whether something was removed.
    pub fn unregister(&self, id: &str) -> bool {
        match self.entries.remove(id) {
            Some((_, entry)) => {
                self.ids_by_handle.remove(&entry.handle);
                true
            }
            None => false,
        }
    }

    /// Remove the entry created by the `register` call that returned
    /// `handle`. A handle whose entry was replaced or already removed is a
    /// no-op, so it can never remove someone else's callback.
    pub fn unregister_handle(&self, handle: ComponentHandle) -> bool {
        let Some((_, id)) = self.ids_by_handle.remove(&handle) else {
            return false;
        };
        self.entries
            .remove_if(&id, |_, entry| entry.handle == handle)
            .is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the callback for `event.custom_id` and run it.
    ///
    /// Returns `None` when nothing is registered under that id: late or
    /// duplicate interactions on a closed poll are dropped silently.
    pub async fn dispatch(
        self: &Arc<Self>,
        event: &ComponentEvent,
        data: &Arc<D>,
    ) -> Option<CommandResult> {
        let handler = self.claim(&event.custom_id)?;
        let ctx = ComponentContext {
            event,
            components: self,
            data,
        };
        Some(handler.handle(ctx).await)
    }

    /// Clone the handler out of the map so no shard lock is held across
    /// the handler's await points. One-shot entries are removed here.
    fn claim(&self, id: &str) -> Option<Arc<dyn ComponentHandler<D>>> {
        let (handle, lifetime, handler) = {
            let entry = self.entries.get(id)?;
            (entry.handle, entry.lifetime, Arc::clone(&entry.handler))
        };

        if lifetime == ComponentLifetime::OneShot {
            // Two racing interactions may both get here; only the one that
            // actually removes the entry gets to run it.
            self.entries
                .remove_if(id, |_, entry| entry.handle == handle)?;
            self.ids_by_handle.remove(&handle);
        }

        Some(handler)
    }
}

impl<D: Send + Sync + 'static> Default for ComponentRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}
