//! Callback registry: observers indexed by callback name and by owning group.
//!
//! Every registered callback lives in two indexes at once: the per-name list
//! that fixes dispatch order, and the per-group list used to revoke a whole
//! module's observers in one call. Both are updated under the same lock.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use samphook_core::error::AppError;
use samphook_core::result::AppResult;

use super::definitions::{CallbackArgs, CallbackName, DispatchOutcome};
use crate::exports::ModuleExports;
use crate::traits::CallbackHandler;

/// Identifier of a single registration, unique for the registry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct EntryId(u64);

/// Entry in the per-name index.
#[derive(Debug)]
struct CallbackEntry {
    /// Registration identifier, shared with the group index.
    id: EntryId,
    /// The observer.
    handler: Arc<dyn CallbackHandler>,
    /// Group that owns this entry.
    group: String,
}

#[derive(Debug, Default)]
struct Indexes {
    /// Callback name → observers in registration order.
    by_callback: HashMap<CallbackName, Vec<CallbackEntry>>,
    /// Group → the registrations it owns.
    by_group: HashMap<String, Vec<(CallbackName, EntryId)>>,
    /// Next registration identifier.
    next_id: u64,
}

impl Indexes {
    /// Drops the given registrations from the per-name index.
    fn remove_entries(&mut self, owned: &[(CallbackName, EntryId)]) {
        let mut ids_by_name: HashMap<CallbackName, HashSet<EntryId>> = HashMap::new();
        for (name, id) in owned {
            ids_by_name.entry(*name).or_default().insert(*id);
        }

        for (name, ids) in &ids_by_name {
            if let Some(entries) = self.by_callback.get_mut(name) {
                entries.retain(|entry| !ids.contains(&entry.id));
                if entries.is_empty() {
                    self.by_callback.remove(name);
                }
            }
        }
    }
}

/// Registry of observers for host callbacks.
#[derive(Debug, Default)]
pub struct CallbackRegistry {
    /// Both indexes, guarded together.
    indexes: RwLock<Indexes>,
    /// Stack of modules currently being imported; the top one owns
    /// registrations made without an explicit group.
    loading: Mutex<Vec<String>>,
}

/// Marks a module as being loaded until dropped.
///
/// Dropping a guard also ends every load begun after it.
#[derive(Debug)]
pub struct ModuleLoadGuard<'a> {
    registry: &'a CallbackRegistry,
    /// Stack depth below this guard's entry.
    depth: usize,
}

impl Drop for ModuleLoadGuard<'_> {
    fn drop(&mut self) {
        self.registry.loading.lock().truncate(self.depth);
    }
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer for a callback.
    ///
    /// With no explicit `group`, the observer is owned by the module currently
    /// being imported. Outside an import that is a configuration error.
    /// Registering the same handler twice creates two independent entries.
    pub fn register(
        &self,
        name: CallbackName,
        handler: Arc<dyn CallbackHandler>,
        group: Option<&str>,
    ) -> AppResult<()> {
        let group = match group {
            Some(group) => group.to_string(),
            None => self.loading_module().ok_or_else(|| {
                AppError::configuration(format!(
                    "Cannot register '{name}' without a group outside of a module import"
                ))
            })?,
        };

        let mut guard = self.indexes.write();
        let indexes = &mut *guard;
        let id = EntryId(indexes.next_id);
        indexes.next_id += 1;

        indexes.by_callback.entry(name).or_default().push(CallbackEntry {
            id,
            handler,
            group: group.clone(),
        });
        indexes.by_group.entry(group.clone()).or_default().push((name, id));

        debug!(callback = %name, group = %group, "Callback registered");
        Ok(())
    }

    /// Registers every present entry of a module's export table under `group`.
    ///
    /// Entries are registered in [`CallbackName::ALL`] order. Returns how many
    /// observers were added.
    pub fn register_exports(&self, group: &str, exports: &ModuleExports) -> AppResult<usize> {
        let mut count = 0;
        for (name, handler) in exports.present() {
            self.register(name, Arc::clone(handler), Some(group))?;
            count += 1;
        }

        if count > 0 {
            info!(group = %group, callbacks = count, "Module callbacks registered");
        }
        Ok(count)
    }

    /// Removes every observer owned by `group` from both indexes.
    ///
    /// Fails with a not-found error if the group owns nothing, including when
    /// it was already revoked. Returns how many observers were removed.
    pub fn unregister(&self, group: &str) -> AppResult<usize> {
        let mut guard = self.indexes.write();
        let indexes = &mut *guard;

        let owned = match indexes.by_group.remove(group) {
            Some(owned) if !owned.is_empty() => owned,
            _ => {
                return Err(AppError::not_found(format!(
                    "Group '{group}' has no registered callbacks"
                )));
            }
        };

        indexes.remove_entries(&owned);

        info!(group = %group, callbacks = owned.len(), "Group callbacks unregistered");
        Ok(owned.len())
    }

    /// Revokes the observers `group` gained after it owned `keep` of them.
    ///
    /// Observers registered earlier stay in place. Returns how many were
    /// revoked; a group already at or below `keep` is left untouched.
    pub fn truncate_group(&self, group: &str, keep: usize) -> usize {
        let mut guard = self.indexes.write();
        let indexes = &mut *guard;

        let added = match indexes.by_group.get_mut(group) {
            Some(owned) if owned.len() > keep => owned.split_off(keep),
            _ => return 0,
        };
        if indexes.by_group.get(group).is_some_and(Vec::is_empty) {
            indexes.by_group.remove(group);
        }

        indexes.remove_entries(&added);

        debug!(group = %group, callbacks = added.len(), kept = keep, "Group callbacks rolled back");
        added.len()
    }

    /// Invokes every observer registered for `name`, in registration order.
    ///
    /// The observer list is snapshotted before the first call, so observers
    /// may register or revoke while the pass runs. The pass stops at the first
    /// [`Suppress`](super::definitions::CallbackAction::Suppress); an observer
    /// error aborts it and is returned as-is.
    pub fn dispatch(&self, name: CallbackName, args: &CallbackArgs) -> AppResult<DispatchOutcome> {
        let snapshot = self.snapshot(name);

        let mut outcome = DispatchOutcome {
            callback: name,
            invoked: 0,
            suppressed_by: None,
        };

        if snapshot.is_empty() {
            return Ok(outcome);
        }

        debug!(callback = %name, observers = snapshot.len(), "Dispatching callback");

        for (handler, group) in snapshot {
            outcome.invoked += 1;
            let action = handler.handle(args).inspect_err(|e| {
                debug!(callback = %name, group = %group, error = %e, "Observer failed");
            })?;

            if action.is_suppress() {
                debug!(callback = %name, group = %group, "Observer suppressed dispatch");
                outcome.suppressed_by = Some(group);
                break;
            }
        }

        Ok(outcome)
    }

    fn snapshot(&self, name: CallbackName) -> Vec<(Arc<dyn CallbackHandler>, String)> {
        let indexes = self.indexes.read();
        indexes
            .by_callback
            .get(&name)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| (Arc::clone(&entry.handler), entry.group.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Marks `module` as being loaded until the returned guard is dropped.
    pub fn begin_module_load(&self, module: &str) -> ModuleLoadGuard<'_> {
        let mut loading = self.loading.lock();
        let depth = loading.len();
        loading.push(module.to_string());
        ModuleLoadGuard {
            registry: self,
            depth,
        }
    }

    /// Returns the module currently being loaded, if any.
    pub fn loading_module(&self) -> Option<String> {
        self.loading.lock().last().cloned()
    }

    /// Returns the observers registered for a callback, in dispatch order.
    pub fn handlers(&self, name: CallbackName) -> Vec<Arc<dyn CallbackHandler>> {
        self.snapshot(name)
            .into_iter()
            .map(|(handler, _)| handler)
            .collect()
    }

    /// Returns the number of observers registered for a callback.
    pub fn callback_count(&self, name: CallbackName) -> usize {
        let indexes = self.indexes.read();
        indexes.by_callback.get(&name).map_or(0, Vec::len)
    }

    /// Returns the number of observers owned by a group.
    pub fn group_count(&self, group: &str) -> usize {
        let indexes = self.indexes.read();
        indexes.by_group.get(group).map_or(0, Vec::len)
    }

    /// Returns whether a group owns any observers.
    pub fn has_group(&self, group: &str) -> bool {
        self.group_count(group) > 0
    }

    /// Returns all groups owning observers, sorted.
    pub fn groups(&self) -> Vec<String> {
        let indexes = self.indexes.read();
        let mut groups: Vec<String> = indexes.by_group.keys().cloned().collect();
        groups.sort();
        groups
    }
}
