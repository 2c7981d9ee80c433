//! Per-pass handler instances.

use std::collections::HashMap;

use tracing::debug;

use crate::registry::normalize_name;
use crate::{Shortcode, ShortcodeEntry};

/// Live handler instances of one pass, keyed by normalized tag name.
///
/// Instances are kept in creation order. Each one is disposed exactly once, either
/// by [`dispose_all`](Self::dispose_all) or, if the pass is dropped before that
/// (for example when its future is cancelled), on drop.
#[derive(Default)]
pub(crate) struct InstanceArena {
    instances: Vec<(String, Box<dyn Shortcode>)>,
    index: HashMap<String, usize>,
}

impl InstanceArena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Existing instance for the entry's name, or a new one created from the entry.
    pub(crate) fn get_or_create(&mut self, entry: &ShortcodeEntry) -> &mut dyn Shortcode {
        let key = normalize_name(entry.name());
        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                debug!(shortcode = entry.name(), "Creating shortcode instance");
                self.instances.push((entry.name().to_owned(), entry.create()));
                let idx = self.instances.len() - 1;
                self.index.insert(key, idx);
                idx
            }
        };
        self.instances[idx].1.as_mut()
    }

    /// Number of live instances.
    pub(crate) fn len(&self) -> usize {
        self.instances.len()
    }

    /// Dispose every instance in creation order and empty the arena.
    pub(crate) fn dispose_all(&mut self) {
        self.index.clear();
        for (name, mut instance) in self.instances.drain(..) {
            debug!(shortcode = %name, "Disposing shortcode instance");
            instance.dispose();
        }
    }
}

impl Drop for InstanceArena {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::{
        Document, HandlerError, ShortcodeArgs, ShortcodeContext, ShortcodeKind, ShortcodeOutput,
        ShortcodeRegistry,
    };

    struct Tracked {
        id: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Shortcode for Tracked {
        async fn execute(
            &mut self,
            _args: &ShortcodeArgs,
            _content: &str,
            _document: &Document,
            _ctx: &ShortcodeContext<'_>,
        ) -> Result<ShortcodeOutput, HandlerError> {
            Ok(ShortcodeOutput::None)
        }

        fn dispose(&mut self) {
            self.log.lock().unwrap().push(self.id);
        }
    }

    fn registry(log: &Arc<Mutex<Vec<&'static str>>>) -> ShortcodeRegistry {
        let mut registry = ShortcodeRegistry::new();
        for id in ["A", "B"] {
            let log = Arc::clone(log);
            registry.add_factory(id, ShortcodeKind::Standard, move || {
                Box::new(Tracked {
                    id,
                    log: Arc::clone(&log),
                })
            });
        }
        registry
    }

    #[test]
    fn test_reuses_instance_per_name() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = registry(&log);
        let mut arena = InstanceArena::new();

        arena.get_or_create(registry.resolve("A").unwrap());
        arena.get_or_create(registry.resolve("a").unwrap());
        arena.get_or_create(registry.resolve("B").unwrap());

        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_dispose_all_in_creation_order_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = registry(&log);
        let mut arena = InstanceArena::new();

        arena.get_or_create(registry.resolve("B").unwrap());
        arena.get_or_create(registry.resolve("A").unwrap());
        arena.dispose_all();
        drop(arena);

        assert_eq!(*log.lock().unwrap(), vec!["B", "A"]);
    }

    #[test]
    fn test_drop_disposes() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = registry(&log);
        {
            let mut arena = InstanceArena::new();
            arena.get_or_create(registry.resolve("A").unwrap());
        }
        assert_eq!(*log.lock().unwrap(), vec!["A"]);
    }
}
