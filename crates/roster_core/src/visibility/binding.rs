use std::time::Instant;

use engine_logging::engine_debug;

use super::{
    content_overflows, resolve_scroll_root, LayoutTree, LoadGate, NodeId, ObserverId, ScrollRoot,
    TriggerConfig, VisibilitySource, VisibilityTrigger,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Attachment {
    container: Option<NodeId>,
    sentinel: NodeId,
    reset_key: u64,
    root: ScrollRoot,
    observer: ObserverId,
}

/// Owns a visibility source and keeps exactly one observer on the current sentinel.
///
/// Re-attaching to a new sentinel (the last row changes after every page)
/// keeps the trigger's cooldown. A new reset key starts the trigger over.
/// The observer is disconnected on re-attach, on [`SentinelBinding::detach`]
/// and when the binding is dropped.
pub struct SentinelBinding<S: VisibilitySource + LayoutTree> {
    source: S,
    trigger: VisibilityTrigger,
    attachment: Option<Attachment>,
}

impl<S: VisibilitySource + LayoutTree> SentinelBinding<S> {
    pub fn new(source: S, config: TriggerConfig) -> Self {
        Self {
            source,
            trigger: VisibilityTrigger::new(config),
            attachment: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn trigger(&self) -> &VisibilityTrigger {
        &self.trigger
    }

    pub fn root(&self) -> Option<ScrollRoot> {
        self.attachment.map(|attachment| attachment.root)
    }

    pub fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }

    pub fn attach(&mut self, container: Option<NodeId>, sentinel: NodeId, reset_key: u64) {
        let previous = self.attachment;
        if let Some(current) = previous {
            if current.container == container
                && current.sentinel == sentinel
                && current.reset_key == reset_key
            {
                return;
            }
        }
        self.detach();
        match previous {
            Some(current) if current.reset_key == reset_key => {
                if current.sentinel != sentinel {
                    self.trigger.rebind();
                }
            }
            _ => self.trigger.reset(),
        }

        let root = resolve_scroll_root(&self.source, container, sentinel);
        let options = self.trigger.config().options;
        let observer = self.source.observe(root, sentinel, options);
        self.trigger
            .set_content_overflows(content_overflows(&self.source, root));
        engine_debug!(
            "Observing sentinel {} in {:?} as {:?} (reset key {})",
            sentinel,
            root,
            observer,
            reset_key
        );
        self.attachment = Some(Attachment {
            container,
            sentinel,
            reset_key,
            root,
            observer,
        });
    }

    pub fn detach(&mut self) {
        if let Some(attachment) = self.attachment.take() {
            self.source.disconnect(attachment.observer);
            engine_debug!("Disconnected {:?}", attachment.observer);
        }
    }

    /// Applies pending visibility changes and reports whether to load more.
    ///
    /// Call on every visibility event and on a regular tick, so a condition
    /// that outlasts the cooldown fires again.
    pub fn poll(&mut self, now: Instant, gate: LoadGate) -> bool {
        let changes = self.source.drain_changes();
        let Some(attachment) = self.attachment else {
            return false;
        };
        for change in changes {
            if change.observer == attachment.observer {
                self.trigger.observe(change.is_visible);
            }
        }
        self.trigger
            .set_content_overflows(content_overflows(&self.source, attachment.root));
        self.trigger.evaluate(now, gate)
    }
}

impl<S: VisibilitySource + LayoutTree> Drop for SentinelBinding<S> {
    fn drop(&mut self) {
        self.detach();
    }
}
