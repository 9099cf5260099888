//! Sentinel visibility: scroll root resolution, the fire/cooldown state machine
//! and the binding that ties both to a pluggable visibility source.
mod binding;
mod layout;
mod manual;
mod source;
mod trigger;

pub use binding::SentinelBinding;
pub use layout::{
    content_overflows, is_scroll_container, resolve_scroll_root, LayoutTree, NodeId, Overflow,
    ScrollRoot,
};
pub use manual::ManualVisibilitySource;
pub use source::{ObserveOptions, ObserverId, VisibilityChange, VisibilitySource};
pub use trigger::{LoadGate, TriggerConfig, TriggerMode, VisibilityTrigger, DEFAULT_COOLDOWN};
