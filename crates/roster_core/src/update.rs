use engine_logging::engine_debug;

use crate::filters::{validate_filter, validate_page_size};
use crate::{Effect, ListState, Msg, Received};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ListState, msg: Msg) -> (ListState, Vec<Effect>) {
    let effects = match msg {
        Msg::Mounted => {
            if state.is_mounted() {
                return (state, Vec::new());
            }
            state.set_mounted(true);
            state.mark_dirty();
            state.load_current_key()
        }
        Msg::Unmounted => {
            if !state.is_mounted() {
                return (state, Vec::new());
            }
            state.set_mounted(false);
            let key = state.key().clone();
            // Rows die with the surface; the cache keeps them for a re-mount.
            state.list_mut().reset(key);
            state.set_banner(None);
            state.mark_dirty();
            Vec::new()
        }
        Msg::FilterChanged { name, value } => {
            let value = match validate_filter(state.resource(), &name, &value) {
                Ok(value) => value,
                Err(err) => {
                    engine_debug!("Rejected filter {}={:?}: {}", name, value, err);
                    state.set_validation_error(Some(err));
                    state.mark_dirty();
                    return (state, Vec::new());
                }
            };
            if state.validation_error().is_some() {
                state.set_validation_error(None);
                state.mark_dirty();
            }
            let key = state.key().clone().with_filter(name, value);
            state.switch_key(key)
        }
        Msg::PageSizeChanged(size) => {
            if let Err(err) = validate_page_size(size) {
                state.set_validation_error(Some(err));
                state.mark_dirty();
                return (state, Vec::new());
            }
            if state.validation_error().is_some() {
                state.set_validation_error(None);
                state.mark_dirty();
            }
            let mut key = state.key().clone();
            key.set_limit(size);
            state.switch_key(key)
        }
        Msg::SentinelTriggered => match state.list_mut().fetch_next_page() {
            Some(request) => {
                state.mark_dirty();
                vec![Effect::FetchPage(request)]
            }
            None => Vec::new(),
        },
        Msg::PageLoaded { request, result } => {
            match state.list_mut().receive(&request, result) {
                Received::Appended { .. } => {
                    let now = state.now();
                    let key = state.key().clone();
                    let pages = state.list().pages().to_vec();
                    state.cache_mut().store(&key, &pages, now);
                    state.set_banner(None);
                    state.mark_dirty();
                }
                Received::Failed => {
                    let message = state
                        .list()
                        .error()
                        .map(|err| err.display_message().to_string());
                    state.set_banner(message);
                    state.mark_dirty();
                }
                Received::Discarded => {}
            }
            Vec::new()
        }
        Msg::RetryClicked => match state.list_mut().retry() {
            Some(request) => {
                state.set_banner(None);
                state.mark_dirty();
                vec![Effect::FetchPage(request)]
            }
            None => Vec::new(),
        },
        Msg::ErrorDismissed => {
            state.set_banner(None);
            state.set_validation_error(None);
            state.mark_dirty();
            Vec::new()
        }
        Msg::Tick => {
            let now = state.now();
            let pruned = state.cache_mut().prune(now);
            if pruned > 0 {
                engine_debug!("Pruned {} stale cache entries", pruned);
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
