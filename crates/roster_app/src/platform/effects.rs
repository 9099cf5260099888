use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use roster_core::{Msg, PageRequest, QueryError, QueryErrorKind};
use roster_engine::{EngineEvent, EngineHandle, FailureKind, FetchError};

use super::app::AppEvent;

/// Hands page requests to the engine and feeds its results back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, event_tx: mpsc::Sender<AppEvent>) -> Self {
        let runner = Self { engine };
        runner.spawn_event_loop(event_tx);
        runner
    }

    pub fn fetch(&self, request: PageRequest) {
        engine_info!(
            "FetchPage {} page={} generation={}",
            request.key,
            request.page,
            request.generation
        );
        self.engine.enqueue(request);
    }

    fn spawn_event_loop(&self, event_tx: mpsc::Sender<AppEvent>) {
        let events = self.engine.events();
        thread::spawn(move || loop {
            let event = match events.recv_timeout(Duration::from_millis(50)) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    engine_debug!("Engine stopped; stopping effect loop");
                    break;
                }
            };
            let msg = match event {
                EngineEvent::PageFetched { request, result } => {
                    let result = result.map_err(|err| {
                        engine_warn!("Page {} of {} failed: {}", request.page, request.key, err);
                        map_failure(err)
                    });
                    Msg::PageLoaded { request, result }
                }
            };
            if event_tx.send(AppEvent::Msg(msg)).is_err() {
                engine_debug!("App event channel closed; stopping effect loop");
                break;
            }
        });
    }
}

fn map_failure(err: FetchError) -> QueryError {
    let kind = match err.kind {
        FailureKind::HttpStatus(status) => QueryErrorKind::Server { status },
        FailureKind::Timeout => QueryErrorKind::Timeout,
        FailureKind::Decode | FailureKind::TooLarge { .. } => QueryErrorKind::Decode,
        FailureKind::Network | FailureKind::InvalidUrl => QueryErrorKind::Network,
    };
    QueryError::new(kind, err.server_message)
}
