use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use engine_logging::engine_info;
use roster_core::PageRequest;
use thiserror::Error;

use crate::fetch::{FetchSettings, PageFetcher, ReqwestPageFetcher};
use crate::retry::{fetch_with_retry, RetryPolicy};
use crate::{ApiContext, EngineEvent, FetchError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("could not start engine runtime: {0}")]
    Runtime(#[from] io::Error),
    #[error("could not build http client: {0}")]
    Client(#[from] FetchError),
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub settings: FetchSettings,
    pub retry: RetryPolicy,
    pub context: ApiContext,
}

enum EngineCommand {
    Fetch(PageRequest),
}

/// Runs page fetches on a background tokio runtime.
///
/// Requests go in through [`EngineHandle::enqueue`]; results come back as
/// [`EngineEvent`]s. The worker thread exits once every handle is dropped.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let fetcher = ReqwestPageFetcher::new(config.settings, config.context)?;
        Self::with_fetcher(Arc::new(fetcher), config.retry)
    }

    pub fn with_fetcher(
        fetcher: Arc<dyn PageFetcher>,
        retry: RetryPolicy,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("roster-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let fetcher = fetcher.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        handle_command(fetcher.as_ref(), &retry, command, event_tx).await;
                    });
                }
                engine_info!("Engine command channel closed; stopping");
            })?;

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    pub fn enqueue(&self, request: PageRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Fetch(request));
    }

    /// Receiving side only. Holding it does not keep the engine alive: once
    /// every handle is gone and in-flight fetches finish, it reports
    /// disconnection.
    pub fn events(&self) -> EngineEvents {
        EngineEvents {
            event_rx: self.event_rx.clone(),
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }
}

/// Event stream of an [`EngineHandle`], see [`EngineHandle::events`].
#[derive(Clone)]
pub struct EngineEvents {
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineEvents {
    pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, RecvTimeoutError> {
        self.event_rx
            .lock()
            .map_err(|_| RecvTimeoutError::Disconnected)?
            .recv_timeout(timeout)
    }
}

async fn handle_command(
    fetcher: &dyn PageFetcher,
    retry: &RetryPolicy,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Fetch(request) => {
            let result = fetch_with_retry(fetcher, retry, &request.key, request.page).await;
            let _ = event_tx.send(EngineEvent::PageFetched { request, result });
        }
    }
}
