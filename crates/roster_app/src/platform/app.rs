use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use engine_logging::{engine_debug, engine_info};
use roster_core::visibility::SentinelBinding;
use roster_core::{update, Effect, ListState, Msg, Resource};
use roster_engine::EngineHandle;

use super::config::ConsoleConfig;
use super::effects::EffectRunner;
use super::ui::input::{parse_command, UiCommand, HELP_TEXT};
use super::ui::render::render;
use super::viewport::{TerminalViewport, TABLE_NODE};

const TICK_INTERVAL: Duration = Duration::from_millis(250);

pub enum AppEvent {
    Msg(Msg),
    Input(String),
    InputClosed,
}

/// What to show first, from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseOptions {
    pub resource: Resource,
    pub filters: Vec<(String, String)>,
    pub page_size: Option<u32>,
}

pub fn run_browse(
    config: &ConsoleConfig,
    engine: EngineHandle,
    options: BrowseOptions,
) -> anyhow::Result<()> {
    let (event_tx, event_rx) = mpsc::channel();
    let runner = EffectRunner::new(engine, event_tx.clone());
    let app = BrowseApp::new(config, options, runner, event_rx, Box::new(io::stdout()))?;

    let input_tx = event_tx.clone();
    thread::Builder::new()
        .name("roster-input".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if input_tx.send(AppEvent::Input(line)).is_err() {
                    return;
                }
            }
            let _ = input_tx.send(AppEvent::InputClosed);
        })
        .context("could not start input thread")?;

    // Drives cache pruning and lets a lingering sentinel fire again after its cooldown.
    thread::Builder::new()
        .name("roster-tick".to_string())
        .spawn(move || {
            while event_tx.send(AppEvent::Msg(Msg::Tick)).is_ok() {
                thread::sleep(TICK_INTERVAL);
            }
        })
        .context("could not start tick thread")?;

    app.run()
}

pub struct BrowseApp {
    lists: BTreeMap<Resource, ListState>,
    active: Resource,
    page_size: u32,
    stale_time: Duration,
    binding: SentinelBinding<TerminalViewport>,
    runner: EffectRunner,
    event_rx: mpsc::Receiver<AppEvent>,
    out: Box<dyn Write>,
    notice: Option<String>,
    needs_render: bool,
}

impl BrowseApp {
    pub fn new(
        config: &ConsoleConfig,
        options: BrowseOptions,
        runner: EffectRunner,
        event_rx: mpsc::Receiver<AppEvent>,
        out: Box<dyn Write>,
    ) -> anyhow::Result<Self> {
        let page_size = options.page_size.unwrap_or(config.page_size);
        roster_core::validate_page_size(page_size)?;

        let mut app = Self {
            lists: BTreeMap::new(),
            active: options.resource,
            page_size,
            stale_time: config.stale_time(),
            binding: SentinelBinding::new(
                TerminalViewport::new(usize::from(config.viewport_rows)),
                config.trigger_config(),
            ),
            runner,
            event_rx,
            out,
            notice: None,
            needs_render: true,
        };

        let mut initial = app.new_list(options.resource);
        for (name, value) in &options.filters {
            initial = initial
                .with_filter(name, value)
                .with_context(|| format!("invalid filter {name}={value}"))?;
        }
        app.lists.insert(options.resource, initial);
        Ok(app)
    }

    fn new_list(&self, resource: Resource) -> ListState {
        ListState::new(resource, self.page_size).with_stale_time(self.stale_time)
    }

    pub fn run(mut self) -> anyhow::Result<()> {
        self.start();
        self.render()?;
        while let Ok(event) = self.event_rx.recv() {
            if !self.handle_event(event) {
                break;
            }
            if self.needs_render {
                self.render()?;
            }
        }
        self.stop();
        Ok(())
    }

    fn start(&mut self) {
        engine_info!("Browsing {}", self.active);
        self.dispatch(Msg::Mounted);
        self.sync_sentinel();
    }

    fn stop(&mut self) {
        self.dispatch(Msg::Unmounted);
        self.binding.detach();
        engine_info!("Stopped browsing");
    }

    /// Returns false when the user asked to quit.
    fn handle_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Msg(msg) => self.dispatch(msg),
            AppEvent::Input(line) => {
                if !self.handle_input(&line) {
                    return false;
                }
            }
            AppEvent::InputClosed => return false,
        }
        self.sync_sentinel();
        true
    }

    fn handle_input(&mut self, line: &str) -> bool {
        self.notice = None;
        self.needs_render = true;
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(err) => {
                self.notice = Some(err.to_string());
                return true;
            }
        };
        match command {
            UiCommand::Scroll(rows) => self.binding.source_mut().scroll_by(rows),
            UiCommand::NextScreen => {
                let height = self.binding.source().height() as i64;
                self.binding.source_mut().scroll_by(height);
            }
            UiCommand::Top => self.binding.source_mut().scroll_to(0),
            UiCommand::Bottom => self.binding.source_mut().scroll_to(usize::MAX),
            UiCommand::Search(text) => self.dispatch(Msg::FilterChanged {
                name: "search".to_string(),
                value: text,
            }),
            UiCommand::Filter { name, value } => {
                self.dispatch(Msg::FilterChanged { name, value })
            }
            UiCommand::PageSize(size) => self.dispatch(Msg::PageSizeChanged(size)),
            UiCommand::Switch(resource) => self.switch_to(resource),
            UiCommand::Retry => self.dispatch(Msg::RetryClicked),
            UiCommand::Dismiss => self.dispatch(Msg::ErrorDismissed),
            UiCommand::Help => self.notice = Some(HELP_TEXT.to_string()),
            UiCommand::Quit => return false,
        }
        true
    }

    fn switch_to(&mut self, resource: Resource) {
        if resource == self.active {
            return;
        }
        self.dispatch(Msg::Unmounted);
        self.binding.detach();
        self.binding.source_mut().scroll_to(0);
        if !self.lists.contains_key(&resource) {
            let list = self.new_list(resource);
            self.lists.insert(resource, list);
        }
        engine_info!("Switching {} -> {}", self.active, resource);
        self.active = resource;
        self.dispatch(Msg::Mounted);
        self.needs_render = true;
    }

    fn dispatch(&mut self, msg: Msg) {
        // Late pages go to the list that asked for them, which may be in the background.
        let target = match &msg {
            Msg::PageLoaded { request, .. } => request.key.resource(),
            _ => self.active,
        };
        let Some(slot) = self.lists.get_mut(&target) else {
            engine_debug!("No list for {}; dropping {:?}", target, msg);
            return;
        };
        let state = std::mem::take(slot);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() && target == self.active {
            self.needs_render = true;
        }
        *slot = state;
        self.run_effects(target, effects);
    }

    fn run_effects(&mut self, target: Resource, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchPage(request) => self.runner.fetch(request),
                Effect::ScrollToTop { reset_key } => {
                    if target == self.active {
                        engine_debug!("Scroll to top, reset key {}", reset_key);
                        self.binding.source_mut().scroll_to(0);
                    }
                }
            }
        }
    }

    /// Keeps the observer on the last loaded row and loads more when it asks.
    fn sync_sentinel(&mut self) {
        let Some(state) = self.lists.get(&self.active) else {
            return;
        };
        let row_count = state.list().item_count();
        let reset_key = state.reset_key();
        let gate = state.load_gate();

        self.binding.source_mut().set_row_count(row_count);
        match row_count.checked_sub(1) {
            Some(last) => self.binding.attach(
                Some(TABLE_NODE),
                TerminalViewport::row_node(last),
                reset_key,
            ),
            None => self.binding.detach(),
        }
        if self.binding.poll(Instant::now(), gate) {
            self.dispatch(Msg::SentinelTriggered);
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.needs_render = false;
        let Some(state) = self.lists.get(&self.active) else {
            return Ok(());
        };
        let lines = render(&state.view(), self.binding.source().window());
        write!(self.out, "\x1b[2J\x1b[H")?;
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        if let Some(notice) = &self.notice {
            writeln!(self.out, "{notice}")?;
        }
        write!(self.out, "> ")?;
        self.out.flush()
    }
}
