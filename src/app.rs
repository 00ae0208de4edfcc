use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::api::{HttpTransport, Transport};
use crate::config::Config;
use crate::presenter::UserAction;
use crate::steps::StepEngine;
use crate::ui::{render, TerminalGuard, Wizard};

/// The interactive guided session
pub struct App {
    engine: StepEngine,
    wizard: Wizard,
    tick_rate: Duration,
    should_quit: bool,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let transport = HttpTransport::from_config(config)
            .context("Failed to set up the service client")?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: &Config, transport: Arc<dyn Transport>) -> Self {
        let mut engine = StepEngine::from_config(transport, config);
        let mut wizard = Wizard::new(config.api.base_url.clone());
        engine.start(&mut wizard);

        Self {
            engine,
            wizard,
            tick_rate: config.refresh_rate(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let _guard = TerminalGuard::new()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
            .context("Failed to create terminal")?;
        info!(base_url = self.wizard.base_url(), "Guided session started");

        while !self.should_quit {
            terminal.draw(|f| render::draw(f, &self.wizard))?;

            if event::poll(self.tick_rate)? {
                let keys = read_queued_keys()?;
                if self.process_keys(&mut terminal, keys).await? {
                    discard_pending_input()?;
                }
            }
        }

        info!(
            step = self.engine.current_step().number(),
            complete = self.engine.is_complete(),
            "Guided session ended"
        );
        Ok(())
    }

    /// Apply key presses in arrival order.
    ///
    /// Once a key runs a step, the rest of the batch was typed while the
    /// step was in flight and is dropped. Returns whether a step ran.
    async fn process_keys<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        keys: impl IntoIterator<Item = KeyEvent>,
    ) -> Result<bool> {
        for key in keys {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match self.wizard.handle_key(key) {
                Some(UserAction::Submit) => {
                    // redraw so the busy state shows while we wait
                    self.wizard.busy = true;
                    terminal.draw(|f| render::draw(f, &self.wizard))?;
                    self.submit().await;
                    self.wizard.busy = false;
                    return Ok(true);
                }
                Some(UserAction::Quit) => {
                    self.should_quit = true;
                    return Ok(false);
                }
                None => {}
            }
        }
        Ok(false)
    }

    /// Run the current step; failures are already on screen
    async fn submit(&mut self) {
        if let Err(err) = self.engine.run_current(&mut self.wizard).await {
            debug!(error = %err, "Step did not run");
        }
    }
}

/// Read the event that is ready plus everything queued behind it
fn read_queued_keys() -> Result<Vec<KeyEvent>> {
    let mut keys = Vec::new();
    loop {
        if let Event::Key(key) = event::read()? {
            keys.push(key);
        }
        if !event::poll(Duration::ZERO)? {
            return Ok(keys);
        }
    }
}

/// Drop input that arrived while a step was running
fn discard_pending_input() -> Result<()> {
    let mut dropped = 0usize;
    while event::poll(Duration::ZERO)? {
        event::read()?;
        dropped += 1;
    }
    if dropped > 0 {
        debug!(dropped, "Discarded input typed during a step");
    }
    Ok(())
}
