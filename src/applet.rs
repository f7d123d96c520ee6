use anyhow::{Context, Result};
use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, LoopHandle, LoopSignal};
use std::time::Duration;

use crate::battery;
use crate::canvas::{self, FontState};
use crate::config::{DisplayConfig, RenderMode};
use crate::display::{self, Display, Glyph, MISSING_ICON};
use crate::poller::{CommandPoller, StatusSource};
use crate::tray::{SniTray, TrayHost};

/// Loop-owned state: the poll source, the tray it drives and the last
/// display pushed to it.
pub struct Applet<S, T> {
    config: DisplayConfig,
    source: S,
    tray: T,
    font: Option<FontState>,
    last: Option<Display>,
}

impl<S: StatusSource, T: TrayHost> Applet<S, T> {
    pub fn new(config: DisplayConfig, source: S, tray: T) -> Result<Self> {
        let font = match config.render {
            RenderMode::Text { .. } => Some(FontState::load(&config.font)?),
            RenderMode::Icon => None,
        };
        Ok(Self { config, source, tray, font, last: None })
    }

    pub fn tray_mut(&mut self) -> &mut T {
        &mut self.tray
    }

    /// One poll: fetch, parse, select and push. Failures become the
    /// degraded display; the next tick retries.
    pub fn tick(&mut self) -> &Display {
        let result = self.source.fetch().and_then(|out| battery::parse_status(&out));
        let next = match result {
            Ok(reading) => {
                log::debug!(
                    "Battery: {} {}% {:?}",
                    reading.label(),
                    reading.percentage,
                    reading.detail
                );
                display::select(&reading, &self.config)
            }
            Err(e) => {
                log::warn!("Battery poll failed: {}", e);
                display::degraded(&e, &self.config)
            }
        };
        self.push(next)
    }

    fn push(&mut self, next: Display) -> &Display {
        let previous = self.last.take();

        if previous.as_ref().map(|d| &d.glyph) != Some(&next.glyph) {
            self.push_glyph(&next.glyph);
        }
        if previous.as_ref().map(|d| &d.tooltip) != Some(&next.tooltip) {
            self.tray.set_tooltip(&next.tooltip);
        }

        self.last.insert(next)
    }

    fn push_glyph(&mut self, glyph: &Glyph) {
        match glyph {
            Glyph::Icon(name) => self.tray.set_icon(name),
            Glyph::Text { label, color } => {
                let size = match self.config.render {
                    RenderMode::Text { font_size, .. } => font_size,
                    RenderMode::Icon => return self.tray.set_icon(MISSING_ICON),
                };
                let Some(font) = &self.font else {
                    return self.tray.set_icon(MISSING_ICON);
                };
                match canvas::render_label(font, label, size, *color) {
                    Ok(image) => self.tray.set_pixmap(image),
                    Err(e) => {
                        log::warn!("Failed to render label {:?}: {}", label, e);
                        self.tray.set_icon(MISSING_ICON);
                    }
                }
            }
        }
    }
}

/// Stop the loop from any thread. The loop only notices `stop` when it
/// wakes, which without a wakeup is the next poll tick.
pub fn stop_loop(signal: &LoopSignal) {
    signal.stop();
    signal.wakeup();
}

/// Poll once right away, then every `interval`.
fn schedule_polls<S: StatusSource, T: TrayHost>(
    handle: &LoopHandle<'_, Applet<S, T>>,
    interval: Duration,
) -> Result<()> {
    handle
        .insert_source(Timer::immediate(), move |_deadline, _, applet| {
            applet.tick();
            TimeoutAction::ToDuration(interval)
        })
        .map_err(|e| anyhow::anyhow!("Failed to register poll timer: {}", e.error))?;
    Ok(())
}

pub fn run(config: DisplayConfig) -> Result<()> {
    let mut event_loop: EventLoop<Applet<CommandPoller, SniTray>> =
        EventLoop::try_new().context("Failed to create event loop")?;
    let signal = event_loop.get_signal();

    let interval = config.interval;
    let poller = CommandPoller::new(config.command.clone());
    let tray = SniTray::spawn(signal.clone())?;
    let mut applet = Applet::new(config, poller, tray)?;
    applet.tray_mut().set_visible(true);

    schedule_polls(&event_loop.handle(), interval)?;
    ctrlc::set_handler(move || stop_loop(&signal)).context("Failed to set signal handler")?;

    event_loop
        .run(None, &mut applet, |_| {})
        .context("Event loop failed")?;

    if let Some(err) = applet.tray_mut().failure() {
        anyhow::bail!("Tray icon service failed: {}", err);
    }

    log::info!("Shutting down");
    applet.tray_mut().set_visible(false);
    applet.tray_mut().shutdown();
    Ok(())
}
