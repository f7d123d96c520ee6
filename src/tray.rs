use anyhow::{Context, Result};
use calloop::LoopSignal;
use std::fmt::Display;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::applet::stop_loop;
use crate::canvas::IconImage;

/// How long a fresh service gets to fail (no session bus, name taken)
/// before startup is considered successful.
const STARTUP_GRACE: Duration = Duration::from_millis(500);

/// The tray icon the applet drives. Only the applet's event loop touches it.
pub trait TrayHost {
    fn set_icon(&mut self, name: &str);
    fn set_pixmap(&mut self, image: IconImage);
    fn set_tooltip(&mut self, text: &str);
    fn set_visible(&mut self, visible: bool);
}

/// StatusNotifierItem state published over D-Bus by ksni.
struct BatteryItem {
    icon_name: String,
    pixmap: Option<IconImage>,
    tooltip: String,
    visible: bool,
    quit: LoopSignal,
}

impl ksni::Tray for BatteryItem {
    fn id(&self) -> String {
        env!("CARGO_PKG_NAME").into()
    }

    fn title(&self) -> String {
        "batterytray".into()
    }

    fn category(&self) -> ksni::Category {
        ksni::Category::Hardware
    }

    fn status(&self) -> ksni::Status {
        if self.visible { ksni::Status::Active } else { ksni::Status::Passive }
    }

    fn icon_name(&self) -> String {
        // A pixmap takes priority; hosts fall back to the name when it is empty.
        if self.pixmap.is_some() { String::new() } else { self.icon_name.clone() }
    }

    fn icon_pixmap(&self) -> Vec<ksni::Icon> {
        self.pixmap
            .iter()
            .map(|img| ksni::Icon {
                width: img.width as i32,
                height: img.height as i32,
                data: img.argb.clone(),
            })
            .collect()
    }

    fn tool_tip(&self) -> ksni::ToolTip {
        ksni::ToolTip {
            title: self.tooltip.clone(),
            description: String::new(),
            icon_name: String::new(),
            icon_pixmap: Vec::new(),
        }
    }

    fn menu(&self) -> Vec<ksni::MenuItem<Self>> {
        use ksni::menu::StandardItem;
        vec![StandardItem {
            label: "Quit".into(),
            icon_name: "application-exit".into(),
            activate: Box::new(|item: &mut Self| stop_loop(&item.quit)),
            ..Default::default()
        }
        .into()]
    }
}

/// Tray host backed by a ksni service thread. Updates are pushed through the
/// service handle, which serialises them with the D-Bus side.
pub struct SniTray {
    handle: ksni::Handle<BatteryItem>,
    failures: Receiver<String>,
}

impl SniTray {
    pub fn spawn(quit: LoopSignal) -> Result<Self> {
        let item = BatteryItem {
            icon_name: crate::display::MISSING_ICON.into(),
            pixmap: None,
            tooltip: "batterytray".into(),
            visible: false,
            quit: quit.clone(),
        };
        let service = ksni::TrayService::new(item);
        let handle = service.handle();
        let failures = start_service(move || service.run(), quit, STARTUP_GRACE)?;
        log::info!("StatusNotifierItem service started");
        Ok(Self { handle, failures })
    }

    /// Error that ended the service thread, if it has died.
    pub fn failure(&self) -> Option<String> {
        self.failures.try_recv().ok()
    }

    pub fn shutdown(&self) {
        self.handle.shutdown();
    }
}

impl TrayHost for SniTray {
    fn set_icon(&mut self, name: &str) {
        let name = name.to_string();
        self.handle.update(move |item| {
            item.icon_name = name.clone();
            item.pixmap = None;
        });
    }

    fn set_pixmap(&mut self, image: IconImage) {
        self.handle.update(move |item| item.pixmap = Some(image.clone()));
    }

    fn set_tooltip(&mut self, text: &str) {
        let text = text.to_string();
        self.handle.update(move |item| item.tooltip = text.clone());
    }

    fn set_visible(&mut self, visible: bool) {
        self.handle.update(move |item| item.visible = visible);
    }
}

/// Run a blocking service on its own thread. A failure within `grace` is
/// returned directly; a later one is sent on the returned channel and stops
/// the event loop.
fn start_service<F, E>(run: F, quit: LoopSignal, grace: Duration) -> Result<Receiver<String>>
where
    F: FnOnce() -> Result<(), E> + Send + 'static,
    E: Display,
{
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("sni-tray".into())
        .spawn(move || match run() {
            Ok(()) => log::info!("StatusNotifierItem service stopped"),
            Err(e) => {
                log::error!("StatusNotifierItem service failed: {}", e);
                let _ = tx.send(e.to_string());
                stop_loop(&quit);
            }
        })
        .context("Failed to spawn tray thread")?;

    match rx.recv_timeout(grace) {
        Ok(err) => anyhow::bail!("Failed to start tray icon: {}", err),
        Err(RecvTimeoutError::Disconnected) => anyhow::bail!("Tray service exited during startup"),
        Err(RecvTimeoutError::Timeout) => Ok(rx),
    }
}
