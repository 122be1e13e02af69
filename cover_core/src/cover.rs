//! `Cover`: a main and a tilt axis behind one transport.
//!
//! Mutating operations are gated by the capabilities derived from the
//! configured packets; a missing capability is a silent no-op. Any change
//! worth showing is announced through the `on_change` observer.

use cover_config::DeviceClass;
use cover_traits::{AxisKind, Fired, RestoreSource, SavedAxis, SavedCover, Transport};
use serde::Serialize;

use crate::axis::AxisController;
use crate::config::Capabilities;
use crate::status::CoverStatus;

/// Observer invoked after every published state change.
pub type OnChange = Box<dyn Fn()>;

/// Point-in-time view of a cover, as shown to observers and persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverState {
    pub id: String,
    pub name: String,
    /// open, closed, opening, closing or unknown
    pub state: &'static str,
    pub position: Option<u8>,
    pub tilt_state: &'static str,
    pub tilt_position: Option<u8>,
    pub available: bool,
    pub capabilities: CapabilityFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapabilityFlags {
    pub open: bool,
    pub close: bool,
    pub stop: bool,
    pub set_position: bool,
    pub open_tilt: bool,
    pub close_tilt: bool,
    pub stop_tilt: bool,
    pub set_tilt_position: bool,
}

fn state_label(status: Option<CoverStatus>) -> &'static str {
    status.map_or("unknown", CoverStatus::label)
}

pub struct Cover {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) device_class: Option<DeviceClass>,
    pub(crate) transport: Box<dyn Transport>,
    pub(crate) main: AxisController,
    pub(crate) tilt: AxisController,
    pub(crate) on_change: Option<OnChange>,
}

impl core::fmt::Debug for Cover {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Cover")
            .field("id", &self.id)
            .field("main", &self.main)
            .field("tilt", &self.tilt)
            .finish()
    }
}

impl Cover {
    fn publish(&self, changed: bool) {
        if changed {
            if let Some(cb) = &self.on_change {
                cb();
            }
        }
    }

    pub fn open(&mut self) {
        if self.main.capabilities().open {
            let changed = self.main.open(&mut *self.transport);
            self.publish(changed);
        }
    }

    pub fn close(&mut self) {
        if self.main.capabilities().close {
            let changed = self.main.close(&mut *self.transport);
            self.publish(changed);
        }
    }

    pub fn stop(&mut self) {
        if self.main.capabilities().stop {
            let changed = self.main.hold(&mut *self.transport);
            self.publish(changed);
        }
    }

    pub fn set_position(&mut self, position: f64) {
        if self.main.capabilities().set_position {
            let changed = self.main.goto(&mut *self.transport, position);
            self.publish(changed);
        }
    }

    pub fn open_tilt(&mut self) {
        if self.tilt.capabilities().open {
            let changed = self.tilt.open(&mut *self.transport);
            self.publish(changed);
        }
    }

    pub fn close_tilt(&mut self) {
        if self.tilt.capabilities().close {
            let changed = self.tilt.close(&mut *self.transport);
            self.publish(changed);
        }
    }

    pub fn stop_tilt(&mut self) {
        if self.tilt.capabilities().stop {
            let changed = self.tilt.hold(&mut *self.transport);
            self.publish(changed);
        }
    }

    pub fn set_tilt_position(&mut self, position: f64) {
        if self.tilt.capabilities().set_position {
            let changed = self.tilt.goto(&mut *self.transport, position);
            self.publish(changed);
        }
    }

    /// Deliver a scheduler firing to the axis it was registered for.
    pub fn handle_timer(&mut self, fired: Fired) {
        let axis = match fired.timer.axis {
            AxisKind::Main => &mut self.main,
            AxisKind::Tilt => &mut self.tilt,
        };
        let changed = axis.on_timer(&mut *self.transport, &fired);
        self.publish(changed);
    }

    /// Initialize both axes from persisted state. Call once, before any command.
    pub fn restore(&mut self, saved: &SavedCover) {
        self.main.restore(&saved.main.state, saved.main.position);
        self.tilt.restore(&saved.tilt.state, saved.tilt.position);
    }

    /// Look up this cover in `source` and restore it. Returns whether state was found.
    pub fn restore_from(&mut self, source: &dyn RestoreSource) -> bool {
        match source.last_state(&self.id) {
            Some(saved) => {
                self.restore(&saved);
                true
            }
            None => {
                tracing::debug!(cover = %self.id, "no saved state");
                false
            }
        }
    }

    /// State in the shape `RestoreSource` hands back on the next start.
    pub fn saved(&self) -> SavedCover {
        let axis = |a: &AxisController| SavedAxis {
            state: state_label(a.status()).to_string(),
            position: a.position(),
        };
        SavedCover {
            main: axis(&self.main),
            tilt: axis(&self.tilt),
        }
    }

    /// Estimated main position; `None` unless the cover can set position.
    pub fn current_position(&self) -> Option<u8> {
        if self.main.capabilities().set_position {
            self.main.position()
        } else {
            None
        }
    }

    /// Estimated tilt position; `None` unless the tilt can set position.
    pub fn current_tilt_position(&self) -> Option<u8> {
        if self.tilt.capabilities().set_position {
            self.tilt.position()
        } else {
            None
        }
    }

    pub fn is_closed(&self) -> bool {
        self.main.status() == Some(CoverStatus::Closed)
    }

    pub fn is_opening(&self) -> bool {
        self.main.status() == Some(CoverStatus::Opening)
    }

    pub fn is_closing(&self) -> bool {
        self.main.status() == Some(CoverStatus::Closing)
    }

    pub fn is_tilt_closed(&self) -> bool {
        self.tilt.status() == Some(CoverStatus::Closed)
    }

    pub fn is_tilt_opening(&self) -> bool {
        self.tilt.status() == Some(CoverStatus::Opening)
    }

    pub fn is_tilt_closing(&self) -> bool {
        self.tilt.status() == Some(CoverStatus::Closing)
    }

    pub fn status(&self) -> Option<CoverStatus> {
        self.main.status()
    }

    pub fn tilt_status(&self) -> Option<CoverStatus> {
        self.tilt.status()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.main.capabilities()
    }

    pub fn tilt_capabilities(&self) -> Capabilities {
        self.tilt.capabilities()
    }

    pub fn main_enabled(&self) -> bool {
        self.main.capabilities().any()
    }

    pub fn tilt_enabled(&self) -> bool {
        self.tilt.capabilities().any()
    }

    pub fn available(&self) -> bool {
        self.transport.is_available()
    }

    /// Always true: the actuator never reports its state.
    pub fn assumed_state(&self) -> bool {
        true
    }

    pub fn unique_id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tilt_name(&self) -> &str {
        self.tilt.name()
    }

    pub fn device_class(&self) -> Option<DeviceClass> {
        self.device_class
    }

    pub fn main_axis(&self) -> &AxisController {
        &self.main
    }

    pub fn tilt_axis(&self) -> &AxisController {
        &self.tilt
    }

    pub fn snapshot(&self) -> CoverState {
        let (m, t) = (self.main.capabilities(), self.tilt.capabilities());
        CoverState {
            id: self.id.clone(),
            name: self.name.clone(),
            state: state_label(self.main.status()),
            position: self.current_position(),
            tilt_state: state_label(self.tilt.status()),
            tilt_position: self.current_tilt_position(),
            available: self.available(),
            capabilities: CapabilityFlags {
                open: m.open,
                close: m.close,
                stop: m.stop,
                set_position: m.set_position,
                open_tilt: t.open,
                close_tilt: t.close,
                stop_tilt: t.stop,
                set_tilt_position: t.set_position,
            },
        }
    }
}
