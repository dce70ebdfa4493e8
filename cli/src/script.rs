//! Scripted input sessions for headless replay.
//!
//! A script is a JSON document with an optional viewport, optional settings
//! and a list of timestamped events. Replay feeds each event to an
//! [`EngineCore`] at its timestamp, running a frame tick between events so
//! rapid-fire and world housekeeping advance the way they would in a browser.

#[cfg(test)]
#[path = "script_test.rs"]
mod script_test;

use std::time::Duration;

use sandbox::camera::{Point, Size, View};
use sandbox::config::{ConfigError, InputConfig, Settings};
use sandbox::engine::{Action, EngineCore};
use sandbox::entity::Entity;
use sandbox::input::{Button, Key, Mode, Modifiers, Touch, WheelDelta};
use sandbox::world::{SandboxWorld, WorldBridge};
use serde::{Deserialize, Serialize};

const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("unknown template `{0}`")]
    UnknownTemplate(String),
    #[error("script settings: {0}")]
    Settings(#[from] ConfigError),
    #[error("event {index} at {at_ms} ms is earlier than the previous event")]
    OutOfOrder { index: usize, at_ms: u64 },
}

fn default_viewport() -> Size {
    Size::new(800.0, 600.0)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default = "default_viewport")]
    pub viewport: Size,
    /// Overrides whatever settings the caller supplies.
    #[serde(default)]
    pub settings: Option<Settings>,
    /// Start from the default floor-and-box scene.
    #[serde(default)]
    pub reset: bool,
    pub events: Vec<TimedEvent>,
}

#[derive(Debug, Deserialize)]
pub struct TimedEvent {
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: Event,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Template { name: String },
    Mode { mode: Mode },
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default = "primary")]
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerMove { x: f64, y: f64 },
    PointerUp {
        x: f64,
        y: f64,
        #[serde(default = "primary")]
        button: Button,
    },
    Wheel { x: f64, y: f64, delta: WheelDelta },
    TouchStart { touches: Vec<Touch> },
    TouchMove { touches: Vec<Touch> },
    TouchEnd { touches: Vec<Touch> },
    TouchCancel,
    KeyDown { key: Key },
    KeyUp { key: Key },
    Pause,
    Reset,
    /// Let frames run up to this event's timestamp and do nothing else.
    Wait,
}

fn primary() -> Button {
    Button::Primary
}

/// What the world looked like when the script ran out.
#[derive(Debug, Serialize)]
pub struct Report {
    pub view: View,
    pub mode: Mode,
    pub object_count: usize,
    pub actions: usize,
    pub entities: Vec<Entity>,
}

/// Run `script` against a fresh engine.
///
/// # Errors
///
/// Fails on out-of-range script settings, an unknown template name or a
/// timestamp that goes backwards.
pub fn replay(script: &Script, settings: Settings, config: InputConfig) -> Result<Report, ScriptError> {
    let settings = match &script.settings {
        Some(own) => {
            own.validate()?;
            own.clone()
        }
        None => settings,
    };
    let mut core = EngineCore::with_world(SandboxWorld::new(), script.viewport, settings, config);
    let mut actions = Vec::new();
    if script.reset {
        actions.extend(core.reset_scene());
    }

    let mut now = Duration::ZERO;
    for (index, timed) in script.events.iter().enumerate() {
        let at = Duration::from_millis(timed.at_ms);
        if at < now {
            return Err(ScriptError::OutOfOrder { index, at_ms: timed.at_ms });
        }
        while now + FRAME <= at {
            now += FRAME;
            actions.extend(core.tick(now));
        }
        now = at;
        actions.extend(apply(&mut core, &timed.event, now)?);
        tracing::trace!(index, at_ms = timed.at_ms, "event applied");
    }
    actions.extend(core.tick(now + FRAME));

    tracing::debug!(actions = actions.len(), "replay finished");
    Ok(Report {
        view: core.camera().view(),
        mode: core.mode(),
        object_count: core.object_count(),
        actions: actions.len(),
        entities: core.world.entities().into_iter().cloned().collect(),
    })
}

fn apply(core: &mut EngineCore, event: &Event, now: Duration) -> Result<Vec<Action>, ScriptError> {
    let actions = match event {
        Event::Template { name } => {
            if sandbox::templates::find(name).is_none() {
                return Err(ScriptError::UnknownTemplate(name.clone()));
            }
            core.set_template_by_name(name)
        }
        Event::Mode { mode } => core.set_mode(*mode),
        Event::PointerDown { x, y, button, modifiers } => core.on_pointer_down(Point::new(*x, *y), *button, *modifiers, now),
        Event::PointerMove { x, y } => core.on_pointer_move(Point::new(*x, *y), now),
        Event::PointerUp { x, y, button } => core.on_pointer_up(Point::new(*x, *y), *button, now),
        Event::Wheel { x, y, delta } => core.on_wheel(Point::new(*x, *y), *delta, now),
        Event::TouchStart { touches } => core.on_touch_start(touches, now),
        Event::TouchMove { touches } => core.on_touch_move(touches, now),
        Event::TouchEnd { touches } => core.on_touch_end(touches, now),
        Event::TouchCancel => core.on_touch_cancel(now),
        Event::KeyDown { key } => {
            core.on_key_down(key);
            Vec::new()
        }
        Event::KeyUp { key } => {
            core.on_key_up(key);
            Vec::new()
        }
        Event::Pause => {
            core.toggle_pause();
            Vec::new()
        }
        Event::Reset => core.reset_scene(),
        Event::Wait => Vec::new(),
    };
    Ok(actions)
}
