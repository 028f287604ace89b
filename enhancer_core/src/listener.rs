// Listener registration on the window.
// Owns the JS closures: dropping the handle removes every listener.

use std::rc::Rc;

use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{CustomEvent, EventTarget, KeyboardEvent};

use crate::controller::KeyboardMediaController;
use crate::error::EnhancerError;
use crate::host::MediaHost;
use crate::types::KeyOutcome;

const KEY_UP: &str = "keyup";
const KEY_DOWN: &str = "keydown";

/// Dispatched on the window by the page-world `s(rate)` helper; `detail` is the rate.
/// Content scripts run in an isolated world, so a DOM event is the only way in.
pub const SET_SPEED_EVENT: &str = "courseware-enhancer:set-speed";

type KeyHandler = Closure<dyn FnMut(KeyboardEvent)>;
type SpeedHandler = Closure<dyn FnMut(CustomEvent)>;

/// Live `keyup`/`keydown`/set-speed listeners bound to one controller.
pub struct KeyListeners {
    target: EventTarget,
    key_up: KeyHandler,
    key_down: KeyHandler,
    set_speed: SpeedHandler,
}

impl KeyListeners {
    /// Register the listeners on `target`. Registering twice on the same target makes
    /// every shortcut fire twice; callers attach once per page.
    pub fn register<H: MediaHost + 'static>(
        target: EventTarget,
        controller: Rc<KeyboardMediaController<H>>,
    ) -> Result<Self, EnhancerError> {
        let on_release = Rc::clone(&controller);
        let key_up = KeyHandler::new(move |event: KeyboardEvent| {
            let outcome = on_release.handle_key_up(&event.key());
            apply_outcome(&event, outcome);
        });

        let on_press = Rc::clone(&controller);
        let key_down = KeyHandler::new(move |event: KeyboardEvent| {
            let outcome = on_press.handle_key_down(&event.key());
            apply_outcome(&event, outcome);
        });

        let on_request = controller;
        let set_speed = SpeedHandler::new(move |event: CustomEvent| {
            let Some(rate) = event.detail().as_f64() else {
                warn!("Set-speed request without a numeric rate");
                return;
            };
            match on_request.set_speed(rate) {
                Ok(applied) => debug!(requested = rate, applied, "Speed set"),
                Err(err) => warn!(%err, "Speed request ignored"),
            }
        });

        let listeners = KeyListeners {
            target,
            key_up,
            key_down,
            set_speed,
        };
        // Anything registered before a failure is removed again when `listeners` drops.
        listeners.add(KEY_UP, listeners.key_up.as_ref())?;
        listeners.add(KEY_DOWN, listeners.key_down.as_ref())?;
        listeners.add(SET_SPEED_EVENT, listeners.set_speed.as_ref())?;
        debug!("Keyboard listeners registered");

        Ok(listeners)
    }

    fn add(&self, event: &str, callback: &wasm_bindgen::JsValue) -> Result<(), EnhancerError> {
        self.target
            .add_event_listener_with_callback(event, callback.unchecked_ref())?;
        Ok(())
    }

    fn remove(&self, event: &str, callback: &wasm_bindgen::JsValue) {
        let _ = self
            .target
            .remove_event_listener_with_callback(event, callback.unchecked_ref());
    }
}

impl Drop for KeyListeners {
    fn drop(&mut self) {
        self.remove(KEY_UP, self.key_up.as_ref());
        self.remove(KEY_DOWN, self.key_down.as_ref());
        self.remove(SET_SPEED_EVENT, self.set_speed.as_ref());
        debug!("Keyboard listeners removed");
    }
}

fn apply_outcome(event: &KeyboardEvent, outcome: KeyOutcome) {
    if outcome.prevent_default {
        event.prevent_default();
    }
}
