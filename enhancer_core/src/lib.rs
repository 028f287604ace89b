// enhancer_core: Courseware Enhancer Rust/WASM engine.
// Keyboard shortcuts for the courseware video player. All behaviour lives here; the
// content script only loads the module and attaches an `Enhancer`.

mod controller;
mod dom;
mod error;
mod host;
mod keys;
mod listener;
mod logging;
mod types;

use std::rc::Rc;

use tracing::info;
use wasm_bindgen::prelude::*;

pub use controller::KeyboardMediaController;
pub use dom::{DomHost, DomMedia};
pub use error::EnhancerError;
pub use host::{MediaElement, MediaHost};
pub use listener::{KeyListeners, SET_SPEED_EVENT};
pub use types::*;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Main interface exposed to JavaScript.
///
/// One instance per page: build it from a JSON configuration, then `attach()` it to start
/// handling shortcuts.
#[wasm_bindgen]
pub struct Enhancer {
    config: EnhancerConfig,
    controller: Option<Rc<KeyboardMediaController<DomHost>>>,
    listeners: Option<KeyListeners>,
}

#[wasm_bindgen]
impl Enhancer {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<Enhancer, JsValue> {
        let config = EnhancerConfig::from_json(config_json)?;
        Ok(Enhancer::from_config(config))
    }

    /// Enhancer with the stock bindings: arrows, space and "f".
    pub fn with_defaults() -> Enhancer {
        Enhancer::from_config(EnhancerConfig::default())
    }

    /// Start logging and listen for shortcuts on the window.
    pub fn attach(&mut self) -> Result<(), JsValue> {
        if self.listeners.is_some() {
            return Err(EnhancerError::AlreadyAttached.into());
        }
        logging::init(self.config.log_level);

        let window = web_sys::window()
            .ok_or_else(|| EnhancerError::Dom("no window available".to_string()))?;
        let controller = self.controller()?;
        self.listeners = Some(KeyListeners::register(window.into(), controller)?);

        info!(
            bindings = ?self.config.key_bindings,
            speed_step = self.config.speed_step,
            time_step = self.config.time_step,
            "Courseware Enhancer attached"
        );
        Ok(())
    }

    /// Remove the listeners. Returns false if none were attached.
    pub fn detach(&mut self) -> bool {
        let attached = self.listeners.take().is_some();
        if attached {
            info!("Courseware Enhancer detached");
        }
        attached
    }

    pub fn is_attached(&self) -> bool {
        self.listeners.is_some()
    }

    /// Set every video to `rate`, clamped to the configured range.
    /// Returns the rate actually applied.
    pub fn set_speed(&mut self, rate: f64) -> Result<f64, JsValue> {
        Ok(self.controller()?.set_speed(rate)?)
    }

    /// State of the first video as JSON: `{ paused, current_time, playback_rate }`.
    pub fn snapshot(&mut self) -> Result<String, JsValue> {
        let snapshot = self.controller()?.snapshot()?;
        Ok(serde_json::to_string(&snapshot).map_err(EnhancerError::from)?)
    }

    /// Effective configuration, defaults filled in.
    pub fn config_json(&self) -> Result<String, JsValue> {
        Ok(serde_json::to_string(&self.config).map_err(EnhancerError::from)?)
    }
}

impl Enhancer {
    pub fn from_config(config: EnhancerConfig) -> Self {
        Enhancer {
            config,
            controller: None,
            listeners: None,
        }
    }

    fn controller(&mut self) -> Result<Rc<KeyboardMediaController<DomHost>>, EnhancerError> {
        if let Some(controller) = &self.controller {
            return Ok(Rc::clone(controller));
        }
        let host = DomHost::from_window(
            &self.config.fullscreen_selector,
            &self.config.status_selector,
        )?;
        let controller = Rc::new(KeyboardMediaController::new(self.config.clone(), host));
        self.controller = Some(Rc::clone(&controller));
        Ok(controller)
    }
}
