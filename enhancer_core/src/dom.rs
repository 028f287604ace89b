// web-sys implementation of the page collaborators.
// Nothing is cached: every call re-queries the document, since the player can be
// swapped out by the courseware page at any time.

use js_sys::Promise;
use tracing::{trace, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlElement, HtmlMediaElement};

use crate::error::EnhancerError;
use crate::host::{MediaElement, MediaHost};

const MEDIA_TAG: &str = "video";

/// A `<video>` element of the page.
#[derive(Debug, Clone)]
pub struct DomMedia(HtmlMediaElement);

impl MediaElement for DomMedia {
    fn is_paused(&self) -> bool {
        self.0.paused()
    }

    /// Starts playback. The returned promise rejects when the browser blocks autoplay;
    /// that outcome is only logged.
    fn play(&self) -> Result<(), EnhancerError> {
        let promise: Promise = self.0.play()?;
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = JsFuture::from(promise).await {
                warn!(error = ?err, "Video refused to play");
            }
        });
        Ok(())
    }

    fn pause(&self) -> Result<(), EnhancerError> {
        self.0.pause()?;
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.0.current_time()
    }

    fn set_current_time(&self, seconds: f64) {
        self.0.set_current_time(seconds);
    }

    fn playback_rate(&self) -> f64 {
        self.0.playback_rate()
    }

    fn set_playback_rate(&self, rate: f64) {
        self.0.set_playback_rate(rate);
    }
}

/// The courseware page, seen through its document.
#[derive(Debug, Clone)]
pub struct DomHost {
    document: Document,
    fullscreen_selector: String,
    status_selector: String,
}

impl DomHost {
    pub fn new(document: Document, fullscreen_selector: &str, status_selector: &str) -> Self {
        DomHost {
            document,
            fullscreen_selector: fullscreen_selector.to_string(),
            status_selector: status_selector.to_string(),
        }
    }

    /// Host for the document of the current window.
    pub fn from_window(
        fullscreen_selector: &str,
        status_selector: &str,
    ) -> Result<Self, EnhancerError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| EnhancerError::Dom("no document available".to_string()))?;
        Ok(DomHost::new(document, fullscreen_selector, status_selector))
    }

    fn query<T: JsCast>(&self, selector: &str) -> Option<T> {
        match self.document.query_selector(selector) {
            Ok(found) => found.and_then(|element| element.dyn_into::<T>().ok()),
            Err(err) => {
                warn!(selector, error = ?err, "Invalid selector");
                None
            }
        }
    }
}

impl MediaHost for DomHost {
    type Media = DomMedia;

    fn media_elements(&self) -> Vec<DomMedia> {
        let collection = self.document.get_elements_by_tag_name(MEDIA_TAG);
        let media: Vec<DomMedia> = (0..collection.length())
            .filter_map(|i| collection.item(i))
            .filter_map(|element| element.dyn_into::<HtmlMediaElement>().ok())
            .map(DomMedia)
            .collect();
        trace!(count = media.len(), "Media elements found");
        media
    }

    fn activate_fullscreen_control(&self) -> bool {
        match self.query::<HtmlElement>(&self.fullscreen_selector) {
            Some(control) => {
                control.click();
                true
            }
            None => false,
        }
    }

    fn set_status_text(&self, text: &str) -> bool {
        match self.query::<web_sys::Element>(&self.status_selector) {
            Some(display) => {
                display.set_text_content(Some(text));
                true
            }
            None => false,
        }
    }
}
