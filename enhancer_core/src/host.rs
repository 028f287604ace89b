// Narrow view of the page the controller works against.
// The DOM implementation lives in dom.rs; tests use the in-memory fakes below.

use crate::error::EnhancerError;
use crate::types::MediaSnapshot;

/// A media element owned by the page. Handles are cheap to clone and mutate through `&self`,
/// like the DOM objects they stand for.
pub trait MediaElement {
    fn is_paused(&self) -> bool;
    fn play(&self) -> Result<(), EnhancerError>;
    fn pause(&self) -> Result<(), EnhancerError>;
    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64);
    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&self, rate: f64);

    fn snapshot(&self) -> MediaSnapshot {
        MediaSnapshot {
            paused: self.is_paused(),
            current_time: self.current_time(),
            playback_rate: self.playback_rate(),
        }
    }
}

/// The page hosting the player.
pub trait MediaHost {
    type Media: MediaElement;

    /// All media elements in document order. Queried fresh on every call.
    fn media_elements(&self) -> Vec<Self::Media>;

    fn first_media(&self) -> Option<Self::Media> {
        self.media_elements().into_iter().next()
    }

    /// Click the player's fullscreen control. Returns false if the page has none.
    fn activate_fullscreen_control(&self) -> bool;

    /// Overwrite the rate display. Returns false if the page has none.
    fn set_status_text(&self, text: &str) -> bool;
}
