// Keyboard-to-media-control mapping.
// Rate changes apply to every video on the page; pause and seek address only the first one.
// A page without the expected elements turns a shortcut into a logged no-op, never a fault.

use tracing::{debug, trace, warn};

use crate::error::EnhancerError;
use crate::host::{MediaElement, MediaHost};
use crate::types::*;

/// Translates key events into media actions on the host page.
/// Stateless between events apart from its configuration.
pub struct KeyboardMediaController<H: MediaHost> {
    config: EnhancerConfig,
    host: H,
}

impl<H: MediaHost> KeyboardMediaController<H> {
    pub fn new(config: EnhancerConfig, host: H) -> Self {
        KeyboardMediaController { config, host }
    }

    pub fn config(&self) -> &EnhancerConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Key-release entry point. Every bound key is acted upon here.
    pub fn handle_key_up(&self, key: &str) -> KeyOutcome {
        let Some(action) = self.config.key_bindings.action_for(key) else {
            trace!(key, "Unbound key released");
            return KeyOutcome::ignored();
        };

        match self.perform(action) {
            Ok(()) => debug!(%action, "Shortcut applied"),
            Err(err) if err.is_missing_element() => debug!(%action, %err, "Shortcut skipped"),
            Err(err) => warn!(%action, %err, "Shortcut failed"),
        }

        KeyOutcome {
            action: Some(action),
            prevent_default: action.prevents_default(),
        }
    }

    /// Key-press entry point. Only cancels the page scroll the pause key would trigger;
    /// the toggle itself happens on release.
    pub fn handle_key_down(&self, key: &str) -> KeyOutcome {
        match self.config.key_bindings.action_for(key) {
            Some(Action::PauseResume) => KeyOutcome {
                action: Some(Action::PauseResume),
                prevent_default: true,
            },
            _ => KeyOutcome::ignored(),
        }
    }

    /// Run a single action against the page.
    pub fn perform(&self, action: Action) -> Result<(), EnhancerError> {
        match action {
            Action::SlowDown => self.add_to_speed(-self.config.speed_step).map(drop),
            Action::SpeedUp => self.add_to_speed(self.config.speed_step).map(drop),
            Action::PauseResume => self.toggle_pause().map(drop),
            Action::Forward => self.seek_forward().map(drop),
            Action::Backward => self.seek_backward().map(drop),
            Action::ToggleFullscreen => self.toggle_fullscreen(),
        }
    }

    /// Add `delta` to the rate of every video, then show the first video's rate.
    ///
    /// A video already at the bound in the direction of travel is left alone. A video below
    /// the bound takes the whole step, so it can land past the bound by less than one step.
    /// Returns the first video's resulting rate.
    pub fn add_to_speed(&self, delta: f64) -> Result<f64, EnhancerError> {
        let media = self.host.media_elements();

        for element in &media {
            let rate = element.playback_rate();
            if delta > 0.0 && rate >= self.config.max_playback_rate {
                continue;
            }
            if delta < 0.0 && rate <= self.config.min_playback_rate {
                continue;
            }
            element.set_playback_rate(rate + delta);
        }

        let first = media.first().ok_or(EnhancerError::NoMediaElement)?;
        let rate = first.playback_rate();
        self.show_rate(rate);
        Ok(rate)
    }

    /// Set every video to `target`, clamped to the configured rate range.
    pub fn set_speed(&self, target: f64) -> Result<f64, EnhancerError> {
        if !target.is_finite() {
            return Err(EnhancerError::InvalidRate(target));
        }
        let media = self.host.media_elements();
        if media.is_empty() {
            return Err(EnhancerError::NoMediaElement);
        }

        let rate = target.clamp(
            self.config.min_playback_rate,
            self.config.max_playback_rate,
        );
        for element in &media {
            element.set_playback_rate(rate);
        }
        self.show_rate(rate);
        Ok(rate)
    }

    /// Resume the first video if paused, pause it otherwise. Returns the new paused state.
    pub fn toggle_pause(&self) -> Result<bool, EnhancerError> {
        let video = self.first_media()?;
        if video.is_paused() {
            video.play()?;
            Ok(false)
        } else {
            video.pause()?;
            Ok(true)
        }
    }

    /// Skip the first video ahead. The player clamps at the media duration.
    pub fn seek_forward(&self) -> Result<f64, EnhancerError> {
        let video = self.first_media()?;
        let time = video.current_time() + self.config.time_step;
        video.set_current_time(time);
        Ok(time)
    }

    /// Rewind the first video, stopping at zero.
    pub fn seek_backward(&self) -> Result<f64, EnhancerError> {
        let video = self.first_media()?;
        let current = video.current_time();
        let time = current - self.config.time_step.min(current);
        video.set_current_time(time);
        Ok(time)
    }

    pub fn toggle_fullscreen(&self) -> Result<(), EnhancerError> {
        if self.host.activate_fullscreen_control() {
            Ok(())
        } else {
            Err(EnhancerError::FullscreenControlMissing)
        }
    }

    pub fn snapshot(&self) -> Result<MediaSnapshot, EnhancerError> {
        Ok(self.first_media()?.snapshot())
    }

    fn first_media(&self) -> Result<H::Media, EnhancerError> {
        self.host.first_media().ok_or(EnhancerError::NoMediaElement)
    }

    fn show_rate(&self, rate: f64) {
        if !self.host.set_status_text(&format_rate(rate)) {
            debug!(rate, "Rate display not found");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::{FakeHost, FakeVideo};
    use proptest::prelude::*;

    fn controller(videos: Vec<FakeVideo>) -> KeyboardMediaController<FakeHost> {
        KeyboardMediaController::new(EnhancerConfig::default(), FakeHost::with_videos(videos))
    }

    #[test]
    fn slow_down_at_min_rate_is_skipped() {
        let video = FakeVideo::with_rate(0.25);
        let ctl = controller(vec![video.clone()]);

        let outcome = ctl.handle_key_up("ArrowDown");

        assert_eq!(outcome.action, Some(Action::SlowDown));
        assert!(outcome.prevent_default);
        assert_eq!(video.playback_rate(), 0.25);
        assert_eq!(ctl.host().status().as_deref(), Some("0.25x"));
    }

    #[test]
    fn speed_up_at_max_rate_is_skipped() {
        let video = FakeVideo::with_rate(16.0);
        let ctl = controller(vec![video.clone()]);

        ctl.handle_key_up("ArrowUp");

        assert_eq!(video.playback_rate(), 16.0);
    }

    #[test]
    fn speed_up_below_max_may_overshoot_by_one_step() {
        let video = FakeVideo::with_rate(15.9);
        let ctl = controller(vec![video.clone()]);

        ctl.handle_key_up("Up");

        assert!((video.playback_rate() - 16.15).abs() < 1e-9);
        ctl.handle_key_up("Up");
        assert!((video.playback_rate() - 16.15).abs() < 1e-9);
    }

    #[test]
    fn speed_up_applies_to_every_video_and_shows_first() {
        let first = FakeVideo::with_rate(1.0);
        let second = FakeVideo::with_rate(1.0);
        let ctl = controller(vec![first.clone(), second.clone()]);

        ctl.handle_key_up("ArrowUp");

        assert_eq!(first.playback_rate(), 1.25);
        assert_eq!(second.playback_rate(), 1.25);
        assert_eq!(ctl.host().status().as_deref(), Some("1.25x"));
    }

    #[test]
    fn rate_bounds_are_checked_per_video() {
        let capped = FakeVideo::with_rate(16.0);
        let normal = FakeVideo::with_rate(2.0);
        let ctl = controller(vec![capped.clone(), normal.clone()]);

        let rate = ctl.add_to_speed(0.25).unwrap();

        assert_eq!(rate, 16.0);
        assert_eq!(normal.playback_rate(), 2.25);
        assert_eq!(ctl.host().status().as_deref(), Some("16x"));
    }

    #[test]
    fn backward_stops_at_zero() {
        let video = FakeVideo::at_time(3.0);
        let ctl = controller(vec![video.clone()]);

        let outcome = ctl.handle_key_up("ArrowLeft");

        assert!(outcome.prevent_default);
        assert_eq!(video.current_time(), 0.0);
    }

    #[test]
    fn seeking_addresses_only_the_first_video() {
        let first = FakeVideo::at_time(10.0);
        let second = FakeVideo::at_time(10.0);
        let ctl = controller(vec![first.clone(), second.clone()]);

        ctl.handle_key_up("Right");

        assert_eq!(first.current_time(), 15.0);
        assert_eq!(second.current_time(), 10.0);
    }

    #[test]
    fn pause_key_toggles_first_video() {
        let first = FakeVideo::new(true, 0.0, 1.0);
        let second = FakeVideo::new(true, 0.0, 1.0);
        let ctl = controller(vec![first.clone(), second.clone()]);

        ctl.handle_key_up(" ");
        assert!(!first.is_paused());
        assert!(second.is_paused());

        ctl.handle_key_up("Space");
        assert!(first.is_paused());
    }

    #[test]
    fn key_down_only_suppresses_pause_key() {
        let video = FakeVideo::new(true, 0.0, 1.0);
        let ctl = controller(vec![video.clone()]);

        let pause = ctl.handle_key_down(" ");
        assert!(pause.prevent_default);
        assert!(video.is_paused(), "press must not toggle");

        assert!(!ctl.handle_key_down("ArrowUp").prevent_default);
        assert!(!ctl.handle_key_down("f").prevent_default);
        assert_eq!(video.playback_rate(), 1.0);
    }

    #[test]
    fn fullscreen_key_clicks_control_without_suppressing() {
        let ctl = controller(vec![FakeVideo::with_rate(1.0)]);

        let outcome = ctl.handle_key_up("f");

        assert_eq!(outcome.action, Some(Action::ToggleFullscreen));
        assert!(!outcome.prevent_default);
        assert_eq!(ctl.host().fullscreen_clicks.get(), 1);
    }

    #[test]
    fn missing_fullscreen_control_is_a_no_op() {
        let mut host = FakeHost::with_videos(vec![]);
        host.has_fullscreen_control = false;
        let ctl = KeyboardMediaController::new(EnhancerConfig::default(), host);

        ctl.handle_key_up("f");

        assert_eq!(ctl.host().fullscreen_clicks.get(), 0);
        assert_eq!(
            ctl.toggle_fullscreen(),
            Err(EnhancerError::FullscreenControlMissing)
        );
    }

    #[test]
    fn unbound_key_is_ignored() {
        let video = FakeVideo::new(true, 7.0, 1.0);
        let ctl = controller(vec![video.clone()]);

        let outcome = ctl.handle_key_up("Enter");

        assert_eq!(outcome, KeyOutcome::ignored());
        assert_eq!(video.snapshot(), FakeVideo::new(true, 7.0, 1.0).snapshot());
        assert_eq!(ctl.host().status(), None);
    }

    #[test]
    fn no_video_means_no_fault_and_no_display_update() {
        let ctl = controller(vec![]);

        for key in ["ArrowUp", "ArrowDown", " ", "ArrowLeft", "ArrowRight", "f"] {
            let outcome = ctl.handle_key_up(key);
            assert!(outcome.action.is_some());
        }

        assert_eq!(ctl.host().status(), None);
        assert_eq!(ctl.add_to_speed(0.25), Err(EnhancerError::NoMediaElement));
        assert_eq!(ctl.toggle_pause(), Err(EnhancerError::NoMediaElement));
        assert_eq!(ctl.snapshot(), Err(EnhancerError::NoMediaElement));
    }

    #[test]
    fn missing_status_display_still_changes_rate() {
        let video = FakeVideo::with_rate(1.0);
        let mut host = FakeHost::with_videos(vec![video.clone()]);
        host.has_status_display = false;
        let ctl = KeyboardMediaController::new(EnhancerConfig::default(), host);

        ctl.handle_key_up("ArrowUp");

        assert_eq!(video.playback_rate(), 1.25);
        assert_eq!(ctl.host().status(), None);
    }

    #[test]
    fn custom_bindings_replace_defaults() {
        let mut config = EnhancerConfig::default();
        config.key_bindings.speed_up = "+".to_string();
        config.key_bindings.slow_down = "-".to_string();
        let video = FakeVideo::with_rate(1.0);
        let ctl = KeyboardMediaController::new(config, FakeHost::with_videos(vec![video.clone()]));

        ctl.handle_key_up("ArrowUp");
        assert_eq!(video.playback_rate(), 1.0);

        ctl.handle_key_up("+");
        assert_eq!(video.playback_rate(), 1.25);
    }

    #[test]
    fn set_speed_clamps_and_applies_to_all() {
        let first = FakeVideo::with_rate(16.0);
        let second = FakeVideo::with_rate(1.0);
        let ctl = controller(vec![first.clone(), second.clone()]);

        assert_eq!(ctl.set_speed(2.0), Ok(2.0));
        assert_eq!(second.playback_rate(), 2.0);
        assert_eq!(ctl.set_speed(40.0), Ok(16.0));
        assert_eq!(ctl.set_speed(0.0), Ok(0.25));
        assert_eq!(first.playback_rate(), 0.25);
        assert_eq!(ctl.host().status().as_deref(), Some("0.25x"));
        assert!(matches!(
            ctl.set_speed(f64::NAN),
            Err(EnhancerError::InvalidRate(_))
        ));
    }

    #[test]
    fn snapshot_reports_first_video() {
        let ctl = controller(vec![FakeVideo::new(false, 12.5, 1.5)]);

        let snapshot = ctl.snapshot().unwrap();

        assert!(!snapshot.paused);
        assert_eq!(snapshot.current_time, 12.5);
        assert_eq!(snapshot.playback_rate, 1.5);
    }

    // =========================================================================
    // Property-Based Tests
    // =========================================================================

    proptest! {
        /// Rates starting inside the configured range never leave it by a full step.
        #[test]
        fn rate_overshoot_is_less_than_one_step(
            start in 0.25f64..=16.0,
            presses in prop::collection::vec(any::<bool>(), 0..200)
        ) {
            let video = FakeVideo::with_rate(start);
            let ctl = controller(vec![video.clone()]);
            let config = ctl.config().clone();

            for up in presses {
                ctl.handle_key_up(if up { "ArrowUp" } else { "ArrowDown" });
                let rate = video.playback_rate();
                prop_assert!(rate <= config.max_playback_rate + config.speed_step);
                prop_assert!(rate >= config.min_playback_rate - config.speed_step);
            }
        }

        #[test]
        fn backward_never_goes_negative(
            current in 0.0f64..10_000.0,
            time_step in 0.001f64..600.0
        ) {
            let config = EnhancerConfig { time_step, ..EnhancerConfig::default() };
            let video = FakeVideo::at_time(current);
            let ctl = KeyboardMediaController::new(config, FakeHost::with_videos(vec![video.clone()]));

            let time = ctl.seek_backward().unwrap();

            prop_assert!(time >= 0.0);
            prop_assert_eq!(time, video.current_time());
        }

        #[test]
        fn forward_then_backward_round_trips(
            time_step in 0.5f64..60.0,
            offset in 0.0f64..3_600.0
        ) {
            let start = time_step + offset;
            let config = EnhancerConfig { time_step, ..EnhancerConfig::default() };
            let video = FakeVideo::at_time(start);
            let ctl = KeyboardMediaController::new(config, FakeHost::with_videos(vec![video.clone()]));

            ctl.handle_key_up("ArrowRight");
            ctl.handle_key_up("ArrowLeft");

            prop_assert!((video.current_time() - start).abs() < 1e-9);
        }

        #[test]
        fn double_toggle_restores_paused_state(paused in any::<bool>()) {
            let video = FakeVideo::new(paused, 0.0, 1.0);
            let ctl = controller(vec![video.clone()]);

            ctl.handle_key_up(" ");
            prop_assert_eq!(video.is_paused(), !paused);
            ctl.handle_key_up(" ");
            prop_assert_eq!(video.is_paused(), paused);
        }
    }
}
