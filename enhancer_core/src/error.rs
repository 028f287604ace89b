// Typed errors with thiserror. Surface meaningful messages to JS.
// Missing page elements are recoverable: the key handlers log them and move on.

use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::types::Action;

/// Enhancer error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnhancerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Key {key:?} is bound to both {first} and {second}")]
    DuplicateBinding {
        first: Action,
        second: Action,
        key: String,
    },

    #[error("No video element on the page")]
    NoMediaElement,

    #[error("Invalid playback rate: {0}")]
    InvalidRate(f64),

    #[error("Fullscreen control not found")]
    FullscreenControlMissing,

    #[error("DOM call failed: {0}")]
    Dom(String),

    #[error("Keyboard listeners are already attached")]
    AlreadyAttached,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl EnhancerError {
    /// True for conditions caused by the page layout rather than by a fault.
    pub fn is_missing_element(&self) -> bool {
        matches!(
            self,
            EnhancerError::NoMediaElement | EnhancerError::FullscreenControlMissing
        )
    }
}

impl From<serde_json::Error> for EnhancerError {
    fn from(err: serde_json::Error) -> Self {
        EnhancerError::Serialization(err.to_string())
    }
}

impl From<JsValue> for EnhancerError {
    fn from(value: JsValue) -> Self {
        EnhancerError::Dom(format!("{:?}", value))
    }
}

impl From<EnhancerError> for JsValue {
    fn from(err: EnhancerError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = EnhancerError::InvalidConfig("speed_step must be positive".to_string());
        assert!(err.to_string().contains("speed_step must be positive"));
    }

    #[test]
    fn duplicate_binding_names_both_actions() {
        let err = EnhancerError::DuplicateBinding {
            first: Action::SpeedUp,
            second: Action::Forward,
            key: "ArrowUp".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("speed_up"));
        assert!(message.contains("forward"));
        assert!(message.contains("ArrowUp"));
    }

    #[test]
    fn missing_elements_are_recoverable() {
        assert!(EnhancerError::NoMediaElement.is_missing_element());
        assert!(EnhancerError::FullscreenControlMissing.is_missing_element());
        assert!(!EnhancerError::Dom("boom".into()).is_missing_element());
    }

    #[test]
    fn json_errors_become_serialization_errors() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err = EnhancerError::from(json_err);
        assert!(matches!(err, EnhancerError::Serialization(_)));
        assert!(err.to_string().starts_with("Serialization error:"));
    }
}
