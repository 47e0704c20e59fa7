//! Optional speech-to-text capability behind the voice answer mode.
//!
//! Nothing in the game depends on a recognizer being present. Environments
//! without one use [`UnsupportedSpeech`], which makes the voice mode report
//! itself unusable while text and tiles keep working.

use thiserror::Error;

/// Languages offered for recognition, as (tag, label).
pub const RECOGNITION_LANGUAGES: [(&str, &str); 5] = [
    ("en-US", "English (US)"),
    ("en-GB", "English (UK)"),
    ("en-NG", "English (NG)"),
    ("fr-FR", "Français"),
    ("es-ES", "Español"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpeechError {
    #[error("no speech was detected")]
    NoSpeech,
    #[error("recognition was aborted")]
    Aborted,
    #[error("no microphone could capture audio")]
    AudioCapture,
    #[error("network error during recognition")]
    Network,
    #[error("microphone permission denied")]
    NotAllowed,
    #[error("speech service not allowed")]
    ServiceNotAllowed,
    #[error("recognition grammar rejected")]
    BadGrammar,
    #[error("language not supported by the recognizer")]
    LanguageNotSupported,
    #[error("speech recognition is not supported here")]
    Unsupported,
}

impl SpeechError {
    /// Map a platform error code (`no-speech`, `not-allowed`, ...) to a variant.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let error = match code {
            "no-speech" => Self::NoSpeech,
            "aborted" => Self::Aborted,
            "audio-capture" => Self::AudioCapture,
            "network" => Self::Network,
            "not-allowed" => Self::NotAllowed,
            "service-not-allowed" => Self::ServiceNotAllowed,
            "bad-grammar" => Self::BadGrammar,
            "language-not-supported" => Self::LanguageNotSupported,
            _ => return None,
        };
        Some(error)
    }
}

pub trait SpeechRecognizer {
    fn supported(&self) -> bool;
    fn start(&mut self) -> Result<(), SpeechError>;
    fn stop(&mut self);
    fn is_listening(&self) -> bool;
    /// Latest final transcript, empty until something was recognized.
    fn transcript(&self) -> &str;
    fn error(&self) -> Option<SpeechError>;
    fn set_language(&mut self, tag: &str);
}

/// Recognizer for platforms with no speech capability.
#[derive(Debug, Default)]
pub struct UnsupportedSpeech;

impl SpeechRecognizer for UnsupportedSpeech {
    fn supported(&self) -> bool {
        false
    }

    fn start(&mut self) -> Result<(), SpeechError> {
        Err(SpeechError::Unsupported)
    }

    fn stop(&mut self) {}

    fn is_listening(&self) -> bool {
        false
    }

    fn transcript(&self) -> &str {
        ""
    }

    fn error(&self) -> Option<SpeechError> {
        Some(SpeechError::Unsupported)
    }

    fn set_language(&mut self, _tag: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_known_vocabulary() {
        assert_eq!(SpeechError::from_code("no-speech"), Some(SpeechError::NoSpeech));
        assert_eq!(SpeechError::from_code("not-allowed"), Some(SpeechError::NotAllowed));
        assert_eq!(SpeechError::from_code("network"), Some(SpeechError::Network));
        assert_eq!(
            SpeechError::from_code("audio-capture"),
            Some(SpeechError::AudioCapture)
        );
        assert_eq!(SpeechError::from_code("something-else"), None);
    }

    #[test]
    fn test_unsupported_never_listens() {
        let mut speech = UnsupportedSpeech;
        assert!(!speech.supported());
        assert_eq!(speech.start(), Err(SpeechError::Unsupported));
        assert!(!speech.is_listening());
        speech.stop();
        assert_eq!(speech.transcript(), "");
    }

    #[test]
    fn test_error_messages_are_readable() {
        assert_eq!(
            SpeechError::NotAllowed.to_string(),
            "microphone permission denied"
        );
    }
}
