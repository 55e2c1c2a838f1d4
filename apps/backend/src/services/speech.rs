//! Server-side speech output.

use practice_core::SpeechSynthesizer;

/// Records spoken words in the log. Audio playback happens on the client,
/// which learns about each word from the session events.
#[derive(Debug, Default)]
pub struct LogSynthesizer;

impl SpeechSynthesizer for LogSynthesizer {
    fn speak(&self, text: &str) {
        tracing::debug!("Presenting word: {}", text);
    }
}
