//! Answer editors for the three input modes.
//!
//! Editors only collect keystrokes; whatever they hand back from `submit` is
//! already normalized and non-empty, ready for `GameState::submit_answer`.

use crate::normalize::normalize;
use crate::speech::{RECOGNITION_LANGUAGES, SpeechError, SpeechRecognizer};
use crate::debug_log;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthHint {
    pub text: String,
    /// False while the guess is still too short.
    pub ok: bool,
}

/// Compare the typed letter count (spaces ignored) with the expected one.
#[must_use]
pub fn length_hint(expected: usize, value: &str) -> LengthHint {
    let typed = value.chars().filter(|c| !c.is_whitespace()).count();
    match expected.cmp(&typed) {
        std::cmp::Ordering::Equal => LengthHint {
            text: "Perfect length ✅".to_string(),
            ok: true,
        },
        std::cmp::Ordering::Greater => {
            let missing = expected - typed;
            let unit = if missing == 1 { "letter" } else { "letters" };
            LengthHint {
                text: format!("{missing} more {unit}"),
                ok: false,
            }
        }
        std::cmp::Ordering::Less => LengthHint {
            text: format!("{} extra", typed - expected),
            ok: true,
        },
    }
}

fn non_empty_normalized(raw: &str) -> Option<String> {
    let guess = normalize(raw);
    if guess.is_empty() { None } else { Some(guess) }
}

#[derive(Debug, Default, Clone)]
pub struct TextEntry {
    value: String,
}

impl TextEntry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn push(&mut self, c: char) {
        self.value.push(c);
    }

    pub fn pop(&mut self) {
        self.value.pop();
    }

    pub fn set(&mut self, value: &str) {
        self.value = value.to_string();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Normalized guess, or `None` when the box is blank. Clears on success.
    pub fn submit(&mut self) -> Option<String> {
        let guess = non_empty_normalized(&self.value)?;
        self.value.clear();
        Some(guess)
    }
}

/// One box per letter of the answer.
#[derive(Debug, Clone)]
pub struct TileEntry {
    letters: Vec<Option<char>>,
    /// Box indices that start a new word of the answer.
    word_starts: Vec<usize>,
    cursor: usize,
}

impl TileEntry {
    #[must_use]
    pub fn new(word_length: usize) -> Self {
        Self {
            letters: vec![None; word_length],
            word_starts: Vec::new(),
            cursor: 0,
        }
    }

    /// Boxes for every non-space letter of `answer`, split into its words.
    #[must_use]
    pub fn for_answer(answer: &str) -> Self {
        let mut word_starts = Vec::new();
        let mut count = 0;
        for word in answer.split_whitespace() {
            if count > 0 {
                word_starts.push(count);
            }
            count += word.chars().count();
        }
        Self {
            letters: vec![None; count],
            word_starts,
            cursor: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn letters(&self) -> &[Option<char>] {
        &self.letters
    }

    /// True when box `index` begins the second or a later word.
    #[must_use]
    pub fn starts_word(&self, index: usize) -> bool {
        self.word_starts.contains(&index)
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.letters.iter().all(Option::is_some)
    }

    /// Put a letter in the focused box and move right.
    ///
    /// Filling the last box with every box filled returns the guess for
    /// automatic submission. Anything but an ASCII letter is ignored.
    pub fn type_char(&mut self, c: char) -> Option<String> {
        if self.letters.is_empty() || !c.is_ascii_alphabetic() {
            return None;
        }
        self.letters[self.cursor] = Some(c.to_ascii_lowercase());
        if self.cursor + 1 < self.letters.len() {
            self.cursor += 1;
            return None;
        }
        debug_log!("TileEntry::type_char() - last box filled");
        self.submit()
    }

    /// Clear the focused box, or step left when it is already empty.
    pub fn backspace(&mut self) {
        if self.letters.is_empty() {
            return;
        }
        if self.letters[self.cursor].is_some() {
            self.letters[self.cursor] = None;
        } else if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor + 1 < self.letters.len() {
            self.cursor += 1;
        }
    }

    /// Fill boxes from the first one with the letters of `text`.
    pub fn paste(&mut self, text: &str) {
        let pasted: Vec<char> = text
            .chars()
            .filter(char::is_ascii_alphabetic)
            .take(self.letters.len())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        for (slot, c) in self.letters.iter_mut().zip(&pasted) {
            *slot = Some(*c);
        }
        self.cursor = pasted.len().min(self.letters.len().saturating_sub(1));
    }

    pub fn clear(&mut self) {
        self.letters.iter_mut().for_each(|slot| *slot = None);
        self.cursor = 0;
    }

    /// Guess from the boxes; only once every box is filled.
    #[must_use]
    pub fn submit(&self) -> Option<String> {
        if self.letters.is_empty() || !self.is_full() {
            return None;
        }
        let mut guess = String::with_capacity(self.letters.len() + self.word_starts.len());
        for (i, c) in self.letters.iter().flatten().enumerate() {
            if self.starts_word(i) {
                guess.push(' ');
            }
            guess.push(*c);
        }
        non_empty_normalized(&guess)
    }
}

/// Speech transcript that the player can correct before submitting.
pub struct VoiceEntry {
    recognizer: Box<dyn SpeechRecognizer>,
    edited: String,
    seen_transcript: String,
    language_index: usize,
    last_error: Option<SpeechError>,
}

impl VoiceEntry {
    #[must_use]
    pub fn new(mut recognizer: Box<dyn SpeechRecognizer>) -> Self {
        recognizer.set_language(RECOGNITION_LANGUAGES[0].0);
        Self {
            recognizer,
            edited: String::new(),
            seen_transcript: String::new(),
            language_index: 0,
            last_error: None,
        }
    }

    #[must_use]
    pub fn supported(&self) -> bool {
        self.recognizer.supported()
    }

    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.recognizer.is_listening()
    }

    #[must_use]
    pub fn edited(&self) -> &str {
        &self.edited
    }

    #[must_use]
    pub fn language(&self) -> (&'static str, &'static str) {
        RECOGNITION_LANGUAGES[self.language_index]
    }

    /// Switch to the next recognition language; not while listening.
    pub fn cycle_language(&mut self) {
        if self.is_listening() {
            return;
        }
        self.language_index = (self.language_index + 1) % RECOGNITION_LANGUAGES.len();
        self.recognizer.set_language(self.language().0);
    }

    pub fn toggle_listening(&mut self) {
        if self.recognizer.is_listening() {
            self.recognizer.stop();
            return;
        }
        match self.recognizer.start() {
            Ok(()) => self.last_error = None,
            Err(e) => {
                debug_log!("VoiceEntry::toggle_listening() - start failed: {}", e);
                self.last_error = Some(e);
            }
        }
    }

    /// Pull the recognizer's latest transcript into the editable text.
    pub fn refresh(&mut self) {
        if let Some(e) = self.recognizer.error() {
            self.last_error = Some(e);
        }
        let transcript = self.recognizer.transcript();
        if !transcript.is_empty() && transcript != self.seen_transcript {
            self.seen_transcript = transcript.to_string();
            self.edited = transcript.to_string();
        }
    }

    /// Message to show instead of (or above) the editor, if any.
    #[must_use]
    pub fn status_message(&self) -> Option<String> {
        if !self.supported() {
            return Some(
                "Voice input is not supported here. Please use Text or Tiles mode.".to_string(),
            );
        }
        self.last_error.map(|e| format!("Voice error: {e}"))
    }

    pub fn push(&mut self, c: char) {
        if self.supported() {
            self.edited.push(c);
        }
    }

    pub fn pop(&mut self) {
        self.edited.pop();
    }

    pub fn clear(&mut self) {
        self.edited.clear();
    }

    pub fn submit(&mut self) -> Option<String> {
        let guess = non_empty_normalized(&self.edited)?;
        self.edited.clear();
        Some(guess)
    }

    /// Stop listening and drop any text left from the previous turn.
    pub fn reset(&mut self) {
        self.recognizer.stop();
        self.edited.clear();
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::UnsupportedSpeech;

    #[derive(Default)]
    struct FakeSpeech {
        listening: bool,
        transcript: String,
        error: Option<SpeechError>,
        language: String,
    }

    impl SpeechRecognizer for FakeSpeech {
        fn supported(&self) -> bool {
            true
        }
        fn start(&mut self) -> Result<(), SpeechError> {
            self.listening = true;
            // Pretend the player said something right away
            self.transcript = "Élephant".to_string();
            Ok(())
        }
        fn stop(&mut self) {
            self.listening = false;
        }
        fn is_listening(&self) -> bool {
            self.listening
        }
        fn transcript(&self) -> &str {
            &self.transcript
        }
        fn error(&self) -> Option<SpeechError> {
            self.error
        }
        fn set_language(&mut self, tag: &str) {
            self.language = tag.to_string();
        }
    }

    #[test]
    fn test_length_hint() {
        assert_eq!(length_hint(8, "ELEPHANT").text, "Perfect length ✅");
        assert!(length_hint(8, "ELEPHANT").ok);
        let short = length_hint(8, "ELEPHAN");
        assert_eq!(short.text, "1 more letter");
        assert!(!short.ok);
        assert_eq!(length_hint(8, "ELE").text, "5 more letters");
        assert_eq!(length_hint(3, "ICE CREAM").text, "5 extra");
        assert_eq!(length_hint(8, "ICE CREAM").text, "Perfect length ✅");
    }

    #[test]
    fn test_text_entry_submit_normalizes() {
        let mut entry = TextEntry::new();
        entry.set("  Café  ");
        assert_eq!(entry.submit(), Some("cafe".to_string()));
        assert_eq!(entry.value(), "");
    }

    #[test]
    fn test_text_entry_blank_is_not_submitted() {
        let mut entry = TextEntry::new();
        assert_eq!(entry.submit(), None);
        entry.push(' ');
        entry.push('\t');
        assert_eq!(entry.submit(), None);
        assert_eq!(entry.value(), " \t");
    }

    #[test]
    fn test_tiles_auto_submit_on_last_box() {
        let mut tiles = TileEntry::new(3);
        assert_eq!(tiles.type_char('S'), None);
        assert_eq!(tiles.type_char('u'), None);
        assert_eq!(tiles.cursor(), 2);
        assert_eq!(tiles.type_char('N'), Some("sun".to_string()));
    }

    #[test]
    fn test_tiles_ignore_non_letters() {
        let mut tiles = TileEntry::new(2);
        assert_eq!(tiles.type_char('1'), None);
        assert_eq!(tiles.type_char(' '), None);
        assert_eq!(tiles.cursor(), 0);
        assert_eq!(tiles.letters(), &[None, None]);
    }

    #[test]
    fn test_tiles_last_box_with_gap_does_not_submit() {
        let mut tiles = TileEntry::new(3);
        tiles.move_right();
        tiles.move_right();
        assert_eq!(tiles.type_char('n'), None);
        assert!(!tiles.is_full());
        assert_eq!(tiles.submit(), None);
    }

    #[test]
    fn test_tiles_backspace() {
        let mut tiles = TileEntry::new(3);
        tiles.type_char('a');
        tiles.type_char('b');
        // cursor on the empty third box: step back
        tiles.backspace();
        assert_eq!(tiles.cursor(), 1);
        // now clear 'b'
        tiles.backspace();
        assert_eq!(tiles.letters(), &[Some('a'), None, None]);
        tiles.backspace();
        assert_eq!(tiles.cursor(), 0);
        tiles.backspace();
        assert_eq!(tiles.letters(), &[None, None, None]);
    }

    #[test]
    fn test_tiles_paste_fills_and_truncates() {
        let mut tiles = TileEntry::new(4);
        tiles.paste("S-u n!");
        assert_eq!(tiles.letters(), &[Some('s'), Some('u'), Some('n'), None]);
        assert_eq!(tiles.cursor(), 3);
        tiles.paste("ELEPHANT");
        assert_eq!(tiles.submit(), Some("elep".to_string()));
        assert_eq!(tiles.cursor(), 3);
    }

    #[test]
    fn test_tiles_keep_word_breaks_of_answer() {
        let mut tiles = TileEntry::for_answer("ICE  CREAM");
        assert_eq!(tiles.len(), 8);
        assert!(tiles.starts_word(3));
        assert!(!tiles.starts_word(0));
        tiles.paste("ICE CREAM");
        assert_eq!(tiles.submit(), Some("ice cream".to_string()));
        assert!(crate::normalize::answers_match(
            &tiles.submit().unwrap(),
            "ICE CREAM"
        ));
    }

    #[test]
    fn test_tiles_auto_submit_multi_word() {
        let mut tiles = TileEntry::for_answer("Ice Cream");
        let mut submitted = None;
        for c in "icecream".chars() {
            submitted = tiles.type_char(c);
        }
        assert_eq!(submitted, Some("ice cream".to_string()));
    }

    #[test]
    fn test_tiles_single_word_answer() {
        let tiles = TileEntry::for_answer("  sun ");
        assert_eq!(tiles.len(), 3);
        assert!((0..3).all(|i| !tiles.starts_word(i)));
    }

    #[test]
    fn test_tiles_clear() {
        let mut tiles = TileEntry::new(2);
        tiles.paste("ab");
        tiles.clear();
        assert_eq!(tiles.cursor(), 0);
        assert!(tiles.letters().iter().all(Option::is_none));
    }

    #[test]
    fn test_tiles_zero_length() {
        let mut tiles = TileEntry::new(0);
        assert!(tiles.is_empty());
        assert_eq!(tiles.type_char('a'), None);
        tiles.backspace();
        tiles.paste("abc");
        assert_eq!(tiles.submit(), None);
    }

    #[test]
    fn test_voice_unsupported_degrades() {
        let mut voice = VoiceEntry::new(Box::new(UnsupportedSpeech));
        assert!(!voice.supported());
        assert!(voice.status_message().unwrap().contains("Text or Tiles"));
        voice.toggle_listening();
        assert!(!voice.is_listening());
        voice.push('a');
        assert_eq!(voice.submit(), None);
    }

    #[test]
    fn test_voice_transcript_is_editable() {
        let mut voice = VoiceEntry::new(Box::new(FakeSpeech::default()));
        voice.toggle_listening();
        assert!(voice.is_listening());
        voice.refresh();
        assert_eq!(voice.edited(), "Élephant");
        voice.push('s');
        // The same transcript does not overwrite local edits
        voice.refresh();
        assert_eq!(voice.edited(), "Élephants");
        voice.pop();
        assert_eq!(voice.submit(), Some("elephant".to_string()));
        voice.toggle_listening();
        assert!(!voice.is_listening());
    }

    #[test]
    fn test_voice_language_cycles() {
        let mut voice = VoiceEntry::new(Box::new(FakeSpeech::default()));
        assert_eq!(voice.language().0, "en-US");
        voice.cycle_language();
        assert_eq!(voice.language().0, "en-GB");
        for _ in 0..4 {
            voice.cycle_language();
        }
        assert_eq!(voice.language().0, "en-US");
    }

    #[test]
    fn test_voice_reset_clears_text() {
        let mut voice = VoiceEntry::new(Box::new(FakeSpeech::default()));
        voice.push('x');
        voice.reset();
        assert_eq!(voice.edited(), "");
        assert!(voice.status_message().is_none());
    }
}
