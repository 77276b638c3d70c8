//! Note name detection and MIDI conversion

/// Letter names for the twelve semitones, sharps only
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Octave assumed when a note carries none
const DEFAULT_OCTAVE: i8 = 4;

/// Solfège syllables and the letter they stand for
const SOLFEGE: [(&str, char); 7] = [
    ("do", 'C'),
    ("re", 'D'),
    ("mi", 'E'),
    ("fa", 'F'),
    ("sol", 'G'),
    ("la", 'A'),
    ("si", 'B'),
];

/// Accidental written after a note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accidental {
    Natural,
    Sharp,
    Flat,
}

/// A note found in a sample name
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DetectedNote {
    /// Canonical letter name, sharps only ("C#", "A")
    pub note: String,
    pub octave: i8,
    pub midi: u8,
}

/// Convert a note name and octave to a MIDI key (`12 * (octave + 1) + semitone`)
///
/// Accepts letter names with `#` or `b` (`"F#"`, `"Eb"`) and solfège
/// syllables (`"Sol"`). A missing octave means octave 4. Returns `None` for
/// unknown names or keys outside 0-127.
pub fn note_to_midi(note: &str, octave: Option<i8>) -> Option<u8> {
    let lower = note.to_ascii_lowercase();
    let (letter, rest) = match SOLFEGE
        .iter()
        .filter(|(syllable, _)| lower.starts_with(syllable))
        .max_by_key(|(syllable, _)| syllable.len())
    {
        Some((syllable, letter)) => (*letter, &lower[syllable.len()..]),
        None => {
            let mut chars = lower.chars();
            let letter = chars.next()?.to_ascii_uppercase();
            (letter, chars.as_str())
        }
    };

    let accidental = match rest {
        "" => Accidental::Natural,
        "#" | "diez" => Accidental::Sharp,
        "b" => Accidental::Flat,
        _ => return None,
    };

    midi_key(letter, accidental, octave.unwrap_or(DEFAULT_OCTAVE))
}

/// Split a MIDI key into a sharp-only note name and octave
pub fn midi_to_note(key: u8) -> (&'static str, i8) {
    (NOTE_NAMES[(key % 12) as usize], (key / 12) as i8 - 1)
}

fn semitone(letter: char) -> Option<i16> {
    Some(match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    })
}

fn midi_key(letter: char, accidental: Accidental, octave: i8) -> Option<u8> {
    let offset = match accidental {
        Accidental::Natural => 0,
        Accidental::Sharp => 1,
        Accidental::Flat => -1,
    };
    let key = 12 * (i16::from(octave) + 1) + semitone(letter)? + offset;
    u8::try_from(key).ok().filter(|&k| k <= 127)
}

/// Find the first note with an octave in a token stream
///
/// Tokens are lowercased words. A note is a letter (`c4`, `f#3`, `eb2`) or a
/// solfège syllable (`do3`, `sol#2`, `ladiez1`) with its octave digit
/// attached, or followed by a token that is a single digit (`do 3`).
pub(crate) fn detect_note(tokens: &[String]) -> Option<DetectedNote> {
    tokens.iter().enumerate().find_map(|(i, token)| {
        let next_digit = tokens.get(i + 1).and_then(|t| single_digit(t));
        parse_note_token(token, next_digit)
    })
}

fn single_digit(token: &str) -> Option<i8> {
    match token.as_bytes() {
        [d] if d.is_ascii_digit() => Some((d - b'0') as i8),
        _ => None,
    }
}

fn parse_note_token(token: &str, next_digit: Option<i8>) -> Option<DetectedNote> {
    let (letter, rest) = split_note_prefix(token)?;

    let (accidental, rest) = if let Some(rest) = rest.strip_prefix("diez") {
        (Accidental::Sharp, rest)
    } else if let Some(rest) = rest.strip_prefix('#') {
        (Accidental::Sharp, rest)
    } else if let Some(rest) = rest.strip_prefix('b')
        && !rest.is_empty()
    {
        (Accidental::Flat, rest)
    } else {
        (Accidental::Natural, rest)
    };

    let octave = match rest {
        "" => next_digit?,
        digits => single_digit(digits)?,
    };

    let midi = midi_key(letter, accidental, octave)?;
    let (note, octave) = midi_to_note(midi);
    Some(DetectedNote {
        note: note.to_string(),
        octave,
        midi,
    })
}

/// Split a token into its note letter and the remainder
fn split_note_prefix(token: &str) -> Option<(char, &str)> {
    if let Some((syllable, letter)) = SOLFEGE
        .iter()
        .filter(|(syllable, _)| token.starts_with(syllable))
        .max_by_key(|(syllable, _)| syllable.len())
    {
        return Some((*letter, &token[syllable.len()..]));
    }

    let first = token.chars().next()?;
    if !('a'..='g').contains(&first) {
        return None;
    }
    Some((first.to_ascii_uppercase(), &token[1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_note_to_midi() {
        assert_eq!(note_to_midi("C", Some(4)), Some(60));
        assert_eq!(note_to_midi("A", Some(4)), Some(69));
        assert_eq!(note_to_midi("F#", Some(3)), Some(54));
        assert_eq!(note_to_midi("Eb", Some(2)), Some(39));
        assert_eq!(note_to_midi("Sol", None), Some(67));
        assert_eq!(note_to_midi("do", Some(-1)), Some(0));
        assert_eq!(note_to_midi("H", Some(4)), None);
        assert_eq!(note_to_midi("G", Some(9)), Some(127));
        assert_eq!(note_to_midi("A", Some(9)), None);
    }

    #[test]
    fn test_midi_to_note() {
        assert_eq!(midi_to_note(60), ("C", 4));
        assert_eq!(midi_to_note(61), ("C#", 4));
        assert_eq!(midi_to_note(0), ("C", -1));
    }

    #[test]
    fn test_detect_letter_notes() {
        let found = detect_note(&tokens(&["piano", "c4"])).unwrap();
        assert_eq!((found.note.as_str(), found.octave, found.midi), ("C", 4, 60));

        let found = detect_note(&tokens(&["f#3"])).unwrap();
        assert_eq!(found.midi, 54);

        let found = detect_note(&tokens(&["eb2"])).unwrap();
        assert_eq!((found.note.as_str(), found.midi), ("D#", 39));
    }

    #[test]
    fn test_detect_solfege() {
        assert_eq!(detect_note(&tokens(&["do3"])).unwrap().midi, 48);
        assert_eq!(detect_note(&tokens(&["sol", "2"])).unwrap().midi, 43);
        assert_eq!(detect_note(&tokens(&["ladiez1"])).unwrap().midi, 34);
    }

    #[test]
    fn test_words_are_not_notes() {
        assert!(detect_note(&tokens(&["bass"])).is_none());
        assert!(detect_note(&tokens(&["dance", "12"])).is_none());
        assert!(detect_note(&tokens(&["c"])).is_none());
        assert!(detect_note(&tokens(&["b12"])).is_none());
    }
}
