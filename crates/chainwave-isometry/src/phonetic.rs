//! Phonetic coding for voice and audio event names.
//!
//! Instrument voice names ("Kick", "Snare") and the event names attached to
//! instrument audios are matched by consonant cluster rather than spelling,
//! so "Hat"/"Hihat" or "Snare"/"Snr" line up. The code keeps the first
//! letter, folds common digraphs, drops interior vowels, and collapses
//! adjacent repeats.

/// Digraphs folded to a single consonant before vowel removal.
const DIGRAPHS: &[(&str, &str)] = &[("CK", "K"), ("PH", "F"), ("GH", "G"), ("WH", "W")];

/// Reduces a name to its consonant-cluster phonetic code.
///
/// # Example
/// ```
/// use chainwave_isometry::phonetic;
///
/// assert_eq!(phonetic("Kick"), "KK");
/// assert_eq!(phonetic("Snare"), "SNR");
/// assert_eq!(phonetic("Hihat"), "HHT");
/// ```
pub fn phonetic(raw: &str) -> String {
    let mut s: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    for (digraph, folded) in DIGRAPHS {
        s = s.replace(digraph, folded);
    }

    // Letter substitutions toward a canonical consonant alphabet.
    let s: String = s
        .chars()
        .map(|c| match c {
            'C' | 'Q' => 'K',
            'Z' => 'S',
            other => other,
        })
        .collect();

    // Collapse adjacent repeats, then drop vowels after the first letter.
    // Vowels separating consonants are what keep repeated consonants
    // distinct: "KIK" keeps both K's, "BASS" collapses to one S.
    let mut collapsed = String::with_capacity(s.len());
    for c in s.chars() {
        if collapsed.chars().last() != Some(c) {
            collapsed.push(c);
        }
    }

    let mut code = String::with_capacity(collapsed.len());
    for (i, c) in collapsed.chars().enumerate() {
        if i == 0 || !is_vowel(c) {
            code.push(c);
        }
    }
    code
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'A' | 'E' | 'I' | 'O' | 'U' | 'Y')
}

#[cfg(test)]
mod tests {
    use super::phonetic;

    #[test]
    fn codes_common_drum_voices() {
        assert_eq!(phonetic("Kick"), "KK");
        assert_eq!(phonetic("Snare"), "SNR");
        assert_eq!(phonetic("Tom"), "TM");
        assert_eq!(phonetic("Hihat"), "HHT");
    }

    #[test]
    fn spelling_variants_share_a_code() {
        assert_eq!(phonetic("Snare"), phonetic("snar"));
        assert_eq!(phonetic("Kick"), phonetic("KIK"));
        assert_eq!(phonetic("Clap"), phonetic("Klap"));
    }

    #[test]
    fn collapses_doubled_consonants() {
        assert_eq!(phonetic("Bass"), "BS");
    }

    #[test]
    fn keeps_a_leading_vowel() {
        assert_eq!(phonetic("Airhorn"), "ARHRN");
    }
}
