//! Okurigana segmentation: where a kun reading splits into a fixed stem and
//! an inflectable ending, decided by finding the kanji plus ending inside a
//! usage example.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Separates stem from okurigana in a delimited reading, e.g. `たよ.る`.
pub const DELIMITER: char = '.';

/// Godan dictionary-form ending → the kana it inflects to (a, e, i, o, u rows).
///
/// No example in the table uses a te-form or ta-form, so stems are enough.
static GODAN_INFLECTION: Lazy<HashMap<char, [char; 5]>> = Lazy::new(|| {
    HashMap::from([
        ('う', ['わ', 'え', 'い', 'お', 'う']),
        ('く', ['か', 'け', 'き', 'こ', 'く']),
        ('ぐ', ['が', 'げ', 'ぎ', 'ご', 'ぐ']),
        ('す', ['さ', 'せ', 'し', 'そ', 'す']),
        ('ず', ['ざ', 'ぜ', 'じ', 'ぞ', 'ず']),
        ('つ', ['た', 'て', 'ち', 'と', 'つ']),
        ('づ', ['だ', 'で', 'ぢ', 'ど', 'づ']),
        ('ぬ', ['な', 'ね', 'に', 'の', 'ぬ']),
        ('ふ', ['は', 'へ', 'ひ', 'ほ', 'ふ']),
        ('ぶ', ['ば', 'べ', 'び', 'ぼ', 'ぶ']),
        ('ぷ', ['ぱ', 'ぺ', 'ぴ', 'ぽ', 'ぷ']),
        ('む', ['ま', 'め', 'み', 'も', 'む']),
        ('る', ['ら', 'れ', 'り', 'ろ', 'る']),
    ])
});

/// Kana that can precede the final る of an ichidan verb (e- and i-rows).
const ICHIDAN_BASE_ENDING: &str = "えけげせぜてでねへべぺめれいきぎしじちぢにひびぴみり";

/// Kanji whose readings look like ichidan verbs but are nouns.
const ICHIDAN_EXCEPTIONS: &[&str] = &["昼", "汁"];

/// The one example that only makes sense as classical grammar; it becomes a
/// reading of its own rather than a conflicting split.
pub const CLASSICAL_EXCEPTION: (&str, &str) = ("恐らく", "おそらく");

/// All suffixes of `text`, longest first.
pub fn all_suffixes(text: &str) -> Vec<&str> {
    text.char_indices().map(|(i, _)| &text[i..]).collect()
}

/// Whether `reading` conjugates as an ichidan verb.
pub fn is_ichidan_verb(kanji: &str, reading: &str) -> bool {
    if ICHIDAN_EXCEPTIONS.contains(&kanji) {
        return false;
    }
    let mut rev = reading.chars().rev();
    match (rev.next(), rev.next()) {
        (Some('る'), Some(base)) => ICHIDAN_BASE_ENDING.contains(base),
        _ => false,
    }
}

/// Strip any okurigana delimiter from a reading.
pub fn undelimited(reading: &str) -> String {
    reading.chars().filter(|&c| c != DELIMITER).collect()
}

/// Find where to delimit okurigana in `reading`, based on `example`.
///
/// Returns the reading unchanged when the example shows no okurigana.
/// `reading` must not already contain a delimiter.
pub fn delimit_okurigana(kanji: &str, reading: &str, example: &str) -> String {
    match split_point(kanji, reading, example) {
        Some(at) => format!("{}{}{}", &reading[..at], DELIMITER, &reading[at..]),
        None => reading.to_string(),
    }
}

/// Byte offset in `reading` where the okurigana starts, if any.
pub fn split_point(kanji: &str, reading: &str, example: &str) -> Option<usize> {
    if example == kanji {
        return None;
    }

    let ichidan = is_ichidan_verb(kanji, reading);

    for suffix in all_suffixes(reading) {
        let at = reading.len() - suffix.len();
        let probe = format!("{kanji}{suffix}");

        if example.contains(&probe) {
            return Some(at);
        }

        if ichidan {
            // lose the る
            let mut stem = probe.clone();
            stem.pop();
            if example.contains(&stem) {
                return Some(at);
            }
            continue;
        }

        let mut head = probe.clone();
        let last = head.pop();
        if let Some(forms) = last.and_then(|c| GODAN_INFLECTION.get(&c)) {
            let inflected = forms.iter().any(|form| {
                let mut candidate = head.clone();
                candidate.push(*form);
                example.contains(&candidate)
            });
            if inflected {
                return Some(at);
            }
        }
    }

    None
}

/// True when the example writes hiragana right after the kanji, i.e. it does
/// carry okurigana, yet no conjugation table explained it.
pub fn has_unexplained_okurigana(kanji: &str, reading: &str, example: &str) -> bool {
    let follows_kanji = example
        .find(kanji)
        .and_then(|i| example[i + kanji.len()..].chars().next())
        .is_some_and(crate::script::is_hiragana);
    follows_kanji && split_point(kanji, reading, example).is_none()
}
