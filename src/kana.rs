//! Kana conversions: katakana → hiragana and Hepburn romanization.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::script::is_katakana;

/// Distance between a katakana code point and its hiragana counterpart.
const KATAKANA_OFFSET: u32 = 0x60;

static MORAE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let table: &[(&str, &str)] = &[
        ("あ", "a"), ("い", "i"), ("う", "u"), ("え", "e"), ("お", "o"),
        ("ぁ", "a"), ("ぃ", "i"), ("ぅ", "u"), ("ぇ", "e"), ("ぉ", "o"),
        ("か", "ka"), ("き", "ki"), ("く", "ku"), ("け", "ke"), ("こ", "ko"),
        ("が", "ga"), ("ぎ", "gi"), ("ぐ", "gu"), ("げ", "ge"), ("ご", "go"),
        ("さ", "sa"), ("し", "shi"), ("す", "su"), ("せ", "se"), ("そ", "so"),
        ("ざ", "za"), ("じ", "ji"), ("ず", "zu"), ("ぜ", "ze"), ("ぞ", "zo"),
        ("た", "ta"), ("ち", "chi"), ("つ", "tsu"), ("て", "te"), ("と", "to"),
        ("だ", "da"), ("ぢ", "ji"), ("づ", "zu"), ("で", "de"), ("ど", "do"),
        ("な", "na"), ("に", "ni"), ("ぬ", "nu"), ("ね", "ne"), ("の", "no"),
        ("は", "ha"), ("ひ", "hi"), ("ふ", "fu"), ("へ", "he"), ("ほ", "ho"),
        ("ば", "ba"), ("び", "bi"), ("ぶ", "bu"), ("べ", "be"), ("ぼ", "bo"),
        ("ぱ", "pa"), ("ぴ", "pi"), ("ぷ", "pu"), ("ぺ", "pe"), ("ぽ", "po"),
        ("ま", "ma"), ("み", "mi"), ("む", "mu"), ("め", "me"), ("も", "mo"),
        ("や", "ya"), ("ゆ", "yu"), ("よ", "yo"),
        ("ら", "ra"), ("り", "ri"), ("る", "ru"), ("れ", "re"), ("ろ", "ro"),
        ("わ", "wa"), ("ゐ", "i"), ("ゑ", "e"), ("を", "o"), ("ん", "n"),
        ("ゔ", "vu"),
        ("きゃ", "kya"), ("きゅ", "kyu"), ("きょ", "kyo"),
        ("ぎゃ", "gya"), ("ぎゅ", "gyu"), ("ぎょ", "gyo"),
        ("しゃ", "sha"), ("しゅ", "shu"), ("しょ", "sho"),
        ("じゃ", "ja"), ("じゅ", "ju"), ("じょ", "jo"),
        ("ちゃ", "cha"), ("ちゅ", "chu"), ("ちょ", "cho"),
        ("ぢゃ", "ja"), ("ぢゅ", "ju"), ("ぢょ", "jo"),
        ("にゃ", "nya"), ("にゅ", "nyu"), ("にょ", "nyo"),
        ("ひゃ", "hya"), ("ひゅ", "hyu"), ("ひょ", "hyo"),
        ("びゃ", "bya"), ("びゅ", "byu"), ("びょ", "byo"),
        ("ぴゃ", "pya"), ("ぴゅ", "pyu"), ("ぴょ", "pyo"),
        ("みゃ", "mya"), ("みゅ", "myu"), ("みょ", "myo"),
        ("りゃ", "rya"), ("りゅ", "ryu"), ("りょ", "ryo"),
    ];
    table.iter().copied().collect()
});

/// Convert katakana to hiragana; other characters pass through.
pub fn to_hiragana(text: &str) -> String {
    text.chars()
        .map(|c| {
            if is_katakana(c) && c <= '\u{30F6}' {
                char::from_u32(c as u32 - KATAKANA_OFFSET).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Lowercase Hepburn romanization of a kana string.
///
/// Characters outside the kana tables (such as the okurigana delimiter `.`)
/// are copied through.
pub fn to_hepburn(text: &str) -> String {
    let chars: Vec<char> = to_hiragana(text).chars().collect();
    let mut out = String::new();
    let mut geminate = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == 'っ' {
            geminate = true;
            i += 1;
            continue;
        }

        if c == 'ー' {
            if let Some(vowel) = out.chars().last().filter(|v| "aiueo".contains(*v)) {
                out.push(vowel);
            }
            i += 1;
            continue;
        }

        // two-kana digraphs first
        let (romaji, width) = match chars.get(i + 1) {
            Some(&next) => {
                let pair: String = [c, next].iter().collect();
                match MORAE.get(pair.as_str()) {
                    Some(r) => (Some(*r), 2),
                    None => (MORAE.get(c.to_string().as_str()).copied(), 1),
                }
            }
            None => (MORAE.get(c.to_string().as_str()).copied(), 1),
        };

        match romaji {
            Some(r) => {
                if geminate {
                    if r.starts_with("ch") {
                        out.push('t');
                    } else if let Some(first) = r.chars().next().filter(|f| !"aiueo".contains(*f)) {
                        out.push(first);
                    }
                }
                out.push_str(r);
                if r == "n" {
                    let next_is_vowel_like = chars
                        .get(i + width)
                        .and_then(|n| MORAE.get(n.to_string().as_str()))
                        .and_then(|n| n.chars().next())
                        .is_some_and(|f| "aiueoy".contains(f));
                    if next_is_vowel_like {
                        out.push('\'');
                    }
                }
            }
            None => {
                if geminate {
                    out.push_str("xtsu");
                }
                out.push(c);
            }
        }

        geminate = false;
        i += width;
    }

    if geminate {
        out.push_str("xtsu");
    }
    out
}

/// Capitalize the first letter of each `.`-separated segment.
pub fn titlecase(romaji: &str) -> String {
    let mut out = String::with_capacity(romaji.len());
    let mut at_start = true;
    for c in romaji.chars() {
        if at_start && c.is_ascii_alphabetic() {
            out.push(c.to_ascii_uppercase());
            at_start = false;
        } else {
            out.push(c);
            if !c.is_ascii_alphabetic() {
                at_start = true;
            }
        }
    }
    out
}
