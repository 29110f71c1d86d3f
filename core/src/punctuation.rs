//! Per-language punctuation classification.
//!
//! Classification is positional: a character can be punctuation at a word
//! boundary but not inside a word (period, comma, colon, brackets), which is
//! what keeps decimal numbers, ratios and bracketed letters inside a single
//! word token. Arabic and Hebrew invert the direction of the curly quotation
//! marks.

use rustc_hash::FxHashMap;

use crate::config::Language;

/// Resolved classification of one character in one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharClass {
    pub is_punctuation: bool,
    /// Whether the character still counts as punctuation when it occurs
    /// strictly inside a word.
    pub is_punctuation_inside_word: bool,
    /// Rendering hint: the mark attaches to the preceding token (no space
    /// before it).
    pub sticks_to_previous: bool,
    /// Rendering hint: the mark attaches to the following token.
    pub sticks_to_next: bool,
}

const NOT_PUNCTUATION: CharClass = CharClass {
    is_punctuation: false,
    is_punctuation_inside_word: false,
    sticks_to_previous: false,
    sticks_to_next: false,
};

struct Entry {
    is_punctuation: bool,
    /// `None` means "same as `is_punctuation`".
    inside_word: Option<bool>,
    sticks_to_previous: bool,
    sticks_to_next: bool,
}

struct Def {
    ch: char,
    base: Entry,
    /// Override applied for right-to-left languages (Arabic, Hebrew).
    rtl: Option<Entry>,
}

const fn entry(is_punctuation: bool, prev: bool, next: bool) -> Entry {
    Entry {
        is_punctuation,
        inside_word: None,
        sticks_to_previous: prev,
        sticks_to_next: next,
    }
}

const fn entry_outside_word(prev: bool, next: bool) -> Entry {
    Entry {
        is_punctuation: true,
        inside_word: Some(false),
        sticks_to_previous: prev,
        sticks_to_next: next,
    }
}

const fn def(ch: char, base: Entry) -> Def {
    Def {
        ch,
        base,
        rtl: None,
    }
}

const fn def_rtl(ch: char, base: Entry, rtl: Entry) -> Def {
    Def {
        ch,
        base,
        rtl: Some(rtl),
    }
}

static DEFS: &[Def] = &[
    // Inside-word exceptions let "3.14" and "3:2" stay single words.
    def('.', entry_outside_word(true, false)),
    def(',', entry_outside_word(true, false)),
    def('\u{60C}', entry(true, true, false)), // Arabic comma
    def(';', entry(true, true, false)),
    def('\u{61B}', entry(true, true, false)), // Arabic semicolon
    def(':', entry_outside_word(true, false)),
    def('¿', entry(true, false, true)),
    def('?', entry(true, true, false)),
    def('\u{61F}', entry(true, true, false)), // Arabic question mark
    def('¡', entry(true, false, true)),
    def('!', entry(true, true, false)),
    def('⊙', entry(true, false, false)), // circled period
    def('¶', entry(true, false, false)),
    def('\u{2013}', entry(true, false, false)), // en dash
    def('\u{2014}', entry(true, false, false)), // em dash
    def('\u{2E3A}', entry(true, false, false)), // two-em dash
    def('«', entry(true, false, true)),
    def('»', entry(true, true, false)),
    def('[', entry_outside_word(false, true)),
    def(']', entry_outside_word(true, false)),
    def('(', entry_outside_word(false, true)),
    def(')', entry_outside_word(true, false)),
    def('{', entry_outside_word(false, true)),
    def('}', entry_outside_word(true, false)),
    def('⟨', entry_outside_word(false, true)),
    def('⟩', entry_outside_word(true, false)),
    // Straight quotes are not punctuation; editors must use directional marks.
    def('"', entry(false, false, false)),
    def_rtl('“', entry(true, false, true), entry(true, true, false)),
    def_rtl('”', entry(true, true, false), entry(true, false, true)),
    def('\'', entry(false, false, false)),
    def_rtl('‘', entry_outside_word(false, true), entry(true, true, false)),
    def_rtl('’', entry_outside_word(true, false), entry_outside_word(false, true)),
    def('\u{60D}', entry(true, false, false)), // Arabic date separator
    def('\u{5BE}', entry(true, false, false)), // Hebrew maqaf
    def('\u{5C0}', entry(true, false, false)), // Hebrew paseq
    def('\u{5C3}', entry(true, false, false)), // Hebrew sof pasuq
];

/// Punctuation classification for one language.
pub struct PunctuationTable {
    map: FxHashMap<char, CharClass>,
}

impl PunctuationTable {
    pub fn new(language: Language) -> Self {
        let mut map = FxHashMap::default();
        for d in DEFS {
            let e = match (language.is_rtl(), &d.rtl) {
                (true, Some(rtl)) => rtl,
                _ => &d.base,
            };
            map.insert(
                d.ch,
                CharClass {
                    is_punctuation: e.is_punctuation,
                    is_punctuation_inside_word: e.inside_word.unwrap_or(e.is_punctuation),
                    sticks_to_previous: e.sticks_to_previous,
                    sticks_to_next: e.sticks_to_next,
                },
            );
        }
        PunctuationTable { map }
    }

    pub fn class(&self, ch: char) -> CharClass {
        self.map.get(&ch).copied().unwrap_or(NOT_PUNCTUATION)
    }

    pub fn is_punctuation(&self, ch: char, inside_word: bool) -> bool {
        let class = self.class(ch);
        if inside_word {
            class.is_punctuation_inside_word
        } else {
            class.is_punctuation
        }
    }

    pub fn sticks_to_previous(&self, ch: char) -> bool {
        self.class(ch).sticks_to_previous
    }

    pub fn sticks_to_next(&self, ch: char) -> bool {
        self.class(ch).sticks_to_next
    }

    /// True if every character of the string is punctuation at a word
    /// boundary.
    pub fn string_is_all_punctuation(&self, s: &str) -> bool {
        !s.is_empty() && s.chars().all(|ch| self.is_punctuation(ch, false))
    }

    /// True if any character of the string is punctuation, classifying each
    /// character by its position (first and last characters are at a word
    /// boundary, the rest are inside the word).
    pub fn string_has_punctuation(&self, s: &str) -> bool {
        let count = s.chars().count();
        s.chars()
            .enumerate()
            .any(|(i, ch)| self.is_punctuation(ch, i > 0 && i + 1 < count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_is_boundary_punctuation_only() {
        let table = PunctuationTable::new(Language::Latin);
        assert!(table.is_punctuation('.', false));
        assert!(!table.is_punctuation('.', true));
    }

    #[test]
    fn decimal_number_has_no_punctuation() {
        let table = PunctuationTable::new(Language::Latin);
        assert!(!table.string_has_punctuation("3.14"));
        assert!(!table.string_has_punctuation("3:2"));
        assert!(table.string_has_punctuation("3.14."));
    }

    #[test]
    fn unlisted_characters_are_not_punctuation() {
        let table = PunctuationTable::new(Language::Latin);
        assert!(!table.is_punctuation('a', false));
        assert!(!table.string_has_punctuation("verbum"));
    }

    #[test]
    fn straight_quotes_are_never_punctuation() {
        for lang in [Language::Latin, Language::Arabic, Language::Hebrew] {
            let table = PunctuationTable::new(lang);
            assert!(!table.is_punctuation('"', false));
            assert!(!table.is_punctuation('\'', false));
        }
    }

    #[test]
    fn curly_quotes_invert_direction_in_rtl() {
        let latin = PunctuationTable::new(Language::Latin);
        assert!(latin.sticks_to_next('“'));
        assert!(latin.sticks_to_previous('”'));

        for lang in [Language::Arabic, Language::Hebrew] {
            let table = PunctuationTable::new(lang);
            assert!(table.sticks_to_previous('“'));
            assert!(table.sticks_to_next('”'));
        }
    }

    #[test]
    fn left_single_quote_counts_inside_word_in_rtl_only() {
        let latin = PunctuationTable::new(Language::Latin);
        let arabic = PunctuationTable::new(Language::Arabic);
        assert!(!latin.is_punctuation('‘', true));
        assert!(arabic.is_punctuation('‘', true));
    }

    #[test]
    fn all_punctuation_strings() {
        let table = PunctuationTable::new(Language::Latin);
        assert!(table.string_is_all_punctuation("..."));
        assert!(table.string_is_all_punctuation("!?"));
        assert!(!table.string_is_all_punctuation("a."));
        assert!(!table.string_is_all_punctuation(""));
    }
}
