//! Free text to witness tokens.
//!
//! The outer loop alternates between whitespace and non-whitespace chunks;
//! each chunk is then classified (all punctuation, numbering label, plain
//! word) or split by the punctuation state machine. The split machine treats
//! the period specially so that decimal numbers and abbreviations survive as
//! single words while ellipses come out as one punctuation token per period.

use crate::config::Language;
use crate::punctuation::PunctuationTable;
use crate::token::Token;

/// Normalization source tag attached by intra-word quote stripping.
pub const INTRA_WORD_QUOTES_SOURCE: &str = "ignore-intra-word-quotes";

/// Tokenizes free text. Deterministic for identical input and flags.
///
/// A whitespace character ending a chunk acts as the separator and is
/// consumed; only the remainder of a whitespace run is emitted as a
/// `Whitespace` token. Trailing whitespace at end of input is dropped.
pub fn tokenize(
    text: &str,
    language: Language,
    detect_numbering_labels: bool,
    detect_intra_word_quotes: bool,
) -> Vec<Token> {
    let table = PunctuationTable::new(language);
    let mut tokens = Vec::new();
    let mut whitespace = String::new();
    let mut chunk = String::new();

    for ch in text.chars() {
        if ch.is_whitespace() {
            if chunk.is_empty() {
                whitespace.push(ch);
            } else {
                // Separator after a chunk: flush the chunk, drop this char.
                parse_chunk(
                    &chunk,
                    &table,
                    detect_numbering_labels,
                    detect_intra_word_quotes,
                    &mut tokens,
                );
                chunk.clear();
            }
        } else {
            if !whitespace.is_empty() {
                tokens.push(Token::whitespace(std::mem::take(&mut whitespace)));
            }
            chunk.push(ch);
        }
    }
    if !chunk.is_empty() {
        parse_chunk(
            &chunk,
            &table,
            detect_numbering_labels,
            detect_intra_word_quotes,
            &mut tokens,
        );
    }

    tokens
}

fn parse_chunk(
    chunk: &str,
    table: &PunctuationTable,
    detect_numbering_labels: bool,
    detect_intra_word_quotes: bool,
    out: &mut Vec<Token>,
) {
    if table.string_is_all_punctuation(chunk) {
        for ch in chunk.chars() {
            out.push(Token::punctuation(ch.to_string()));
        }
        return;
    }
    if detect_numbering_labels && is_numbering_label(chunk) {
        out.push(Token::numbering_label(chunk));
        return;
    }
    if detect_intra_word_quotes {
        if let Some(word) = strip_intra_word_quotes(chunk, table) {
            out.push(word);
            return;
        }
    }
    if table.string_has_punctuation(chunk) {
        split_punctuation(chunk, table, out);
    } else {
        out.push(Token::word(chunk));
    }
}

/// A numbering label is `[` + dot-separated fields + `]` whose first field is
/// a number, e.g. `[1]`, `[1.2]`, `[3.a.iv]`.
fn is_numbering_label(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < 3 {
        return false;
    }
    if chars[0] != '[' || chars[chars.len() - 1] != ']' {
        return false;
    }
    let inner: String = chars[1..chars.len() - 1].iter().collect();
    let first_field = inner.split('.').next().unwrap_or("");
    is_western_number(first_field) || is_arabic_indic_number(first_field)
}

fn is_western_number(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn is_arabic_indic_number(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| ('\u{660}'..='\u{669}').contains(&c))
}

fn is_quote_mark(ch: char) -> bool {
    matches!(ch, '‘' | '’' | '“' | '”')
}

/// When a chunk is a plain word apart from directional quote marks strictly
/// inside it, keep it as one word whose normalization strips the marks.
fn strip_intra_word_quotes(chunk: &str, table: &PunctuationTable) -> Option<Token> {
    let chars: Vec<char> = chunk.chars().collect();
    if chars.len() < 3 {
        return None;
    }
    if !chars[1..chars.len() - 1].iter().any(|&c| is_quote_mark(c)) {
        return None;
    }
    let stripped: String = chars
        .iter()
        .enumerate()
        .filter(|&(i, &c)| !(i > 0 && i + 1 < chars.len() && is_quote_mark(c)))
        .map(|(_, &c)| c)
        .collect();
    if table.string_has_punctuation(&stripped) {
        return None;
    }
    Some(Token::word_normalized(
        chunk,
        stripped,
        INTRA_WORD_QUOTES_SOURCE,
    ))
}

#[derive(Clone, Copy, PartialEq)]
enum SplitState {
    Start,
    InWord,
    /// Accumulating a run of periods (ellipsis).
    PeriodRun,
    /// Exactly one period seen right after word characters; the next
    /// character decides whether it belongs to the word or stands alone.
    PeriodAfterWord,
}

// TODO: pair matching square brackets so 'Roma[m]' stays one word instead of
// word + closing-bracket punctuation.
fn split_punctuation(s: &str, table: &PunctuationTable, out: &mut Vec<Token>) {
    let chars: Vec<char> = s.chars().collect();
    let count = chars.len();
    let mut state = SplitState::Start;
    let mut word = String::new();
    let mut periods = 0usize;

    for (i, &ch) in chars.iter().enumerate() {
        let inside_word = i > 0 && i + 1 < count;
        match state {
            SplitState::Start => {
                if ch == '.' {
                    periods = 1;
                    state = SplitState::PeriodRun;
                } else if table.is_punctuation(ch, inside_word) {
                    out.push(Token::punctuation(ch.to_string()));
                } else {
                    word.push(ch);
                    state = SplitState::InWord;
                }
            }
            SplitState::InWord => {
                if ch == '.' {
                    state = SplitState::PeriodAfterWord;
                } else if table.is_punctuation(ch, inside_word) {
                    out.push(Token::word(std::mem::take(&mut word)));
                    out.push(Token::punctuation(ch.to_string()));
                    state = SplitState::Start;
                } else {
                    word.push(ch);
                }
            }
            SplitState::PeriodRun => {
                if ch == '.' {
                    periods += 1;
                } else if table.is_punctuation(ch, inside_word) {
                    emit_periods(&mut periods, out);
                    out.push(Token::punctuation(ch.to_string()));
                    state = SplitState::Start;
                } else {
                    emit_periods(&mut periods, out);
                    word.push(ch);
                    state = SplitState::InWord;
                }
            }
            SplitState::PeriodAfterWord => {
                if ch == '.' {
                    // Second period: the word ends, an ellipsis begins.
                    out.push(Token::word(std::mem::take(&mut word)));
                    periods = 2;
                    state = SplitState::PeriodRun;
                } else if table.is_punctuation(ch, inside_word) {
                    out.push(Token::word(std::mem::take(&mut word)));
                    out.push(Token::punctuation("."));
                    out.push(Token::punctuation(ch.to_string()));
                    state = SplitState::Start;
                } else {
                    // Single period between word characters stays inside the
                    // word (decimals, abbreviated names).
                    word.push('.');
                    word.push(ch);
                    state = SplitState::InWord;
                }
            }
        }
    }

    match state {
        SplitState::Start => {}
        SplitState::InWord => out.push(Token::word(word)),
        SplitState::PeriodRun => emit_periods(&mut periods, out),
        SplitState::PeriodAfterWord => {
            out.push(Token::word(word));
            out.push(Token::punctuation("."));
        }
    }
}

fn emit_periods(periods: &mut usize, out: &mut Vec<Token>) {
    for _ in 0..*periods {
        out.push(Token::punctuation("."));
    }
    *periods = 0;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latin(text: &str) -> Vec<Token> {
        tokenize(text, Language::Latin, true, false)
    }

    #[test]
    fn single_spaces_separate_words_without_whitespace_tokens() {
        assert_eq!(
            latin("in principio"),
            vec![Token::word("in"), Token::word("principio")]
        );
    }

    #[test]
    fn extra_whitespace_becomes_a_token() {
        assert_eq!(
            latin("in  principio"),
            vec![
                Token::word("in"),
                Token::whitespace(" "),
                Token::word("principio"),
            ]
        );
    }

    #[test]
    fn leading_whitespace_is_kept_trailing_is_dropped() {
        assert_eq!(
            latin(" verbum  "),
            vec![Token::whitespace(" "), Token::word("verbum")]
        );
    }

    #[test]
    fn sentence_punctuation_splits_off() {
        assert_eq!(
            latin("dixit deus."),
            vec![
                Token::word("dixit"),
                Token::word("deus"),
                Token::punctuation("."),
            ]
        );
    }

    #[test]
    fn all_punctuation_chunk_yields_one_token_per_mark() {
        assert_eq!(
            latin("!?"),
            vec![Token::punctuation("!"), Token::punctuation("?")]
        );
    }

    #[test]
    fn ellipsis_yields_one_token_per_period() {
        assert_eq!(
            latin("et..."),
            vec![
                Token::word("et"),
                Token::punctuation("."),
                Token::punctuation("."),
                Token::punctuation("."),
            ]
        );
    }

    #[test]
    fn decimal_period_stays_inside_the_word() {
        assert_eq!(latin("3.14"), vec![Token::word("3.14")]);
    }

    #[test]
    fn abbreviation_period_before_comma_splits() {
        assert_eq!(
            latin("vid.,"),
            vec![
                Token::word("vid"),
                Token::punctuation("."),
                Token::punctuation(","),
            ]
        );
    }

    #[test]
    fn numbering_labels_detected_when_enabled() {
        assert_eq!(latin("[1.2]"), vec![Token::numbering_label("[1.2]")]);
        assert_eq!(
            tokenize("[1.2]", Language::Latin, false, false),
            vec![
                Token::punctuation("["),
                Token::word("1.2"),
                Token::punctuation("]"),
            ]
        );
    }

    #[test]
    fn arabic_indic_numbering_label() {
        assert_eq!(
            tokenize("[\u{661}.\u{662}]", Language::Arabic, true, false),
            vec![Token::numbering_label("[\u{661}.\u{662}]")]
        );
    }

    #[test]
    fn bracketed_letters_are_not_labels() {
        assert_eq!(
            latin("[a.1]"),
            vec![
                Token::punctuation("["),
                Token::word("a.1"),
                Token::punctuation("]"),
            ]
        );
    }

    #[test]
    fn intra_word_quote_is_normalized_away_when_enabled() {
        // The apostrophe is not inside-word punctuation in Latin, so the
        // chunk stays one word either way; detection adds the normalization
        // that lets it match the unquoted form.
        let tokens = tokenize("qul’tu", Language::Latin, true, true);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text(), "qul’tu");
        assert_eq!(tokens[0].normalized_text(), "qultu");

        let plain = tokenize("qul’tu", Language::Latin, true, false);
        assert_eq!(plain, vec![Token::word("qul’tu")]);
        assert_eq!(plain[0].normalized_text(), "qul’tu");
    }

    #[test]
    fn intra_word_quote_prevents_a_split_in_rtl() {
        // In Arabic the left single quotation mark is punctuation inside a
        // word, so without detection the chunk splits.
        let split = tokenize("qul‘tu", Language::Arabic, true, false);
        assert_eq!(
            split,
            vec![
                Token::word("qul"),
                Token::punctuation("‘"),
                Token::word("tu"),
            ]
        );

        let joined = tokenize("qul‘tu", Language::Arabic, true, true);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].normalized_text(), "qultu");
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert_eq!(latin(""), Vec::new());
        assert_eq!(latin("   "), Vec::new());
    }
}
