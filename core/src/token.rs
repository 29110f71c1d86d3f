use serde::{Deserialize, Serialize};

/// Discriminant of a [`Token`], used wherever kind gating matters (equality,
/// match scoring) without looking at the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Word,
    Punctuation,
    Whitespace,
    FormatMark,
    NumberingLabel,
    Empty,
}

/// Restricted formatting attributes carried by word tokens.
///
/// Only the attributes that make two words different readings are kept here;
/// presentation styling beyond bold/italic never participates in equality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordFormat {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl WordFormat {
    pub fn is_plain(&self) -> bool {
        !self.bold && !self.italic
    }
}

/// A normalized form attached to a word token, together with the name of the
/// normalizer that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Normalization {
    pub text: String,
    #[serde(default)]
    pub source: String,
}

/// Paragraph-end structural mark, the one format mark witness text uses.
pub const PARAGRAPH_END_MARK: &str = "par_end";

/// A semantic token of witness text.
///
/// One enum variant per token kind; kind-specific payloads live on their
/// variant instead of a bag of optional fields, so the equality predicate and
/// the tokenizer can match on the tag first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Token {
    Word {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        normalization: Option<Normalization>,
        #[serde(default)]
        format: WordFormat,
    },
    Punctuation {
        text: String,
    },
    Whitespace {
        text: String,
    },
    FormatMark {
        mark: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        formats: Vec<String>,
    },
    NumberingLabel {
        text: String,
    },
    /// Placeholder for a column this witness does not fill.
    Empty,
}

impl Token {
    pub fn word(text: impl Into<String>) -> Self {
        Token::Word {
            text: text.into(),
            normalization: None,
            format: WordFormat::default(),
        }
    }

    pub fn word_normalized(
        text: impl Into<String>,
        normalized: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Token::Word {
            text: text.into(),
            normalization: Some(Normalization {
                text: normalized.into(),
                source: source.into(),
            }),
            format: WordFormat::default(),
        }
    }

    pub fn punctuation(text: impl Into<String>) -> Self {
        Token::Punctuation { text: text.into() }
    }

    pub fn whitespace(text: impl Into<String>) -> Self {
        Token::Whitespace { text: text.into() }
    }

    pub fn numbering_label(text: impl Into<String>) -> Self {
        Token::NumberingLabel { text: text.into() }
    }

    pub fn format_mark(mark: impl Into<String>) -> Self {
        Token::FormatMark {
            mark: mark.into(),
            style: None,
            formats: Vec::new(),
        }
    }

    pub fn paragraph_end() -> Self {
        Token::format_mark(PARAGRAPH_END_MARK)
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Word { .. } => TokenKind::Word,
            Token::Punctuation { .. } => TokenKind::Punctuation,
            Token::Whitespace { .. } => TokenKind::Whitespace,
            Token::FormatMark { .. } => TokenKind::FormatMark,
            Token::NumberingLabel { .. } => TokenKind::NumberingLabel,
            Token::Empty => TokenKind::Empty,
        }
    }

    pub fn is_empty_token(&self) -> bool {
        matches!(self, Token::Empty)
    }

    /// Surface text of the token; empty for kinds without one.
    pub fn text(&self) -> &str {
        match self {
            Token::Word { text, .. }
            | Token::Punctuation { text }
            | Token::Whitespace { text }
            | Token::NumberingLabel { text } => text,
            Token::FormatMark { .. } | Token::Empty => "",
        }
    }

    /// Normalized text if a normalization is attached, surface text otherwise.
    pub fn normalized_text(&self) -> &str {
        match self {
            Token::Word {
                text,
                normalization,
                ..
            } => normalization.as_ref().map_or(text.as_str(), |n| &n.text),
            other => other.text(),
        }
    }
}

/// Equality predicate used by the diff engine.
///
/// Kind first; words then compare surface text, normalized text and the
/// restricted format attributes; format marks compare mark, style and format
/// list; the remaining textual kinds compare surface text only. Two empties
/// are equal.
pub fn tokens_match(a: &Token, b: &Token) -> bool {
    match (a, b) {
        (
            Token::Word {
                text: ta,
                format: fa,
                ..
            },
            Token::Word {
                text: tb,
                format: fb,
                ..
            },
        ) => ta == tb && a.normalized_text() == b.normalized_text() && fa == fb,
        (Token::Punctuation { text: ta }, Token::Punctuation { text: tb })
        | (Token::Whitespace { text: ta }, Token::Whitespace { text: tb })
        | (Token::NumberingLabel { text: ta }, Token::NumberingLabel { text: tb }) => ta == tb,
        (
            Token::FormatMark {
                mark: ma,
                style: sa,
                formats: fa,
            },
            Token::FormatMark {
                mark: mb,
                style: sb,
                formats: fb,
            },
        ) => ma == mb && sa == sb && fa == fb,
        (Token::Empty, Token::Empty) => true,
        _ => false,
    }
}

/// A token paired with the matrix column it occupies.
///
/// The column is assigned when a witness row is filtered for diffing and is
/// immutable for the rest of the reconciliation pass; it is what maps changes
/// back to the alignment matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnToken {
    pub column: u32,
    pub token: Token,
}

/// Filters a witness row for diffing: drops `Empty` placeholders while every
/// surviving token keeps the column index it had in the matrix. Never
/// renumbers.
pub fn filter_row(cells: &[Token]) -> Vec<ColumnToken> {
    cells
        .iter()
        .enumerate()
        .filter(|(_, token)| !token.is_empty_token())
        .map(|(column, token)| ColumnToken {
            column: column as u32,
            token: token.clone(),
        })
        .collect()
}

/// Prepares a freshly tokenized sequence for diffing: empties and whitespace
/// glue are dropped, everything else keeps its relative order.
pub fn filter_new_tokens(tokens: &[Token]) -> Vec<Token> {
    tokens
        .iter()
        .filter(|token| !matches!(token.kind(), TokenKind::Empty | TokenKind::Whitespace))
        .cloned()
        .collect()
}
