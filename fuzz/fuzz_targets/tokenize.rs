#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let flags = data.first().copied().unwrap_or(0);
    let language = match flags % 3 {
        0 => recollate::Language::Latin,
        1 => recollate::Language::Arabic,
        _ => recollate::Language::Hebrew,
    };
    let detect_labels = flags & 0x04 != 0;
    let detect_quotes = flags & 0x08 != 0;

    let text = String::from_utf8_lossy(data.get(1..).unwrap_or(&[]));
    let tokens = recollate::tokenize(&text, language, detect_labels, detect_quotes);

    for token in &tokens {
        assert!(
            !token.text().is_empty(),
            "tokenizer must never emit an empty token"
        );
        assert!(
            token.kind() != recollate::TokenKind::Empty,
            "tokenizer must never emit placeholder cells"
        );
    }
});
