//! Slug generation and claim/fact splitting for snack texts.

/// Delimiter separating the claim from the fact body inside a card
/// description.
pub const CLAIM_FACT_DELIMITER: &str = "===";

/// Words dropped from slugs and from similarity key terms. The board's
/// editorial language is German.
pub const STOPWORDS: &[&str] = &[
    "aber", "als", "auch", "auf", "aus", "bei", "bin", "bis", "das", "dass", "dem", "den", "der",
    "des", "die", "doch", "durch", "ein", "eine", "einem", "einen", "einer", "eines", "er", "es",
    "fuer", "gegen", "hat", "im", "in", "ist", "ja", "kein", "keine", "man", "mit", "nach",
    "nein", "nicht", "noch", "nur", "oder", "ohne", "sich", "sie", "sind", "so", "ueber", "um",
    "und", "uns", "vom", "von", "vor", "war", "was", "wer", "wie", "wir", "wird", "zu", "zum",
    "zur",
];

/// Convert a title to a URL-safe slug: lower-case, transliterated,
/// stopwords removed, hyphen-joined. Stable for a given title.
pub fn slugify(title: &str) -> String {
    content_terms(title).join("-")
}

/// The content-bearing terms of a text: transliterated, lower-cased,
/// stripped of non-alphanumerics and stopwords, in original order.
pub fn content_terms(text: &str) -> Vec<String> {
    let mut terms = Vec::new();
    for raw in text.split_whitespace() {
        let mut term = String::new();
        for c in raw.chars() {
            fold_char(c, &mut term);
        }
        if term.is_empty() || STOPWORDS.contains(&term.as_str()) {
            continue;
        }
        terms.push(term);
    }
    terms
}

// Transliteration covers the German umlauts plus the Latin-1 accents that
// show up in quoted names; anything else non-alphanumeric is dropped.
fn fold_char(c: char, out: &mut String) {
    match c {
        'ä' | 'Ä' => out.push_str("ae"),
        'ö' | 'Ö' => out.push_str("oe"),
        'ü' | 'Ü' => out.push_str("ue"),
        'ß' => out.push_str("ss"),
        'à'..='å' | 'À'..='Å' => out.push('a'),
        'è'..='ë' | 'È'..='Ë' => out.push('e'),
        'ì'..='ï' | 'Ì'..='Ï' => out.push('i'),
        'ò'..='õ' | 'Ò'..='Õ' => out.push('o'),
        'ù'..='û' | 'Ù'..='Û' => out.push('u'),
        'ç' | 'Ç' => out.push('c'),
        'ñ' | 'Ñ' => out.push('n'),
        _ if c.is_ascii_alphanumeric() => out.push(c.to_ascii_lowercase()),
        _ => {}
    }
}

/// Split a description into claim and fact on the first delimiter
/// occurrence. Without a delimiter the whole text is the fact and the
/// claim stays empty. Both parts are trimmed.
pub fn split_claim_fact(text: &str) -> (String, String) {
    match text.split_once(CLAIM_FACT_DELIMITER) {
        Some((claim, fact)) => (claim.trim().to_string(), fact.trim().to_string()),
        None => (String::new(), text.trim().to_string()),
    }
}
