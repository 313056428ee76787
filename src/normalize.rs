//! Plate text normalization
//!
//! OCR output for plates routinely mixes Cyrillic look-alikes into Latin
//! text (the glyphs are identical on the plate itself). Normalization folds
//! those onto their Latin twins, uppercases, and strips the separators a
//! plate may carry.

/// Normalize raw OCR text into canonical plate form.
///
/// Uppercases, drops whitespace and hyphens, and substitutes the recognized
/// Cyrillic look-alikes with their Latin equivalents. Every other character
/// passes through unchanged, so the function is total and idempotent.
pub fn normalize_plate_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars().flat_map(char::to_uppercase) {
        if ch.is_whitespace() || ch == '-' {
            continue;
        }
        out.push(fold_lookalike(ch));
    }
    out
}

/// Map one uppercase Cyrillic look-alike to its Latin twin.
fn fold_lookalike(ch: char) -> char {
    match ch {
        'А' => 'A',
        'В' => 'B',
        'С' => 'C',
        'Е' => 'E',
        'Н' => 'H',
        'І' => 'I',
        'К' => 'K',
        'М' => 'M',
        'О' => 'O',
        'Р' => 'P',
        'Т' => 'T',
        'Х' => 'X',
        'У' => 'Y',
        other => other,
    }
}
