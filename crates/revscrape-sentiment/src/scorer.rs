//! Lexical polarity model for short customer reviews.
//!
//! Covers English, French and German review vocabulary. The score of a text
//! is the mean weight of the lexicon words it contains, after negation and
//! intensifier adjustments, clamped to `[-1.0, 1.0]`.

/// Review vocabulary weights.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // English, positive
    ("good", 0.7),
    ("great", 0.8),
    ("excellent", 1.0),
    ("perfect", 1.0),
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("love", 0.5),
    ("loved", 0.7),
    ("best", 1.0),
    ("recommend", 0.4),
    ("happy", 0.8),
    ("nice", 0.6),
    ("comfortable", 0.4),
    ("quality", 0.3),
    ("works", 0.2),
    ("fast", 0.2),
    ("easy", 0.4),
    ("satisfied", 0.5),
    ("worth", 0.3),
    ("beautiful", 0.85),
    // English, negative
    ("bad", -0.7),
    ("poor", -0.4),
    ("terrible", -1.0),
    ("awful", -1.0),
    ("worst", -1.0),
    ("broken", -0.4),
    ("broke", -0.4),
    ("useless", -0.5),
    ("disappointed", -0.75),
    ("disappointing", -0.6),
    ("cheap", -0.3),
    ("waste", -0.6),
    ("refund", -0.3),
    ("defective", -0.7),
    ("horrible", -1.0),
    ("fake", -0.5),
    ("return", -0.2),
    ("returned", -0.3),
    ("noisy", -0.3),
    ("slow", -0.3),
    // French, positive
    ("bon", 0.6),
    ("bonne", 0.6),
    ("bien", 0.4),
    ("super", 0.7),
    ("génial", 0.8),
    ("excellente", 1.0),
    ("parfait", 1.0),
    ("parfaite", 1.0),
    ("top", 0.6),
    ("satisfait", 0.6),
    ("satisfaite", 0.6),
    ("recommande", 0.5),
    ("agréable", 0.5),
    ("efficace", 0.5),
    ("pratique", 0.4),
    ("confortable", 0.4),
    ("rapide", 0.3),
    ("qualité", 0.3),
    ("magnifique", 0.9),
    ("ravi", 0.8),
    ("ravie", 0.8),
    // French, negative
    ("mauvais", -0.7),
    ("mauvaise", -0.7),
    ("nul", -0.8),
    ("nulle", -0.8),
    ("déçu", -0.7),
    ("déçue", -0.7),
    ("décevant", -0.6),
    ("cassé", -0.5),
    ("cassée", -0.5),
    ("arnaque", -0.9),
    ("défectueux", -0.7),
    ("inutilisable", -0.8),
    ("remboursement", -0.3),
    ("retour", -0.2),
    ("bruyant", -0.3),
    ("fragile", -0.3),
    // German
    ("gut", 0.6),
    ("toll", 0.7),
    ("hervorragend", 1.0),
    ("zufrieden", 0.6),
    ("empfehlen", 0.4),
    ("schlecht", -0.7),
    ("kaputt", -0.6),
    ("enttäuscht", -0.7),
    ("mangelhaft", -0.7),
];

/// Words that flip the next sentiment word within [`NEGATION_WINDOW`] tokens.
const NEGATORS: &[&str] = &[
    "not", "no", "never", "nothing", "pas", "jamais", "rien", "ne", "nicht", "kein", "keine",
    "nie",
];

/// Words that scale the next sentiment word.
const INTENSIFIERS: &[(&str, f32)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("extremely", 1.5),
    ("so", 1.2),
    ("too", 1.2),
    ("très", 1.3),
    ("vraiment", 1.3),
    ("trop", 1.2),
    ("sehr", 1.3),
    ("slightly", 0.5),
    ("peu", 0.5),
];

const NEGATION_WINDOW: usize = 3;

/// Negated words keep half their magnitude with the opposite sign.
const NEGATION_FACTOR: f32 = -0.5;

fn weight_of(word: &str) -> Option<f32> {
    LEXICON
        .iter()
        .find(|&&(lex_word, _)| lex_word == word)
        .map(|&(_, weight)| weight)
}

fn intensity_of(word: &str) -> Option<f32> {
    INTENSIFIERS
        .iter()
        .find(|&&(w, _)| w == word)
        .map(|&(_, factor)| factor)
}

fn is_negator(word: &str) -> bool {
    NEGATORS.contains(&word) || word.ends_with("n't") || word.starts_with("n'")
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphabetic() || c == '\'' || c == '’'))
        .map(|t| t.replace('’', "'").trim_matches('\'').to_lowercase())
        .filter(|t| !t.is_empty())
}

/// Score a text string using the review lexicon.
///
/// Returns `0.0` for empty text or text with no lexicon words.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    let mut total = 0.0_f32;
    let mut matched = 0_u16;
    let mut negation_left = 0_usize;
    let mut intensity = 1.0_f32;

    for word in tokens(text) {
        if is_negator(&word) {
            negation_left = NEGATION_WINDOW;
            continue;
        }
        if let Some(factor) = intensity_of(&word) {
            intensity = factor;
            continue;
        }

        if let Some(weight) = weight_of(&word) {
            let mut adjusted = (weight * intensity).clamp(-1.0, 1.0);
            if negation_left > 0 {
                adjusted *= NEGATION_FACTOR;
            }
            total += adjusted;
            matched = matched.saturating_add(1);
            negation_left = 0;
            intensity = 1.0;
        } else {
            negation_left = negation_left.saturating_sub(1);
        }
    }

    if matched == 0 {
        return 0.0;
    }
    (total / f32::from(matched)).clamp(-1.0, 1.0)
}
