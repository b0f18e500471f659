use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[\p{L}\p{N}]+(?:'[\p{L}\p{N}]+)*").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","shan't","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Tokens shorter than this (in characters) are dropped by [`character_filter`].
pub const MIN_TOKEN_CHARS: usize = 2;

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

pub fn stopwords() -> impl Iterator<Item = &'static str> { STOPWORDS.iter().copied() }

/// Split text into maximal runs of letters and digits. An apostrophe between
/// two such runs stays inside the token, so contractions like "aren't" survive
/// whole. Compatibility forms are folded (NFKC) first so that e.g. full-width
/// digits tokenize like ASCII ones.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>();
    RE.find_iter(&normalized).map(|m| m.as_str().to_string()).collect()
}

pub fn lowercase_filter(tokens: Vec<String>) -> Vec<String> {
    tokens.into_iter().map(|t| t.to_lowercase()).collect()
}

/// Strip non-alphanumeric characters from both ends of each token and drop
/// tokens left shorter than [`MIN_TOKEN_CHARS`]. Inner characters are kept.
///
/// Tokens from [`tokenize`] already start and end alphanumeric, so in
/// [`analyze`] this stage only enforces the minimum length.
pub fn character_filter(tokens: Vec<String>) -> Vec<String> {
    tokens
        .into_iter()
        .filter_map(|t| {
            let trimmed = t.trim_matches(|c: char| !c.is_alphanumeric());
            if trimmed.chars().count() < MIN_TOKEN_CHARS {
                return None;
            }
            Some(trimmed.to_string())
        })
        .collect()
}

pub fn stopword_filter(tokens: Vec<String>) -> Vec<String> {
    tokens.into_iter().filter(|t| !is_stopword(t)).collect()
}

pub fn stemmer_filter(tokens: Vec<String>) -> Vec<String> {
    tokens.into_iter().map(|t| STEMMER.stem(&t).into_owned()).collect()
}

/// Run the full analysis pipeline: tokenize, lowercase, trim, drop stopwords, stem.
///
/// Output order follows the input text and duplicates are kept, so callers can
/// count term frequencies from the result.
pub fn analyze(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let tokens = lowercase_filter(tokens);
    let tokens = character_filter(tokens);
    let tokens = stopword_filter(tokens);
    stemmer_filter(tokens)
}
