use textsearch_core::analyzer::{analyze, is_stopword};

#[test]
fn it_normalizes_and_stems() {
    let words = analyze("Fishing, fished FISH! The donuts' glaze.");
    assert_eq!(&words[..3], &["fish", "fish", "fish"]);
    assert!(words.contains(&"donut".to_string()));
}

#[test]
fn it_filters_stopwords() {
    let words = analyze("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert_eq!(words.len(), 5);
}

#[test]
fn it_drops_single_characters() {
    assert!(analyze("a b c x y z 1 2 3").is_empty());
    assert_eq!(analyze("x 42"), vec!["42".to_string()]);
}

#[test]
fn it_never_emits_stopwords_or_short_terms() {
    let text = "I'm sure it's a test of the system: you'll see, we've done it before (or have we?)";
    for term in analyze(text) {
        assert!(term.chars().count() >= 2, "short term {term:?}");
        assert!(!is_stopword(&term), "stopword {term:?}");
    }
}

#[test]
fn it_is_deterministic() {
    let text = "Sphinx of black quartz, judge my vow";
    assert_eq!(analyze(text), analyze(text));
}
