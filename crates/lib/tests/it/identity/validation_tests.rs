use tessera::identity::{self, IdentityError, SecretPhrase, WORD_COUNT};

use crate::helpers::PHRASE;

#[test]
fn test_generated_phrases_validate() {
    for _ in 0..1000 {
        let phrase = identity::generate().unwrap();
        let words = phrase.expose();
        assert_eq!(words.split(' ').count(), WORD_COUNT);
        assert!(identity::validate(&words));
    }
}

#[test]
fn test_one_word_alteration_is_rejected() {
    let phrase = identity::generate().unwrap();
    let words: Vec<String> = phrase.expose().split(' ').map(str::to_string).collect();

    for index in 0..WORD_COUNT {
        let mut altered = words.clone();
        altered[index] = "qwerty".to_string();
        assert!(!identity::validate(&altered.join(" ")), "word {index}");
    }
}

#[test]
fn test_bad_checksum_is_rejected() {
    // valid words, but "abandon" x12 fails the checksum ("about" is the valid last word)
    let phrase = ["abandon"; 12].join(" ");
    assert!(!identity::validate(&phrase));
    let err = SecretPhrase::parse(&phrase).unwrap_err();
    assert!(err.is_invalid_phrase());
}

#[test]
fn test_wrong_word_count_is_rejected() {
    let short: Vec<&str> = PHRASE.split(' ').take(11).collect();
    assert_eq!(
        SecretPhrase::parse(&short.join(" ")).unwrap_err(),
        IdentityError::WrongWordCount {
            expected: 12,
            actual: 11
        }
    );

    let long = format!("{PHRASE} yellow");
    assert!(!identity::validate(&long));
}

#[test]
fn test_garbage_never_panics() {
    let long = "x".repeat(10_000);
    for input in [
        "",
        " ",
        "\u{0}",
        "légal",
        long.as_str(),
        "1 2 3 4 5 6 7 8 9 10 11 12",
    ] {
        assert!(!identity::validate(input));
    }
}
