// tests/prompt_scanner_props.rs

use proptest::prelude::*;

use vcsrun::interactive::prompt::{
    CERTIFICATE_FULL_PROMPT, CERTIFICATE_TEMPORARY_PROMPT, PASSWORD_PROMPT,
};
use vcsrun::interactive::{PromptScanner, PromptType};

/// Noise that cannot accidentally spell a prompt: no `P` and no `(`.
fn noise() -> impl Strategy<Value = String> {
    "[a-z0-9 :.'/\n-]{0,120}"
}

fn prompt() -> impl Strategy<Value = (&'static str, PromptType)> {
    prop_oneof![
        Just((PASSWORD_PROMPT, PromptType::RequestPassword)),
        Just((CERTIFICATE_FULL_PROMPT, PromptType::RequestCertificateFullOptions)),
        Just((
            CERTIFICATE_TEMPORARY_PROMPT,
            PromptType::RequestCertificateNoPermanentOption
        )),
    ]
}

fn detected(input: &[u8]) -> Vec<PromptType> {
    let mut scanner = PromptScanner::new();
    input
        .iter()
        .map(|b| scanner.push(*b))
        .filter(|p| *p != PromptType::None)
        .collect()
}

proptest! {
    #[test]
    fn noise_alone_is_never_a_prompt(text in noise()) {
        prop_assert!(detected(text.as_bytes()).is_empty());
    }

    #[test]
    fn one_prompt_in_noise_is_detected_exactly_once(
        before in noise(),
        (phrase, expected) in prompt(),
        after in noise(),
    ) {
        let input = format!("{before}{phrase}{after}");
        prop_assert_eq!(detected(input.as_bytes()), vec![expected]);
    }

    #[test]
    fn prompts_are_reported_in_stream_order(
        picks in proptest::collection::vec(prompt(), 1..6),
        gap in noise(),
    ) {
        let mut input = String::new();
        for (phrase, _) in &picks {
            input.push_str(phrase);
            input.push_str(&gap);
        }
        let expected: Vec<PromptType> = picks.iter().map(|(_, t)| *t).collect();
        prop_assert_eq!(detected(input.as_bytes()), expected);
    }
}
