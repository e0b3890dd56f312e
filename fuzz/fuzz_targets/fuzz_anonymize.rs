//! Fuzz target for username anonymization.
//!
//! Arbitrary log text, username and marker must never panic, and the username
//! must never survive.

#![no_main]

use arbitrary::Arbitrary;
use et_redact::LogAnonymizer;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    text: &'a str,
    username: &'a str,
    marker: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    let anonymizer = LogAnonymizer::with_marker(input.marker);
    let result = anonymizer.anonymize_detailed(input.text, input.username);

    if input.username.is_empty() {
        assert_eq!(result.output, input.text);
    } else {
        assert!(!result.output.contains(input.username));
        assert_eq!(anonymizer.anonymize(&result.output, input.username), result.output);
    }
});
