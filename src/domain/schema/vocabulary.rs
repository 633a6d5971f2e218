//! Confirmation vocabulary: classifies a reply to "Does this look correct?".

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Replies that contain a rejection word but mean "nothing to change".
/// Punctuation between the words breaks the match, so "no, change the
/// reason" still rejects.
static ALL_CLEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:no\s+(?:more\s+|other\s+)?(?:(?:changes|corrections|edits|issues|problems|mistakes|updates)(?:\s+(?:needed|required|necessary))?|(?:problem|issue)\b|(?:change|correction|edit|update)\s+(?:needed|required|necessary))|nothing\s+(?:to\s+(?:fix|change|edit|correct|update)|wrong|needs\s+(?:fixing|changing))|don'?t\s+(?:change|fix|edit)\s+anything)\b",
    )
    .expect("all-clear regex is valid")
});

/// Words allowed between a negation and the approval it negates.
const INTENSIFIERS: [&str; 4] = ["really", "very", "exactly", "quite"];

/// Classified answer to the confirmation question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationReply {
    Affirm,
    Reject,
    Ambiguous,
}

/// Phrases that signal approval, rejection or hesitation.
///
/// Matching is case-insensitive on whole words or phrases. A hedge makes
/// the reply ambiguous; otherwise any negative phrase wins over
/// affirmative ones. A negation directly before an affirmative phrase
/// ("not good", "doesn't look good") counts as negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationVocabulary {
    pub affirmative: Vec<String>,
    pub negative: Vec<String>,
    pub hedges: Vec<String>,
    pub negations: Vec<String>,
}

impl Default for ConfirmationVocabulary {
    fn default() -> Self {
        let owned = |words: &[&str]| -> Vec<String> { words.iter().map(|w| w.to_string()).collect() };
        Self {
            affirmative: owned(&[
                "yes",
                "y",
                "yeah",
                "yep",
                "yup",
                "correct",
                "confirm",
                "confirmed",
                "looks good",
                "look good",
                "looks right",
                "that's right",
                "thats right",
                "ok",
                "okay",
                "sure",
                "perfect",
                "good",
                "great",
                "go ahead",
                "submit",
                "create it",
                "approve",
                "approved",
            ]),
            negative: owned(&[
                "no",
                "n",
                "nope",
                "nah",
                "wrong",
                "incorrect",
                "not quite",
                "not correct",
                "not right",
                "change",
                "fix",
                "edit",
                "update",
                "modify",
                "mistake",
            ]),
            hedges: owned(&[
                "maybe",
                "perhaps",
                "not sure",
                "unsure",
                "i think so",
                "possibly",
                "probably",
                "hmm",
                "dunno",
                "don't know",
            ]),
            negations: owned(&[
                "not", "don't", "dont", "doesn't", "doesnt", "isn't", "isnt", "never", "can't", "cant", "won't",
                "wont", "didn't", "didnt", "shouldn't",
            ]),
        }
    }
}

impl ConfirmationVocabulary {
    /// Classifies a free-text reply.
    pub fn classify(&self, reply: &str) -> ConfirmationReply {
        let lowered = reply.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'");
        let all_clear = ALL_CLEAR.is_match(&lowered);
        let text = normalize_phrase_text(&ALL_CLEAR.replace_all(&lowered, " "));
        if text.trim().is_empty() {
            return if all_clear {
                ConfirmationReply::Affirm
            } else {
                ConfirmationReply::Ambiguous
            };
        }

        let mentions = |phrases: &[String]| phrases.iter().any(|p| contains_phrase(&text, p));

        if mentions(&self.hedges) {
            ConfirmationReply::Ambiguous
        } else if mentions(&self.negative) || self.negates_approval(&text) {
            ConfirmationReply::Reject
        } else if all_clear || mentions(&self.affirmative) {
            ConfirmationReply::Affirm
        } else {
            ConfirmationReply::Ambiguous
        }
    }

    fn negates_approval(&self, text: &str) -> bool {
        self.negations.iter().any(|negation| {
            self.affirmative.iter().any(|approval| {
                contains_phrase(text, &format!("{} {}", negation, approval))
                    || INTENSIFIERS
                        .iter()
                        .any(|word| contains_phrase(text, &format!("{} {} {}", negation, word, approval)))
            })
        })
    }
}

/// Lower-cases, folds curly apostrophes and turns punctuation into spaces,
/// returning the text padded with one space at each end.
pub(crate) fn normalize_phrase_text(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '\u{2019}' | '\u{2018}' => '\'',
            c if c.is_alphanumeric() || c == '\'' => c,
            _ => ' ',
        })
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    format!(" {} ", words.join(" "))
}

/// Whole-phrase containment on text produced by [`normalize_phrase_text`].
pub(crate) fn contains_phrase(normalized: &str, phrase: &str) -> bool {
    let needle = normalize_phrase_text(phrase);
    !needle.trim().is_empty() && normalized.contains(&needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> ConfirmationReply {
        ConfirmationVocabulary::default().classify(text)
    }

    mod affirmations {
        use super::*;

        #[test]
        fn plain_yes_affirms() {
            assert_eq!(classify("yes"), ConfirmationReply::Affirm);
            assert_eq!(classify("Yes!"), ConfirmationReply::Affirm);
        }

        #[test]
        fn phrases_affirm() {
            assert_eq!(classify("Looks good to me"), ConfirmationReply::Affirm);
            assert_eq!(classify("That\u{2019}s right"), ConfirmationReply::Affirm);
        }

        #[test]
        fn nothing_to_change_affirms() {
            assert_eq!(classify("looks good, no changes needed"), ConfirmationReply::Affirm);
            assert_eq!(classify("yes, nothing to fix"), ConfirmationReply::Affirm);
            assert_eq!(classify("No changes"), ConfirmationReply::Affirm);
            assert_eq!(classify("no problem, submit it"), ConfirmationReply::Affirm);
            assert_eq!(classify("Yes, don\u{2019}t change anything"), ConfirmationReply::Affirm);
        }
    }

    mod rejections {
        use super::*;

        #[test]
        fn plain_no_rejects() {
            assert_eq!(classify("no"), ConfirmationReply::Reject);
            assert_eq!(classify("Nope."), ConfirmationReply::Reject);
        }

        #[test]
        fn negative_marker_wins_over_affirmative() {
            assert_eq!(classify("yes but the street is wrong"), ConfirmationReply::Reject);
            assert_eq!(classify("that's not right"), ConfirmationReply::Reject);
        }

        #[test]
        fn change_requests_reject() {
            assert_eq!(classify("please change the end date"), ConfirmationReply::Reject);
            assert_eq!(classify("no, change the reason"), ConfirmationReply::Reject);
        }

        #[test]
        fn negated_approval_rejects() {
            assert_eq!(classify("not good"), ConfirmationReply::Reject);
            assert_eq!(classify("that's not okay"), ConfirmationReply::Reject);
            assert_eq!(classify("don't submit it"), ConfirmationReply::Reject);
            assert_eq!(classify("doesn't look good"), ConfirmationReply::Reject);
            assert_eq!(classify("It isn\u{2019}t really correct"), ConfirmationReply::Reject);
        }
    }

    mod ambiguity {
        use super::*;

        #[test]
        fn hedges_are_ambiguous() {
            assert_eq!(classify("maybe"), ConfirmationReply::Ambiguous);
            assert_eq!(classify("I'm not sure"), ConfirmationReply::Ambiguous);
        }

        #[test]
        fn unrelated_text_is_ambiguous() {
            assert_eq!(classify("what about parking?"), ConfirmationReply::Ambiguous);
            assert_eq!(classify(""), ConfirmationReply::Ambiguous);
        }

        #[test]
        fn words_match_whole_not_partial() {
            // "nothing" contains "no" but is not a rejection
            assert_eq!(classify("nothing"), ConfirmationReply::Ambiguous);
        }
    }

    #[test]
    fn contains_phrase_matches_whole_words() {
        let text = normalize_phrase_text("The start date, please");
        assert!(contains_phrase(&text, "start date"));
        assert!(!contains_phrase(&text, "art"));
    }
}
