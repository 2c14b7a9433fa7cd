use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::genre::Reading;

/// A digit string from the OCR engine with its confidence (0-100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrCandidate {
    pub text: String,
    #[serde(default)]
    pub confidence: f32,
}

impl OcrCandidate {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Turns the OCR output for one experience counter into a reading.
///
/// The counter holds a single number, so several candidates mean the
/// region was misread. Anything other than exactly one all-digit
/// candidate is unreadable.
pub fn parse_exp(candidates: &[OcrCandidate]) -> Reading {
    match candidates {
        [] => Reading::Unrecognized,
        [only] => {
            let text = only.text.trim();
            if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
                debug!(text, "experience candidate is not a number");
                return Reading::Unrecognized;
            }
            text.parse::<u32>().map_or(Reading::Unrecognized, Reading::Recognized)
        }
        many => {
            warn!(count = many.len(), "more than one number found in a genre icon");
            Reading::Unrecognized
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_number() {
        assert_eq!(parse_exp(&[OcrCandidate::new("27", 91.0)]), Reading::Recognized(27));
        assert_eq!(parse_exp(&[OcrCandidate::new(" 07 ", 50.0)]), Reading::Recognized(7));
    }

    #[test]
    fn test_unreadable_cases() {
        assert_eq!(parse_exp(&[]), Reading::Unrecognized);
        assert_eq!(parse_exp(&[OcrCandidate::new("2a", 80.0)]), Reading::Unrecognized);
        assert_eq!(parse_exp(&[OcrCandidate::new("", 80.0)]), Reading::Unrecognized);
        assert_eq!(
            parse_exp(&[OcrCandidate::new("1", 80.0), OcrCandidate::new("2", 80.0)]),
            Reading::Unrecognized
        );
        assert_eq!(
            parse_exp(&[OcrCandidate::new("99999999999", 80.0)]),
            Reading::Unrecognized
        );
    }
}
