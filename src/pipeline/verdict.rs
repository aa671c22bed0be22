//! Acceptance rule: [`ExtractionResult`] → [`Verdict`].
//!
//! A submission is verified only when **all** of these hold:
//!
//! 1. the model says it is a certificate,
//! 2. its confidence is at least the floor (0.6 by default, inclusive),
//! 3. `company` and `candidate` are each 1..=150 characters after trimming.
//!
//! Any failure yields the same [`UNVERIFIED_REASON`]; callers are never told
//! which check failed.

use crate::pipeline::reply::ExtractionResult;
use serde::{Deserialize, Serialize};

/// The only reason ever attached to [`Verdict::Unverified`].
pub const UNVERIFIED_REASON: &str = "Image is not a certificate or confidence too low";

/// The externally visible outcome of one submission.
///
/// Serialises to the wire shape of `POST /process-image`:
/// `{"status":"verified","Company":..,"Candidate":..}` or
/// `{"status":"unverified","reason":..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Verdict {
    Verified {
        #[serde(rename = "Company")]
        company: String,
        #[serde(rename = "Candidate")]
        candidate: String,
    },
    Unverified {
        reason: String,
    },
}

impl Verdict {
    pub fn unverified() -> Self {
        Verdict::Unverified {
            reason: UNVERIFIED_REASON.to_string(),
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Verdict::Verified { .. })
    }
}

/// Thresholds for the acceptance rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptancePolicy {
    pub min_confidence: f64,
    pub max_field_chars: usize,
}

impl Default for AcceptancePolicy {
    fn default() -> Self {
        Self {
            min_confidence: 0.6,
            max_field_chars: 150,
        }
    }
}

/// Apply the acceptance rule.
pub fn decide(result: &ExtractionResult, policy: &AcceptancePolicy) -> Verdict {
    let company = result.company.trim();
    let candidate = result.candidate.trim();

    let accepted = result.is_certificate
        && result.confidence >= policy.min_confidence
        && field_ok(company, policy.max_field_chars)
        && field_ok(candidate, policy.max_field_chars);

    if !accepted {
        return Verdict::unverified();
    }

    Verdict::Verified {
        company: company.to_string(),
        candidate: candidate.to_string(),
    }
}

fn field_ok(trimmed: &str, max_chars: usize) -> bool {
    (1..=max_chars).contains(&trimmed.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(is_cert: bool, confidence: f64, company: &str, candidate: &str) -> ExtractionResult {
        ExtractionResult {
            is_certificate: is_cert,
            confidence,
            company: company.into(),
            candidate: candidate.into(),
        }
    }

    fn decide_default(r: &ExtractionResult) -> Verdict {
        decide(r, &AcceptancePolicy::default())
    }

    #[test]
    fn verified_fields_are_trimmed() {
        let v = decide_default(&result(true, 0.95, "  Acme Corp\n", "\tJane Doe "));
        assert_eq!(
            v,
            Verdict::Verified {
                company: "Acme Corp".into(),
                candidate: "Jane Doe".into()
            }
        );
    }

    #[test]
    fn confidence_floor_is_inclusive() {
        assert!(decide_default(&result(true, 0.6, "A", "B")).is_verified());
        assert!(!decide_default(&result(true, 0.5999, "A", "B")).is_verified());
    }

    #[test]
    fn field_length_bounds() {
        let max = "x".repeat(150);
        let over = "x".repeat(151);
        assert!(decide_default(&result(true, 0.9, &max, "B")).is_verified());
        assert!(!decide_default(&result(true, 0.9, &over, "B")).is_verified());
        assert!(!decide_default(&result(true, 0.9, "A", &over)).is_verified());
        // Padding does not count towards the limit.
        let padded = format!("   {max}   ");
        assert!(decide_default(&result(true, 0.9, &padded, "B")).is_verified());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let name = "é".repeat(150);
        assert!(decide_default(&result(true, 0.9, &name, "B")).is_verified());
    }

    #[test]
    fn whitespace_only_fields_are_rejected() {
        let blank = " ".repeat(40);
        assert!(!decide_default(&result(true, 0.9, &blank, "B")).is_verified());
        assert!(!decide_default(&result(true, 0.9, "A", "\n\t")).is_verified());
        assert!(!decide_default(&result(true, 0.9, "", "B")).is_verified());
    }

    #[test]
    fn every_failure_has_the_same_reason() {
        let failures = [
            result(false, 0.99, "A", "B"),
            result(true, 0.1, "A", "B"),
            result(true, 0.9, "", "B"),
            result(true, 0.9, "A", &"x".repeat(200)),
        ];
        for r in &failures {
            assert_eq!(decide_default(r), Verdict::unverified(), "{r:?}");
        }
    }

    #[test]
    fn serialises_to_wire_shape() {
        let v = Verdict::Verified {
            company: "Acme Corp".into(),
            candidate: "Jane Doe".into(),
        };
        assert_eq!(
            serde_json::to_value(&v).unwrap(),
            serde_json::json!({"status":"verified","Company":"Acme Corp","Candidate":"Jane Doe"})
        );
        assert_eq!(
            serde_json::to_value(Verdict::unverified()).unwrap(),
            serde_json::json!({
                "status":"unverified",
                "reason":"Image is not a certificate or confidence too low"
            })
        );
    }
}
