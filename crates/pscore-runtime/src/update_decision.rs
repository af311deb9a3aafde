use pscore_fields::format_number;
use pscore_jira::ASSIGNEE_PLACEHOLDER;

use crate::scoring::ScoreResult;

/// Scores closer than this are considered equal.
pub const SCORE_EPSILON: f64 = 0.0001;

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateDecision {
    Unchanged,
    Update {
        new_score: f64,
        /// Comment text still containing the `[assignee]` placeholder.
        comment_text: String,
        /// Always `false` in practice: a null current score with a computed `0`
        /// is already `Unchanged`. Honoured anyway if the equality rule changes.
        suppress_comment: bool,
    },
}

/// A null current score compares as `0`.
pub fn decide_update(result: &ScoreResult) -> UpdateDecision {
    let current = result.current_score.unwrap_or(0.0);
    if (current - result.computed_score).abs() < SCORE_EPSILON {
        return UpdateDecision::Unchanged;
    }
    UpdateDecision::Update {
        new_score: result.computed_score,
        comment_text: build_comment_text(result),
        suppress_comment: result.should_skip_comment,
    }
}

pub fn build_comment_text(result: &ScoreResult) -> String {
    format!(
        "{ASSIGNEE_PLACEHOLDER} updated priority from {} to {} ({})",
        format_number(result.current_score),
        format_number(Some(result.computed_score)),
        result.inputs_breakdown()
    )
}

#[cfg(test)]
mod tests {
    use super::{build_comment_text, decide_update, UpdateDecision};
    use crate::scoring::{score_engineering, score_product, EngineeringInputs, ProductInputs};

    fn product_inputs() -> ProductInputs {
        ProductInputs {
            reach: Some(8.0),
            impact: Some(2.0),
            confidence: Some(0.8),
            effort: Some(4.0),
        }
    }

    #[test]
    fn unit_decide_update_is_noop_within_epsilon() {
        let result = score_product(Some(3.00001), product_inputs());
        assert_eq!(decide_update(&result), UpdateDecision::Unchanged);
    }

    #[test]
    fn unit_decide_update_treats_null_current_as_zero() {
        let result = score_product(None, ProductInputs::default());
        assert_eq!(result.computed_score, 0.0);
        assert!(result.should_skip_comment);
        assert_eq!(decide_update(&result), UpdateDecision::Unchanged);
    }

    #[test]
    fn regression_suppressed_comment_never_reaches_an_update() {
        let values = [None, Some(0.0), Some(-0.4), Some(1.0), Some(4.0)];
        for current in [None, Some(0.0), Some(12.0)] {
            for reach in values {
                for effort in values {
                    let result = score_product(
                        current,
                        ProductInputs {
                            reach,
                            impact: Some(2.0),
                            confidence: Some(1.0),
                            effort,
                        },
                    );
                    if let UpdateDecision::Update {
                        suppress_comment, ..
                    } = decide_update(&result)
                    {
                        assert!(!suppress_comment, "{result:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn functional_decide_update_builds_product_comment() {
        let result = score_product(None, product_inputs());
        assert_eq!(
            decide_update(&result),
            UpdateDecision::Update {
                new_score: 3.0,
                comment_text: "[assignee] updated priority from null to 3 (Reach=8, Impact=2, Confidence=0.8, Effort=4)".to_string(),
                suppress_comment: false,
            }
        );
    }

    #[test]
    fn functional_decide_update_keeps_comment_when_inputs_go_missing() {
        let result = score_engineering(Some(667.0), EngineeringInputs::default());
        let UpdateDecision::Update {
            new_score,
            comment_text,
            suppress_comment,
        } = decide_update(&result)
        else {
            panic!("expected update");
        };
        assert_eq!(new_score, 0.0);
        assert!(!suppress_comment);
        assert!(comment_text.starts_with("[assignee] updated priority from 667 to 0 (Business Weight=null"));
    }

    #[test]
    fn regression_build_comment_text_never_renders_negative_zero() {
        let result = score_product(
            Some(1.0),
            ProductInputs {
                reach: Some(-0.1),
                impact: Some(1.0),
                confidence: Some(1.0),
                effort: Some(1.0),
            },
        );
        assert!(build_comment_text(&result).contains(" to 0 ("));
    }
}
