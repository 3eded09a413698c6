//! Rule-based next-page prediction.
//!
//! A fixed decision table keyed on the current page. Thresholds and probabilities are
//! product constants, not learned values.

use crate::visitors::catalog::{
    is_senior_role, CASE_STUDIES_PAGE, CONTACT_PAGE, LANDING_PAGE, PRODUCT_PAGE,
};
use crate::visitors::model::{BehaviorPattern, PredictedNavigation, VisitorProfile};

const MAX_PREDICTIONS: usize = 3;
const HIGH_INTENT_SCORE: u32 = 50;

/// Predicts the next pages for a visitor.
pub fn predict_navigation(visitor: &VisitorProfile) -> Vec<PredictedNavigation> {
    predict_for(
        &visitor.current_page,
        &visitor.role,
        visitor.behavior_pattern,
        visitor.lead_score,
    )
}

/// Predicts the next pages from the attributes the decision table reads.
///
/// Results are sorted by descending probability and hold at most three entries.
/// Pages outside the landing and product pages yield no predictions.
pub fn predict_for(
    current_page: &str,
    role: &str,
    pattern: BehaviorPattern,
    lead_score: u32,
) -> Vec<PredictedNavigation> {
    let mut predictions = match current_page {
        LANDING_PAGE => landing_predictions(role),
        PRODUCT_PAGE => vec![product_prediction(pattern, lead_score)],
        _ => Vec::new(),
    };
    predictions.sort_by(|left, right| right.probability.cmp(&left.probability));
    predictions.truncate(MAX_PREDICTIONS);
    predictions
}

fn landing_predictions(role: &str) -> Vec<PredictedNavigation> {
    let product = if is_senior_role(role) {
        prediction(
            PRODUCT_PAGE,
            78,
            format!("As a {role}, likely to review product capabilities for a team decision"),
        )
    } else {
        prediction(
            PRODUCT_PAGE,
            65,
            "Most first-time visitors continue to the product overview",
        )
    };
    vec![
        product,
        prediction(
            CASE_STUDIES_PAGE,
            25,
            "Looking for proof from similar companies",
        ),
    ]
}

fn product_prediction(pattern: BehaviorPattern, lead_score: u32) -> PredictedNavigation {
    match pattern {
        BehaviorPattern::DecisionMaker => prediction(
            CONTACT_PAGE,
            82,
            "Decision makers tend to reach out once the product fits",
        ),
        BehaviorPattern::Researcher => prediction(
            CASE_STUDIES_PAGE,
            74,
            "Researchers compare outcomes before going further",
        ),
        _ if lead_score > HIGH_INTENT_SCORE => prediction(
            CONTACT_PAGE,
            75,
            "High engagement so far suggests readiness to get in touch",
        ),
        _ => prediction(
            CASE_STUDIES_PAGE,
            60,
            "Still evaluating; case studies are the usual next step",
        ),
    }
}

fn prediction(page: &str, probability: u32, reason: impl Into<String>) -> PredictedNavigation {
    PredictedNavigation {
        next_page: page.to_string(),
        probability,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visitors::catalog::SITE_PAGES;

    const ROLES: [&str; 4] = [
        "Sales Department Head",
        "Software Engineer",
        "IT Manager",
        "Dispatcher",
    ];

    #[test]
    fn senior_role_on_landing_page() {
        let predictions = predict_for(
            LANDING_PAGE,
            "Sales Department Head",
            BehaviorPattern::Explorer,
            10,
        );
        assert_eq!(predictions[0].next_page, PRODUCT_PAGE);
        assert_eq!(predictions[0].probability, 78);
        assert!(predictions[0].reason.contains("Sales Department Head"));
        assert_eq!(predictions[1].next_page, CASE_STUDIES_PAGE);
        assert_eq!(predictions[1].probability, 25);
    }

    #[test]
    fn generic_role_on_landing_page() {
        let predictions =
            predict_for(LANDING_PAGE, "Software Engineer", BehaviorPattern::Researcher, 90);
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].probability, 65);
        assert_eq!(predictions[1].probability, 25);
    }

    #[test]
    fn decision_maker_on_product_page_ignores_score() {
        for score in [0, 50, 51, 100] {
            let predictions =
                predict_for(PRODUCT_PAGE, "Dispatcher", BehaviorPattern::DecisionMaker, score);
            assert_eq!(predictions.len(), 1);
            assert_eq!(predictions[0].next_page, CONTACT_PAGE);
            assert_eq!(predictions[0].probability, 82);
        }
    }

    #[test]
    fn researcher_on_product_page() {
        let predictions = predict_for(PRODUCT_PAGE, "IT Manager", BehaviorPattern::Researcher, 99);
        assert_eq!(predictions[0].next_page, CASE_STUDIES_PAGE);
        assert_eq!(predictions[0].probability, 74);
    }

    #[test]
    fn score_threshold_is_strict() {
        for pattern in [BehaviorPattern::Explorer, BehaviorPattern::CasualBrowser] {
            let at = predict_for(PRODUCT_PAGE, "Dispatcher", pattern, 50);
            assert_eq!(at[0].next_page, CASE_STUDIES_PAGE);
            assert_eq!(at[0].probability, 60);
            let above = predict_for(PRODUCT_PAGE, "Dispatcher", pattern, 51);
            assert_eq!(above[0].next_page, CONTACT_PAGE);
            assert_eq!(above[0].probability, 75);
        }
    }

    #[test]
    fn table_is_sorted_bounded_and_empty_elsewhere() {
        for page in SITE_PAGES.iter().copied().chain(["/unknown", ""]) {
            for role in ROLES {
                for pattern in BehaviorPattern::ALL {
                    for score in [0, 25, 50, 51, 75, 100] {
                        let predictions = predict_for(page, role, pattern, score);
                        assert!(predictions.len() <= 3);
                        for pair in predictions.windows(2) {
                            assert!(pair[0].probability > pair[1].probability);
                        }
                        if page != LANDING_PAGE && page != PRODUCT_PAGE {
                            assert!(predictions.is_empty(), "{page}");
                        } else {
                            assert!(!predictions.is_empty());
                        }
                    }
                }
            }
        }
    }
}
