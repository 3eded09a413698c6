use crate::visitors::model::VisitorProfile;
use serde::{Deserialize, Serialize};

const HOT_PAGE_LIMIT: usize = 3;
const MAX_CONVERSION_PERCENT: f64 = 95.0;

/// Roster-wide statistics. Recomputed on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorInsights {
    pub total_active: usize,
    /// Mean seed lead score across the roster.
    pub average_engagement: f64,
    /// Most viewed pages, most viewed first.
    pub hot_pages: Vec<String>,
    /// Local visitor's conversion probability as a percentage, capped at 95.
    pub conversion_probability: f64,
}

impl VisitorInsights {
    pub fn empty() -> Self {
        Self {
            total_active: 0,
            average_engagement: 0.0,
            hot_pages: Vec::new(),
            conversion_probability: 0.0,
        }
    }
}

/// Aggregates the roster and the optional local visitor.
pub fn aggregate_insights<'a>(
    roster: impl IntoIterator<Item = &'a VisitorProfile>,
    local: Option<&VisitorProfile>,
) -> VisitorInsights {
    let mut total_active = 0_usize;
    let mut score_sum = 0_u64;
    // Insertion-ordered so ties keep first-seen order after the stable sort.
    let mut page_counts: Vec<(String, usize)> = Vec::new();

    for visitor in roster {
        total_active += 1;
        score_sum += u64::from(visitor.lead_score);
        for view in &visitor.page_views {
            match page_counts.iter_mut().find(|(page, _)| *page == view.page) {
                Some((_, count)) => *count += 1,
                None => page_counts.push((view.page.clone(), 1)),
            }
        }
    }

    page_counts.sort_by(|left, right| right.1.cmp(&left.1));
    let hot_pages = page_counts
        .into_iter()
        .take(HOT_PAGE_LIMIT)
        .map(|(page, _)| page)
        .collect();

    let conversion_probability = local
        .map(|visitor| (visitor.conversion_probability * 100.0).min(MAX_CONVERSION_PERCENT))
        .unwrap_or(0.0);

    VisitorInsights {
        total_active,
        average_engagement: score_sum as f64 / total_active.max(1) as f64,
        hot_pages,
        conversion_probability,
    }
}
