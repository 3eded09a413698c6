use crate::visitors::catalog::SITE_PAGES;
use crate::visitors::model::{BehaviorParams, PageView};
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

const MAX_PAGES_PER_SESSION: usize = 3;

/// Synthesizes the page views of one session that ends at `now`.
///
/// The session starts at `entry_page` and continues through up to two more distinct
/// pages. Each view's dwell time splits the pattern's session average, so the views
/// are back-dated to lie end to end and finish at `now`.
pub fn synthesize_session(
    params: &BehaviorParams,
    entry_page: &str,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> Vec<PageView> {
    let page_count = rng.gen_range(1..=MAX_PAGES_PER_SESSION);
    let mut pages = vec![entry_page.to_string()];
    let candidates: Vec<&str> = SITE_PAGES
        .iter()
        .copied()
        .filter(|page| *page != entry_page)
        .collect();
    pages.extend(
        candidates
            .choose_multiple(rng, page_count - 1)
            .map(|page| page.to_string()),
    );

    let divisor = pages.len() as f64;
    let scroll_span = (params.scroll_depth_max - params.scroll_depth_min).max(0.0);
    let drafts: Vec<(String, u32, u32, u32)> = pages
        .into_iter()
        .map(|page| {
            let jitter = 0.7 + rng.gen::<f64>() * 0.6;
            let time_spent = (params.avg_time_spent * jitter / divisor).floor().max(0.0) as u32;
            let scroll = (params.scroll_depth_min + rng.gen::<f64>() * scroll_span)
                .floor()
                .clamp(0.0, 100.0) as u32;
            let interactions =
                (rng.gen::<f64>() * 5.0 * params.interaction_rate).floor().max(0.0) as u32;
            (page, time_spent, scroll, interactions)
        })
        .collect();

    let total: i64 = drafts.iter().map(|(_, spent, _, _)| i64::from(*spent)).sum();
    let mut cursor = now - Duration::seconds(total);
    drafts
        .into_iter()
        .map(|(page, time_spent, scroll_depth, interactions)| {
            let view = PageView {
                page,
                timestamp: cursor,
                time_spent,
                scroll_depth,
                interactions,
            };
            cursor += Duration::seconds(i64::from(time_spent));
            view
        })
        .collect()
}
