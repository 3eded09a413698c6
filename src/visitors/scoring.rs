use crate::visitors::model::{ActionKind, VisitorAction};

pub const MAX_ENGAGEMENT_SCORE: u32 = 100;

/// Points contributed by one action of the given kind.
pub fn action_weight(kind: ActionKind) -> u32 {
    match kind {
        ActionKind::Pageview => 5,
        ActionKind::Click => 10,
        ActionKind::Chat => 30,
        ActionKind::Download => 25,
        ActionKind::Form => 40,
        ActionKind::Scroll | ActionKind::VideoPlay | ActionKind::PdfView => 3,
    }
}

/// Engagement score for a full action history, clamped to `0..=100`.
///
/// Plain sum of per-action weights; no recency decay.
pub fn engagement_score(actions: &[VisitorAction]) -> u32 {
    let total: u32 = actions
        .iter()
        .map(|action| action_weight(action.kind))
        .fold(0, u32::saturating_add);
    total.min(MAX_ENGAGEMENT_SCORE)
}
