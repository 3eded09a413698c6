use crate::visitors::catalog::{
    behavior_params, interests_for_role, is_senior_role, ReferenceTables,
};
use crate::visitors::model::{BehaviorPattern, Location, VisitorProfile};
use crate::visitors::session::synthesize_session;
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

const SENIOR_ROLE_MULTIPLIER: f64 = 1.3;
const MAX_ENTRY_AGE_MS: i64 = 60 * 60 * 1000;

/// Builds fully populated synthetic visitors from the reference tables.
#[derive(Debug, Clone, Default)]
pub struct ProfileGenerator {
    tables: ReferenceTables,
}

impl ProfileGenerator {
    pub fn new() -> Self {
        Self {
            tables: ReferenceTables::new(),
        }
    }

    /// Generates one visitor whose session ends at `now`.
    pub fn generate(&self, rng: &mut impl Rng, now: DateTime<Utc>) -> VisitorProfile {
        let industry = *self.tables.industries.choose(rng);
        let company = industry
            .companies
            .choose(rng)
            .copied()
            .unwrap_or("Independent");
        let role = industry.roles.choose(rng).copied().unwrap_or("Visitor");
        let location = self
            .tables
            .locations
            .choose(rng)
            .cloned()
            .unwrap_or_else(default_location);
        let device_type = *self.tables.devices.choose(rng);
        let source = *self.tables.sources.choose(rng);
        let behavior_pattern = BehaviorPattern::ALL
            .choose(rng)
            .copied()
            .unwrap_or(BehaviorPattern::Explorer);
        let params = behavior_params(behavior_pattern);
        let lead_score = seed_lead_score(rng, role, behavior_pattern);
        let entry_page = *self.tables.entry_pages.choose(rng);
        let page_views = synthesize_session(&params, entry_page, now, rng);
        let first_view = page_views.first().map_or(now, |view| view.timestamp);
        let entry_time = entry_time_before(rng, first_view, now);
        let current_page = page_views
            .last()
            .map(|view| view.page.clone())
            .unwrap_or_else(|| entry_page.to_string());

        VisitorProfile {
            id: random_id(rng),
            company: company.to_string(),
            industry: industry.name.to_string(),
            role: role.to_string(),
            location,
            device_type,
            source,
            behavior_pattern,
            interests: interests_for_role(role),
            lead_score,
            entry_time,
            page_views,
            actions: Vec::new(),
            conversion_probability: params.conversion_probability,
            current_page,
        }
    }
}

/// Inherent-interest score assigned at generation time, in `0..=100`.
///
/// `floor(base * role * behavior)` with `base` drawn from `20..60`.
pub fn seed_lead_score(rng: &mut impl Rng, role: &str, pattern: BehaviorPattern) -> u32 {
    let base = rng.gen_range(20..60) as f64;
    let role_multiplier = if is_senior_role(role) {
        SENIOR_ROLE_MULTIPLIER
    } else {
        1.0
    };
    let score = (base * role_multiplier * pattern.score_multiplier()).floor();
    score.clamp(0.0, 100.0) as u32
}

/// Arrival instant at or before the first page view, at most an hour before `now`.
fn entry_time_before(
    rng: &mut impl Rng,
    first_view: DateTime<Utc>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let remaining_ms = MAX_ENTRY_AGE_MS - (now - first_view).num_milliseconds();
    if remaining_ms <= 0 {
        return first_view;
    }
    first_view - Duration::milliseconds(rng.gen_range(0..remaining_ms))
}

fn random_id(rng: &mut impl Rng) -> Uuid {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid()
}

fn default_location() -> Location {
    Location {
        city: "Tokyo".to_string(),
        region: "Kanto".to_string(),
        country: "Japan".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visitors::catalog::{INDUSTRIES, SITE_PAGES};
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 10, 30, 0).unwrap()
    }

    #[test]
    fn role_belongs_to_industry() {
        let generator = ProfileGenerator::new();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let profile = generator.generate(&mut rng, now());
            let industry = INDUSTRIES
                .iter()
                .find(|industry| industry.name == profile.industry)
                .expect("known industry");
            assert!(industry.roles.contains(&profile.role.as_str()));
            assert!(industry.companies.contains(&profile.company.as_str()));
        }
    }

    #[test]
    fn generated_profile_is_consistent() {
        let generator = ProfileGenerator::new();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let profile = generator.generate(&mut rng, now());
            assert!(profile.lead_score <= 100);
            assert!(profile.entry_time <= now());
            assert!(profile.entry_time > now() - Duration::hours(1));
            assert!(profile.entry_time <= profile.page_views[0].timestamp);
            assert!(!profile.page_views.is_empty() && profile.page_views.len() <= 3);
            assert_eq!(
                profile.current_page,
                profile.page_views.last().map(|view| view.page.clone()).unwrap()
            );
            assert!(profile.actions.is_empty());
            assert!(!profile.interests.is_empty());
            assert_eq!(
                profile.conversion_probability,
                behavior_params(profile.behavior_pattern).conversion_probability
            );
            for view in &profile.page_views {
                assert!(SITE_PAGES.contains(&view.page.as_str()));
            }
        }
    }

    #[test]
    fn entry_time_never_follows_first_view() {
        let mut rng = StdRng::seed_from_u64(4);
        let first_view = now() - Duration::minutes(10);
        for _ in 0..1_000 {
            let entry = entry_time_before(&mut rng, first_view, now());
            assert!(entry <= first_view);
            assert!(entry > now() - Duration::hours(1));
        }
        let stale = now() - Duration::hours(2);
        assert_eq!(entry_time_before(&mut rng, stale, now()), stale);
    }

    #[test]
    fn ids_are_unique() {
        let generator = ProfileGenerator::new();
        let mut rng = StdRng::seed_from_u64(5);
        let ids: HashSet<Uuid> = (0..1_000)
            .map(|_| generator.generate(&mut rng, now()).id)
            .collect();
        assert_eq!(ids.len(), 1_000);
    }

    #[test]
    fn same_seed_same_profile() {
        let generator = ProfileGenerator::new();
        let left = generator.generate(&mut StdRng::seed_from_u64(99), now());
        let right = generator.generate(&mut StdRng::seed_from_u64(99), now());
        assert_eq!(left, right);
    }

    #[test]
    fn seed_score_ranges_follow_multipliers() {
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..1_000 {
            let casual = seed_lead_score(&mut rng, "Software Engineer", BehaviorPattern::CasualBrowser);
            assert!((14..=41).contains(&casual), "casual {casual}");
            let explorer = seed_lead_score(&mut rng, "Software Engineer", BehaviorPattern::Explorer);
            assert!((20..60).contains(&explorer), "explorer {explorer}");
            let senior = seed_lead_score(&mut rng, "Sales Department Head", BehaviorPattern::DecisionMaker);
            assert!((36..=100).contains(&senior), "senior {senior}");
        }
    }

    #[test]
    fn behavior_patterns_are_uniform() {
        let generator = ProfileGenerator::new();
        let mut rng = StdRng::seed_from_u64(8);
        let draws = 10_000;
        let mut counts = std::collections::HashMap::new();
        for _ in 0..draws {
            let profile = generator.generate(&mut rng, now());
            *counts.entry(profile.behavior_pattern).or_insert(0_usize) += 1;
        }
        for pattern in BehaviorPattern::ALL {
            let share = counts.get(&pattern).copied().unwrap_or(0) as f64 / draws as f64;
            assert!((share - 0.25).abs() < 0.02, "{pattern:?} share {share}");
        }
    }
}
