use crate::visitors::catalog::SITE_PAGES;
use crate::visitors::model::TrafficSource;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

const HOURLY_BASE_VISITORS: f64 = 40.0;

/// Randomized dashboard aggregates. Display data only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessMetrics {
    pub generated_at: DateTime<Utc>,
    pub real_time_stats: RealTimeStats,
    pub hourly_data: Vec<HourlyStat>,
    pub daily_data: Vec<DailyStat>,
    pub top_pages: Vec<PageStat>,
    pub lead_sources: Vec<LeadSourceStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealTimeStats {
    pub active_visitors: u32,
    pub page_views: u32,
    /// Percent.
    pub conversion_rate: f64,
    /// Seconds.
    pub avg_session_duration: u32,
    /// Percent.
    pub bounce_rate: f64,
    pub new_leads: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyStat {
    pub hour: u32,
    pub visitors: u32,
    pub page_views: u32,
    pub conversions: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStat {
    pub date: NaiveDate,
    pub visitors: u32,
    pub leads: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStat {
    pub page: String,
    pub views: u32,
    /// Seconds.
    pub avg_time_on_page: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSourceStat {
    pub source: TrafficSource,
    pub leads: u32,
    pub percentage: f64,
}

/// Generates a fresh metrics snapshot. Every call is independent of the last.
pub fn synthesize_business_metrics(rng: &mut impl Rng, now: DateTime<Utc>) -> BusinessMetrics {
    BusinessMetrics {
        generated_at: now,
        real_time_stats: real_time_stats(rng),
        hourly_data: hourly_data(rng),
        daily_data: daily_data(rng, now),
        top_pages: top_pages(rng),
        lead_sources: lead_sources(rng),
    }
}

fn real_time_stats(rng: &mut impl Rng) -> RealTimeStats {
    RealTimeStats {
        active_visitors: rng.gen_range(8..=22),
        page_views: rng.gen_range(450..=650),
        conversion_rate: round_tenths(rng.gen_range(2.5..4.5)),
        avg_session_duration: rng.gen_range(120..=300),
        bounce_rate: round_tenths(rng.gen_range(35.0..55.0)),
        new_leads: rng.gen_range(3..=12),
    }
}

fn hourly_data(rng: &mut impl Rng) -> Vec<HourlyStat> {
    (0..24)
        .map(|hour| {
            let visitors =
                (HOURLY_BASE_VISITORS * diurnal_multiplier(hour) * rng.gen_range(0.8..1.2))
                    .round() as u32;
            let page_views = (visitors as f64 * rng.gen_range(2.0..4.0)).round() as u32;
            let conversions = (visitors as f64 * rng.gen_range(0.02..0.05)).round() as u32;
            HourlyStat {
                hour,
                visitors,
                page_views,
                conversions,
            }
        })
        .collect()
}

fn diurnal_multiplier(hour: u32) -> f64 {
    match hour {
        7..=9 => 0.7,
        10..=17 => 1.1,
        18..=21 => 0.8,
        _ => 0.35,
    }
}

fn daily_data(rng: &mut impl Rng, now: DateTime<Utc>) -> Vec<DailyStat> {
    let today = now.date_naive();
    (0..7)
        .rev()
        .map(|days_ago| {
            let visitors = rng.gen_range(180..=420);
            DailyStat {
                date: today - Duration::days(days_ago),
                visitors,
                leads: (visitors as f64 * rng.gen_range(0.02..0.06)).round() as u32,
            }
        })
        .collect()
}

fn top_pages(rng: &mut impl Rng) -> Vec<PageStat> {
    let mut pages: Vec<PageStat> = SITE_PAGES
        .iter()
        .map(|page| PageStat {
            page: page.to_string(),
            views: rng.gen_range(40..=400),
            avg_time_on_page: rng.gen_range(20..=240),
        })
        .collect();
    pages.sort_by(|left, right| right.views.cmp(&left.views));
    pages
}

fn lead_sources(rng: &mut impl Rng) -> Vec<LeadSourceStat> {
    let counts: Vec<(TrafficSource, u32)> = TrafficSource::ALL
        .iter()
        .map(|source| (*source, rng.gen_range(5..=60)))
        .collect();
    let total: u32 = counts.iter().map(|(_, leads)| *leads).sum();
    counts
        .into_iter()
        .map(|(source, leads)| LeadSourceStat {
            source,
            leads,
            percentage: if total == 0 {
                0.0
            } else {
                round_tenths(leads as f64 * 100.0 / total as f64)
            },
        })
        .collect()
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
