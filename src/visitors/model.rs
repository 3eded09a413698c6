use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Device class reported for a visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
}

impl DeviceType {
    /// Classifies a viewport width in CSS pixels.
    pub fn from_viewport_width(width: u32) -> Self {
        if width < 768 {
            DeviceType::Mobile
        } else if width < 1024 {
            DeviceType::Tablet
        } else {
            DeviceType::Desktop
        }
    }
}

/// Acquisition channel of a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficSource {
    Direct,
    Search,
    Social,
    Referral,
    Email,
}

impl TrafficSource {
    pub const ALL: [TrafficSource; 5] = [
        TrafficSource::Direct,
        TrafficSource::Search,
        TrafficSource::Social,
        TrafficSource::Referral,
        TrafficSource::Email,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TrafficSource::Direct => "direct",
            TrafficSource::Search => "search",
            TrafficSource::Social => "social",
            TrafficSource::Referral => "referral",
            TrafficSource::Email => "email",
        }
    }
}

/// Browsing style that parameterizes session synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorPattern {
    Explorer,
    Researcher,
    DecisionMaker,
    CasualBrowser,
}

impl BehaviorPattern {
    pub const ALL: [BehaviorPattern; 4] = [
        BehaviorPattern::Explorer,
        BehaviorPattern::Researcher,
        BehaviorPattern::DecisionMaker,
        BehaviorPattern::CasualBrowser,
    ];

    /// Multiplier applied to the seed lead score.
    pub fn score_multiplier(&self) -> f64 {
        match self {
            BehaviorPattern::DecisionMaker => 1.4,
            BehaviorPattern::Researcher => 1.2,
            BehaviorPattern::Explorer => 1.0,
            BehaviorPattern::CasualBrowser => 0.7,
        }
    }
}

/// Session parameters attached to a behavior pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorParams {
    /// Mean dwell time for a whole session, in seconds.
    pub avg_time_spent: f64,
    pub scroll_depth_min: f64,
    pub scroll_depth_max: f64,
    /// Scales the 0..5 interaction draw per page.
    pub interaction_rate: f64,
    pub conversion_probability: f64,
}

/// City/region/country tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub region: String,
    pub country: String,
}

/// One page in a visitor's session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub page: String,
    pub timestamp: DateTime<Utc>,
    /// Seconds spent on the page.
    pub time_spent: u32,
    /// 0..=100
    pub scroll_depth: u32,
    pub interactions: u32,
}

/// Tag of a recorded visitor action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Pageview,
    Click,
    Scroll,
    Chat,
    Download,
    Form,
    VideoPlay,
    PdfView,
}

/// Action performed by the local visitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitorAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub timestamp: DateTime<Utc>,
    pub page: String,
    pub element: Option<String>,
    pub details: Option<Value>,
}

impl VisitorAction {
    pub fn new(kind: ActionKind, page: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            timestamp,
            page: page.into(),
            element: None,
            details: None,
        }
    }

    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Coarse bucket of a lead score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadTier {
    /// Score 0-29
    Cold,
    /// Score 30-59
    Warm,
    /// Score 60-79
    Hot,
    /// Score 80+
    Qualified,
}

impl LeadTier {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=29 => LeadTier::Cold,
            30..=59 => LeadTier::Warm,
            60..=79 => LeadTier::Hot,
            _ => LeadTier::Qualified,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LeadTier::Cold => "Cold",
            LeadTier::Warm => "Warm",
            LeadTier::Hot => "Hot",
            LeadTier::Qualified => "Qualified",
        }
    }
}

/// Synthetic or observed website visitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorProfile {
    pub id: Uuid,
    pub company: String,
    pub industry: String,
    pub role: String,
    pub location: Location,
    pub device_type: DeviceType,
    pub source: TrafficSource,
    pub behavior_pattern: BehaviorPattern,
    pub interests: Vec<String>,
    /// 0..=100. Seeded at generation; recomputed from `actions` for the local visitor.
    pub lead_score: u32,
    pub entry_time: DateTime<Utc>,
    pub page_views: Vec<PageView>,
    pub actions: Vec<VisitorAction>,
    pub conversion_probability: f64,
    pub current_page: String,
}

impl VisitorProfile {
    pub fn lead_tier(&self) -> LeadTier {
        LeadTier::from_score(self.lead_score)
    }

    /// Total dwell time across all page views, in seconds.
    pub fn total_time_spent(&self) -> u64 {
        self.page_views
            .iter()
            .map(|view| u64::from(view.time_spent))
            .sum()
    }
}

/// Likely next page for a visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictedNavigation {
    pub next_page: String,
    /// 0..=100
    pub probability: u32,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_breakpoints() {
        assert_eq!(DeviceType::from_viewport_width(375), DeviceType::Mobile);
        assert_eq!(DeviceType::from_viewport_width(767), DeviceType::Mobile);
        assert_eq!(DeviceType::from_viewport_width(768), DeviceType::Tablet);
        assert_eq!(DeviceType::from_viewport_width(1023), DeviceType::Tablet);
        assert_eq!(DeviceType::from_viewport_width(1024), DeviceType::Desktop);
    }

    #[test]
    fn lead_tier_boundaries() {
        assert_eq!(LeadTier::from_score(0), LeadTier::Cold);
        assert_eq!(LeadTier::from_score(30), LeadTier::Warm);
        assert_eq!(LeadTier::from_score(79), LeadTier::Hot);
        assert_eq!(LeadTier::from_score(100), LeadTier::Qualified);
    }

    #[test]
    fn action_serializes_with_snake_case_tag() {
        let at = chrono::DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .expect("time")
            .with_timezone(&Utc);
        let action = VisitorAction::new(ActionKind::VideoPlay, "/product", at);
        let value = serde_json::to_value(&action).expect("json");
        assert_eq!(value["type"], "video_play");
        assert_eq!(value["page"], "/product");
    }
}
