use crate::core::weighted::WeightedTable;
use crate::visitors::model::{BehaviorParams, BehaviorPattern, DeviceType, Location, TrafficSource};

pub const LANDING_PAGE: &str = "/";
pub const PRODUCT_PAGE: &str = "/product";
pub const CASE_STUDIES_PAGE: &str = "/case-studies";
pub const CONTACT_PAGE: &str = "/contact";

/// Every page a simulated session may visit.
pub const SITE_PAGES: &[&str] = &[
    LANDING_PAGE,
    PRODUCT_PAGE,
    CASE_STUDIES_PAGE,
    "/pricing",
    CONTACT_PAGE,
    "/faq",
    "/blog",
    "/company",
];

/// Role-name fragments that mark a senior or managerial title.
pub const SENIOR_ROLE_MARKERS: &[&str] = &["Head", "Manager", "Director", "Chief"];

pub const DEFAULT_INTERESTS: &[&str] = &["Product overview"];

/// Industry with the companies and roles drawn alongside it.
#[derive(Debug)]
pub struct IndustryProfile {
    pub name: &'static str,
    pub weight: f64,
    pub companies: &'static [&'static str],
    pub roles: &'static [&'static str],
}

pub const INDUSTRIES: &[IndustryProfile] = &[
    IndustryProfile {
        name: "Manufacturing",
        weight: 0.25,
        companies: &[
            "Kanto Precision Works",
            "Northfield Components",
            "Ironbridge Fabrication",
        ],
        roles: &[
            "Production Manager",
            "Plant Department Head",
            "Quality Engineer",
            "Procurement Officer",
        ],
    },
    IndustryProfile {
        name: "Software",
        weight: 0.25,
        companies: &["Brightlane Systems", "Cobalt Cloud", "Nimbus Labs"],
        roles: &[
            "Engineering Manager",
            "Chief Technology Officer",
            "Software Engineer",
            "Product Owner",
        ],
    },
    IndustryProfile {
        name: "Retail",
        weight: 0.15,
        companies: &["Harbor Street Retail", "Maple & Co.", "Urban Basket"],
        roles: &[
            "Sales Department Head",
            "Store Manager",
            "Marketing Specialist",
            "E-commerce Lead",
        ],
    },
    IndustryProfile {
        name: "Finance",
        weight: 0.15,
        companies: &["Summit Capital", "Crescent Bank", "Ledgerline Insurance"],
        roles: &[
            "Finance Director",
            "Risk Analyst",
            "Accounting Department Head",
            "Operations Manager",
        ],
    },
    IndustryProfile {
        name: "Healthcare",
        weight: 0.1,
        companies: &["Evergreen Clinics", "Lumen Health", "Westgate Medical"],
        roles: &["IT Manager", "Administrator", "Nurse Lead"],
    },
    IndustryProfile {
        name: "Logistics",
        weight: 0.1,
        companies: &["Swiftroute Logistics", "Bluewave Freight"],
        roles: &[
            "Logistics Manager",
            "Dispatcher",
            "General Affairs Department Head",
        ],
    },
];

/// Interests keyed by role. Roles without an entry get `DEFAULT_INTERESTS`.
pub fn interests_for_role(role: &str) -> Vec<String> {
    let interests: &[&str] = match role {
        "Production Manager" | "Plant Department Head" => {
            &["Production efficiency", "Cost reduction", "Automation"]
        }
        "Quality Engineer" => &["Quality control", "Defect tracking"],
        "Procurement Officer" => &["Pricing", "Vendor comparison"],
        "Engineering Manager" | "Chief Technology Officer" => {
            &["Integrations", "Security", "Scalability"]
        }
        "Software Engineer" => &["API documentation", "Integrations"],
        "Product Owner" => &["Roadmap", "Case studies"],
        "Sales Department Head" | "Store Manager" => {
            &["Sales growth", "Customer analytics", "Case studies"]
        }
        "Marketing Specialist" | "E-commerce Lead" => &["Lead generation", "Campaign analytics"],
        "Finance Director" | "Accounting Department Head" => {
            &["ROI", "Pricing", "Compliance"]
        }
        "Risk Analyst" => &["Compliance", "Reporting"],
        "Operations Manager" | "Logistics Manager" => &["Workflow automation", "Reporting"],
        "IT Manager" => &["Security", "Integrations"],
        "General Affairs Department Head" => &["Cost reduction", "Support"],
        _ => DEFAULT_INTERESTS,
    };
    interests.iter().map(|item| item.to_string()).collect()
}

/// Whether a role title reads as senior or managerial.
pub fn is_senior_role(role: &str) -> bool {
    SENIOR_ROLE_MARKERS
        .iter()
        .any(|marker| role.contains(marker))
}

/// Session parameters per behavior pattern.
pub fn behavior_params(pattern: BehaviorPattern) -> BehaviorParams {
    match pattern {
        BehaviorPattern::Explorer => BehaviorParams {
            avg_time_spent: 240.0,
            scroll_depth_min: 40.0,
            scroll_depth_max: 80.0,
            interaction_rate: 0.6,
            conversion_probability: 0.15,
        },
        BehaviorPattern::Researcher => BehaviorParams {
            avg_time_spent: 480.0,
            scroll_depth_min: 70.0,
            scroll_depth_max: 100.0,
            interaction_rate: 0.8,
            conversion_probability: 0.25,
        },
        BehaviorPattern::DecisionMaker => BehaviorParams {
            avg_time_spent: 300.0,
            scroll_depth_min: 60.0,
            scroll_depth_max: 95.0,
            interaction_rate: 0.9,
            conversion_probability: 0.45,
        },
        BehaviorPattern::CasualBrowser => BehaviorParams {
            avg_time_spent: 90.0,
            scroll_depth_min: 10.0,
            scroll_depth_max: 40.0,
            interaction_rate: 0.2,
            conversion_probability: 0.05,
        },
    }
}

fn locations() -> Vec<Location> {
    [
        ("Tokyo", "Kanto", "Japan"),
        ("Osaka", "Kansai", "Japan"),
        ("San Francisco", "California", "United States"),
        ("New York", "New York", "United States"),
        ("London", "England", "United Kingdom"),
        ("Berlin", "Berlin", "Germany"),
        ("Singapore", "Central", "Singapore"),
        ("Sydney", "New South Wales", "Australia"),
    ]
    .into_iter()
    .map(|(city, region, country)| Location {
        city: city.to_string(),
        region: region.to_string(),
        country: country.to_string(),
    })
    .collect()
}

fn device_weights() -> Vec<(DeviceType, f64)> {
    vec![
        (DeviceType::Desktop, 0.6),
        (DeviceType::Mobile, 0.35),
        (DeviceType::Tablet, 0.05),
    ]
}

fn source_weights() -> Vec<(TrafficSource, f64)> {
    vec![
        (TrafficSource::Search, 0.4),
        (TrafficSource::Direct, 0.25),
        (TrafficSource::Social, 0.15),
        (TrafficSource::Referral, 0.12),
        (TrafficSource::Email, 0.08),
    ]
}

fn entry_page_weights() -> Vec<(&'static str, f64)> {
    vec![
        (LANDING_PAGE, 0.5),
        (PRODUCT_PAGE, 0.2),
        ("/blog", 0.15),
        ("/pricing", 0.1),
        (CASE_STUDIES_PAGE, 0.05),
    ]
}

/// Weighted lookup tables used by the profile generator.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    pub industries: WeightedTable<&'static IndustryProfile>,
    pub devices: WeightedTable<DeviceType>,
    pub sources: WeightedTable<TrafficSource>,
    pub entry_pages: WeightedTable<&'static str>,
    pub locations: Vec<Location>,
}

impl ReferenceTables {
    pub fn new() -> Self {
        let industries = INDUSTRIES
            .iter()
            .map(|industry| (industry, industry.weight))
            .collect();
        Self {
            industries: table_or_default(industries, &INDUSTRIES[0]),
            devices: table_or_default(device_weights(), DeviceType::Desktop),
            sources: table_or_default(source_weights(), TrafficSource::Direct),
            entry_pages: table_or_default(entry_page_weights(), LANDING_PAGE),
            locations: locations(),
        }
    }
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self::new()
    }
}

fn table_or_default<T>(weighted: Vec<(T, f64)>, fallback: T) -> WeightedTable<T> {
    WeightedTable::new(weighted).unwrap_or_else(|| WeightedTable::single(fallback))
}
