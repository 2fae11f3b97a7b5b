//! Simulation tuning and content data.
//!
//! Everything numeric that shapes the simulation lives here so that the
//! containers only hold state and rules. `SimConfig::load` reads the
//! JSON file shipped under `data/`; tests use `SimConfig::default_test()`.

use serde::{Deserialize, Serialize};

// ── Clock ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Rate a fresh run starts at. 0 starts paused.
    pub initial_tick_rate_hz: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { initial_tick_rate_hz: 1.0 }
    }
}

// ── Company ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyConfig {
    pub starting_cash:          f64,
    pub initial_office_capacity: usize,
    /// Seats added per office upgrade.
    pub office_capacity_step:   usize,
    /// Upgrade cost = base × (current level + 1).
    pub office_upgrade_cost:    f64,
    /// Monthly rent = per_level × (current level + 1).
    pub office_rent_per_level:  f64,
    /// Trailing window of monthly revenue/expense entries.
    pub history_window:         usize,
    /// Monthly revenue per active user.
    pub revenue_per_user:       f64,
    /// Daily new users per point of brand awareness.
    pub user_growth_per_awareness: f64,
    /// Base fraction of users lost per day.
    pub daily_churn_rate:       f64,
    pub min_valuation:          f64,
    pub revenue_multiple:       f64,
    pub value_per_employee:     f64,
    pub value_per_quality:      f64,
    pub value_per_awareness:    f64,
    pub value_per_reputation:   f64,
}

impl Default for CompanyConfig {
    fn default() -> Self {
        Self {
            starting_cash:           10_000.0,
            initial_office_capacity: 5,
            office_capacity_step:    5,
            office_upgrade_cost:     5_000.0,
            office_rent_per_level:   500.0,
            history_window:          12,
            revenue_per_user:        2.0,
            user_growth_per_awareness: 2.0,
            daily_churn_rate:        0.01,
            min_valuation:           500_000.0,
            revenue_multiple:        8.0,
            value_per_employee:      50_000.0,
            value_per_quality:       5_000.0,
            value_per_awareness:     2_000.0,
            value_per_reputation:    1_000.0,
        }
    }
}

// ── Team ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamConfig {
    /// Morale lost per hour per point of (100 − exploitation tolerance).
    pub exploitation_factor:      f64,
    pub energy_decay_per_hour:    f64,
    pub energy_recovery_per_hour: f64,
    /// Working hours are [work_start_hour, work_end_hour).
    pub work_start_hour:          u32,
    pub work_end_hour:            u32,
    pub fire_reputation_penalty:  f64,
    pub min_salary:               u64,
    pub max_salary:               u64,
    pub min_recruits:             u64,
    pub max_recruits:             u64,
    pub recruit_skill_min:        u64,
    pub recruit_skill_max:        u64,
    /// Max skill bonus a recruit gets at employer reputation 100.
    pub reputation_skill_bonus:   f64,
    pub min_exploitation_tolerance: u64,
    pub max_exploitation_tolerance: u64,
    pub personalities:            Vec<String>,
    pub specialties:              Vec<String>,
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            exploitation_factor:      0.02,
            energy_decay_per_hour:    0.5,
            energy_recovery_per_hour: 2.0,
            work_start_hour:          9,
            work_end_hour:            18,
            fire_reputation_penalty:  5.0,
            min_salary:               1_000,
            max_salary:               3_000,
            min_recruits:             2,
            max_recruits:             4,
            recruit_skill_min:        10,
            recruit_skill_max:        39,
            reputation_skill_bonus:   20.0,
            min_exploitation_tolerance: 30,
            max_exploitation_tolerance: 79,
            personalities: [
                "Enthusiastic", "Analytical", "Creative", "Lazy", "Workaholic",
                "Perfectionist", "Careless", "Team Player", "Lone Wolf",
                "Optimistic", "Pessimistic", "Easily Distracted",
            ].iter().map(|s| s.to_string()).collect(),
            specialties: ["Frontend", "Backend", "Design", "Marketing"]
                .iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ── Product ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TechCategory {
    Frontend,
    Backend,
    Database,
    Hosting,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TechOption {
    pub id:         String,
    pub name:       String,
    pub category:   TechCategory,
    pub popularity: f64,
    pub stability:  f64,
    pub cost:       f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureTemplate {
    pub name:        String,
    pub description: String,
    pub complexity:  u8,
    /// Indices into the template list.
    #[serde(default)]
    pub depends_on:  Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductConfig {
    /// Dev points per hour = (coding + design) / divisor.
    pub dev_points_divisor:   f64,
    pub bug_fix_debt_relief:  f64,
    pub rush_release_debt:    f64,
    /// Customer reputation moves by (release quality − 50) / divisor.
    pub release_reputation_divisor: f64,
    pub starter_features:     Vec<FeatureTemplate>,
    pub tech_options:         Vec<TechOption>,
}

impl Default for ProductConfig {
    fn default() -> Self {
        let tech = |id: &str, name: &str, category, popularity, stability, cost| TechOption {
            id: id.into(),
            name: name.into(),
            category,
            popularity,
            stability,
            cost,
        };
        Self {
            dev_points_divisor:  10.0,
            bug_fix_debt_relief: 2.0,
            rush_release_debt:   10.0,
            release_reputation_divisor: 5.0,
            starter_features: vec![
                FeatureTemplate {
                    name: "User Authentication".into(),
                    description: "Basic user registration and login system".into(),
                    complexity: 3,
                    depends_on: vec![],
                },
                FeatureTemplate {
                    name: "Dashboard UI".into(),
                    description: "Main interface for users to interact with the product".into(),
                    complexity: 2,
                    depends_on: vec![0],
                },
                FeatureTemplate {
                    name: "Payment Processing".into(),
                    description: "Integration with payment providers".into(),
                    complexity: 4,
                    depends_on: vec![0],
                },
            ],
            tech_options: vec![
                tech("react", "React", TechCategory::Frontend, 85.0, 80.0, 0.0),
                tech("vue", "Vue.js", TechCategory::Frontend, 70.0, 75.0, 0.0),
                tech("node", "Node.js", TechCategory::Backend, 80.0, 75.0, 0.0),
                tech("python", "Python", TechCategory::Backend, 85.0, 85.0, 0.0),
                tech("postgres", "PostgreSQL", TechCategory::Database, 80.0, 90.0, 0.0),
                tech("mongodb", "MongoDB", TechCategory::Database, 75.0, 70.0, 0.0),
                tech("aws", "AWS", TechCategory::Hosting, 90.0, 95.0, 500.0),
                tech("heroku", "Heroku", TechCategory::Hosting, 75.0, 80.0, 200.0),
            ],
        }
    }
}

// ── Marketing ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignTemplate {
    pub id:                   String,
    pub name:                 String,
    /// Channel id that must be unlocked to run this template.
    pub channel:              String,
    pub base_cost:            f64,
    pub base_duration_days:   u32,
    pub base_effectiveness:   f64,
    pub base_reach:           f64,
    /// Percent of reach that converts.
    pub base_conversion_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelConfig {
    pub id:            String,
    pub name:          String,
    pub unlock_cost:   f64,
    pub starts_unlocked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudienceSegment {
    pub id:            String,
    pub name:          String,
    pub best_channels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketingConfig {
    /// Reach at which awareness sits at ~63%.
    pub awareness_reach_scale:   f64,
    pub matched_audience_factor: f64,
    pub mismatched_audience_factor: f64,
    /// Fraction of the proportional reach gain a boost buys.
    pub boost_efficiency:        f64,
    pub conversion_customer_reputation: f64,
    pub reach_industry_reputation:      f64,
    pub templates: Vec<CampaignTemplate>,
    pub channels:  Vec<ChannelConfig>,
    pub audiences: Vec<AudienceSegment>,
}

impl Default for MarketingConfig {
    fn default() -> Self {
        let template = |id: &str, name: &str, channel: &str, cost, days, eff, reach, conv| {
            CampaignTemplate {
                id: id.into(),
                name: name.into(),
                channel: channel.into(),
                base_cost: cost,
                base_duration_days: days,
                base_effectiveness: eff,
                base_reach: reach,
                base_conversion_rate: conv,
            }
        };
        let channel = |id: &str, name: &str, unlock_cost, starts_unlocked| ChannelConfig {
            id: id.into(),
            name: name.into(),
            unlock_cost,
            starts_unlocked,
        };
        let audience = |id: &str, name: &str, best: &[&str]| AudienceSegment {
            id: id.into(),
            name: name.into(),
            best_channels: best.iter().map(|s| s.to_string()).collect(),
        };
        Self {
            awareness_reach_scale: 50_000.0,
            matched_audience_factor: 1.5,
            mismatched_audience_factor: 0.8,
            boost_efficiency: 0.8,
            conversion_customer_reputation: 0.05,
            reach_industry_reputation: 0.01,
            templates: vec![
                template("social_media", "Social Media Campaign", "social", 1_500.0, 7, 60.0, 5_000.0, 2.0),
                template("email_marketing", "Email Marketing", "email", 1_000.0, 5, 55.0, 3_000.0, 2.5),
                template("content_marketing", "Content Marketing", "content", 2_000.0, 14, 65.0, 8_000.0, 1.8),
                template("pr_release", "Press Release", "pr", 3_000.0, 3, 70.0, 10_000.0, 1.2),
                template("influencer", "Influencer Partnership", "social", 5_000.0, 10, 75.0, 15_000.0, 2.2),
                template("seo", "SEO Optimization", "search", 2_500.0, 30, 60.0, 7_000.0, 3.0),
                template("conference", "Industry Conference", "pr", 7_500.0, 3, 80.0, 2_000.0, 5.0),
            ],
            channels: vec![
                channel("social", "Social Media", 0.0, true),
                channel("search", "Search Engines", 2_000.0, false),
                channel("email", "Email", 1_000.0, false),
                channel("content", "Content Marketing", 1_500.0, false),
                channel("pr", "Public Relations", 3_000.0, false),
            ],
            audiences: vec![
                audience("tech_enthusiasts", "Tech Enthusiasts", &["social", "content"]),
                audience("businesses", "Business Professionals", &["search", "email", "pr"]),
                audience("students", "Students", &["social", "content"]),
                audience("developers", "Developers", &["content", "search"]),
            ],
        }
    }
}

// ── Investors ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvestorArchetype {
    pub id:                 String,
    pub name:               String,
    pub round_name:         String,
    pub min_investment:     f64,
    pub max_investment:     f64,
    pub min_equity:         f64,
    pub max_equity:         f64,
    pub interest_threshold: f64,
    pub base_interest:      f64,
    /// Industry reputation needed before this archetype shows up.
    pub min_industry_reputation: f64,
    pub focus_areas:        Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestorConfig {
    pub offer_expiry_days:        u32,
    pub initial_relationship:     f64,
    /// Revenue growth (percent) above which relationships improve.
    pub growth_threshold:         f64,
    pub quality_high:             f64,
    pub quality_low:              f64,
    pub growth_relationship_delta:  f64,
    pub quality_relationship_delta: f64,
    pub reject_interest_penalty:  f64,
    pub meeting_bonus:            f64,
    /// Offers are capped at this fraction of valuation.
    pub max_valuation_fraction:   f64,
    pub archetypes:               Vec<InvestorArchetype>,
    pub all_focus_areas:          Vec<String>,
}

impl Default for InvestorConfig {
    fn default() -> Self {
        let archetype = |id: &str, name: &str, round: &str, min_inv, max_inv, min_eq, max_eq,
                         threshold, base, min_rep, focus: &[&str]| InvestorArchetype {
            id: id.into(),
            name: name.into(),
            round_name: round.into(),
            min_investment: min_inv,
            max_investment: max_inv,
            min_equity: min_eq,
            max_equity: max_eq,
            interest_threshold: threshold,
            base_interest: base,
            min_industry_reputation: min_rep,
            focus_areas: focus.iter().map(|s| s.to_string()).collect(),
        };
        Self {
            offer_expiry_days: 7,
            initial_relationship: 80.0,
            growth_threshold: 10.0,
            quality_high: 75.0,
            quality_low: 40.0,
            growth_relationship_delta: 1.0,
            quality_relationship_delta: 0.5,
            reject_interest_penalty: 20.0,
            meeting_bonus: 10.0,
            max_valuation_fraction: 0.4,
            archetypes: vec![
                archetype("angel", "Angel Investor", "Pre-Seed", 25_000.0, 150_000.0, 5.0, 15.0,
                          40.0, 40.0, 0.0, &["user_growth", "innovative_tech"]),
                archetype("seed_vc", "Seed VC", "Seed", 100_000.0, 500_000.0, 10.0, 25.0,
                          50.0, 30.0, 30.0, &["market_fit", "team_expertise"]),
                archetype("series_a", "Series A VC", "Series A", 500_000.0, 2_000_000.0, 15.0, 30.0,
                          60.0, 20.0, 50.0, &["revenue_growth", "market_share"]),
                archetype("series_b", "Series B VC", "Series B", 2_000_000.0, 10_000_000.0, 20.0, 35.0,
                          70.0, 10.0, 70.0, &["profitability", "scalability"]),
            ],
            all_focus_areas: [
                "user_growth", "revenue_growth", "product_launch", "market_fit",
                "innovative_tech", "team_expertise", "market_share", "profitability",
                "scalability",
            ].iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl InvestorConfig {
    pub fn archetype(&self, id: &str) -> Option<&InvestorArchetype> {
        self.archetypes.iter().find(|a| a.id == id)
    }
}

// ── Random events ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RandomEventKind {
    ServerOutage,
    ViralPost,
    BurnoutWave,
    PressFeature,
    AngelInterest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomEventConfig {
    pub kind:      RandomEventKind,
    pub weight:    f64,
    pub magnitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Chance per simulated day that one event fires.
    pub daily_probability: f64,
    pub table:             Vec<RandomEventConfig>,
}

impl Default for EventConfig {
    fn default() -> Self {
        let entry = |kind, weight, magnitude| RandomEventConfig { kind, weight, magnitude };
        Self {
            daily_probability: 0.02,
            table: vec![
                entry(RandomEventKind::ServerOutage, 3.0, 5.0),
                entry(RandomEventKind::ViralPost, 2.0, 10.0),
                entry(RandomEventKind::BurnoutWave, 2.0, 15.0),
                entry(RandomEventKind::PressFeature, 2.0, 5.0),
                entry(RandomEventKind::AngelInterest, 1.0, 0.0),
            ],
        }
    }
}

// ── Root ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub clock:     ClockConfig,
    pub company:   CompanyConfig,
    pub team:      TeamConfig,
    pub product:   ProductConfig,
    pub marketing: MarketingConfig,
    pub investor:  InvestorConfig,
    pub events:    EventConfig,
}

impl SimConfig {
    /// Load from a JSON config file (usually `data/sim_config.json`).
    /// Missing sections and fields fall back to defaults.
    /// In tests, use SimConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SimConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config)
    }

    /// Config with hardcoded defaults for use in tests.
    /// Random events are disabled (opt-in) so runs are easy to reason about.
    pub fn default_test() -> Self {
        let mut config = Self::default();
        config.events.daily_probability = 0.0;
        config
    }

    pub fn campaign_template(&self, id: &str) -> Option<&CampaignTemplate> {
        self.marketing.templates.iter().find(|t| t.id == id)
    }

    pub fn tech_option(&self, id: &str) -> Option<&TechOption> {
        self.product.tech_options.iter().find(|t| t.id == id)
    }
}
