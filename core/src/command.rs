use crate::{
    config::TechCategory,
    team::{Candidate, Skill},
    types::EntityId,
};
use serde::{Deserialize, Serialize};

/// All player-issued commands.
/// Variants are appended over time, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Clock control ─────────────────────────────
    Pause,
    Resume,
    SetTickRate { hz: f64 },

    // ── Company ───────────────────────────────────
    SetCompanyName { name: String },
    UpgradeOffice,
    MarkNotificationRead { notification_id: u64 },
    MarkAllNotificationsRead,
    ClearNotifications,

    // ── Team ──────────────────────────────────────
    GenerateRecruits,
    Hire { candidate: Candidate },
    HireRecruit { recruit_id: EntityId },
    Fire { employee_id: EntityId },
    Train { employee_id: EntityId, skill: Skill, amount: f64 },

    // ── Product ───────────────────────────────────
    AddFeature {
        name:         String,
        description:  String,
        complexity:   u8,
        #[serde(default)]
        dependencies: Vec<EntityId>,
    },
    StartFeature { feature_id: EntityId },
    FixBug { bug_id: EntityId },
    SelectTech { category: TechCategory, tech_id: String },
    CreateRelease {
        #[serde(default)]
        notes: String,
        #[serde(default)]
        rush:  bool,
    },

    // ── Marketing ─────────────────────────────────
    StartCampaign {
        template_id:   String,
        #[serde(default)]
        budget:        Option<f64>,
        #[serde(default)]
        duration_days: Option<u32>,
    },
    CancelCampaign { campaign_id: EntityId },
    BoostCampaign { campaign_id: EntityId, additional_budget: f64 },
    SelectAudience { audience_id: String },
    UnlockChannel { channel_id: String },

    // ── Investors ─────────────────────────────────
    FindInvestors,
    PreparePitch {
        investor_id:   EntityId,
        #[serde(default)]
        pitch_quality: f64,
        #[serde(default)]
        focus_areas:   Vec<String>,
    },
    AcceptOffer { investor_id: EntityId },
    RejectOffer { investor_id: EntityId },
    ScheduleMeeting { investor_id: EntityId },

    // ── Achievements ──────────────────────────────
    ClaimReward { achievement_id: EntityId },
}

impl PlayerCommand {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Pause                       => "pause",
            Self::Resume                      => "resume",
            Self::SetTickRate { .. }          => "set_tick_rate",
            Self::SetCompanyName { .. }       => "set_company_name",
            Self::UpgradeOffice               => "upgrade_office",
            Self::MarkNotificationRead { .. } => "mark_notification_read",
            Self::MarkAllNotificationsRead    => "mark_all_notifications_read",
            Self::ClearNotifications          => "clear_notifications",
            Self::GenerateRecruits            => "generate_recruits",
            Self::Hire { .. }                 => "hire",
            Self::HireRecruit { .. }          => "hire_recruit",
            Self::Fire { .. }                 => "fire",
            Self::Train { .. }                => "train",
            Self::AddFeature { .. }           => "add_feature",
            Self::StartFeature { .. }         => "start_feature",
            Self::FixBug { .. }               => "fix_bug",
            Self::SelectTech { .. }           => "select_tech",
            Self::CreateRelease { .. }        => "create_release",
            Self::StartCampaign { .. }        => "start_campaign",
            Self::CancelCampaign { .. }       => "cancel_campaign",
            Self::BoostCampaign { .. }        => "boost_campaign",
            Self::SelectAudience { .. }       => "select_audience",
            Self::UnlockChannel { .. }        => "unlock_channel",
            Self::FindInvestors               => "find_investors",
            Self::PreparePitch { .. }         => "prepare_pitch",
            Self::AcceptOffer { .. }          => "accept_offer",
            Self::RejectOffer { .. }          => "reject_offer",
            Self::ScheduleMeeting { .. }      => "schedule_meeting",
            Self::ClaimReward { .. }          => "claim_reward",
        }
    }
}

/// What every command hands back to the UI.
/// Validation failures are `success: false` with a message, never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CommandResult {
    pub success:   bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message:   Option<String>,
    /// Id of the entity the command created or touched, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<EntityId>,
}

impl CommandResult {
    pub fn ok() -> Self {
        Self { success: true, ..Self::default() }
    }

    pub fn ok_with_id(id: impl Into<EntityId>) -> Self {
        Self { success: true, entity_id: Some(id.into()), ..Self::default() }
    }

    pub fn ok_with_message(message: impl Into<String>) -> Self {
        Self { success: true, message: Some(message.into()), ..Self::default() }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self { success: false, message: Some(message.into()), entity_id: None }
    }
}
