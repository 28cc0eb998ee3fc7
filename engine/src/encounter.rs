use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::EncounterError;
use crate::progression::XpWallet;
use crate::ChapterId;

/// Health removed per XP spent on an attack.
pub const DAMAGE_PER_XP: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackTier {
    Light,
    Medium,
    Heavy,
}

impl AttackTier {
    pub const ALL: [AttackTier; 3] = [AttackTier::Light, AttackTier::Medium, AttackTier::Heavy];

    pub const fn xp_cost(self) -> u32 {
        match self {
            AttackTier::Light => 10,
            AttackTier::Medium => 25,
            AttackTier::Heavy => 50,
        }
    }

    pub const fn damage(self) -> u32 {
        self.xp_cost() * DAMAGE_PER_XP
    }

    pub fn label(self) -> &'static str {
        match self {
            AttackTier::Light => "Light",
            AttackTier::Medium => "Medium",
            AttackTier::Heavy => "Heavy",
        }
    }
}

/// The villain of one chapter, at some point of a fight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Adversary {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Flavor only; has no effect on damage.
    #[serde(default)]
    pub weakness: String,
    pub max_health: u32,
    pub current_health: u32,
}

impl Adversary {
    pub fn is_defeated(&self) -> bool {
        self.current_health == 0
    }

    /// Remaining health as a whole percentage of max, for health bars.
    pub fn health_percent(&self) -> u32 {
        if self.max_health == 0 {
            return 0;
        }
        (u64::from(self.current_health) * 100 / u64::from(self.max_health)) as u32
    }

    fn take_damage(&mut self, damage: u32) {
        self.current_health = self.current_health.saturating_sub(damage);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterState {
    InProgress,
    Victory,
}

/// Emitted once, when a chapter's villain reaches 0 health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterCompleted {
    pub chapter: ChapterId,
}

/// Why an attack was turned down. A refused attack changes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Refusal {
    AlreadyWon,
    InsufficientXp { balance: u32, cost: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttackOutcome {
    Refused {
        tier: AttackTier,
        reason: Refusal,
    },
    Hit {
        tier: AttackTier,
        xp_spent: u32,
        damage: u32,
        remaining_health: u32,
    },
    Victory {
        tier: AttackTier,
        xp_spent: u32,
        damage: u32,
        completed: ChapterCompleted,
    },
}

impl AttackOutcome {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, AttackOutcome::Refused { .. })
    }

    pub fn completed(&self) -> Option<ChapterCompleted> {
        match self {
            AttackOutcome::Victory { completed, .. } => Some(*completed),
            _ => None,
        }
    }
}

/// One fight against one chapter's villain.
///
/// `InProgress` until the villain's health hits 0, then `Victory` for good. There is no
/// losing: attacks are paid in XP and are refused when the wallet cannot cover them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SessionRecord")]
pub struct EncounterSession {
    chapter: ChapterId,
    adversary: Adversary,
    state: EncounterState,
    log: Vec<String>,
}

#[derive(Deserialize)]
struct SessionRecord {
    chapter: ChapterId,
    adversary: Adversary,
    state: EncounterState,
    #[serde(default)]
    log: Vec<String>,
}

impl TryFrom<SessionRecord> for EncounterSession {
    type Error = EncounterError;

    fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
        let adv = &record.adversary;
        if adv.max_health == 0 {
            return Err(EncounterError::NoHealth {
                name: adv.name.clone(),
            });
        }
        if adv.current_health > adv.max_health {
            return Err(EncounterError::HealthAboveMax {
                name: adv.name.clone(),
                current_health: adv.current_health,
                max_health: adv.max_health,
            });
        }
        if (record.state == EncounterState::Victory) != adv.is_defeated() {
            return Err(EncounterError::StateMismatch {
                current_health: adv.current_health,
            });
        }
        Ok(Self {
            chapter: record.chapter,
            adversary: record.adversary,
            state: record.state,
            log: record.log,
        })
    }
}

impl EncounterSession {
    /// Start a fight; the adversary always begins at full health.
    ///
    /// An adversary without a health pool cannot be fought, since it would start out beaten.
    pub fn new(chapter: ChapterId, mut adversary: Adversary) -> Result<Self, EncounterError> {
        if adversary.max_health == 0 {
            return Err(EncounterError::NoHealth {
                name: adversary.name,
            });
        }
        adversary.current_health = adversary.max_health;
        let log = vec![format!(
            "[START] Chapter {}: {}, {} (HP {}/{})",
            chapter, adversary.name, adversary.title, adversary.current_health, adversary.max_health
        )];
        debug!(%chapter, villain = %adversary.name, "[ENCOUNTER] started");
        Ok(Self {
            chapter,
            adversary,
            state: EncounterState::InProgress,
            log,
        })
    }

    pub fn chapter(&self) -> ChapterId {
        self.chapter
    }

    pub fn adversary(&self) -> &Adversary {
        &self.adversary
    }

    pub fn state(&self) -> EncounterState {
        self.state
    }

    pub fn is_victory(&self) -> bool {
        self.state == EncounterState::Victory
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Spend XP from `wallet` on an attack.
    ///
    /// Refused without side effects once the fight is won, or when the balance is below the
    /// tier's cost. The winning blow returns [`AttackOutcome::Victory`]; applying the reward
    /// is left to the caller.
    pub fn attack<W: XpWallet + ?Sized>(&mut self, tier: AttackTier, wallet: &mut W) -> AttackOutcome {
        let cost = tier.xp_cost();
        if self.is_victory() {
            self.log
                .push(format!("[REFUSED][{}] {} is already defeated", tier.label(), self.adversary.name));
            return AttackOutcome::Refused {
                tier,
                reason: Refusal::AlreadyWon,
            };
        }
        let balance = wallet.balance();
        if balance < cost {
            self.log.push(format!(
                "[REFUSED][{}] needs {} XP, have {}",
                tier.label(),
                cost,
                balance
            ));
            return AttackOutcome::Refused {
                tier,
                reason: Refusal::InsufficientXp { balance, cost },
            };
        }

        wallet.debit(cost);
        let damage = tier.damage();
        let before = self.adversary.current_health;
        self.adversary.take_damage(damage);
        let after = self.adversary.current_health;
        self.log.push(format!(
            "[ATTACK][{}] spent {} XP (balance {} → {}) → {} damage",
            tier.label(),
            cost,
            balance,
            wallet.balance(),
            damage
        ));
        self.log
            .push(format!("[HP][{}] {} → {}", self.adversary.name, before, after));
        debug!(tier = tier.label(), cost, damage, before, after, "[ENCOUNTER] attack");

        if !self.adversary.is_defeated() {
            return AttackOutcome::Hit {
                tier,
                xp_spent: cost,
                damage,
                remaining_health: after,
            };
        }

        self.state = EncounterState::Victory;
        self.log.push(format!(
            "[VICTORY] {} defeated; chapter {} complete",
            self.adversary.name, self.chapter
        ));
        info!(chapter = %self.chapter, villain = %self.adversary.name, "[ENCOUNTER] victory");
        AttackOutcome::Victory {
            tier,
            xp_spent: cost,
            damage,
            completed: ChapterCompleted {
                chapter: self.chapter,
            },
        }
    }
}
