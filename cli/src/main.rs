use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use engine::{
    begin_encounter, chapter_access, AttackOutcome, AttackTier, Catalogue, ChapterAccess,
    ChapterId, EngineConfig, JsonFileStorage, NarrativeCursor, NextStep, ProgressionStore,
    QuestBoard, QuestOutcome,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_SAVE_FILE: &str = "guardian-save.json";

#[derive(Copy, Clone, ValueEnum)]
enum Tier {
    Light,
    Medium,
    Heavy,
}

#[derive(Subcommand)]
enum Cmd {
    /// Show XP balance, unlocked chapters and profile
    Status,
    /// List campaign chapters and whether each can be entered
    Chapters,
    /// Read a chapter's story
    Story {
        #[arg(long)]
        chapter: ChapterId,
        /// Page to show, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Fight a chapter's villain with a scripted sequence of attacks
    Battle {
        #[arg(long)]
        chapter: ChapterId,
        /// Attack tier; repeat for several attacks
        #[arg(long = "attack", value_enum, required = true)]
        attacks: Vec<Tier>,
    },
    /// List today's quests
    Quests,
    /// Complete a daily quest and collect its XP
    Quest {
        #[arg(long)]
        id: u32,
    },
    /// Add XP directly
    Credit {
        #[arg(long)]
        amount: u32,
    },
    /// Unlock a chapter directly
    Unlock {
        #[arg(long)]
        chapter: ChapterId,
    },
    /// Restore the starting XP balance and lock every chapter but the first
    Reset,
    /// Update the player profile
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
        /// Remove the avatar
        #[arg(long, default_value_t = false, conflicts_with = "avatar")]
        clear_avatar: bool,
    },
}

#[derive(Parser)]
#[command(name = "guardian")]
#[command(about = "Guardian story-campaign CLI harness")]
struct Cli {
    /// Progression save file (falls back to config save_path, then ./guardian-save.json)
    #[arg(long, global = true)]
    save: Option<PathBuf>,
    /// Engine config (.json, .yaml or .yml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

type Store = ProgressionStore<JsonFileStorage>;

fn to_tier(t: Tier) -> AttackTier {
    match t {
        Tier::Light => AttackTier::Light,
        Tier::Medium => AttackTier::Medium,
        Tier::Heavy => AttackTier::Heavy,
    }
}

#[derive(Serialize)]
struct ChapterRow<'a> {
    id: ChapterId,
    title: &'a str,
    reward: &'a str,
    required_xp: u32,
    access: ChapterAccess,
}

#[derive(Serialize)]
struct StatusReport<'a> {
    player_name: &'a str,
    avatar: Option<&'a str>,
    xp_balance: u32,
    unlocked_chapters: Vec<ChapterId>,
    chapters: Vec<ChapterRow<'a>>,
}

#[derive(Serialize)]
struct BattleReport<'a> {
    chapter: ChapterId,
    outcomes: Vec<AttackOutcome>,
    next_step: Option<NextStep>,
    xp_balance: u32,
    unlocked_chapters: Vec<ChapterId>,
    log: &'a [String],
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let save_path = cli
        .save
        .clone()
        .or_else(|| config.save_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_FILE));
    let catalogue = config
        .catalogue()
        .context("failed to load campaign content")?;
    debug!(save = %save_path.display(), "[CLI] opening progression");
    let mut store = ProgressionStore::open(JsonFileStorage::new(&save_path), config.starting_xp)
        .with_context(|| format!("failed to open progression: {}", save_path.display()))?;

    match cli.cmd {
        Cmd::Status => print_status(&store, &catalogue, cli.json, false)?,
        Cmd::Chapters => print_status(&store, &catalogue, cli.json, true)?,
        Cmd::Story { chapter, page } => {
            let Some(narrative) = catalogue.narrative(chapter) else {
                bail!("chapter {} has no story", chapter);
            };
            let cursor = NarrativeCursor::at(narrative, page.saturating_sub(1));
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "chapter": chapter,
                        "title": cursor.title(),
                        "page": cursor.index() + 1,
                        "pages": cursor.len(),
                        "text": cursor.page(),
                    }))?
                );
            } else {
                println!("Chapter {}: {} ({}/{})", chapter, cursor.title(), cursor.index() + 1, cursor.len());
                println!("{}", cursor.page());
            }
        }
        Cmd::Battle { chapter, attacks } => {
            let policy = config.campaign_policy(&catalogue);
            begin_encounter(&mut store, &catalogue, chapter)?;
            let mut outcomes = Vec::with_capacity(attacks.len());
            let mut next_step = None;
            for tier in attacks {
                let outcome = store
                    .attack_active(to_tier(tier))
                    .context("encounter was not tracked")?;
                if let Some(done) = outcome.completed() {
                    next_step = Some(policy.apply(&mut store, done));
                }
                outcomes.push(outcome);
            }
            let session = store
                .active_encounter()
                .context("encounter was not tracked")?;
            if cli.json {
                let report = BattleReport {
                    chapter,
                    outcomes,
                    next_step,
                    xp_balance: store.xp_balance(),
                    unlocked_chapters: store.unlocked_chapters().iter().copied().collect(),
                    log: session.log(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for line in session.log() {
                    println!("{}", line);
                }
                match next_step {
                    Some(NextStep::Chapter(next)) => println!(
                        "[REWARD] +{} XP; chapter {} is next",
                        policy.completion_bonus, next
                    ),
                    Some(NextStep::CampaignComplete) => println!(
                        "[REWARD] +{} XP; campaign complete",
                        policy.completion_bonus
                    ),
                    None => println!(
                        "[HP][{}] {}/{} remaining",
                        session.adversary().name,
                        session.adversary().current_health,
                        session.adversary().max_health
                    ),
                }
                println!("{}", summary(&store));
            }
        }
        Cmd::Quests => {
            let board = QuestBoard::daily(&catalogue);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&board.quests().collect::<Vec<_>>())?);
            } else {
                for q in board.quests() {
                    println!("{}. {} (+{} XP): {}", q.id, q.title, q.xp_reward, q.description);
                }
            }
        }
        Cmd::Quest { id } => {
            let mut board = QuestBoard::daily(&catalogue);
            match board.complete(id, &mut store) {
                QuestOutcome::Credited { xp } => println!("[QUEST] {} +{} XP ({})", id, xp, summary(&store)),
                QuestOutcome::AlreadyCompleted => println!("[QUEST] {} already completed", id),
                QuestOutcome::UnknownQuest => bail!("quest {} does not exist", id),
            }
        }
        Cmd::Credit { amount } => {
            store.credit(amount);
            println!("{}", summary(&store));
        }
        Cmd::Unlock { chapter } => {
            if catalogue.chapter(chapter).is_none() {
                bail!("chapter {} does not exist", chapter);
            }
            store.unlock(chapter);
            println!("{}", summary(&store));
        }
        Cmd::Reset => {
            store.reset();
            println!("{}", summary(&store));
        }
        Cmd::Profile {
            name,
            avatar,
            clear_avatar,
        } => {
            if let Some(name) = name {
                store.set_player_name(name);
            }
            if clear_avatar {
                store.set_avatar(None);
            } else if avatar.is_some() {
                store.set_avatar(avatar);
            }
            println!(
                "player={} avatar={}",
                store.state().player_name(),
                store.state().avatar().unwrap_or("-")
            );
        }
    }

    store
        .flush()
        .with_context(|| format!("failed to save progression: {}", save_path.display()))?;
    Ok(())
}

fn summary(store: &Store) -> String {
    let unlocked = store
        .unlocked_chapters()
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("xp={} unlocked=[{}]", store.xp_balance(), unlocked)
}

fn print_status(store: &Store, catalogue: &Catalogue, json: bool, chapters_only: bool) -> anyhow::Result<()> {
    let rows: Vec<ChapterRow> = catalogue
        .chapters()
        .map(|c| ChapterRow {
            id: c.id,
            title: &c.title,
            reward: &c.reward,
            required_xp: c.required_xp,
            access: chapter_access(store, c),
        })
        .collect();

    if json {
        let report = StatusReport {
            player_name: store.state().player_name(),
            avatar: store.state().avatar(),
            xp_balance: store.xp_balance(),
            unlocked_chapters: store.unlocked_chapters().iter().copied().collect(),
            chapters: rows,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !chapters_only {
        println!("player={} {}", store.state().player_name(), summary(store));
    }
    for row in rows {
        let access = match row.access {
            ChapterAccess::Unlocked => "UNLOCKED".to_string(),
            ChapterAccess::Unlockable => "UNLOCKABLE".to_string(),
            ChapterAccess::Locked {
                required_xp,
                missing_xp,
            } => format!("LOCKED ({} XP required, {} more needed)", required_xp, missing_xp),
        };
        println!("{}. {} (reward: {}) {}", row.id, row.title, row.reward, access);
    }
    Ok(())
}
