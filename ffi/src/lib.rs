use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use engine::{
    begin_encounter, chapter_access, AttackTier, ChapterId, EncounterSession, EngineConfig,
    EntryRefusal, JsonFileStorage, ProgressionStore, QuestBoard,
};
use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;

const VERSION: &str = concat!("guardian-ffi ", env!("CARGO_PKG_VERSION"));

type Store = ProgressionStore<JsonFileStorage>;

#[derive(Debug, Deserialize)]
struct StoreRequest {
    save_path: PathBuf,
    #[serde(default)]
    config: EngineConfig,
}

impl StoreRequest {
    fn open(&self) -> Result<Store> {
        ProgressionStore::open(JsonFileStorage::new(&self.save_path), self.config.starting_xp)
            .with_context(|| format!("failed to open progression: {}", self.save_path.display()))
    }
}

#[derive(Debug, Deserialize)]
struct StartRequest {
    #[serde(flatten)]
    store: StoreRequest,
    chapter: ChapterId,
    /// Fight chapter 1's villain when an enterable chapter has none of its own.
    #[serde(default)]
    allow_fallback: bool,
}

/// Attacks always target the encounter saved with the progression. Any session the
/// caller echoes back is ignored.
#[derive(Debug, Deserialize)]
struct AttackRequest {
    #[serde(flatten)]
    store: StoreRequest,
    tier: AttackTier,
}

#[derive(Debug, Deserialize)]
struct QuestRequest {
    #[serde(flatten)]
    store: StoreRequest,
    quest_id: u32,
    /// Quests already done on the caller's board today.
    #[serde(default)]
    completed: Vec<u32>,
}

#[derive(Debug, Serialize)]
struct Progress<'a> {
    player_name: &'a str,
    avatar: Option<&'a str>,
    xp_balance: u32,
    unlocked_chapters: Vec<ChapterId>,
}

fn progress(store: &Store) -> Progress<'_> {
    Progress {
        player_name: store.state().player_name(),
        avatar: store.state().avatar(),
        xp_balance: store.xp_balance(),
        unlocked_chapters: store.unlocked_chapters().iter().copied().collect(),
    }
}

fn finish(mut store: Store, result: Value) -> Result<Value> {
    store.flush().context("failed to save progression")?;
    Ok(result)
}

pub fn status_internal(input: &str) -> Result<Value> {
    let req: StoreRequest = serde_json::from_str(input).context("invalid_request")?;
    let catalogue = req.config.catalogue()?;
    let store = req.open()?;
    let chapters: Vec<Value> = catalogue
        .chapters()
        .map(|c| {
            json!({
                "id": c.id,
                "title": c.title,
                "reward": c.reward,
                "required_xp": c.required_xp,
                "access": chapter_access(&store, c),
            })
        })
        .collect();
    let result = json!({
        "progress": progress(&store),
        "chapters": chapters,
        "active_encounter": store.active_encounter(),
    });
    finish(store, result)
}

pub fn start_encounter_internal(input: &str) -> Result<Value> {
    let req: StartRequest = serde_json::from_str(input).context("invalid_request")?;
    let catalogue = req.store.config.catalogue()?;
    let mut store = req.store.open()?;
    let session = match begin_encounter(&mut store, &catalogue, req.chapter) {
        Ok(session) => session,
        Err(EntryRefusal::NoAdversary { .. }) if req.allow_fallback => {
            let adversary = catalogue
                .adversary_or_default(req.chapter)
                .ok_or_else(|| anyhow!("campaign has no villains"))?;
            let session = EncounterSession::new(req.chapter, adversary)?;
            store.unlock(req.chapter);
            store.track_encounter(session.clone());
            session
        }
        Err(refusal) => return Err(refusal.into()),
    };
    let result = json!({ "session": session, "progress": progress(&store) });
    finish(store, result)
}

pub fn attack_internal(input: &str) -> Result<Value> {
    let req: AttackRequest = serde_json::from_str(input).context("invalid_request")?;
    let catalogue = req.store.config.catalogue()?;
    let policy = req.store.config.campaign_policy(&catalogue);
    let mut store = req.store.open()?;
    let outcome = store
        .attack_active(req.tier)
        .ok_or_else(|| anyhow!("no_active_encounter: start an encounter first"))?;
    let next_step = outcome.completed().map(|done| policy.apply(&mut store, done));
    let result = json!({
        "session": store.active_encounter(),
        "outcome": outcome,
        "next_step": next_step,
        "progress": progress(&store),
    });
    finish(store, result)
}

pub fn complete_quest_internal(input: &str) -> Result<Value> {
    let req: QuestRequest = serde_json::from_str(input).context("invalid_request")?;
    let catalogue = req.store.config.catalogue()?;
    let mut store = req.store.open()?;
    let mut board = QuestBoard::daily(&catalogue).with_completed(req.completed);
    let outcome = board.complete(req.quest_id, &mut store);
    let result = json!({
        "outcome": outcome,
        "completed": board.completed(),
        "progress": progress(&store),
    });
    finish(store, result)
}

pub fn reset_internal(input: &str) -> Result<Value> {
    let req: StoreRequest = serde_json::from_str(input).context("invalid_request")?;
    let mut store = req.open()?;
    store.reset();
    let result = json!({ "progress": progress(&store) });
    finish(store, result)
}

fn envelope(result: Result<Value>) -> Value {
    match result {
        Ok(value) => json!({ "ok": true, "result": value }),
        Err(e) => json!({ "ok": false, "error": format!("{:#}", e) }),
    }
}

fn respond(env: &JNIEnv, payload: Value) -> jstring {
    match env.new_string(payload.to_string()) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            error!(error = %e, "[FFI] failed to allocate response string");
            std::ptr::null_mut()
        }
    }
}

fn call_json(env: &mut JNIEnv, json: &JString, handler: fn(&str) -> Result<Value>) -> jstring {
    let result = match env.get_string(json) {
        Ok(s) => {
            let input: String = s.into();
            handler(&input)
        }
        Err(e) => Err(anyhow!("unreadable input string: {}", e)),
    };
    respond(env, envelope(result))
}

#[no_mangle]
pub extern "system" fn Java_com_guardian_Ffi_version(env: JNIEnv, _class: JClass) -> jstring {
    match env.new_string(VERSION) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "system" fn Java_com_guardian_Ffi_statusJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    call_json(&mut env, &json, status_internal)
}

#[no_mangle]
pub extern "system" fn Java_com_guardian_Ffi_startEncounterJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    call_json(&mut env, &json, start_encounter_internal)
}

#[no_mangle]
pub extern "system" fn Java_com_guardian_Ffi_attackJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    call_json(&mut env, &json, attack_internal)
}

#[no_mangle]
pub extern "system" fn Java_com_guardian_Ffi_completeQuestJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    call_json(&mut env, &json, complete_quest_internal)
}

#[no_mangle]
pub extern "system" fn Java_com_guardian_Ffi_resetJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    call_json(&mut env, &json, reset_internal)
}
