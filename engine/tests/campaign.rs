use engine::{
    begin_encounter, chapter_access, AttackOutcome, AttackTier, Catalogue, ChapterAccess,
    ChapterId, EngineConfig, EntryRefusal, MemoryStorage, NextStep, ProgressionStore, Refusal,
};

fn ch(id: u32) -> ChapterId {
    ChapterId::new(id).unwrap()
}

fn setup(starting_xp: u32) -> (ProgressionStore<MemoryStorage>, Catalogue) {
    let store = ProgressionStore::open(MemoryStorage::new(), starting_xp).unwrap();
    (store, Catalogue::builtin().unwrap())
}

#[test]
fn policy_unlocks_next_chapter_and_pays_bonus() {
    let (mut store, catalogue) = setup(100);
    let policy = EngineConfig::default().campaign_policy(&catalogue);
    assert_eq!(policy.completion_bonus, 50);
    assert_eq!(policy.final_chapter, ch(3));

    let mut session = begin_encounter(&mut store, &catalogue, ChapterId::FIRST).unwrap();
    let done = session
        .attack(AttackTier::Heavy, &mut store)
        .completed()
        .expect("one heavy attack beats chapter 1");
    assert_eq!(store.xp_balance(), 50);

    let next = policy.apply(&mut store, done);
    assert_eq!(next, NextStep::Chapter(ch(2)));
    assert_eq!(store.xp_balance(), 100);
    assert!(store.is_unlocked(ch(2)));
}

#[test]
fn finishing_the_last_playable_chapter_completes_the_campaign() {
    let (mut store, catalogue) = setup(1000);
    let policy = EngineConfig::default().campaign_policy(&catalogue);

    let mut chapter = ChapterId::FIRST;
    let mut steps = Vec::new();
    loop {
        let mut session = begin_encounter(&mut store, &catalogue, chapter).unwrap();
        let done = loop {
            if let Some(done) = session.attack(AttackTier::Heavy, &mut store).completed() {
                break done;
            }
        };
        let step = policy.apply(&mut store, done);
        steps.push(step);
        match step {
            NextStep::Chapter(next) => chapter = next,
            NextStep::CampaignComplete => break,
        }
    }

    assert_eq!(
        steps,
        vec![
            NextStep::Chapter(ch(2)),
            NextStep::Chapter(ch(3)),
            NextStep::CampaignComplete
        ]
    );
    // 1 + 2 + 2 heavy attacks (100, 150, 200 HP), plus three bonuses.
    assert_eq!(store.xp_balance(), 1000 - 5 * 50 + 3 * 50);
    assert!(store.is_unlocked(ch(4)));
}

#[test]
fn final_chapter_can_be_overridden() {
    let (mut store, catalogue) = setup(100);
    let config = EngineConfig {
        final_chapter: Some(ChapterId::FIRST),
        completion_bonus: 10,
        ..EngineConfig::default()
    };
    let policy = config.campaign_policy(&catalogue);
    let mut session = begin_encounter(&mut store, &catalogue, ChapterId::FIRST).unwrap();
    let done = session.attack(AttackTier::Heavy, &mut store).completed().unwrap();
    assert_eq!(policy.apply(&mut store, done), NextStep::CampaignComplete);
    assert_eq!(store.xp_balance(), 60);
}

#[test]
fn chapter_access_follows_unlocks_and_requirements() {
    let (mut store, catalogue) = setup(100);
    let two = catalogue.chapter(ch(2)).unwrap();
    assert_eq!(
        chapter_access(&store, two),
        ChapterAccess::Locked {
            required_xp: 120,
            missing_xp: 20
        }
    );
    assert!(!chapter_access(&store, two).is_enterable());
    store.credit(20);
    assert_eq!(chapter_access(&store, two), ChapterAccess::Unlockable);
    assert!(chapter_access(&store, two).is_enterable());
    store.unlock(ch(2));
    store.debit(1000);
    assert_eq!(chapter_access(&store, two), ChapterAccess::Unlocked);
    assert_eq!(
        chapter_access(&store, catalogue.chapter(ChapterId::FIRST).unwrap()),
        ChapterAccess::Unlocked
    );
}

#[test]
fn entering_an_unlockable_chapter_unlocks_it() {
    let (mut store, catalogue) = setup(130);
    assert!(!store.is_unlocked(ch(2)));
    let session = begin_encounter(&mut store, &catalogue, ch(2)).unwrap();
    assert_eq!(session.adversary().name, "Smog Emperor");
    assert_eq!(session.adversary().current_health, 150);
    assert!(store.is_unlocked(ch(2)));
}

#[test]
fn entry_refusals() {
    let (mut store, catalogue) = setup(100);
    assert_eq!(
        begin_encounter(&mut store, &catalogue, ch(3)).unwrap_err(),
        EntryRefusal::Locked {
            chapter: ch(3),
            required_xp: 250,
            missing_xp: 150
        }
    );
    assert_eq!(
        begin_encounter(&mut store, &catalogue, ch(9)).unwrap_err(),
        EntryRefusal::UnknownChapter { chapter: ch(9) }
    );
    store.unlock(ch(4));
    assert_eq!(
        begin_encounter(&mut store, &catalogue, ch(4)).unwrap_err(),
        EntryRefusal::NoAdversary { chapter: ch(4) }
    );
}

#[test]
fn unknown_chapter_lookup_is_explicit_and_fallback_is_opt_in() {
    let catalogue = Catalogue::builtin().unwrap();
    assert!(catalogue.adversary(ch(42)).found().is_none());
    let fallback = catalogue.adversary_or_default(ch(42)).unwrap();
    assert_eq!(fallback.name, "Lord Carbonius");
    assert_eq!(catalogue.adversary_or_default(ch(3)).unwrap().name, "Plasticron");
}

#[test]
fn tracked_encounter_wins_once_even_after_reload() {
    let (mut store, catalogue) = setup(100);
    let policy = EngineConfig::default().campaign_policy(&catalogue);
    begin_encounter(&mut store, &catalogue, ChapterId::FIRST).unwrap();
    assert_eq!(store.active_encounter().unwrap().adversary().current_health, 100);

    // Five Light attacks deal exactly 100 damage for 50 XP.
    let mut victories = 0;
    for _ in 0..5 {
        let outcome = store.attack_active(AttackTier::Light).unwrap();
        if let Some(done) = outcome.completed() {
            victories += 1;
            policy.apply(&mut store, done);
        }
    }
    assert_eq!(victories, 1);
    assert_eq!(store.xp_balance(), 100);
    assert!(store.active_encounter().unwrap().is_victory());

    let saved = store.storage().saved().unwrap().clone();
    let mut reopened = ProgressionStore::open(MemoryStorage::with_state(saved), 100).unwrap();
    assert!(reopened.active_encounter().unwrap().is_victory());
    assert_eq!(
        reopened.attack_active(AttackTier::Light),
        Some(AttackOutcome::Refused {
            tier: AttackTier::Light,
            reason: Refusal::AlreadyWon
        })
    );
    assert_eq!(reopened.xp_balance(), 100);
}

#[test]
fn attacking_without_an_encounter_does_nothing() {
    let (mut store, _) = setup(100);
    assert_eq!(store.attack_active(AttackTier::Heavy), None);
    assert_eq!(store.xp_balance(), 100);
}
