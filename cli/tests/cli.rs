use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn guardian(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("guardian").unwrap();
    cmd.arg("--save").arg(dir.path().join("save.json"));
    cmd
}

#[test]
fn status_on_a_fresh_save() {
    let dir = TempDir::new().unwrap();
    guardian(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("player=Player xp=100 unlocked=[1]"))
        .stdout(predicate::str::contains("2. Toxic Skies (reward: Wind Purifier) LOCKED (120 XP required, 20 more needed)"));
    assert!(dir.path().join("save.json").exists());
}

#[test]
fn battle_win_pays_bonus_and_unlocks_next_chapter() {
    let dir = TempDir::new().unwrap();
    guardian(&dir)
        .args(["battle", "--chapter", "1", "--attack", "heavy", "--attack", "heavy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[VICTORY] Lord Carbonius defeated; chapter 1 complete"))
        .stdout(predicate::str::contains("[REFUSED][Heavy] Lord Carbonius is already defeated"))
        .stdout(predicate::str::contains("[REWARD] +50 XP; chapter 2 is next"))
        .stdout(predicate::str::contains("xp=100 unlocked=[1,2]"));

    guardian(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("xp=100 unlocked=[1,2]"));
}

#[test]
fn locked_chapter_is_refused() {
    let dir = TempDir::new().unwrap();
    guardian(&dir)
        .args(["battle", "--chapter", "3", "--attack", "light"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("chapter 3 is locked"));
}

#[test]
fn chapter_zero_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    guardian(&dir)
        .args(["battle", "--chapter", "0", "--attack", "light"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid chapter id"));
}

#[test]
fn quest_then_reset() {
    let dir = TempDir::new().unwrap();
    guardian(&dir)
        .args(["quest", "--id", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+75 XP (xp=175 unlocked=[1])"));
    guardian(&dir)
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("xp=100 unlocked=[1]"));
}

#[test]
fn json_status_is_machine_readable() {
    let dir = TempDir::new().unwrap();
    let out = guardian(&dir).args(["--json", "status"]).output().unwrap();
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["xp_balance"], 100);
    assert_eq!(value["chapters"][0]["access"]["kind"], "unlocked");
    assert_eq!(value["chapters"][1]["access"]["missing_xp"], 20);
}

#[test]
fn story_pages_are_clamped() {
    let dir = TempDir::new().unwrap();
    guardian(&dir)
        .args(["story", "--chapter", "2", "--page", "9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Chapter 2: Toxic Skies (4/4)"));
}
