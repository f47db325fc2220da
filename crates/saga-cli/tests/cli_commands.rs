//! Integration tests for the saga CLI commands.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn saga(save: &Path) -> Command {
    let mut cmd = Command::cargo_bin("saga").unwrap();
    cmd.arg("--save").arg(save).arg("--seed").arg("7");
    cmd
}

fn fresh() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let save = dir.path().join("world.json");
    (dir, save)
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

// ---------------------------------------------------------------------------
// init / status
// ---------------------------------------------------------------------------

#[test]
fn init_creates_save() {
    let (_dir, save) = fresh();
    saga(&save)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created world"));
    assert!(save.exists());
}

#[test]
fn init_refuses_to_overwrite() {
    let (_dir, save) = fresh();
    saga(&save).arg("init").assert().success();
    saga(&save)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    saga(&save).args(["init", "--force"]).assert().success();
}

#[test]
fn status_shows_hero_and_village() {
    let (_dir, save) = fresh();
    saga(&save)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wanderer"))
        .stdout(predicate::str::contains("Millbrook"))
        .stdout(predicate::str::contains("Marta Hale"))
        .stdout(predicate::str::contains("Wolves at the Edge"));
}

// ---------------------------------------------------------------------------
// apply / offscreen
// ---------------------------------------------------------------------------

#[test]
fn apply_bare_change_list() {
    let (dir, save) = fresh();
    let turn = write(
        &dir,
        "turn.json",
        r#"[{"type": "gold_change", "data": {"amount": 15}}]"#,
    );
    saga(&save)
        .arg("apply")
        .arg(&turn)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 change applied"));
    saga(&save)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Gold 40"));
}

#[test]
fn apply_reports_skipped_changes() {
    let (dir, save) = fresh();
    let turn = write(
        &dir,
        "turn.json",
        r#"{
            "narrative": "You try something strange.",
            "stateChanges": [
                {"type": "summon_dragon", "data": {}},
                {"type": "player_heal", "data": {"amount": 5}}
            ]
        }"#,
    );
    saga(&save)
        .arg("apply")
        .arg(&turn)
        .assert()
        .success()
        .stdout(predicate::str::contains("You try something strange."))
        .stdout(predicate::str::contains("skipped"))
        .stdout(predicate::str::contains("summon_dragon"));
}

#[test]
fn apply_from_stdin() {
    let (_dir, save) = fresh();
    saga(&save)
        .args(["apply", "-"])
        .write_stdin(r#"[{"type": "experience_gain", "data": {"amount": 60}}]"#)
        .assert()
        .success();
    saga(&save)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("level 2"));
}

#[test]
fn apply_rejects_invalid_json() {
    let (dir, save) = fresh();
    let turn = write(&dir, "turn.json", "not json");
    saga(&save)
        .arg("apply")
        .arg(&turn)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: invalid JSON"));
}

#[test]
fn offscreen_never_moves_the_player() {
    let (dir, save) = fresh();
    let changes = write(
        &dir,
        "changes.json",
        r#"[
            {"type": "move_player", "data": {"locationId": "loc_saltmere"}},
            {"type": "update_location", "data": {"locationId": "loc_saltmere", "dangerLevel": 5}}
        ]"#,
    );
    saga(&save)
        .args(["offscreen", "Saltmere"])
        .arg(&changes)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 off-screen change applied"));
    saga(&save)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Millbrook"));
}

// ---------------------------------------------------------------------------
// combat
// ---------------------------------------------------------------------------

#[test]
fn fight_requires_presence() {
    let (_dir, save) = fresh();
    saga(&save)
        .args(["fight", "Grey Wolf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not here"));
}

#[test]
fn combat_requires_a_fight() {
    let (_dir, save) = fresh();
    saga(&save)
        .args(["combat", "attack"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not in combat"));
}

#[test]
fn combat_rejects_unknown_actions() {
    let (_dir, save) = fresh();
    saga(&save)
        .args(["combat", "dance"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown combat action"));
}

#[test]
fn fight_and_win() {
    let (dir, save) = fresh();
    let turn = write(
        &dir,
        "rat.json",
        r#"{
            "stateChanges": [{"type": "create_npc", "data": {"npc": {
                "id": "npc_rat", "name": "Cellar Rat", "health": 1, "maxHealth": 1,
                "strength": 1, "defense": 0, "experienceReward": 5
            }}}],
            "initiatesCombat": "npc_rat"
        }"#,
    );
    saga(&save)
        .arg("apply")
        .arg(&turn)
        .assert()
        .success()
        .stdout(predicate::str::contains("Combat started with"));
    saga(&save)
        .args(["combat", "attack"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Victory!"));
}

// ---------------------------------------------------------------------------
// travel / map
// ---------------------------------------------------------------------------

#[test]
fn route_to_unknown_place_fails() {
    let (_dir, save) = fresh();
    saga(&save)
        .args(["route", "Greyfang Caves"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: unknown destination"));
}

fn learn_east_road(dir: &TempDir, save: &Path) {
    let turn = write(
        dir,
        "learn.json",
        r#"[{"type": "add_knowledge", "data": {"knowledgeType": "location", "value": "East Road"}}]"#,
    );
    saga(save).arg("apply").arg(&turn).assert().success();
}

#[test]
fn route_shows_risk() {
    let (dir, save) = fresh();
    learn_east_road(&dir, &save);
    saga(&save)
        .args(["route", "East Road"])
        .assert()
        .success()
        .stdout(predicate::str::contains("loc_east_road"))
        .stdout(predicate::str::contains("%"));
}

#[test]
fn travel_with_quiet_encounter_arrives() {
    let (dir, save) = fresh();
    learn_east_road(&dir, &save);
    let quiet = write(&dir, "quiet.json", r#"{"type": "none", "description": ""}"#);
    saga(&save)
        .args(["travel", "East Road", "--encounter"])
        .arg(&quiet)
        .assert()
        .success()
        .stdout(predicate::str::contains("Arrived at"));
    saga(&save)
        .arg("map")
        .assert()
        .success()
        .stdout(predicate::str::contains("@ East Road"));
}

#[test]
fn ambush_cuts_the_journey_short() {
    let (dir, save) = fresh();
    learn_east_road(&dir, &save);
    let ambush = write(
        &dir,
        "ambush.json",
        r#"{"type": "combat", "description": "Bandits leap from the ditch",
            "spawnedNpc": {"name": "Ditch Bandit", "health": 20}}"#,
    );
    saga(&save)
        .args(["travel", "East Road", "--encounter"])
        .arg(&ambush)
        .assert()
        .success()
        .stdout(predicate::str::contains("Journey cut short."))
        .stdout(predicate::str::contains("Combat started with"));
    saga(&save)
        .args(["travel", "East Road"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("combat"));
}

#[test]
fn map_hides_unknown_places() {
    let (_dir, save) = fresh();
    saga(&save)
        .arg("map")
        .assert()
        .success()
        .stdout(predicate::str::contains("@ Millbrook"))
        .stdout(predicate::str::contains("Greyfang").not());
}

#[test]
fn map_json_payload() {
    let (_dir, save) = fresh();
    let output = saga(&save).args(["map", "--json"]).output().unwrap();
    assert!(output.status.success());
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["locations"].as_array().unwrap().len(), 1);
    assert_eq!(payload["exploredTiles"].as_array().unwrap().len(), 9);
    assert_eq!(payload["locations"][0]["isCurrent"], true);
}

// ---------------------------------------------------------------------------
// talk / fallen / reset
// ---------------------------------------------------------------------------

#[test]
fn talk_updates_attitude() {
    let (_dir, save) = fresh();
    saga(&save)
        .args(["talk", "Marta Hale", "Any work?", "Wolves, east of here.", "--attitude", "-5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Attitude is now 15"));
}

#[test]
fn living_hero_cannot_retire() {
    let (_dir, save) = fresh();
    saga(&save)
        .args(["retire", "--cause", "old age"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("still alive"));
    saga(&save)
        .arg("fallen")
        .assert()
        .success()
        .stdout(predicate::str::contains("No heroes have fallen."));
}

#[test]
fn fallen_hero_is_remembered_across_reset() {
    let (dir, save) = fresh();
    let doom = write(
        &dir,
        "doom.json",
        r#"[{"type": "player_damage", "data": {"amount": 500}}]"#,
    );
    saga(&save).arg("apply").arg(&doom).assert().success();
    saga(&save)
        .args(["retire", "--cause", "a falling piano"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fell at Millbrook"));
    saga(&save).arg("reset").assert().success();
    saga(&save)
        .arg("fallen")
        .assert()
        .success()
        .stdout(predicate::str::contains("a falling piano"));
}
