use std::{env, fs, path::PathBuf, process};

use serde_json::json;

use robobattleship::{
    board::PLACEMENT_LEN,
    game::{Fixed, Outcome, Side},
    player::Player,
    registry::BattleId,
    response, Error, Server, Settings,
};

/// Two-cell ship on row 0: (0,0) and (0,1).
fn two_cell_ships() -> String {
    format!("11{}", "0".repeat(PLACEMENT_LEN - 2))
}

fn setup(settings: Settings) -> (Server, Player, Player) {
    let server = Server::new(settings, Fixed(Side::First));
    let alice = server.register("Alice").unwrap();
    let bob = server.register("Bob").unwrap();
    for player in &[&alice, &bob] {
        server
            .submit_ships(player.uid().as_str(), player.secret(), &two_cell_ships())
            .unwrap();
    }
    (server, alice, bob)
}

fn shoot(
    server: &Server,
    shooter: &Player,
    target: &Player,
    x: i64,
    y: i64,
) -> Result<Outcome, Error> {
    server.shoot(
        shooter.uid().as_str(),
        shooter.secret(),
        target.uid().as_str(),
        x,
        y,
    )
}

/// Fresh directory under the system temp dir for one test.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("robobattleship-{}-{}", name, process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn full_battle_and_archive_continuity() {
    let (server, alice, bob) = setup(Settings::default());
    let canonical = BattleId::canonical(alice.uid(), bob.uid());

    assert_eq!(shoot(&server, &alice, &bob, 5, 5), Ok(Outcome::Miss));
    assert_eq!(
        shoot(&server, &alice, &bob, 5, 6).map_err(|err| err.code()),
        Err(301)
    );
    assert_eq!(shoot(&server, &bob, &alice, 0, 0), Ok(Outcome::Hit));
    // Reshooting a hit cell repeats the outcome and keeps the turn.
    assert_eq!(shoot(&server, &bob, &alice, 0, 0), Ok(Outcome::Hit));
    assert_eq!(shoot(&server, &bob, &alice, 0, 1), Ok(Outcome::Win));

    let over = shoot(&server, &alice, &bob, 0, 0).unwrap_err();
    assert!(over.is_battle_over());
    assert_eq!(over.code(), 304);
    assert_eq!(
        over.to_string(),
        format!(
            "This battle is over. Winner - {}. Loser - {}.",
            bob.uid(),
            alice.uid()
        )
    );

    let archived = server
        .archive(alice.uid().as_str(), bob.uid().as_str())
        .unwrap()
        .unwrap();
    let view = server.battle(canonical.as_str(), None).unwrap();
    assert_eq!(view.id, archived.as_str());
    assert!(!view.active);
    assert_eq!(view.winner.as_ref(), Some(bob.uid()));

    // The pair can play again under the canonical id.
    assert_eq!(shoot(&server, &bob, &alice, 9, 9), Ok(Outcome::Miss));
    let view = server.battle(canonical.as_str(), None).unwrap();
    assert_eq!(view.id, canonical.as_str());
    assert!(view.active);
    assert_eq!(&view.shooter, alice.uid());
    assert_eq!(
        server.battle(archived.as_str(), None).unwrap().winner.as_ref(),
        Some(bob.uid())
    );
}

#[test]
fn sinking_without_winning_is_a_touchdown() {
    let server = Server::new(Settings::default(), Fixed(Side::First));
    let alice = server.register("Alice").unwrap();
    let bob = server.register("Bob").unwrap();
    // Two ships for bob: two cells on row 0 and a single cell at (9,9).
    let mut ships = two_cell_ships();
    ships.replace_range(PLACEMENT_LEN - 1.., "1");
    server
        .submit_ships(alice.uid().as_str(), alice.secret(), &two_cell_ships())
        .unwrap();
    server
        .submit_ships(bob.uid().as_str(), bob.secret(), &ships)
        .unwrap();

    assert_eq!(shoot(&server, &alice, &bob, 0, 1), Ok(Outcome::Hit));
    assert_eq!(shoot(&server, &alice, &bob, 0, 0), Ok(Outcome::Touchdown));
    assert_eq!(shoot(&server, &alice, &bob, 0, 0), Ok(Outcome::Touchdown));
    assert_eq!(shoot(&server, &alice, &bob, 9, 9), Ok(Outcome::Win));
}

#[test]
fn error_envelopes() {
    let (server, alice, bob) = setup(Settings::default());
    let email = &server.settings().admin_email;

    let reply = response::respond(
        shoot(&server, &alice, &bob, 10, 3).map(|outcome| json!({ "result": outcome })),
        email,
    );
    assert_eq!(
        reply,
        json!({
            "status": "fail",
            "error": {"code": 210, "message": "Coordinate value must be in range [0,9], got [10,3]"},
        })
    );

    let reply = response::respond(
        shoot(&server, &alice, &bob, 3, 3).map(|outcome| json!({ "result": outcome })),
        email,
    );
    assert_eq!(reply, json!({"status": "success", "result": "miss"}));

    let reply = response::respond(server.register("Alice"), email);
    assert_eq!(reply["error"]["code"], 203);
    let reply = response::respond(server.register(""), email);
    assert_eq!(reply["error"]["code"], 202);
    let reply = response::respond(
        server.submit_ships(alice.uid().as_str(), alice.secret(), &"2".repeat(PLACEMENT_LEN)),
        email,
    );
    assert_eq!(reply["error"]["code"], 212);
    let reply = response::respond(server.battle("no-such-battle", None), email);
    assert_eq!(reply["error"]["code"], 209);
}

#[test]
fn ships_not_set_names_the_player() {
    let server = Server::new(Settings::default(), Fixed(Side::First));
    let alice = server.register("Alice").unwrap();
    let bob = server.register("Bob").unwrap();
    server
        .submit_ships(alice.uid().as_str(), alice.secret(), &two_cell_ships())
        .unwrap();
    assert_eq!(
        shoot(&server, &alice, &bob, 0, 0),
        Err(Error::ShipsNotSet {
            uid: bob.uid().clone()
        })
    );
    assert_eq!(
        shoot(&server, &alice, &alice, 0, 0).map_err(|err| err.code()),
        Err(215)
    );
}

#[test]
fn dump_and_restore() {
    let root = scratch_dir("dump");
    let settings = Settings {
        dumps_root: root.clone(),
        ..Settings::default()
    };
    let (server, alice, bob) = setup(settings.clone());
    assert_eq!(shoot(&server, &alice, &bob, 0, 0), Ok(Outcome::Hit));
    assert_eq!(shoot(&server, &alice, &bob, 0, 1), Ok(Outcome::Win));
    let archived = server
        .archive(bob.uid().as_str(), alice.uid().as_str())
        .unwrap()
        .unwrap();
    assert_eq!(shoot(&server, &bob, &alice, 4, 4), Ok(Outcome::Miss));

    let path = server.dump_state(Some("state.json")).unwrap();
    assert_eq!(path, root.join("state.json"));
    let default_path = server.dump_state(None).unwrap();
    let default_name = default_path.file_name().unwrap().to_str().unwrap();
    assert!(default_name.starts_with("server_dump_"));
    assert!(default_name.ends_with(".json"));

    assert_eq!(
        server.dump_state(Some("../escape.json")).map_err(|err| err.code()),
        Err(216)
    );

    let restored = Server::new(settings, Fixed(Side::Second));
    restored.restore_state(&path).unwrap();
    assert_eq!(restored.players(), server.players());
    assert_eq!(
        restored.registry().archived_ids(),
        Ok(vec![archived.clone()])
    );
    let canonical = BattleId::canonical(alice.uid(), bob.uid());
    assert_eq!(
        restored.battle(canonical.as_str(), Some(alice.uid().as_str())),
        server.battle(canonical.as_str(), Some(alice.uid().as_str()))
    );
    // Alice's turn after bob's miss, in the restored server too.
    assert_eq!(shoot(&restored, &alice, &bob, 0, 0), Ok(Outcome::Hit));
    assert_eq!(
        restored
            .submit_ships(alice.uid().as_str(), alice.secret(), &two_cell_ships()),
        Ok(())
    );

    assert_eq!(
        restored
            .restore_state(&root.join("missing.json"))
            .map_err(|err| err.code()),
        Err(101)
    );
    let _ = fs::remove_dir_all(&root);
}
