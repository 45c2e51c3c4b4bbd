//! Builders for tournament fixtures on a private in-memory database.

use std::sync::Arc;

use backend_test_support::unique_helpers::unique_device_token;
use uncolympics::config::db::DbKind;
use uncolympics::config::engine::EngineConfig;
use uncolympics::domain::dice::ScriptedDice;
use uncolympics::domain::stat_schema::{Pick, StatField, StatSchema, TitleSpec};
use uncolympics::entities::drafted_games::GameStatus;
use uncolympics::entities::participants::ParticipantRole;
use uncolympics::infra::db::bootstrap_db;
use uncolympics::repos::catalog::CatalogEntry;
use uncolympics::repos::participants::Participant;
use uncolympics::repos::teams::Team;
use uncolympics::services::{GameAdvance, GameOutcome, NewCatalogEntry, NewSession, SessionSeat};
use uncolympics::TournamentEngine;

/// Engine on a fresh migrated in-memory database whose die replays `faces`.
pub async fn engine_with_dice(faces: &[i16]) -> TournamentEngine {
    backend_test_support::logging::init();
    let db = bootstrap_db(DbKind::SqliteMemory)
        .await
        .expect("bootstrap in-memory db");
    TournamentEngine::new(db, EngineConfig::default())
        .with_dice(Arc::new(ScriptedDice::new(faces.to_vec())))
}

pub async fn create_session(engine: &TournamentEngine, round_target: i32) -> SessionSeat {
    engine
        .create_session(NewSession {
            name: "Backyard Games".into(),
            room_code: None,
            round_target,
            referee_name: "Ref".into(),
            device_token: unique_device_token(),
        })
        .await
        .expect("create session")
}

pub async fn join_player(engine: &TournamentEngine, room_code: &str, name: &str) -> Participant {
    engine
        .join_session(room_code, name, &unique_device_token(), ParticipantRole::Player)
        .await
        .expect("join session")
        .participant
}

/// Catalog entry whose `points` statistic crowns a "Top Scorer".
pub async fn scored_game(engine: &TournamentEngine, name: &str) -> CatalogEntry {
    engine
        .create_global_catalog_entry(NewCatalogEntry {
            name: name.into(),
            description: String::new(),
            rule_key: None,
            stat_schema: StatSchema(vec![StatField {
                key: "points".into(),
                label: "Points".into(),
                title: Some(TitleSpec {
                    name: format!("{name} Top Scorer"),
                    description: "Most points".into(),
                    pick: Pick::Max,
                    humorous: false,
                    points: None,
                }),
            }]),
        })
        .await
        .expect("create catalog entry")
}

/// Two teams created Red then Blue, each with an elected leader
/// (`players[0]`).
pub struct Party {
    pub engine: TournamentEngine,
    pub session_id: String,
    pub room_code: String,
    pub referee: Participant,
    pub red: Team,
    pub blue: Team,
    pub red_players: Vec<Participant>,
    pub blue_players: Vec<Participant>,
}

impl Party {
    pub fn red_leader(&self) -> &Participant {
        &self.red_players[0]
    }

    pub fn blue_leader(&self) -> &Participant {
        &self.blue_players[0]
    }

    pub fn leader_of(&self, team_id: &str) -> &Participant {
        if team_id == self.red.id {
            self.red_leader()
        } else {
            self.blue_leader()
        }
    }

    pub fn players(&self) -> impl Iterator<Item = &Participant> {
        self.red_players.iter().chain(self.blue_players.iter())
    }
}

pub async fn formed_party(
    engine: TournamentEngine,
    round_target: i32,
    per_team: usize,
) -> Party {
    let seat = create_session(&engine, round_target).await;
    let session_id = seat.session.id.clone();
    let room_code = seat.session.room_code.clone();
    let referee = seat.participant;

    let mut teams = Vec::new();
    let mut rosters = Vec::new();
    for team_name in ["Red", "Blue"] {
        let mut players = Vec::new();
        for i in 0..per_team {
            players.push(join_player(&engine, &room_code, &format!("{team_name} {i}")).await);
        }
        let team = engine
            .create_team(&session_id, &players[0].id, team_name)
            .await
            .expect("create team");
        for p in &players {
            engine
                .join_team(&session_id, &p.id, &p.id, &team.id)
                .await
                .expect("join team");
        }
        for p in &players {
            engine
                .vote_for_leader(&session_id, &p.id, &team.id, &players[0].id)
                .await
                .expect("vote");
        }
        teams.push(team);
        rosters.push(players);
    }

    let blue_players = rosters.pop().expect("blue roster");
    let red_players = rosters.pop().expect("red roster");
    let blue = teams.pop().expect("blue");
    let red = teams.pop().expect("red");

    Party {
        engine,
        session_id,
        room_code,
        referee,
        red,
        blue,
        red_players: refreshed(&red_players),
        blue_players: refreshed(&blue_players),
    }
}

fn refreshed(players: &[Participant]) -> Vec<Participant> {
    players
        .iter()
        .enumerate()
        .map(|(i, p)| Participant {
            is_leader: i == 0,
            ..p.clone()
        })
        .collect()
}

/// Started session whose dice roll Red wins (Red 3, Blue 5, target 2) and
/// is confirmed, so Red holds the first draft turn.
pub async fn drafting_party(round_target: i32) -> Party {
    let party = formed_party(engine_with_dice(&[2]).await, round_target, 2).await;
    let engine = &party.engine;
    engine
        .start_session(&party.session_id, &party.referee.id)
        .await
        .expect("start");
    engine
        .submit_dice_pick(&party.session_id, &party.red_leader().id, &party.red.id, 3)
        .await
        .expect("red pick");
    engine
        .submit_dice_pick(&party.session_id, &party.blue_leader().id, &party.blue.id, 5)
        .await
        .expect("blue pick");
    engine
        .confirm_dice_winner(&party.session_id, &party.red_leader().id)
        .await
        .expect("confirm");
    party
}

/// Draft `catalog` for the team holding the turn and play it to
/// completion: each `(participant, points)` is self-reported, then the
/// referee records `winner` and walks the game through titles.
pub async fn play_game(
    party: &Party,
    catalog: &CatalogEntry,
    points: &[(&Participant, f64)],
    winner: GameOutcome,
) -> GameAdvance {
    let engine = &party.engine;
    let sid = party.session_id.as_str();
    let referee = party.referee.id.as_str();

    let session = engine.session_snapshot(sid).await.expect("snapshot").session;
    let team_id = session.active_draft_team_id.expect("a team holds the draft turn");
    let game = engine
        .pick_game(sid, &party.leader_of(&team_id).id, &team_id, &catalog.id)
        .await
        .expect("pick");

    engine
        .advance_game_status(sid, referee, &game.id, GameStatus::Scoring)
        .await
        .expect("to scoring");
    for (player, value) in points {
        engine
            .submit_statistic(sid, &player.id, &game.id, &player.id, "points", *value)
            .await
            .expect("statistic");
    }
    engine
        .record_game_result(sid, referee, &game.id, winner)
        .await
        .expect("result");
    engine
        .advance_game_status(sid, referee, &game.id, GameStatus::Titles)
        .await
        .expect("to titles");
    engine
        .advance_game_status(sid, referee, &game.id, GameStatus::Completed)
        .await
        .expect("to completed")
}
