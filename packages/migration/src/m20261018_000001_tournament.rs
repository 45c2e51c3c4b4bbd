use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKey, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

// ----- Iden enums for tables & columns -----
#[derive(Iden)]
enum Sessions {
    Table,
    Id,
    Name,
    RoomCode,
    Status,
    RoundTarget,
    ActiveDraftTeamId,
    OnDeckTeamId,
    OwnerId,
    GlobalTitlesAt,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Teams {
    Table,
    Id,
    SessionId,
    Name,
    Score,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Participants {
    Table,
    Id,
    SessionId,
    Name,
    Role,
    TeamId,
    IsLeader,
    DeviceToken,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum LeaderVotes {
    Table,
    Id,
    TeamId,
    VoterId,
    CandidateId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum GameCatalog {
    Table,
    Id,
    SessionId,
    Name,
    Description,
    RuleKey,
    StatSchema,
    CreatedAt,
}

#[derive(Iden)]
enum DraftedGames {
    Table,
    Id,
    SessionId,
    CatalogId,
    DraftOrder,
    PickingTeamId,
    Status,
    ResultKind,
    WinningTeamId,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum DiceRolls {
    Table,
    SessionId,
    Round,
    Target,
    WinnerTeamId,
    ConfirmedAt,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum DicePicks {
    Table,
    Id,
    SessionId,
    Round,
    TeamId,
    ParticipantId,
    Value,
    CreatedAt,
}

#[derive(Iden)]
enum Statistics {
    Table,
    Id,
    DraftedGameId,
    ParticipantId,
    Key,
    Value,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Titles {
    Table,
    Id,
    SessionId,
    DraftedGameId,
    ParticipantId,
    Name,
    Description,
    IsHumorous,
    Points,
    CreatedAt,
}

fn id_col<T: Iden + 'static>(col: T) -> ColumnDef {
    ColumnDef::new(col).string().not_null().primary_key().to_owned()
}

fn ts_col<T: Iden + 'static>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // sessions
        // active_draft_team_id / on_deck_team_id / owner_id are plain columns:
        // teams and participants reference sessions, so these cannot be FKs.
        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(id_col(Sessions::Id))
                    .col(ColumnDef::new(Sessions::Name).string().not_null())
                    .col(ColumnDef::new(Sessions::RoomCode).string_len(5).not_null())
                    .col(
                        ColumnDef::new(Sessions::Status)
                            .string()
                            .not_null()
                            .default("forming"),
                    )
                    .col(ColumnDef::new(Sessions::RoundTarget).integer().not_null())
                    .col(ColumnDef::new(Sessions::ActiveDraftTeamId).string().null())
                    .col(ColumnDef::new(Sessions::OnDeckTeamId).string().null())
                    .col(ColumnDef::new(Sessions::OwnerId).string().null())
                    .col(
                        ColumnDef::new(Sessions::GlobalTitlesAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Sessions::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ts_col(Sessions::CreatedAt))
                    .col(ts_col(Sessions::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sessions_room_code")
                    .table(Sessions::Table)
                    .col(Sessions::RoomCode)
                    .to_owned(),
            )
            .await?;

        // teams
        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(id_col(Teams::Id))
                    .col(ColumnDef::new(Teams::SessionId).string().not_null())
                    .col(ColumnDef::new(Teams::Name).string().not_null())
                    .col(
                        ColumnDef::new(Teams::Score)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Teams::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ts_col(Teams::CreatedAt))
                    .col(ts_col(Teams::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_session")
                            .from(Teams::Table, Teams::SessionId)
                            .to(Sessions::Table, Sessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_teams_session")
                    .table(Teams::Table)
                    .col(Teams::SessionId)
                    .to_owned(),
            )
            .await?;

        // participants
        manager
            .create_table(
                Table::create()
                    .table(Participants::Table)
                    .if_not_exists()
                    .col(id_col(Participants::Id))
                    .col(ColumnDef::new(Participants::SessionId).string().not_null())
                    .col(ColumnDef::new(Participants::Name).string().not_null())
                    .col(ColumnDef::new(Participants::Role).string().not_null())
                    .col(ColumnDef::new(Participants::TeamId).string().null())
                    .col(
                        ColumnDef::new(Participants::IsLeader)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Participants::DeviceToken).string().not_null())
                    .col(ts_col(Participants::CreatedAt))
                    .col(ts_col(Participants::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participants_session")
                            .from(Participants::Table, Participants::SessionId)
                            .to(Sessions::Table, Sessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participants_team")
                            .from(Participants::Table, Participants::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_participants_session_device_unique")
                    .table(Participants::Table)
                    .col(Participants::SessionId)
                    .col(Participants::DeviceToken)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_participants_device")
                    .table(Participants::Table)
                    .col(Participants::DeviceToken)
                    .to_owned(),
            )
            .await?;

        // At most one leader per team. Both backends accept partial indexes;
        // the referee (leader, no team) is exempt because NULLs are distinct.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS uq_team_single_leader \
                 ON participants (team_id) WHERE is_leader",
            )
            .await?;

        // leader_votes
        manager
            .create_table(
                Table::create()
                    .table(LeaderVotes::Table)
                    .if_not_exists()
                    .col(id_col(LeaderVotes::Id))
                    .col(ColumnDef::new(LeaderVotes::TeamId).string().not_null())
                    .col(ColumnDef::new(LeaderVotes::VoterId).string().not_null())
                    .col(ColumnDef::new(LeaderVotes::CandidateId).string().not_null())
                    .col(ts_col(LeaderVotes::CreatedAt))
                    .col(ts_col(LeaderVotes::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_leader_votes_team")
                            .from(LeaderVotes::Table, LeaderVotes::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_leader_votes_voter")
                            .from(LeaderVotes::Table, LeaderVotes::VoterId)
                            .to(Participants::Table, Participants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_leader_votes_candidate")
                            .from(LeaderVotes::Table, LeaderVotes::CandidateId)
                            .to(Participants::Table, Participants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_leader_votes_team_voter_unique")
                    .table(LeaderVotes::Table)
                    .col(LeaderVotes::TeamId)
                    .col(LeaderVotes::VoterId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // game_catalog
        manager
            .create_table(
                Table::create()
                    .table(GameCatalog::Table)
                    .if_not_exists()
                    .col(id_col(GameCatalog::Id))
                    .col(ColumnDef::new(GameCatalog::SessionId).string().null())
                    .col(ColumnDef::new(GameCatalog::Name).string().not_null())
                    .col(
                        ColumnDef::new(GameCatalog::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(GameCatalog::RuleKey).string().not_null())
                    .col(ColumnDef::new(GameCatalog::StatSchema).text().not_null())
                    .col(ts_col(GameCatalog::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_catalog_session")
                            .from(GameCatalog::Table, GameCatalog::SessionId)
                            .to(Sessions::Table, Sessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // drafted_games
        manager
            .create_table(
                Table::create()
                    .table(DraftedGames::Table)
                    .if_not_exists()
                    .col(id_col(DraftedGames::Id))
                    .col(ColumnDef::new(DraftedGames::SessionId).string().not_null())
                    .col(ColumnDef::new(DraftedGames::CatalogId).string().not_null())
                    .col(ColumnDef::new(DraftedGames::DraftOrder).integer().not_null())
                    .col(ColumnDef::new(DraftedGames::PickingTeamId).string().not_null())
                    .col(ColumnDef::new(DraftedGames::Status).string().not_null())
                    .col(ColumnDef::new(DraftedGames::ResultKind).string().null())
                    .col(ColumnDef::new(DraftedGames::WinningTeamId).string().null())
                    .col(
                        ColumnDef::new(DraftedGames::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ts_col(DraftedGames::CreatedAt))
                    .col(ts_col(DraftedGames::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_drafted_games_session")
                            .from(DraftedGames::Table, DraftedGames::SessionId)
                            .to(Sessions::Table, Sessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_drafted_games_catalog")
                            .from(DraftedGames::Table, DraftedGames::CatalogId)
                            .to(GameCatalog::Table, GameCatalog::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_drafted_games_team")
                            .from(DraftedGames::Table, DraftedGames::PickingTeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_drafted_games_session_catalog_unique")
                    .table(DraftedGames::Table)
                    .col(DraftedGames::SessionId)
                    .col(DraftedGames::CatalogId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_drafted_games_session_order_unique")
                    .table(DraftedGames::Table)
                    .col(DraftedGames::SessionId)
                    .col(DraftedGames::DraftOrder)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // dice_rolls (one row per session)
        manager
            .create_table(
                Table::create()
                    .table(DiceRolls::Table)
                    .if_not_exists()
                    .col(id_col(DiceRolls::SessionId))
                    .col(
                        ColumnDef::new(DiceRolls::Round)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(DiceRolls::Target).small_integer().null())
                    .col(ColumnDef::new(DiceRolls::WinnerTeamId).string().null())
                    .col(
                        ColumnDef::new(DiceRolls::ConfirmedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(DiceRolls::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ts_col(DiceRolls::CreatedAt))
                    .col(ts_col(DiceRolls::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dice_rolls_session")
                            .from(DiceRolls::Table, DiceRolls::SessionId)
                            .to(Sessions::Table, Sessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // dice_picks
        manager
            .create_table(
                Table::create()
                    .table(DicePicks::Table)
                    .if_not_exists()
                    .col(id_col(DicePicks::Id))
                    .col(ColumnDef::new(DicePicks::SessionId).string().not_null())
                    .col(ColumnDef::new(DicePicks::Round).integer().not_null())
                    .col(ColumnDef::new(DicePicks::TeamId).string().not_null())
                    .col(ColumnDef::new(DicePicks::ParticipantId).string().not_null())
                    .col(ColumnDef::new(DicePicks::Value).small_integer().not_null())
                    .col(ts_col(DicePicks::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dice_picks_roll")
                            .from(DicePicks::Table, DicePicks::SessionId)
                            .to(DiceRolls::Table, DiceRolls::SessionId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dice_picks_team")
                            .from(DicePicks::Table, DicePicks::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dice_picks_session_round_team_unique")
                    .table(DicePicks::Table)
                    .col(DicePicks::SessionId)
                    .col(DicePicks::Round)
                    .col(DicePicks::TeamId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // statistics
        manager
            .create_table(
                Table::create()
                    .table(Statistics::Table)
                    .if_not_exists()
                    .col(id_col(Statistics::Id))
                    .col(ColumnDef::new(Statistics::DraftedGameId).string().not_null())
                    .col(ColumnDef::new(Statistics::ParticipantId).string().not_null())
                    .col(ColumnDef::new(Statistics::Key).string().not_null())
                    .col(ColumnDef::new(Statistics::Value).double().not_null())
                    .col(ts_col(Statistics::CreatedAt))
                    .col(ts_col(Statistics::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_statistics_game")
                            .from(Statistics::Table, Statistics::DraftedGameId)
                            .to(DraftedGames::Table, DraftedGames::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_statistics_participant")
                            .from(Statistics::Table, Statistics::ParticipantId)
                            .to(Participants::Table, Participants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_statistics_game_participant_key_unique")
                    .table(Statistics::Table)
                    .col(Statistics::DraftedGameId)
                    .col(Statistics::ParticipantId)
                    .col(Statistics::Key)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // titles (append-only)
        manager
            .create_table(
                Table::create()
                    .table(Titles::Table)
                    .if_not_exists()
                    .col(id_col(Titles::Id))
                    .col(ColumnDef::new(Titles::SessionId).string().not_null())
                    .col(ColumnDef::new(Titles::DraftedGameId).string().null())
                    .col(ColumnDef::new(Titles::ParticipantId).string().not_null())
                    .col(ColumnDef::new(Titles::Name).string().not_null())
                    .col(
                        ColumnDef::new(Titles::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Titles::IsHumorous)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Titles::Points).double().not_null())
                    .col(ts_col(Titles::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_titles_session")
                            .from(Titles::Table, Titles::SessionId)
                            .to(Sessions::Table, Sessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_titles_game")
                            .from(Titles::Table, Titles::DraftedGameId)
                            .to(DraftedGames::Table, DraftedGames::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_titles_participant")
                            .from(Titles::Table, Titles::ParticipantId)
                            .to(Participants::Table, Participants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_titles_session")
                    .table(Titles::Table)
                    .col(Titles::SessionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Titles::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Statistics::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DicePicks::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DiceRolls::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DraftedGames::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GameCatalog::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LeaderVotes::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Participants::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teams::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sessions::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
