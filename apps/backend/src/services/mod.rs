//! Engine services.
//!
//! Every mutating method runs inside the caller's transaction and records
//! the entities it changed into an `EventBatch`; the caller publishes the
//! batch after commit.

pub(crate) mod access;
pub mod aggregates;
pub mod catalog;
pub mod dice;
pub mod draft;
pub mod identity;
pub mod lifecycle;
pub mod teams;
pub mod titles;

pub use aggregates::{AggregateService, GameHistory, ParticipantHistory, SessionSnapshot};
pub use catalog::{CatalogService, NewCatalogEntry};
pub use dice::{DiceService, DiceState};
pub use draft::DraftService;
pub use identity::{IdentityService, NewSession, SessionSeat};
pub use lifecycle::{GameAdvance, GameOutcome, LifecycleService};
pub use teams::{TeamService, VoteResult};
pub use titles::TitleService;
