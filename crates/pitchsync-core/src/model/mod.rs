pub mod audit;
pub mod club;
pub mod competition;
pub mod fixture;
pub mod ground;
pub mod player;
pub mod team;

pub use audit::IngestionAudit;
pub use club::Club;
pub use competition::{Competition, CompetitionType, Season};
pub use fixture::{Fixture, MatchResult};
pub use ground::{Ground, Group};
pub use player::Player;
pub use team::{Team, TeamType};
