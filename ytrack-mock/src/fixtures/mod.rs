pub mod card;
pub mod explore;
