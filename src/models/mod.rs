pub mod episode;
pub mod podcast;
pub mod user;
