pub mod commentary;
pub mod episode;
pub mod favorite;
pub mod history;
pub mod podcast;
pub mod rating;
pub mod user;
