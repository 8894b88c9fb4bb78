pub mod prelude;

pub mod commentaries;
pub mod episode_history;
pub mod episodes;
pub mod favorites;
pub mod podcast_categories;
pub mod podcasts;
pub mod ratings;
pub mod user_roles;
pub mod users;
