pub use super::commentaries::Entity as Commentaries;
pub use super::episode_history::Entity as EpisodeHistory;
pub use super::episodes::Entity as Episodes;
pub use super::favorites::Entity as Favorites;
pub use super::podcast_categories::Entity as PodcastCategories;
pub use super::podcasts::Entity as Podcasts;
pub use super::ratings::Entity as Ratings;
pub use super::user_roles::Entity as UserRoles;
pub use super::users::Entity as Users;
