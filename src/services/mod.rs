pub mod authorization;
pub use authorization::can_mutate;

pub mod sequencing;
pub use sequencing::{SeasonChapter, SequenceViolation, validate_append};

pub mod user_service;
pub use user_service::{UserError, UserService};

pub mod user_service_impl;
pub use user_service_impl::SeaOrmUserService;

pub mod podcast_service;
pub use podcast_service::{PodcastError, PodcastService};

pub mod podcast_service_impl;
pub use podcast_service_impl::SeaOrmPodcastService;

pub mod episode_service;
pub use episode_service::{EpisodeError, EpisodeService};

pub mod episode_service_impl;
pub use episode_service_impl::SeaOrmEpisodeService;

pub mod rating_service;
pub use rating_service::{RatingError, RatingService};

pub mod rating_service_impl;
pub use rating_service_impl::SeaOrmRatingService;
