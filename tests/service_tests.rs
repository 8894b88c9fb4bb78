//! Service-layer tests for registration, podcast lifecycle, sequencing,
//! ratings, plays, commentary, and favorites.

use podarr::config::Config;
use podarr::db::Store;
use podarr::domain::{PodcastId, Role, UserId};
use podarr::models::episode::{EpisodeDraft, EpisodeUpdate};
use podarr::models::podcast::{PodcastDraft, PodcastUpdate};
use podarr::models::user::{RegisterUser, UserProfileUpdate};
use podarr::services::{
    EpisodeError, EpisodeService, PodcastError, PodcastService, RatingError, RatingService,
    SequenceViolation, UserError, UserService,
};

async fn spawn_catalog() -> podarr::Catalog {
    let db_path = std::env::temp_dir().join(format!("podarr-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    // Cheap Argon2 params keep the suite fast.
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let store = Store::new(&config.general.database_path)
        .await
        .expect("failed to open test database");
    podarr::Catalog::new(store, &config)
}

fn register_draft(tag: &str) -> RegisterUser {
    RegisterUser {
        name: format!("Test {tag}"),
        nickname: format!("nick-{tag}"),
        email: format!("{tag}@example.com"),
        username: format!("user-{tag}"),
        password: "hunter2hunter2".to_string(),
        profile_picture: None,
        bio: None,
    }
}

fn podcast_draft(title: &str) -> PodcastDraft {
    PodcastDraft {
        title: title.to_string(),
        description: "A show about things".to_string(),
        categories: vec!["Technology".to_string()],
    }
}

fn episode_draft(season: i32, chapter: i32) -> EpisodeDraft {
    EpisodeDraft {
        title: format!("S{season}E{chapter}"),
        description: "An episode".to_string(),
        season,
        chapter,
        audio_path: format!("/audio/s{season}e{chapter}.mp3"),
        image_url: None,
        duration_secs: Some(1800),
    }
}

async fn setup_show(catalog: &podarr::Catalog, tag: &str) -> (UserId, PodcastId) {
    let owner = catalog.users.register(register_draft(tag)).await.unwrap();
    let podcast = catalog
        .podcasts
        .create_podcast(owner, podcast_draft(&format!("Show {tag}")))
        .await
        .unwrap();
    (owner, podcast)
}

#[tokio::test]
async fn registration_grants_default_user_role() {
    let catalog = spawn_catalog().await;

    let id = catalog.users.register(register_draft("reg")).await.unwrap();
    let roles = catalog.users.roles(id).await.unwrap();

    assert!(roles.contains(Role::User));
    assert!(!roles.contains(Role::Creator));
    assert!(!roles.is_admin());
}

#[tokio::test]
async fn duplicate_credentials_are_rejected() {
    let catalog = spawn_catalog().await;
    catalog.users.register(register_draft("dup")).await.unwrap();

    let mut same_username = register_draft("other");
    same_username.username = "user-dup".to_string();
    assert!(matches!(
        catalog.users.register(same_username).await,
        Err(UserError::CredentialTaken)
    ));

    let mut same_nickname = register_draft("third");
    same_nickname.nickname = "nick-dup".to_string();
    assert!(matches!(
        catalog.users.register(same_nickname).await,
        Err(UserError::NicknameTaken(_))
    ));
}

#[tokio::test]
async fn verify_credentials_accepts_correct_password_only() {
    let catalog = spawn_catalog().await;
    catalog.users.register(register_draft("login")).await.unwrap();

    let user = catalog
        .users
        .verify_credentials("user-login", "hunter2hunter2")
        .await
        .unwrap();
    assert_eq!(user.username, "user-login");

    assert!(matches!(
        catalog.users.verify_credentials("user-login", "wrong").await,
        Err(UserError::InvalidCredentials)
    ));
    assert!(matches!(
        catalog.users.verify_credentials("nobody", "whatever").await,
        Err(UserError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn first_podcast_grants_creator_role_once() {
    let catalog = spawn_catalog().await;
    let owner = catalog.users.register(register_draft("creator")).await.unwrap();

    catalog
        .podcasts
        .create_podcast(owner, podcast_draft("First Show"))
        .await
        .unwrap();
    assert!(catalog.users.roles(owner).await.unwrap().contains(Role::Creator));

    // Second creation must not trip over the existing role row.
    catalog
        .podcasts
        .create_podcast(owner, podcast_draft("Second Show"))
        .await
        .unwrap();

    let creator_count = catalog
        .users
        .roles(owner)
        .await
        .unwrap()
        .as_slice()
        .iter()
        .filter(|&&r| r == Role::Creator)
        .count();
    assert_eq!(creator_count, 1);
}

#[tokio::test]
async fn active_title_is_unique_until_deactivated() {
    let catalog = spawn_catalog().await;
    let (owner, podcast) = setup_show(&catalog, "title").await;

    let other = catalog.users.register(register_draft("title2")).await.unwrap();
    assert!(matches!(
        catalog
            .podcasts
            .create_podcast(other, podcast_draft("Show title"))
            .await,
        Err(PodcastError::TitleTaken(_))
    ));

    let roles = catalog.users.roles(owner).await.unwrap();
    catalog
        .podcasts
        .deactivate_podcast(owner, &roles, podcast)
        .await
        .unwrap();

    // A deactivated podcast no longer reserves its title.
    catalog
        .podcasts
        .create_podcast(other, podcast_draft("Show title"))
        .await
        .unwrap();
}

#[tokio::test]
async fn deactivated_podcast_reads_as_absent() {
    let catalog = spawn_catalog().await;
    let (owner, podcast) = setup_show(&catalog, "hide").await;

    let roles = catalog.users.roles(owner).await.unwrap();
    catalog
        .podcasts
        .deactivate_podcast(owner, &roles, podcast)
        .await
        .unwrap();

    assert!(matches!(
        catalog.podcasts.get_podcast(podcast).await,
        Err(PodcastError::NotFound(_))
    ));
    assert!(catalog.podcasts.list_podcasts().await.unwrap().is_empty());

    // The owner still sees it in their own listing.
    let own = catalog.podcasts.list_by_owner(owner).await.unwrap();
    assert_eq!(own.len(), 1);
    assert!(!own[0].is_active);
}

#[tokio::test]
async fn only_owner_or_admin_may_mutate_podcast() {
    let catalog = spawn_catalog().await;
    let (_, podcast) = setup_show(&catalog, "guard").await;

    let stranger = catalog.users.register(register_draft("stranger")).await.unwrap();
    let stranger_roles = catalog.users.roles(stranger).await.unwrap();

    let update = PodcastUpdate {
        description: Some("hijacked".to_string()),
        ..PodcastUpdate::default()
    };
    assert!(matches!(
        catalog
            .podcasts
            .update_podcast(stranger, &stranger_roles, podcast, update.clone())
            .await,
        Err(PodcastError::Unauthorized(_))
    ));

    // The seeded admin account passes the same guard.
    let admin = catalog.users.get_user_by_username("admin").await.unwrap();
    let admin_id = UserId::new(admin.id);
    let admin_roles = catalog.users.roles(admin_id).await.unwrap();
    assert!(admin_roles.is_admin());

    catalog
        .podcasts
        .update_podcast(admin_id, &admin_roles, podcast, update)
        .await
        .unwrap();
}

#[tokio::test]
async fn episode_sequencing_is_enforced_on_append() {
    let catalog = spawn_catalog().await;
    let (_, podcast) = setup_show(&catalog, "seq").await;

    // First episode may open anywhere valid.
    catalog
        .episodes
        .append_episode(podcast, episode_draft(1, 3))
        .await
        .unwrap();

    // Same or earlier position is rejected.
    assert!(matches!(
        catalog.episodes.append_episode(podcast, episode_draft(1, 3)).await,
        Err(EpisodeError::InvalidSequence(SequenceViolation::NotAfterLast { .. }))
    ));
    assert!(matches!(
        catalog.episodes.append_episode(podcast, episode_draft(1, 2)).await,
        Err(EpisodeError::InvalidSequence(SequenceViolation::NotAfterLast { .. }))
    ));

    // Later chapter in the same season is fine, gaps included.
    catalog
        .episodes
        .append_episode(podcast, episode_draft(1, 7))
        .await
        .unwrap();

    // A new season must restart at chapter 1.
    assert!(matches!(
        catalog.episodes.append_episode(podcast, episode_draft(2, 5)).await,
        Err(EpisodeError::InvalidSequence(SequenceViolation::ChapterNotReset { .. }))
    ));
    catalog
        .episodes
        .append_episode(podcast, episode_draft(2, 1))
        .await
        .unwrap();

    // Non-positive positions never pass.
    assert!(matches!(
        catalog.episodes.append_episode(podcast, episode_draft(0, 1)).await,
        Err(EpisodeError::InvalidSequence(SequenceViolation::NotPositive { .. }))
    ));

    let listed = catalog.episodes.list_episodes(podcast).await.unwrap();
    let positions: Vec<(i32, i32)> = listed.iter().map(|e| (e.season, e.chapter)).collect();
    assert_eq!(positions, vec![(1, 3), (1, 7), (2, 1)]);
}

#[tokio::test]
async fn rating_upserts_and_recomputes_average() {
    let catalog = spawn_catalog().await;
    let (_, podcast) = setup_show(&catalog, "rate").await;
    let episode = catalog
        .episodes
        .append_episode(podcast, episode_draft(1, 1))
        .await
        .unwrap();

    let alice = catalog.users.register(register_draft("alice")).await.unwrap();
    let bob = catalog.users.register(register_draft("bob")).await.unwrap();

    // Out-of-range scores fail before any write.
    assert!(matches!(
        catalog.ratings.rate(episode, alice, 0).await,
        Err(RatingError::InvalidScore { .. })
    ));
    assert!(matches!(
        catalog.ratings.rate(episode, alice, 11).await,
        Err(RatingError::InvalidScore { .. })
    ));
    assert!(matches!(
        catalog.ratings.episode_average(episode).await,
        Err(RatingError::NoRatings(_))
    ));

    catalog.ratings.rate(episode, alice, 4).await.unwrap();
    catalog.ratings.rate(episode, bob, 8).await.unwrap();
    let average = catalog.ratings.episode_average(episode).await.unwrap();
    assert!((average - 6.0).abs() < f64::EPSILON);

    // A repeat rating replaces the old score instead of adding a row.
    catalog.ratings.rate(episode, alice, 10).await.unwrap();
    let average = catalog.ratings.episode_average(episode).await.unwrap();
    assert!((average - 9.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn podcast_average_skips_unrated_episodes() {
    let catalog = spawn_catalog().await;
    let (_, podcast) = setup_show(&catalog, "avg").await;

    let rated = catalog
        .episodes
        .append_episode(podcast, episode_draft(1, 1))
        .await
        .unwrap();
    let _unrated = catalog
        .episodes
        .append_episode(podcast, episode_draft(1, 2))
        .await
        .unwrap();

    assert_eq!(catalog.ratings.podcast_average(podcast).await.unwrap(), None);

    let user = catalog.users.register(register_draft("avg-user")).await.unwrap();
    catalog.ratings.rate(rated, user, 8).await.unwrap();

    // The unrated episode does not drag the average toward zero.
    let average = catalog.ratings.podcast_average(podcast).await.unwrap().unwrap();
    assert!((average - 8.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn record_play_bumps_views_and_unlocks_commentary() {
    let catalog = spawn_catalog().await;
    let (_, podcast) = setup_show(&catalog, "play").await;
    let episode = catalog
        .episodes
        .append_episode(podcast, episode_draft(1, 1))
        .await
        .unwrap();
    let listener = catalog.users.register(register_draft("listener")).await.unwrap();

    // Commentary is gated on a play record.
    assert!(matches!(
        catalog.episodes.comment_episode(listener, episode, "First!").await,
        Err(EpisodeError::NotListened { .. })
    ));

    catalog
        .episodes
        .record_play(listener, episode, Some(120))
        .await
        .unwrap();
    catalog
        .episodes
        .record_play(listener, episode, Some(900))
        .await
        .unwrap();

    let loaded = catalog.episodes.get_episode(episode).await.unwrap();
    assert_eq!(loaded.views, 2);

    catalog
        .episodes
        .comment_episode(listener, episode, "First!")
        .await
        .unwrap();
    assert!(matches!(
        catalog.episodes.comment_episode(listener, episode, "   ").await,
        Err(EpisodeError::Validation(_))
    ));

    let comments = catalog.episodes.get_comments(episode).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].content, "First!");
}

#[tokio::test]
async fn listening_history_collapses_repeat_plays() {
    let catalog = spawn_catalog().await;
    let (_, podcast) = setup_show(&catalog, "hist").await;
    let first = catalog
        .episodes
        .append_episode(podcast, episode_draft(1, 1))
        .await
        .unwrap();
    let second = catalog
        .episodes
        .append_episode(podcast, episode_draft(1, 2))
        .await
        .unwrap();
    let listener = catalog.users.register(register_draft("hist-user")).await.unwrap();

    catalog.episodes.record_play(listener, first, None).await.unwrap();
    catalog.episodes.record_play(listener, second, None).await.unwrap();
    catalog.episodes.record_play(listener, first, None).await.unwrap();

    let history = catalog.users.listening_history(listener).await.unwrap();
    assert_eq!(history.len(), 2);
    // Newest first; the repeated episode surfaces once, at its latest play.
    assert_eq!(history[0].episode_id, first.value());
    assert_eq!(history[1].episode_id, second.value());
}

#[tokio::test]
async fn favorites_reject_duplicates_and_absent_removals() {
    let catalog = spawn_catalog().await;
    let (_, podcast) = setup_show(&catalog, "fav").await;
    let fan = catalog.users.register(register_draft("fan")).await.unwrap();

    catalog.users.add_favorite(fan, podcast).await.unwrap();
    assert!(matches!(
        catalog.users.add_favorite(fan, podcast).await,
        Err(UserError::AlreadyFavorite { .. })
    ));

    let favorites = catalog.users.favorites(fan).await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, podcast.value());

    catalog.users.remove_favorite(fan, podcast).await.unwrap();
    assert!(matches!(
        catalog.users.remove_favorite(fan, podcast).await,
        Err(UserError::NotFavorite { .. })
    ));
    assert!(catalog.users.favorites(fan).await.unwrap().is_empty());
}

#[tokio::test]
async fn remove_favorite_checks_user_and_podcast_first() {
    let catalog = spawn_catalog().await;
    let (owner, podcast) = setup_show(&catalog, "favchk").await;
    let fan = catalog.users.register(register_draft("favchk-fan")).await.unwrap();
    catalog.users.add_favorite(fan, podcast).await.unwrap();

    assert!(matches!(
        catalog
            .users
            .remove_favorite(UserId::new(99_999), podcast)
            .await,
        Err(UserError::NotFound(_))
    ));
    assert!(matches!(
        catalog
            .users
            .remove_favorite(fan, PodcastId::new(99_999))
            .await,
        Err(UserError::PodcastNotFound(_))
    ));

    // Deactivation does not strand the favorite.
    let roles = catalog.users.roles(owner).await.unwrap();
    catalog
        .podcasts
        .deactivate_podcast(owner, &roles, podcast)
        .await
        .unwrap();
    catalog.users.remove_favorite(fan, podcast).await.unwrap();
}

#[tokio::test]
async fn failed_category_rewrite_keeps_the_previous_categories() {
    let catalog = spawn_catalog().await;
    let (owner, podcast) = setup_show(&catalog, "cat").await;
    let roles = catalog.users.roles(owner).await.unwrap();

    // A duplicated category trips the composite key on the second insert;
    // the cleared list must come back with the rollback.
    let update = PodcastUpdate {
        categories: Some(vec!["News".to_string(), "News".to_string()]),
        ..PodcastUpdate::default()
    };
    assert!(
        catalog
            .podcasts
            .update_podcast(owner, &roles, podcast, update)
            .await
            .is_err()
    );

    let loaded = catalog.podcasts.get_podcast(podcast).await.unwrap();
    assert_eq!(loaded.categories, vec!["Technology".to_string()]);
}

#[tokio::test]
async fn concurrent_appends_admit_at_most_one_per_slot() {
    let catalog = spawn_catalog().await;
    let (_, podcast) = setup_show(&catalog, "race").await;
    catalog
        .episodes
        .append_episode(podcast, episode_draft(1, 1))
        .await
        .unwrap();

    // Two writers race for the same next slot. The loser either validates
    // against the winner's committed row or trips sqlite's single-writer
    // lock; both landing is the one outcome that must never happen.
    let first = {
        let catalog = catalog.clone();
        tokio::spawn(async move {
            catalog
                .episodes
                .append_episode(podcast, episode_draft(1, 2))
                .await
        })
    };
    let second = {
        let catalog = catalog.clone();
        tokio::spawn(async move {
            catalog
                .episodes
                .append_episode(podcast, episode_draft(1, 2))
                .await
        })
    };
    let first = first.await.unwrap();
    let second = second.await.unwrap();

    assert!(!(first.is_ok() && second.is_ok()));

    let wins = usize::from(first.is_ok()) + usize::from(second.is_ok());
    let listed = catalog.episodes.list_episodes(podcast).await.unwrap();
    let positions: Vec<(i32, i32)> = listed.iter().map(|e| (e.season, e.chapter)).collect();
    assert_eq!(positions.len(), 1 + wins);
    assert_eq!(positions[0], (1, 1));
    if wins == 1 {
        assert_eq!(positions[1], (1, 2));
    }
}

#[tokio::test]
async fn profile_update_validates_and_respects_uniqueness() {
    let catalog = spawn_catalog().await;
    let user = catalog.users.register(register_draft("prof")).await.unwrap();
    catalog.users.register(register_draft("prof2")).await.unwrap();

    assert!(matches!(
        catalog
            .users
            .update_profile(user, UserProfileUpdate::default())
            .await,
        Err(UserError::Validation(_))
    ));

    let collision = UserProfileUpdate {
        nickname: Some("nick-prof2".to_string()),
        ..UserProfileUpdate::default()
    };
    assert!(matches!(
        catalog.users.update_profile(user, collision).await,
        Err(UserError::NicknameTaken(_))
    ));

    let update = UserProfileUpdate {
        bio: Some("New bio".to_string()),
        password: Some("an-even-better-password".to_string()),
        ..UserProfileUpdate::default()
    };
    catalog.users.update_profile(user, update).await.unwrap();

    assert_eq!(
        catalog.users.get_user(user).await.unwrap().bio.as_deref(),
        Some("New bio")
    );
    catalog
        .users
        .verify_credentials("user-prof", "an-even-better-password")
        .await
        .unwrap();
}

#[tokio::test]
async fn episode_update_requires_a_usable_field() {
    let catalog = spawn_catalog().await;
    let (owner, podcast) = setup_show(&catalog, "eu").await;
    let episode = catalog
        .episodes
        .append_episode(podcast, episode_draft(1, 1))
        .await
        .unwrap();
    let roles = catalog.users.roles(owner).await.unwrap();

    assert!(matches!(
        catalog
            .episodes
            .update_episode(owner, &roles, episode, EpisodeUpdate::default())
            .await,
        Err(EpisodeError::Validation(_))
    ));

    let update = EpisodeUpdate {
        title: Some("Renamed".to_string()),
        ..EpisodeUpdate::default()
    };
    catalog
        .episodes
        .update_episode(owner, &roles, episode, update)
        .await
        .unwrap();
    assert_eq!(
        catalog.episodes.get_episode(episode).await.unwrap().title,
        "Renamed"
    );
}
