//! Account-deletion cascade tests: the fail-closed guard and the full
//! reference-closure removal.

use podarr::config::Config;
use podarr::db::Store;
use podarr::db::repositories::rating::RatingRepository;
use podarr::domain::{EpisodeId, PodcastId, UserId};
use podarr::models::episode::EpisodeDraft;
use podarr::models::podcast::PodcastDraft;
use podarr::models::user::RegisterUser;
use podarr::services::{EpisodeService, PodcastService, RatingService, UserError, UserService};

async fn spawn_catalog() -> podarr::Catalog {
    let db_path =
        std::env::temp_dir().join(format!("podarr-cascade-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
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

/// Owner with a podcast and one episode, plus an unrelated bystander who
/// played, rated, commented on, and favorited the owner's content.
struct Fixture {
    owner: UserId,
    bystander: UserId,
    owner_podcast: PodcastId,
    owner_episode: EpisodeId,
    bystander_podcast: PodcastId,
    bystander_episode: EpisodeId,
}

async fn build_fixture(catalog: &podarr::Catalog) -> Fixture {
    let owner = catalog.users.register(register_draft("owner")).await.unwrap();
    let bystander = catalog
        .users
        .register(register_draft("bystander"))
        .await
        .unwrap();

    let owner_podcast = catalog
        .podcasts
        .create_podcast(owner, podcast_draft("Owner Show"))
        .await
        .unwrap();
    let owner_episode = catalog
        .episodes
        .append_episode(owner_podcast, episode_draft(1, 1))
        .await
        .unwrap();

    let bystander_podcast = catalog
        .podcasts
        .create_podcast(bystander, podcast_draft("Bystander Show"))
        .await
        .unwrap();
    let bystander_episode = catalog
        .episodes
        .append_episode(bystander_podcast, episode_draft(1, 1))
        .await
        .unwrap();

    // Bystander activity on the owner's content.
    catalog
        .episodes
        .record_play(bystander, owner_episode, None)
        .await
        .unwrap();
    catalog
        .episodes
        .comment_episode(bystander, owner_episode, "Great episode")
        .await
        .unwrap();
    catalog.ratings.rate(owner_episode, bystander, 9).await.unwrap();
    catalog.users.add_favorite(bystander, owner_podcast).await.unwrap();

    // Owner activity on the bystander's content.
    catalog
        .episodes
        .record_play(owner, bystander_episode, None)
        .await
        .unwrap();
    catalog
        .episodes
        .comment_episode(owner, bystander_episode, "Nice show")
        .await
        .unwrap();
    catalog.ratings.rate(bystander_episode, owner, 7).await.unwrap();
    catalog.users.add_favorite(owner, bystander_podcast).await.unwrap();

    Fixture {
        owner,
        bystander,
        owner_podcast,
        owner_episode,
        bystander_podcast,
        bystander_episode,
    }
}

#[tokio::test]
async fn deletion_fails_closed_while_a_podcast_is_active() {
    let catalog = spawn_catalog().await;
    let fixture = build_fixture(&catalog).await;

    assert!(matches!(
        catalog.users.delete_user(fixture.owner).await,
        Err(UserError::OwnsActivePodcasts(_))
    ));

    // Nothing was touched: account, podcast, episode, and the bystander's
    // commentary are all still there.
    assert!(catalog.store.users().exists(fixture.owner.value()).await.unwrap());
    assert!(
        catalog
            .store
            .podcasts()
            .get(fixture.owner_podcast.value())
            .await
            .unwrap()
            .is_some()
    );
    assert_eq!(
        catalog
            .episodes
            .get_comments(fixture.owner_episode)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn admin_accounts_hit_the_same_guard() {
    let catalog = spawn_catalog().await;

    let admin = catalog.users.get_user_by_username("admin").await.unwrap();
    let admin_id = UserId::new(admin.id);
    catalog
        .podcasts
        .create_podcast(admin_id, podcast_draft("Admin Show"))
        .await
        .unwrap();

    assert!(matches!(
        catalog.users.delete_user(admin_id).await,
        Err(UserError::OwnsActivePodcasts(_))
    ));
}

#[tokio::test]
async fn deleting_an_unknown_user_reports_not_found() {
    let catalog = spawn_catalog().await;
    assert!(matches!(
        catalog.users.delete_user(UserId::new(99_999)).await,
        Err(UserError::NotFound(_))
    ));
}

#[tokio::test]
async fn cascade_removes_the_full_closure_and_spares_bystanders() {
    let catalog = spawn_catalog().await;
    let fixture = build_fixture(&catalog).await;

    // Deactivate the owner's podcast so the guard lets the deletion through.
    let owner_roles = catalog.users.roles(fixture.owner).await.unwrap();
    catalog
        .podcasts
        .deactivate_podcast(fixture.owner, &owner_roles, fixture.owner_podcast)
        .await
        .unwrap();

    catalog.users.delete_user(fixture.owner).await.unwrap();

    // The account and its role rows are gone.
    assert!(!catalog.store.users().exists(fixture.owner.value()).await.unwrap());
    assert!(
        catalog
            .store
            .users()
            .roles(fixture.owner.value())
            .await
            .unwrap()
            .is_empty()
    );

    // The owner's podcast and episode are gone, along with the bystander's
    // commentary, rating, history, and favorite that pointed at them.
    assert!(
        catalog
            .store
            .podcasts()
            .get(fixture.owner_podcast.value())
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        catalog
            .store
            .episodes()
            .get(fixture.owner_episode.value())
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        catalog
            .store
            .commentaries()
            .list_by_episode(fixture.owner_episode.value())
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        RatingRepository::scores_for_episode(&catalog.store.conn, fixture.owner_episode.value())
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        !catalog
            .store
            .favorites()
            .exists(fixture.bystander.value(), fixture.owner_podcast.value())
            .await
            .unwrap()
    );
    let bystander_history = catalog
        .users
        .listening_history(fixture.bystander)
        .await
        .unwrap();
    assert!(
        bystander_history
            .iter()
            .all(|entry| entry.episode_id != fixture.owner_episode.value())
    );

    // The owner's own activity on the bystander's content is gone too.
    assert!(
        catalog
            .episodes
            .get_comments(fixture.bystander_episode)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        RatingRepository::scores_for_episode(
            &catalog.store.conn,
            fixture.bystander_episode.value()
        )
        .await
        .unwrap()
        .is_empty()
    );

    // The bystander's account and content survive untouched.
    assert!(
        catalog
            .store
            .users()
            .exists(fixture.bystander.value())
            .await
            .unwrap()
    );
    assert!(
        catalog
            .store
            .podcasts()
            .get(fixture.bystander_podcast.value())
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        catalog
            .store
            .episodes()
            .get(fixture.bystander_episode.value())
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn deleting_a_commenter_keeps_the_content_they_touched() {
    let catalog = spawn_catalog().await;
    let fixture = build_fixture(&catalog).await;

    let roles = catalog.users.roles(fixture.bystander).await.unwrap();
    catalog
        .podcasts
        .deactivate_podcast(fixture.bystander, &roles, fixture.bystander_podcast)
        .await
        .unwrap();

    catalog.users.delete_user(fixture.bystander).await.unwrap();

    // The owner's episode survives; only the deleted user's activity rows
    // on it disappear.
    assert!(
        catalog
            .store
            .episodes()
            .get(fixture.owner_episode.value())
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        catalog
            .episodes
            .get_comments(fixture.owner_episode)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        RatingRepository::scores_for_episode(&catalog.store.conn, fixture.owner_episode.value())
            .await
            .unwrap()
            .is_empty()
    );

    // The stored episode average still reflects the deleted rating until the
    // next rating write; the catalog remains referentially intact either way.
    assert!(catalog.store.users().exists(fixture.owner.value()).await.unwrap());
}
