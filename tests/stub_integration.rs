//! Stub wiring integration tests
//!
//! End-to-end tests exercising the container, registry resolution, shared
//! state, and the query guard against the stub repositories. No network.

use pawsinus_core::repository::stub::{BORI_ID, MANGO_ID, STUB_USER_ID};
use pawsinus_core::{container, resolve, AppState, Credentials, DiContainer, Mode, QueryGuard};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

fn stub_container() -> DiContainer {
    DiContainer::stub()
}

// ─── Registry resolution ─────────────────────────────────────────

#[tokio::test]
async fn test_every_capability_is_bound_in_both_modes() {
    for mode in [Mode::Debug, Mode::Production] {
        let registry = resolve(mode);
        let names = registry.binding_names();
        assert_eq!(names.len(), 9, "registry incomplete for {}", mode);
        assert!(names.iter().all(|n| !n.is_empty()));
    }
}

#[tokio::test]
async fn test_debug_mode_is_all_stubs_and_deterministic() {
    let registry = resolve(Mode::Debug);
    assert!(registry
        .binding_names()
        .iter()
        .all(|n| n.starts_with("stub-")));

    // Fixed input, fixed output, twice in a row
    let first = registry.dogs.dogs().await.unwrap();
    let second = registry.dogs.dogs().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
    assert_eq!(first[0].id, MANGO_ID);

    let article = registry.articles.article("first-week-home").await.unwrap();
    assert_eq!(article.title, "Your dog's first week at home");
}

#[tokio::test]
async fn test_production_mode_binds_live_adapters() {
    // Wiring only; nothing here performs I/O
    let registry = resolve(Mode::Production);
    let names = registry.binding_names();
    assert!(names.contains(&"supabase-dogs"));
    assert!(names.contains(&"supabase-auth"));
    assert!(names.contains(&"web-images"));
    assert!(names.contains(&"web-push-token"));
}

// ─── Shared state through the container ──────────────────────────

#[tokio::test]
async fn test_liked_flag_is_visible_through_another_holder() {
    let app = stub_container();
    let other_holder = app.clone();

    let dogs = app.repositories().dogs.dogs().await.unwrap();
    let mango = &dogs[0];

    // Toggle the liked flag through one holder
    app.state().insert(AppState::LIKED_DOG_IDS, mango.id);

    // The other holder observes it: same instance, not a copy
    assert!(other_holder
        .state()
        .contains(AppState::LIKED_DOG_IDS, &mango.id));

    // And un-toggling is symmetric
    other_holder.state().remove(AppState::LIKED_DOG_IDS, &mango.id);
    assert!(!app.state().contains(AppState::LIKED_DOG_IDS, &mango.id));
}

#[tokio::test]
async fn test_adoption_journey_through_one_container() {
    let app = stub_container();
    let repos = app.repositories();

    // Sign in and cache the session in shared state
    let session = repos
        .auth
        .sign_in(&Credentials {
            email: "adopter@example.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(session.user_id, STUB_USER_ID);
    app.state().set(AppState::AUTH, Some(session.clone()));

    // Register for push, like Mango (pre-approved: instant match)
    repos
        .push_token
        .register(session.user_id, "apns-token-1")
        .await
        .unwrap();
    let matched = repos
        .matching
        .like(session.user_id, MANGO_ID)
        .await
        .unwrap()
        .expect("mango likes everyone back");
    app.state().insert(AppState::LIKED_DOG_IDS, MANGO_ID);

    // Chat in the new match
    repos
        .messages
        .send(matched.id, session.user_id, "Can we meet Mango this week?")
        .await
        .unwrap();
    let thread = repos.messages.messages(matched.id).await.unwrap();
    assert_eq!(thread.len(), 1);

    // Schedule a visit
    let visit = repos
        .visits
        .schedule(
            session.user_id,
            MANGO_ID,
            chrono::Utc::now() + chrono::Duration::days(2),
        )
        .await
        .unwrap();
    let visits = repos.visits.visits(session.user_id).await.unwrap();
    assert_eq!(visits[0].id, visit.id);

    // Upload an application photo and fetch a dog image
    let url = repos
        .storage
        .upload("applications", "me.jpg", vec![0xFF, 0xD8])
        .await
        .unwrap();
    assert_eq!(url, "stub://applications/me.jpg");
    let image = repos
        .images
        .fetch("https://cdn.pawsinus.example/mango-1.jpg")
        .await
        .unwrap();
    assert!(!image.is_empty());

    // Everything above went through one shared state instance
    assert!(app.state().contains(AppState::LIKED_DOG_IDS, &MANGO_ID));
    assert!(app.state().get(AppState::AUTH).is_some());
}

// ─── Ambient accessor ────────────────────────────────────────────

#[tokio::test]
async fn test_ambient_accessor_lifecycle() {
    // Fallback: consumers without an installed container get a usable stub
    let ambient = container::current();
    let dogs = ambient.repositories().dogs.dogs().await.unwrap();
    assert_eq!(dogs.len(), 3);

    // Scoped override wins inside its task subtree
    let scoped = stub_container();
    scoped
        .state()
        .set(AppState::SEARCH_TEXT, "scoped-marker".to_string());
    let seen = container::with_scope(scoped, async {
        container::current().state().get(AppState::SEARCH_TEXT)
    })
    .await;
    assert_eq!(seen, "scoped-marker");

    // Install: first wins, second is rejected
    let installed = stub_container();
    installed
        .state()
        .set(AppState::SEARCH_TEXT, "installed-marker".to_string());
    assert!(container::install(installed));
    assert!(!container::install(stub_container()));
    assert_eq!(
        container::current().state().get(AppState::SEARCH_TEXT),
        "installed-marker"
    );

    // The installed container is one shared instance across ambient reads
    container::current()
        .state()
        .insert(AppState::LIKED_DOG_IDS, BORI_ID);
    assert!(container::current()
        .state()
        .contains(AppState::LIKED_DOG_IDS, &BORI_ID));
}

// ─── Query guard over the stub registry ──────────────────────────

#[tokio::test]
async fn test_search_query_guard_end_to_end() {
    let app = stub_container();
    let repos = app.repositories().clone();

    let builds = Arc::new(AtomicUsize::new(0));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let builds_in_builder = builds.clone();
    let guard = QueryGuard::new(
        move |text: &String| {
            builds_in_builder.fetch_add(1, Ordering::SeqCst);
            let repos = repos.clone();
            let text = text.clone();
            Box::pin(async move { repos.dogs.search(&text).await })
        },
        move |result| {
            let _ = tx.send(result);
        },
    );

    // Drive the guard from the shared state's search text
    let handle = guard.bind(app.state().subscribe(), |s: &AppState| {
        s.view.search_text.clone()
    });

    // Initial empty search returns the full seed list
    let all = timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(all.len(), 3);

    // Unrelated state churn does not re-query
    app.state().insert(AppState::LIKED_DOG_IDS, MANGO_ID);
    app.state().set(AppState::ONBOARDING_COMPLETE, true);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(builds.load(Ordering::SeqCst), 1);

    // Typing a search re-queries exactly once
    app.state().set(AppState::SEARCH_TEXT, "poodle".to_string());
    let filtered = timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, BORI_ID);
    assert_eq!(builds.load(Ordering::SeqCst), 2);

    handle.abort();
}
