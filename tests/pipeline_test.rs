mod common;

use common::{product, shared, test_config, FakeAuth, FakePublisher, FakeSource};
use eventim_scraper::apis::backend::BackendClient;
use eventim_scraper::error::{Result, ScraperError};
use eventim_scraper::ledger::{open_ledgers, LedgerStore, ProcessedEvents};
use eventim_scraper::pipeline::{ItemOutcome, Pipeline};
use eventim_scraper::types::OrganizerCredential;
use serde_json::json;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

fn pipeline(
    config: &eventim_scraper::config::Config,
    source: Arc<FakeSource>,
    auth: Arc<FakeAuth>,
    publisher: Arc<FakePublisher>,
) -> Pipeline {
    let (processed, organizers) = open_ledgers(&config.storage).unwrap();
    Pipeline::new(config.clone(), source, auth, publisher, processed, organizers)
}

#[tokio::test]
async fn test_all_listing_pages_are_fetched_before_any_detail_page() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path(), "http://localhost:3000");
    let source = shared(
        FakeSource::default()
            .with_page("Glasba", 1, Some(2), vec![product("Siddharta", None)])
            .with_page("Glasba", 2, Some(2), vec![product("Laibach", None)]),
    );
    let publisher = shared(FakePublisher::accepting());

    let result = pipeline(&config, source.clone(), shared(FakeAuth::default()), publisher.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(result.total_events, 2);
    assert_eq!(result.published_events, 2);

    let calls = source.calls();
    let listing_calls: Vec<_> = calls.iter().filter(|c| c.starts_with("listing:")).collect();
    assert_eq!(listing_calls, vec!["listing:Glasba:1", "listing:Glasba:2"]);
    let first_detail = calls.iter().position(|c| c.starts_with("detail:")).unwrap();
    let last_listing = calls.iter().rposition(|c| c.starts_with("listing:")).unwrap();
    assert!(last_listing < first_detail);

    // Category id from the configured category reaches the API form
    let published = publisher.published.lock().unwrap();
    assert!(published.iter().all(|(form, _, _)| form.category_id == "1"));
    assert_eq!(published[0].0.price, "12.50");
}

#[tokio::test]
async fn test_second_run_publishes_nothing() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path(), "http://localhost:3000");
    let source = shared(FakeSource::default().with_page(
        "Glasba",
        1,
        Some(1),
        vec![product("Siddharta", None), product("Laibach", None)],
    ));

    let first = shared(FakePublisher::accepting());
    let result = pipeline(&config, source.clone(), shared(FakeAuth::default()), first.clone())
        .run()
        .await
        .unwrap();
    assert_eq!(result.published_events, 2);
    assert_eq!(
        fs::read_to_string(&config.storage.processed_events_path).unwrap(),
        "Siddharta\nLaibach\n"
    );

    let second = shared(FakePublisher::accepting());
    let result = pipeline(&config, source, shared(FakeAuth::default()), second.clone())
        .run()
        .await
        .unwrap();
    assert_eq!(result.published_events, 0);
    assert_eq!(result.skipped_events, 2);
    assert!(second.titles().is_empty());
}

#[tokio::test]
async fn test_organizer_is_registered_once_and_reused() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path(), "http://localhost:3000");
    let source = shared(FakeSource::default().with_page(
        "Glasba",
        1,
        Some(1),
        vec![product("Siddharta", None), product("Siddharta Akustično", None)],
    ));
    let auth = shared(FakeAuth::default());
    let publisher = shared(FakePublisher::accepting());

    let result = pipeline(&config, source, auth.clone(), publisher.clone())
        .run()
        .await
        .unwrap();
    assert_eq!(result.published_events, 2);

    // Both detail pages credit the same organizer
    assert_eq!(auth.registration_count(), 1);
    assert_eq!(auth.login_count(), 0);

    let lines = fs::read_to_string(&config.storage.organizers_path).unwrap();
    assert_eq!(lines.lines().count(), 1);
    let stored: OrganizerCredential = serde_json::from_str(lines.lines().next().unwrap()).unwrap();
    assert_eq!(stored.name, "Siddharta");
    assert_eq!(stored.email, "siddharta@gmail.com");

    let tokens: Vec<_> = publisher
        .published
        .lock()
        .unwrap()
        .iter()
        .map(|(_, _, token)| token.clone())
        .collect();
    let expected = Some("token-siddharta@gmail.com".to_string());
    assert_eq!(tokens, vec![expected.clone(), expected]);
}

#[tokio::test]
async fn test_stored_organizer_without_token_logs_in() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path(), "http://localhost:3000");
    fs::write(
        &config.storage.organizers_path,
        "{\"name\":\"Siddharta\",\"email\":\"siddharta@gmail.com\",\"password\":\"123123\"}\n",
    )
    .unwrap();
    let source = shared(FakeSource::default().with_page("Glasba", 1, Some(1), vec![product("Siddharta", None)]));
    let auth = shared(FakeAuth {
        login_token: Some("login-token".into()),
        ..Default::default()
    });
    let publisher = shared(FakePublisher::accepting());

    pipeline(&config, source, auth.clone(), publisher.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(auth.registration_count(), 0);
    assert_eq!(auth.login_count(), 1);
    let published = publisher.published.lock().unwrap();
    assert_eq!(published[0].2.as_deref(), Some("login-token"));
}

#[tokio::test]
async fn test_rejected_publish_keeps_event_eligible_and_image_on_disk() {
    let dir = tempdir().unwrap();
    let mut server = mockito::Server::new_async().await;
    let config = test_config(dir.path(), &server.url());

    let register = server
        .mock("POST", "/users/register")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"token":"organizer-token"}"#)
        .expect(1)
        .create_async()
        .await;
    let events = server
        .mock("POST", "/dogodki")
        .with_status(500)
        .with_body("Internal Server Error")
        .expect(1)
        .create_async()
        .await;

    let source = shared(FakeSource::default().with_page(
        "Glasba",
        1,
        Some(1),
        vec![product("Siddharta", Some("https://cdn.eventim.si/poster.jpg"))],
    ));
    let backend = Arc::new(BackendClient::new(&config).unwrap());
    let (processed, organizers) = open_ledgers(&config.storage).unwrap();
    let pipeline = Pipeline::new(config.clone(), source, backend.clone(), backend, processed, organizers);

    let result = pipeline.run().await.unwrap();
    assert_eq!(result.published_events, 0);
    assert_eq!(result.failed_events, 1);

    register.assert_async().await;
    events.assert_async().await;

    assert!(!config.storage.processed_events_path.exists());
    let image = config.storage.temp_image_dir.join("Siddharta.jpg");
    assert!(image.exists());
}

#[tokio::test]
async fn test_published_event_removes_image() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path(), "http://localhost:3000");
    let p = product("Siddharta", Some("https://cdn.eventim.si/poster.png"));
    let source = shared(FakeSource::default());
    let publisher = shared(FakePublisher::accepting());
    let pipeline = pipeline(&config, source, shared(FakeAuth::default()), publisher.clone());

    let outcome = pipeline.process_product(&p).await.unwrap();
    assert_eq!(outcome, ItemOutcome::Published);

    let published = publisher.published.lock().unwrap();
    // The poster was on disk while the event was published
    assert!(published[0].1);
    assert!(!config.storage.temp_image_dir.join("Siddharta.png").exists());
}

#[tokio::test]
async fn test_detail_failure_does_not_stop_the_run() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path(), "http://localhost:3000");
    let broken = product("Broken", Some("https://cdn.eventim.si/broken.jpg"));
    let source = shared(FakeSource {
        fail_detail_for: Some(broken.link.clone()),
        ..FakeSource::default().with_page(
            "Glasba",
            1,
            Some(1),
            vec![broken.clone(), product("Siddharta", None)],
        )
    });
    let publisher = shared(FakePublisher::accepting());

    let result = pipeline(&config, source, shared(FakeAuth::default()), publisher.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(result.failed_events, 1);
    assert_eq!(result.published_events, 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(publisher.titles(), vec!["Siddharta".to_string()]);
    assert!(!config.storage.temp_image_dir.join("Broken.jpg").exists());
}

#[tokio::test]
async fn test_listing_failure_aborts_run() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path(), "http://localhost:3000");
    let source = shared(FakeSource {
        fail_listing: true,
        ..Default::default()
    });
    let publisher = shared(FakePublisher::rejecting());

    let result = pipeline(&config, source, shared(FakeAuth::default()), publisher.clone())
        .run()
        .await;

    assert!(result.is_err());
    assert!(publisher.titles().is_empty());
}

#[tokio::test]
async fn test_unreadable_listing_entries_do_not_stop_the_run() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path(), "http://localhost:3000");
    let source = shared(FakeSource::default().with_raw_page(
        "Glasba",
        1,
        Some(1),
        vec![
            json!({
                "name": "Laibach",
                "categories": null,
                "link": "https://www.eventim.si/event/laibach/"
            }),
            json!({ "name": "Brez povezave", "categories": [{ "name": "Pop" }] }),
            serde_json::to_value(product("Siddharta", None)).unwrap(),
        ],
    ));
    let publisher = shared(FakePublisher::accepting());

    let result = pipeline(&config, source, shared(FakeAuth::default()), publisher.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(result.total_events, 3);
    assert_eq!(result.published_events, 2);
    assert_eq!(result.failed_events, 1);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("Brez povezave"));
    assert_eq!(publisher.titles(), vec!["Laibach".to_string(), "Siddharta".to_string()]);
    assert_eq!(
        fs::read_to_string(&config.storage.processed_events_path).unwrap(),
        "Laibach\nSiddharta\n"
    );
}

/// Ledger that reads as empty and refuses every write.
struct ReadOnlyLedger;

impl LedgerStore for ReadOnlyLedger {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn put(&self, _key: &str, _value: &str) -> Result<()> {
        Err(ScraperError::Ledger("disk full".into()))
    }

    fn values(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_ledger_write_failure_after_publish_still_removes_image() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path(), "http://localhost:3000");
    let source = shared(FakeSource::default().with_page(
        "Glasba",
        1,
        Some(1),
        vec![product("Siddharta", Some("https://cdn.eventim.si/poster.png"))],
    ));
    let publisher = shared(FakePublisher::accepting());
    let (_, organizers) = open_ledgers(&config.storage).unwrap();
    let pipeline = Pipeline::new(
        config.clone(),
        source,
        shared(FakeAuth::default()),
        publisher.clone(),
        ProcessedEvents::new(Box::new(ReadOnlyLedger)),
        organizers,
    );

    let outcome = pipeline
        .process_product(&product("Siddharta", Some("https://cdn.eventim.si/poster.png")))
        .await
        .unwrap();
    assert_eq!(outcome, ItemOutcome::PublishedNotRecorded);
    assert!(!config.storage.temp_image_dir.join("Siddharta.png").exists());

    let result = pipeline.run().await.unwrap();
    assert_eq!(result.published_events, 1);
    assert_eq!(result.failed_events, 0);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("could not mark it as processed"));
    assert_eq!(publisher.titles().len(), 2);
}
