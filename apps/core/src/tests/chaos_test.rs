use crate::actors::fixtures::FixtureFeed;
use crate::actors::supervisor::{SupervisorOptions, FALLBACK_REPLY};
use crate::brain::memory::Role;
use crate::tests::mocks::{options, supervisor, MockCompletion, MockFixtures};
use futures::future::join_all;
use std::sync::Arc;
use tokio::time::Duration;

fn roomy_options() -> SupervisorOptions {
    SupervisorOptions {
        completion_timeout: Duration::from_secs(2),
        memory_capacity: 50,
        session_capacity: 64,
    }
}

#[tokio::test]
async fn test_concurrent_requests_on_one_session_append_pairs() {
    let completion = Arc::new(MockCompletion::slow(Duration::from_millis(10)));
    let fixtures = Arc::new(MockFixtures::with_feed(FixtureFeed::Unconfigured));
    let handle = supervisor(&completion, &fixtures, roomy_options());

    let requests = (0..12).map(|i| {
        let handle = handle.clone();
        async move {
            handle
                .process_message(Some("shared".to_string()), format!("message {}", i), None)
                .await
        }
    });
    let results = join_all(requests).await;
    assert!(results.iter().all(|r| r.is_ok()));

    handle
        .process_message(Some("shared".to_string()), "probe".to_string(), None)
        .await
        .unwrap();

    let history = completion.last_request().history;
    assert_eq!(history.len(), 24);
    for pair in history.chunks(2) {
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(pair[1].role, Role::Assistant);
        assert_eq!(pair[1].content, MockCompletion::reply_for(&pair[0].content));
    }
}

#[tokio::test]
async fn test_sessions_progress_concurrently() {
    let completion = Arc::new(MockCompletion::slow(Duration::from_millis(200)));
    let fixtures = Arc::new(MockFixtures::with_feed(FixtureFeed::Unconfigured));
    let handle = supervisor(&completion, &fixtures, roomy_options());

    let start = tokio::time::Instant::now();
    let requests = (0..5).map(|i| {
        let handle = handle.clone();
        async move {
            handle
                .process_message(Some(format!("session-{}", i)), "hello".to_string(), None)
                .await
        }
    });
    let results = join_all(requests).await;

    assert!(results.iter().all(|r| r.is_ok()));
    // Serialized processing would take at least a second.
    assert!(start.elapsed() < Duration::from_millis(900), "took {:?}", start.elapsed());
}

#[tokio::test]
async fn test_flaky_provider_never_breaks_the_supervisor() {
    let completion = Arc::new(MockCompletion::flaky(3));
    let fixtures = Arc::new(MockFixtures::with_feed(FixtureFeed::Unavailable(
        "connection reset".to_string(),
    )));
    let handle = supervisor(&completion, &fixtures, roomy_options());

    let mut fallbacks = 0;
    for i in 0..9 {
        let reply = handle
            .process_message(
                Some(format!("flaky-{}", i % 2)),
                format!("bet tips for match {}", i),
                None,
            )
            .await
            .expect("upstream failures are absorbed");
        if reply.reply == FALLBACK_REPLY {
            fallbacks += 1;
        }
    }

    assert_eq!(fallbacks, 3);
    let reply = handle
        .process_message(None, "still there?".to_string(), None)
        .await
        .unwrap();
    assert_eq!(reply.reply, MockCompletion::reply_for("still there?"));
}

#[tokio::test(start_paused = true)]
async fn test_stalled_session_answers_every_queued_request() {
    let completion = Arc::new(MockCompletion::slow(Duration::from_secs(60)));
    let fixtures = Arc::new(MockFixtures::with_feed(FixtureFeed::Unconfigured));
    let handle = supervisor(&completion, &fixtures, options(Duration::from_secs(12)));

    let requests = (0..5).map(|i| {
        let handle = handle.clone();
        async move {
            handle
                .process_message(Some("s".to_string()), format!("are you there {}", i), None)
                .await
        }
    });
    let results = join_all(requests).await;

    for (i, result) in results.into_iter().enumerate() {
        let reply = result.unwrap_or_else(|e| panic!("request {} failed: {:?}", i, e));
        assert_eq!(reply.reply, FALLBACK_REPLY);
        assert!(reply.fallback);
        assert_eq!(reply.session_id, "s");
    }
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_request_leaves_session_untouched() {
    let completion = Arc::new(MockCompletion::ok());
    let fixtures = Arc::new(MockFixtures::stalled(Duration::from_secs(600)));
    let handle = supervisor(&completion, &fixtures, options(Duration::from_secs(1)));

    let reply = handle
        .process_message(Some("s".to_string()), "premier league odds today".to_string(), None)
        .await
        .expect("a missed deadline is not an error");
    assert_eq!(reply.reply, FALLBACK_REPLY);
    assert_eq!(reply.session_id, "s");

    let reply = handle
        .process_message(Some("s".to_string()), "hello".to_string(), None)
        .await
        .unwrap();
    assert_eq!(reply.reply, MockCompletion::reply_for("hello"));

    // The abandoned request never reached the completion client nor the memory.
    let requests = completion.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].history.is_empty());
}

#[tokio::test]
async fn test_missing_session_id_is_kept_on_fallback() {
    let completion = Arc::new(MockCompletion::slow(Duration::from_millis(300)));
    let fixtures = Arc::new(MockFixtures::with_feed(FixtureFeed::Unconfigured));
    let handle = supervisor(&completion, &fixtures, options(Duration::from_millis(20)));

    let reply = handle.process_message(None, "hello".to_string(), None).await.unwrap();
    assert!(reply.fallback);
    assert!(!reply.session_id.is_empty());
}
