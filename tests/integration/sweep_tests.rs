//! Integration tests for the fetch and like operations
//!
//! These tests use wiremock to stand in for the blog, and run the real
//! operations through the round controller end-to-end.

use serde_json::json;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use sumi_sweep::config::{load_config_with_hash, SiteConfig, DEFAULT_USER_AGENT};
use sumi_sweep::engine::{
    EngineConfig, FailureReason, Operation, Outcome, OutcomeKind, RoundController, Target,
    Termination,
};
use sumi_sweep::output::{write_articles, write_failed_targets, write_run_summary};
use sumi_sweep::site::{FetchArticle, LikeArticle, SiteClient};
use sumi_sweep::storage::{SqliteStorage, Storage};
use sumi_sweep::targets::load_targets;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn site_client(base_url: &str) -> SiteClient {
    let mut cookies = BTreeMap::new();
    cookies.insert("session".to_string(), "abc123".to_string());

    SiteClient::new(&SiteConfig {
        base_url: base_url.to_string(),
        user_agent: DEFAULT_USER_AGENT.to_string(),
        cookies,
    })
    .expect("Failed to build site client")
}

fn engine_config(max_rounds: u32) -> EngineConfig {
    EngineConfig {
        concurrency_limit: 4,
        operation_timeout: Duration::from_secs(5),
        max_rounds,
        inter_round_cooldown: Duration::from_millis(10),
    }
}

fn article_body(author: &str, title: &str) -> serde_json::Value {
    json!({
        "meta": {
            "title": title,
            "author": author,
            "content": format!("<p>{}</p>", title),
            "date": "2024-03-01"
        }
    })
}

/// Mounts a 200 article response for `key`
async fn mount_article(server: &MockServer, key: &str, author: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/blog/spider/blogs/{}", key)))
        .respond_with(ResponseTemplate::new(200).set_body_json(article_body(author, &format!("Post {}", key))))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_extracts_article_record() {
    let server = MockServer::start().await;
    let target = Target::from(format!("{}/blog/post/42/", server.uri()));

    Mock::given(method("GET"))
        .and(path("/blog/spider/blogs/42"))
        .and(header("referer", target.as_str()))
        .and(header("cookie", "session=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(article_body("alice", "Hello")))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = FetchArticle::default()
        .execute(&target, &site_client(&server.uri()))
        .await;

    match outcome {
        Outcome::Success {
            payload: Some(record),
            ..
        } => {
            assert_eq!(record.author, "alice");
            assert_eq!(record.id, "42");
            assert_eq!(record.title, "Hello");
            assert_eq!(record.date, "2024-03-01");
            assert_eq!(record.source_url, target.as_str());
        }
        other => panic!("expected a success with payload, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_classifies_statuses() {
    let server = MockServer::start().await;
    let client = site_client(&server.uri());

    for (key, status) in [("1", 404), ("2", 403), ("3", 500), ("4", 502), ("5", 503), ("6", 504)] {
        Mock::given(method("GET"))
            .and(path(format!("/blog/spider/blogs/{}", key)))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
    }

    let expected = [
        ("1", OutcomeKind::Permanent),
        ("2", OutcomeKind::Permanent),
        ("3", OutcomeKind::Retryable),
        ("4", OutcomeKind::Retryable),
        ("5", OutcomeKind::Retryable),
        ("6", OutcomeKind::Retryable),
    ];
    for (key, kind) in expected {
        let target = Target::from(format!("{}/post/{}", server.uri(), key));
        let outcome = FetchArticle::default().execute(&target, &client).await;
        assert_eq!(outcome.kind(), kind, "status for key {}", key);
    }
}

#[tokio::test]
async fn test_fetch_empty_payload_is_permanent() {
    let server = MockServer::start().await;
    let client = site_client(&server.uri());

    Mock::given(method("GET"))
        .and(path("/blog/spider/blogs/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blog/spider/blogs/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let empty = FetchArticle::default()
        .execute(&Target::from(format!("{}/post/empty", server.uri())), &client)
        .await;
    assert_eq!(empty.kind(), OutcomeKind::Permanent);
    assert_eq!(empty.reason(), Some(&FailureReason::EmptyPayload));

    let html = FetchArticle::default()
        .execute(&Target::from(format!("{}/post/html", server.uri())), &client)
        .await;
    assert_eq!(html.kind(), OutcomeKind::Permanent);
    assert!(matches!(html.reason(), Some(FailureReason::MalformedPayload(_))));
}

#[tokio::test]
async fn test_fetch_is_idempotent() {
    let server = MockServer::start().await;
    mount_article(&server, "7", "bob").await;

    let client = site_client(&server.uri());
    let target = Target::from(format!("{}/post/7", server.uri()));
    let operation = FetchArticle::default();

    let first = operation.execute(&target, &client).await;
    let second = operation.execute(&target, &client).await;

    assert_eq!(first.kind(), OutcomeKind::Success);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_fetch_recovers_from_transient_errors() {
    let server = MockServer::start().await;

    // First request per flaky key fails, the fallback mock answers after that
    for key in ["8", "9"] {
        Mock::given(method("GET"))
            .and(path(format!("/blog/spider/blogs/{}", key)))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
    }
    for (key, author) in [("7", "carol"), ("8", "alice"), ("9", "bob")] {
        mount_article(&server, key, author).await;
    }

    let targets: Vec<Target> = ["7", "8", "9"]
        .iter()
        .map(|key| Target::from(format!("{}/post/{}", server.uri(), key)))
        .collect();

    let output = RoundController::new(
        targets,
        FetchArticle::default(),
        site_client(&server.uri()),
        engine_config(5),
    )
    .unwrap()
    .run()
    .await;

    assert_eq!(output.report.termination, Termination::Drained);
    assert_eq!(output.report.rounds_run(), 2);
    assert_eq!(output.report.cooldowns, 1);
    assert_eq!(output.report.succeeded, 3);
    assert_eq!(output.report.rounds[0].retryable, 2);
    assert_eq!(output.payloads.len(), 3);
}

#[tokio::test]
async fn test_like_posts_with_referer_and_session() {
    let server = MockServer::start().await;
    let targets: Vec<Target> = (1..=3)
        .map(|i| Target::from(format!("{}/blog/post/{}", server.uri(), i)))
        .collect();

    for target in &targets {
        let like_path = format!("{}/like", url::Url::parse(target.as_str()).unwrap().path());
        Mock::given(method("POST"))
            .and(path(like_path))
            .and(header("referer", target.as_str()))
            .and(header("cookie", "session=abc123"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
    }

    let output = RoundController::new(
        targets,
        LikeArticle::default(),
        site_client(&server.uri()),
        engine_config(5),
    )
    .unwrap()
    .run()
    .await;

    assert_eq!(output.report.operation, "like");
    assert_eq!(output.report.succeeded, 3);
    assert!(output.report.is_complete());
    assert_eq!(output.payloads.len(), 3);
}

#[tokio::test]
async fn test_like_forbidden_is_permanent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/blog/post/5/like"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let report = RoundController::new(
        vec![Target::from(format!("{}/blog/post/5", server.uri()))],
        LikeArticle::default(),
        site_client(&server.uri()),
        engine_config(5),
    )
    .unwrap()
    .run()
    .await
    .report;

    assert_eq!(report.rounds_run(), 1);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.failed[0].reason, FailureReason::Status(403));
    assert!(!report.failed[0].retryable);
}

#[tokio::test]
async fn test_unreachable_server_exhausts_rounds() {
    // Nothing listens on port 1
    let base = "http://127.0.0.1:1";
    let targets = vec![
        Target::from(format!("{}/post/1", base)),
        Target::from(format!("{}/post/2", base)),
    ];

    let report = RoundController::new(targets, LikeArticle::default(), site_client(base), engine_config(3))
        .unwrap()
        .run()
        .await
        .report;

    assert_eq!(report.termination, Termination::Exhausted);
    assert_eq!(report.rounds_run(), 3);
    assert_eq!(report.cooldowns, 2);
    assert_eq!(report.failed_count(), 2);
    assert!(report.failed.iter().all(|failed| failed.retryable));
}

#[tokio::test]
async fn test_invalid_targets_fail_permanently() {
    let server = MockServer::start().await;

    let report = RoundController::new(
        vec![Target::from("not a url"), Target::from(server.uri())],
        FetchArticle::default(),
        site_client(&server.uri()),
        engine_config(5),
    )
    .unwrap()
    .run()
    .await
    .report;

    assert_eq!(report.rounds_run(), 1);
    assert_eq!(report.failed_count(), 2);
    assert!(report
        .failed
        .iter()
        .all(|failed| matches!(failed.reason, FailureReason::InvalidTarget(_))));
}

#[tokio::test]
async fn test_full_fetch_pipeline() {
    let server = MockServer::start().await;
    mount_article(&server, "1", "carol").await;
    mount_article(&server, "2", "alice").await;
    mount_article(&server, "3", "alice").await;
    Mock::given(method("GET"))
        .and(path("/blog/spider/blogs/4"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let targets_path = dir.path().join("articles.csv");
    let mut targets_file = std::fs::File::create(&targets_path).unwrap();
    writeln!(targets_file, "作者,文章链接").unwrap();
    writeln!(targets_file, "\"some\none\",{}/blog/post/1", server.uri()).unwrap();
    for key in 2..=4 {
        writeln!(targets_file, "someone,{}/blog/post/{}", server.uri(), key).unwrap();
    }

    let config_path = dir.path().join("sweep.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[site]
base-url = "{base}"
cookies = {{ session = "abc123" }}

[engine]
max-rounds = 2
inter-round-cooldown-ms = 10

[input]
targets-path = "{targets}"
url-column = "文章链接"

[output]
database-path = "{db}"
summary-path = "{summary}"
failed-path = "{failed}"
articles-path = "{articles}"
"#,
            base = server.uri(),
            targets = targets_path.display(),
            db = dir.path().join("sweep.db").display(),
            summary = dir.path().join("summary.md").display(),
            failed = dir.path().join("failed_urls.txt").display(),
            articles = dir.path().join("article_details.csv").display(),
        ),
    )
    .unwrap();

    let (config, hash) = load_config_with_hash(&config_path).unwrap();
    let targets = load_targets(
        Path::new(&config.input.targets_path),
        config.input.url_column.as_deref(),
    )
    .unwrap();
    assert_eq!(targets.len(), 4);

    let engine = config.fetch_engine();
    let output = RoundController::new(
        targets,
        FetchArticle::new(engine.operation_timeout),
        SiteClient::new(&config.site).unwrap(),
        engine,
    )
    .unwrap()
    .run()
    .await;
    let report = &output.report;
    assert_eq!(report.succeeded, 3);
    assert_eq!(report.failed_count(), 1);

    let mut storage = SqliteStorage::new(Path::new(&config.output.database_path)).unwrap();
    let run_id = storage.create_run("fetch", &hash, report.total_initial).unwrap();
    write_failed_targets(report, Path::new(&config.output.failed_path)).unwrap();
    storage.complete_run(run_id, report, &output.payloads).unwrap();

    let articles = storage.articles_by_author(run_id).unwrap();
    let articles_path = Path::new(&config.output.articles_path);
    assert_eq!(write_articles(&articles, articles_path).unwrap(), 3);

    let export = std::fs::read_to_string(articles_path).unwrap();
    let rows: Vec<(&str, &str)> = export
        .lines()
        .skip(1)
        .map(|line| {
            let mut cells = line.split(',');
            (cells.next().unwrap(), cells.next().unwrap())
        })
        .collect();
    assert!(export.starts_with("author,id,title,content,date,source_url\n"));
    assert_eq!(rows, vec![("alice", "2"), ("alice", "3"), ("carol", "1")]);

    let counts = storage.author_counts(run_id).unwrap();
    write_run_summary(report, &hash, &counts, Path::new(&config.output.summary_path)).unwrap();
    let summary = std::fs::read_to_string(&config.output.summary_path).unwrap();
    assert!(summary.contains("| alice | 2 |"));
    assert!(summary.contains("HTTP status 404"));

    let failed = std::fs::read_to_string(&config.output.failed_path).unwrap();
    assert_eq!(failed, format!("{}/blog/post/4\n", server.uri()));

    let run = storage.get_run(run_id).unwrap();
    assert_eq!(run.succeeded, 3);
    assert_eq!(run.failed, 1);
    assert_eq!(storage.failed_targets(run_id).unwrap().len(), 1);
}
