//! End-to-end tests against a local HTTP server.
//!
//! Each test starts a wiremock server that serves a presentation under
//! `/p/svg/<n>`; anything not mocked answers 404, which is exactly how a
//! real slide server reports the end of a deck.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use lopdf::Document;
use slides2pdf::{
    grab, grab_sync, grab_to_file, inspect, GrabConfig, Job, JobRegistry, SlidesError,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn sized_svg(width: &str, height: &str) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 10 10"><rect width="10" height="10" fill="#cc3300"/></svg>"##
    )
}

const UNSIZED_SVG: &str =
    r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><circle cx="5" cy="5" r="5"/></svg>"#;

fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

fn config() -> GrabConfig {
    GrabConfig::builder()
        .retry_backoff_ms(0)
        .max_error_strike(1)
        .load_system_fonts(false)
        .build()
        .unwrap()
}

/// Serve `slides` as `/p/svg/1..=n` for every method.
async fn serve(slides: &[String]) -> MockServer {
    let server = MockServer::start().await;
    for (i, svg) in slides.iter().enumerate() {
        Mock::given(path(format!("/p/svg/{}", i + 1)))
            .respond_with(ResponseTemplate::new(200).set_body_string(svg.clone()))
            .mount(&server)
            .await;
    }
    server
}

fn link(server: &MockServer, slide: usize) -> String {
    format!("{}/p/svg/{}", server.uri(), slide)
}

fn page_sizes(pdf: &[u8]) -> Vec<(f32, f32)> {
    let doc = Document::load_mem(pdf).expect("valid PDF");
    doc.get_pages()
        .values()
        .map(|&id| {
            let mb = doc
                .get_dictionary(id)
                .and_then(|d| d.get(b"MediaBox"))
                .and_then(|o| o.as_array())
                .expect("MediaBox");
            (mb[2].as_float().unwrap(), mb[3].as_float().unwrap())
        })
        .collect()
}

fn close(a: (f32, f32), b: (f32, f32)) -> bool {
    (a.0 - b.0).abs() < 1e-2 && (a.1 - b.1).abs() < 1e-2
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn grabs_deck_from_any_slide_link() {
    init_logs();
    let server = serve(&[
        sized_svg("100pt", "100pt"),
        UNSIZED_SVG.to_string(),
        sized_svg("50pt", "50pt"),
    ])
    .await;

    let p = grab(link(&server, 2), &config())
        .await
        .unwrap()
        .expect("three slides");

    assert!(p.is_complete);
    assert_eq!(p.filename, "presentation.pdf");
    assert_eq!(p.stats.total_slides, 3);
    assert_eq!(
        page_sizes(&p.bytes),
        vec![(100.0, 100.0), (100.0, 100.0), (50.0, 50.0)]
    );
}

#[tokio::test]
async fn pixel_sizes_are_converted_to_points() {
    let server = serve(&[sized_svg("400px", "300px")]).await;
    let p = grab(link(&server, 1), &config()).await.unwrap().unwrap();
    let sizes = page_sizes(&p.bytes);
    assert_eq!(sizes.len(), 1);
    assert!(close(sizes[0], (301.171_43, 225.878_57)), "{sizes:?}");
}

#[tokio::test]
async fn inspect_counts_slides() {
    let slides: Vec<_> = (0..5).map(|_| sized_svg("10pt", "10pt")).collect();
    let server = serve(&slides).await;

    let report = inspect(link(&server, 1), &config()).await.unwrap();
    assert_eq!(report.length, 5);
    assert!(!report.capped);
    assert_eq!(report.inconclusive_probes, 0);
}

#[tokio::test]
async fn inspect_reports_cap() {
    let slides: Vec<_> = (0..8).map(|_| sized_svg("10pt", "10pt")).collect();
    let server = serve(&slides).await;
    let cfg = GrabConfig::builder()
        .retry_backoff_ms(0)
        .max_length(5)
        .build()
        .unwrap();

    let report = inspect(link(&server, 1), &cfg).await.unwrap();
    assert_eq!(report.length, 5);
    assert!(report.capped);
}

#[tokio::test]
async fn empty_deck_yields_nothing() {
    let server = MockServer::start().await;
    assert!(grab(link(&server, 1), &config()).await.unwrap().is_none());
}

#[tokio::test]
async fn grab_to_file_writes_pdf() {
    let server = serve(&[sized_svg("72pt", "72pt"), sized_svg("72pt", "72pt")]).await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested").join("deck.pdf");

    let stats = grab_to_file(link(&server, 1), &out, &config())
        .await
        .unwrap()
        .expect("stats");

    assert_eq!(stats.total_slides, 2);
    assert_eq!(stats.fetched_slides, 2);
    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert_eq!(page_sizes(&bytes).len(), 2);
    assert!(!out.with_extension("pdf.tmp").exists());
}

#[tokio::test]
async fn grab_to_file_writes_nothing_for_empty_deck() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("deck.pdf");

    assert!(grab_to_file(link(&server, 1), &out, &config())
        .await
        .unwrap()
        .is_none());
    assert!(!out.exists());
}

#[tokio::test]
async fn failing_slide_becomes_hole() {
    init_logs();
    let server = MockServer::start().await;
    for i in [1, 3] {
        Mock::given(path(format!("/p/svg/{i}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(sized_svg("90pt", "60pt")))
            .mount(&server)
            .await;
    }
    // Slide 2 exists but its body cannot be downloaded.
    Mock::given(method("HEAD"))
        .and(path("/p/svg/2"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/svg/2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let p = grab(link(&server, 1), &config()).await.unwrap().unwrap();

    assert!(!p.is_complete);
    assert_eq!(p.stats.missing_slides, vec![2]);
    assert_eq!(p.stats.fetch_retries, 2);
    assert_eq!(
        page_sizes(&p.bytes),
        vec![(90.0, 60.0), (500.0, 500.0), (90.0, 60.0)]
    );
}

#[tokio::test]
async fn deadline_turns_slow_slides_into_holes() {
    init_logs();
    let server = MockServer::start().await;
    for i in [1, 3] {
        Mock::given(path(format!("/p/svg/{i}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(sized_svg("20pt", "20pt")))
            .mount(&server)
            .await;
    }
    Mock::given(method("HEAD"))
        .and(path("/p/svg/2"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/svg/2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(sized_svg("20pt", "20pt"))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let cfg = GrabConfig::builder()
        .retry_backoff_ms(0)
        .job_deadline_secs(1)
        .load_system_fonts(false)
        .build()
        .unwrap();

    let started = std::time::Instant::now();
    let p = grab(link(&server, 1), &cfg).await.unwrap().unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(p.stats.total_slides, 3);
    assert_eq!(p.stats.missing_slides, vec![2]);
}

#[tokio::test]
async fn registry_rejects_second_job_for_same_identity() {
    let server = serve(&[sized_svg("10pt", "10pt")]).await;
    let base = slides2pdf::normalize_link(&link(&server, 1)).unwrap();
    let registry = JobRegistry::new();

    let (tx, rx) = tokio::sync::oneshot::channel();
    let first = Job::new(base.clone(), "chat-42", config()).unwrap();
    let handle = registry
        .submit(first, move |r| {
            let _ = tx.send(r.map(|p| p.map(|p| p.stats.total_slides)));
        })
        .unwrap();

    let second = Job::new(base, "chat-42", config()).unwrap();
    assert!(matches!(
        registry.submit(second, |_| {}),
        Err(SlidesError::JobAlreadyRunning { .. })
    ));

    assert_eq!(rx.await.unwrap().unwrap(), Some(1));
    handle.await.unwrap();
    assert!(!registry.is_active("chat-42"));
}

#[tokio::test]
async fn invalid_link_is_rejected_before_any_request() {
    let err = grab("https://host/presentation/abc/slides/1", &config())
        .await
        .unwrap_err();
    assert!(matches!(err, SlidesError::InvalidLink { .. }));
}

#[test]
fn grab_sync_propagates_errors() {
    let err = grab_sync("not a url", &config()).unwrap_err();
    assert!(matches!(err, SlidesError::InvalidLink { .. }));
}
