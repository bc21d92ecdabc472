//! End-to-end distribution flows against a mock HTTP server
//!
//! Exercises the full path: manifest fetch, registry construction, the
//! initial refresh pass, disk layout, alias resolution, and the
//! failure-tolerance contracts around partial download failures,
//! corruption, and manifest version bumps.

use std::path::Path;

use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ota_fetcher::app::{OtaClient, Sha1Hash};
use ota_fetcher::errors::{AppError, ManifestError};

const MAIN_FILE: &str = "/content/main.yml";
const EN_CONTENT: &str = "greeting: \"Hello\"\n";
const TR_CONTENT: &str = "greeting: \"Merhaba\"\n";

fn manifest_body(timestamp: i64) -> String {
    serde_json::json!({
        "timestamp": timestamp,
        "files": [MAIN_FILE],
        "content": {
            "en": ["/content/en/main.yml"],
            "tr": ["/content/tr/main.yml"]
        },
        "language_mapping": {
            "tr": {"locale": "tr-TR"}
        }
    })
    .to_string()
}

async fn mount_manifest(server: &MockServer, timestamp: i64) {
    Mock::given(method("GET"))
        .and(path("/manifest.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(manifest_body(timestamp)))
        .mount(server)
        .await;
}

async fn mount_locale(server: &MockServer, locale_path: &str, timestamp: i64, body: &str) {
    Mock::given(method("GET"))
        .and(path(locale_path))
        .and(query_param("version", timestamp.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn cache_folder(cache_root: &Path) -> std::path::PathBuf {
    cache_root.join(Sha1Hash::of(MAIN_FILE).to_hex())
}

#[tokio::test]
async fn construction_syncs_and_serves_reads_from_disk() {
    let server = MockServer::start().await;
    mount_manifest(&server, 100).await;
    mount_locale(&server, "/content/en/main.yml", 100, EN_CONTENT).await;
    mount_locale(&server, "/content/tr/main.yml", 100, TR_CONTENT).await;

    let dir = TempDir::new().unwrap();
    let client = OtaClient::new(&server.uri(), dir.path()).await.unwrap();

    assert_eq!(client.timestamp(), 100);
    assert_eq!(client.list_files(), [MAIN_FILE]);

    let file = client.file(MAIN_FILE).unwrap();
    assert_eq!(file.content("en").await.unwrap(), EN_CONTENT);
    assert_eq!(file.content("tr").await.unwrap(), TR_CONTENT);
    assert!(file.content("aaa").await.is_none());

    // Disk layout: per-file folder named by digest, one file per locale,
    // plus the metadata index
    let folder = cache_folder(dir.path());
    assert!(folder.join("en").is_file());
    assert!(folder.join("tr").is_file());
    assert!(folder.join("memory.json").is_file());
    assert_eq!(
        std::fs::read_to_string(folder.join("en")).unwrap(),
        EN_CONTENT
    );
}

#[tokio::test]
async fn alias_resolution_round_trips_over_the_wire() {
    let server = MockServer::start().await;
    mount_manifest(&server, 100).await;
    mount_locale(&server, "/content/en/main.yml", 100, EN_CONTENT).await;
    mount_locale(&server, "/content/tr/main.yml", 100, TR_CONTENT).await;

    let dir = TempDir::new().unwrap();
    let client = OtaClient::new(&server.uri(), dir.path()).await.unwrap();

    assert_eq!(client.alias_for("tr", "locale"), "tr-TR");
    assert_eq!(client.canonical_for("tr-TR", "locale"), "tr");
    assert_eq!(client.alias_for("aaa", "locale"), "aaa");

    let file = client.file(MAIN_FILE).unwrap();
    assert_eq!(
        file.content_by_alias("locale", "tr-TR").await.unwrap(),
        TR_CONTENT
    );
    // Codes without a mapping pass through unchanged
    assert_eq!(
        file.content_by_alias("locale", "en").await.unwrap(),
        EN_CONTENT
    );
}

#[tokio::test]
async fn manifest_fetch_failure_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manifest.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = OtaClient::new(&server.uri(), dir.path()).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Manifest(ManifestError::Fetch { status: 404 })
    ));
}

#[tokio::test]
async fn malformed_manifest_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manifest.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[\"not\", \"an\", \"object\"]"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = OtaClient::new(&server.uri(), dir.path()).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Manifest(ManifestError::Parse { .. })
    ));
}

#[tokio::test]
async fn failed_locale_does_not_abort_its_siblings() {
    let server = MockServer::start().await;
    mount_manifest(&server, 100).await;
    mount_locale(&server, "/content/en/main.yml", 100, EN_CONTENT).await;
    Mock::given(method("GET"))
        .and(path("/content/tr/main.yml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    // Construction completes despite the failing locale
    let client = OtaClient::new(&server.uri(), dir.path()).await.unwrap();
    let file = client.file(MAIN_FILE).unwrap();

    assert_eq!(file.content("en").await.unwrap(), EN_CONTENT);
    assert!(file.content("tr").await.is_none());

    // A repeated refresh keeps trying the failed locale and reports it
    let stats = file.refresh(true, 4).await.unwrap();
    assert_eq!(stats.needed, 1);
    assert_eq!(stats.downloaded, 0);
    assert_eq!(stats.failed(), 1);
}

#[tokio::test]
async fn manifest_version_bump_refreshes_expired_locales() {
    let server = MockServer::start().await;
    mount_manifest(&server, 100).await;
    mount_locale(&server, "/content/en/main.yml", 100, EN_CONTENT).await;
    mount_locale(&server, "/content/tr/main.yml", 100, TR_CONTENT).await;

    let dir = TempDir::new().unwrap();
    OtaClient::new(&server.uri(), dir.path()).await.unwrap();

    // The distribution publishes a new snapshot with updated content
    server.reset().await;
    mount_manifest(&server, 101).await;
    mount_locale(&server, "/content/en/main.yml", 101, "greeting: \"Hi\"\n").await;
    mount_locale(&server, "/content/tr/main.yml", 101, "greeting: \"Selam\"\n").await;

    let client = OtaClient::new(&server.uri(), dir.path()).await.unwrap();
    let file = client.file(MAIN_FILE).unwrap();
    assert_eq!(file.content("en").await.unwrap(), "greeting: \"Hi\"\n");
    assert_eq!(file.content("tr").await.unwrap(), "greeting: \"Selam\"\n");
}

#[tokio::test]
async fn stale_content_is_served_when_refresh_fails() {
    let server = MockServer::start().await;
    mount_manifest(&server, 100).await;
    mount_locale(&server, "/content/en/main.yml", 100, EN_CONTENT).await;
    mount_locale(&server, "/content/tr/main.yml", 100, TR_CONTENT).await;

    let dir = TempDir::new().unwrap();
    OtaClient::new(&server.uri(), dir.path()).await.unwrap();

    // New snapshot published, but the locale downloads now fail
    server.reset().await;
    mount_manifest(&server, 101).await;

    let client = OtaClient::new(&server.uri(), dir.path()).await.unwrap();
    let file = client.file(MAIN_FILE).unwrap();

    // The failed refresh left the previous entries in place; reads prefer
    // the stale-but-present value over blocking on the network
    assert_eq!(file.content("en").await.unwrap(), EN_CONTENT);
    assert_eq!(file.content("tr").await.unwrap(), TR_CONTENT);
}

#[tokio::test]
async fn corrupted_cache_entry_is_downloaded_again() {
    let server = MockServer::start().await;
    mount_manifest(&server, 100).await;
    mount_locale(&server, "/content/en/main.yml", 100, EN_CONTENT).await;
    mount_locale(&server, "/content/tr/main.yml", 100, TR_CONTENT).await;

    let dir = TempDir::new().unwrap();
    OtaClient::new(&server.uri(), dir.path()).await.unwrap();

    // Corrupt one locale behind the cache's back
    let en_file = cache_folder(dir.path()).join("en");
    std::fs::write(&en_file, "tampered beyond recognition").unwrap();

    // The next construction detects the fingerprint mismatch and re-fetches
    let client = OtaClient::new(&server.uri(), dir.path()).await.unwrap();
    let file = client.file(MAIN_FILE).unwrap();
    assert_eq!(file.content("en").await.unwrap(), EN_CONTENT);
    assert_eq!(std::fs::read_to_string(&en_file).unwrap(), EN_CONTENT);
}

#[tokio::test]
async fn refresh_locale_propagates_download_failures() {
    let server = MockServer::start().await;
    mount_manifest(&server, 100).await;
    mount_locale(&server, "/content/en/main.yml", 100, EN_CONTENT).await;
    Mock::given(method("GET"))
        .and(path("/content/tr/main.yml"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = OtaClient::new(&server.uri(), dir.path()).await.unwrap();
    let file = client.file(MAIN_FILE).unwrap();

    // Targeted single-locale downloads surface the failure to the caller
    assert!(file.refresh_locale("tr").await.is_err());
    assert!(file.refresh_locale("en").await.is_ok());
}

#[tokio::test]
async fn manifest_refresh_rebuilds_the_registry() {
    let server = MockServer::start().await;
    mount_manifest(&server, 100).await;
    mount_locale(&server, "/content/en/main.yml", 100, EN_CONTENT).await;
    mount_locale(&server, "/content/tr/main.yml", 100, TR_CONTENT).await;

    let dir = TempDir::new().unwrap();
    let mut client = OtaClient::new(&server.uri(), dir.path()).await.unwrap();
    assert_eq!(client.timestamp(), 100);

    server.reset().await;
    mount_manifest(&server, 101).await;
    mount_locale(&server, "/content/en/main.yml", 101, "greeting: \"Hi\"\n").await;
    mount_locale(&server, "/content/tr/main.yml", 101, "greeting: \"Selam\"\n").await;

    client.refresh_manifest().await.unwrap();
    assert_eq!(client.timestamp(), 101);

    let file = client.file(MAIN_FILE).unwrap();
    assert_eq!(file.content("en").await.unwrap(), "greeting: \"Hi\"\n");
}
