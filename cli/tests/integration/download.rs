//! `HttpDownloader` / `TemplateFetcher` against a local HTTP server.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use shipctl::application::ports::{Downloader, ResourceFetcher};
use shipctl::domain::InstallerError;
use shipctl::infra::download::{CHUNK_SIZE, HttpDownloader, TemplateFetcher};

use crate::support::{http_ok, http_status, serve_once};

#[tokio::test]
async fn download_streams_body_into_temp_dir() {
    let body: Vec<u8> = (0..CHUNK_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();
    let port = serve_once(http_ok(&body));
    let dir = tempfile::tempdir().unwrap();

    let path = HttpDownloader
        .download(
            &format!("http://127.0.0.1:{port}/beats/filebeat_1.2.3_amd64.deb"),
            dir.path(),
            "filebeat_1.2.3_amd64.deb",
        )
        .await
        .expect("download");

    assert_eq!(path.parent(), Some(dir.path()));
    assert!(path.to_string_lossy().ends_with("filebeat_1.2.3_amd64.deb"));
    assert_eq!(std::fs::read(&path).unwrap(), body);
}

#[tokio::test]
async fn download_404_is_download_error_and_leaves_nothing() {
    let port = serve_once(http_status(404, "Not Found"));
    let dir = tempfile::tempdir().unwrap();

    let err = HttpDownloader
        .download(&format!("http://127.0.0.1:{port}/missing.deb"), dir.path(), "missing.deb")
        .await
        .unwrap_err();

    match err.downcast_ref::<InstallerError>() {
        Some(InstallerError::DownloadError(msg)) => assert!(msg.contains("404"), "{msg}"),
        other => panic!("expected DownloadError, got {other:?}"),
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn connection_refused_is_download_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let dir = tempfile::tempdir().unwrap();

    let err = HttpDownloader
        .download(&format!("http://127.0.0.1:{port}/x.deb"), dir.path(), "x.deb")
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<InstallerError>(),
        Some(InstallerError::DownloadError(_))
    ));
}

#[tokio::test]
async fn remote_template_is_fetched_as_text() {
    let port = serve_once(http_ok(b"output:\n  file: {{ out | json_encode() }}\n"));

    let text = TemplateFetcher
        .fetch_text(&format!("http://127.0.0.1:{port}/templates/filebeat.yml"))
        .await
        .expect("fetch");

    assert!(text.starts_with("output:"));
}
