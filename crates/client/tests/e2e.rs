//! Full-loop tests over real HTTP: a live server on an ephemeral port, a
//! real client, filesystem-backed stores on both sides.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use veristore_client::{ApiClient, ClientError, Uploader};
use veristore_common::{FileStore, OsFiles};
use veristore_server::{router, JsonStore, Server};

async fn spawn_server(data_dir: &Path) -> String {
    let files = Arc::new(OsFiles::new(data_dir));
    let db = Arc::new(JsonStore::new(files.clone()).expect("load backup"));
    let server = Arc::new(Server::new(files, db).expect("rebuild state"));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router(server)).await.expect("serve");
    });
    format!("http://{addr}")
}

fn seed_inputs(files: &dyn FileStore, n: usize) -> Vec<String> {
    let mut paths = Vec::with_capacity(n);
    for i in 0..n {
        let name = format!("input-{i}");
        let body = format!("contents of file {i}");
        files.save(&name, &mut body.as_bytes()).expect("seed");
        paths.push(name);
    }
    paths
}

fn read_back(files: &dyn FileStore, path: &str) -> Vec<u8> {
    let mut content = Vec::new();
    files
        .open(path)
        .expect("open")
        .read_to_end(&mut content)
        .expect("read");
    content
}

#[tokio::test]
async fn upload_then_download_over_http() {
    for n in [1usize, 5, 50] {
        let server_dir = tempfile::tempdir().expect("server dir");
        let client_dir = tempfile::tempdir().expect("client dir");
        let url = spawn_server(server_dir.path()).await;

        let files = Arc::new(OsFiles::new(client_dir.path()));
        let paths = seed_inputs(files.as_ref(), n);

        let uploader = Uploader::new(files.clone(), Arc::new(ApiClient::new(url)));
        let root = uploader.upload(&paths).await.expect("upload");

        // Local copies are gone once the batch is uploaded.
        assert!(files.open("input-0").is_err(), "n={n}");

        let indexes: Vec<usize> = (0..n).collect();
        uploader.download(&root, &indexes).await.expect("download");

        for i in 0..n {
            assert_eq!(
                read_back(files.as_ref(), &format!("{root}/{i}")),
                format!("contents of file {i}").into_bytes(),
                "n={n} i={i}"
            );
        }
    }
}

#[tokio::test]
async fn server_restart_preserves_proofs() {
    let server_dir = tempfile::tempdir().expect("server dir");
    let client_dir = tempfile::tempdir().expect("client dir");

    let files = Arc::new(OsFiles::new(client_dir.path()));
    let paths = seed_inputs(files.as_ref(), 3);

    let url = spawn_server(server_dir.path()).await;
    let uploader = Uploader::new(files.clone(), Arc::new(ApiClient::new(url)));
    let root = uploader.upload(&paths).await.expect("upload");

    // A second server over the same data directory stands in for a
    // restarted process: backup.json must be enough to serve proofs.
    let url = spawn_server(server_dir.path()).await;
    let uploader = Uploader::new(files.clone(), Arc::new(ApiClient::new(url)));
    uploader.download(&root, &[0, 1, 2]).await.expect("download");

    for i in 0..3 {
        assert_eq!(
            read_back(files.as_ref(), &format!("{root}/{i}")),
            format!("contents of file {i}").into_bytes()
        );
    }
}

#[tokio::test]
async fn missing_index_surfaces_the_server_error() {
    let server_dir = tempfile::tempdir().expect("server dir");
    let client_dir = tempfile::tempdir().expect("client dir");

    let files = Arc::new(OsFiles::new(client_dir.path()));
    let paths = seed_inputs(files.as_ref(), 2);

    let url = spawn_server(server_dir.path()).await;
    let uploader = Uploader::new(files.clone(), Arc::new(ApiClient::new(url)));
    let root = uploader.upload(&paths).await.expect("upload");

    let err = uploader.download(&root, &[9]).await.unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 500, .. }));
}
