// Path: crates/ipc/src/tests.rs

use crate::client::ControlClient;
use crate::protocol::{ControlCommand, ControlRequest, ResponseStatus};
use crate::server::ControlServer;
use crate::table::{NodeEntry, ProcessTable, RelaunchSpec, SharedProcessTable};
use std::path::PathBuf;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

fn sleeper_spec() -> RelaunchSpec {
    RelaunchSpec {
        program: PathBuf::from("/bin/sleep"),
        args: vec!["300".to_string()],
        envs: Vec::new(),
    }
}

async fn track_sleeper(table: &SharedProcessTable, name: &str) {
    let spec = sleeper_spec();
    let child = spec.spawn().expect("spawn sleeper");
    let pid = child.id().expect("sleeper pid");
    table.lock().await.insert(
        name,
        NodeEntry {
            pid: Some(pid),
            relaunch: spec,
            child: Some(child),
        },
    );
}

struct Harness {
    _dir: tempfile::TempDir,
    server: ControlServer,
    table: SharedProcessTable,
    client: ControlClient,
}

impl Harness {
    async fn new(nodes: &[&str]) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let table = ProcessTable::shared();
        for name in nodes {
            track_sleeper(&table, name).await;
        }
        let socket = dir.path().join("plinth.sock");
        let server = ControlServer::bind(&socket, table.clone()).expect("bind control socket");
        let client = ControlClient::new(&socket);
        Self {
            _dir: dir,
            server,
            table,
            client,
        }
    }

    async fn teardown(self) {
        self.server.shutdown();
        self.table.lock().await.kill_all().await;
    }
}

#[tokio::test]
async fn isup_round_trip() {
    let h = Harness::new(&["alice"]).await;

    assert!(h.client.is_up("alice").await.expect("isup alice"));

    // Unknown node: failure response, not a transport error, and the server
    // keeps serving afterwards.
    let err = h.client.is_up("mallory").await.unwrap_err();
    assert!(err.to_string().contains("unknown node"));
    assert!(h.client.is_up("alice").await.expect("isup after failure"));

    h.teardown().await;
}

#[tokio::test]
async fn unknown_command_yields_failure_response() {
    let h = Harness::new(&["alice"]).await;

    let mut stream = UnixStream::connect(h.client.socket_path())
        .await
        .expect("connect");
    stream
        .write_all(br#"{ "text": "explode alice", "cmd": "explode", "nodeName": "alice" }"#)
        .await
        .expect("write");
    stream.shutdown().await.expect("half-close");
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.expect("read response");

    let response: crate::protocol::ControlResponse =
        serde_json::from_slice(&raw).expect("parse response");
    assert_eq!(response.status, ResponseStatus::Failure);

    h.teardown().await;
}

#[tokio::test]
async fn networkmap_lists_tracked_nodes() {
    let h = Harness::new(&["alice", "bob"]).await;

    let map = h.client.network_map().await.expect("networkmap");
    assert_eq!(map.len(), 2);
    assert!(map.contains_key("alice"));
    assert!(map.contains_key("bob"));

    h.teardown().await;
}

#[tokio::test]
async fn kill_drops_the_pid_but_keeps_the_node_registered() {
    let h = Harness::new(&["alice", "bob"]).await;

    h.client.kill_node("bob").await.expect("kill bob");
    {
        let table = h.table.lock().await;
        assert!(table.contains("bob"));
        assert_eq!(table.pid_of("bob"), None);
    }

    // A killed node answers isup with `false`, not with an unknown-node
    // failure, and pause has nothing to signal.
    assert!(!h.client.is_up("bob").await.expect("isup killed node"));
    let err = h.client.pause_node("bob").await.unwrap_err();
    assert!(err.to_string().contains("no live process"));

    h.teardown().await;
}

#[tokio::test]
async fn restart_succeeds_without_prior_liveness() {
    let h = Harness::new(&["alice", "bob", "collator01"]).await;

    // Kill bob, then restart it: restart must respawn from the relaunch spec
    // even though no bob process is alive.
    h.client.kill_node("bob").await.expect("kill bob");
    assert!(!h.client.is_up("bob").await.expect("isup after kill"));

    h.client.restart_node("bob").await.expect("restart bob");
    assert!(h.client.is_up("bob").await.expect("isup after restart"));

    h.teardown().await;
}

#[tokio::test]
async fn pause_and_resume_round_trip() {
    let h = Harness::new(&["alice"]).await;

    h.client.pause_node("alice").await.expect("pause alice");
    h.client.resume_node("alice").await.expect("resume alice");
    assert!(h.client.is_up("alice").await.expect("isup alice"));

    h.teardown().await;
}

#[tokio::test]
async fn client_surfaces_transport_errors_as_typed() {
    let client = ControlClient::new("/nonexistent/plinth.sock");
    let err = client
        .send(&ControlRequest::new(ControlCommand::Isup, Some("alice")))
        .await
        .unwrap_err();
    assert_eq!(err.operation, "isup");
    assert_eq!(err.node_name, "alice");
    assert!(err.reason.contains("plinth.sock"));
}
