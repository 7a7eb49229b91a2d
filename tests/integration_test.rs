// Integration tests for graphdesk
use async_trait::async_trait;
use graphdesk::replay::replay_file;
use graphdesk::{
    AssemblerConfig, CatalogState, ClientError, ClientFactory, ConnectTarget,
    ConnectionSessionManager, DatabaseClient, Edge, EdgeDirection, ErrorKind, ExplanationEdge,
    ExplanationVertex, GraphAssembler, GraphEvent, IncompleteEdge, QueuedReporter, ServerKind,
    ServerProfile, Vertex, VertexEncoding,
};
use graphdesk_session::ManualClock;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct StaticClient {
    databases: Vec<String>,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl DatabaseClient for StaticClient {
    async fn list_databases(&self) -> Result<Vec<String>, ClientError> {
        Ok(self.databases.clone())
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Accepts core connections to any address and cluster connections only for `admin`
#[derive(Default)]
struct StaticFactory {
    connects: AtomicUsize,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl ClientFactory for StaticFactory {
    async fn connect(&self, target: &ConnectTarget) -> Result<Box<dyn DatabaseClient>, ClientError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if let ConnectTarget::Cluster { username, .. } = target {
            if username != "admin" {
                return Err(ClientError::Authentication(format!("unknown user {}", username)));
            }
        }
        Ok(Box::new(StaticClient {
            databases: vec!["social".to_string(), format!("{}-db", target.kind().display_name())],
            closes: self.closes.clone(),
        }))
    }
}

fn session(
    profile: ServerProfile,
) -> (ConnectionSessionManager, Arc<StaticFactory>, Arc<QueuedReporter>, Arc<ManualClock>) {
    let factory = Arc::new(StaticFactory::default());
    let reporter = Arc::new(QueuedReporter::default());
    let clock = Arc::new(ManualClock::new(1_000_000));
    let manager = ConnectionSessionManager::new(
        tokio::runtime::Handle::current(),
        factory.clone(),
        reporter.clone(),
    )
    .with_profile(profile)
    .with_clock(clock.clone());
    (manager, factory, reporter, clock)
}

fn entity(id: i32) -> Vertex {
    Vertex::new(id, VertexEncoding::Entity, format!("person:{}", id))
        .with_short_label("person")
        .with_size(96.0, 32.0)
}

#[tokio::test]
async fn test_login_flow_to_submission() {
    let (manager, factory, reporter, _clock) = session(ServerProfile::core("localhost:1729"));

    manager.request_catalog_refresh().unwrap().await.unwrap();
    assert_eq!(manager.catalog().names(), &["social", "Core-db"]);

    let db = manager.select_database("social").unwrap();
    assert_eq!(db.client().address(), "localhost:1729");

    let submission = manager.submit().unwrap();
    assert_eq!(submission.profile.kind, ServerKind::Core);
    assert_eq!(submission.db.database(), "social");
    assert!(reporter.is_empty());

    drop(manager);
    assert_eq!(factory.closes.load(Ordering::SeqCst), 0);
    drop((db, submission));
    assert_eq!(factory.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cluster_auth_failure_then_retry() {
    let (manager, factory, reporter, _clock) =
        session(ServerProfile::cluster("cluster:1729", "guest", "pw"));

    manager.request_catalog_refresh().unwrap().await.unwrap();
    assert_eq!(manager.catalog_state(), CatalogState::Failed);
    let reports = reporter.drain();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].kind, ErrorKind::Transport);
    assert!(reports[0].message.contains("cluster:1729"));

    manager.set_username("admin");
    manager.request_catalog_refresh().unwrap().await.unwrap();
    assert_eq!(manager.catalog().names(), &["social", "Cluster-db"]);
    assert_eq!(factory.connects.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_repeated_focus_refresh_is_debounced() {
    let (manager, factory, _reporter, clock) = session(ServerProfile::core("localhost:1729"));
    manager.request_catalog_refresh().unwrap().await.unwrap();
    let fetched_at = manager.catalog().fetched_at_millis();

    for _ in 0..10 {
        clock.advance(Duration::from_millis(100));
        assert!(manager.request_catalog_refresh().is_none());
    }
    assert_eq!(manager.catalog().fetched_at_millis(), fetched_at);
    assert_eq!(factory.connects.load(Ordering::SeqCst), 1);

    // Switching kinds throws the cache away, so the next request fetches again
    manager.select_server_kind(ServerKind::Cluster);
    manager.select_server_kind(ServerKind::Core);
    assert_eq!(manager.catalog_state(), CatalogState::Empty);
    assert!(manager.request_catalog_refresh().is_some());
}

#[test]
fn test_out_of_order_stream_assembly() {
    let mut assembler = GraphAssembler::new();
    let events = vec![
        GraphEvent::ExplanationEdgeSeen(ExplanationEdge { explanation_id: 1, edge_id: 5 }),
        GraphEvent::VertexSeen(entity(2)),
        GraphEvent::IncompleteEdgeSeen(IncompleteEdge::new(5, 2, EdgeDirection::Outgoing, "owns")),
        GraphEvent::ExplanationVertexSeen(ExplanationVertex { explanation_id: 1, vertex_id: 3 }),
        GraphEvent::VertexSeen(entity(3)),
        GraphEvent::IncompleteEdgeSeen(
            IncompleteEdge::new(5, 3, EdgeDirection::Incoming, "owns"),
        ),
        GraphEvent::ExplanationVertexSeen(ExplanationVertex { explanation_id: 2, vertex_id: 77 }),
    ];
    assert!(assembler.ingest_all(events).is_empty());

    let partial = assembler.flush();
    assert_eq!(partial.edges, vec![Edge::new(5, 2, 3, "owns")]);
    assert_eq!(partial.explanation_edges.len(), 1);
    assert_eq!(partial.explanation_vertices.len(), 1);
    assert_eq!(assembler.diagnostics().pending_links, 1);

    let graph = assembler.finish();
    assert_eq!(graph.vertex_ids(), vec![2, 3]);
    assert_eq!(graph.explanation_vertices, vec![ExplanationVertex { explanation_id: 1, vertex_id: 3 }]);
    assert_eq!(assembler.diagnostics().dropped_links, 1);
}

#[test]
fn test_replay_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let events = vec![
        GraphEvent::EdgeSeen(Edge::new(10, 1, 2, "knows")),
        GraphEvent::VertexSeen(entity(1)),
        GraphEvent::VertexSeen(entity(2)),
        GraphEvent::EdgeSeen(Edge::new(10, 2, 1, "knows")),
        GraphEvent::EdgeSeen(Edge::new(11, 1, 9, "knows")),
    ];
    for event in &events {
        writeln!(file, "{}", serde_json::to_string(event).unwrap()).unwrap();
    }

    let report = replay_file(file.path(), AssemblerConfig::default(), Some(2)).unwrap();
    assert_eq!(report.graph.vertex_ids(), vec![1, 2]);
    assert_eq!(report.graph.edge_ids(), vec![10]);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.diagnostics.dropped_edges, 1);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["graph"]["edges"][0]["label"], "knows");
}
