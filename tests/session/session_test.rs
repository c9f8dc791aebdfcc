use std::sync::Arc;

use multitable::join::JoinError;
use multitable::metadata::{ConnectionInfo, StaticSchemaProvider};
use multitable::model::{JoinRelationship, Table};
use multitable::refresh::{Accepted, RefreshState};
use multitable::session::{
    CommitError, HostEvent, JoinSession, MemoryCommitSink, RecordingHost, SessionError,
};
use multitable::validation::{ModelingMode, WizardState};

struct Fixture {
    session: JoinSession<StaticSchemaProvider>,
    host: Arc<RecordingHost>,
    sink: Arc<MemoryCommitSink>,
}

fn provider() -> StaticSchemaProvider {
    StaticSchemaProvider::new().with_schema(
        "sales",
        vec![
            Table::new("A").with_fields(["id", "b_id", "c_id"]),
            Table::new("B").with_fields(["id"]),
            Table::new("C").with_fields(["id"]),
        ],
    )
}

async fn loaded(mode: ModelingMode) -> Fixture {
    let host = Arc::new(RecordingHost::new());
    let sink = Arc::new(MemoryCommitSink::new());
    let mut session = JoinSession::new(
        Arc::new(provider()),
        ConnectionInfo::new("local", "static", "").with_default_schema("sales"),
        host.clone(),
        sink.clone(),
    )
    .with_mode(mode);

    let request = session.activate_forward().expect("catalog is empty");
    session.apply_tables(request.run().await);
    host.clear();

    Fixture { session, host, sink }
}

#[tokio::test]
async fn test_remove_cascades_to_joins_and_fact_table() {
    let Fixture { mut session, host, .. } = loaded(ModelingMode::Star).await;

    session.add_tables(["A", "B", "C"]);
    session
        .add_relationship(JoinRelationship::between("A", "b_id", "B", "id"))
        .unwrap();
    session.set_fact_table(Some("B"));
    assert_eq!(session.state(), WizardState { valid: true, finishable: true });

    let removed = session.remove_tables(["B"]);

    assert_eq!(removed.len(), 1);
    assert_eq!(session.selection().names(), vec!["A", "C"]);
    assert!(session.joins().is_empty());
    assert!(session.fact_table().is_none());
    assert_eq!(session.fact_table_index(), 0);
    assert_eq!(host.last_state(), Some(WizardState::BLOCKED));
}

#[tokio::test]
async fn test_every_mutation_publishes_once() {
    let Fixture { mut session, host, .. } = loaded(ModelingMode::Flat).await;

    session.add_tables(["A"]);
    session.add_tables(["B"]);
    session
        .add_relationship(JoinRelationship::between("A", "b_id", "B", "id"))
        .unwrap();
    session.set_fact_table_by_index(1);
    session.remove_tables(["B"]);

    assert_eq!(host.state_changes(), 5);
    assert_eq!(
        host.events().last(),
        Some(&HostEvent::StateChanged(WizardState { valid: false, finishable: true }))
    );
}

#[tokio::test]
async fn test_add_tables_uses_catalog_order() {
    let Fixture { mut session, .. } = loaded(ModelingMode::Flat).await;

    let added = session.add_tables(["C", "A", "missing", "A"]);

    assert_eq!(added, 2);
    assert_eq!(session.selection().names(), vec!["A", "C"]);
    let available: Vec<&str> = session.available_tables().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(available, vec!["B"]);
}

#[tokio::test]
async fn test_invalid_endpoint_is_not_shown_to_host() {
    let Fixture { mut session, host, .. } = loaded(ModelingMode::Flat).await;
    session.add_tables(["A"]);
    host.clear();

    let result = session.add_relationship(JoinRelationship::between("A", "b_id", "B", "id"));

    assert!(matches!(result, Err(JoinError::InvalidEndpoint(_))));
    assert!(host.events().is_empty());
    assert!(session.joins().is_empty());
}

#[tokio::test]
async fn test_remove_relationship_publishes_only_on_change() {
    let Fixture { mut session, host, .. } = loaded(ModelingMode::Flat).await;
    session.add_tables(["A", "B"]);
    let rel = JoinRelationship::between("A", "b_id", "B", "id");
    session.add_relationship(rel.clone()).unwrap();
    host.clear();

    assert!(session.remove_relationship(&rel));
    assert!(!session.remove_relationship(&rel));
    assert_eq!(host.state_changes(), 1);
}

#[tokio::test]
async fn test_star_mode_fact_table_by_index() {
    let Fixture { mut session, .. } = loaded(ModelingMode::Star).await;
    session.add_tables(["A", "B"]);
    assert_eq!(session.state(), WizardState::BLOCKED);

    session.set_fact_table_by_index(1);
    assert_eq!(session.fact_table().map(|t| t.name.as_str()), Some("A"));
    assert_eq!(session.fact_table_index(), 1);
    assert_eq!(session.state(), WizardState { valid: true, finishable: true });

    session.set_fact_table_by_index(0);
    assert!(session.fact_table().is_none());
    assert_eq!(session.state(), WizardState::BLOCKED);
}

#[tokio::test]
async fn test_switching_mode_recomputes() {
    let Fixture { mut session, .. } = loaded(ModelingMode::Flat).await;
    session.add_tables(["A", "B"]);
    assert!(session.state().valid);

    session.set_mode(ModelingMode::Star);
    assert_eq!(session.state(), WizardState::BLOCKED);
}

#[tokio::test]
async fn test_commit_hands_snapshot_to_sink() {
    let Fixture { mut session, sink, .. } = loaded(ModelingMode::Star).await;
    session.add_tables(["A", "B"]);
    session
        .add_relationship(JoinRelationship::between("A", "b_id", "B", "id"))
        .unwrap();
    session.set_fact_table(Some("A"));

    let snapshot = session.commit("sales_model").unwrap();

    assert_eq!(sink.snapshots(), vec![snapshot.clone()]);
    assert_eq!(snapshot.mode, ModelingMode::Star);
    assert_eq!(snapshot.schema.as_deref(), Some("sales"));
    assert_eq!(snapshot.selected_tables.len(), 2);
    assert_eq!(snapshot.join_relationships.len(), 1);
    assert_eq!(snapshot.fact_table.as_deref(), Some("A"));
    assert_eq!(snapshot.context, session.connection_context());

    let config = snapshot.to_config();
    assert_eq!(config.tables, vec!["A".to_string(), "B".to_string()]);
}

#[tokio::test]
async fn test_commit_refused_while_blocked() {
    let Fixture { mut session, sink, .. } = loaded(ModelingMode::Star).await;
    session.add_tables(["A", "B"]);

    let err = session.commit("sales_model").unwrap_err();

    assert!(matches!(err, SessionError::NotReady { valid: false, finishable: false }));
    assert!(sink.snapshots().is_empty());
}

#[tokio::test]
async fn test_commit_sink_rejection_propagates() {
    let mut session = JoinSession::new(
        Arc::new(provider()),
        ConnectionInfo::new("local", "static", ""),
        Arc::new(RecordingHost::new()),
        Arc::new(MemoryCommitSink::rejecting("read-only repository")),
    );
    session.fetch_tables().await;
    session.add_tables(["A"]);

    let err = session.commit("ds").unwrap_err();
    assert!(matches!(err, SessionError::Commit(CommitError::Rejected(ref r)) if r == "read-only repository"));
}

#[tokio::test]
async fn test_refresh_keeps_selection_for_surviving_tables() {
    let Fixture { mut session, host, .. } = loaded(ModelingMode::Flat).await;
    session.add_tables(["A", "B"]);

    let accepted = session.refresh().await;

    assert!(matches!(accepted, Accepted::Current(ref t) if t.len() == 3));
    assert_eq!(session.selected_schema(), Some("sales"));
    assert_eq!(session.selection().names(), vec!["A", "B"]);
    assert_eq!(session.refresh_state(), RefreshState::TablesReady);
    assert!(host.events().contains(&HostEvent::ShowBusy));
}

#[tokio::test]
async fn test_new_catalog_prunes_selection_joins_and_fact_table() {
    let provider = StaticSchemaProvider::new()
        .with_schema(
            "old",
            vec![
                Table::new("A").with_fields(["id", "b_id"]),
                Table::new("B").with_fields(["id"]),
                Table::new("C").with_fields(["id"]),
            ],
        )
        .with_schema(
            "new",
            vec![Table::new("A").with_fields(["id"]), Table::new("C").with_fields(["id"])],
        );
    let mut session = JoinSession::new(
        Arc::new(provider),
        ConnectionInfo::new("local", "static", ""),
        Arc::new(RecordingHost::new()),
        Arc::new(MemoryCommitSink::new()),
    )
    .with_mode(ModelingMode::Star);
    session.activate_reverse();

    let old = session.select_schema("old").unwrap();
    session.apply_tables(old.run().await);
    session.add_tables(["A", "B", "C"]);
    session
        .add_relationship(JoinRelationship::between("A", "id", "C", "id"))
        .unwrap();
    session
        .add_relationship(JoinRelationship::between("A", "b_id", "B", "id"))
        .unwrap();
    session.set_fact_table(Some("B"));

    let new = session.select_schema("new").unwrap();
    session.apply_tables(new.run().await);

    assert_eq!(session.selection().names(), vec!["A", "C"]);
    assert_eq!(
        session.joins().relationships(),
        &[JoinRelationship::between("A", "id", "C", "id")]
    );
    assert!(session.fact_table().is_none());
    assert!(!session.selection().get("A").unwrap().has_field("b_id"));
}

#[tokio::test]
async fn test_connection_switch_clears_session() {
    let Fixture { mut session, host, .. } = loaded(ModelingMode::Flat).await;
    session.add_tables(["A", "B"]);

    session.set_connection(ConnectionInfo::new("other", "static", "elsewhere"));

    assert!(session.catalog().is_empty());
    assert!(session.selection().is_empty());
    assert_eq!(session.refresh_state(), RefreshState::Idle);
    assert_eq!(host.last_state(), Some(WizardState::BLOCKED));
    assert_eq!(session.connection().name, "other");
}

#[tokio::test]
async fn test_session_ids_are_unique() {
    let a = loaded(ModelingMode::Flat).await.session;
    let b = loaded(ModelingMode::Flat).await.session;
    assert_ne!(a.id(), b.id());
}
