use std::sync::Arc;

use multitable::metadata::{ConnectionInfo, StaticSchemaProvider};
use multitable::model::{JoinRelationship, Table};
use multitable::persist::PersistedJoinConfig;
use multitable::session::{JoinSession, MemoryCommitSink, ModelCommitSink, RecordingHost};
use multitable::store::DatasourceStore;
use multitable::validation::{ModelingMode, WizardState};

fn provider() -> StaticSchemaProvider {
    StaticSchemaProvider::new()
        .with_schema(
            "sales",
            vec![
                Table::new("orders").with_fields(["id", "customer_id", "store_id"]),
                Table::new("customers").with_fields(["id"]),
                Table::new("products").with_fields(["id"]),
            ],
        )
        .with_schema("hr", vec![Table::new("employees").with_fields(["id"])])
}

fn saved() -> PersistedJoinConfig {
    PersistedJoinConfig {
        schema: Some("sales".into()),
        tables: vec!["orders".into(), "customers".into(), "stores".into()],
        relationships: vec![
            JoinRelationship::between("orders", "customer_id", "customers", "id"),
            JoinRelationship::between("orders", "store_id", "stores", "id"),
        ],
        fact_table: Some("orders".into()),
    }
}

fn session(
    sink: Arc<dyn ModelCommitSink>,
    config: PersistedJoinConfig,
) -> JoinSession<StaticSchemaProvider> {
    JoinSession::new(
        Arc::new(provider()),
        ConnectionInfo::new("local", "static", "warehouse"),
        Arc::new(RecordingHost::new()),
        sink,
    )
    .with_mode(ModelingMode::Star)
    .with_saved_config(config)
}

#[tokio::test]
async fn test_restore_drops_missing_tables_silently() {
    let mut session = session(Arc::new(MemoryCommitSink::new()), saved());
    session.activate_reverse();

    let request = session.select_schema("sales").unwrap();
    session.apply_tables(request.run().await);

    assert_eq!(session.selection().names(), vec!["orders", "customers"]);
    assert_eq!(session.joins().len(), 1);
    assert_eq!(session.fact_table().map(|t| t.name.as_str()), Some("orders"));
    assert_eq!(session.state(), WizardState { valid: true, finishable: true });
    assert!(!session.has_pending_restore());
}

#[tokio::test]
async fn test_restore_waits_for_matching_schema() {
    let mut session = session(Arc::new(MemoryCommitSink::new()), saved());
    session.activate_reverse();

    let hr = session.select_schema("hr").unwrap();
    session.apply_tables(hr.run().await);
    assert!(session.selection().is_empty());
    assert!(session.has_pending_restore());

    let sales = session.select_schema("sales").unwrap();
    session.apply_tables(sales.run().await);
    assert_eq!(session.selection().len(), 2);
    assert!(!session.has_pending_restore());
}

#[tokio::test]
async fn test_restore_happens_once() {
    let mut session = session(Arc::new(MemoryCommitSink::new()), saved());
    session.activate_reverse();

    let request = session.select_schema("sales").unwrap();
    session.apply_tables(request.run().await);
    session.remove_tables(["customers"]);

    session.refresh().await;
    assert_eq!(session.selection().names(), vec!["orders"]);
}

#[tokio::test]
async fn test_commit_then_restore_through_store() {
    let store = Arc::new(DatasourceStore::open_in_memory().unwrap());

    let mut first = session(store.clone(), saved());
    first.activate_reverse();
    let request = first.select_schema("sales").unwrap();
    first.apply_tables(request.run().await);
    first.add_tables(["products"]);
    first.commit("sales_model").unwrap();

    let context = first.connection_context();
    let config = store.load_config("sales_model", &context).unwrap().unwrap();
    assert_eq!(config.tables, vec!["orders", "customers", "products"]);

    let mut second = session(Arc::new(MemoryCommitSink::new()), config);
    second.activate_reverse();
    let request = second.select_schema("sales").unwrap();
    second.apply_tables(request.run().await);

    assert_eq!(second.selection().names(), vec!["orders", "customers", "products"]);
    assert_eq!(second.joins().len(), 1);
    assert_eq!(second.fact_table().map(|t| t.name.as_str()), Some("orders"));
}
