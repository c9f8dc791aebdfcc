use std::sync::Arc;

use multitable::metadata::{ConnectionInfo, StaticSchemaProvider};
use multitable::model::Table;
use multitable::persist::PersistedJoinConfig;
use multitable::session::{JoinSession, ModelCommitSink, RecordingHost};
use multitable::store::{
    connection_context, DatasourceOrigin, DatasourceRecord, DatasourceStore, MODELING_MODE,
    WIZARD_GENERATED_SCHEMA,
};

#[test]
fn test_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("datasources.db");

    {
        let store = DatasourceStore::open(&path).unwrap();
        store
            .save(&DatasourceRecord::new("ds", "ctx", PersistedJoinConfig::default()))
            .unwrap();
    }

    let store = DatasourceStore::open(&path).unwrap();
    assert_eq!(store.names().unwrap(), vec!["ds".to_string()]);
    assert_eq!(store.origin("ds"), DatasourceOrigin::Metadata);
}

#[tokio::test]
async fn test_committed_datasource_is_wizard_generated() {
    let store = Arc::new(DatasourceStore::open_in_memory().unwrap());
    let provider = StaticSchemaProvider::new()
        .with_schema("main", vec![Table::new("orders").with_field("id")]);
    let connection = ConnectionInfo::new("local", "static", "warehouse");

    let mut session = JoinSession::new(
        Arc::new(provider),
        connection.clone(),
        Arc::new(RecordingHost::new()),
        store.clone() as Arc<dyn ModelCommitSink>,
    );
    session.fetch_tables().await;
    session.add_tables(["orders"]);
    session.commit("orders_ds").unwrap();

    assert_eq!(store.origin("orders_ds"), DatasourceOrigin::WizardGenerated);

    let record = store.load("orders_ds").unwrap().unwrap();
    assert_eq!(record.context, connection_context(&connection));
    assert_eq!(record.properties.get(WIZARD_GENERATED_SCHEMA).map(String::as_str), Some("true"));
    assert_eq!(record.properties.get(MODELING_MODE).map(String::as_str), Some("flat"));
    assert_eq!(record.config.tables, vec!["orders".to_string()]);
}

#[test]
fn test_recommit_replaces_record() {
    let store = DatasourceStore::open_in_memory().unwrap();
    let mut config = PersistedJoinConfig::default();
    config.tables.push("a".into());
    store.save(&DatasourceRecord::new("ds", "ctx", config.clone())).unwrap();

    config.tables.push("b".into());
    store.save(&DatasourceRecord::new("ds", "ctx", config.clone())).unwrap();

    assert_eq!(store.names().unwrap().len(), 1);
    assert_eq!(store.load("ds").unwrap().unwrap().config, config);
}

#[test]
fn test_origin_display() {
    assert_eq!(DatasourceOrigin::WizardGenerated.to_string(), "wizard-generated");
    assert_eq!(
        DatasourceOrigin::Unreadable("bad row".into()).to_string(),
        "unreadable: bad row"
    );

    let json = serde_json::to_string(&DatasourceOrigin::Absent).unwrap();
    assert_eq!(json, r#"{"origin":"absent"}"#);
}
