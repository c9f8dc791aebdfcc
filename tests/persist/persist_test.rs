use multitable::catalog::TableCatalog;
use multitable::model::{JoinRelationship, Table};
use multitable::persist::{PersistError, PersistedJoinConfig};

const SAVED: &str = r#"{
    "schema": "sales",
    "tables": ["orders", "customers", "returns"],
    "relationships": [
        {"left": {"table": "orders", "field": "customer_id"}, "right": {"table": "customers", "field": "id"}},
        {"left": {"table": "returns", "field": "order_id"}, "right": {"table": "orders", "field": "id"}}
    ],
    "fact_table": "orders"
}"#;

fn catalog() -> TableCatalog {
    TableCatalog::new(
        Some("sales".to_string()),
        vec![
            Table::new("customers").with_fields(["id"]),
            Table::new("orders").with_fields(["id", "customer_id"]),
        ],
    )
}

#[test]
fn test_parse_saved_configuration() {
    let config = PersistedJoinConfig::from_json(SAVED).unwrap();

    assert_eq!(config.schema.as_deref(), Some("sales"));
    assert_eq!(config.tables.len(), 3);
    assert_eq!(
        config.relationships[0],
        JoinRelationship::between("orders", "customer_id", "customers", "id")
    );
    assert_eq!(config.fact_table.as_deref(), Some("orders"));
}

#[test]
fn test_resolve_keeps_saved_order_and_drops_missing() {
    let config = PersistedJoinConfig::from_json(SAVED).unwrap();
    let resolved = config.resolve(&catalog());

    let names: Vec<&str> = resolved.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["orders", "customers"]);
    assert_eq!(resolved.dropped_tables, vec!["returns".to_string()]);
    assert_eq!(resolved.relationships.len(), 1);
    assert_eq!(resolved.dropped_relationships[0].left.table, "returns");
    assert_eq!(resolved.fact_table.as_deref(), Some("orders"));
}

#[test]
fn test_resolved_tables_carry_catalog_definitions() {
    let config = PersistedJoinConfig::from_json(SAVED).unwrap();
    let resolved = config.resolve(&catalog());

    assert!(resolved.tables[0].has_field("customer_id"));
}

#[test]
fn test_minimal_document() {
    let config = PersistedJoinConfig::from_json(r#"{"tables": ["orders"]}"#).unwrap();

    assert!(config.schema.is_none());
    assert!(config.relationships.is_empty());
    assert!(config.applies_to(Some("anything")));
}

#[test]
fn test_malformed_document() {
    let err = PersistedJoinConfig::from_json(r#"{"tables": "orders"}"#).unwrap_err();
    assert!(matches!(err, PersistError::Json(_)));

    let err = PersistedJoinConfig::load("/nonexistent/joins.json").unwrap_err();
    assert!(matches!(err, PersistError::Io(_)));
}

#[test]
fn test_pretty_output_snapshot() {
    let config = PersistedJoinConfig {
        schema: Some("sales".into()),
        tables: vec!["orders".into(), "customers".into()],
        relationships: vec![JoinRelationship::between("orders", "customer_id", "customers", "id")],
        fact_table: Some("orders".into()),
    };

    insta::assert_snapshot!(config.to_json().unwrap(), @r#"
    {
      "schema": "sales",
      "tables": [
        "orders",
        "customers"
      ],
      "relationships": [
        {
          "left": {
            "table": "orders",
            "field": "customer_id"
          },
          "right": {
            "table": "customers",
            "field": "id"
          }
        }
      ],
      "fact_table": "orders"
    }
    "#);
}
