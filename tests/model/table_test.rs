use multitable::model::{Field, JoinEndpoint, JoinRelationship, Table};

#[test]
fn test_table_deserializes_with_defaults() {
    let table: Table = serde_json::from_str(r#"{"name": "orders"}"#).unwrap();

    assert_eq!(table.name, "orders");
    assert!(table.schema.is_none());
    assert!(table.fields.is_empty());
}

#[test]
fn test_table_field_lookup() {
    let table = Table::new("orders")
        .with_schema("sales")
        .with_field("id")
        .with_fields(["customer_id", "store_id"]);

    assert_eq!(table.qualified_name(), "sales.orders");
    assert_eq!(table.fields.len(), 3);
    assert!(table.has_field("customer_id"));
    assert!(!table.has_field("region"));
    assert_eq!(table.field("id"), Some(&Field::new("id")));
}

#[test]
fn test_relationship_edge_is_unordered() {
    let forward = JoinRelationship::between("orders", "customer_id", "customers", "id");
    let backward = JoinRelationship::new(
        JoinEndpoint::new("customers", "id"),
        JoinEndpoint::new("orders", "customer_id"),
    );

    assert!(forward.same_edge(&backward));
    assert_ne!(forward, backward);
    assert!(forward.touches("customers"));
    assert!(!forward.touches("stores"));
    assert_eq!(forward.to_string(), "orders.customer_id = customers.id");
}

#[test]
fn test_relationship_different_fields_are_different_edges() {
    let a = JoinRelationship::between("orders", "customer_id", "customers", "id");
    let b = JoinRelationship::between("orders", "billing_id", "customers", "id");

    assert!(!a.same_edge(&b));
}
