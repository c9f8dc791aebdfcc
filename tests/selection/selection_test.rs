use multitable::catalog::TableCatalog;
use multitable::model::Table;
use multitable::selection::SelectionSet;

fn catalog() -> TableCatalog {
    TableCatalog::new(
        Some("sales".to_string()),
        vec![Table::new("a"), Table::new("b"), Table::new("c"), Table::new("a")],
    )
}

#[test]
fn test_catalog_keeps_first_of_duplicate_names() {
    let catalog = catalog();

    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog.position("c"), Some(2));
    assert_eq!(catalog.schema(), Some("sales"));
}

#[test]
fn test_add_twice_selects_once() {
    let catalog = catalog();
    let mut selection = SelectionSet::new();

    let a = catalog.get("a").unwrap();
    assert_eq!(selection.add([a]), 1);
    assert_eq!(selection.add([a]), 0);

    assert_eq!(selection.names(), vec!["a"]);
}

#[test]
fn test_add_preserves_order_and_skips_selected() {
    let catalog = catalog();
    let mut selection = SelectionSet::new();

    selection.add([catalog.get("b").unwrap()]);
    let added = selection.add(catalog.tables());

    assert_eq!(added, 2);
    assert_eq!(selection.names(), vec!["b", "a", "c"]);
}

#[test]
fn test_remove_returns_selected_only() {
    let catalog = catalog();
    let mut selection = SelectionSet::new();
    selection.add(catalog.tables());

    let removed = selection.remove(["b", "zzz"]);

    assert_eq!(removed, vec![Table::new("b")]);
    assert_eq!(selection.names(), vec!["a", "c"]);
    assert!(!selection.contains("b"));
}

#[test]
fn test_retain_reports_dropped() {
    let catalog = catalog();
    let mut selection = SelectionSet::new();
    selection.add(catalog.tables());

    let dropped = selection.retain(|t| t.name != "a");

    assert_eq!(dropped.len(), 1);
    assert_eq!(selection.len(), 2);
    assert_eq!(selection.position("c"), Some(1));
}
