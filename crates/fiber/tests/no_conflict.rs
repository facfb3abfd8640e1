//! No-conflict export tests

use fiber::global::{bind, lookup, unbind};
use fiber::{Class, Export, MemberTable, Value, DEFAULT_BINDING};

#[test]
fn test_no_conflict_restores_previous_binding() {
    bind("no_conflict_prev", Value::from("legacy"));

    let root = Class::root();
    let export = Export::install("no_conflict_prev", root.clone());
    assert_eq!(lookup("no_conflict_prev"), Some(Value::Class(root.clone())));
    assert_eq!(export.previous(), Some(&Value::from("legacy")));

    let restored = export.no_conflict();
    assert_eq!(restored, root);
    assert_eq!(lookup("no_conflict_prev"), Some(Value::from("legacy")));
    unbind("no_conflict_prev");
}

#[test]
fn test_returned_root_still_composes() {
    let export = Export::install("no_conflict_compose", Class::root());
    let root = export.no_conflict();

    let class = root
        .extend(MemberTable::new().method("ping", |_, _| Ok(Value::from("pong"))))
        .unwrap();
    let instance = class.construct(&[]).unwrap();
    assert_eq!(instance.call("ping", &[]), Ok(Value::from("pong")));
}

#[test]
fn test_default_export_uses_shared_root() {
    let export = Export::install_default();
    assert_eq!(export.name(), DEFAULT_BINDING);
    assert_eq!(export.root(), &fiber::root());
    assert_eq!(lookup(DEFAULT_BINDING), Some(Value::Class(fiber::root())));
    export.no_conflict();
    assert_eq!(lookup(DEFAULT_BINDING), None);
}
