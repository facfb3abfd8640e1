//! Decoration tests
//!
//! Tests cover:
//! - Merge-style and mutation-style decorators
//! - Isolation from sibling instances and the class table
//! - Base views that see earlier decorations
//! - Bound base views

use fiber_engine::{
    decorate, Class, Descriptor, EngineError, Instance, MemberTable, Value,
};

fn account() -> Class {
    Class::root()
        .extend_named(
            "Account",
            MemberTable::new()
                .method("init", |this, args| {
                    this.set("balance", args.first().cloned().unwrap_or(Value::Int(0)))?;
                    Ok(Value::Undefined)
                })
                .method("deposit", |this, args| {
                    let amount = args.first().and_then(Value::as_int).unwrap_or(0);
                    let balance = this.get("balance").as_int().unwrap_or(0) + amount;
                    this.set("balance", balance)?;
                    Ok(Value::Int(balance))
                }),
        )
        .unwrap()
}

fn with_fee(fee: i64) -> Descriptor {
    Descriptor::new(move |_, base| {
        let deposit = base.function("deposit")?;
        Ok(MemberTable::new()
            .method("deposit", move |this, args| {
                let amount = args.first().and_then(Value::as_int).unwrap_or(0);
                deposit.call(&Value::Instance(this.clone()), &[Value::Int(amount - fee)])
            })
            .into())
    })
}

// ===== Isolation =====

#[test]
fn test_decoration_does_not_touch_siblings() {
    let class = account();
    let a = class.construct(&[Value::Int(100)]).unwrap();
    let b = class.construct(&[Value::Int(100)]).unwrap();

    a.decorate(with_fee(1)).unwrap();

    assert_eq!(a.call("deposit", &[Value::Int(10)]), Ok(Value::Int(109)));
    assert_eq!(b.call("deposit", &[Value::Int(10)]), Ok(Value::Int(110)));
}

#[test]
fn test_decoration_does_not_touch_class_table() {
    let class = account();
    let before = class.table();
    let a = class.construct(&[]).unwrap();
    a.decorate(
        MemberTable::new().method("close", |this, _| {
            this.set("closed", true)?;
            Ok(Value::Undefined)
        }),
    )
    .unwrap();

    assert!(a.has("close"));
    assert_eq!(*class.table(), *before);

    let later = class.construct(&[]).unwrap();
    assert!(!later.has("close"));
    assert_eq!(later.call("deposit", &[Value::Int(5)]), Ok(Value::Int(5)));
}

// ===== Calling Conventions =====

#[test]
fn test_mutation_style_decorator() {
    let a = account().construct(&[]).unwrap();
    decorate(
        &Value::Instance(a.clone()),
        &[Descriptor::new(|this, base| {
            let this: &Instance = this
                .as_instance()
                .ok_or_else(|| EngineError::runtime("decorator needs an instance"))?;
            let deposit = base.function("deposit")?;
            this.set(
                "deposit_twice",
                fiber_engine::Function::method(move |this, args| {
                    let receiver = Value::Instance(this.clone());
                    deposit.call(&receiver, args)?;
                    deposit.call(&receiver, args)
                }),
            )?;
            Ok(Value::Undefined)
        })],
    )
    .unwrap();

    assert_eq!(a.call("deposit_twice", &[Value::Int(3)]), Ok(Value::Int(6)));
}

#[test]
fn test_several_decorators_stack() {
    let a = account().construct(&[]).unwrap();
    Class::decorate(&Value::Instance(a.clone()), &[with_fee(1), with_fee(2)]).unwrap();

    // Second fee wraps the first: 10 - 2 - 1
    assert_eq!(a.call("deposit", &[Value::Int(10)]), Ok(Value::Int(7)));
}

#[test]
fn test_decorator_base_sees_fields() {
    let a = account().construct(&[Value::Int(42)]).unwrap();
    a.decorate(Descriptor::new(|_, base| {
        let opening = base.get("balance")?;
        Ok(MemberTable::new().with("opening_balance", opening).into())
    }))
    .unwrap();

    assert_eq!(a.get("opening_balance"), Value::Int(42));
}

// ===== Bound Base =====

#[test]
fn test_bound_base_forwards_to_receiver() {
    let class = account();
    let a = class.construct(&[Value::Int(1)]).unwrap();
    let base = class.base().unwrap().clone();
    let bound = base.bind(&a);

    assert_eq!(bound.receiver().id(), a.id());
    // Root only defines init; account's deposit is not in its base view
    assert!(matches!(
        bound.call("deposit", &[]),
        Err(EngineError::MissingBaseMember { .. })
    ));
    assert_eq!(bound.call("init", &[]), Ok(Value::Undefined));
    assert_eq!(a.get("balance"), Value::Int(1));
}

// ===== Failures =====

#[test]
fn test_decorate_non_object() {
    for target in [Value::Undefined, Value::Null, Value::Int(3), Value::from("s")] {
        let err = decorate(&target, &[with_fee(1)]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTarget { .. }));
    }
}
