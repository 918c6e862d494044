//! Property tests for value round trips and copy independence
//! of both containers.

use anyvar::{AnyBox, TypeKey, Variant};
use proptest::prelude::*;

type Shape = (i64, String, Vec<u8>);

#[derive(Clone, Debug)]
enum Value {
    Int(i64),
    Text(String),
    Bytes(Vec<u8>),
}

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        ".{0,16}".prop_map(Value::Text),
        proptest::collection::vec(any::<u8>(), 0..32).prop_map(Value::Bytes),
    ]
}

fn boxed(value: &Value) -> AnyBox {
    match value {
        Value::Int(v) => AnyBox::new(*v),
        Value::Text(v) => AnyBox::new(v.clone()),
        Value::Bytes(v) => AnyBox::new(v.clone()),
    }
}

fn variant(value: &Value) -> Variant<Shape> {
    match value {
        Value::Int(v) => Variant::new(*v),
        Value::Text(v) => Variant::new(v.clone()),
        Value::Bytes(v) => Variant::new(v.clone()),
    }
}

fn assert_box_holds(a: &AnyBox, value: &Value) {
    match value {
        Value::Int(v) => assert_eq!(a.get::<i64>(), Ok(v)),
        Value::Text(v) => assert_eq!(a.get::<String>(), Ok(v)),
        Value::Bytes(v) => assert_eq!(a.get::<Vec<u8>>(), Ok(v)),
    }
}

fn assert_variant_holds(x: &Variant<Shape>, value: &Value) {
    match value {
        Value::Int(v) => assert_eq!(x.get::<i64, _>(), Ok(v)),
        Value::Text(v) => assert_eq!(x.get::<String, _>(), Ok(v)),
        Value::Bytes(v) => assert_eq!(x.get::<Vec<u8>, _>(), Ok(v)),
    }
}

// Overwrites whatever the box holds with a value of another kind.
fn scramble_box(a: &mut AnyBox) {
    if a.is::<i64>() {
        a.emplace(String::from("scrambled"));
    } else {
        a.emplace(-1i64);
    }
}

fn scramble_variant(x: &mut Variant<Shape>) {
    if x.is::<i64, _>() {
        x.emplace(vec![0xffu8]);
    } else {
        x.emplace(-1i64);
    }
}

proptest! {
    #[test]
    fn box_round_trip(value in arb_value()) {
        let a = boxed(&value);
        assert_box_holds(&a, &value);
        prop_assert!(a.try_get::<u128>().is_none());
    }

    #[test]
    fn box_copy_is_independent(value in arb_value()) {
        let mut a = boxed(&value);
        let mut b = a.clone();

        scramble_box(&mut b);
        assert_box_holds(&a, &value);

        let c = a.clone();
        scramble_box(&mut a);
        assert_box_holds(&c, &value);
    }

    #[test]
    fn box_take_empties_source(value in arb_value()) {
        let mut a = boxed(&value);
        let key = a.type_key();
        let b = a.take();

        prop_assert!(!a.has_value());
        prop_assert_eq!(a.type_key(), TypeKey::NONE);
        prop_assert_eq!(b.type_key(), key);
        assert_box_holds(&b, &value);
    }

    #[test]
    fn variant_round_trip(value in arb_value()) {
        let x = variant(&value);
        assert_variant_holds(&x, &value);

        let mut y: Variant<Shape> = Variant::default();
        match &value {
            Value::Int(v) => { y.emplace(*v); }
            Value::Text(v) => { y.emplace(v.clone()); }
            Value::Bytes(v) => { y.emplace(v.clone()); }
        }
        assert_variant_holds(&y, &value);
        prop_assert_eq!(x.index(), y.index());
    }

    #[test]
    fn variant_copy_is_independent(value in arb_value()) {
        let mut x = variant(&value);
        let mut y = x.clone();

        scramble_variant(&mut y);
        assert_variant_holds(&x, &value);

        let z = x.clone();
        scramble_variant(&mut x);
        assert_variant_holds(&z, &value);
    }

    #[test]
    fn variant_take_invalidates_source(value in arb_value()) {
        let mut x = variant(&value);
        let key = x.type_key();
        let y = x.take();

        prop_assert!(!x.valid());
        prop_assert_eq!(x.type_key(), TypeKey::NONE);
        prop_assert_eq!(y.type_key(), key);
        assert_variant_holds(&y, &value);
    }
}
