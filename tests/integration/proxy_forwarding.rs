//! Integration tests for Proxy forwarding
//!
//! A proxy bound to a namespace key must behave like the value currently
//! stored there: arithmetic, comparison, containers, formatting, calls,
//! attribute access and class identity all reach the live target.

use ctxlocal::proxy::protocol::{Attributes, Documented, TypeObject};
use ctxlocal::{LocalError, Namespace, Proxy, Shared};
use serde_json::json;
use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::ops::Add;

#[test]
fn test_list_proxy() {
    let ns = Namespace::new();
    let proxy = ns.bind("foo");
    ns.set("foo", Vec::new());

    proxy.try_with_mut(|list| list.push(42)).unwrap();
    proxy.try_with_mut(|list| list.push(23)).unwrap();
    assert_eq!(proxy.get_slice(1..).unwrap(), vec![23]);
    assert_eq!(proxy.get_item(1).unwrap(), 23);
    assert_eq!(proxy.len().unwrap(), 2);
    assert!(proxy == vec![42, 23]);
    assert!(vec![42, 23] == proxy);

    proxy.set_item(0, 1).unwrap();
    proxy.try_with_mut(|list| list.clear()).unwrap();
    assert!(!proxy.truthy());
    assert_eq!(ns.get_value("foo").unwrap(), Vec::<i32>::new());
}

#[test]
fn test_math_operations() {
    let ns = Namespace::new();
    let proxy = ns.bind("n");
    ns.set("n", 2i32);

    assert_eq!(&proxy + 3, 5);
    assert_eq!(3i32 + &proxy, 5);
    assert_eq!(&proxy - 1, 1);
    assert_eq!(5i32 - &proxy, 3);
    assert_eq!(&proxy * 4, 8);
    assert_eq!(&proxy / 2, 1);
    assert_eq!(7i32 / &proxy, 3);
    assert_eq!(&proxy % 2, 0);
    assert_eq!(&proxy << 2, 8);
    assert_eq!(&proxy >> 1, 1);
    assert_eq!(&proxy & 3, 2);
    assert_eq!(&proxy | 1, 3);
    assert_eq!(&proxy ^ 3, 1);
    assert_eq!(-&proxy, -2);
    assert_eq!(!&proxy, !2i32);
    assert_eq!(proxy.abs().unwrap(), 2);
    assert_eq!(proxy.pos().unwrap(), 2);
}

#[test]
fn test_reflected_operators_take_proxy_by_value() {
    let ns = Namespace::new();
    let proxy = ns.bind("n");
    ns.set("n", 2i32);

    assert_eq!(3i32 + proxy.clone(), 5);
    assert_eq!(10i32 - proxy.clone(), 8);
    assert_eq!(6i32 * proxy.clone(), 12);
    assert_eq!(1i32 << proxy.clone(), 4);
    assert_eq!(2.5f64 * Proxy::constant(Shared::new(2.0f64)), 5.0);
    assert!(!(true & Proxy::constant(Shared::new(false))));
}

#[test]
fn test_in_place_operations_update_storage() {
    let ns = Namespace::new();
    let mut proxy = ns.bind("n");
    ns.set("n", 10i64);

    proxy += 5;
    assert_eq!(ns.get_value("n").unwrap(), 15);
    proxy -= 3;
    proxy *= 2;
    proxy /= 4;
    proxy %= 4;
    assert_eq!(ns.get_value("n").unwrap(), 2);
    proxy <<= 3;
    proxy |= 1;
    proxy &= 0b1001;
    proxy ^= 0b1000;
    proxy >>= 0;
    assert_eq!(ns.get_value("n").unwrap(), 9);
}

#[test]
fn test_in_place_fallback_for_plain_operator() {
    #[derive(Debug, Clone, PartialEq)]
    struct Meters(f64);

    impl Add<f64> for Meters {
        type Output = Meters;

        fn add(self, rhs: f64) -> Meters {
            Meters(self.0 + rhs)
        }
    }

    let ns = Namespace::new();
    let proxy = ns.bind("distance");
    ns.set("distance", Meters(1.5));
    assert_eq!(&proxy + 1.0, Meters(2.5));
    proxy.assign_with(|m| m.clone() + 2.0).unwrap();
    assert_eq!(ns.get_value("distance").unwrap(), Meters(3.5));
}

#[test]
fn test_string_operations() {
    let ns = Namespace::new();
    let proxy = ns.bind("s");
    ns.set("s", "foo".to_string());

    assert_eq!(&proxy + "bar", "foobar");
    assert_eq!("bar" + &proxy, "barfoo");
    assert_eq!(String::from("x") + &proxy, "xfoo");
    assert!(proxy == "foo");
    assert!(proxy == "foo".to_string());
    assert!("foo".to_string() == proxy);
    assert!(proxy < "goo".to_string());
    assert!(proxy.contains("oo").unwrap());
    assert!(proxy.contains(&'f').unwrap());
    assert_eq!(proxy.to_bytes().unwrap(), b"foo".to_vec());
    assert_eq!(format!("{proxy}"), "foo");
    assert_eq!(format!("{proxy:?}"), "\"foo\"");
    assert_eq!(format!("{proxy:>5}"), "  foo");
}

#[test]
fn test_comparisons_between_proxies() {
    let ns = Namespace::new();
    let a = ns.bind("a");
    let b = ns.bind("b");
    ns.set("a", 1);
    ns.set("b", 2);

    assert!(a < b);
    assert!(b > a);
    assert!(a != b);
    ns.set("b", 1);
    assert!(a == b);
    assert!(a.try_eq(&1).unwrap());
}

#[test]
fn test_hash_matches_target() {
    let ns = Namespace::new();
    let proxy = ns.bind("key");
    ns.set("key", "abc".to_string());

    let mut direct = DefaultHasher::new();
    "abc".to_string().hash(&mut direct);
    let mut through_proxy = DefaultHasher::new();
    proxy.hash(&mut through_proxy);
    assert_eq!(direct.finish(), through_proxy.finish());
}

#[test]
fn test_callable_target() {
    let ns: Namespace<fn(i32) -> i32> = Namespace::new();
    let proxy = ns.bind("f");
    ns.set("f", |x| x * 10);
    assert_eq!(proxy.try_with(|f| f(4)).unwrap(), 40);
    ns.set("f", |x| x + 1);
    assert_eq!(proxy.try_with(|f| f(4)).unwrap(), 5);
}

#[test]
fn test_numeric_conversions() {
    let ns = Namespace::new();
    let proxy = ns.bind("x");
    ns.set("x", -2.7f64);

    assert_eq!(proxy.to_int().unwrap(), -2);
    assert_eq!(proxy.trunc().unwrap(), -2);
    assert_eq!(proxy.floor().unwrap(), -3);
    assert_eq!(proxy.ceil().unwrap(), -2);
    assert_eq!(proxy.round(None).unwrap(), -3.0);
    assert_eq!(proxy.to_float().unwrap(), -2.7);

    let ints: Namespace<usize> = Namespace::new();
    let idx = ints.bind("i");
    ints.set("i", 3);
    assert_eq!(idx.index().unwrap(), 3);
}

#[test]
fn test_conversions_fail_instead_of_wrapping() {
    let ns = Namespace::new();
    let proxy = ns.bind("n");
    ns.set("n", u64::MAX);
    assert_eq!(
        proxy.to_int().unwrap_err(),
        LocalError::OutOfRange { op: ctxlocal::Op::Int }
    );
    assert!(proxy.index().is_err());

    ns.set("n", 42u64);
    assert_eq!(proxy.to_int().unwrap(), 42);
    assert_eq!(proxy.index().unwrap(), 42);
}

#[test]
fn test_slices_clamp_past_the_end() {
    let ns = Namespace::new();
    let proxy = ns.bind("xs");
    ns.set("xs", vec![1, 2, 3]);

    assert_eq!(proxy.get_slice(1..10).unwrap(), vec![2, 3]);
    assert!(proxy.get_slice(7..9).unwrap().is_empty());
    proxy.set_slice(5.., vec![4]).unwrap();
    assert_eq!(ns.get_value("xs").unwrap(), vec![1, 2, 3, 4]);
}

#[test]
fn test_mapping_target() {
    let ns = Namespace::new();
    let proxy = ns.bind("map");
    let mut map = HashMap::new();
    map.insert("a".to_string(), 1);
    map.insert("b".to_string(), 2);
    ns.set("map", map);

    assert_eq!(proxy.len().unwrap(), 2);
    assert!(proxy.contains(&"a".to_string()).unwrap());
    assert_eq!(proxy.get_item("b").unwrap(), 2);
    assert_eq!(proxy.del_item("a".to_string()).unwrap(), Some(1));
    assert_eq!(proxy.get_attr("b").unwrap(), 2);
    proxy.set_attr("c", 3).unwrap();
    assert_eq!(proxy.dir(), vec!["b".to_string(), "c".to_string()]);
}

#[test]
fn test_json_attributes() {
    let ns = Namespace::new();
    let proxy = ns.bind("obj");
    ns.set("obj", json!({"name": "ctx"}));

    assert_eq!(proxy.get_attr("name").unwrap(), json!("ctx"));
    proxy.set_attr("id", json!(7)).unwrap();
    assert_eq!(ns.get_value("obj").unwrap()["id"], json!(7));
    proxy.del_attr("id").unwrap();
    assert!(matches!(
        proxy.del_attr("id"),
        Err(LocalError::NoAttribute(name)) if name == "id"
    ));
}

struct Request {
    path: String,
}

impl Documented for Request {
    fn doc(&self) -> Option<String> {
        Some(format!("Request for {}", self.path))
    }
}

#[test]
fn test_doc_follows_binding() {
    let ns = Namespace::new();
    let proxy = ns.bind("request");
    assert!(proxy.doc().unwrap().starts_with("A proxy"));
    ns.set(
        "request",
        Request {
            path: "/index".to_string(),
        },
    );
    assert_eq!(proxy.doc().unwrap(), "Request for /index");
}

struct Widget;
struct Gadget;

/// Type object describing `Widget`
struct WidgetClass;

impl TypeObject for WidgetClass {
    fn type_name(&self) -> &str {
        "Widget"
    }

    fn bases(&self) -> Vec<String> {
        vec!["Component".to_string()]
    }

    fn instance_check(&self, value: &dyn Any) -> bool {
        value.is::<Widget>()
    }

    fn subclass_check(&self, name: &str) -> bool {
        name == "Widget" || name == "FancyWidget"
    }
}

#[test]
fn test_class_identity() {
    let ns = Namespace::new();
    let proxy = ns.bind("n");
    ns.set("n", 1u8);
    assert!(proxy.is::<u8>());
    assert_eq!(proxy.type_name(), "u8");

    let classes = Namespace::new();
    let class = classes.bind("cls");
    classes.set("cls", WidgetClass);
    assert!(class.instance_check(&Widget).unwrap());
    assert!(!class.instance_check(&Gadget).unwrap());
    assert!(class.subclass_check("FancyWidget").unwrap());
    assert_eq!(class.mro().unwrap(), vec!["Widget", "Component"]);
    assert_eq!(class.bases().unwrap(), vec!["Component"]);
    assert!(class.subclasses().unwrap().is_empty());
}

#[test]
fn test_wrapped_is_the_stored_cell() {
    let ns = Namespace::new();
    let proxy = ns.bind("obj");
    let cell = ns.set("obj", vec![1, 2]);
    assert!(Shared::ptr_eq(&proxy.wrapped().unwrap(), &cell));
    assert!(Shared::ptr_eq(&proxy.target().unwrap(), &cell));
}

#[test]
fn test_copy_and_deep_copy() {
    let ns = Namespace::new();
    let proxy = ns.bind("nested");
    let inner = Shared::new(vec![1]);
    ns.set("nested", vec![inner.clone()]);

    let shallow = proxy.copy().unwrap();
    let deep = proxy.deep_copy().unwrap();
    inner.write().push(2);

    assert_eq!(*shallow[0].read(), vec![1, 2]);
    assert_eq!(*deep[0].read(), vec![1]);
}

#[test]
fn test_custom_resolver() {
    let cell = Shared::new(5u32);
    let source = cell.clone();
    let proxy = Proxy::new(move || Some(source.clone()));
    assert!(proxy == 5u32);
    *cell.write() = 6;
    assert!(proxy == 6u32);
}

#[test]
fn test_items_and_reverse_iteration() {
    let ns = Namespace::new();
    let proxy = ns.bind("xs");
    ns.set("xs", vec!["a", "b", "c"]);
    assert_eq!(proxy.items().unwrap(), vec!["a", "b", "c"]);
    assert_eq!(proxy.items_rev().unwrap(), vec!["c", "b", "a"]);
    let guard = proxy.read().unwrap();
    assert_eq!(guard.iter().count(), 3);
}

#[test]
fn test_operations_reach_rebound_value() {
    let ns = Namespace::new();
    let proxy = ns.bind("v");
    ns.set("v", 1);
    assert_eq!(&proxy + 1, 2);
    ns.set("v", 10);
    assert_eq!(&proxy + 1, 11);
    ns.delete("v").unwrap();
    assert!(proxy.try_with(|v| *v).is_err());
}

#[test]
fn test_attribute_trait_is_object_independent() {
    let mut map: HashMap<String, i32> = HashMap::new();
    map.set_attr("x", 1).unwrap();
    assert_eq!(map.get_attr("x").unwrap(), 1);
}
