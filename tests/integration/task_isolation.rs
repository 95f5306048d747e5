//! Integration tests for async task contexts
//!
//! Tasks spawned through `context::spawn` get their own context seeded with a
//! snapshot of the spawner's entries. Tests use the multi-threaded runtime so
//! tasks migrate between worker threads while suspended.

use ctxlocal::context::{self, current};
use ctxlocal::{Namespace, Snapshot, Stack};
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tasks_are_isolated() {
    let ns: Namespace<usize> = Namespace::new();

    let handles: Vec<_> = (0..20)
        .map(|idx| {
            let ns = ns.clone();
            context::spawn(async move {
                ns.set("value", idx);
                tokio::time::sleep(Duration::from_millis(5)).await;
                tokio::task::yield_now().await;
                ns.get_value("value").unwrap()
            })
        })
        .collect();

    for (idx, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap(), idx);
    }
    assert_eq!(ns.slot().context_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_context_survives_thread_migration() {
    let ns: Namespace<u64> = Namespace::new();

    let handle = {
        let ns = ns.clone();
        context::spawn(async move {
            let id = current();
            ns.set("id", id.as_u64());
            for _ in 0..10 {
                tokio::time::sleep(Duration::from_millis(1)).await;
                assert_eq!(current(), id);
            }
            ns.get_value("id").unwrap() == id.as_u64()
        })
    };

    assert!(handle.await.unwrap());
}

#[tokio::test]
async fn test_child_inherits_snapshot_of_parent() {
    let ns = Namespace::new();

    Snapshot::empty()
        .scope(async {
            ns.set("request", "parent".to_string());

            let child = {
                let ns = ns.clone();
                context::spawn(async move {
                    let inherited = ns.get_value("request").unwrap();
                    ns.set("request", "child".to_string());
                    (inherited, ns.get_value("request").unwrap())
                })
            };

            let (inherited, rebound) = child.await.unwrap();
            assert_eq!(inherited, "parent");
            assert_eq!(rebound, "child");
            assert_eq!(ns.get_value("request").unwrap(), "parent");
        })
        .await;
}

#[tokio::test]
async fn test_parent_writes_after_spawn_are_invisible() {
    let ns = Namespace::new();

    Snapshot::empty()
        .scope(async {
            ns.set("n", 1);
            let (tx, rx) = tokio::sync::oneshot::channel::<()>();
            let child = {
                let ns = ns.clone();
                context::spawn(async move {
                    rx.await.unwrap();
                    ns.get_value("n").unwrap()
                })
            };
            ns.set("n", 2);
            tx.send(()).unwrap();
            assert_eq!(child.await.unwrap(), 1);
        })
        .await;
}

#[tokio::test]
async fn test_inherited_cells_are_shared() {
    let ns = Namespace::new();

    Snapshot::empty()
        .scope(async {
            let cell = ns.set("list", vec![1]);
            let ns_child = ns.clone();
            context::spawn(async move {
                ns_child.get("list").unwrap().write().push(2);
            })
            .await
            .unwrap();
            assert_eq!(*cell.read(), vec![1, 2]);
        })
        .await;
}

#[tokio::test]
async fn test_child_stack_is_independent() {
    let stack = Stack::new();

    Snapshot::empty()
        .scope(async {
            stack.push("base");
            let child = {
                let stack = stack.clone();
                context::spawn(async move {
                    let top = stack.top_value();
                    stack.push("child");
                    stack.pop();
                    stack.pop();
                    (top, stack.is_empty())
                })
            };
            assert_eq!(child.await.unwrap(), (Some("base"), true));
            assert_eq!(stack.top_value(), Some("base"));
            assert_eq!(stack.len(), 1);
        })
        .await;
}

#[tokio::test]
async fn test_siblings_never_see_each_other() {
    let ns: Namespace<&'static str> = Namespace::new();

    let first = {
        let ns = ns.clone();
        context::spawn(async move {
            ns.set("who", "first");
            tokio::task::yield_now().await;
            ns.get_value("who").unwrap()
        })
    };
    let second = {
        let ns = ns.clone();
        context::spawn(async move {
            tokio::task::yield_now().await;
            ns.contains("who")
        })
    };

    assert_eq!(first.await.unwrap(), "first");
    assert!(!second.await.unwrap());
}

#[tokio::test]
async fn test_scope_reclaims_entries_on_completion() {
    let ns: Namespace<u8> = Namespace::new();
    let snapshot = Snapshot::empty();
    let child = snapshot.id();

    snapshot
        .scope(async {
            ns.set("k", 1);
            assert_eq!(current(), child);
            assert!(context::in_scope());
        })
        .await;

    assert_eq!(ns.slot().context_count(), 0);
    assert!(!context::in_scope());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 3)]
async fn test_children_each_extend_parent_stack() {
    let stack = Stack::new();

    Snapshot::empty()
        .scope(async {
            stack.push(0);
            let children: Vec<_> = (1..=3)
                .map(|idx| {
                    let stack = stack.clone();
                    context::spawn(async move {
                        stack.push(idx);
                        tokio::task::yield_now().await;
                        (stack.len(), stack.top_value())
                    })
                })
                .collect();

            for (idx, child) in (1..=3).zip(children) {
                assert_eq!(child.await.unwrap(), (2, Some(idx)));
            }
            assert_eq!(stack.len(), 1);
        })
        .await;
}
