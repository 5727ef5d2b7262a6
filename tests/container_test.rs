//! 依赖容器集成测试

use parking_lot::Mutex;
use simpledi::errors::DiError;
use simpledi::infrastructure::container::metadata;
use simpledi::infrastructure::{Component, Dependency, DependencyContext, DependencyFactory, Injectable, TypeDescriptorBuilder};
use simpledi::runtime::{Prefab, Scene};
use simpledi::sample::{Enemy, LoggerService, Player, RecordingLogger};
use std::sync::{Arc, Barrier};
use std::time::Duration;

fn recording_logger() -> (Arc<RecordingLogger>, Arc<dyn LoggerService>) {
    let recorder = Arc::new(RecordingLogger::new());
    let logger: Arc<dyn LoggerService> = recorder.clone();
    (recorder, logger)
}

/// 注入方法带计数器
#[derive(Default)]
struct Counter {
    calls: usize,
}

impl Injectable for Counter {
    fn describe(d: &mut TypeDescriptorBuilder<Self>) {
        d.constructor(|(): ()| Counter::default())
            .method(Dependency, "construct", |c, (_logger,): (Arc<dyn LoggerService>,)| {
                c.calls += 1;
            });
    }
}

#[test]
fn test_injection_is_idempotent() {
    let (_, logger) = recording_logger();
    let root = DependencyContext::new_root();
    root.register(logger);
    let child = root.create_child();

    let counter = Component::new(Counter::default());
    for _ in 0..3 {
        root.inject_into(&counter, true).unwrap();
        child.inject_into(&counter, true).unwrap();
    }

    assert_eq!(counter.read().calls, 1);
}

#[test]
fn test_scope_fallback_and_isolation() {
    let root = DependencyContext::new_root();
    let global = Arc::new("global".to_string());
    root.register(Arc::clone(&global));

    let child = root.create_child();
    let session_value = Arc::new(7u32);
    child.register(Arc::clone(&session_value));

    assert!(Arc::ptr_eq(&child.resolve::<Arc<String>>().unwrap(), &global));
    assert!(Arc::ptr_eq(&child.resolve::<Arc<u32>>().unwrap(), &session_value));

    let err = root.resolve::<Arc<u32>>().unwrap_err();
    assert!(matches!(err, DiError::UnregisteredType { .. }));
}

#[test]
fn test_sibling_registries_are_isolated() {
    let root = DependencyContext::new_root();
    let first = root.create_child();
    let second = root.create_child();

    first.register(Arc::new(1u16));
    second.register(Arc::new(2u16));

    assert_eq!(*first.resolve::<Arc<u16>>().unwrap(), 1);
    assert_eq!(*second.resolve::<Arc<u16>>().unwrap(), 2);
    assert!(!root.is_registered::<Arc<u16>>());
    assert_ne!(first.id(), second.id());
    assert_eq!(first.name(), "DependencyContext_Child");
    assert_eq!(root.name(), "DependencyContext");
}

/// 构造函数选择
struct Marked {
    chosen: &'static str,
}

impl Injectable for Marked {
    fn describe(d: &mut TypeDescriptorBuilder<Self>) {
        d.constructor(|(_a, _b): (Arc<u8>, Arc<u16>)| Marked { chosen: "widest" })
            .marked_constructor(Dependency, |(_a,): (Arc<u8>,)| Marked { chosen: "marked" });
    }
}

struct Unmarked {
    chosen: &'static str,
}

impl Injectable for Unmarked {
    fn describe(d: &mut TypeDescriptorBuilder<Self>) {
        d.constructor(|(): ()| Unmarked { chosen: "empty" })
            .constructor(|(_a, _b): (Arc<u8>, Arc<u16>)| Unmarked { chosen: "first pair" })
            .constructor(|(_b, _a): (Arc<u16>, Arc<u8>)| Unmarked { chosen: "second pair" });
    }
}

#[test]
fn test_constructor_selection() {
    let root = DependencyContext::new_root();
    root.register(Arc::new(1u8));
    root.register(Arc::new(2u16));

    assert_eq!(root.create_with_dependencies::<Marked>().unwrap().read().chosen, "marked");
    assert_eq!(
        root.create_with_dependencies::<Unmarked>().unwrap().read().chosen,
        "first pair"
    );

    let selected = metadata::constructor::<Unmarked>().unwrap();
    assert_eq!(selected.index(), 1);
    assert_eq!(selected.arity(), 2);
}

#[test]
fn test_missing_constructor() {
    struct NoCtor;
    impl Injectable for NoCtor {
        fn describe(_: &mut TypeDescriptorBuilder<Self>) {}
    }

    let root = DependencyContext::new_root();
    let err = root.create_with_dependencies::<NoCtor>().unwrap_err();
    assert!(matches!(err, DiError::NoConstructor { .. }));
}

/// 基类型成员先于派生类型成员注入
#[derive(Default)]
struct Base {
    order: Vec<&'static str>,
}

impl Injectable for Base {
    fn describe(d: &mut TypeDescriptorBuilder<Self>) {
        d.field(Dependency, "base_field", |b, _: Arc<u8>| b.order.push("base field"))
            .property(Dependency, "base_property", |b, _: Arc<u8>| b.order.push("base property"))
            .method(Dependency, "base_method", |b, (): ()| b.order.push("base method"));
    }
}

#[derive(Default)]
struct Derived {
    base: Base,
}

impl Injectable for Derived {
    fn describe(d: &mut TypeDescriptorBuilder<Self>) {
        d.extends::<Base>(|d| &mut d.base)
            .constructor(|(): ()| Derived::default())
            .field(Dependency, "derived_field", |d, _: Arc<u8>| d.base.order.push("derived field"))
            .property(Dependency, "derived_property", |d, _: Arc<u8>| {
                d.base.order.push("derived property")
            })
            .read_only_property(Dependency, "derived_read_only")
            .method(Dependency, "derived_method", |d, (): ()| d.base.order.push("derived method"));
    }
}

#[test]
fn test_base_members_are_injected_first() {
    let root = DependencyContext::new_root();
    root.register(Arc::new(0u8));

    let derived = root.create_with_dependencies::<Derived>().unwrap();
    assert_eq!(
        derived.read().base.order,
        vec![
            "base field",
            "derived field",
            "base property",
            "derived property",
            "base method",
            "derived method",
        ]
    );

    let members = metadata::injectable_members::<Derived>().unwrap();
    assert_eq!(members.len(), 6);
    assert_eq!(members.fields[0].declared_by(), std::any::type_name::<Base>());
    assert_eq!(metadata::read_only_properties::<Derived>(), vec!["derived_read_only"]);
}

#[test]
fn test_logger_reaches_constructor() {
    let (recorder, logger) = recording_logger();
    let root = DependencyContext::new_root();
    root.register(Arc::clone(&logger));

    let enemy = root.create_with_dependencies::<Enemy>().unwrap();
    assert!(Arc::ptr_eq(enemy.read().logger(), &logger));
    assert_eq!(recorder.messages(), vec!["Enemy created!"]);
}

/// 依赖"当前玩家"的组件
#[derive(Default)]
struct Follower {
    target: Option<Component<Player>>,
}

impl Injectable for Follower {
    fn describe(d: &mut TypeDescriptorBuilder<Self>) {
        d.field(Dependency, "target", |f, p: Component<Player>| f.target = Some(p));
    }
}

#[test]
fn test_child_scope_supplies_current_subject() {
    let (_, logger) = recording_logger();
    let root = DependencyContext::new_root();
    root.register(logger);
    let factory = DependencyFactory::new(Arc::clone(&root), Arc::new(Scene::new("GameScene")));

    let child = root.create_child();
    let player = Component::new(Player::default());
    child.register(player.clone());
    factory.set_active_child(Some(Arc::clone(&child)));

    let prefab = Prefab::new("Follower", |_| Follower::default());
    let follower = factory.instantiate(&prefab, None).unwrap();

    assert!(follower.read().target.as_ref().unwrap().ptr_eq(&player));
    assert!(player.read().logger().is_some());
    assert!(root.resolve::<Component<Player>>().unwrap_err().is_unregistered());
}

/// 依赖在第一次调用时缺失，之后补上注册
#[derive(Default)]
struct Late {
    value: Option<Arc<i64>>,
}

impl Injectable for Late {
    fn describe(d: &mut TypeDescriptorBuilder<Self>) {
        d.field(Dependency, "value", |l, v: Arc<i64>| l.value = Some(v));
    }
}

#[test]
fn test_failed_injection_is_retryable() {
    let root = DependencyContext::new_root();
    let scene = Scene::new("Boot");
    let prefab = Prefab::new("Late", |_| Late::default());

    let err = root
        .instantiate_with_dependencies(&scene, &prefab, None, true)
        .unwrap_err();
    assert!(err.is_unregistered());

    root.register(Arc::new(5i64));
    let late = scene.roots()[0].get_component::<Late>().unwrap();
    root.inject_into(&late, true).unwrap();
    assert_eq!(**late.read().value.as_ref().unwrap(), 5);
}

#[test]
fn test_hierarchy_injection_includes_inactive_children() {
    let (recorder, logger) = recording_logger();
    let root = DependencyContext::new_root();
    root.register(logger);
    let scene = Scene::new("Boot");

    let prefab = Prefab::new("Squad", |entity| {
        let hidden = entity.spawn_child("Hidden");
        hidden.set_active(false);
        hidden.add_component(Counter::default());
        Counter::default()
    });

    let leader = root.instantiate_with_dependencies(&scene, &prefab, None, true).unwrap();
    let hidden = leader.entity().unwrap().children()[0].clone();
    assert_eq!(hidden.get_component::<Counter>().unwrap().read().calls, 1);
    assert_eq!(leader.read().calls, 1);

    let solo = root.instantiate_with_dependencies(&scene, &prefab, None, false).unwrap();
    let solo_hidden = solo.entity().unwrap().children()[0].clone();
    assert_eq!(solo_hidden.get_component::<Counter>().unwrap().read().calls, 0);
    assert!(recorder.messages().is_empty());
}

#[test]
fn test_duplicate_marker_is_reported_on_injection() {
    struct Doubled;
    impl Injectable for Doubled {
        fn describe(d: &mut TypeDescriptorBuilder<Self>) {
            d.field(Dependency, "slot", |_, _: Arc<u8>| {})
                .property(Dependency, "slot", |_, _: Arc<u8>| {});
        }
    }

    let root = DependencyContext::new_root();
    let err = root.inject_into(&Component::new(Doubled), false).unwrap_err();
    assert!(matches!(err, DiError::DuplicateMarker { member: "slot", .. }));
}

#[test]
fn test_child_injection_is_not_repeated_by_owning_root() {
    let (_, logger) = recording_logger();
    let root = DependencyContext::new_root();
    root.register(logger);
    let counter = Component::new(Counter::default());
    root.register(counter.clone());

    let child = root.create_child();
    child.inject_into(&counter, false).unwrap();
    let resolved = root.resolve::<Component<Counter>>().unwrap();

    assert!(resolved.ptr_eq(&counter));
    assert_eq!(counter.read().calls, 1);
    assert!(root.is_injected(counter.id()));
}

#[test]
fn test_child_construction_is_not_repeated_by_root() {
    let (_, logger) = recording_logger();
    let root = DependencyContext::new_root();
    root.register(logger);
    let child = root.create_child();

    let counter = child.create_with_dependencies::<Counter>().unwrap();
    root.inject_into(&counter, true).unwrap();

    assert_eq!(counter.read().calls, 1);
}

/// 注入过程较慢的组件，用于观察并发解析
#[derive(Default)]
struct Slow {
    logger: Option<Arc<dyn LoggerService>>,
    calls: usize,
}

impl Injectable for Slow {
    fn describe(d: &mut TypeDescriptorBuilder<Self>) {
        d.method(Dependency, "construct", |s, (logger,): (Arc<dyn LoggerService>,)| {
            std::thread::sleep(Duration::from_millis(30));
            s.logger = Some(logger);
            s.calls += 1;
        });
    }
}

#[test]
fn test_concurrent_resolution_waits_for_injection() {
    let (_, logger) = recording_logger();
    let root = DependencyContext::new_root();
    root.register(logger);
    let slow = Component::new(Slow::default());
    root.register(slow.clone());
    let child = root.create_child();

    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            // 一半线程经子上下文解析
            let ctx = if i % 2 == 0 { Arc::clone(&root) } else { Arc::clone(&child) };
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                let resolved = ctx.resolve::<Component<Slow>>().unwrap();
                let ready = resolved.read().logger.is_some();
                ready
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
    assert_eq!(slow.read().calls, 1);
}

#[test]
fn test_concurrent_resolution_injects_once() {
    let root = DependencyContext::new_root();
    let (_, logger) = recording_logger();
    root.register(logger);
    let counter = Component::new(Counter::default());
    root.register(counter.clone());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let root = Arc::clone(&root);
            let seen = Arc::clone(&seen);
            std::thread::spawn(move || {
                let resolved = root.resolve::<Component<Counter>>().unwrap();
                seen.lock().push(resolved.id());
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(counter.read().calls, 1);
    assert!(seen.lock().iter().all(|id| *id == counter.id()));
}
