//! 实体层级
//!
//! 实体持有子实体和挂载的行为，以及激活、持久、销毁三个标记。

use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use crate::infrastructure::container::{Component, Injectable, InjectionTarget};

struct AttachedBehaviour {
    handle: Box<dyn Any + Send + Sync>,
    target: Arc<dyn InjectionTarget>,
}

struct EntityInner {
    name: String,
    active: AtomicBool,
    persistent: AtomicBool,
    destroyed: AtomicBool,
    parent: RwLock<Option<Weak<EntityInner>>>,
    children: RwLock<Vec<Entity>>,
    behaviours: RwLock<Vec<AttachedBehaviour>>,
}

/// 实体层级中节点的句柄，克隆指向同一节点
#[derive(Clone)]
pub struct Entity {
    inner: Arc<EntityInner>,
}

/// 挂载的组件持有的弱反向引用
#[derive(Clone)]
pub(crate) struct WeakEntity(Weak<EntityInner>);

impl WeakEntity {
    pub(crate) fn upgrade(&self) -> Option<Entity> {
        self.0.upgrade().map(|inner| Entity { inner })
    }
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(EntityInner {
                name: name.into(),
                active: AtomicBool::new(true),
                persistent: AtomicBool::new(false),
                destroyed: AtomicBool::new(false),
                parent: RwLock::new(None),
                children: RwLock::new(Vec::new()),
                behaviours: RwLock::new(Vec::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn ptr_eq(&self, other: &Entity) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn downgrade(&self) -> WeakEntity {
        WeakEntity(Arc::downgrade(&self.inner))
    }

    /// 在本实体下创建子实体
    pub fn spawn_child(&self, name: impl Into<String>) -> Entity {
        let child = Entity::new(name);
        child.set_parent(Some(self));
        child
    }

    pub fn parent(&self) -> Option<Entity> {
        self.inner
            .parent
            .read()
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Entity { inner })
    }

    pub fn children(&self) -> Vec<Entity> {
        self.inner.children.read().clone()
    }

    pub fn set_parent(&self, parent: Option<&Entity>) {
        if let Some(previous) = self.parent() {
            previous
                .inner
                .children
                .write()
                .retain(|child| !child.ptr_eq(self));
        }
        *self.inner.parent.write() = parent.map(|p| Arc::downgrade(&p.inner));
        if let Some(parent) = parent {
            parent.inner.children.write().push(self.clone());
        }
    }

    /// 挂载新行为，返回的组件记得自己的实体
    pub fn add_component<T: Injectable>(&self, value: T) -> Component<T> {
        let component = Component::new(value);
        component.attach(self);
        self.inner.behaviours.write().push(AttachedBehaviour {
            handle: Box::new(component.clone()),
            target: component.as_target(),
        });
        component
    }

    /// 本实体上第一个 `T` 类型的行为
    pub fn get_component<T: Injectable>(&self) -> Option<Component<T>> {
        self.inner
            .behaviours
            .read()
            .iter()
            .find_map(|b| b.handle.downcast_ref::<Component<T>>().cloned())
    }

    pub fn component_count(&self) -> usize {
        self.inner.behaviours.read().len()
    }

    /// 本实体及所有后代上的行为（深度优先）
    ///
    /// 未设置 `include_inactive` 时跳过未激活的子树。
    pub fn components_in_children(&self, include_inactive: bool) -> Vec<Arc<dyn InjectionTarget>> {
        let mut targets = Vec::new();
        self.collect_behaviours(include_inactive, &mut targets);
        targets
    }

    fn collect_behaviours(&self, include_inactive: bool, out: &mut Vec<Arc<dyn InjectionTarget>>) {
        if !include_inactive && !self.is_active() {
            return;
        }
        out.extend(
            self.inner
                .behaviours
                .read()
                .iter()
                .map(|b| Arc::clone(&b.target)),
        );
        for child in self.children() {
            child.collect_behaviours(include_inactive, out);
        }
    }

    pub fn set_active(&self, active: bool) {
        self.inner.active.store(active, Ordering::SeqCst);
    }

    /// 实体自身的激活标记；实际状态见 `is_active_in_hierarchy`
    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    pub fn is_active_in_hierarchy(&self) -> bool {
        self.is_active() && self.parent().map_or(true, |p| p.is_active_in_hierarchy())
    }

    /// 使实体的根在场景切换时免于销毁
    pub fn mark_persistent(&self) {
        match self.parent() {
            Some(parent) => {
                tracing::warn!(entity = %self.name(), "Only root entities persist; marking the root");
                parent.mark_persistent();
            }
            None => self.inner.persistent.store(true, Ordering::SeqCst),
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.inner.persistent.load(Ordering::SeqCst)
    }

    /// 停用实体及其子树并与父实体断开，别处持有的组件仍可使用
    pub fn destroy(&self) {
        self.set_parent(None);
        self.mark_destroyed();
    }

    fn mark_destroyed(&self) {
        self.inner.destroyed.store(true, Ordering::SeqCst);
        self.set_active(false);
        for child in self.children() {
            child.mark_destroyed();
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.inner.name)
            .field("active", &self.is_active())
            .field("persistent", &self.is_persistent())
            .field("children", &self.inner.children.read().len())
            .field("behaviours", &self.component_count())
            .finish()
    }
}
