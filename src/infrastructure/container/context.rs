//! 依赖上下文
//!
//! 每个上下文独占一个类型到实例的注册表，并持有指向父上下文的弱引用。
//! 解析先查本地注册表，未命中时交给父上下文；子上下文能看到祖先的一切注册，
//! 父上下文永远看不到子上下文的私有注册。
//!
//! 已注入记录则由整棵上下文树共享，
//! 实例无论先经哪个上下文注入，其他上下文都不会再次注入它。

use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use super::component::{Component, InjectionTarget, InstanceId};
use super::descriptor::Injectable;
use super::ledger::{Claim, InjectionLedger};
use super::marker::Resolvable;
use super::metadata;
use crate::errors::{DiError, DiResult};
use crate::runtime::{Entity, Prefab, Scene};

const ROOT_CONTEXT_NAME: &str = "DependencyContext";
const CHILD_CONTEXT_NAME: &str = "DependencyContext_Child";

/// 注册信息
struct Registration {
    instance: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
    target: Option<Arc<dyn InjectionTarget>>,
}

/// 依赖上下文（容器）
pub struct DependencyContext {
    id: Uuid,
    name: String,
    this: Weak<DependencyContext>,
    parent: Option<Weak<DependencyContext>>,
    /// 注册表 - 每个类型键至多一个实例
    registry: RwLock<HashMap<TypeId, Registration>>,
    /// 整棵树共享的注入记录
    ledger: Arc<InjectionLedger>,
    /// 经本上下文完成的注入次数
    injected_here: AtomicUsize,
}

impl DependencyContext {
    /// 创建根上下文
    pub fn new_root() -> Arc<Self> {
        Self::named(ROOT_CONTEXT_NAME)
    }

    /// 创建指定名称的根上下文
    pub fn named(name: impl Into<String>) -> Arc<Self> {
        Self::with_parent(name.into(), None, InjectionLedger::new())
    }

    fn with_parent(
        name: String,
        parent: Option<Weak<DependencyContext>>,
        ledger: Arc<InjectionLedger>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            id: Uuid::new_v4(),
            name,
            this: this.clone(),
            parent,
            registry: RwLock::new(HashMap::new()),
            ledger,
            injected_here: AtomicUsize::new(0),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 父上下文；根上下文或父上下文已释放时为 `None`
    pub fn parent(&self) -> Option<Arc<DependencyContext>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// 注册实例，覆盖本上下文中同一类型键的旧实例
    pub fn register<T: Resolvable>(&self, instance: T) {
        let type_name = std::any::type_name::<T>();
        let registration = Registration {
            target: instance.injection_target(),
            instance: Box::new(instance),
            type_name,
        };
        let replaced = self
            .registry
            .write()
            .insert(TypeId::of::<T>(), registration)
            .is_some();
        debug!(context = %self.name, type_name, replaced, "Registered instance");
    }

    /// 注册实例，并使其所属实体跨越场景/会话切换而存活
    pub fn register_persistent<T: Injectable>(&self, component: Component<T>) {
        match component.entity() {
            Some(entity) => entity.mark_persistent(),
            None => warn!(
                context = %self.name,
                type_name = std::any::type_name::<T>(),
                "Persistent registration of a component without an entity"
            ),
        }
        self.register(component);
    }

    /// 解析服务 - 本地未注册时交给父上下文
    ///
    /// 命中后、返回前对实例执行一次注入，单例因此在第一次被请求时才获得自己的依赖。
    pub fn resolve<T: Resolvable>(&self) -> DiResult<T> {
        if let Some((instance, target)) = self.lookup_local::<T>() {
            trace!(context = %self.name, type_name = std::any::type_name::<T>(), "Resolved");
            if let Some(target) = target {
                self.inject_once(&target)?;
            }
            return Ok(instance);
        }

        match self.parent() {
            Some(parent) => parent.resolve::<T>(),
            None => Err(DiError::unregistered::<T>()),
        }
    }

    fn lookup_local<T: Resolvable>(&self) -> Option<(T, Option<Arc<dyn InjectionTarget>>)> {
        let registry = self.registry.read();
        let registration = registry.get(&TypeId::of::<T>())?;
        let instance = registration.instance.downcast_ref::<T>()?.clone();
        Some((instance, registration.target.clone()))
    }

    /// 创建子上下文
    pub fn create_child(&self) -> Arc<DependencyContext> {
        let child = Self::with_parent(
            CHILD_CONTEXT_NAME.to_string(),
            Some(self.this.clone()),
            Arc::clone(&self.ledger),
        );
        debug!(parent = %self.name, parent_id = %self.id, child_id = %child.id, "Created child context");
        child
    }

    /// 通过选定的构造函数创建实例，然后执行一次注入
    pub fn create_with_dependencies<T: Injectable>(&self) -> DiResult<Component<T>> {
        let constructor = metadata::constructor::<T>()?;
        trace!(
            type_name = std::any::type_name::<T>(),
            parameters = ?constructor.parameters(),
            "Constructing with dependencies"
        );
        let component = Component::new(constructor.invoke(self)?);
        self.inject_once(&component.as_target())?;
        Ok(component)
    }

    /// 对已创建的组件执行一次注入；`include_attached_children` 为真时，
    /// 所属实体及其所有后代实体上的行为（包括未激活的）都会被注入
    pub fn inject_into<T: Injectable>(
        &self,
        component: &Component<T>,
        include_attached_children: bool,
    ) -> DiResult<Component<T>> {
        self.inject_once(&component.as_target())?;
        if include_attached_children {
            if let Some(entity) = component.entity() {
                for target in entity.components_in_children(true) {
                    self.inject_once(&target)?;
                }
            }
        }
        Ok(component.clone())
    }

    /// 实例化模板，再对实例（及其子层级）执行注入
    pub fn instantiate_with_dependencies<T: Injectable>(
        &self,
        scene: &Scene,
        prefab: &Prefab<T>,
        parent: Option<&Entity>,
        include_children: bool,
    ) -> DiResult<Component<T>> {
        let instance = prefab.instantiate(scene, parent);
        self.inject_into(&instance, include_children)
    }

    /// 注入一次算法
    ///
    /// 实例已在树中任一上下文完成注入，或本线程正在注入它（重入）时直接返回；
    /// 其他线程正在注入时等待其结束。成功后身份被永久记录；
    /// 失败时清除进行中标记并传播错误，实例保留重试资格。
    pub fn inject_once(&self, target: &Arc<dyn InjectionTarget>) -> DiResult<()> {
        let guard = match self.ledger.claim(target.identity()) {
            Claim::Skip => return Ok(()),
            Claim::Acquired(guard) => guard,
        };

        trace!(context = %self.name, type_name = target.type_name(), "Injecting dependencies");
        match target.inject(self) {
            Ok(()) => {
                guard.complete(target);
                self.injected_here.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(err) => {
                drop(guard);
                debug!(
                    context = %self.name,
                    type_name = target.type_name(),
                    error = %err,
                    "Injection failed"
                );
                Err(err)
            }
        }
    }

    /// 实例是否已在本上下文所在的树中完成注入
    pub fn is_injected(&self, id: InstanceId) -> bool {
        self.ledger.is_injected(id)
    }

    /// 经本上下文完成注入的实例数量
    pub fn injected_count(&self) -> usize {
        self.injected_here.load(Ordering::Relaxed)
    }

    /// 类型是否在本上下文或祖先中注册
    pub fn is_registered<T: 'static>(&self) -> bool {
        self.contains_local::<T>() || self.parent().map_or(false, |parent| parent.is_registered::<T>())
    }

    pub fn contains_local<T: 'static>(&self) -> bool {
        self.registry.read().contains_key(&TypeId::of::<T>())
    }

    /// 本上下文注册的类型名称（已排序）
    pub fn registered_types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .registry
            .read()
            .values()
            .map(|registration| registration.type_name)
            .collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for DependencyContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyContext")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parent", &self.parent().map(|parent| parent.id))
            .field("registered", &self.registered_types())
            .field("injected", &self.injected_count())
            .field("tree_injected", &self.ledger.len())
            .finish()
    }
}
