//! 组件句柄
//!
//! [`Component`] 是带有引用身份的共享实例句柄。注入按身份而不是按值去重，
//! 因此同一分配的所有克隆共享一个 [`InstanceId`]。

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::sync::Arc;

use super::context::DependencyContext;
use super::descriptor::Injectable;
use super::marker::Resolvable;
use super::metadata;
use crate::errors::DiResult;
use crate::runtime::entity::{Entity, WeakEntity};

/// 实例身份（共享分配的地址）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(usize);

/// 类型擦除的注入目标
pub trait InjectionTarget: Send + Sync {
    /// 引用身份
    fn identity(&self) -> InstanceId;

    /// 具体类型名称（用于日志）
    fn type_name(&self) -> &'static str;

    /// 按元数据缓存中的顺序填充全部依赖槽位，不做去重
    fn inject(&self, context: &DependencyContext) -> DiResult<()>;
}

struct ComponentInner<T> {
    value: RwLock<T>,
    entity: RwLock<Option<WeakEntity>>,
}

/// 可注入实例的共享句柄
pub struct Component<T> {
    inner: Arc<ComponentInner<T>>,
}

impl<T> Clone for Component<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Component<T> {
    /// 包装一个新实例（尚未注入）
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(ComponentInner {
                value: RwLock::new(value),
                entity: RwLock::new(None),
            }),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.value.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.inner.value.write()
    }

    pub fn id(&self) -> InstanceId {
        InstanceId(Arc::as_ptr(&self.inner) as *const () as usize)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// 所属实体；未挂载或实体已释放时为 `None`
    pub fn entity(&self) -> Option<Entity> {
        self.inner.entity.read().as_ref().and_then(WeakEntity::upgrade)
    }

    pub(crate) fn attach(&self, entity: &Entity) {
        *self.inner.entity.write() = Some(entity.downgrade());
    }
}

impl<T: Injectable> Component<T> {
    /// 类型擦除的注入目标，身份与本句柄相同
    pub fn as_target(&self) -> Arc<dyn InjectionTarget> {
        Arc::new(self.clone())
    }
}

impl<T: Injectable> Resolvable for Component<T> {
    fn injection_target(&self) -> Option<Arc<dyn InjectionTarget>> {
        Some(self.as_target())
    }
}

impl<T: Injectable> InjectionTarget for Component<T> {
    fn identity(&self) -> InstanceId {
        self.id()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn inject(&self, context: &DependencyContext) -> DiResult<()> {
        let members = metadata::injectable_members::<T>()?;
        for slot in members.iter() {
            // 先解析再加写锁，嵌套解析期间不持有目标的锁
            let value = slot.resolve(context)?;
            tracing::trace!(
                target_type = std::any::type_name::<T>(),
                member = slot.name(),
                kind = ?slot.kind(),
                "Assigning dependency"
            );
            slot.assign(&mut self.write(), value);
        }
        Ok(())
    }
}

impl<T> fmt::Debug for Component<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("type", &std::any::type_name::<T>())
            .field("id", &self.id())
            .finish()
    }
}
