//! 依赖标记与依赖键
//!
//! [`Dependency`] 是零数据的标记，声明一个构造函数、字段、属性或方法参与注入。
//! [`Resolvable`] 描述可以放入注册表并被解析的句柄类型，
//! [`DependencySet`] 把参数元组映射为一组依赖键并按顺序解析。

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use super::component::InjectionTarget;
use super::context::DependencyContext;
use crate::errors::DiResult;

/// 依赖标记
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Dependency;

/// 依赖键 - 类型标识加上用于错误信息的类型名称
#[derive(Clone, Copy)]
pub struct DependencyKey {
    pub type_id: TypeId,
    pub type_name: &'static str,
}

impl DependencyKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }
}

impl PartialEq for DependencyKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for DependencyKey {}

impl fmt::Debug for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// 可注册、可解析的句柄类型
///
/// 注册表中每个类型键只保存一个实例，解析时返回它的克隆。
/// 如果句柄指向一个带有依赖槽位的实例，`injection_target` 返回注入目标，
/// 上下文会在第一次解析命中时对它执行一次注入。
pub trait Resolvable: Clone + Send + Sync + 'static {
    fn injection_target(&self) -> Option<Arc<dyn InjectionTarget>> {
        None
    }
}

/// 共享服务（包括 `Arc<dyn Trait>` 形式的接口）没有依赖槽位
impl<T: ?Sized + Send + Sync + 'static> Resolvable for Arc<T> {}

/// 一组按声明顺序解析的依赖，用于构造函数和注入方法的参数列表
pub trait DependencySet: Sized + Send + 'static {
    fn keys() -> Vec<DependencyKey>;

    fn resolve_from(context: &DependencyContext) -> DiResult<Self>;
}

impl DependencySet for () {
    fn keys() -> Vec<DependencyKey> {
        Vec::new()
    }

    fn resolve_from(_context: &DependencyContext) -> DiResult<Self> {
        Ok(())
    }
}

macro_rules! impl_dependency_set {
    ($($name:ident),+) => {
        impl<$($name: Resolvable),+> DependencySet for ($($name,)+) {
            fn keys() -> Vec<DependencyKey> {
                vec![$(DependencyKey::of::<$name>()),+]
            }

            fn resolve_from(context: &DependencyContext) -> DiResult<Self> {
                Ok(($(context.resolve::<$name>()?,)+))
            }
        }
    };
}

impl_dependency_set!(A);
impl_dependency_set!(A, B);
impl_dependency_set!(A, B, C);
impl_dependency_set!(A, B, C, D);
impl_dependency_set!(A, B, C, D, E);
impl_dependency_set!(A, B, C, D, E, F);
impl_dependency_set!(A, B, C, D, E, F, G);
impl_dependency_set!(A, B, C, D, E, F, G, H);
