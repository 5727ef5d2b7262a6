//! 依赖注入容器
//!
//! 类型通过 [`Injectable::describe`] 声明自己的依赖槽位（构造函数、字段、属性、方法），
//! 描述只构建一次并缓存；[`DependencyContext`] 负责注册、沿父链解析以及每个实例至多一次的注入。

pub mod component;
pub mod context;
pub mod descriptor;
pub mod factory;
mod ledger;
pub mod marker;
pub mod metadata;

pub use component::{Component, InjectionTarget, InstanceId};
pub use context::DependencyContext;
pub use descriptor::{
    ConstructorSlot, Injectable, InjectableMembers, MemberKind, MemberSlot, TypeDescriptorBuilder,
};
pub use factory::DependencyFactory;
pub use marker::{Dependency, DependencyKey, DependencySet, Resolvable};
pub use metadata::CacheStats;
