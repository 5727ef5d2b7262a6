//! 基础设施层
//!
//! 提供依赖注入容器：
//! - 依赖标记与类型描述
//! - 元数据缓存
//! - 分层依赖上下文与作用域选择

pub mod container;

// 重新导出API
pub use container::{
    Component, Dependency, DependencyContext, DependencyFactory, DependencySet, Injectable,
    InjectionTarget, Resolvable, TypeDescriptorBuilder,
};
