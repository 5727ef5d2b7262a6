//! 依赖工厂（作用域选择器）
//!
//! 应用代码总是通过工厂创建或解析实例，工厂把请求交给"当前活动上下文"：
//! 最近设置的子上下文，未设置（或已清除）时为根上下文。

use parking_lot::RwLock;
use std::sync::Arc;

use super::component::Component;
use super::context::DependencyContext;
use super::descriptor::Injectable;
use super::marker::Resolvable;
use crate::errors::DiResult;
use crate::runtime::{Entity, Prefab, Scene};

pub struct DependencyFactory {
    root: Arc<DependencyContext>,
    scene: Arc<Scene>,
    active_child: RwLock<Option<Arc<DependencyContext>>>,
}

impl DependencyFactory {
    pub fn new(root: Arc<DependencyContext>, scene: Arc<Scene>) -> Self {
        Self {
            root,
            scene,
            active_child: RwLock::new(None),
        }
    }

    /// 切换活动子上下文；`None` 回到根上下文
    pub fn set_active_child(&self, child: Option<Arc<DependencyContext>>) {
        tracing::debug!(
            child = ?child.as_ref().map(|ctx| ctx.id()),
            "Switching active dependency scope"
        );
        *self.active_child.write() = child;
    }

    pub fn clear_active_child(&self) {
        self.set_active_child(None);
    }

    pub fn root(&self) -> &Arc<DependencyContext> {
        &self.root
    }

    pub fn scene(&self) -> &Arc<Scene> {
        &self.scene
    }

    pub fn active_context(&self) -> Arc<DependencyContext> {
        self.active_child
            .read()
            .clone()
            .unwrap_or_else(|| Arc::clone(&self.root))
    }

    pub fn create_instance<T: Injectable>(&self) -> DiResult<Component<T>> {
        self.active_context().create_with_dependencies::<T>()
    }

    /// 实例化模板并注入整个层级
    pub fn instantiate<T: Injectable>(
        &self,
        prefab: &Prefab<T>,
        parent: Option<&Entity>,
    ) -> DiResult<Component<T>> {
        self.instantiate_with(prefab, parent, true)
    }

    pub fn instantiate_with<T: Injectable>(
        &self,
        prefab: &Prefab<T>,
        parent: Option<&Entity>,
        include_children: bool,
    ) -> DiResult<Component<T>> {
        self.active_context()
            .instantiate_with_dependencies(&self.scene, prefab, parent, include_children)
    }

    pub fn resolve<T: Resolvable>(&self) -> DiResult<T> {
        self.active_context().resolve::<T>()
    }
}
