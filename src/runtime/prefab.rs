//! 模板

use std::fmt;
use std::sync::Arc;

use super::entity::Entity;
use super::scene::Scene;
use crate::infrastructure::container::{Component, Injectable};

type BuildFn<T> = Arc<dyn Fn(&Entity) -> T + Send + Sync>;

/// 模板 - 生成新的实体层级，并在根实体上挂载 `T`
///
/// 构建闭包接收新的根实体，可以在挂载根行为之前创建子实体、挂载其他行为。
pub struct Prefab<T> {
    name: String,
    build: BuildFn<T>,
}

impl<T> Clone for Prefab<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            build: Arc::clone(&self.build),
        }
    }
}

impl<T: Injectable> Prefab<T> {
    pub fn new<F>(name: impl Into<String>, build: F) -> Self
    where
        F: Fn(&Entity) -> T + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            build: Arc::new(build),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 在 `parent` 下（或作为场景根实体）实例化模板，不做任何注入
    pub fn instantiate(&self, scene: &Scene, parent: Option<&Entity>) -> Component<T> {
        let entity = Entity::new(format!("{}(Clone)", self.name));
        let value = (self.build)(&entity);
        let component = entity.add_component(value);
        match parent {
            Some(parent) => entity.set_parent(Some(parent)),
            None => scene.add_root(entity),
        }
        tracing::trace!(prefab = %self.name, scene = %scene.name(), "Instantiated prefab");
        component
    }
}

impl<T> fmt::Debug for Prefab<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prefab").field("name", &self.name).finish()
    }
}
