//! 场景
//!
//! 场景持有根实体；异步加载新场景后销毁非持久的根实体。

use parking_lot::RwLock;
use std::fmt;
use std::time::Duration;

use super::entity::Entity;

/// 当前加载的场景及其根实体
pub struct Scene {
    name: RwLock<String>,
    roots: RwLock<Vec<Entity>>,
    load_delay: Duration,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_load_delay(name, Duration::ZERO)
    }

    /// `load` 切换场景前模拟的耗时
    pub fn with_load_delay(name: impl Into<String>, load_delay: Duration) -> Self {
        Self {
            name: RwLock::new(name.into()),
            roots: RwLock::new(Vec::new()),
            load_delay,
        }
    }

    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    pub fn add_root(&self, entity: Entity) {
        entity.set_parent(None);
        self.roots.write().push(entity);
    }

    /// 创建空的根实体
    pub fn spawn(&self, name: impl Into<String>) -> Entity {
        let entity = Entity::new(name);
        self.add_root(entity.clone());
        entity
    }

    pub fn roots(&self) -> Vec<Entity> {
        self.roots.read().clone()
    }

    /// 按名称查找根实体
    pub fn find(&self, name: &str) -> Option<Entity> {
        self.roots.read().iter().find(|e| e.name() == name).cloned()
    }

    /// 加载 `name` 替换当前场景，加载完成后销毁所有非持久的根实体
    pub async fn load(&self, name: &str) {
        tracing::debug!(from = %self.name(), to = name, "Loading scene");
        tokio::task::yield_now().await;
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }

        let torn_down: Vec<Entity> = {
            let mut roots = self.roots.write();
            let (kept, dropped): (Vec<_>, Vec<_>) =
                roots.drain(..).partition(|root| root.is_persistent());
            *roots = kept;
            dropped
        };
        for root in &torn_down {
            root.destroy();
        }
        *self.name.write() = name.to_string();
        tracing::info!(scene = name, destroyed = torn_down.len(), "Scene loaded");
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("name", &*self.name.read())
            .field("roots", &self.roots.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_keeps_only_persistent_roots() {
        let scene = Scene::new("Boot");
        let keeper = scene.spawn("Keeper");
        keeper.mark_persistent();
        let temporary = scene.spawn("Temporary");

        scene.load("GameScene").await;

        assert_eq!(scene.name(), "GameScene");
        assert_eq!(scene.roots().len(), 1);
        assert!(scene.find("Keeper").is_some());
        assert!(scene.find("Temporary").is_none());
        assert!(temporary.is_destroyed());
        assert!(!keeper.is_destroyed());
    }

    #[test]
    fn test_spawn_registers_root() {
        let scene = Scene::new("Boot");
        let entity = scene.spawn("Camera");
        assert!(scene.find("Camera").unwrap().ptr_eq(&entity));
        assert!(scene.find("Light").is_none());
    }
}
