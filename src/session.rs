//! 会话切换
//!
//! 一次会话切换 = 异步加载场景 + 创建子上下文 + 填充 + 切换工厂的活动作用域。
//! 加载期间旧作用域保持有效；同一时刻只允许一个切换，重叠的请求直接被拒绝。

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::{DiError, DiResult};
use crate::infrastructure::{DependencyContext, DependencyFactory};
use crate::logging::OperationTimer;
use crate::runtime::Scene;

/// 会话管理器
pub struct SessionManager {
    factory: Arc<DependencyFactory>,
    current: RwLock<Option<Arc<DependencyContext>>>,
    loading: AtomicBool,
}

/// 切换标记守卫，离开作用域时释放标记（包括出错和 future 被丢弃）
struct TransitionGuard<'a>(&'a AtomicBool);

impl Drop for TransitionGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SessionManager {
    pub fn new(factory: Arc<DependencyFactory>) -> Self {
        Self {
            factory,
            current: RwLock::new(None),
            loading: AtomicBool::new(false),
        }
    }

    pub fn root(&self) -> &Arc<DependencyContext> {
        self.factory.root()
    }

    pub fn scene(&self) -> &Arc<Scene> {
        self.factory.scene()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// 当前会话的子上下文
    pub fn current_session(&self) -> Option<Arc<DependencyContext>> {
        self.current.read().clone()
    }

    /// 加载新会话
    ///
    /// 场景加载完成后才创建子上下文；`populate` 向子上下文注册会话级实例，
    /// 成功后工厂切换到新的子上下文，旧的会话上下文随之释放。
    /// `populate` 失败时工厂回到根上下文，因为旧会话的实体已随场景销毁。
    pub async fn load_session<F>(&self, scene_name: &str, populate: F) -> DiResult<Arc<DependencyContext>>
    where
        F: FnOnce(&Arc<DependencyContext>, &Scene) -> DiResult<()>,
    {
        if self
            .loading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!(scene = scene_name, "Session load already in progress, request rejected");
            return Err(DiError::SessionTransitionInProgress {
                requested: scene_name.to_string(),
            });
        }
        let _guard = TransitionGuard(&self.loading);
        let timer = OperationTimer::new("load_session").with_metadata("scene", scene_name);

        self.scene().load(scene_name).await;

        let child = self.root().create_child();
        let scene: &Scene = self.scene();
        if let Err(err) = populate(&child, scene) {
            self.factory.clear_active_child();
            *self.current.write() = None;
            return Err(err);
        }

        self.factory.set_active_child(Some(Arc::clone(&child)));
        *self.current.write() = Some(Arc::clone(&child));

        info!(scene = scene_name, context = %child.id(), "Session started");
        timer.finish();
        Ok(child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SessionManager {
        let root = DependencyContext::new_root();
        let factory = Arc::new(DependencyFactory::new(root, Arc::new(Scene::new("Boot"))));
        SessionManager::new(factory)
    }

    #[tokio::test]
    async fn test_session_swaps_active_scope() {
        let sessions = manager();
        let child = sessions
            .load_session("GameScene", |child, _| {
                child.register(Arc::new(42u32));
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(sessions.scene().name(), "GameScene");
        assert_eq!(sessions.current_session().unwrap().id(), child.id());
        assert_eq!(*sessions.factory.resolve::<Arc<u32>>().unwrap(), 42);
        assert!(sessions.root().resolve::<Arc<u32>>().is_err());
        assert!(!sessions.is_loading());
    }

    #[tokio::test]
    async fn test_failed_populate_falls_back_to_root() {
        let sessions = manager();
        sessions.load_session("One", |_, _| Ok(())).await.unwrap();

        let err = sessions
            .load_session("Two", |_, _| Err(DiError::unregistered::<u8>()))
            .await
            .unwrap_err();

        assert!(err.is_unregistered());
        assert!(sessions.current_session().is_none());
        assert_eq!(sessions.factory.active_context().id(), sessions.root().id());
        assert!(!sessions.is_loading());
    }
}
