//! 启动流程

use std::sync::Arc;

use super::game_state::{GameStateController, Key};
use super::logger::LoggerService;
use super::prefabs::PrefabCatalog;
use crate::config::AppConfig;
use crate::errors::DiResult;
use crate::infrastructure::{Component, DependencyContext, DependencyFactory};
use crate::logging::OperationTimer;
use crate::runtime::Scene;
use crate::session::SessionManager;

/// 启动后全局作用域持有的一切
pub struct Application {
    pub root: Arc<DependencyContext>,
    pub factory: Arc<DependencyFactory>,
    pub sessions: Arc<SessionManager>,
    pub scene: Arc<Scene>,
    pub controller: Component<GameStateController>,
}

/// 构建根作用域、注册全局单例并解析控制器（控制器的依赖随之被注入）
pub fn bootstrap(config: AppConfig, logger: Arc<dyn LoggerService>) -> DiResult<Application> {
    let timer = OperationTimer::new("bootstrap");

    let scene = Arc::new(Scene::with_load_delay("Boot", config.session.load_delay()));
    let root = DependencyContext::new_root();
    let factory = Arc::new(DependencyFactory::new(Arc::clone(&root), Arc::clone(&scene)));
    let sessions = Arc::new(SessionManager::new(Arc::clone(&factory)));
    let prefabs = Arc::new(PrefabCatalog::from_config(&config.prefabs));

    root.register(Arc::clone(&factory));
    root.register(Arc::clone(&sessions));
    root.register(Arc::new(config));
    root.register(Arc::clone(&prefabs));
    root.register(Arc::clone(&scene));

    let controller = prefabs.game_state_controller.instantiate(&scene, None);
    root.register_persistent(controller);
    root.register(logger);

    let controller = root.resolve::<Component<GameStateController>>()?;
    timer.finish();

    Ok(Application {
        root,
        factory,
        sessions,
        scene,
        controller,
    })
}

impl Application {
    pub async fn press(&self, key: Key) -> DiResult<()> {
        GameStateController::handle_key(&self.controller, key).await
    }
}
