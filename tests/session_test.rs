//! 会话切换集成测试

use futures::join;
use simpledi::config::AppConfig;
use simpledi::errors::DiError;
use simpledi::infrastructure::{Component, DependencyContext, DependencyFactory};
use simpledi::runtime::Scene;
use simpledi::sample::{bootstrap, Key, LoggerService, Player, RecordingLogger};
use simpledi::session::SessionManager;
use std::sync::Arc;
use std::time::Duration;

fn sessions_with_delay(delay: Duration) -> SessionManager {
    let root = DependencyContext::new_root();
    let scene = Arc::new(Scene::with_load_delay("Boot", delay));
    SessionManager::new(Arc::new(DependencyFactory::new(root, scene)))
}

#[tokio::test]
async fn test_overlapping_loads_are_rejected() {
    let sessions = sessions_with_delay(Duration::from_millis(20));

    let (first, second) = join!(
        sessions.load_session("First", |child, _| {
            child.register(Arc::new(1u8));
            Ok(())
        }),
        sessions.load_session("Second", |child, _| {
            child.register(Arc::new(2u8));
            Ok(())
        })
    );

    let child = first.unwrap();
    match second.unwrap_err() {
        DiError::SessionTransitionInProgress { requested } => assert_eq!(requested, "Second"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(sessions.scene().name(), "First");
    assert_eq!(sessions.current_session().unwrap().id(), child.id());
    assert_eq!(*child.resolve::<Arc<u8>>().unwrap(), 1);
}

#[tokio::test]
async fn test_sequential_loads_replace_the_session() {
    let sessions = sessions_with_delay(Duration::ZERO);

    let first = sessions.load_session("One", |_, _| Ok(())).await.unwrap();
    let first_scope = Arc::downgrade(&first);
    drop(first);

    let second = sessions.load_session("Two", |_, _| Ok(())).await.unwrap();
    assert!(first_scope.upgrade().is_none());
    assert_eq!(second.parent().unwrap().id(), sessions.root().id());
}

#[tokio::test]
async fn test_previous_scope_stays_active_while_loading() {
    let sessions = sessions_with_delay(Duration::from_millis(20));
    let factory = DependencyFactory::new(Arc::clone(sessions.root()), Arc::clone(sessions.scene()));
    sessions.root().register(Arc::new("root".to_string()));

    let probe = async {
        tokio::task::yield_now().await;
        assert!(sessions.is_loading());
        assert!(sessions.current_session().is_none());
        factory.resolve::<Arc<String>>().unwrap()
    };
    let (loaded, seen) = join!(sessions.load_session("Level", |_, _| Ok(())), probe);

    assert!(loaded.is_ok());
    assert_eq!(seen.as_str(), "root");
    assert!(!sessions.is_loading());
}

fn quick_config() -> AppConfig {
    AppConfig::from_toml_str("[session]\nload_delay_ms = 0\n").unwrap()
}

#[tokio::test]
async fn test_persistent_controller_survives_scene_loads() {
    let recorder = Arc::new(RecordingLogger::new());
    let logger: Arc<dyn LoggerService> = recorder.clone();
    let app = bootstrap(quick_config(), logger).unwrap();

    app.press(Key::G).await.unwrap();
    let first_player = app.factory.resolve::<Component<Player>>().unwrap();
    let first_entity = first_player.entity().unwrap();

    app.press(Key::G).await.unwrap();
    let second_player = app.factory.resolve::<Component<Player>>().unwrap();

    assert!(!first_player.ptr_eq(&second_player));
    assert!(first_entity.is_destroyed());
    assert!(app.controller.entity().unwrap().is_persistent());
    assert!(app.scene.find("GameStateController(Clone)").is_some());
    assert_eq!(recorder.count("Player Constructed"), 2);
    assert_eq!(app.scene.name(), "GameScene");
}
