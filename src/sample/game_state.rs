//! 游戏状态控制器
//!
//! 按键 G 开始新会话，P 切换玩家，B 生成箱子，E 创建敌人，U 让箱子抬升玩家。

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use super::crate_box::CrateBox;
use super::enemy::Enemy;
use super::player::Player;
use super::prefabs::PrefabCatalog;
use crate::config::AppConfig;
use crate::errors::{AppError, DiError, DiResult};
use crate::infrastructure::{Component, Dependency, DependencyFactory, Injectable, TypeDescriptorBuilder};
use crate::session::SessionManager;

/// 控制器响应的按键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// 加载游戏场景并开始新会话
    G,
    /// 切换当前玩家实体的激活状态
    P,
    /// 生成绑定当前玩家的箱子
    B,
    /// 创建敌人并攻击
    E,
    /// 每个存活的箱子抬升玩家
    U,
}

impl Key {
    /// 解析逗号分隔的按键脚本，例如 `G,B,U`
    pub fn parse_script(script: &str) -> Result<Vec<Key>, AppError> {
        script
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Key::from_str)
            .collect()
    }
}

impl FromStr for Key {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "G" => Ok(Key::G),
            "P" => Ok(Key::P),
            "B" => Ok(Key::B),
            "E" => Ok(Key::E),
            "U" => Ok(Key::U),
            other => Err(AppError::Script(format!("unknown key '{other}'"))),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// 跨越所有会话切换的持久控制器
#[derive(Default)]
pub struct GameStateController {
    factory: Option<Arc<DependencyFactory>>,
    sessions: Option<Arc<SessionManager>>,
    config: Option<Arc<AppConfig>>,
    prefabs: Option<Arc<PrefabCatalog>>,
    boxes: Vec<Component<CrateBox>>,
}

impl Injectable for GameStateController {
    fn describe(d: &mut TypeDescriptorBuilder<Self>) {
        d.constructor(|(): ()| GameStateController::default())
            .field(Dependency, "factory", |c, v: Arc<DependencyFactory>| c.factory = Some(v))
            .field(Dependency, "sessions", |c, v: Arc<SessionManager>| c.sessions = Some(v))
            .field(Dependency, "config", |c, v: Arc<AppConfig>| c.config = Some(v))
            .field(Dependency, "prefabs", |c, v: Arc<PrefabCatalog>| c.prefabs = Some(v));
    }
}

fn require<T: Clone>(slot: &Option<T>, member: &'static str) -> DiResult<T> {
    slot.clone().ok_or(DiError::MissingDependency {
        owner: std::any::type_name::<GameStateController>(),
        member,
    })
}

impl GameStateController {
    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_wired(&self) -> bool {
        self.factory.is_some() && self.sessions.is_some() && self.config.is_some() && self.prefabs.is_some()
    }

    /// 响应一次按键，出错只中止这一次
    pub async fn handle_key(controller: &Component<Self>, key: Key) -> DiResult<()> {
        debug!(%key, "Handling key");
        match key {
            Key::G => Self::load_game_scene(controller).await,
            Key::P => {
                let factory = require(&controller.read().factory, "factory")?;
                let player = factory.resolve::<Component<Player>>()?;
                let entity = player.entity().ok_or(DiError::NotAttached {
                    type_name: std::any::type_name::<Player>(),
                })?;
                entity.set_active(!entity.is_active());
                Ok(())
            }
            Key::B => {
                let (factory, prefabs) = {
                    let this = controller.read();
                    (require(&this.factory, "factory")?, require(&this.prefabs, "prefabs")?)
                };
                let crate_box = factory.instantiate(&prefabs.crate_box, None)?;
                crate_box.read().start()?;
                controller.write().boxes.push(crate_box);
                Ok(())
            }
            Key::E => {
                let factory = require(&controller.read().factory, "factory")?;
                let enemy = factory.create_instance::<Enemy>()?;
                enemy.read().attack();
                Ok(())
            }
            Key::U => {
                let boxes = controller.read().boxes.clone();
                for crate_box in &boxes {
                    crate_box.read().lift_player()?;
                }
                Ok(())
            }
        }
    }

    async fn load_game_scene(controller: &Component<Self>) -> DiResult<()> {
        let (sessions, config, prefabs) = {
            let this = controller.read();
            (
                require(&this.sessions, "sessions")?,
                require(&this.config, "config")?,
                require(&this.prefabs, "prefabs")?,
            )
        };

        sessions
            .load_session(&config.session.scene, |child, scene| {
                let player = child.instantiate_with_dependencies(scene, &prefabs.player, None, true)?;
                child.register(player);
                Ok(())
            })
            .await?;

        // 箱子已随上一个场景销毁
        controller.write().boxes.clear();
        Ok(())
    }
}
