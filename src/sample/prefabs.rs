//! 模板目录

use super::armor::Armor;
use super::crate_box::CrateBox;
use super::game_state::GameStateController;
use super::player::Player;
use crate::config::PrefabConfig;
use crate::runtime::Prefab;

/// 示例用到的模板，名称取自配置的 `[prefabs]` 段
#[derive(Debug, Clone)]
pub struct PrefabCatalog {
    pub player: Prefab<Player>,
    pub crate_box: Prefab<CrateBox>,
    pub game_state_controller: Prefab<GameStateController>,
}

impl PrefabCatalog {
    pub fn from_config(config: &PrefabConfig) -> Self {
        Self {
            player: Prefab::new(config.player.clone(), |root| {
                root.spawn_child("Armor").add_component(Armor::default());
                Player::default()
            }),
            crate_box: Prefab::new(config.crate_box.clone(), |_| CrateBox::default()),
            game_state_controller: Prefab::new(config.game_state_controller.clone(), |_| {
                GameStateController::default()
            }),
        }
    }
}

impl Default for PrefabCatalog {
    fn default() -> Self {
        Self::from_config(&PrefabConfig::default())
    }
}
