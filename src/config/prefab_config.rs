use serde::Deserialize;

/// Template names for the sample application's prefabs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefabConfig {
    pub player: String,
    pub crate_box: String,
    pub game_state_controller: String,
}

/// Partial Prefab Configuration for loading from files
#[derive(Deserialize, Debug, Default)]
pub struct PartialPrefabConfig {
    pub player: Option<String>,
    #[serde(alias = "box")]
    pub crate_box: Option<String>,
    pub game_state_controller: Option<String>,
}

impl Default for PrefabConfig {
    fn default() -> Self {
        Self::from_partial(None)
    }
}

impl PrefabConfig {
    pub fn from_partial(partial: Option<PartialPrefabConfig>) -> Self {
        let partial = partial.unwrap_or_default();

        Self {
            player: partial.player.unwrap_or_else(|| "Player".to_string()),
            crate_box: partial.crate_box.unwrap_or_else(|| "Box".to_string()),
            game_state_controller: partial
                .game_state_controller
                .unwrap_or_else(|| "GameStateController".to_string()),
        }
    }
}
