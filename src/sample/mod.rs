//! 示例游戏
//!
//! 全局日志服务、每个会话一个的玩家、依赖当前玩家的箱子、通过构造函数注入的敌人，
//! 以及由按键驱动的控制器。

pub mod armor;
pub mod bootstrap;
pub mod crate_box;
pub mod enemy;
pub mod game_state;
pub mod logger;
pub mod player;
pub mod prefabs;

pub use armor::Armor;
pub use bootstrap::{bootstrap, Application};
pub use crate_box::CrateBox;
pub use enemy::Enemy;
pub use game_state::{GameStateController, Key};
pub use logger::{ConsoleLogger, LoggerService, RecordingLogger};
pub use player::Player;
pub use prefabs::PrefabCatalog;
