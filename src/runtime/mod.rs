//! 组件运行时
//!
//! 容器所依赖的进程内运行时模型：实体构成层级并挂载行为，模板生成新的实体层级，
//! 场景持有根实体并在加载新场景时销毁非持久的根实体。

pub mod entity;
pub mod prefab;
pub mod scene;

pub use entity::Entity;
pub use prefab::Prefab;
pub use scene::Scene;
