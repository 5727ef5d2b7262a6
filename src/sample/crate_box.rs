//! 箱子

use std::sync::Arc;

use super::logger::LoggerService;
use super::player::Player;
use crate::errors::{DiError, DiResult};
use crate::infrastructure::{Component, Dependency, Injectable, TypeDescriptorBuilder};

/// 依赖当前会话玩家的箱子
#[derive(Default)]
pub struct CrateBox {
    logger: Option<Arc<dyn LoggerService>>,
    player: Option<Component<Player>>,
}

impl CrateBox {
    fn construct(&mut self, logger: Arc<dyn LoggerService>, player: Component<Player>) {
        self.player = Some(player);
        logger.log("Box Constructed");
        self.logger = Some(logger);
    }

    /// 首帧回调，实例化后执行一次
    pub fn start(&self) -> DiResult<()> {
        let logger = self.logger.as_ref().ok_or_else(|| missing("logger"))?;
        logger.log("start invoked in Box");
        Ok(())
    }

    /// 把玩家上移一格
    pub fn lift_player(&self) -> DiResult<()> {
        let player = self.player.as_ref().ok_or_else(|| missing("player"))?;
        player.write().up();
        Ok(())
    }

    pub fn player(&self) -> Option<&Component<Player>> {
        self.player.as_ref()
    }
}

fn missing(member: &'static str) -> DiError {
    DiError::MissingDependency {
        owner: std::any::type_name::<CrateBox>(),
        member,
    }
}

impl Injectable for CrateBox {
    fn describe(d: &mut TypeDescriptorBuilder<Self>) {
        d.method(
            Dependency,
            "construct",
            |b, (logger, player): (Arc<dyn LoggerService>, Component<Player>)| {
                b.construct(logger, player)
            },
        );
    }
}
