//! 玩家

use std::sync::Arc;

use super::logger::LoggerService;
use crate::infrastructure::{Dependency, Injectable, TypeDescriptorBuilder};

/// 会话主体，只注册在会话的子上下文中
#[derive(Default)]
pub struct Player {
    logger: Option<Arc<dyn LoggerService>>,
    position: [f32; 3],
}

impl Player {
    fn construct(&mut self, logger: Arc<dyn LoggerService>) {
        logger.log("Player Constructed");
        self.logger = Some(logger);
    }

    pub fn up(&mut self) {
        self.position[1] += 1.0;
    }

    pub fn position(&self) -> [f32; 3] {
        self.position
    }

    pub fn logger(&self) -> Option<&Arc<dyn LoggerService>> {
        self.logger.as_ref()
    }
}

impl Injectable for Player {
    fn describe(d: &mut TypeDescriptorBuilder<Self>) {
        d.constructor(|(): ()| Player::default())
            .method(Dependency, "construct", |p, (logger,): (Arc<dyn LoggerService>,)| {
                p.construct(logger)
            });
    }
}
