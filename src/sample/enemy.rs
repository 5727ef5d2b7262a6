//! 敌人

use std::sync::Arc;

use super::logger::LoggerService;
use crate::infrastructure::{Injectable, TypeDescriptorBuilder};

/// 通过构造函数注入创建的普通对象
pub struct Enemy {
    logger: Arc<dyn LoggerService>,
}

impl Enemy {
    fn new(logger: Arc<dyn LoggerService>) -> Self {
        logger.log("Enemy created!");
        Self { logger }
    }

    pub fn attack(&self) {
        self.logger.log("Attack!");
    }

    pub fn logger(&self) -> &Arc<dyn LoggerService> {
        &self.logger
    }
}

impl Injectable for Enemy {
    fn describe(d: &mut TypeDescriptorBuilder<Self>) {
        d.constructor(|(logger,): (Arc<dyn LoggerService>,)| Enemy::new(logger));
    }
}
