//! 护甲

use std::sync::Arc;

use super::logger::LoggerService;
use crate::infrastructure::{Dependency, Injectable, TypeDescriptorBuilder};

/// 玩家模板的子行为，只报告自己被注入
#[derive(Debug, Default)]
pub struct Armor {
    constructed: bool,
}

impl Armor {
    pub fn is_constructed(&self) -> bool {
        self.constructed
    }
}

impl Injectable for Armor {
    fn describe(d: &mut TypeDescriptorBuilder<Self>) {
        d.method(Dependency, "construct", |a, (logger,): (Arc<dyn LoggerService>,)| {
            logger.log("Construct from Armor");
            a.constructed = true;
        });
    }
}
