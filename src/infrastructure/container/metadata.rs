//! 元数据缓存
//!
//! 每个具体类型的注入成员列表和选定构造函数只计算一次，进程生命周期内不失效。
//! 填充采用"先计算、再交换"：构建描述时不持有任何 map 锁（基类型的描述会递归进入缓存），
//! 并发首次访问时以先插入者为准。

use dashmap::DashMap;
use lazy_static::lazy_static;
use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::descriptor::{ConstructorSlot, Injectable, InjectableMembers, TypeDescriptorBuilder};
use crate::errors::DiResult;

type ErasedCache = DashMap<TypeId, Arc<dyn Any + Send + Sync>>;

lazy_static! {
    static ref MEMBER_CACHE: ErasedCache = DashMap::new();
    static ref CONSTRUCTOR_CACHE: ErasedCache = DashMap::new();
}

/// 内部统计信息（原子计数器）
struct InnerStats {
    member_hits: AtomicU64,
    member_misses: AtomicU64,
    constructor_hits: AtomicU64,
    constructor_misses: AtomicU64,
}

static STATS: InnerStats = InnerStats {
    member_hits: AtomicU64::new(0),
    member_misses: AtomicU64::new(0),
    constructor_hits: AtomicU64::new(0),
    constructor_misses: AtomicU64::new(0),
};

/// 缓存统计信息
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub member_hits: u64,
    pub member_misses: u64,
    pub constructor_hits: u64,
    pub constructor_misses: u64,
    pub cached_member_types: usize,
    pub cached_constructor_types: usize,
}

impl CacheStats {
    /// 获取缓存命中率（小数形式）
    pub fn hit_rate(&self) -> f64 {
        let hits = (self.member_hits + self.constructor_hits) as f64;
        let total = hits + (self.member_misses + self.constructor_misses) as f64;
        if total == 0.0 {
            0.0
        } else {
            hits / total
        }
    }
}

/// 获取类型的注入成员（字段、属性、方法），基类型在前
pub fn injectable_members<T: Injectable>() -> DiResult<Arc<InjectableMembers<T>>> {
    fill_once(
        &MEMBER_CACHE,
        TypeId::of::<T>(),
        &STATS.member_hits,
        &STATS.member_misses,
        || describe::<T>().into_members(),
    )
}

/// 获取类型的构造函数
pub fn constructor<T: Injectable>() -> DiResult<Arc<ConstructorSlot<T>>> {
    fill_once(
        &CONSTRUCTOR_CACHE,
        TypeId::of::<T>(),
        &STATS.constructor_hits,
        &STATS.constructor_misses,
        || describe::<T>().into_constructor(),
    )
}

/// 类型上被声明为只读、因而不参与注入的属性
pub fn read_only_properties<T: Injectable>() -> Vec<&'static str> {
    describe::<T>().read_only_properties().to_vec()
}

pub fn stats() -> CacheStats {
    CacheStats {
        member_hits: STATS.member_hits.load(Ordering::Relaxed),
        member_misses: STATS.member_misses.load(Ordering::Relaxed),
        constructor_hits: STATS.constructor_hits.load(Ordering::Relaxed),
        constructor_misses: STATS.constructor_misses.load(Ordering::Relaxed),
        cached_member_types: MEMBER_CACHE.len(),
        cached_constructor_types: CONSTRUCTOR_CACHE.len(),
    }
}

pub fn is_cached<T: Injectable>() -> bool {
    MEMBER_CACHE.contains_key(&TypeId::of::<T>())
}

fn describe<T: Injectable>() -> TypeDescriptorBuilder<T> {
    let mut builder = TypeDescriptorBuilder::new();
    T::describe(&mut builder);
    builder
}

fn fill_once<V, F>(
    cache: &ErasedCache,
    key: TypeId,
    hits: &AtomicU64,
    misses: &AtomicU64,
    build: F,
) -> DiResult<Arc<V>>
where
    V: Send + Sync + 'static,
    F: FnOnce() -> DiResult<V>,
{
    if let Some(cached) = cache
        .get(&key)
        .and_then(|entry| Arc::clone(entry.value()).downcast::<V>().ok())
    {
        hits.fetch_add(1, Ordering::Relaxed);
        return Ok(cached);
    }

    misses.fetch_add(1, Ordering::Relaxed);
    // 构建失败不缓存，下次访问会重新扫描
    let built = Arc::new(build()?);
    let erased: Arc<dyn Any + Send + Sync> = built.clone();
    let stored = Arc::clone(cache.entry(key).or_insert(erased).value());
    tracing::debug!(type_name = std::any::type_name::<V>(), "Cached dependency metadata");
    Ok(stored.downcast::<V>().unwrap_or(built))
}
