//! 注入登记簿
//!
//! 同一棵上下文树中的所有上下文共享一个登记簿：根上下文创建它，子上下文持有它的 `Arc`。
//! 因此无论从哪个上下文发起，一个实例在整棵树中至多被注入一次。
//!
//! 正在注入的实例记录了执行注入的线程：同一线程的重入请求直接返回，
//! 其他线程则等待注入结束，保证拿到的实例已经填充完毕。

use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use super::component::{InjectionTarget, InstanceId};

#[derive(Default)]
struct LedgerState {
    /// 只增不减，并保持实例存活以免身份被复用
    injected: HashMap<InstanceId, Arc<dyn InjectionTarget>>,
    in_progress: HashMap<InstanceId, ThreadId>,
}

/// 申请注入的结果
pub(crate) enum Claim<'a> {
    /// 已完成，或本线程正在注入（重入）
    Skip,
    /// 由调用者执行注入
    Acquired(ClaimGuard<'a>),
}

#[derive(Default)]
pub(crate) struct InjectionLedger {
    state: Mutex<LedgerState>,
    finished: Condvar,
}

impl InjectionLedger {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 申请注入 `id`；其他线程正在注入时阻塞到它结束
    pub(crate) fn claim(&self, id: InstanceId) -> Claim<'_> {
        let current = thread::current().id();
        let mut state = self.state.lock();
        loop {
            if state.injected.contains_key(&id) {
                return Claim::Skip;
            }
            match state.in_progress.get(&id) {
                Some(owner) if *owner == current => return Claim::Skip,
                Some(_) => self.finished.wait(&mut state),
                None => break,
            }
        }
        state.in_progress.insert(id, current);
        Claim::Acquired(ClaimGuard {
            ledger: self,
            id,
            done: None,
        })
    }

    pub(crate) fn is_injected(&self, id: InstanceId) -> bool {
        self.state.lock().injected.contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().injected.len()
    }
}

/// 注入权；丢弃时（包括失败和 panic）清除进行中标记并唤醒等待者
pub(crate) struct ClaimGuard<'a> {
    ledger: &'a InjectionLedger,
    id: InstanceId,
    done: Option<Arc<dyn InjectionTarget>>,
}

impl ClaimGuard<'_> {
    /// 标记注入成功，释放时一并记录
    pub(crate) fn complete(mut self, target: &Arc<dyn InjectionTarget>) {
        self.done = Some(Arc::clone(target));
    }
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.ledger.state.lock();
        // 先记录完成，再清除进行中标记，等待者醒来时能看到结果
        if let Some(target) = self.done.take() {
            state.injected.insert(self.id, target);
        }
        state.in_progress.remove(&self.id);
        drop(state);
        self.ledger.finished.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::container::Component;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    fn target() -> Arc<dyn InjectionTarget> {
        struct Empty;
        impl crate::infrastructure::container::Injectable for Empty {
            fn describe(_: &mut crate::infrastructure::container::TypeDescriptorBuilder<Self>) {}
        }
        Component::new(Empty).as_target()
    }

    #[test]
    fn test_reentrant_claim_is_skipped() {
        let ledger = InjectionLedger::new();
        let target = target();
        let id = target.identity();

        let guard = match ledger.claim(id) {
            Claim::Acquired(guard) => guard,
            Claim::Skip => panic!("first claim must be acquired"),
        };
        assert!(matches!(ledger.claim(id), Claim::Skip));
        guard.complete(&target);

        assert!(ledger.is_injected(id));
        assert_eq!(ledger.len(), 1);
        assert!(matches!(ledger.claim(id), Claim::Skip));
    }

    #[test]
    fn test_dropped_claim_allows_retry() {
        let ledger = InjectionLedger::new();
        let id = target().identity();

        drop(ledger.claim(id));
        assert!(!ledger.is_injected(id));
        assert!(matches!(ledger.claim(id), Claim::Acquired(_)));
    }

    #[test]
    fn test_other_thread_waits_for_completion() {
        let ledger = InjectionLedger::new();
        let target = target();
        let id = target.identity();
        let finished = Arc::new(AtomicBool::new(false));

        let guard = match ledger.claim(id) {
            Claim::Acquired(guard) => guard,
            Claim::Skip => panic!("first claim must be acquired"),
        };

        let waiter = {
            let ledger = Arc::clone(&ledger);
            let finished = Arc::clone(&finished);
            thread::spawn(move || {
                let skipped = matches!(ledger.claim(id), Claim::Skip);
                (skipped, finished.load(Ordering::SeqCst))
            })
        };

        thread::sleep(Duration::from_millis(50));
        finished.store(true, Ordering::SeqCst);
        guard.complete(&target);

        let (skipped, saw_finished) = waiter.join().unwrap();
        assert!(skipped);
        assert!(saw_finished);
    }
}
