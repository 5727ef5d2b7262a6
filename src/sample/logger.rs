//! 日志服务

use parking_lot::Mutex;

/// 日志服务，以 `Arc<dyn LoggerService>` 注册
pub trait LoggerService: Send + Sync {
    fn log(&self, message: &str);
}

/// 把消息转发给 `tracing`
#[derive(Debug, Default)]
pub struct ConsoleLogger;

impl LoggerService for ConsoleLogger {
    fn log(&self, message: &str) {
        tracing::info!(target: "simpledi::sample", "{}", message);
    }
}

/// 在内存中保留消息，便于调用者检查
#[derive(Debug, Default)]
pub struct RecordingLogger {
    messages: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn count(&self, message: &str) -> usize {
        self.messages.lock().iter().filter(|m| *m == message).count()
    }
}

impl LoggerService for RecordingLogger {
    fn log(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}
