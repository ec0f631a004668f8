// 键值存储
//
// 会话级偏好（语言、收藏）通过注入的 KeyValueStore 读写，
// 生产环境使用 SQLite 实现，测试使用内存实现。

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::broadcast;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// 订阅通道容量
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 64;

/// 存储变更事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub key: String,
    pub value: Option<String>,
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;

    /// 订阅之后发生的所有变更
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}

/// 发送变更事件；没有订阅者时忽略
pub(crate) fn notify(sender: &broadcast::Sender<StoreEvent>, key: &str, value: Option<&str>) {
    let _ = sender.send(StoreEvent {
        key: key.to_string(),
        value: value.map(str::to_string),
    });
}
