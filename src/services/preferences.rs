// 会话偏好：收藏列表与界面语言
//
// 数据以 JSON 字符串保存在 KeyValueStore 中，
// 键格式为 `favorites:{session}` / `language:{session}`。

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::models::Language;
use crate::store::KeyValueStore;

const MAX_SESSION_LEN: usize = 64;
const MAX_FAVORITES: usize = 200;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FavoriteToggle {
    pub vehicle_id: String,
    pub favorite: bool,
    pub favorites: Vec<String>,
}

pub struct PreferencesService {
    store: Arc<dyn KeyValueStore>,
    /// 串行化收藏列表的读-改-写
    favorites_lock: Mutex<()>,
}

impl PreferencesService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            favorites_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub async fn favorites(&self, session: &str) -> Result<Vec<String>> {
        let raw = self.store.get(&favorites_key(session)).await?;
        let favorites = match raw {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Discarding malformed favorites for session {}: {}", session, e);
                Vec::new()
            }),
            None => Vec::new(),
        };
        Ok(favorites)
    }

    /// 切换收藏状态，返回切换后的结果
    pub async fn toggle_favorite(&self, session: &str, vehicle_id: &str) -> Result<FavoriteToggle> {
        let _guard = self.favorites_lock.lock().await;
        let mut favorites = self.favorites(session).await?;

        let favorite = match favorites.iter().position(|id| id == vehicle_id) {
            Some(index) => {
                favorites.remove(index);
                false
            }
            None => {
                if favorites.len() >= MAX_FAVORITES {
                    favorites.remove(0);
                }
                favorites.push(vehicle_id.to_string());
                true
            }
        };

        self.store
            .set(&favorites_key(session), &serde_json::to_string(&favorites)?)
            .await?;

        Ok(FavoriteToggle {
            vehicle_id: vehicle_id.to_string(),
            favorite,
            favorites,
        })
    }

    /// 未设置或无法识别时返回默认语言
    pub async fn language(&self, session: &str) -> Result<Language> {
        let stored = self.store.get(&language_key(session)).await?;
        Ok(Language::from_code_or_default(stored.as_deref()))
    }

    pub async fn set_language(&self, session: &str, language: Language) -> Result<()> {
        self.store.set(&language_key(session), language.code()).await
    }
}

/// 会话 ID 只允许字母、数字、`-` 和 `_`
pub fn is_valid_session(session: &str) -> bool {
    !session.is_empty()
        && session.len() <= MAX_SESSION_LEN
        && session
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn favorites_key(session: &str) -> String {
    format!("favorites:{}", session)
}

fn language_key(session: &str) -> String {
    format!("language:{}", session)
}
