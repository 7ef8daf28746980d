//! 本地存储封装模块
//!
//! `KeyValueStore` 抽象出同步的键值存储：
//! - `BrowserStorage`: 基于 `web_sys::Storage` 的浏览器 LocalStorage
//! - `MemoryStore`: 进程内存实现，用于测试

#[cfg(test)]
use std::cell::{Cell, RefCell};
#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::rc::Rc;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::{ClientError, ClientResult};

/// 抽象存储接口
///
/// 只在 UI 线程上调用，后写者覆盖先写者，不做并发控制。
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    /// 返回操作是否成功
    fn set(&self, key: &str, value: &str) -> bool;
    /// 返回操作是否成功
    fn delete(&self, key: &str) -> bool;
}

// =========================================================
// JSON 读写工具
// =========================================================

/// 读取并解析 JSON，无法解析时返回 `StorageCorrupt`
pub fn read_json<T: DeserializeOwned, S: KeyValueStore + ?Sized>(
    store: &S,
    key: &str,
) -> ClientResult<Option<T>> {
    match store.get(key) {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|e| {
            ClientError::storage_corrupt(e.to_string()).in_op_with("storage.read_json", key)
        }),
    }
}

/// 读取 JSON；损坏的条目会被删除并视为不存在
pub fn read_json_or_purge<T: DeserializeOwned, S: KeyValueStore + ?Sized>(
    store: &S,
    key: &str,
) -> Option<T> {
    match read_json(store, key) {
        Ok(value) => value,
        Err(e) => {
            log_warn!("[Storage] 丢弃损坏的条目: {}", e);
            store.delete(key);
            None
        }
    }
}

/// 序列化并写入 JSON，返回操作是否成功
pub fn write_json<T: Serialize + ?Sized, S: KeyValueStore + ?Sized>(
    store: &S,
    key: &str,
    value: &T,
) -> bool {
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, &raw),
        Err(e) => {
            log_error!("[Storage] 序列化失败 {}: {}", key, e);
            false
        }
    }
}

// =========================================================
// 浏览器实现 (Production)
// =========================================================

/// 浏览器 LocalStorage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    fn delete(&self, key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}

// =========================================================
// 内存实现
// =========================================================

/// 内存键值存储
///
/// 克隆体共享同一份数据，可模拟"刷新页面后重新读取"。
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: Rc<RefCell<HashMap<String, String>>>,
    reads: Rc<Cell<usize>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `get` 被调用的次数
    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.borrow().is_empty()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.reads.set(self.reads.get() + 1);
        self.map.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.map
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn delete(&self, key: &str) -> bool {
        self.map.borrow_mut().remove(key);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientErrorKind;

    #[test]
    fn clones_share_data() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("k", "v");
        assert_eq!(other.get("k"), Some("v".to_string()));
        assert!(other.delete("k"));
        assert!(!store.contains("k"));
    }

    #[test]
    fn read_json_reports_corruption() {
        let store = MemoryStore::new();
        store.set("k", "{not json");
        let err = read_json::<u32, _>(&store, "k").unwrap_err();
        assert_eq!(err.kind, ClientErrorKind::StorageCorrupt);
        // 严格读取不会删除
        assert!(store.contains("k"));
    }

    #[test]
    fn read_json_or_purge_removes_corrupt_entry() {
        let store = MemoryStore::new();
        store.set("k", "[1, 2");
        assert_eq!(read_json_or_purge::<Vec<u32>, _>(&store, "k"), None);
        assert!(!store.contains("k"));
    }

    #[test]
    fn write_then_read_json() {
        let store = MemoryStore::new();
        assert!(write_json(&store, "k", &vec![1u32, 2, 3]));
        assert_eq!(
            read_json_or_purge::<Vec<u32>, _>(&store, "k"),
            Some(vec![1, 2, 3])
        );
        assert_eq!(store.reads(), 1);
    }
}
