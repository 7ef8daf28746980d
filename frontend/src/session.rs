//! 本地会话存储
//!
//! 将当前 `Principal` 持久化到固定键，刷新页面后恢复。
//! 损坏的数据被视为"没有会话"并当场清除，不向调用方报错。

use consultorio_shared::{KEY_SESSION, Principal};

use crate::web::storage::{KeyValueStore, read_json_or_purge, write_json};

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn save(&self, principal: &Principal) {
        if !write_json(&self.store, KEY_SESSION, principal) {
            log_warn!("[Session] 无法写入本地会话");
        }
    }

    pub fn load(&self) -> Option<Principal> {
        read_json_or_purge(&self.store, KEY_SESSION)
    }

    pub fn clear(&self) {
        self.store.delete(KEY_SESSION);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::storage::MemoryStore;

    #[test]
    fn save_then_load_from_fresh_store() {
        let backing = MemoryStore::new();
        let p = Principal::new("u1", "Ana").with_admin_flag(true);
        SessionStore::new(backing.clone()).save(&p);

        // 模拟刷新：新的 SessionStore 实例读取同一份存储
        let reloaded = SessionStore::new(backing).load();
        assert_eq!(reloaded, Some(p));
    }

    #[test]
    fn corrupt_entry_is_treated_as_absent_and_purged() {
        let backing = MemoryStore::new();
        backing.set(KEY_SESSION, "{\"identifier\": 3");

        let store = SessionStore::new(backing.clone());
        assert_eq!(store.load(), None);
        assert!(!backing.contains(KEY_SESSION));
    }

    #[test]
    fn wrong_shape_is_also_corrupt() {
        let backing = MemoryStore::new();
        backing.set(KEY_SESSION, "[\"u1\"]");
        assert_eq!(SessionStore::new(backing.clone()).load(), None);
        assert!(!backing.contains(KEY_SESSION));
    }

    #[test]
    fn clear_removes_session() {
        let backing = MemoryStore::new();
        let store = SessionStore::new(backing.clone());
        store.save(&Principal::new("u1", "Ana"));
        store.clear();
        assert_eq!(store.load(), None);
        assert!(backing.is_empty());
    }
}
