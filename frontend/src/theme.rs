//! 主题偏好
//!
//! `light` / `dark` 持久化在 `consultorio.theme`，
//! 通过 `<html data-theme>` 生效。

use consultorio_shared::KEY_THEME;
use leptos::prelude::*;

use crate::web::storage::{BrowserStorage, KeyValueStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// 无法识别的值返回 `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// 设置 `<html data-theme>`
#[cfg(target_arch = "wasm32")]
fn apply_to_document(theme: Theme) {
    let Some(root) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    else {
        return;
    };
    if root.set_attribute("data-theme", theme.as_str()).is_err() {
        log_warn!("[Theme] 无法设置 data-theme");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn apply_to_document(_theme: Theme) {}

#[derive(Clone, Copy)]
pub struct ThemeContext<S = BrowserStorage> {
    theme: RwSignal<Theme>,
    store: S,
}

impl<S: KeyValueStore> ThemeContext<S> {
    /// 读取保存的偏好；缺失或无法识别时使用浅色
    pub fn load(store: S) -> Self {
        let theme = store
            .get(KEY_THEME)
            .and_then(|raw| Theme::parse(&raw))
            .unwrap_or_default();
        Self {
            theme: RwSignal::new(theme),
            store,
        }
    }

    pub fn theme(&self) -> Signal<Theme> {
        self.theme.into()
    }

    pub fn set(&self, theme: Theme) {
        self.theme.set(theme);
        if !self.store.set(KEY_THEME, theme.as_str()) {
            log_warn!("[Theme] 无法保存主题偏好");
        }
        apply_to_document(theme);
    }

    pub fn toggle(&self) {
        self.set(self.theme.get_untracked().toggled());
    }
}

pub fn provide_theme() -> ThemeContext {
    let ctx = ThemeContext::load(BrowserStorage);
    apply_to_document(ctx.theme.get_untracked());
    provide_context(ctx);
    ctx
}

pub fn use_theme() -> Option<ThemeContext> {
    use_context::<ThemeContext>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::storage::MemoryStore;

    #[test]
    fn defaults_to_light() {
        let ctx = ThemeContext::load(MemoryStore::new());
        assert_eq!(ctx.theme().get_untracked(), Theme::Light);
    }

    #[test]
    fn toggle_persists_across_reload() {
        let store = MemoryStore::new();
        ThemeContext::load(store.clone()).toggle();
        assert_eq!(store.get(KEY_THEME).as_deref(), Some("dark"));

        let reloaded = ThemeContext::load(store);
        assert_eq!(reloaded.theme().get_untracked(), Theme::Dark);
    }

    #[test]
    fn unknown_value_falls_back_to_light() {
        let store = MemoryStore::new();
        store.set(KEY_THEME, "sepia");
        assert_eq!(ThemeContext::load(store).theme().get_untracked(), Theme::Light);
    }
}
