//! 页面生命周期监听
//!
//! 封装 `pagehide` 事件：页面卸载（关闭标签、刷新、跳转到站外）时触发。
//! 当 `PageUnloadHook` 被 drop 时，自动移除监听器。

use wasm_bindgen::prelude::*;

const UNLOAD_EVENT: &str = "pagehide";

pub struct PageUnloadHook {
    closure: Closure<dyn Fn()>,
}

impl PageUnloadHook {
    /// 注册卸载回调
    ///
    /// 回调中只能做同步工作或"发出即忘"的投递，浏览器不会等待异步任务。
    /// 无法获取 window 对象时返回 `None`。
    pub fn register<F>(callback: F) -> Option<Self>
    where
        F: Fn() + 'static,
    {
        let closure = Closure::<dyn Fn()>::new(callback);
        let window = web_sys::window()?;
        window
            .add_event_listener_with_callback(UNLOAD_EVENT, closure.as_ref().unchecked_ref())
            .ok()?;
        Some(Self { closure })
    }

    /// 移除监听器
    ///
    /// 通常不需要手动调用，drop 时会自动移除。
    pub fn cancel(&self) {
        if let Some(window) = web_sys::window() {
            let _ = window.remove_event_listener_with_callback(
                UNLOAD_EVENT,
                self.closure.as_ref().unchecked_ref(),
            );
        }
    }
}

impl Drop for PageUnloadHook {
    fn drop(&mut self) {
        self.cancel();
    }
}
