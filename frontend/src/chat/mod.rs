//! 聊天会话缓存
//!
//! 以用户标识为键，把对话记录与画像事实保存在本地存储中。
//! 每个用户的状态机：`Empty → Active → Closed`。
//!
//! 关闭有三个独立触发点，各自幂等：
//! - 用户主动结束：追加结束语，等待上报，清除
//! - 页面卸载：beacon 投递，清除
//! - 组件销毁：keep-alive 投递，清除
//!
//! 上报失败只记录日志，本地数据照常清除。

pub mod facts;
pub mod reporter;

use std::cell::RefCell;
use std::rc::Rc;

use consultorio_shared::{
    ChatMessage, ChatTurnRequest, ConversationReport, MAX_CHAT_HISTORY, ProfileFacts, Timestamp,
    chat_history_key, chat_profile_key,
};

use crate::error::ClientResult;
use crate::web::storage::{KeyValueStore, read_json_or_purge, write_json};
use reporter::{ChatBot, ConversationReporter, DispatchMode};

/// 用户主动结束对话时追加的结束语
pub const CLOSING_MESSAGE: &str =
    "Gracias por conversar conmigo. La conversación ha finalizado; cuídate mucho.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationPhase {
    Empty,
    Active,
    Closed,
}

struct ChatState {
    messages: Vec<ChatMessage>,
    facts: ProfileFacts,
    phase: ConversationPhase,
    /// 每次关闭递增，用于识别请求期间发生的关闭
    closures: u64,
}

struct Inner<S, R> {
    user_id: String,
    store: S,
    reporter: R,
    state: RefCell<ChatState>,
}

/// 单个用户的聊天会话
///
/// 克隆体共享同一份状态。所有借用都在 `.await` 之前释放。
pub struct ChatSession<S, R> {
    inner: Rc<Inner<S, R>>,
}

impl<S, R> Clone for ChatSession<S, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: KeyValueStore, R: ConversationReporter> ChatSession<S, R> {
    /// 打开会话，恢复本地保存的记录与画像
    pub fn open(user_id: impl Into<String>, store: S, reporter: R) -> Self {
        let user_id = user_id.into();
        let messages: Vec<ChatMessage> =
            read_json_or_purge(&store, &chat_history_key(&user_id)).unwrap_or_default();
        let facts: ProfileFacts =
            read_json_or_purge(&store, &chat_profile_key(&user_id)).unwrap_or_default();
        let phase = if messages.is_empty() {
            ConversationPhase::Empty
        } else {
            ConversationPhase::Active
        };

        Self {
            inner: Rc::new(Inner {
                user_id,
                store,
                reporter,
                state: RefCell::new(ChatState {
                    messages,
                    facts,
                    phase,
                    closures: 0,
                }),
            }),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.inner.user_id
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.inner.state.borrow().messages.clone()
    }

    pub fn facts(&self) -> ProfileFacts {
        self.inner.state.borrow().facts.clone()
    }

    pub fn phase(&self) -> ConversationPhase {
        self.inner.state.borrow().phase
    }

    // =========================================================
    // Empty/Active → Active
    // =========================================================

    /// 记录用户消息并尝试提取画像事实
    ///
    /// 返回画像是否被更新。已关闭的对话会以空记录重新开始。
    pub fn record_user_message(&self, text: &str) -> bool {
        self.append(ChatMessage::user(text));

        let extracted = facts::extract(text);
        if extracted.is_empty() {
            return false;
        }

        let updated = {
            let state = self.inner.state.borrow();
            facts::merge(&state.facts, extracted, Timestamp::now())
        };
        match updated {
            Some(new_facts) => {
                write_json(
                    &self.inner.store,
                    &chat_profile_key(&self.inner.user_id),
                    &new_facts,
                );
                self.inner.state.borrow_mut().facts = new_facts;
                true
            }
            None => false,
        }
    }

    pub fn record_bot_message(&self, text: &str) {
        self.append(ChatMessage::bot(text));
    }

    /// 完整的一轮对话：记录用户消息，请求回复，记录回复
    ///
    /// 请求失败时用户消息仍保留在记录中，错误交给调用方展示。
    /// 等待回复期间对话被关闭时，回复被丢弃并返回 `None`。
    pub async fn exchange<B: ChatBot + ?Sized>(
        &self,
        text: &str,
        bot: &B,
    ) -> ClientResult<Option<ChatMessage>> {
        self.record_user_message(text);

        let (facts, closures) = {
            let state = self.inner.state.borrow();
            (state.facts.clone(), state.closures)
        };
        let turn = ChatTurnRequest {
            user_id: self.inner.user_id.clone(),
            message: text.to_string(),
            profile: (!facts.is_empty()).then_some(facts),
        };

        let reply = bot.reply(&turn).await?;
        if self.inner.state.borrow().closures != closures {
            log_info!("[Chat] 对话已关闭，丢弃迟到的回复 ({})", self.inner.user_id);
            return Ok(None);
        }

        let message = ChatMessage::bot(reply.response);
        self.append(message.clone());
        Ok(Some(message))
    }

    fn append(&self, message: ChatMessage) {
        let mut state = self.inner.state.borrow_mut();
        if state.phase == ConversationPhase::Closed {
            state.messages.clear();
            state.facts = ProfileFacts::default();
        }
        state.phase = ConversationPhase::Active;
        state.messages.push(message);

        let len = state.messages.len();
        if len > MAX_CHAT_HISTORY {
            state.messages.drain(..len - MAX_CHAT_HISTORY);
        }

        write_json(
            &self.inner.store,
            &chat_history_key(&self.inner.user_id),
            &state.messages,
        );
    }

    // =========================================================
    // Active → Closed
    // =========================================================

    /// 用户主动结束对话
    ///
    /// 等待上报完成（调用方在此期间禁用输入）。已关闭时不做任何事。
    pub async fn end_conversation(&self) {
        if self.phase() == ConversationPhase::Closed {
            return;
        }

        // 结束语保留在内存中供界面展示，存储随后被清除
        self.append(ChatMessage::bot(CLOSING_MESSAGE));
        let report = self.close();

        if let Err(e) = self.inner.reporter.report(&report).await {
            log_warn!("[Chat] 对话结束上报失败 ({}): {}", report.user_id, e);
        }
    }

    /// 页面卸载：beacon 投递后清除
    pub fn on_page_unload(&self) {
        self.dispatch_and_close(DispatchMode::Beacon);
    }

    /// 组件销毁：对话非空时以 keep-alive 投递后清除
    pub fn on_teardown(&self) {
        self.dispatch_and_close(DispatchMode::KeepAlive);
    }

    fn dispatch_and_close(&self, mode: DispatchMode) {
        if self.phase() != ConversationPhase::Active {
            return;
        }
        let report = self.close();
        self.inner.reporter.dispatch(&report, mode);
    }

    /// 标记为已关闭并清除本地存储，返回待上报的数据
    fn close(&self) -> ConversationReport {
        {
            let mut state = self.inner.state.borrow_mut();
            state.phase = ConversationPhase::Closed;
            state.closures += 1;
        }
        self.purge();
        ConversationReport {
            user_id: self.inner.user_id.clone(),
        }
    }

    /// 删除该用户的对话记录与画像
    pub fn purge(&self) {
        let store = &self.inner.store;
        store.delete(&chat_history_key(&self.inner.user_id));
        store.delete(&chat_profile_key(&self.inner.user_id));
    }
}
