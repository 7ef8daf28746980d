//! 对话相关的外部协作者
//!
//! - `ChatBot`: 发送一轮对话并取得回复
//! - `ConversationReporter`: 对话结束时通知后端

use async_trait::async_trait;
use consultorio_shared::{ChatTurnReply, ChatTurnRequest, ConversationReport};

use crate::error::ClientResult;

#[async_trait(?Send)]
pub trait ChatBot {
    async fn reply(&self, turn: &ChatTurnRequest) -> ClientResult<ChatTurnReply>;
}

/// "发出即忘"投递方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// `sendBeacon`，用于页面卸载：不阻塞导航
    Beacon,
    /// keep-alive fetch，用于组件销毁：请求可以比组件活得更久
    KeepAlive,
}

#[async_trait(?Send)]
pub trait ConversationReporter {
    /// 等待投递结果
    async fn report(&self, report: &ConversationReport) -> ClientResult<()>;

    /// 立即返回，不等待也不保证送达；丢失是可接受的
    fn dispatch(&self, report: &ConversationReport, mode: DispatchMode);
}
