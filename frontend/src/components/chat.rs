//! 聊天页
//!
//! 会话状态由 `ChatSession` 维护；本组件只负责把它接到界面与页面生命周期上：
//! - 页面卸载 → `on_page_unload`
//! - 组件销毁（站内跳转、注销） → `on_teardown`

use consultorio_shared::{ChatMessage, ChatSender};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{ConsultorioApi, use_api};
use crate::auth::{SessionView, use_auth};
use crate::chat::{ChatSession, ConversationPhase};
use crate::components::notice::{Flash, Notice};
use crate::web::lifecycle::PageUnloadHook;
use crate::web::storage::BrowserStorage;

type BrowserChat = ChatSession<BrowserStorage, ConsultorioApi>;

#[component]
pub fn ChatPage() -> impl IntoView {
    let auth = use_auth();
    let api = use_api();

    let Some(principal) = auth.current_principal() else {
        return ().into_any();
    };

    let session = StoredValue::new_local(BrowserChat::open(
        principal.identifier,
        BrowserStorage,
        api.clone(),
    ));
    let messages = RwSignal::new(session.with_value(|s| s.messages()));
    let closed = RwSignal::new(session.with_value(|s| s.phase() == ConversationPhase::Closed));
    let draft = RwSignal::new(String::new());
    let (is_busy, set_is_busy) = signal(false);
    let flash = RwSignal::new(None::<Flash>);

    let refresh = move || {
        if let Some(s) = session.try_get_value() {
            messages.set(s.messages());
            closed.set(s.phase() == ConversationPhase::Closed);
        }
    };

    // 监听器随组件销毁一起移除
    let unload_hook = PageUnloadHook::register(move || {
        session.try_with_value(|s| s.on_page_unload());
    });
    if unload_hook.is_none() {
        log_warn!("[Chat] 无法注册页面卸载监听");
    }
    let _unload_hook = StoredValue::new_local(unload_hook);

    on_cleanup(move || {
        if let Some(s) = session.try_get_value() {
            s.on_teardown();
        }
    });

    let on_send = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let text = draft.get().trim().to_string();
        if text.is_empty() || is_busy.get_untracked() {
            return;
        }

        draft.set(String::new());
        set_is_busy.set(true);
        let chat = session.get_value();
        let api = api.clone();

        // 先行显示用户消息，回复到达后以会话记录为准
        messages.update(|m| m.push(ChatMessage::user(text.clone())));

        spawn_local(async move {
            if let Err(e) = chat.exchange(&text, &api).await {
                flash.set(Some(Flash::from_error("El asistente no respondió", &e)));
            }
            refresh();
            set_is_busy.set(false);
        });
    };

    let on_end = move |_| {
        set_is_busy.set(true);
        let chat = session.get_value();
        spawn_local(async move {
            chat.end_conversation().await;
            refresh();
            set_is_busy.set(false);
        });
    };

    view! {
        <div class="max-w-3xl mx-auto p-4 space-y-4">
            <div class="flex items-center justify-between">
                <h2 class="text-2xl font-bold">"Asistente"</h2>
                <button
                    class="btn btn-outline btn-sm"
                    disabled=move || is_busy.get() || closed.get() || messages.with(Vec::is_empty)
                    on:click=on_end
                >
                    "Finalizar conversación"
                </button>
            </div>

            <Notice flash=flash />

            <div class="card bg-base-100 shadow min-h-[50vh]">
                <div class="card-body space-y-2">
                    <Show when=move || messages.with(Vec::is_empty)>
                        <p class="text-base-content/50 text-center">
                            "Cuéntame cómo te sientes hoy."
                        </p>
                    </Show>
                    <For
                        each=move || messages.get().into_iter().enumerate()
                        key=|(i, m)| (*i, m.text.clone())
                        children=move |(_, message)| view! { <Bubble message=message /> }
                    />
                    <Show when=move || is_busy.get()>
                        <span class="loading loading-dots loading-sm"></span>
                    </Show>
                </div>
            </div>

            <form class="join w-full" on:submit=on_send>
                <input
                    class="input input-bordered join-item flex-1"
                    placeholder="Escribe tu mensaje..."
                    on:input=move |ev| draft.set(event_target_value(&ev))
                    prop:value=draft
                    disabled=move || is_busy.get()
                />
                <button class="btn btn-primary join-item" disabled=move || is_busy.get()>
                    "Enviar"
                </button>
            </form>
        </div>
    }
    .into_any()
}

#[component]
fn Bubble(message: ChatMessage) -> impl IntoView {
    let (align, color) = match message.sender {
        ChatSender::User => ("chat chat-end", "chat-bubble chat-bubble-primary"),
        ChatSender::Bot => ("chat chat-start", "chat-bubble"),
    };
    view! {
        <div class=align>
            <div class=color>{message.text}</div>
        </div>
    }
}
