//! Real-time log streaming using Server-Sent Events (SSE).
//!
//! Each conversion gets its own job id. The page follows
//! `/api/logs?job=<id>` for that job only and displays its entries with
//! auto-scroll support.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{EventSource, MessageEvent};

use crate::{LogEntry, LogLevel, BACKEND_URL, MAX_LOG_ENTRIES};

/// Request animation frame helper for smooth scrolling
fn request_animation_frame(f: impl FnOnce() + 'static) {
    let closure = Closure::once(f);
    if let Some(window) = web_sys::window() {
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

fn now() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Parse an SSE payload and stamp it with the local arrival time
pub fn parse_sse_log(json: &str) -> Option<LogEntry> {
    let mut entry: LogEntry = serde_json::from_str(json).ok()?;
    entry.timestamp = now();
    Some(entry)
}

/// Append a locally generated entry
pub fn push_log(set_logs: WriteSignal<Vec<LogEntry>>, level: LogLevel, message: impl Into<String>) {
    let message = message.into();
    log::info!("{}", message);
    set_logs.update(|logs| {
        logs.push(LogEntry {
            level,
            message,
            indent: 0,
            job: None,
            timestamp: now(),
        });
        if logs.len() > MAX_LOG_ENTRIES {
            logs.remove(0);
        }
    });
}

/// URL of the log stream for one job
pub fn job_logs_url(backend_url: &str, job: &str) -> String {
    format!("{}/api/logs?job={}", backend_url, job)
}

thread_local! {
    static CURRENT_STREAM: RefCell<Option<EventSource>> = const { RefCell::new(None) };
}

/// Follow the log stream of `job`, replacing the previous job's stream.
///
/// `on_ready` runs once, as soon as the stream is open (or has failed to
/// open), so the upload starts only after its first entries can be seen.
pub fn follow_job(job: &str, set_logs: WriteSignal<Vec<LogEntry>>, on_ready: impl FnOnce() + 'static) {
    let ready: Rc<RefCell<Option<Box<dyn FnOnce()>>>> = Rc::new(RefCell::new(Some(Box::new(on_ready))));
    let fire = {
        let ready = Rc::clone(&ready);
        move || {
            if let Some(f) = ready.borrow_mut().take() {
                f();
            }
        }
    };

    CURRENT_STREAM.with(|current| {
        if let Some(previous) = current.borrow_mut().take() {
            previous.close();
        }
    });

    let event_source = match EventSource::new(&job_logs_url(BACKEND_URL, job)) {
        Ok(es) => es,
        Err(e) => {
            log::error!("Failed to create EventSource: {:?}", e);
            fire();
            return;
        }
    };

    let onmessage = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Some(data) = event.data().as_string() {
            if let Some(entry) = parse_sse_log(&data) {
                set_logs.update(|logs| {
                    logs.push(entry);
                    if logs.len() > MAX_LOG_ENTRIES {
                        logs.remove(0);
                    }
                });
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);
    event_source.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();

    let onopen = {
        let fire = fire.clone();
        Closure::wrap(Box::new(move |_: web_sys::Event| fire()) as Box<dyn FnMut(web_sys::Event)>)
    };
    event_source.set_onopen(Some(onopen.as_ref().unchecked_ref()));
    onopen.forget();

    let onerror = Closure::wrap(Box::new(move |_: web_sys::Event| {
        log::warn!("SSE connection error - will auto-reconnect");
        fire();
    }) as Box<dyn FnMut(web_sys::Event)>);
    event_source.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onerror.forget();

    CURRENT_STREAM.with(|current| *current.borrow_mut() = Some(event_source));
    log::info!("📡 Following logs of job {}", job);
}

/// Real-time logs panel component (display only, SSE is initialized elsewhere)
#[component]
pub fn LogsPanel(logs: ReadSignal<Vec<LogEntry>>, set_logs: WriteSignal<Vec<LogEntry>>) -> impl IntoView {
    let logs_container = create_node_ref::<leptos::html::Div>();

    create_effect(move |_| {
        let _ = logs.get();
        if let Some(container) = logs_container.get() {
            request_animation_frame(move || {
                container.set_scroll_top(container.scroll_height());
            });
        }
    });

    view! {
        <div class="logs-panel">
            <div class="logs-header">
                <span class="logs-title">"📋 Conversion Logs"</span>
                <button class="logs-clear" on:click=move |_| set_logs.set(vec![])>
                    "Clear"
                </button>
            </div>
            <div class="logs-content" node_ref=logs_container>
                <For
                    each=move || logs.get().into_iter().enumerate()
                    key=|(i, entry)| (*i, entry.timestamp.clone())
                    children=move |(_, entry)| {
                        let style = format!("padding-left: {}em", entry.indent);
                        let job = entry.short_job().map(|j| format!("{} ", j));
                        view! {
                            <div class=format!("log-entry {}", entry.level.css_class()) style=style>
                                <span class="log-time">"[" {entry.timestamp.clone()} "] "</span>
                                <span class="log-job">{job}</span>
                                {entry.message.clone()}
                            </div>
                        }
                    }
                />
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_logs_url() {
        assert_eq!(
            job_logs_url("", "123e4567-e89b-12d3-a456-426614174000"),
            "/api/logs?job=123e4567-e89b-12d3-a456-426614174000"
        );
        assert_eq!(job_logs_url("http://localhost:3000", "abc"), "http://localhost:3000/api/logs?job=abc");
    }

    #[test]
    fn test_parse_sse_log_stamps_time() {
        let entry = parse_sse_log(r#"{"level":"success","message":"Read 2 rows","job":"abc"}"#).unwrap();
        assert_eq!(entry.level, LogLevel::Success);
        assert_eq!(entry.timestamp.len(), 8);
        assert!(parse_sse_log("keep-alive").is_none());
    }
}
