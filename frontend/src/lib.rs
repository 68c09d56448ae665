//! camconv - Frontend Rust/Leptos Application
//!
//! A WebAssembly frontend for converting camera location CSV files between
//! reference frames, epochs, coordinate types and vertical datums.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        App                                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Header (engine status)                                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  MainContent                                                 │
//! │  ├── Hero (title, description)                              │
//! │  ├── UploadSection (file, image type, transform toggle)     │
//! │  ├── ParamsPanel x2 (source, target)                        │
//! │  ├── ResultSection (after conversion)                       │
//! │  └── LogsPanel                                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Footer                                                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`types`] - Wire types shared with the backend
//! - [`components`] - UI components
//! - [`services`] - Backend communication

use leptos::*;
use leptos_router::*;
use wasm_bindgen::prelude::*;

// =============================================================================
// Module declarations
// =============================================================================

pub mod config;
pub mod types;
pub mod components;
pub mod services;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::*;

pub use types::{
    // Logs
    LogEntry, LogLevel,
    // API
    ConvertRequest, ConvertResponse, OptionsResponse, SideSelection,
    // Errors
    AppError, AppResult,
};

pub use components::*;

pub use services::*;

// =============================================================================
// Application Entry Point
// =============================================================================

/// WASM entry point - called automatically by trunk.
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    _ = console_log::init_with_level(log::Level::Debug);

    log::info!("Starting camconv frontend");

    mount_to_body(|| view! { <App/> });
}

#[component]
pub fn App() -> impl IntoView {
    view! {
        <Router>
            <main>
                <Routes>
                    <Route path="/" view=MainContent/>
                </Routes>
            </main>
        </Router>
    }
}

#[component]
fn MainContent() -> impl IntoView {
    let options = create_local_resource(
        || (),
        |_| async move {
            match fetch_options(BACKEND_URL).await {
                Ok(options) => Some(options),
                Err(e) => {
                    log::error!("Could not load options: {}", e);
                    None
                }
            }
        },
    );
    let loaded_options = Signal::derive(move || options.get().flatten());

    let file = create_rw_signal(None::<web_sys::File>);
    let image_type = create_rw_signal(None::<String>);
    let transform = create_rw_signal(true);
    let source = SideForm::new("ITRF14", 2010.0, EpochInput::Date);
    let target = SideForm::new("NAD83CSRS", DEFAULT_TARGET_EPOCH, EpochInput::DecimalYear);

    let (is_processing, set_is_processing) = create_signal(false);
    let (error, set_error) = create_signal(None::<String>);
    let (result, set_result) = create_signal(None::<ConvertResponse>);
    let (logs, set_logs) = create_signal(Vec::<LogEntry>::new());

    let on_convert = Callback::new(move |_: ()| {
        let Some(selected) = file.get_untracked() else {
            set_error.set(Some("Choose a CSV file first".to_string()));
            return;
        };
        let with_transform = transform.get_untracked();
        let job = uuid::Uuid::new_v4().to_string();
        let request = ConvertRequest {
            source: with_transform.then(|| source.selection()),
            target: with_transform.then(|| target.selection()),
            transform: with_transform,
            image_type: image_type.get_untracked(),
            job_id: Some(job.clone()),
        };

        set_error.set(None);
        set_result.set(None);
        set_is_processing.set(true);
        push_log(set_logs, LogLevel::Info, format!("📤 Uploading {}", selected.name()));

        follow_job(&job, set_logs, move || {
            spawn_local(async move {
                match convert_csv(selected, &request, BACKEND_URL).await {
                    Ok(response) => {
                        push_log(
                            set_logs,
                            LogLevel::Success,
                            format!("✅ {} rows converted", response.row_count),
                        );
                        set_result.set(Some(response));
                    }
                    Err(e) => {
                        push_log(set_logs, LogLevel::Error, format!("❌ {}", e));
                        set_error.set(Some(e.to_string()));
                    }
                }
                set_is_processing.set(false);
            });
        });
    });

    let params_disabled = Signal::derive(move || !transform.get() || is_processing.get());

    view! {
        <Header options=options/>

        <div class="container">
            <Hero/>

            <UploadSection
                file=file
                image_type=image_type
                transform=transform
                options=loaded_options
                busy=is_processing
                set_error=set_error
                on_convert=on_convert
            />

            <div class="params">
                <ParamsPanel title="Source" form=source options=loaded_options disabled=params_disabled/>
                <ParamsPanel title="Target" form=target options=loaded_options disabled=params_disabled/>
            </div>

            <Show when=move || error.get().is_some()>
                <div class="error-message">{move || error.get().unwrap_or_default()}</div>
            </Show>

            <Show when=move || result.get().is_some()>
                <ResultSection result=result set_error=set_error/>
            </Show>

            <Show when=move || !logs.get().is_empty()>
                <LogsPanel logs=logs set_logs=set_logs/>
            </Show>
        </div>

        <Footer/>
    }
}
