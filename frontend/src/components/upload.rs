//! CSV upload box with the image type and transform options.

use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, File, HtmlInputElement};

use crate::types::OptionsResponse;
use crate::MAX_FILE_SIZE;

#[component]
pub fn UploadSection(
    file: RwSignal<Option<File>>,
    image_type: RwSignal<Option<String>>,
    transform: RwSignal<bool>,
    options: Signal<Option<OptionsResponse>>,
    #[prop(into)] busy: Signal<bool>,
    set_error: WriteSignal<Option<String>>,
    on_convert: Callback<()>,
) -> impl IntoView {
    let on_file_change = move |ev: Event| {
        let input: HtmlInputElement = event_target(&ev);
        let Some(selected) = input.files().and_then(|files| files.get(0)) else {
            return;
        };
        if selected.size() > MAX_FILE_SIZE {
            set_error.set(Some(format!(
                "{} is larger than {} MB",
                selected.name(),
                MAX_FILE_SIZE / (1024.0 * 1024.0)
            )));
            file.set(None);
            return;
        }
        log::info!("Selected {}", selected.name());
        set_error.set(None);
        file.set(Some(selected));
    };

    let trigger_file_input = move |_| {
        let input = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("fileInput"))
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok());
        if let Some(input) = input {
            input.click();
        }
    };

    let image_types = move || options.get().map(|o| o.image_types).unwrap_or_default();

    view! {
        <div class="upload-section">
            <div class="upload-zone" on:click=trigger_file_input>
                <div class="upload-icon">"📤"</div>
                <div class="upload-text">
                    {move || match file.get() {
                        Some(f) => f.name(),
                        None => "Choose a camera event CSV file".to_string(),
                    }}
                </div>
                <div class="upload-hint">
                    "UTF-8, ISO-8859-1 or Windows-1252; comma, semicolon, tab or pipe delimited"
                </div>
            </div>
            <input
                type="file"
                id="fileInput"
                accept=".csv,.txt"
                style="display:none"
                on:change=on_file_change
            />

            <div class="upload-options">
                <fieldset class="image-type">
                    <legend>"Image type"</legend>
                    <label>
                        <input
                            type="radio"
                            name="imageType"
                            prop:checked=move || image_type.get().is_none()
                            on:change=move |_| image_type.set(None)
                        />
                        "None"
                    </label>
                    <For
                        each=image_types
                        key=|c| c.id.clone()
                        children=move |c| {
                            let id = c.id.clone();
                            let checked_id = c.id.clone();
                            view! {
                                <label title=c.label.clone()>
                                    <input
                                        type="radio"
                                        name="imageType"
                                        prop:checked=move || image_type.get().as_deref() == Some(checked_id.as_str())
                                        on:change=move |_| image_type.set(Some(id.clone()))
                                    />
                                    {c.id}
                                </label>
                            }
                        }
                    />
                </fieldset>

                <label class="transform-toggle">
                    <input
                        type="checkbox"
                        prop:checked=move || transform.get()
                        on:change=move |ev| transform.set(event_target_checked(&ev))
                    />
                    "Transform coordinates?"
                </label>
            </div>

            <button
                class="btn btn-primary"
                prop:disabled=move || file.get().is_none() || busy.get()
                on:click=move |_| on_convert.call(())
            >
                {move || if busy.get() { "⏳ Converting..." } else { "Convert" }}
            </button>
        </div>
    }
}
