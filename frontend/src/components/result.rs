//! Conversion result: transformation details, preview and download.

use leptos::*;

use crate::services::download_csv;
use crate::types::ConvertResponse;

#[component]
pub fn ResultSection(
    result: ReadSignal<Option<ConvertResponse>>,
    set_error: WriteSignal<Option<String>>,
) -> impl IntoView {
    let columns = move || result.get().map(|r| r.columns).unwrap_or_default();
    let rows = move || {
        result
            .get()
            .map(|r| {
                r.preview
                    .iter()
                    .map(|row| {
                        r.columns
                            .iter()
                            .map(|c| match row.get(c) {
                                Some(serde_json::Value::String(s)) => s.clone(),
                                Some(other) => other.to_string(),
                                None => String::new(),
                            })
                            .collect::<Vec<_>>()
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
    };

    let on_download = move |_| {
        if let Some(r) = result.get_untracked() {
            if let Err(e) = download_csv(&r.file_name, &r.csv) {
                set_error.set(Some(e.to_string()));
            }
        }
    };

    view! {
        <div class="result-section">
            <div class="result-header">
                <div class="result-title">
                    {move || result.get().map(|r| format!("✅ {} rows converted", r.row_count))}
                </div>
                <button class="btn btn-primary" on:click=on_download>
                    {move || result.get().map(|r| format!("Download {}", r.file_name))}
                </button>
            </div>

            <Show when=move || result.get().is_some_and(|r| !r.details.is_empty())>
                <div class="details">
                    <div class="details-title">"Transformation details"</div>
                    <ul>
                        {move || {
                            result
                                .get()
                                .map(|r| r.details)
                                .unwrap_or_default()
                                .into_iter()
                                .map(|line| view! { <li>{line}</li> })
                                .collect_view()
                        }}
                    </ul>
                </div>
            </Show>

            <div class="preview-table">
                <table>
                    <thead>
                        <tr>
                            {move || columns().into_iter().map(|c| view! { <th>{c}</th> }).collect_view()}
                        </tr>
                    </thead>
                    <tbody>
                        {move || {
                            rows()
                                .into_iter()
                                .map(|cells| {
                                    view! {
                                        <tr>
                                            {cells.into_iter().map(|v| view! { <td>{v}</td> }).collect_view()}
                                        </tr>
                                    }
                                })
                                .collect_view()
                        }}
                    </tbody>
                </table>
            </div>

            <div class="csv-info">
                {move || {
                    result.get().map(|r| {
                        format!(
                            "Input: {} encoding, '{}' delimiter, {} rows",
                            r.csv_info.encoding,
                            r.csv_info.delimiter,
                            r.csv_info.row_count
                        )
                    })
                }}
            </div>
        </div>
    }
}
