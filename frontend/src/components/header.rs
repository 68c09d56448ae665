//! Top bar with the engine and grid status

use leptos::*;

use crate::types::OptionsResponse;
use crate::APP_NAME;

#[component]
pub fn Header(options: Resource<(), Option<OptionsResponse>>) -> impl IntoView {
    let status = move || match options.get() {
        None => ("status-dot", "Connecting...".to_string()),
        Some(None) => ("status-dot offline", "Backend unavailable".to_string()),
        Some(Some(opts)) => {
            let grids = opts
                .vertical_datums
                .iter()
                .filter(|d| !d.ellipsoidal && d.available)
                .count();
            ("status-dot connected", format!("{} engine, {} geoid grids", opts.engine, grids))
        }
    };

    view! {
        <header>
            <div class="header-left">
                <a href="/" class="logo">{APP_NAME}</a>
                <span class="badge">"Camera locations"</span>
            </div>
            <div class="header-right">
                <div class="engine-status">
                    <span class=move || status().0></span>
                    <span>{move || status().1}</span>
                </div>
            </div>
        </header>
    }
}
