//! Hero section component

use leptos::*;

#[component]
pub fn Hero() -> impl IntoView {
    view! {
        <div class="hero">
            <h1>"Camera Location Converter"</h1>
            <p class="subtitle">
                "Transform aerial camera positions between ITRF, NAD83(CSRS) and WGS84, "
                "across epochs, coordinate types and vertical datums. "
                "All other columns are kept as they are."
            </p>
        </div>
    }
}
