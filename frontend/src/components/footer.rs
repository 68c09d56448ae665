//! Footer component

use leptos::*;

#[component]
pub fn Footer() -> impl IntoView {
    view! {
        <footer>
            <div>
                "camconv " {env!("CARGO_PKG_VERSION")} " • Powered by "
                <span class="rust-badge">"🦀 Rust + Leptos"</span>
            </div>
            <div class="footer-links">
                <a href="/health" class="footer-link" target="_blank">"Health"</a>
                <a href="/api/options" class="footer-link" target="_blank">"Options API"</a>
            </div>
        </footer>
    }
}
