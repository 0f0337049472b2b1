use dioxus::prelude::*;

mod api;
mod components;
mod feed;
mod player;
mod prefs;

use components::AppView;

const APP_CSS: Asset = asset!("/assets/styling/app.css");

/// Adaptive-streaming client, loaded from a CDN so the bundle stays lean.
/// Playback falls back to native HLS or a direct source when it is absent.
const HLS_JS_SRC: &str = "https://cdn.jsdelivr.net/npm/hls.js@1.5.20/dist/hls.min.js";

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        document::Meta { name: "theme-color", content: "#000000" }
        document::Stylesheet { href: APP_CSS }
        document::Script { src: HLS_JS_SRC }
        Router::<AppView> {}
    }
}
