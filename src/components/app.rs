use crate::components::FeedScroller;
use dioxus::prelude::*;

#[derive(Clone, PartialEq, Routable)]
pub enum AppView {
    #[route("/")]
    FeedView {},
}

/// Two-letter locale from the browser, used only to pick which entry of the
/// locale-keyed title map to display.
fn detect_locale() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(language) = web_sys::window().and_then(|w| w.navigator().language()) {
            if language.len() >= 2 {
                return language[..2].to_ascii_lowercase();
            }
        }
    }
    "en".to_string()
}

fn tab_label(tab: &str, locale: &str) -> &'static str {
    match (tab, locale) {
        ("all", "th") => "ทั้งหมด",
        ("all", _) => "All",
        _ => "All",
    }
}

#[component]
pub fn FeedView() -> Element {
    let locale = use_hook(detect_locale);
    let mut active_tab = use_signal(|| "all".to_string());

    let tabs = ["all"];
    let locale_for_tabs = locale.clone();

    rsx! {
        main { class: "feed-shell",
            header { class: "feed-header",
                span { class: "feed-logo", "reelscroll" }
                nav { class: "feed-tabs",
                    for tab in tabs {
                        button {
                            class: if active_tab() == tab { "feed-tab feed-tab--active" } else { "feed-tab" },
                            onclick: move |_| active_tab.set(tab.to_string()),
                            "{tab_label(tab, &locale_for_tabs)}"
                        }
                    }
                }
                div { class: "feed-header-spacer" }
            }
            FeedScroller { locale }
        }
    }
}
