use crate::api::CatalogClient;
use crate::components::{SlidePlaceholder, VideoSlide};
use crate::feed::{FeedSession, SlideWindow, Step, WheelGate};
use crate::player::web;
use crate::prefs::{self, LocalPrefs};
use dioxus::html::geometry::WheelDelta;
use dioxus::logger::tracing::warn;
use dioxus::prelude::*;

/// Wheel events reported in lines or pages are normalized to pixels before
/// they reach the accumulator.
const LINE_SCROLL_PX: f64 = 40.0;
const PAGE_SCROLL_PX: f64 = 800.0;

/// Minimum vertical travel for a drag to count as a swipe.
const SWIPE_THRESHOLD_PX: f64 = 60.0;

/// Kick off a catalog fetch unless one is already running. The exclude-id
/// snapshot is taken synchronously so a reset-at-cap happens exactly once.
fn spawn_page_load(mut session: Signal<FeedSession>) {
    let Some(exclude) = session.with_mut(|s| s.begin_load()) else {
        return;
    };
    spawn(async move {
        match CatalogClient::default().random_page(&exclude).await {
            Ok(page) => session.with_mut(|s| s.complete_load(page)),
            Err(err) => {
                warn!("feed page fetch failed: {err}");
                session.with_mut(|s| s.fail_load());
            }
        }
    });
}

/// One confirmed slide transition: retire the guide, enforce that only the
/// new active slide plays, and top up the feed when the tail comes into view.
fn apply_step(mut session: Signal<FeedSession>, mut show_guide: Signal<bool>, step: Step) {
    let Some(change) = session.with_mut(|s| s.step(step)) else {
        return;
    };
    if *show_guide.peek() {
        prefs::mark_guide_seen(&LocalPrefs::default());
        show_guide.set(false);
    }
    let active_id = session.peek().active_item().map(|item| item.id.clone());
    if let Some(id) = active_id {
        web::play_only(&id);
    }
    if change.reached_tail {
        spawn_page_load(session);
    }
}

fn finish_swipe(
    session: Signal<FeedSession>,
    show_guide: Signal<bool>,
    mut swipe_origin: Signal<Option<f64>>,
    end_y: Option<f64>,
) {
    let Some(start_y) = swipe_origin.take() else {
        return;
    };
    let Some(end_y) = end_y else {
        return;
    };
    let travel = start_y - end_y;
    if travel.abs() < SWIPE_THRESHOLD_PX {
        return;
    }
    let step = if travel > 0.0 {
        Step::Advance
    } else {
        Step::Retreat
    };
    apply_step(session, show_guide, step);
}

#[component]
pub fn FeedScroller(locale: String) -> Element {
    let session = use_signal(FeedSession::new);
    let mut wheel_gate = use_signal(WheelGate::new);
    let mut show_guide = use_signal(|| false);
    let mut swipe_origin = use_signal(|| None::<f64>);
    let window = use_hook(SlideWindow::default);

    use_hook(move || {
        if !prefs::has_seen_guide(&LocalPrefs::default()) {
            show_guide.set(true);
        }
        spawn_page_load(session);
    });

    let on_wheel = move |evt: Event<WheelData>| {
        let delta = match evt.delta() {
            WheelDelta::Pixels(v) => v.y,
            WheelDelta::Lines(v) => v.y * LINE_SCROLL_PX,
            WheelDelta::Pages(v) => v.y * PAGE_SCROLL_PX,
        };
        if let Some(step) = wheel_gate.with_mut(|gate| gate.on_delta(delta, web::now_ms())) {
            apply_step(session, show_guide, step);
        }
    };

    let snapshot = session();
    if snapshot.is_loading() {
        return rsx! {
            div { class: "feed-spinner-wrap",
                div { class: "feed-spinner" }
            }
        };
    }

    let active = snapshot.active();
    let offset_pct = active * 100;

    rsx! {
        div {
            class: "feed-viewport",
            onwheel: on_wheel,
            onpointerdown: move |evt| swipe_origin.set(Some(evt.client_coordinates().y)),
            onpointerup: move |evt| {
                finish_swipe(session, show_guide, swipe_origin, Some(evt.client_coordinates().y))
            },
            onpointercancel: move |_| finish_swipe(session, show_guide, swipe_origin, None),
            div {
                class: "feed-track",
                style: "transform: translateY(-{offset_pct}%);",
                for (index, item) in snapshot.items().iter().enumerate() {
                    div { class: "feed-slide", key: "{item.id}",
                        if window.is_live(active, index) {
                            VideoSlide {
                                item: item.clone(),
                                active: index == active,
                                locale: locale.clone(),
                            }
                        } else {
                            SlidePlaceholder {
                                poster: item.thumbnail_url.clone(),
                                title: item.title_for(&locale).to_string(),
                            }
                        }
                    }
                }
            }
            if snapshot.is_empty() {
                div { class: "feed-empty", "Nothing to play right now." }
            }
            if show_guide() {
                div { class: "swipe-guide",
                    span { class: "swipe-guide-hand", "☝" }
                    p { "Swipe up for the next video" }
                }
            }
        }
    }
}
