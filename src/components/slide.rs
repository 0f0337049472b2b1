use crate::api::{format_count, format_timecode, FeedItem};
use crate::components::Icon;
use crate::player::{web, PlaybackState, SourceKind, AUTO_LEVEL};
use dioxus::prelude::*;

#[cfg(target_arch = "wasm32")]
const CONTROLS_HIDE_MS: u32 = 2_000;

/// Show the control chrome and re-arm the auto-hide timer. Each wake bumps an
/// epoch so an older timer that fires late cannot hide freshly woken controls.
fn wake_controls(mut show_controls: Signal<bool>, mut hide_epoch: Signal<u32>) {
    show_controls.set(true);
    let token = hide_epoch.peek().wrapping_add(1);
    hide_epoch.set(token);
    #[cfg(target_arch = "wasm32")]
    spawn(async move {
        gloo_timers::future::TimeoutFuture::new(CONTROLS_HIDE_MS).await;
        if *hide_epoch.peek() == token {
            show_controls.set(false);
        }
    });
    #[cfg(not(target_arch = "wasm32"))]
    let _ = token;
}

/// One live slide: the video element, its control surface, caption, and the
/// like/view rail. The playback session attaches while `active` and is torn
/// down the moment it stops being so, or when the slide leaves the window.
#[component]
pub fn VideoSlide(item: FeedItem, active: ReadOnlySignal<bool>, locale: String) -> Element {
    let state = use_signal(PlaybackState::default);
    let show_controls = use_signal(|| true);
    let hide_epoch = use_signal(|| 0u32);

    let effect_id = item.id.clone();
    let source = item.url.clone();
    use_effect(move || {
        if active() {
            web::attach(&effect_id, &source, state);
        } else {
            web::detach(&effect_id);
        }
    });

    let drop_id = item.id.clone();
    use_drop(move || web::detach(&drop_id));

    let playback = state();
    let live = playback.is_live();
    let duration = playback.duration;
    let is_hls = SourceKind::classify(&item.url) == SourceKind::Hls;
    let played_pct = if live {
        0.0
    } else {
        (playback.time / duration * 100.0).clamp(0.0, 100.0)
    };
    let buffered_pct = if live {
        0.0
    } else {
        (playback.buffered_end.min(duration) / duration * 100.0).clamp(0.0, 100.0)
    };
    let posted = item
        .created_at
        .map(|t| t.format("%b %e, %Y").to_string())
        .unwrap_or_default();

    let surface_id = item.id.clone();
    let badge_id = item.id.clone();
    let seek_id = item.id.clone();
    let mute_id = item.id.clone();
    let volume_id = item.id.clone();
    let quality_id = item.id.clone();
    let fullscreen_id = item.id.clone();

    rsx! {
        section {
            id: "slide-{item.id}",
            class: "slide-stage",
            onmousemove: move |_| wake_controls(show_controls, hide_epoch),
            onpointerdown: move |_| wake_controls(show_controls, hide_epoch),
            video {
                id: "video-{item.id}",
                class: "slide-video",
                poster: "{item.thumbnail_url}",
                preload: "none",
                playsinline: true,
                crossorigin: "anonymous",
                r#loop: true,
                onclick: move |_| web::toggle_play(&surface_id),
            }
            if !playback.playing {
                button {
                    class: "slide-play-badge",
                    onclick: move |_| web::toggle_play(&badge_id),
                    Icon { name: "play".to_string(), class: "slide-play-icon".to_string() }
                }
            }
            div {
                class: if show_controls() { "slide-controls slide-controls--visible" } else { "slide-controls" },
                if !live {
                    div { class: "slide-progress",
                        div {
                            class: "slide-progress-buffered",
                            style: "width: {buffered_pct}%;",
                        }
                        div {
                            class: "slide-progress-played",
                            style: "width: {played_pct}%;",
                        }
                        input {
                            r#type: "range",
                            class: "slide-progress-input",
                            min: "0",
                            max: "{duration}",
                            step: "0.1",
                            value: "{playback.time}",
                            oninput: move |evt| {
                                if let Ok(time) = evt.value().parse::<f64>() {
                                    web::seek(&seek_id, time);
                                }
                            },
                        }
                    }
                    span { class: "slide-timecode",
                        "{format_timecode(playback.time)} / {format_timecode(duration)}"
                    }
                }
                div { class: "slide-control-row",
                    button {
                        class: "slide-control-button",
                        onclick: move |_| web::toggle_mute(&mute_id),
                        if playback.muted || playback.volume == 0.0 {
                            Icon { name: "volume-muted".to_string(), class: "slide-control-icon".to_string() }
                        } else {
                            Icon { name: "volume".to_string(), class: "slide-control-icon".to_string() }
                        }
                    }
                    input {
                        r#type: "range",
                        class: "slide-volume",
                        min: "0",
                        max: "1",
                        step: "0.05",
                        value: "{playback.volume}",
                        oninput: move |evt| {
                            if let Ok(volume) = evt.value().parse::<f64>() {
                                web::set_volume(&volume_id, volume);
                            }
                        },
                    }
                    if is_hls && !playback.levels.is_empty() {
                        select {
                            class: "slide-quality",
                            onchange: move |evt| {
                                if let Ok(level) = evt.value().parse::<i32>() {
                                    web::set_quality(&quality_id, level);
                                }
                            },
                            option {
                                value: "{AUTO_LEVEL}",
                                selected: playback.selected_level == AUTO_LEVEL,
                                "Auto"
                            }
                            for (index, level) in playback.levels.iter().enumerate() {
                                option {
                                    value: "{index}",
                                    selected: playback.selected_level == index as i32,
                                    "{level.height}p"
                                }
                            }
                        }
                    }
                    button {
                        class: "slide-control-button",
                        onclick: move |_| web::toggle_fullscreen(&fullscreen_id),
                        Icon { name: "expand".to_string(), class: "slide-control-icon".to_string() }
                    }
                }
            }
            div { class: "slide-caption",
                span { class: "slide-uploader", "@{item.uploaded_by.name}" }
                p { class: "slide-title", "{item.title_for(&locale)}" }
                if !posted.is_empty() {
                    span { class: "slide-date", "{posted}" }
                }
            }
            div { class: "slide-rail",
                div { class: "slide-rail-item",
                    Icon { name: "heart".to_string(), class: "slide-rail-icon".to_string() }
                    span { "{format_count(item.likes)}" }
                }
                div { class: "slide-rail-item",
                    Icon { name: "eye".to_string(), class: "slide-rail-icon".to_string() }
                    span { "{format_count(item.views)}" }
                }
            }
        }
    }
}

/// Lightweight stand-in for slides outside the live window. Nothing here
/// holds a decoder or a network connection.
#[component]
pub fn SlidePlaceholder(poster: String, title: String) -> Element {
    rsx! {
        div { class: "slide-stage slide-stage--idle",
            img {
                class: "slide-poster",
                src: "{poster}",
                alt: "{title}",
                loading: "lazy",
            }
        }
    }
}
