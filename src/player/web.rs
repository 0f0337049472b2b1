//! Browser media backend: one `HtmlVideoElement` per active slide, an
//! optional Hls.js client behind wasm-bindgen bindings, and a
//! requestAnimationFrame ticker for the displayed time. Sessions live in a
//! thread-local registry keyed by feed-item id; each mirrors its state into
//! the `Signal<PlaybackState>` its slide renders from.
//!
//! Non-wasm builds get no-op stubs so the component tree compiles for the
//! native test target.

#[allow(unused_imports)]
use crate::player::session::PlaybackState;
#[allow(unused_imports)]
use dioxus::prelude::*;

#[cfg(target_arch = "wasm32")]
pub use imp::*;

#[cfg(target_arch = "wasm32")]
mod imp {
    use crate::player::session::{
        MediaBackend, PlaybackController, PlaybackState, QualityLevel, SourceKind,
    };
    use dioxus::core::{Runtime, RuntimeGuard};
    use dioxus::logger::tracing::warn;
    use dioxus::prelude::*;
    use js_sys::Reflect;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;
    use wasm_bindgen::{closure::Closure, prelude::wasm_bindgen, JsCast, JsValue};
    use web_sys::{window, HtmlVideoElement};

    const HLS_NATIVE_MIME: &str = "application/vnd.apple.mpegurl";
    const HLS_EVENT_MANIFEST_PARSED: &str = "hlsManifestParsed";
    const HLS_EVENT_LEVEL_SWITCHED: &str = "hlsLevelSwitched";

    // Bindings to the global `Hls` class loaded from the hls.js script tag.
    #[wasm_bindgen]
    extern "C" {
        pub type Hls;

        #[wasm_bindgen(constructor)]
        fn new(config: &JsValue) -> Hls;

        #[wasm_bindgen(static_method_of = Hls, js_name = isSupported)]
        fn is_supported() -> bool;

        #[wasm_bindgen(method, js_name = loadSource)]
        fn load_source(this: &Hls, url: &str);

        #[wasm_bindgen(method, js_name = attachMedia)]
        fn attach_media(this: &Hls, media: &web_sys::HtmlMediaElement);

        #[wasm_bindgen(method)]
        fn on(this: &Hls, event: &str, callback: &js_sys::Function);

        #[wasm_bindgen(method)]
        fn destroy(this: &Hls);

        #[wasm_bindgen(method, getter)]
        fn levels(this: &Hls) -> js_sys::Array;

        #[wasm_bindgen(method, getter, js_name = currentLevel)]
        fn current_level(this: &Hls) -> i32;

        #[wasm_bindgen(method, setter, js_name = currentLevel)]
        fn set_current_level(this: &Hls, level: i32);
    }

    thread_local! {
        static SESSIONS: RefCell<HashMap<String, PlaybackController<WebMediaBackend>>> =
            RefCell::new(HashMap::new());
    }

    pub fn now_ms() -> f64 {
        js_sys::Date::now()
    }

    fn video_element(item_id: &str) -> Option<HtmlVideoElement> {
        let document = window()?.document()?;
        document
            .get_element_by_id(&format!("video-{item_id}"))?
            .dyn_into::<HtmlVideoElement>()
            .ok()
    }

    /// The script tag may be blocked or still loading; never call into the
    /// class before checking the global exists.
    fn hls_js_available() -> bool {
        window()
            .map(|w| {
                Reflect::get(&w, &JsValue::from_str("Hls"))
                    .map(|v| !v.is_undefined() && !v.is_null())
                    .unwrap_or(false)
            })
            .unwrap_or(false)
    }

    /// Play is best-effort: autoplay policy rejections resolve the promise
    /// with an error we deliberately drop, leaving the session paused.
    fn try_play(video: &HtmlVideoElement) {
        if let Ok(promise) = video.play() {
            wasm_bindgen_futures::spawn_local(async move {
                let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
            });
        }
    }

    fn with_session<R>(
        item_id: &str,
        f: impl FnOnce(&mut PlaybackController<WebMediaBackend>) -> R,
    ) -> Option<R> {
        SESSIONS.with(|cell| cell.borrow_mut().get_mut(item_id).map(f))
    }

    /// Push the registry state into the slide's render signal.
    fn sync(item_id: &str) {
        let snapshot = with_session(item_id, |c| (c.state.clone(), c.backend().state_signal));
        if let Some((state, mut signal)) = snapshot {
            signal.set(state);
        }
    }

    /// Cancellable rAF loop polling the element's position once per frame.
    /// Bound 1:1 to a session; [`FrameTicker::stop`] is reachable from every
    /// teardown path.
    struct FrameTicker {
        handle: Rc<Cell<Option<i32>>>,
        closure: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
    }

    impl FrameTicker {
        fn start(
            item_id: String,
            video: HtmlVideoElement,
            mut signal: Signal<PlaybackState>,
        ) -> Option<Self> {
            let win = window()?;
            let runtime = Runtime::current();
            let handle = Rc::new(Cell::new(None));
            let closure: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

            let tick = {
                let win = win.clone();
                let handle = handle.clone();
                let closure = closure.clone();
                Closure::wrap(Box::new(move || {
                    let _guard = RuntimeGuard::new(runtime.clone());
                    let time = video.current_time();
                    with_session(&item_id, |c| c.on_time(time));
                    signal.with_mut(|s| s.time = time);
                    if let Some(cb) = closure.borrow().as_ref() {
                        if let Ok(id) = win.request_animation_frame(cb.as_ref().unchecked_ref()) {
                            handle.set(Some(id));
                        }
                    }
                }) as Box<dyn FnMut()>)
            };
            *closure.borrow_mut() = Some(tick);

            let first = {
                let slot = closure.borrow();
                let cb = slot.as_ref()?;
                win.request_animation_frame(cb.as_ref().unchecked_ref()).ok()?
            };
            handle.set(Some(first));
            Some(Self { handle, closure })
        }

        fn stop(&self) {
            if let Some(id) = self.handle.take() {
                if let Some(win) = window() {
                    let _ = win.cancel_animation_frame(id);
                }
            }
            // Dropping the closure stops any frame that already fired from
            // rescheduling itself.
            self.closure.borrow_mut().take();
        }
    }

    pub struct WebMediaBackend {
        item_id: String,
        video: HtmlVideoElement,
        hls: Option<Hls>,
        ticker: Option<FrameTicker>,
        listeners: Vec<(&'static str, Closure<dyn FnMut()>)>,
        hls_callbacks: Vec<Closure<dyn FnMut(JsValue, JsValue)>>,
        state_signal: Signal<PlaybackState>,
    }

    impl WebMediaBackend {
        fn new(item_id: String, video: HtmlVideoElement, state_signal: Signal<PlaybackState>) -> Self {
            Self {
                item_id,
                video,
                hls: None,
                ticker: None,
                listeners: Vec::new(),
                hls_callbacks: Vec::new(),
                state_signal,
            }
        }

        fn start_ticker(&mut self) {
            if self.ticker.is_none() {
                self.ticker =
                    FrameTicker::start(self.item_id.clone(), self.video.clone(), self.state_signal);
            }
        }

        fn stop_ticker(&mut self) {
            if let Some(ticker) = self.ticker.take() {
                ticker.stop();
            }
        }

        fn add_listener(&mut self, event: &'static str, callback: Closure<dyn FnMut()>) {
            let _ = self
                .video
                .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
            self.listeners.push((event, callback));
        }

        /// Wire `loadedmetadata` / `progress` / `play` / `pause` so the
        /// element reports back into the session state.
        fn wire_element_events(&mut self) {
            let runtime = Runtime::current();

            let meta = {
                let item_id = self.item_id.clone();
                let video = self.video.clone();
                let runtime = runtime.clone();
                Closure::wrap(Box::new(move || {
                    let _guard = RuntimeGuard::new(runtime.clone());
                    let duration = video.duration();
                    with_session(&item_id, |c| c.on_metadata(duration));
                    sync(&item_id);
                }) as Box<dyn FnMut()>)
            };
            self.add_listener("loadedmetadata", meta);

            let progress = {
                let item_id = self.item_id.clone();
                let video = self.video.clone();
                let runtime = runtime.clone();
                Closure::wrap(Box::new(move || {
                    let _guard = RuntimeGuard::new(runtime.clone());
                    let buffered = video.buffered();
                    let ranges = buffered.length();
                    if ranges > 0 {
                        if let Ok(end) = buffered.end(ranges - 1) {
                            with_session(&item_id, |c| c.on_progress(end));
                            sync(&item_id);
                        }
                    }
                }) as Box<dyn FnMut()>)
            };
            self.add_listener("progress", progress);

            let play = {
                let item_id = self.item_id.clone();
                let runtime = runtime.clone();
                Closure::wrap(Box::new(move || {
                    let _guard = RuntimeGuard::new(runtime.clone());
                    with_session(&item_id, |c| {
                        c.on_play_state(true);
                        c.backend().start_ticker();
                    });
                    sync(&item_id);
                }) as Box<dyn FnMut()>)
            };
            self.add_listener("play", play);

            let pause = {
                let item_id = self.item_id.clone();
                let runtime = runtime;
                Closure::wrap(Box::new(move || {
                    let _guard = RuntimeGuard::new(runtime.clone());
                    with_session(&item_id, |c| {
                        c.on_play_state(false);
                        c.backend().stop_ticker();
                    });
                    sync(&item_id);
                }) as Box<dyn FnMut()>)
            };
            self.add_listener("pause", pause);
        }

        /// Software adaptive client: low-latency mode, worker-offloaded
        /// demuxing, back buffer bounded to ~30s.
        fn attach_hls(&mut self, uri: &str) {
            let config = js_sys::Object::new();
            let _ = Reflect::set(&config, &"lowLatencyMode".into(), &JsValue::TRUE);
            let _ = Reflect::set(&config, &"enableWorker".into(), &JsValue::TRUE);
            let _ = Reflect::set(&config, &"backBufferLength".into(), &JsValue::from_f64(30.0));

            let hls = Hls::new(&config);
            hls.load_source(uri);
            hls.attach_media(&self.video);

            let runtime = Runtime::current();

            let manifest = {
                let item_id = self.item_id.clone();
                let runtime = runtime.clone();
                Closure::wrap(Box::new(move |_event: JsValue, _data: JsValue| {
                    let _guard = RuntimeGuard::new(runtime.clone());
                    with_session(&item_id, |c| {
                        let discovered = c
                            .backend()
                            .hls
                            .as_ref()
                            .map(|h| (read_levels(h), h.current_level()));
                        if let Some((levels, current)) = discovered {
                            c.on_levels(levels, current);
                        }
                        c.backend().play();
                    });
                    sync(&item_id);
                }) as Box<dyn FnMut(JsValue, JsValue)>)
            };
            hls.on(HLS_EVENT_MANIFEST_PARSED, manifest.as_ref().unchecked_ref());
            self.hls_callbacks.push(manifest);

            let switched = {
                let item_id = self.item_id.clone();
                Closure::wrap(Box::new(move |_event: JsValue, data: JsValue| {
                    let _guard = RuntimeGuard::new(runtime.clone());
                    let level = Reflect::get(&data, &"level".into())
                        .ok()
                        .and_then(|v| v.as_f64())
                        .map(|v| v as i32);
                    if let Some(level) = level {
                        with_session(&item_id, |c| c.on_level_switched(level));
                        sync(&item_id);
                    }
                }) as Box<dyn FnMut(JsValue, JsValue)>)
            };
            hls.on(HLS_EVENT_LEVEL_SWITCHED, switched.as_ref().unchecked_ref());
            self.hls_callbacks.push(switched);

            self.hls = Some(hls);
        }
    }

    fn read_levels(hls: &Hls) -> Vec<QualityLevel> {
        hls.levels()
            .iter()
            .map(|level| {
                let pick = |key: &str| {
                    Reflect::get(&level, &JsValue::from_str(key))
                        .ok()
                        .and_then(|v| v.as_f64())
                        .unwrap_or(0.0) as u32
                };
                QualityLevel {
                    height: pick("height"),
                    bitrate: pick("bitrate"),
                }
            })
            .collect()
    }

    impl MediaBackend for WebMediaBackend {
        fn play(&mut self) {
            try_play(&self.video);
        }

        fn pause(&mut self) {
            let _ = self.video.pause();
        }

        fn set_muted(&mut self, muted: bool) {
            self.video.set_muted(muted);
        }

        fn set_volume(&mut self, volume: f64) {
            self.video.set_volume(volume);
        }

        fn set_current_time(&mut self, time: f64) {
            self.video.set_current_time(time);
        }

        fn set_quality(&mut self, level: i32) {
            if let Some(hls) = &self.hls {
                hls.set_current_level(level);
            }
        }

        fn toggle_fullscreen(&mut self) {
            let Some(document) = window().and_then(|w| w.document()) else {
                return;
            };
            if document.fullscreen_element().is_some() {
                document.exit_fullscreen();
            } else if let Some(container) =
                document.get_element_by_id(&format!("slide-{}", self.item_id))
            {
                // Rejections (not user-initiated, unsupported) are swallowed.
                let _ = container.request_fullscreen();
            }
        }

        fn teardown(&mut self) {
            self.stop_ticker();
            let _ = self.video.pause();
            if let Some(hls) = self.hls.take() {
                hls.destroy();
            }
            for (event, callback) in self.listeners.drain(..) {
                let _ = self
                    .video
                    .remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
            }
            self.hls_callbacks.clear();
            let _ = self.video.remove_attribute("src");
            while let Some(child) = self.video.first_child() {
                let _ = self.video.remove_child(&child);
            }
            self.video.load();
        }
    }

    /// Begin a session for the slide's video element. Replaces any previous
    /// session for the same item.
    pub fn attach(item_id: &str, uri: &str, state: Signal<PlaybackState>) {
        detach(item_id);
        let Some(video) = video_element(item_id) else {
            return;
        };

        let (muted, volume) = {
            let s = state.peek();
            (s.muted, s.volume)
        };
        video.set_muted(muted);
        video.set_volume(volume);

        let mut backend = WebMediaBackend::new(item_id.to_string(), video.clone(), state);
        backend.wire_element_events();

        match SourceKind::classify(uri) {
            SourceKind::Hls => {
                if !video.can_play_type(HLS_NATIVE_MIME).is_empty() {
                    video.set_src(uri);
                    try_play(&video);
                } else if hls_js_available() && Hls::is_supported() {
                    backend.attach_hls(uri);
                } else {
                    // Degraded best-effort: some engines still make
                    // something of a direct manifest assignment.
                    warn!("no adaptive playback support, assigning source directly");
                    video.set_src(uri);
                }
            }
            SourceKind::Progressive => {
                video.set_src(uri);
                try_play(&video);
            }
        }

        SESSIONS.with(|cell| {
            cell.borrow_mut()
                .insert(item_id.to_string(), PlaybackController::new(backend));
        });
    }

    /// Tear the session down and zero the slide's state. Safe to call when
    /// no session exists.
    pub fn detach(item_id: &str) {
        let removed = SESSIONS.with(|cell| cell.borrow_mut().remove(item_id));
        if let Some(mut controller) = removed {
            controller.detach();
            let mut signal = controller.backend().state_signal;
            signal.set(controller.state.clone());
        }
    }

    pub fn toggle_play(item_id: &str) {
        with_session(item_id, |c| c.toggle_play());
        sync(item_id);
    }

    pub fn toggle_mute(item_id: &str) {
        with_session(item_id, |c| c.toggle_mute());
        sync(item_id);
    }

    pub fn seek(item_id: &str, time: f64) {
        with_session(item_id, |c| c.seek(time));
        sync(item_id);
    }

    pub fn set_volume(item_id: &str, volume: f64) {
        with_session(item_id, |c| c.set_volume(volume));
        sync(item_id);
    }

    pub fn set_quality(item_id: &str, level: i32) {
        with_session(item_id, |c| c.set_quality_level(level));
        sync(item_id);
    }

    pub fn toggle_fullscreen(item_id: &str) {
        with_session(item_id, |c| c.toggle_fullscreen());
    }

    /// Enforce the single-playing-session invariant on every slide change:
    /// the active item plays, every other live session pauses.
    pub fn play_only(active_item_id: &str) {
        SESSIONS.with(|cell| {
            for (id, controller) in cell.borrow_mut().iter_mut() {
                if id == active_item_id {
                    controller.backend().play();
                } else {
                    controller.backend().pause();
                }
            }
        });
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod stubs {
    use super::PlaybackState;
    use dioxus::prelude::*;

    pub fn now_ms() -> f64 {
        0.0
    }

    pub fn attach(_item_id: &str, _uri: &str, _state: Signal<PlaybackState>) {}
    pub fn detach(_item_id: &str) {}
    pub fn toggle_play(_item_id: &str) {}
    pub fn toggle_mute(_item_id: &str) {}
    pub fn seek(_item_id: &str, _time: f64) {}
    pub fn set_volume(_item_id: &str, _volume: f64) {}
    pub fn set_quality(_item_id: &str, _level: i32) {}
    pub fn toggle_fullscreen(_item_id: &str) {}
    pub fn play_only(_active_item_id: &str) {}
}

#[cfg(not(target_arch = "wasm32"))]
pub use stubs::*;
