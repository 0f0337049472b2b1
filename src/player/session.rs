/// Sentinel for "let the adaptive client pick the rendition".
pub const AUTO_LEVEL: i32 = -1;

/// One rendition advertised by the manifest, in the client's rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityLevel {
    pub height: u32,
    pub bitrate: u32,
}

/// How a media URI gets attached to the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Adaptive manifest; probe native support, then the software client.
    Hls,
    /// Plain progressive file, assigned directly.
    Progressive,
}

impl SourceKind {
    /// Matches `.m3u8` at the end of the path, query strings tolerated.
    pub fn classify(uri: &str) -> Self {
        let lower = uri.to_ascii_lowercase();
        if lower.ends_with(".m3u8") || lower.contains(".m3u8?") {
            SourceKind::Hls
        } else {
            SourceKind::Progressive
        }
    }
}

/// Mutable state of one playback session, bound to exactly one feed item.
/// Everything the slide UI renders comes from here.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub playing: bool,
    pub muted: bool,
    pub volume: f64,
    pub time: f64,
    /// 0 or non-finite means live/unknown duration.
    pub duration: f64,
    pub buffered_end: f64,
    pub levels: Vec<QualityLevel>,
    /// Index into `levels`, or [`AUTO_LEVEL`].
    pub selected_level: i32,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            playing: false,
            muted: false,
            volume: 1.0,
            time: 0.0,
            duration: 0.0,
            buffered_end: 0.0,
            levels: Vec::new(),
            selected_level: AUTO_LEVEL,
        }
    }
}

impl PlaybackState {
    pub fn is_live(&self) -> bool {
        self.duration == 0.0 || !self.duration.is_finite()
    }

    /// Detach zeroing: keep volume/mute (they belong to the controls), drop
    /// everything tied to the departed media source.
    pub fn reset_media(&mut self) {
        self.playing = false;
        self.time = 0.0;
        self.duration = 0.0;
        self.buffered_end = 0.0;
        self.levels.clear();
        self.selected_level = AUTO_LEVEL;
    }
}

/// Control surface a concrete media backend must implement. The web backend
/// drives an `HtmlVideoElement` (plus an optional Hls.js client); tests use a
/// recording fake. Play initiation and fullscreen are best-effort by
/// contract: rejections are swallowed inside the backend.
pub trait MediaBackend {
    fn play(&mut self);
    fn pause(&mut self);
    fn set_muted(&mut self, muted: bool);
    fn set_volume(&mut self, volume: f64);
    fn set_current_time(&mut self, time: f64);
    fn set_quality(&mut self, level: i32);
    fn toggle_fullscreen(&mut self);
    /// Release every native resource: polling loop, adaptive client, source.
    fn teardown(&mut self);
}

/// Applies the session rules and drives the backend. Event feedback from the
/// element (`on_*`) flows back into [`PlaybackState`]; control methods push
/// the other way.
#[derive(Debug)]
pub struct PlaybackController<B: MediaBackend> {
    pub state: PlaybackState,
    backend: B,
}

impl<B: MediaBackend> PlaybackController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            state: PlaybackState::default(),
            backend,
        }
    }

    pub fn backend(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn toggle_play(&mut self) {
        if self.state.playing {
            self.backend.pause();
        } else {
            self.backend.play();
        }
    }

    /// Clamp into `[0, duration]`; live streams ignore seeks entirely.
    pub fn seek(&mut self, time: f64) {
        if self.state.is_live() {
            return;
        }
        let clamped = time.clamp(0.0, self.state.duration);
        self.backend.set_current_time(clamped);
        self.state.time = clamped;
    }

    /// Volume and mute share one field: zero volume mutes, any nonzero
    /// volume unmutes.
    pub fn set_volume(&mut self, volume: f64) {
        let volume = volume.clamp(0.0, 1.0);
        let muted = volume == 0.0;
        self.backend.set_volume(volume);
        self.backend.set_muted(muted);
        self.state.volume = volume;
        self.state.muted = muted;
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.backend.set_muted(muted);
        self.state.muted = muted;
    }

    /// Flips mute only; deliberately does not restore a previous volume.
    pub fn toggle_mute(&mut self) {
        let muted = !self.state.muted;
        self.set_muted(muted);
    }

    pub fn set_quality_level(&mut self, level: i32) {
        self.state.selected_level = level;
        self.backend.set_quality(level);
    }

    pub fn toggle_fullscreen(&mut self) {
        self.backend.toggle_fullscreen();
    }

    /// Full teardown; must be reachable from every exit path.
    pub fn detach(&mut self) {
        self.backend.teardown();
        self.state.reset_media();
    }

    // Event feedback from the media element / adaptive client.

    pub fn on_metadata(&mut self, duration: f64) {
        self.state.duration = if duration.is_finite() { duration } else { 0.0 };
    }

    pub fn on_progress(&mut self, buffered_end: f64) {
        self.state.buffered_end = buffered_end;
    }

    pub fn on_play_state(&mut self, playing: bool) {
        self.state.playing = playing;
    }

    pub fn on_time(&mut self, time: f64) {
        self.state.time = time;
    }

    /// Manifest parsed: publish the discovered renditions and whatever the
    /// client auto-selected.
    pub fn on_levels(&mut self, levels: Vec<QualityLevel>, current: i32) {
        self.state.levels = levels;
        self.state.selected_level = current;
    }

    /// Every switch, user-picked or auto, lands here.
    pub fn on_level_switched(&mut self, level: i32) {
        self.state.selected_level = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Cmd {
        Play,
        Pause,
        Muted(bool),
        Volume(f64),
        CurrentTime(f64),
        Quality(i32),
        Fullscreen,
        Teardown,
    }

    #[derive(Default)]
    struct RecordingBackend {
        commands: Vec<Cmd>,
    }

    impl MediaBackend for RecordingBackend {
        fn play(&mut self) {
            self.commands.push(Cmd::Play);
        }
        fn pause(&mut self) {
            self.commands.push(Cmd::Pause);
        }
        fn set_muted(&mut self, muted: bool) {
            self.commands.push(Cmd::Muted(muted));
        }
        fn set_volume(&mut self, volume: f64) {
            self.commands.push(Cmd::Volume(volume));
        }
        fn set_current_time(&mut self, time: f64) {
            self.commands.push(Cmd::CurrentTime(time));
        }
        fn set_quality(&mut self, level: i32) {
            self.commands.push(Cmd::Quality(level));
        }
        fn toggle_fullscreen(&mut self) {
            self.commands.push(Cmd::Fullscreen);
        }
        fn teardown(&mut self) {
            self.commands.push(Cmd::Teardown);
        }
    }

    fn controller() -> PlaybackController<RecordingBackend> {
        PlaybackController::new(RecordingBackend::default())
    }

    #[test]
    fn classify_matches_manifest_pattern() {
        assert_eq!(SourceKind::classify("https://c.dn/v/master.m3u8"), SourceKind::Hls);
        assert_eq!(SourceKind::classify("https://c.dn/v/Master.M3U8?tok=1"), SourceKind::Hls);
        assert_eq!(SourceKind::classify("https://c.dn/v/clip.mp4"), SourceKind::Progressive);
        assert_eq!(SourceKind::classify("https://c.dn/v/m3u8/clip.mp4"), SourceKind::Progressive);
    }

    #[test]
    fn seek_clamps_to_duration() {
        let mut c = controller();
        c.on_metadata(120.0);
        c.seek(300.0);
        assert_eq!(c.state.time, 120.0);
        c.seek(-5.0);
        assert_eq!(c.state.time, 0.0);
        assert_eq!(
            c.backend.commands,
            vec![Cmd::CurrentTime(120.0), Cmd::CurrentTime(0.0)]
        );
    }

    #[test]
    fn seek_is_noop_for_live_streams() {
        let mut c = controller();
        assert!(c.state.is_live());
        c.seek(10.0);
        assert_eq!(c.state.time, 0.0);
        assert!(c.backend.commands.is_empty());

        c.on_metadata(f64::INFINITY);
        assert!(c.state.is_live());
        c.seek(10.0);
        assert!(c.backend.commands.is_empty());
    }

    #[test]
    fn zero_volume_mutes_and_nonzero_unmutes() {
        let mut c = controller();
        c.set_volume(0.0);
        assert!(c.state.muted);
        c.set_volume(0.4);
        assert!(!c.state.muted);
        assert_eq!(c.state.volume, 0.4);
        // Out-of-range input is clamped, not rejected.
        c.set_volume(3.0);
        assert_eq!(c.state.volume, 1.0);
        assert!(!c.state.muted);
    }

    #[test]
    fn mute_toggle_does_not_restore_volume() {
        let mut c = controller();
        c.set_volume(0.0);
        c.toggle_mute();
        assert!(!c.state.muted);
        assert_eq!(c.state.volume, 0.0);
    }

    #[test]
    fn toggle_play_follows_reported_state() {
        let mut c = controller();
        c.toggle_play();
        assert_eq!(c.backend.commands, vec![Cmd::Play]);
        // The element confirms via its play event, not our call.
        assert!(!c.state.playing);
        c.on_play_state(true);
        c.toggle_play();
        assert_eq!(c.backend.commands, vec![Cmd::Play, Cmd::Pause]);
    }

    #[test]
    fn detach_while_playing_resets_everything() {
        let mut c = controller();
        c.on_metadata(60.0);
        c.on_levels(
            vec![QualityLevel {
                height: 720,
                bitrate: 2_000_000,
            }],
            0,
        );
        c.on_play_state(true);
        c.on_time(12.5);
        c.on_progress(30.0);

        c.detach();
        assert_eq!(c.backend.commands, vec![Cmd::Teardown]);
        assert!(!c.state.playing);
        assert_eq!(c.state.time, 0.0);
        assert_eq!(c.state.duration, 0.0);
        assert_eq!(c.state.buffered_end, 0.0);
        assert!(c.state.levels.is_empty());
        assert_eq!(c.state.selected_level, AUTO_LEVEL);
    }

    #[test]
    fn level_switch_events_update_selection() {
        let mut c = controller();
        c.on_levels(
            vec![
                QualityLevel {
                    height: 360,
                    bitrate: 500_000,
                },
                QualityLevel {
                    height: 720,
                    bitrate: 2_000_000,
                },
            ],
            AUTO_LEVEL,
        );
        assert_eq!(c.state.selected_level, AUTO_LEVEL);

        c.set_quality_level(1);
        assert_eq!(c.backend.commands, vec![Cmd::Quality(1)]);
        // The adaptive client may later switch on its own; state follows.
        c.on_level_switched(0);
        assert_eq!(c.state.selected_level, 0);
    }
}
