//! Scroll animator
//!
//! Owns the active [`Timeline`] and drives registered sinks once per frame.
//!
//! Scroll callbacks ([`ScrollAnimator::on_scroll`]) and frames
//! ([`ScrollAnimator::frame`]) may fire at different cadences; each frame
//! evaluates the full pose from the latest scroll value. Settings arriving
//! through a [`SettingsSender`] are applied at the start of the next frame,
//! so evaluation never reads a half-replaced timeline.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;

use slotmap::{new_key_type, SlotMap};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::perf::FrameMonitor;
use crate::pose::{IdleSway, Pose};
use crate::scroll::{MappedProgress, ResetWindow, ScrollMapper};
use crate::settings::{AnimationSettings, ValidatedSettings};
use crate::sink::UpdateSink;
use crate::timeline::Timeline;

new_key_type! {
    pub struct SinkId;
}

/// Editor-side handle for queueing whole-settings replacements
#[derive(Clone, Debug)]
pub struct SettingsSender {
    tx: Sender<AnimationSettings>,
}

impl SettingsSender {
    /// Queue a replacement; returns false if the animator is gone
    pub fn send(&self, settings: AnimationSettings) -> bool {
        self.tx.send(settings).is_ok()
    }
}

/// Scroll-driven keyframe animator
pub struct ScrollAnimator {
    timeline: Timeline,
    duration: f32,
    speed: f32,
    mapper: ScrollMapper,
    pending_reset: bool,
    sinks: SlotMap<SinkId, Box<dyn UpdateSink>>,
    inbox: Receiver<AnimationSettings>,
    outbox: Sender<AnimationSettings>,
    last_error: Option<ConfigError>,
    monitor: FrameMonitor,
    idle_sway: Option<IdleSway>,
    started: Option<Instant>,
}

impl ScrollAnimator {
    /// Create an animator; absent or invalid settings fall back to the baseline
    pub fn new(settings: Option<AnimationSettings>) -> Self {
        let (validated, last_error) = match settings.map(AnimationSettings::validate) {
            Some(Ok(validated)) => (validated, None),
            Some(Err(err)) => {
                warn!("Rejected initial animation settings, using defaults: {}", err);
                (ValidatedSettings::default(), Some(err))
            }
            None => (ValidatedSettings::default(), None),
        };

        let (outbox, inbox) = mpsc::channel();
        Self {
            mapper: ScrollMapper::new(validated.loops),
            duration: validated.duration,
            speed: validated.speed,
            timeline: Timeline::compile(validated.store),
            pending_reset: false,
            sinks: SlotMap::with_key(),
            inbox,
            outbox,
            last_error,
            monitor: FrameMonitor::new(),
            idle_sway: None,
            started: None,
        }
    }

    /// Builder: set the single-loop reset window
    pub fn with_reset_window(mut self, window: ResetWindow) -> Result<Self, ConfigError> {
        self.set_reset_window(window)?;
        Ok(self)
    }

    /// Replace the reset window; a rejected window keeps the current one
    pub fn set_reset_window(&mut self, window: ResetWindow) -> Result<(), ConfigError> {
        self.mapper.set_reset_window(window).map_err(|err| {
            warn!("Rejected reset window: {}", err);
            err
        })
    }

    /// Builder: drive a time-based idle sway alongside the scroll pose
    pub fn with_idle_sway(mut self, sway: IdleSway) -> Self {
        self.idle_sway = Some(sway);
        self
    }

    /// Handle for the configuration editor
    pub fn settings_sender(&self) -> SettingsSender {
        SettingsSender {
            tx: self.outbox.clone(),
        }
    }

    /// Swap in new settings immediately.
    ///
    /// On error the current timeline stays in effect and the error is also
    /// kept for [`ScrollAnimator::last_config_error`].
    pub fn replace(&mut self, settings: AnimationSettings) -> Result<(), ConfigError> {
        match settings.validate() {
            Ok(validated) => {
                self.mapper.set_loops(validated.loops);
                if validated.loops != 1 {
                    // resets only exist in single-loop mode
                    self.pending_reset = false;
                }
                self.duration = validated.duration;
                self.speed = validated.speed;
                self.timeline = Timeline::compile(validated.store);
                self.last_error = None;
                debug!("Animation settings replaced ({} loops)", validated.loops);
                Ok(())
            }
            Err(err) => {
                warn!("Rejected animation settings: {}", err);
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Error from the most recent rejected replacement, if it was the last attempt
    pub fn last_config_error(&self) -> Option<&ConfigError> {
        self.last_error.as_ref()
    }

    /// Feed a raw scroll fraction from the pinning collaborator
    pub fn on_scroll(&mut self, raw: f32) -> MappedProgress {
        let mapped = self.mapper.update(raw);
        if mapped.reset {
            self.pending_reset = true;
        }
        mapped
    }

    /// Evaluate and dispatch one frame
    pub fn frame(&mut self) -> Pose {
        self.frame_at(Instant::now())
    }

    /// Evaluate and dispatch one frame rendered at `now`
    pub fn frame_at(&mut self, now: Instant) -> Pose {
        self.monitor.record_frame(now);
        self.apply_pending_settings();
        self.dispatch_idle_sway(now);

        if std::mem::take(&mut self.pending_reset) {
            let initial = self.timeline.initial_pose();
            debug!("Resetting sinks to the cycle start");
            for (_, sink) in self.sinks.iter_mut() {
                sink.reset(&initial);
            }
            return initial;
        }

        let pose = self.timeline.sample(self.mapper.current().progress);
        for (_, sink) in self.sinks.iter_mut() {
            sink.apply_pose(&pose);
            sink.apply_overlay_opacity(pose.ui_opacity);
        }
        pose
    }

    /// Pose for a raw scroll fraction, without touching scroll state or sinks
    pub fn pose_at(&self, raw: f32) -> Pose {
        self.timeline
            .sample(crate::scroll::map(raw, self.mapper.loops()))
    }

    pub fn add_sink(&mut self, sink: Box<dyn UpdateSink>) -> SinkId {
        self.sinks.insert(sink)
    }

    pub fn remove_sink(&mut self, id: SinkId) -> Option<Box<dyn UpdateSink>> {
        self.sinks.remove(id)
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn loops(&self) -> u32 {
        self.mapper.loops()
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Snapshot of the active settings
    pub fn settings(&self) -> AnimationSettings {
        AnimationSettings {
            keyframes: self.timeline.store().keyframes().to_vec(),
            duration: self.duration,
            loops: self.mapper.loops(),
            speed: self.speed,
        }
    }

    pub fn frame_monitor(&self) -> &FrameMonitor {
        &self.monitor
    }

    fn dispatch_idle_sway(&mut self, now: Instant) {
        let Some(sway) = self.idle_sway else {
            return;
        };
        let started = *self.started.get_or_insert(now);
        let angle = sway.rotation_y(now.saturating_duration_since(started).as_secs_f32());
        for (_, sink) in self.sinks.iter_mut() {
            sink.apply_idle_sway(angle);
        }
    }

    fn apply_pending_settings(&mut self) {
        // Only the newest queued settings matter; earlier ones are superseded
        let Some(latest) = self.inbox.try_iter().last() else {
            return;
        };
        // Rejections are logged and recorded by `replace`
        let _ = self.replace(latest);
    }
}

impl Default for ScrollAnimator {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyframe::Keyframe;
    use crate::sink::RecordingSink;

    fn two_keyframes(scale: f32) -> Vec<Keyframe> {
        vec![
            Keyframe::rest(0.0),
            Keyframe::rest(1.0).with_scale(scale).with_easing("linear"),
        ]
    }

    #[test]
    fn test_defaults_when_no_settings() {
        let animator = ScrollAnimator::new(None);
        assert_eq!(animator.timeline().store().len(), 8);
        assert_eq!(animator.loops(), 4);
        assert!(animator.last_config_error().is_none());
    }

    #[test]
    fn test_invalid_initial_settings_fall_back() {
        let settings = AnimationSettings::default().with_keyframes(vec![Keyframe::rest(0.0)]);
        let animator = ScrollAnimator::new(Some(settings));

        assert_eq!(animator.timeline().store().len(), 8);
        assert_eq!(
            animator.last_config_error(),
            Some(&ConfigError::TooFewKeyframes { count: 1 })
        );
    }

    #[test]
    fn test_frame_dispatches_to_all_sinks() {
        let mut animator = ScrollAnimator::new(None);
        let a = RecordingSink::new();
        let b = RecordingSink::new();
        animator.add_sink(Box::new(a.clone()));
        let b_id = animator.add_sink(Box::new(b.clone()));

        animator.on_scroll(0.05);
        let pose = animator.frame();

        assert_eq!(a.last_pose(), Some(pose));
        assert_eq!(b.log().opacities, vec![pose.ui_opacity]);

        animator.remove_sink(b_id);
        animator.frame();
        assert_eq!(a.log().poses.len(), 2);
        assert_eq!(b.log().poses.len(), 1);
    }

    #[test]
    fn test_queued_settings_apply_on_next_frame() {
        let mut animator = ScrollAnimator::new(None);
        let sender = animator.settings_sender();

        let settings = AnimationSettings::default()
            .with_keyframes(two_keyframes(3.0))
            .with_loops(1);
        assert!(sender.send(settings));

        // not yet visible between frames
        assert_eq!(animator.timeline().store().len(), 8);

        animator.on_scroll(0.5);
        let pose = animator.frame();
        assert_eq!(animator.timeline().store().len(), 2);
        assert!((pose.scale.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_only_latest_queued_settings_apply() {
        let mut animator = ScrollAnimator::new(None);
        let sender = animator.settings_sender();

        sender.send(AnimationSettings::default().with_keyframes(two_keyframes(3.0)));
        sender.send(AnimationSettings::default().with_keyframes(two_keyframes(5.0)));
        animator.frame();

        assert_eq!(animator.timeline().store().last().scale.x, 5.0);
    }

    #[test]
    fn test_rejected_replace_keeps_previous_timeline() {
        let mut animator = ScrollAnimator::new(None);
        let before = animator.timeline().segments().to_vec();

        let bad = AnimationSettings::default().with_keyframes(vec![
            Keyframe::rest(0.3),
            Keyframe::rest(0.3),
        ]);
        assert!(animator.replace(bad).is_err());

        assert_eq!(animator.timeline().segments(), before.as_slice());
        assert!(matches!(
            animator.last_config_error(),
            Some(ConfigError::DuplicateTime { .. })
        ));

        animator.replace(AnimationSettings::default()).unwrap();
        assert!(animator.last_config_error().is_none());
    }

    #[test]
    fn test_single_loop_reset_snaps_sinks() {
        let settings = AnimationSettings::default().with_loops(1);
        let mut animator = ScrollAnimator::new(Some(settings));
        let sink = RecordingSink::new();
        animator.add_sink(Box::new(sink.clone()));

        animator.on_scroll(0.999);
        animator.frame();
        animator.on_scroll(0.01);
        let pose = animator.frame();

        let log = sink.log();
        assert_eq!(log.resets.len(), 1);
        assert_eq!(pose, animator.timeline().initial_pose());
        assert_eq!(pose.ui_opacity, 1.0);

        // the reset is consumed by one frame
        animator.frame();
        assert_eq!(sink.log().resets.len(), 1);
    }

    #[test]
    fn test_latest_scroll_wins_between_frames() {
        let mut animator = ScrollAnimator::new(None);
        let sink = RecordingSink::new();
        animator.add_sink(Box::new(sink.clone()));

        animator.on_scroll(0.02);
        animator.on_scroll(0.05);
        animator.on_scroll(0.1);
        let pose = animator.frame();

        assert_eq!(pose, animator.pose_at(0.1));
        assert_ne!(pose, animator.pose_at(0.05));
        assert_eq!(sink.log().poses, vec![pose]);
    }

    #[test]
    fn test_reset_latch_survives_intervening_scrolls() {
        let settings = AnimationSettings::default().with_loops(1);
        let mut animator = ScrollAnimator::new(Some(settings));
        let sink = RecordingSink::new();
        animator.add_sink(Box::new(sink.clone()));

        animator.on_scroll(0.999);
        animator.frame();

        // wrap, then keep scrolling before the next frame
        assert!(animator.on_scroll(0.01).reset);
        assert!(!animator.on_scroll(0.05).reset);
        assert!(!animator.on_scroll(0.3).reset);

        let pose = animator.frame();
        assert_eq!(pose, animator.timeline().initial_pose());
        assert_eq!(sink.log().resets.len(), 1);

        // the following frame resumes from the latest scroll value
        assert_eq!(animator.frame(), animator.pose_at(0.3));
        assert_eq!(sink.log().resets.len(), 1);
    }

    #[test]
    fn test_switch_to_multi_loop_drops_pending_reset() {
        let settings = AnimationSettings::default().with_loops(1);
        let mut animator = ScrollAnimator::new(Some(settings));
        let sink = RecordingSink::new();
        animator.add_sink(Box::new(sink.clone()));

        animator.on_scroll(0.999);
        animator.frame();
        assert!(animator.on_scroll(0.01).reset);

        animator
            .settings_sender()
            .send(AnimationSettings::default().with_loops(4));
        let pose = animator.frame();

        assert_eq!(animator.loops(), 4);
        assert!(sink.log().resets.is_empty());
        assert_eq!(pose, animator.pose_at(0.01));
    }

    #[test]
    fn test_invalid_reset_window_is_rejected() {
        let inverted = ResetWindow {
            enter: 0.05,
            exit: 0.1,
        };
        assert!(matches!(
            ScrollAnimator::new(None).with_reset_window(inverted),
            Err(ConfigError::InvalidResetWindow { .. })
        ));

        let mut animator = ScrollAnimator::new(Some(AnimationSettings::default().with_loops(1)));
        assert!(animator.set_reset_window(inverted).is_err());
        animator.on_scroll(0.06);
        assert!(!animator.on_scroll(0.02).reset);
    }

    #[test]
    fn test_idle_sway_follows_frame_time() {
        let start = Instant::now();
        let mut animator = ScrollAnimator::new(None).with_idle_sway(IdleSway::default());
        let sink = RecordingSink::new();
        animator.add_sink(Box::new(sink.clone()));

        animator.frame_at(start);
        animator.frame_at(start + std::time::Duration::from_secs(1));

        let sways = sink.log().sways;
        assert_eq!(sways.len(), 2);
        assert_eq!(sways[0], 0.0);
        assert!((sways[1] - 0.5f32.sin() * 0.015).abs() < 1e-6);
    }

    #[test]
    fn test_idle_sway_is_off_by_default() {
        let mut animator = ScrollAnimator::new(None);
        let sink = RecordingSink::new();
        animator.add_sink(Box::new(sink.clone()));
        animator.frame();
        assert!(sink.log().sways.is_empty());
    }

    #[test]
    fn test_pose_at_is_side_effect_free() {
        let mut animator = ScrollAnimator::new(None);
        let sink = RecordingSink::new();
        animator.add_sink(Box::new(sink.clone()));

        let pose = animator.pose_at(0.1);
        assert!((pose.rotation.x - 4.24).abs() < 1e-5);
        assert!(sink.log().poses.is_empty());
    }

    #[test]
    fn test_settings_snapshot_round_trips() {
        let animator = ScrollAnimator::new(None);
        assert_eq!(animator.settings(), AnimationSettings::default());
    }
}
