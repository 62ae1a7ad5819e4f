//! Sampling a scroll pass
//!
//! Drives a [`ScrollAnimator`] the way the scroll-pinning collaborator
//! would: one scroll update and one frame per step across the pinned region.

use anyhow::Result;
use scrollpose_animation::{Pose, ScrollAnimator, UpdateSink};
use serde::Serialize;
use std::io::Write;
use tracing::info;

use crate::config::OutputFormat;

/// One sampled frame
#[derive(Debug, Clone, Serialize)]
pub struct SampleRow {
    pub raw: f32,
    pub progress: f32,
    pub reset: bool,
    pub pose: Pose,
}

/// Overlay stand-in that logs when the overlay is hidden or shown again
#[derive(Debug, Default)]
pub struct OverlayLogSink {
    visible: Option<bool>,
}

impl UpdateSink for OverlayLogSink {
    fn apply_pose(&mut self, _pose: &Pose) {}

    fn apply_overlay_opacity(&mut self, opacity: f32) {
        let visible = opacity >= 0.5;
        if self.visible != Some(visible) {
            info!(
                "Overlay {} (opacity {:.3})",
                if visible { "shown" } else { "hidden" },
                opacity
            );
            self.visible = Some(visible);
        }
    }
}

/// Sample `steps + 1` evenly spaced scroll positions from 0 to 1.
///
/// With `wrap`, one more update scrolls back to the top of the region,
/// which is where a single-loop configuration reports its reset.
pub fn sample_pass(animator: &mut ScrollAnimator, steps: u32, wrap: bool) -> Vec<SampleRow> {
    let steps = steps.max(1);
    let mut positions: Vec<f32> = (0..=steps).map(|i| i as f32 / steps as f32).collect();
    if wrap {
        positions.push(0.0);
    }

    positions
        .into_iter()
        .map(|raw| {
            let mapped = animator.on_scroll(raw);
            let pose = animator.frame();
            SampleRow {
                raw: mapped.raw,
                progress: mapped.progress,
                reset: mapped.reset,
                pose,
            }
        })
        .collect()
}

/// Write rows as an aligned table or as JSON lines
pub fn write_rows(out: &mut impl Write, rows: &[SampleRow], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            for row in rows {
                writeln!(out, "{}", serde_json::to_string(row)?)?;
            }
        }
        OutputFormat::Text => {
            writeln!(
                out,
                "{:>6} {:>8}  {:<24} {:<24} {:<24} {:>7}",
                "raw", "progress", "position", "rotation", "scale", "opacity"
            )?;
            for row in rows {
                let p = &row.pose;
                writeln!(
                    out,
                    "{:>6.3} {:>8.4}  {:<24} {:<24} {:<24} {:>7.3}{}",
                    row.raw,
                    row.progress,
                    format!("{:.3}, {:.3}, {:.3}", p.position.x, p.position.y, p.position.z),
                    format!("{:.3}, {:.3}, {:.3}", p.rotation.x, p.rotation.y, p.rotation.z),
                    format!("{:.3}, {:.3}, {:.3}", p.scale.x, p.scale.y, p.scale.z),
                    p.ui_opacity,
                    if row.reset { "  reset" } else { "" }
                )?;
            }
        }
    }
    Ok(())
}
