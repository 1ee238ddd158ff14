use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::geometry::CubicBezier;

pub use config_model::GalleryConfig;

/// Primary input device class of the host; coarse pointers get snappier
/// animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointerClass {
    #[default]
    Fine,
    Coarse,
}

/// Commit thresholds for swipe gestures.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct GestureThresholds {
    /// Floor for the distance threshold, in px.
    pub min_distance_px: f64,
    /// Distance threshold as a fraction of the viewport width.
    pub viewport_fraction: f64,
    /// Horizontal release velocity that commits regardless of distance, px/ms.
    pub velocity_px_per_ms: f64,
    /// Window after a commit during which a trailing tap is swallowed, ms.
    pub commit_guard_ms: f64,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            min_distance_px: 40.0,
            viewport_fraction: 0.18,
            velocity_px_per_ms: 0.22,
            commit_guard_ms: 80.0,
        }
    }
}

impl GestureThresholds {
    pub fn distance_threshold(&self, viewport_width: f64) -> f64 {
        let scaled = if viewport_width.is_finite() {
            viewport_width.max(0.0) * self.viewport_fraction
        } else {
            0.0
        };
        self.min_distance_px.max(scaled)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.min_distance_px.is_finite() && self.min_distance_px > 0.0,
            "gesture.min-distance-px must be positive"
        );
        ensure!(
            self.viewport_fraction.is_finite()
                && self.viewport_fraction > 0.0
                && self.viewport_fraction <= 1.0,
            "gesture.viewport-fraction must be within (0, 1]"
        );
        ensure!(
            self.velocity_px_per_ms.is_finite() && self.velocity_px_per_ms > 0.0,
            "gesture.velocity-px-per-ms must be positive"
        );
        ensure!(
            self.commit_guard_ms.is_finite() && self.commit_guard_ms >= 0.0,
            "gesture.commit-guard-ms must be non-negative"
        );
        Ok(())
    }
}

/// Timing and styling of the open/close hero animation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct HeroTiming {
    pub duration_ms: u64,
    pub coarse_duration_ms: u64,
    /// Length of the plain fade used when no hero geometry is available.
    pub fade_ms: u64,
    /// Cubic-bezier control points `[x1, y1, x2, y2]`, shared by open and close.
    pub easing: [f64; 4],
    pub open_corner_radius_px: f64,
    pub close_corner_radius_px: f64,
}

impl Default for HeroTiming {
    fn default() -> Self {
        Self {
            duration_ms: 280,
            coarse_duration_ms: 180,
            fade_ms: 300,
            easing: CubicBezier::STANDARD,
            open_corner_radius_px: 4.0,
            close_corner_radius_px: 16.0,
        }
    }
}

impl HeroTiming {
    pub fn duration(&self, pointer: PointerClass) -> Duration {
        match pointer {
            PointerClass::Fine => Duration::from_millis(self.duration_ms),
            PointerClass::Coarse => Duration::from_millis(self.coarse_duration_ms),
        }
    }

    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }

    pub fn curve(&self) -> CubicBezier {
        CubicBezier::from_points(self.easing)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.duration_ms > 0, "hero.duration-ms must be greater than zero");
        ensure!(
            self.coarse_duration_ms > 0,
            "hero.coarse-duration-ms must be greater than zero"
        );
        ensure!(self.fade_ms > 0, "hero.fade-ms must be greater than zero");
        ensure!(
            self.easing.iter().all(|v| v.is_finite()),
            "hero.easing must contain finite numbers"
        );
        ensure!(
            (0.0..=1.0).contains(&self.easing[0]) && (0.0..=1.0).contains(&self.easing[2]),
            "hero.easing x control points must lie within [0, 1]"
        );
        for (field, value) in [
            ("open-corner-radius-px", self.open_corner_radius_px),
            ("close-corner-radius-px", self.close_corner_radius_px),
        ] {
            ensure!(
                value.is_finite() && value >= 0.0,
                "hero.{} must be non-negative",
                field
            );
        }
        Ok(())
    }
}

/// Duration of a single slide change inside the full-screen viewer.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct SlideTiming {
    pub duration_ms: u64,
    pub coarse_duration_ms: u64,
}

impl Default for SlideTiming {
    fn default() -> Self {
        Self {
            duration_ms: 300,
            coarse_duration_ms: 180,
        }
    }
}

impl SlideTiming {
    pub fn duration(&self, pointer: PointerClass) -> Duration {
        match pointer {
            PointerClass::Fine => Duration::from_millis(self.duration_ms),
            PointerClass::Coarse => Duration::from_millis(self.coarse_duration_ms),
        }
    }
}

/// Zoom range handed to the surface; zoom physics are the host's concern.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ZoomBounds {
    pub min_ratio: f64,
    pub max_ratio: f64,
}

impl Default for ZoomBounds {
    fn default() -> Self {
        Self {
            min_ratio: 1.0,
            max_ratio: 3.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    /// Location and naming of product gallery manifests.
    pub gallery: GalleryConfig,
    /// Input class of the host device.
    pub pointer: PointerClass,
    /// Swipe commit thresholds.
    pub gesture: GestureThresholds,
    /// Open/close hero animation timing.
    pub hero: HeroTiming,
    /// Slide change timing inside the viewer.
    pub slide: SlideTiming,
    /// Interval between animation frames, in ms.
    pub frame_interval_ms: u64,
    /// How many thumbnails the strip advances per step.
    pub thumbnail_step: usize,
    /// Zoom range passed through to the slide surface.
    pub zoom: ZoomBounds,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            gallery: GalleryConfig::default(),
            pointer: PointerClass::default(),
            gesture: GestureThresholds::default(),
            hero: HeroTiming::default(),
            slide: SlideTiming::default(),
            frame_interval_ms: 16,
            thumbnail_step: 3,
            zoom: ZoomBounds::default(),
        }
    }
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate invariants that serde defaults cannot express.
    pub fn validated(self) -> Result<Self> {
        self.gallery
            .validate("gallery")
            .context("invalid gallery configuration")?;
        self.gesture
            .validate()
            .context("invalid gesture configuration")?;
        self.hero.validate().context("invalid hero configuration")?;
        ensure!(
            self.slide.duration_ms > 0 && self.slide.coarse_duration_ms > 0,
            "slide durations must be greater than zero"
        );
        ensure!(
            self.frame_interval_ms > 0,
            "frame-interval-ms must be greater than zero"
        );
        ensure!(
            self.thumbnail_step > 0,
            "thumbnail-step must be greater than zero"
        );
        ensure!(
            self.zoom.min_ratio.is_finite()
                && self.zoom.max_ratio.is_finite()
                && self.zoom.min_ratio > 0.0,
            "zoom ratios must be positive"
        );
        ensure!(
            self.zoom.min_ratio <= self.zoom.max_ratio,
            "zoom.min-ratio must not exceed zoom.max-ratio"
        );
        Ok(self)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }

    pub fn hero_duration(&self) -> Duration {
        self.hero.duration(self.pointer)
    }

    pub fn slide_duration(&self) -> Duration {
        self.slide.duration(self.pointer)
    }
}
