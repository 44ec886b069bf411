//! Confidence-to-visualization mapping.
//!
//! Everything here is a pure function of the confidence score except
//! [`MarkerAnimation`], which keeps the applied marker styles so a new
//! analysis always replays the slide from zero.

use crate::model::AnalysisResult;
use std::fmt;
use std::time::{Duration, Instant};

pub const SAFE_LABEL: &str = "✅ URL APPEARS SAFE";
pub const PHISHING_LABEL: &str = "⚠️ WARNING: PHISHING DETECTED";

const SATURATION: f64 = 80.0;
const BACKGROUND_LIGHTNESS: f64 = 96.0;
const FOREGROUND_LIGHTNESS: f64 = 20.0;

/// Hue in degrees: 120 (green) at confidence 0, 0 (red) at confidence 1.
/// Out-of-range confidences are not clamped.
pub fn hue(confidence: f64) -> f64 {
    120.0 - confidence * 120.0
}

/// Marker offset along the risk track, in percent.
pub fn marker_position(confidence: f64) -> f64 {
    confidence * 100.0
}

pub fn marker_label(confidence: f64) -> String {
    format!("{:.1}%", marker_position(confidence))
}

pub fn confidence_text(confidence: f64) -> String {
    format!("{:.2}%", confidence * 100.0)
}

pub fn status_label(is_malicious: bool) -> &'static str {
    if is_malicious { PHISHING_LABEL } else { SAFE_LABEL }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl Hsl {
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        let h = self.hue.rem_euclid(360.0) / 360.0;
        let s = (self.saturation / 100.0).clamp(0.0, 1.0);
        let l = (self.lightness / 100.0).clamp(0.0, 1.0);

        if s == 0.0 {
            let v = (l * 255.0).round() as u8;
            return (v, v, v);
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;

        let channel = |mut t: f64| {
            if t < 0.0 {
                t += 1.0;
            }
            if t > 1.0 {
                t -= 1.0;
            }
            let v = if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            };
            (v * 255.0).round() as u8
        };

        (channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({}, {}%, {}%)", self.hue, self.saturation, self.lightness)
    }
}

/// Background/foreground pair for the result region.
pub fn palette(confidence: f64) -> (Hsl, Hsl) {
    let hue = hue(confidence);
    (
        Hsl {
            hue,
            saturation: SATURATION,
            lightness: BACKGROUND_LIGHTNESS,
        },
        Hsl {
            hue,
            saturation: SATURATION,
            lightness: FOREGROUND_LIGHTNESS,
        },
    )
}

/// Everything the result region renders for one verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskView {
    pub status_label: &'static str,
    pub confidence_text: String,
    pub hue: f64,
    pub background: Hsl,
    pub foreground: Hsl,
    pub marker_percent: f64,
    pub marker_label: String,
}

impl RiskView {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let (background, foreground) = palette(result.confidence);
        Self {
            status_label: status_label(result.is_malicious),
            confidence_text: confidence_text(result.confidence),
            hue: hue(result.confidence),
            background,
            foreground,
            marker_percent: marker_position(result.confidence),
            marker_label: marker_label(result.confidence),
        }
    }
}

/// `cubic-bezier(x1, y1, x2, y2)` timing function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl CubicBezier {
    fn axis(a: f64, b: f64, t: f64) -> f64 {
        let u = 1.0 - t;
        3.0 * u * u * t * a + 3.0 * u * t * t * b + t * t * t
    }

    /// Eased progress for linear progress `p` in `[0, 1]`.
    pub fn ease(&self, p: f64) -> f64 {
        if p <= 0.0 {
            return 0.0;
        }
        if p >= 1.0 {
            return 1.0;
        }

        // x(t) is monotonic for control points inside [0, 1]
        let (mut lo, mut hi) = (0.0, 1.0);
        for _ in 0..40 {
            let mid = (lo + hi) / 2.0;
            if Self::axis(self.x1, self.x2, mid) < p {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Self::axis(self.y1, self.y2, (lo + hi) / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub duration: Duration,
    pub easing: CubicBezier,
}

impl Default for Transition {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(1),
            easing: CubicBezier {
                x1: 0.2,
                y1: 0.0,
                x2: 0.2,
                y2: 1.0,
            },
        }
    }
}

/// A marker style as applied to the track: where it sits and whether
/// moving it is animated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub position: f64,
    pub transition: Option<Transition>,
}

#[derive(Debug, Clone, Default)]
pub struct MarkerAnimation {
    applied: Vec<MarkerStyle>,
    armed_at: Option<Instant>,
    restarts: u64,
}

impl MarkerAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset-then-animate. The reset style (no transition, position 0) is
    /// committed before the timed transition toward `target` is applied,
    /// so the slide is visible even when `target` equals the previous one.
    pub fn restart(&mut self, target: f64, now: Instant) {
        self.applied.clear();
        self.applied.push(MarkerStyle {
            position: 0.0,
            transition: None,
        });
        self.applied.push(MarkerStyle {
            position: target,
            transition: Some(Transition::default()),
        });
        self.armed_at = Some(now);
        self.restarts += 1;
    }

    /// Styles applied by the latest restart, in order.
    pub fn applied_styles(&self) -> &[MarkerStyle] {
        &self.applied
    }

    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    pub fn target(&self) -> Option<f64> {
        self.applied.last().map(|style| style.position)
    }

    pub fn position_at(&self, now: Instant) -> f64 {
        let (Some(from), Some(to), Some(armed_at)) =
            (self.applied.first(), self.applied.last(), self.armed_at)
        else {
            return 0.0;
        };

        match to.transition {
            Some(transition) => {
                let elapsed = now.saturating_duration_since(armed_at);
                let linear =
                    (elapsed.as_secs_f64() / transition.duration.as_secs_f64()).min(1.0);
                from.position + (to.position - from.position) * transition.easing.ease(linear)
            }
            None => to.position,
        }
    }

    pub fn is_settled(&self, now: Instant) -> bool {
        match (self.applied.last(), self.armed_at) {
            (Some(MarkerStyle { transition: Some(t), .. }), Some(armed_at)) => {
                now.saturating_duration_since(armed_at) >= t.duration
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_hue_endpoints() {
        assert!(approx(hue(0.0), 120.0));
        assert!(approx(hue(1.0), 0.0));
        assert!(approx(hue(0.5), 60.0));
    }

    #[test]
    fn test_hue_and_position_follow_formula() {
        for i in 0..=20 {
            let c = i as f64 / 20.0;
            assert!(approx(hue(c), 120.0 * (1.0 - c)));
            assert!(approx(marker_position(c), 100.0 * c));
        }
    }

    #[test]
    fn test_out_of_range_is_not_clamped() {
        assert!(approx(hue(1.5), -60.0));
        assert!(approx(marker_position(-0.25), -25.0));
    }

    #[test]
    fn test_texts() {
        assert_eq!(confidence_text(0.04), "4.00%");
        assert_eq!(marker_label(0.04), "4.0%");
        assert_eq!(confidence_text(0.98765), "98.77%");
        assert_eq!(status_label(true), PHISHING_LABEL);
        assert_eq!(status_label(false), SAFE_LABEL);
    }

    #[test]
    fn test_palette_uses_fixed_saturation_and_lightness() {
        let (bg, fg) = palette(0.25);
        assert!(approx(bg.hue, 90.0));
        assert_eq!(bg.saturation, 80.0);
        assert_eq!(bg.lightness, 96.0);
        assert_eq!(fg.lightness, 20.0);
        assert_eq!(bg.to_string(), "hsl(90, 80%, 96%)");
    }

    #[test]
    fn test_hsl_to_rgb() {
        let green = Hsl { hue: 120.0, saturation: 100.0, lightness: 50.0 };
        assert_eq!(green.to_rgb(), (0, 255, 0));
        let red = Hsl { hue: 0.0, saturation: 100.0, lightness: 50.0 };
        assert_eq!(red.to_rgb(), (255, 0, 0));
        let grey = Hsl { hue: 42.0, saturation: 0.0, lightness: 50.0 };
        assert_eq!(grey.to_rgb(), (128, 128, 128));
    }

    #[test]
    fn test_easing_is_monotonic() {
        let easing = Transition::default().easing;
        assert_eq!(easing.ease(0.0), 0.0);
        assert_eq!(easing.ease(1.0), 1.0);
        let mut last = 0.0;
        for i in 1..=100 {
            let v = easing.ease(i as f64 / 100.0);
            assert!(v >= last);
            last = v;
        }
    }

    #[test]
    fn test_restart_resets_before_animating() {
        let start = Instant::now();
        let mut marker = MarkerAnimation::new();
        marker.restart(4.0, start);
        let settled = start + Duration::from_secs(2);
        assert!(approx(marker.position_at(settled), 4.0));

        // Same target again: the reset frame is still applied first
        let again = settled + Duration::from_millis(10);
        marker.restart(4.0, again);
        let styles = marker.applied_styles();
        assert_eq!(styles.len(), 2);
        assert_eq!(styles[0], MarkerStyle { position: 0.0, transition: None });
        assert_eq!(styles[1].position, 4.0);
        assert!(styles[1].transition.is_some());
        assert_eq!(marker.position_at(again), 0.0);
        assert!(!marker.is_settled(again));
        assert!(marker.position_at(again + Duration::from_millis(500)) > 0.0);
        assert!(marker.is_settled(again + Duration::from_secs(1)));
        assert_eq!(marker.restarts(), 2);
    }

    #[test]
    fn test_untouched_marker_sits_at_zero() {
        let marker = MarkerAnimation::new();
        assert_eq!(marker.position_at(Instant::now()), 0.0);
        assert!(marker.is_settled(Instant::now()));
        assert_eq!(marker.target(), None);
    }
}
