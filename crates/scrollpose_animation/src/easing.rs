//! Easing functions for keyframe segments
//!
//! Curves are addressed by the dotted names the timeline editor uses
//! (`power2.out`, `expo.inOut`, `elastic.out`, ...). Every curve maps 0 to 0
//! and 1 to 1; the overshoot families (`back`, `elastic`) may leave [0, 1] in
//! between.

use std::borrow::Cow;
use std::f32::consts::PI;
use std::fmt;

use tracing::warn;

/// Easing names offered by the timeline editor
pub const EDITOR_EASINGS: [&str; 12] = [
    "power1.out",
    "power2.out",
    "power3.out",
    "power1.inOut",
    "power2.inOut",
    "power3.inOut",
    "expo.inOut",
    "circ.inOut",
    "back.inOut",
    "elastic.out",
    "bounce.out",
    "sine.inOut",
];

const BACK_OVERSHOOT: f32 = 1.70158;

/// Easing function type
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    #[default]
    Linear,
    Power1In,
    Power1Out,
    Power1InOut,
    Power2In,
    Power2Out,
    Power2InOut,
    Power3In,
    Power3Out,
    Power3InOut,
    Power4In,
    Power4Out,
    Power4InOut,
    SineIn,
    SineOut,
    SineInOut,
    ExpoIn,
    ExpoOut,
    ExpoInOut,
    CircIn,
    CircOut,
    CircInOut,
    BackIn,
    BackOut,
    BackInOut,
    ElasticIn,
    ElasticOut,
    ElasticInOut,
    BounceIn,
    BounceOut,
    BounceInOut,
    CubicBezier(f32, f32, f32, f32),
}

#[derive(Clone, Copy)]
enum Direction {
    In,
    Out,
    InOut,
}

impl Direction {
    fn pick(self, ease_in: Easing, ease_out: Easing, ease_in_out: Easing) -> Easing {
        match self {
            Direction::In => ease_in,
            Direction::Out => ease_out,
            Direction::InOut => ease_in_out,
        }
    }
}

impl Easing {
    /// Resolve an editor easing name.
    ///
    /// Accepts `family.direction` names (case-insensitive), bare family names
    /// (which default to `.out`), the `quad`/`cubic`/`quart`/`quint` aliases,
    /// `linear`/`none`/`power0`, and `cubic-bezier(x1, y1, x2, y2)`.
    pub fn from_name(name: &str) -> Option<Easing> {
        let name = name.trim().to_ascii_lowercase();

        if let Some(args) = name
            .strip_prefix("cubic-bezier(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_bezier(args);
        }

        let (family, direction) = match name.split_once('.') {
            Some((family, direction)) => (family, direction),
            None => (name.as_str(), "out"),
        };

        let direction = match direction {
            "in" => Direction::In,
            "out" => Direction::Out,
            "inout" => Direction::InOut,
            _ => return None,
        };

        use Easing::*;
        let easing = match family {
            "linear" | "none" | "power0" => Linear,
            "power1" | "quad" => direction.pick(Power1In, Power1Out, Power1InOut),
            "power2" | "cubic" => direction.pick(Power2In, Power2Out, Power2InOut),
            "power3" | "quart" => direction.pick(Power3In, Power3Out, Power3InOut),
            "power4" | "quint" => direction.pick(Power4In, Power4Out, Power4InOut),
            "sine" => direction.pick(SineIn, SineOut, SineInOut),
            "expo" => direction.pick(ExpoIn, ExpoOut, ExpoInOut),
            "circ" => direction.pick(CircIn, CircOut, CircInOut),
            "back" => direction.pick(BackIn, BackOut, BackInOut),
            "elastic" => direction.pick(ElasticIn, ElasticOut, ElasticInOut),
            "bounce" => direction.pick(BounceIn, BounceOut, BounceInOut),
            _ => return None,
        };
        Some(easing)
    }

    /// Canonical editor name of this curve
    pub fn name(&self) -> Cow<'static, str> {
        use Easing::*;
        let name = match self {
            Linear => "linear",
            Power1In => "power1.in",
            Power1Out => "power1.out",
            Power1InOut => "power1.inOut",
            Power2In => "power2.in",
            Power2Out => "power2.out",
            Power2InOut => "power2.inOut",
            Power3In => "power3.in",
            Power3Out => "power3.out",
            Power3InOut => "power3.inOut",
            Power4In => "power4.in",
            Power4Out => "power4.out",
            Power4InOut => "power4.inOut",
            SineIn => "sine.in",
            SineOut => "sine.out",
            SineInOut => "sine.inOut",
            ExpoIn => "expo.in",
            ExpoOut => "expo.out",
            ExpoInOut => "expo.inOut",
            CircIn => "circ.in",
            CircOut => "circ.out",
            CircInOut => "circ.inOut",
            BackIn => "back.in",
            BackOut => "back.out",
            BackInOut => "back.inOut",
            ElasticIn => "elastic.in",
            ElasticOut => "elastic.out",
            ElasticInOut => "elastic.inOut",
            BounceIn => "bounce.in",
            BounceOut => "bounce.out",
            BounceInOut => "bounce.inOut",
            CubicBezier(x1, y1, x2, y2) => {
                return Cow::Owned(format!("cubic-bezier({x1}, {y1}, {x2}, {y2})"))
            }
        };
        Cow::Borrowed(name)
    }

    /// Whether the curve can leave [0, 1] between its endpoints
    pub fn overshoots(&self) -> bool {
        match self {
            Easing::BackIn
            | Easing::BackOut
            | Easing::BackInOut
            | Easing::ElasticIn
            | Easing::ElasticOut
            | Easing::ElasticInOut => true,
            Easing::CubicBezier(_, y1, _, y2) => {
                !(0.0..=1.0).contains(y1) || !(0.0..=1.0).contains(y2)
            }
            _ => false,
        }
    }

    /// Apply the easing function to a progress value.
    ///
    /// Input is clamped to [0, 1] (NaN counts as 0). Output is exact at both
    /// endpoints but may overshoot in between.
    pub fn apply(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        match self {
            Easing::Linear => t,
            Easing::Power1In => power_in(t, 2),
            Easing::Power1Out => power_out(t, 2),
            Easing::Power1InOut => power_in_out(t, 2),
            Easing::Power2In => power_in(t, 3),
            Easing::Power2Out => power_out(t, 3),
            Easing::Power2InOut => power_in_out(t, 3),
            Easing::Power3In => power_in(t, 4),
            Easing::Power3Out => power_out(t, 4),
            Easing::Power3InOut => power_in_out(t, 4),
            Easing::Power4In => power_in(t, 5),
            Easing::Power4Out => power_out(t, 5),
            Easing::Power4InOut => power_in_out(t, 5),
            Easing::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Easing::SineOut => (t * PI / 2.0).sin(),
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
            Easing::ExpoIn => 2f32.powf(10.0 * t - 10.0),
            Easing::ExpoOut => 1.0 - 2f32.powf(-10.0 * t),
            Easing::ExpoInOut => {
                if t < 0.5 {
                    2f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Easing::CircIn => 1.0 - (1.0 - t * t).sqrt(),
            Easing::CircOut => (1.0 - (t - 1.0).powi(2)).sqrt(),
            Easing::CircInOut => {
                if t < 0.5 {
                    (1.0 - (1.0 - (2.0 * t).powi(2)).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).sqrt() + 1.0) / 2.0
                }
            }
            Easing::BackIn => {
                let c3 = BACK_OVERSHOOT + 1.0;
                c3 * t * t * t - BACK_OVERSHOOT * t * t
            }
            Easing::BackOut => {
                let c3 = BACK_OVERSHOOT + 1.0;
                1.0 + c3 * (t - 1.0).powi(3) + BACK_OVERSHOOT * (t - 1.0).powi(2)
            }
            Easing::BackInOut => {
                let c2 = BACK_OVERSHOOT * 1.525;
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((c2 + 1.0) * 2.0 * t - c2)) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((c2 + 1.0) * (t * 2.0 - 2.0) + c2) + 2.0) / 2.0
                }
            }
            Easing::ElasticIn => {
                let c4 = (2.0 * PI) / 3.0;
                -(2f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * c4).sin()
            }
            Easing::ElasticOut => {
                let c4 = (2.0 * PI) / 3.0;
                2f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
            }
            Easing::ElasticInOut => {
                let c5 = (2.0 * PI) / 4.5;
                if t < 0.5 {
                    -(2f32.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * c5).sin()) / 2.0
                } else {
                    (2f32.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * c5).sin()) / 2.0 + 1.0
                }
            }
            Easing::BounceIn => 1.0 - bounce_out(1.0 - t),
            Easing::BounceOut => bounce_out(t),
            Easing::BounceInOut => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier_ease(t, *x1, *y1, *x2, *y2),
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Ease `x` with the curve called `name`.
///
/// Unknown names degrade to linear with a warning rather than failing, so a
/// half-typed easing in the editor never stops the animation.
pub fn ease(name: &str, x: f32) -> f32 {
    resolve_or_linear(name).apply(x)
}

/// Resolve `name`, falling back to [`Easing::Linear`] for unknown names
pub fn resolve_or_linear(name: &str) -> Easing {
    Easing::from_name(name).unwrap_or_else(|| {
        warn!("Unknown easing '{}', falling back to linear", name);
        Easing::Linear
    })
}

#[inline]
fn power_in(t: f32, exp: i32) -> f32 {
    t.powi(exp)
}

#[inline]
fn power_out(t: f32, exp: i32) -> f32 {
    1.0 - (1.0 - t).powi(exp)
}

#[inline]
fn power_in_out(t: f32, exp: i32) -> f32 {
    if t < 0.5 {
        2f32.powi(exp - 1) * t.powi(exp)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(exp) / 2.0
    }
}

fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

fn parse_bezier(args: &str) -> Option<Easing> {
    let mut values = args.split(',').map(|v| v.trim().parse::<f32>());
    let x1 = values.next()?.ok()?;
    let y1 = values.next()?.ok()?;
    let x2 = values.next()?.ok()?;
    let y2 = values.next()?.ok()?;
    if values.next().is_some() {
        return None;
    }
    // x control points must stay in [0, 1] for the curve to be a function of time
    let finite = [x1, y1, x2, y2].iter().all(|v| v.is_finite());
    if !finite || !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
        return None;
    }
    Some(Easing::CubicBezier(x1, y1, x2, y2))
}

/// Cubic bezier easing calculation (matches the CSS `cubic-bezier()` timing function).
///
/// Uses Newton-Raphson with binary-search fallback for robustness.
/// Computes in f64 internally to avoid f32 precision jitter.
fn cubic_bezier_ease(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let x = t as f64;
    let x1 = x1 as f64;
    let y1 = y1 as f64;
    let x2 = x2 as f64;
    let y2 = y2 as f64;

    let mut p = x;
    for _ in 0..8 {
        let err = bezier_sample(p, x1, x2) - x;
        if err.abs() < 1e-7 {
            return bezier_sample(p, y1, y2) as f32;
        }
        let slope = bezier_slope(p, x1, x2);
        if slope.abs() < 1e-7 {
            break;
        }
        p -= err / slope;
    }

    // Binary search fallback (always converges)
    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    p = x;
    for _ in 0..20 {
        let val = bezier_sample(p, x1, x2);
        if (val - x).abs() < 1e-7 {
            break;
        }
        if val < x {
            lo = p;
        } else {
            hi = p;
        }
        p = (lo + hi) * 0.5;
    }

    bezier_sample(p, y1, y2) as f32
}

/// B(t) = 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³, in Horner form
#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 31] = [
        Easing::Linear,
        Easing::Power1In,
        Easing::Power1Out,
        Easing::Power1InOut,
        Easing::Power2In,
        Easing::Power2Out,
        Easing::Power2InOut,
        Easing::Power3In,
        Easing::Power3Out,
        Easing::Power3InOut,
        Easing::Power4In,
        Easing::Power4Out,
        Easing::Power4InOut,
        Easing::SineIn,
        Easing::SineOut,
        Easing::SineInOut,
        Easing::ExpoIn,
        Easing::ExpoOut,
        Easing::ExpoInOut,
        Easing::CircIn,
        Easing::CircOut,
        Easing::CircInOut,
        Easing::BackIn,
        Easing::BackOut,
        Easing::BackInOut,
        Easing::ElasticIn,
        Easing::ElasticOut,
        Easing::ElasticInOut,
        Easing::BounceIn,
        Easing::BounceOut,
        Easing::BounceInOut,
    ];

    #[test]
    fn test_endpoints_are_exact() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{easing} at 0");
            assert_eq!(easing.apply(1.0), 1.0, "{easing} at 1");
        }
    }

    #[test]
    fn test_input_is_clamped() {
        for easing in ALL {
            assert_eq!(easing.apply(-3.0), 0.0, "{easing} below range");
            assert_eq!(easing.apply(7.5), 1.0, "{easing} above range");
            assert_eq!(easing.apply(f32::NAN), 0.0, "{easing} on NaN");
        }
    }

    #[test]
    fn test_non_overshooting_curves_stay_in_range() {
        for easing in ALL.iter().filter(|e| !e.overshoots()) {
            for i in 0..=100 {
                let y = easing.apply(i as f32 / 100.0);
                assert!(
                    (-1e-6..=1.0 + 1e-6).contains(&y),
                    "{easing} left [0, 1]: {y}"
                );
            }
        }
    }

    #[test]
    fn test_overshooting_curves_leave_range() {
        assert!(Easing::BackInOut.apply(0.1) < 0.0);
        assert!(Easing::BackOut.apply(0.7) > 1.0);
        assert!(Easing::ElasticOut.apply(0.1) > 1.0);
    }

    #[test]
    fn test_power_curves() {
        assert!((Easing::Power1In.apply(0.5) - 0.25).abs() < 1e-6);
        assert!((Easing::Power2Out.apply(0.5) - 0.875).abs() < 1e-6);
        assert!((Easing::Power3InOut.apply(0.25) - 8.0 * 0.25f32.powi(4)).abs() < 1e-6);
        for easing in [
            Easing::Power1InOut,
            Easing::Power2InOut,
            Easing::Power3InOut,
            Easing::SineInOut,
            Easing::ExpoInOut,
            Easing::CircInOut,
        ] {
            assert!((easing.apply(0.5) - 0.5).abs() < 1e-5, "{easing} midpoint");
        }
    }

    #[test]
    fn test_from_name_resolves_editor_options() {
        for name in EDITOR_EASINGS {
            let easing = Easing::from_name(name);
            assert!(easing.is_some(), "{name} should resolve");
            assert_eq!(easing.map(|e| e.name().into_owned()), Some(name.to_string()));
        }
    }

    #[test]
    fn test_from_name_aliases() {
        assert_eq!(Easing::from_name("power2"), Some(Easing::Power2Out));
        assert_eq!(Easing::from_name("quad.in"), Some(Easing::Power1In));
        assert_eq!(Easing::from_name("Expo.InOut"), Some(Easing::ExpoInOut));
        assert_eq!(Easing::from_name("none"), Some(Easing::Linear));
        assert_eq!(Easing::from_name(" linear "), Some(Easing::Linear));
        assert_eq!(Easing::from_name("wobble.out"), None);
        assert_eq!(Easing::from_name("power2.sideways"), None);
    }

    #[test]
    fn test_from_name_cubic_bezier() {
        assert_eq!(
            Easing::from_name("cubic-bezier(0.25, 0.1, 0.25, 1)"),
            Some(Easing::CubicBezier(0.25, 0.1, 0.25, 1.0))
        );
        assert_eq!(Easing::from_name("cubic-bezier(1.5, 0, 0, 1)"), None);
        assert_eq!(Easing::from_name("cubic-bezier(0, 0, 1)"), None);
    }

    #[test]
    fn test_cubic_bezier_linear_identity() {
        let linear = Easing::CubicBezier(0.0, 0.0, 1.0, 1.0);
        for i in 1..10 {
            let t = i as f32 / 10.0;
            assert!((linear.apply(t) - t).abs() < 1e-4);
        }
    }

    #[test]
    fn test_unknown_name_falls_back_to_linear() {
        assert_eq!(ease("definitely.not.a.curve", 0.3), 0.3);
        assert_eq!(ease("", 0.75), 0.75);
        assert_eq!(ease("power1.in", 0.5), 0.25);
    }
}
