//! Time-of-day color theme.
//!
//! Five anchor themes are pinned to points derived from sunrise and sunset.
//! Between two anchors the colors are blended on an eased ratio.

use chrono::NaiveDateTime;

const DAY_MS: f64 = 86_400_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Midnight,
    Morning,
    Day,
    Evening,
    Night,
}

/// Widget colors as `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub background_gradient1: String,
    pub background_gradient2: String,
    pub background_gradient2b: String,
    pub text: String,
}

struct Palette {
    background_gradient1: &'static str,
    background_gradient2: &'static str,
    background_gradient2b: &'static str,
    text: &'static str,
}

impl Anchor {
    fn palette(self) -> Palette {
        match self {
            // jet black
            Anchor::Midnight => Palette {
                background_gradient1: "#06083c",
                background_gradient2: "#0f0127",
                background_gradient2b: "#03093c",
                text: "#fdfdfd",
            },
            // pale blue
            Anchor::Morning => Palette {
                background_gradient1: "#d4e0f2",
                background_gradient2: "#f5f9fb",
                background_gradient2b: "#ddf2e7",
                text: "#05080a",
            },
            // sky blue
            Anchor::Day => Palette {
                background_gradient1: "#a6dcef",
                background_gradient2: "#f3f0f8",
                background_gradient2b: "#e0f2f1",
                text: "#05080a",
            },
            // orange
            Anchor::Evening => Palette {
                background_gradient1: "#f9d976",
                background_gradient2: "#f3f7ec",
                background_gradient2b: "#f9e3d5",
                text: "#05080a",
            },
            // dark blue
            Anchor::Night => Palette {
                background_gradient1: "#1f2437",
                background_gradient2: "#46385c",
                background_gradient2b: "#3a4f2d",
                text: "#fdfdfd",
            },
        }
    }
}

fn channel(color: &str, index: usize) -> f64 {
    color
        .get(1 + index * 2..3 + index * 2)
        .and_then(|hex| u8::from_str_radix(hex, 16).ok())
        .map_or(0.0, f64::from)
}

fn blend_rgb(a: &str, b: &str, ratio: f64) -> String {
    let mut out = String::with_capacity(7);
    out.push('#');
    for index in 0..3 {
        let value = channel(a, index) * (1.0 - ratio) + channel(b, index) * ratio;
        out.push_str(&format!("{:02x}", value.round().clamp(0.0, 255.0) as u8));
    }
    out
}

fn ease(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

fn cut(t: f64) -> f64 {
    if t < 0.5 {
        t.min(0.4)
    } else {
        t.max(0.6)
    }
}

/// Sharper than [`cut`], keeps the text readable against the background.
fn hyper_cut(t: f64) -> f64 {
    if t < 0.5 {
        t.min(0.1)
    } else {
        t.max(0.9)
    }
}

fn timestamp_ms(time: NaiveDateTime) -> f64 {
    time.and_utc().timestamp_millis() as f64
}

/// Anchors for yesterday, today and tomorrow, in time order.
fn schedule(sunrise: f64, sunset: f64) -> Vec<(f64, Anchor)> {
    let daylight = sunset - sunrise;
    let night = DAY_MS - daylight;

    let mut anchors: Vec<(f64, Anchor)> = [-1.0, 0.0, 1.0]
        .iter()
        .flat_map(|day| {
            let offset = day * DAY_MS;
            [
                (offset + sunrise + night / 6.0, Anchor::Morning),
                (offset + sunrise + daylight / 6.0 * 4.0, Anchor::Day),
                (offset + sunset - night / 6.0, Anchor::Evening),
                (offset + sunset + night / 6.0, Anchor::Night),
                (offset + sunset + night / 6.0 * 5.0, Anchor::Midnight),
            ]
        })
        .collect();
    anchors.sort_by(|a, b| a.0.total_cmp(&b.0));
    anchors
}

/// Theme for `current`, given the local sunrise and sunset of that day.
pub fn get_theme(current: NaiveDateTime, sunrise: NaiveDateTime, sunset: NaiveDateTime) -> Theme {
    let now = timestamp_ms(current);
    let anchors = schedule(timestamp_ms(sunrise), timestamp_ms(sunset));

    // Three days of anchors bracket any time on the day itself; clamp otherwise
    let before = anchors
        .iter()
        .rev()
        .find(|(ts, _)| *ts < now)
        .or_else(|| anchors.first())
        .copied();
    let after = anchors.iter().find(|(ts, _)| *ts >= now).or_else(|| anchors.last()).copied();

    let (Some(before), Some(after)) = (before, after) else {
        return theme_of(Anchor::Day);
    };

    let span = after.0 - before.0;
    let position = if span > 0.0 {
        ((now - before.0) / span).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let ratio = ease(position);

    let from = before.1.palette();
    let to = after.1.palette();

    Theme {
        background_gradient1: blend_rgb(from.background_gradient1, to.background_gradient1, ratio),
        background_gradient2: blend_rgb(
            from.background_gradient2,
            to.background_gradient2,
            cut(ratio),
        ),
        background_gradient2b: blend_rgb(
            from.background_gradient2b,
            to.background_gradient2b,
            cut(ratio),
        ),
        text: blend_rgb(from.text, to.text, hyper_cut(ratio)),
    }
}

fn theme_of(anchor: Anchor) -> Theme {
    let palette = anchor.palette();
    Theme {
        background_gradient1: palette.background_gradient1.to_string(),
        background_gradient2: palette.background_gradient2.to_string(),
        background_gradient2b: palette.background_gradient2b.to_string(),
        text: palette.text.to_string(),
    }
}
