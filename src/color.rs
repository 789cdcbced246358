//! Sentiment score to display color
//!
//! The gradient goes from red (score -1.0) to green (score 1.0) in 100 steps,
//! interpolated in HSL like the usual `range_to` color helpers do.
use std::fmt;

use serde::{Serialize, Serializer};

use crate::tweetie::Tweet;

pub const GRADIENT_STEPS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    pub const GREEN: Color = Color { r: 0, g: 128, b: 0 };

    fn to_hsl(self) -> Hsl {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        if max == min {
            return Hsl { h: 0.0, s: 0.0, l };
        }
        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        Hsl { h: h / 6.0, s, l }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

// Templates get the CSS hex form
impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Hue, saturation and lightness, all in `0.0..=1.0`
#[derive(Debug, Clone, Copy)]
struct Hsl {
    h: f64,
    s: f64,
    l: f64,
}

impl Hsl {
    fn lerp(self, to: Hsl, t: f64) -> Hsl {
        Hsl {
            h: self.h + (to.h - self.h) * t,
            s: self.s + (to.s - self.s) * t,
            l: self.l + (to.l - self.l) * t,
        }
    }

    fn to_rgb(self) -> Color {
        if self.s == 0.0 {
            let v = channel(self.l);
            return Color { r: v, g: v, b: v };
        }
        let q = if self.l < 0.5 {
            self.l * (1.0 + self.s)
        } else {
            self.l + self.s - self.l * self.s
        };
        let p = 2.0 * self.l - q;
        Color {
            r: channel(hue_to_rgb(p, q, self.h + 1.0 / 3.0)),
            g: channel(hue_to_rgb(p, q, self.h)),
            b: channel(hue_to_rgb(p, q, self.h - 1.0 / 3.0)),
        }
    }
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn channel(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Precomputed colors, index 0 is the most negative score
pub struct Gradient {
    colors: Vec<Color>,
}

impl Gradient {
    pub fn new(from: Color, to: Color, steps: usize) -> Self {
        let (from, to) = (from.to_hsl(), to.to_hsl());
        let last = steps.saturating_sub(1).max(1) as f64;
        let colors = (0..steps)
            .map(|i| from.lerp(to, i as f64 / last).to_rgb())
            .collect();
        Gradient { colors }
    }

    pub fn red_to_green() -> Self {
        Gradient::new(Color::RED, Color::GREEN, GRADIENT_STEPS)
    }

    /// `floor((score + 1) * steps / 2)`, clamped to the last entry.
    /// A score of exactly 1.0 would land one past the end otherwise.
    pub fn index_for(&self, score: f64) -> usize {
        let raw = ((score + 1.0) * self.colors.len() as f64 / 2.0).floor();
        // NaN and negatives saturate to 0
        (raw as usize).min(self.colors.len().saturating_sub(1))
    }

    pub fn color_for(&self, score: f64) -> Color {
        self.colors[self.index_for(score)]
    }
}

/// A tweet paired with its display color, the tweet itself is untouched
#[derive(Debug, Serialize)]
pub struct ColoredTweet<'a> {
    #[serde(flatten)]
    pub tweet: &'a Tweet,
    pub color: Color,
}

/// Attach a gradient color to every tweet by its sentiment score
pub fn add_color<'a>(gradient: &Gradient, tweets: &'a [Tweet]) -> Vec<ColoredTweet<'a>> {
    tweets
        .iter()
        .map(|tweet| ColoredTweet {
            tweet,
            color: gradient.color_for(tweet.score),
        })
        .collect()
}
