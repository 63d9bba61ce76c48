use std::fmt;

/// An 8-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a colour from arbitrary integers, clamping each channel to `[0, 255]`.
    pub fn clamped(r: i64, g: i64, b: i64) -> Self {
        Self::new(clamp_channel(r), clamp_channel(g), clamp_channel(b))
    }

    /// Linear-light RGBA, as expected by an sRGB render target.
    pub fn to_linear_rgba(self) -> [f32; 4] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
            1.0,
        ]
    }

    pub fn to_wgpu(self) -> wgpu::Color {
        let [r, g, b, a] = self.to_linear_rgba();
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

fn srgb_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn clamp_channel(value: i64) -> u8 {
    value.clamp(0, 255) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

/// State behind the stroke-colour selection control.
///
/// Input from the control never fails: out-of-range numbers are clamped and
/// anything that does not parse as an integer counts as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorControl {
    color: Rgb,
}

impl ColorControl {
    pub fn new(initial: Rgb) -> Self {
        Self { color: initial }
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    pub fn set_channel(&mut self, channel: Channel, value: i64) {
        let value = clamp_channel(value);
        match channel {
            Channel::Red => self.color.r = value,
            Channel::Green => self.color.g = value,
            Channel::Blue => self.color.b = value,
        }
    }

    pub fn set_channel_text(&mut self, channel: Channel, text: &str) {
        self.set_channel(channel, parse_leading_int(text).unwrap_or(0));
    }

    pub fn channel(&self, channel: Channel) -> u8 {
        match channel {
            Channel::Red => self.color.r,
            Channel::Green => self.color.g,
            Channel::Blue => self.color.b,
        }
    }

    /// Applies a comma separated `R,G,B` triple; missing channels are left as they are.
    pub fn set_from_text(&mut self, text: &str) {
        let channels = [Channel::Red, Channel::Green, Channel::Blue];
        for (channel, part) in channels.into_iter().zip(text.split(',')) {
            self.set_channel_text(channel, part);
        }
    }
}

impl Default for ColorControl {
    fn default() -> Self {
        Self::new(Rgb::WHITE)
    }
}

/// Integer prefix of `text` (after leading whitespace and an optional sign).
/// `"42px"` parses as 42, `"abc"` does not parse. Saturates instead of overflowing.
fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        seen = true;
        value = value.saturating_mul(10).saturating_add((b - b'0') as i64);
    }

    seen.then_some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_numbers_are_clamped() {
        let mut control = ColorControl::default();
        control.set_channel_text(Channel::Red, "999");
        control.set_channel_text(Channel::Green, "-20");
        assert_eq!(control.channel(Channel::Red), 255);
        assert_eq!(control.channel(Channel::Green), 0);
    }

    #[test]
    fn non_numeric_text_becomes_zero() {
        let mut control = ColorControl::default();
        control.set_channel_text(Channel::Blue, "abc");
        control.set_channel_text(Channel::Green, "");
        assert_eq!(control.color(), Rgb::new(255, 0, 0));
    }

    #[test]
    fn leading_digits_are_kept() {
        assert_eq!(parse_leading_int(" 12px"), Some(12));
        assert_eq!(parse_leading_int("+7"), Some(7));
        assert_eq!(parse_leading_int("px12"), None);
        assert_eq!(parse_leading_int("99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn triple_text_sets_each_channel() {
        let mut control = ColorControl::new(Rgb::BLACK);
        control.set_from_text("999,abc,10");
        assert_eq!(control.color(), Rgb::new(255, 0, 10));
    }

    #[test]
    fn display_matches_css_rgb() {
        assert_eq!(Rgb::new(1, 2, 3).to_string(), "rgb(1,2,3)");
    }
}
