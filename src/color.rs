// Copyright Sebastian Wiesner <sebastian@swsnr.de>

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Colour handling for SGR output.
//!
//! Styles name colours either as `#rrggbb` hex strings or as decimal xterm
//! palette indices.  Hex colours render as 24-bit SGR parameters on terminals
//! which advertise truecolor support, and degrade to the nearest xterm-256
//! palette entry everywhere else.

/// The colour capabilities of the target terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorProfile {
    /// 24-bit RGB SGR parameters.
    TrueColor,
    /// The xterm 256 colour palette.
    Ansi256,
}

impl ColorProfile {
    /// Detect the colour profile from the process environment.
    ///
    /// Follows the `COLORTERM` convention: `truecolor` (or the older `24bit`
    /// spelling) selects [`ColorProfile::TrueColor`], anything else falls
    /// back to the 256 colour palette.
    pub fn detect() -> Self {
        match std::env::var("COLORTERM") {
            Ok(value) if value == "truecolor" || value == "24bit" => ColorProfile::TrueColor,
            _ => ColorProfile::Ansi256,
        }
    }
}

impl Default for ColorProfile {
    fn default() -> Self {
        ColorProfile::detect()
    }
}

/// Parse a `#rrggbb` hex colour.
pub(crate) fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let digits = color.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some((r, g, b))
}

/// The SGR parameter fragment for a colour given as a style value.
///
/// `spec` is either a hex colour or a decimal palette index; anything else
/// yields `None` and the attribute is dropped.  The fragment comes without
/// the CSI framing, e.g. `38;5;63` for a palette foreground.
pub(crate) fn sgr_color(spec: &str, background: bool, profile: ColorProfile) -> Option<String> {
    let base = if background { 48 } else { 38 };
    if let Some((r, g, b)) = parse_hex(spec) {
        return Some(match profile {
            ColorProfile::TrueColor => format!("{base};2;{r};{g};{b}"),
            ColorProfile::Ansi256 => format!("{base};5;{}", ansi256(r, g, b)),
        });
    }
    spec.parse::<u8>().ok().map(|index| format!("{base};5;{index}"))
}

/// Levels of the 6×6×6 xterm colour cube.
const CUBE_LEVELS: [u8; 6] = [0x00, 0x5f, 0x87, 0xaf, 0xd7, 0xff];

fn cube_channel(value: u8) -> usize {
    if value < 48 {
        0
    } else if value < 115 {
        1
    } else {
        ((value as usize) - 35) / 40
    }
}

/// Map an RGB colour to the nearest xterm-256 palette index.
///
/// Quantise each channel onto the colour cube, then compare against the
/// nearest of the 24 grays, taking whichever candidate is closer in Lab
/// space.  Gray wins only when strictly closer.
pub(crate) fn ansi256(r: u8, g: u8, b: u8) -> u8 {
    let qr = cube_channel(r);
    let qg = cube_channel(g);
    let qb = cube_channel(b);
    let cube = (CUBE_LEVELS[qr], CUBE_LEVELS[qg], CUBE_LEVELS[qb]);

    let average = (r as usize + g as usize + b as usize) / 3;
    let gray_index = if average > 238 {
        23
    } else {
        average.saturating_sub(3) / 10
    };
    let gray_level = (8 + 10 * gray_index) as u8;
    let gray = (gray_level, gray_level, gray_level);

    let target = lab(r, g, b);
    if distance(target, lab(gray.0, gray.1, gray.2)) < distance(target, lab(cube.0, cube.1, cube.2))
    {
        232 + gray_index as u8
    } else {
        16 + (36 * qr + 6 * qg + qb) as u8
    }
}

fn linearize(channel: u8) -> f64 {
    let c = channel as f64 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f64) -> f64 {
    if t > 0.008856 {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

/// CIE Lab coordinates under the D65 white point.
fn lab(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let rl = linearize(r);
    let gl = linearize(g);
    let bl = linearize(b);

    let x = 0.4124564 * rl + 0.3575761 * gl + 0.1804375 * bl;
    let y = 0.2126729 * rl + 0.7151522 * gl + 0.0721750 * bl;
    let z = 0.0193339 * rl + 0.1191920 * gl + 0.9503041 * bl;

    let fx = lab_f(x / 0.95047);
    let fy = lab_f(y / 1.0);
    let fz = lab_f(z / 1.08883);

    (116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

fn distance(a: (f64, f64, f64), b: (f64, f64, f64)) -> f64 {
    let dl = a.0 - b.0;
    let da = a.1 - b.1;
    let db = a.2 - b.2;
    (dl * dl + da * da + db * db).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn detect_follows_colorterm() {
        temp_env::with_var("COLORTERM", Some("truecolor"), || {
            assert_eq!(ColorProfile::detect(), ColorProfile::TrueColor);
        });
        temp_env::with_var("COLORTERM", None::<&str>, || {
            assert_eq!(ColorProfile::detect(), ColorProfile::Ansi256);
        });
        temp_env::with_var("COLORTERM", Some("8bit"), || {
            assert_eq!(ColorProfile::detect(), ColorProfile::Ansi256);
        });
    }

    #[test]
    fn parse_hex_colors() {
        assert_eq!(parse_hex("#000000"), Some((0, 0, 0)));
        assert_eq!(parse_hex("#ff00Ab"), Some((0xff, 0x00, 0xab)));
        assert_eq!(parse_hex("ff00ab"), None);
        assert_eq!(parse_hex("#ff00a"), None);
        assert_eq!(parse_hex("#gg0000"), None);
    }

    #[test]
    fn palette_corners() {
        assert_eq!(ansi256(0, 0, 0), 16);
        assert_eq!(ansi256(0xff, 0xff, 0xff), 231);
        assert_eq!(ansi256(0xff, 0, 0), 196);
        assert_eq!(ansi256(0, 0xff, 0), 46);
        assert_eq!(ansi256(0x5f, 0x87, 0xaf), 67);
    }

    #[test]
    fn palette_prefers_close_grays() {
        // 0x80 averages to 128, and the gray ramp has an exact match at
        // level 128 (entry 12) while the cube can only offer 0x87.
        assert_eq!(ansi256(0x80, 0x80, 0x80), 244);
    }

    #[test]
    fn palette_mapping_is_deterministic() {
        let first = sgr_color("#c0ffee", false, ColorProfile::Ansi256);
        let second = sgr_color("#c0ffee", false, ColorProfile::Ansi256);
        assert_eq!(first, second);
    }

    #[test]
    fn sgr_color_fragments() {
        assert_eq!(
            sgr_color("#ff0000", false, ColorProfile::TrueColor).unwrap(),
            "38;2;255;0;0"
        );
        assert_eq!(
            sgr_color("#ff0000", true, ColorProfile::TrueColor).unwrap(),
            "48;2;255;0;0"
        );
        assert_eq!(
            sgr_color("#ff0000", false, ColorProfile::Ansi256).unwrap(),
            "38;5;196"
        );
        assert_eq!(sgr_color("63", true, ColorProfile::Ansi256).unwrap(), "48;5;63");
        // Palette indices pass through unchanged even on truecolor terminals.
        assert_eq!(sgr_color("63", false, ColorProfile::TrueColor).unwrap(), "38;5;63");
        assert_eq!(sgr_color("rebeccapurple", false, ColorProfile::Ansi256), None);
        assert_eq!(sgr_color("300", false, ColorProfile::Ansi256), None);
    }
}
