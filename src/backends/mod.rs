//! Drawing backends. `recording` is always available; the rest sit behind
//! the feature of the same name.

#[cfg(feature = "cairo")]
pub mod cairo;
#[cfg(feature = "pixmap")]
pub mod pixmap;
pub mod recording;
#[cfg(feature = "svg")]
pub mod svg;

/// Parses `#rgb`, `#rgba`, `#rrggbb` and `#rrggbbaa` color strings into
/// straight-alpha RGBA. Anything else falls back to opaque black.
#[cfg(any(feature = "cairo", feature = "pixmap", feature = "svg"))]
pub(crate) fn parse_color(color: &str) -> [u8; 4] {
    fn nibble(hex: &str, i: usize) -> u8 {
        let v = u8::from_str_radix(&hex[i..i + 1], 16).unwrap_or(0);
        v << 4 | v
    }
    fn byte(hex: &str, i: usize) -> u8 {
        u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0)
    }

    let c = color.trim();
    if let Some(hex) = c.strip_prefix('#') {
        if hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            match hex.len() {
                3 => return [nibble(hex, 0), nibble(hex, 1), nibble(hex, 2), 255],
                4 => {
                    return [
                        nibble(hex, 0),
                        nibble(hex, 1),
                        nibble(hex, 2),
                        nibble(hex, 3),
                    ];
                }
                6 => return [byte(hex, 0), byte(hex, 2), byte(hex, 4), 255],
                8 => return [byte(hex, 0), byte(hex, 2), byte(hex, 4), byte(hex, 6)],
                _ => {}
            }
        }
    }

    [0, 0, 0, 255]
}

/// Splits a font string like "12.5px DejaVu Sans" into size and family.
#[cfg(any(feature = "cairo", feature = "pixmap", feature = "svg"))]
pub(crate) fn parse_font(font: &str) -> (f64, &str) {
    let mut size = 16.0;
    let mut family = "sans-serif";
    if let Some((head, tail)) = font.trim().split_once(' ') {
        if let Some(px) = head.strip_suffix("px") {
            if let Ok(v) = px.parse::<f64>() {
                size = v;
                family = tail.trim();
            }
        }
    } else if let Some(px) = font.trim().strip_suffix("px") {
        if let Ok(v) = px.parse::<f64>() {
            size = v;
        }
    }
    (size, family)
}

#[cfg(all(test, any(feature = "cairo", feature = "pixmap", feature = "svg")))]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_color("#ff0000"), [255, 0, 0, 255]);
        assert_eq!(parse_color("#ff000080"), [255, 0, 0, 128]);
        assert_eq!(parse_color("#f00"), [255, 0, 0, 255]);
        assert_eq!(parse_color("#f008"), [255, 0, 0, 136]);
        assert_eq!(parse_color("tomato"), [0, 0, 0, 255]);
    }

    #[test]
    fn parses_font_strings() {
        assert_eq!(parse_font("100px serif"), (100.0, "serif"));
        assert_eq!(parse_font("12.5px DejaVu Sans"), (12.5, "DejaVu Sans"));
        assert_eq!(parse_font("serif"), (16.0, "sans-serif"));
    }
}
