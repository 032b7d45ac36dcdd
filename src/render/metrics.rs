//! Text width estimation for the builtin Helvetica font.
//!
//! Builtin PDF fonts carry no metrics inside the document, so centering needs
//! the advance widths from the Adobe Helvetica AFM. Values are in 1/1000 em.
//! Characters outside the table use the width of a digit.

const DEFAULT_ADVANCE: u32 = 556;

fn advance(c: char) -> u32 {
    match c {
        ' ' | ',' | '.' | '/' | ':' | ';' | 'f' | 't' | 'I' | '!' => 278,
        'i' | 'j' | 'l' | '\'' => 222,
        '|' => 260,
        '-' | '(' | ')' | 'r' => 333,
        '0'..='9' | '#' | '$' | '?' | '_' => 556,
        'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' | 'J' => 500,
        'a' | 'b' | 'd' | 'e' | 'g' | 'h' | 'n' | 'o' | 'p' | 'q' | 'u' | 'L' => 556,
        'm' | 'M' => 833,
        'w' => 722,
        'F' | 'T' | 'Z' => 611,
        'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' => 667,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' => 722,
        'G' | 'O' | 'Q' => 778,
        'W' => 944,
        _ => DEFAULT_ADVANCE,
    }
}

/// Width of `text` in points at `font_size`.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text.chars().map(advance).sum();
    units as f32 * font_size / 1000.0
}

/// Left edge that centers `text` inside a box starting at `x` of `width`.
pub fn centered_x(text: &str, font_size: f32, x: f32, width: f32) -> f32 {
    x + (width - text_width(text, font_size)) / 2.0
}
