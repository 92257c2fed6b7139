//! Placement of the greeting text over the card image.
//!
//! The card is designed at a reference width of [`BASE_CARD_WIDTH`]
//! pixels and scaled uniformly to the exported size. The text block sits
//! at the card's center, shifted back by 42% of its own size, and holds
//! three parts from top to bottom:
//!
//! - `"{dear},"`: bold, indented, one line
//! - the message: up to two lines, wrapped at any character
//! - `"{from},"`: bold, indented, one line
//!
//! Overflowing text ends in an ellipsis. Measuring text is left to the
//! caller so the same layout drives both a canvas and a test double.

use crate::form::GreetingFields;
use crate::types::Dimensions;

/// Card width every other length is specified against.
pub const BASE_CARD_WIDTH: f64 = 436.0;

/// Text block width at base size.
const BLOCK_WIDTH: f64 = 184.0;

/// Left indent of the `dear` line at base size.
const DEAR_INDENT: f64 = 56.0;

/// Left indent of the `from` line at base size.
const FROM_INDENT: f64 = 44.0;

/// Height reserved for the message at base size.
const MESSAGE_HEIGHT: f64 = 63.0;

/// Font size at base size.
const FONT_PX: f64 = 12.0;

/// Line height as a multiple of the font size.
const LINE_HEIGHT: f64 = 2.6;

/// Fraction of its own size the block is shifted back from center.
const BLOCK_SHIFT: f64 = 0.42;

/// Maximum message lines.
const MESSAGE_LINES: usize = 2;

const ELLIPSIS: char = '…';

/// CSS font family for card text. The stylesheet's `.card-text` rule
/// uses the same value.
pub const FONT_FAMILY: &str = "ui-sans-serif, system-ui, sans-serif";

/// Card text color, shared with the stylesheet's `--card-text`.
pub const TEXT_COLOR: &str = "#000000";

/// Font settings for one line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in output pixels.
    pub font_px: f64,
    /// Semibold instead of regular.
    pub bold: bool,
}

impl TextStyle {
    /// Value for a CSS / canvas `font` property.
    #[must_use]
    pub fn css_font(self) -> String {
        let weight = if self.bold { 600 } else { 400 };
        format!("{weight} {}px {FONT_FAMILY}", self.font_px)
    }
}

/// One positioned line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Text to draw, already truncated to fit.
    pub text: String,
    /// Left edge.
    pub x: f64,
    /// Vertical center of the line box.
    pub y: f64,
    /// Width available to the line.
    pub max_width: f64,
    /// Font settings.
    pub style: TextStyle,
}

/// Positioned text for a card of a given size.
#[derive(Debug, Clone, PartialEq)]
pub struct CardLayout {
    /// Output size divided by [`BASE_CARD_WIDTH`].
    pub scale: f64,
    /// Lines in drawing order.
    pub lines: Vec<TextLine>,
}

impl CardLayout {
    /// Lay out `fields` on a `width` x `height` card.
    ///
    /// `measure` returns the rendered width of a string in the given style.
    pub fn compute(
        width: f64,
        height: f64,
        fields: &GreetingFields,
        mut measure: impl FnMut(&str, TextStyle) -> f64,
    ) -> Self {
        let scale = width / BASE_CARD_WIDTH;
        let font_px = FONT_PX * scale;
        let line_height = font_px * LINE_HEIGHT;
        let block_width = BLOCK_WIDTH * scale;
        let block_height = 2.0f64.mul_add(line_height, MESSAGE_HEIGHT * scale);

        let left = BLOCK_SHIFT.mul_add(-block_width, width / 2.0);
        let top = BLOCK_SHIFT.mul_add(-block_height, height / 2.0);

        let bold = TextStyle {
            font_px,
            bold: true,
        };
        let regular = TextStyle {
            font_px,
            bold: false,
        };

        let mut lines = Vec::with_capacity(2 + MESSAGE_LINES);

        let dear_width = DEAR_INDENT.mul_add(-scale, block_width);
        lines.push(TextLine {
            text: fit_line(&format!("{},", fields.dear()), dear_width, bold, &mut measure),
            x: DEAR_INDENT.mul_add(scale, left),
            y: line_height.mul_add(0.5, top),
            max_width: dear_width,
            style: bold,
        });

        let message_top = top + line_height;
        for (i, text) in wrap_lines(
            fields.message(),
            block_width,
            MESSAGE_LINES,
            regular,
            &mut measure,
        )
        .into_iter()
        .enumerate()
        {
            #[expect(clippy::cast_precision_loss)]
            let row = i as f64;
            lines.push(TextLine {
                text,
                x: left,
                y: line_height.mul_add(row + 0.5, message_top),
                max_width: block_width,
                style: regular,
            });
        }

        let from_width = FROM_INDENT.mul_add(-scale, block_width);
        lines.push(TextLine {
            text: fit_line(&format!("{},", fields.from()), from_width, bold, &mut measure),
            x: FROM_INDENT.mul_add(scale, left),
            y: line_height.mul_add(0.5, MESSAGE_HEIGHT.mul_add(scale, message_top)),
            max_width: from_width,
            style: bold,
        });

        Self { scale, lines }
    }
}

/// Return `text` if it fits, otherwise its longest prefix that fits with
/// an ellipsis appended.
fn fit_line(
    text: &str,
    max_width: f64,
    style: TextStyle,
    measure: &mut impl FnMut(&str, TextStyle) -> f64,
) -> String {
    if measure(text, style) <= max_width {
        return text.to_owned();
    }
    ellipsize(text, max_width, style, measure)
}

/// Longest prefix of `text` that fits with an ellipsis appended.
fn ellipsize(
    text: &str,
    max_width: f64,
    style: TextStyle,
    measure: &mut impl FnMut(&str, TextStyle) -> f64,
) -> String {
    let chars: Vec<char> = text.chars().collect();
    for n in (0..=chars.len()).rev() {
        let mut candidate: String = chars[..n].iter().collect();
        candidate.push(ELLIPSIS);
        if measure(&candidate, style) <= max_width {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

/// Break `text` into at most `max_lines` lines no wider than `max_width`.
///
/// Newlines start a new line; otherwise lines break between any two
/// characters. When lines are dropped the last kept line ends in an
/// ellipsis.
fn wrap_lines(
    text: &str,
    max_width: f64,
    max_lines: usize,
    style: TextStyle,
    measure: &mut impl FnMut(&str, TextStyle) -> f64,
) -> Vec<String> {
    if text.is_empty() || max_lines == 0 {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for ch in collapse_spaces(paragraph).chars() {
            let mut candidate = current.clone();
            candidate.push(ch);
            if !current.is_empty() && measure(&candidate, style) > max_width {
                lines.push(std::mem::take(&mut current));
                current.push(ch);
            } else {
                current = candidate;
            }
        }
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.pop() {
            lines.push(ellipsize(&last, max_width, style, measure));
        }
    }
    lines
}

/// Collapse runs of spaces and tabs to one space and trim the ends, as
/// CSS `white-space: pre-line` does within a line.
fn collapse_spaces(paragraph: &str) -> String {
    paragraph
        .split([' ', '\t'])
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Source rectangle in image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// The centered part of `source` that fills a `width` x `height` box
/// without distortion (CSS `object-fit: cover`).
#[must_use]
pub fn cover_crop(source: Dimensions, width: f64, height: f64) -> SourceRect {
    let sw = f64::from(source.width);
    let sh = f64::from(source.height);
    let full = SourceRect {
        x: 0.0,
        y: 0.0,
        width: sw,
        height: sh,
    };
    if sw <= 0.0 || sh <= 0.0 || width <= 0.0 || height <= 0.0 {
        return full;
    }

    let scale = (width / sw).max(height / sh);
    let crop_w = width / scale;
    let crop_h = height / scale;
    SourceRect {
        x: (sw - crop_w) / 2.0,
        y: (sh - crop_h) / 2.0,
        width: crop_w,
        height: crop_h,
    }
}
