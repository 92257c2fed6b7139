//! Canvas rasterization of the mounted greeting card.
//!
//! [`CanvasRegion`] is the browser [`CompositeRegion`]: it finds the card
//! and its `<img>` in the document by id, redraws both onto an offscreen
//! canvas at device resolution, lays the greeting text out with
//! [`CardLayout`], and encodes the canvas pixels as PNG.

use greetcard_core::{
    CardLayout, CompositeRegion, Dimensions, ExportError, GreetingFields, TEXT_COLOR,
    cover_crop, encode_rgba_png,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

/// `id` of the element that frames the card.
pub const CARD_ELEMENT_ID: &str = "greeting-card";

/// `id` of the card's background `<img>`.
pub const CARD_IMAGE_ID: &str = "greeting-card-image";

/// Errors that can occur while drawing the card.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    /// The card or its image isn't in the document yet.
    #[error("card is not mounted")]
    NotMounted,

    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for RasterError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

impl From<RasterError> for ExportError {
    fn from(err: RasterError) -> Self {
        match err {
            RasterError::NotMounted => Self::NotReady,
            RasterError::JsError(_) => Self::SerializationFailure(err.to_string()),
        }
    }
}

/// The on-screen card, captured with the text it should carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasRegion {
    fields: GreetingFields,
}

impl CanvasRegion {
    /// Region drawing `fields` over the mounted card image.
    #[must_use]
    pub const fn new(fields: GreetingFields) -> Self {
        Self { fields }
    }
}

impl CompositeRegion for CanvasRegion {
    fn is_ready(&self) -> bool {
        find_mounted().is_some()
    }

    async fn rasterize(&self) -> Result<Vec<u8>, ExportError> {
        if let Some((_, image)) = find_mounted() {
            // drawImage paints nothing until the bitmap is decoded.
            JsFuture::from(image.decode())
                .await
                .map_err(RasterError::from)?;
        }
        let (rgba, width, height) = draw(&self.fields)
            .inspect_err(|e| tracing::warn!("card rasterization failed: {e}"))?;
        tracing::debug!(width, height, "card rasterized");
        encode_rgba_png(&rgba, width, height)
    }
}

/// Locate the card frame and its image, if the image has loaded.
fn find_mounted() -> Option<(web_sys::Element, HtmlImageElement)> {
    let document = web_sys::window()?.document()?;
    let card = document.get_element_by_id(CARD_ELEMENT_ID)?;
    let image = document
        .get_element_by_id(CARD_IMAGE_ID)?
        .dyn_into::<HtmlImageElement>()
        .ok()?;
    (image.complete() && image.natural_width() > 0).then_some((card, image))
}

/// Draw the card onto an offscreen canvas and return its RGBA pixels.
fn draw(fields: &GreetingFields) -> Result<(Vec<u8>, u32, u32), RasterError> {
    let window = web_sys::window().ok_or_else(|| RasterError::JsError("no global window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| RasterError::JsError("no document".into()))?;
    let (card, image) = find_mounted().ok_or(RasterError::NotMounted)?;

    // Render at device resolution so the export is as sharp as the screen.
    let pixel_ratio = window.device_pixel_ratio().max(1.0);
    let (width, height) = device_size(card.client_width(), card.client_height(), pixel_ratio);
    if width == 0 || height == 0 {
        return Err(RasterError::NotMounted);
    }

    let canvas: HtmlCanvasElement = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|e| RasterError::JsError(format!("failed to cast element: {e:?}")))?;
    canvas.set_width(width);
    canvas.set_height(height);

    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| RasterError::JsError("no 2d context".into()))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|e| RasterError::JsError(format!("failed to cast context: {e:?}")))?;

    let (w, h) = (f64::from(width), f64::from(height));
    let src = cover_crop(
        Dimensions::new(image.natural_width(), image.natural_height()),
        w,
        h,
    );
    ctx.draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
        &image, src.x, src.y, src.width, src.height, 0.0, 0.0, w, h,
    )?;

    ctx.set_fill_style_str(TEXT_COLOR);
    ctx.set_text_baseline("middle");
    ctx.set_text_align("left");

    let layout = CardLayout::compute(w, h, fields, |text, style| {
        ctx.set_font(&style.css_font());
        ctx.measure_text(text).map_or(0.0, |m| m.width())
    });
    for line in &layout.lines {
        ctx.set_font(&line.style.css_font());
        ctx.fill_text(&line.text, line.x, line.y)?;
    }

    let pixels = ctx.get_image_data(0.0, 0.0, w, h)?.data();
    Ok((pixels.0, width, height))
}

/// CSS size scaled to device pixels.
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn device_size(css_width: i32, css_height: i32, pixel_ratio: f64) -> (u32, u32) {
    let scale = |v: i32| (f64::from(v.max(0)) * pixel_ratio).round() as u32;
    (scale(css_width), scale(css_height))
}
