//! Closed vocabularies referenced by pipeline steps: colors, anchoring,
//! resampling filters and the sRGB color-filter commands.
//!
//! Every type here serializes to the exact tagged shape the engine protocol
//! expects, so a step payload can embed them directly.

/// A color reference usable anywhere a step takes a background or fill color.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Black,
    Transparent,
    /// An sRGB color given as `RRGGBB` or `RRGGBBAA` hex digits.
    Srgb { hex: String },
}

impl Color {
    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::Srgb {
            hex: format!("{r:02x}{g:02x}{b:02x}{a:02x}"),
        }
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Srgb {
            hex: format!("{r:02x}{g:02x}{b:02x}"),
        }
    }
}

/// Anchoring for crop/pad placement. `{x: 0, y: 0}` is top-left,
/// `{x: 50, y: 50}` center, `{x: 100, y: 100}` bottom-right.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gravity {
    Percentage { x: f64, y: f64 },
}

impl Gravity {
    pub fn center() -> Self {
        Self::Percentage { x: 50.0, y: 50.0 }
    }
}

/// Resampling filters understood by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    Robidoux,
    RobidouxSharp,
    RobidouxFast,
    Ginseng,
    GinsengSharp,
    Lanczos,
    LanczosSharp,
    #[serde(rename = "lanczos_2")]
    Lanczos2,
    #[serde(rename = "lanczos_2_sharp")]
    Lanczos2Sharp,
    Cubic,
    CubicSharp,
    CatmullRom,
    Mitchell,
    CubicBSpline,
    Hermite,
    Jinc,
    Triangle,
    Linear,
    Box,
    Fastest,
    NCubic,
    NCubicSharp,
}

/// Colorspace used for scaling math. Linear gives the best results; srgb
/// mimics poorly-written software and can destroy highlights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingColorspace {
    Linear,
    Srgb,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleWhen {
    SizeDiffers,
    SizeDiffersOrSharpeningRequested,
    Always,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SharpenWhen {
    Downscaling,
    Upscaling,
    SizeDiffers,
    Always,
}

/// How a watermark is fitted into its box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    Distort,
    Within,
    Fit,
    WithinCrop,
    FitCrop,
}

/// The region a watermark is fitted into, relative to the base image.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FitBox {
    ImagePercentage { x1: f64, y1: f64, x2: f64, y2: f64 },
    ImageMargins { left: u32, top: u32, right: u32, bottom: u32 },
}

/// Blend behavior for exact-placement draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositingMode {
    Compose,
    Overwrite,
}

/// sRGB color-filter commands. Unit filters serialize as bare tag strings,
/// valued filters as a single-key map with their parameter.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorFilter {
    GrayscaleNtsc,
    GrayscaleFlat,
    GrayscaleBt709,
    GrayscaleRy,
    Sepia,
    Invert,
    Alpha(f32),
    Brightness(f32),
    Contrast(f32),
    Saturation(f32),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn colors_serialize_to_wire_shapes() {
        assert_eq!(serde_json::to_value(Color::Black).unwrap(), json!("black"));
        assert_eq!(
            serde_json::to_value(Color::Transparent).unwrap(),
            json!("transparent")
        );
        assert_eq!(
            serde_json::to_value(Color::rgba(255, 0, 0, 255)).unwrap(),
            json!({"srgb": {"hex": "ff0000ff"}})
        );
        assert_eq!(
            serde_json::to_value(Color::rgb(0, 16, 32)).unwrap(),
            json!({"srgb": {"hex": "001020"}})
        );
    }

    #[test]
    fn gravity_is_percentage_tagged() {
        assert_eq!(
            serde_json::to_value(Gravity::center()).unwrap(),
            json!({"percentage": {"x": 50.0, "y": 50.0}})
        );
    }

    #[test]
    fn filter_names_match_engine_vocabulary() {
        assert_eq!(
            serde_json::to_value(Filter::Lanczos2Sharp).unwrap(),
            json!("lanczos_2_sharp")
        );
        assert_eq!(
            serde_json::to_value(Filter::CubicBSpline).unwrap(),
            json!("cubic_b_spline")
        );
        assert_eq!(
            serde_json::to_value(Filter::NCubic).unwrap(),
            json!("n_cubic")
        );
    }

    #[test]
    fn color_filters_serialize_unit_and_valued() {
        assert_eq!(
            serde_json::to_value(ColorFilter::GrayscaleNtsc).unwrap(),
            json!("grayscale_ntsc")
        );
        assert_eq!(
            serde_json::to_value(ColorFilter::Brightness(0.5)).unwrap(),
            json!({"brightness": 0.5})
        );
    }

    #[test]
    fn fit_box_variants_are_tagged() {
        assert_eq!(
            serde_json::to_value(FitBox::ImageMargins {
                left: 1,
                top: 2,
                right: 3,
                bottom: 4
            })
            .unwrap(),
            json!({"image_margins": {"left": 1, "top": 2, "right": 3, "bottom": 4}})
        );
    }
}
