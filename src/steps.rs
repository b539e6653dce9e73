//! The closed set of operation descriptors a pipeline graph is built from.
//!
//! Every [`Step`] converts to the engine's externally tagged wire value
//! through a single exhaustive [`Step::to_value`]; payload structs carry no
//! untyped fields, so a step that constructs is a step that serializes.
//! Fill-in defaults (encoder quality, watermark fit mode and opacity) are
//! applied at conversion time, never at construction time.

use serde_json::{Value, json};

use crate::{
    color::{
        Color, ColorFilter, CompositingMode, Filter, FitBox, FitMode, Gravity, ResampleWhen,
        ScalingColorspace, SharpenWhen,
    },
    error::{FramewiseError, FramewiseResult},
    presets::Preset,
};

/// Constraint mode for resizing. `Within` shrinks to fit without upscaling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintMode {
    #[default]
    Within,
    Fit,
    LargerThan,
    WithinCrop,
    FitCrop,
    AspectCrop,
    WithinPad,
    FitPad,
    Distort,
}

/// Resampling hints shared by constrain, watermark and exact-draw steps.
/// Absent fields are omitted from the wire value; the engine supplies its own
/// defaults.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct ResampleHints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpen_percent: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down_filter: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub up_filter: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaling_colorspace: Option<ScalingColorspace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resample_when: Option<ResampleWhen>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpen_when: Option<SharpenWhen>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct Constrain {
    pub mode: ConstraintMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<ResampleHints>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gravity: Option<Gravity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canvas_color: Option<Color>,
}

impl Constrain {
    /// A `within` constraint with one or both dimensions bounded.
    pub fn within(w: Option<f64>, h: Option<f64>) -> Self {
        Self {
            mode: ConstraintMode::Within,
            w,
            h,
            ..Self::default()
        }
    }
}

/// A crop window in source pixels. Coordinates may lie outside the image,
/// which pads with the background color.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Region {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
}

/// [`Region`] with coordinates as percentages of the source dimensions.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RegionPercent {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
}

/// Trims uniform whitespace at the edges. `threshold` (1..255) is the noise
/// tolerance; `percentage_padding` restores a margin after the crop.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CropWhitespace {
    pub threshold: u8,
    pub percentage_padding: f32,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FillRect {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ExpandCanvas {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub color: Color,
}

/// Watermark placement options. The source image is attached separately by
/// the builder, which owns the io id.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct Watermark {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gravity: Option<Gravity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit_mode: Option<FitMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit_box: Option<FitBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<ResampleHints>,
}

impl Watermark {
    /// Fills engine-facing defaults: fit mode `within`, fully opaque.
    pub fn canonical(&self) -> Watermark {
        let mut mark = self.clone();
        mark.fit_mode = Some(mark.fit_mode.unwrap_or(FitMode::Within));
        mark.opacity = Some(mark.opacity.unwrap_or(1.0));
        mark
    }
}

/// Copies a source rectangle onto the canvas image at `(x, y)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct CopyRectToCanvas {
    pub from_x: u32,
    pub from_y: u32,
    pub w: u32,
    pub h: u32,
    pub x: u32,
    pub y: u32,
}

/// Scales the input to exactly `w x h` and draws it onto the canvas image.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DrawImageExact {
    pub w: u32,
    pub h: u32,
    pub x: u32,
    pub y: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blend: Option<CompositingMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<ResampleHints>,
}

/// One operation node in the processing graph.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Decode { io_id: u32 },
    Encode { io_id: u32, preset: Preset },
    Constrain(Constrain),
    Region(Region),
    RegionPercent(RegionPercent),
    CropWhitespace(CropWhitespace),
    Rotate90,
    Rotate180,
    Rotate270,
    FlipH,
    FlipV,
    Transpose,
    FillRect(FillRect),
    ExpandCanvas(ExpandCanvas),
    Watermark { io_id: u32, mark: Watermark },
    CopyRectToCanvas(CopyRectToCanvas),
    DrawImageExact(DrawImageExact),
    ColorFilterSrgb(ColorFilter),
    /// Querystring-style command applied as a single node.
    CommandString { kind: String, value: String },
    /// Escape hatch: serializes as `{<kind>: value}` verbatim.
    Raw { kind: String, value: Value },
}

impl Step {
    /// Converts the step to its canonical tagged wire value. Pure and
    /// idempotent; defaults are filled here so repeated conversion of the
    /// same step yields identical output.
    pub fn to_value(&self) -> FramewiseResult<Value> {
        let value = match self {
            Step::Decode { io_id } => json!({"decode": {"io_id": io_id}}),
            Step::Encode { io_id, preset } => {
                json!({"encode": {"io_id": io_id, "preset": tagged(&preset.canonical())?}})
            }
            Step::Constrain(constrain) => json!({"constrain": tagged(constrain)?}),
            Step::Region(region) => json!({"region": tagged(region)?}),
            Step::RegionPercent(region) => json!({"region_percent": tagged(region)?}),
            Step::CropWhitespace(crop) => json!({"crop_whitespace": tagged(crop)?}),
            Step::Rotate90 => json!("rotate_90"),
            Step::Rotate180 => json!("rotate_180"),
            Step::Rotate270 => json!("rotate_270"),
            Step::FlipH => json!("flip_h"),
            Step::FlipV => json!("flip_v"),
            Step::Transpose => json!("transpose"),
            Step::FillRect(rect) => json!({"fill_rect": tagged(rect)?}),
            Step::ExpandCanvas(expand) => json!({"expand_canvas": tagged(expand)?}),
            Step::Watermark { io_id, mark } => {
                let mut payload = tagged(&mark.canonical())?;
                if let Value::Object(map) = &mut payload {
                    map.insert("io_id".to_string(), json!(io_id));
                }
                json!({"watermark": payload})
            }
            Step::CopyRectToCanvas(copy) => json!({"copy_rect_to_canvas": tagged(copy)?}),
            Step::DrawImageExact(draw) => json!({"draw_image_exact": tagged(draw)?}),
            Step::ColorFilterSrgb(filter) => json!({"color_filter_srgb": tagged(filter)?}),
            Step::CommandString { kind, value } => {
                json!({"command_string": {"kind": kind, "value": value}})
            }
            Step::Raw { kind, value } => {
                let mut map = serde_json::Map::new();
                map.insert(kind.clone(), value.clone());
                Value::Object(map)
            }
        };
        Ok(value)
    }
}

fn tagged<T: serde::Serialize>(payload: &T) -> FramewiseResult<Value> {
    serde_json::to_value(payload).map_err(|e| FramewiseError::protocol(e.to_string()))
}
