//! The fluent, cursor-based pipeline builder.
//!
//! Every call appends a node to the graph and wires it to the cursor (the
//! node the next single-input operation attaches to). [`PipelineBuilder::branch`]
//! forks independent downstream chains off one node; the canvas compositions
//! ([`PipelineBuilder::copy_rect_to_canvas`], [`PipelineBuilder::draw_image_exact`])
//! are the one place a node takes two inbound edges. Operands are bound to
//! monotonically increasing io ids in call order, then exchanged with the
//! engine when [`PipelineBuilder::execute`] runs.
//!
//! The builder is single-threaded and synchronous; parallel pipelines need
//! independent builders, each with its own engine context.

use std::collections::BTreeMap;

use serde_json::{Value, json};

use crate::{
    color::ColorFilter,
    engine::{EngineBackend, JobContext},
    error::{FramewiseError, FramewiseResult},
    graph::{EdgeKind, Graph},
    operand::{BoundOperand, Direction, Operand},
    presets::Preset,
    steps::{
        Constrain, CopyRectToCanvas, CropWhitespace, DrawImageExact, ExpandCanvas, FillRect,
        Region, RegionPercent, Step, Watermark,
    },
};

#[derive(Clone, Debug, Default)]
pub struct PipelineBuilder {
    graph: Graph,
    last: Option<u32>,
    next_io_id: u32,
    io: Vec<BoundOperand>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current cursor: the node id the next linear step attaches to.
    pub fn cursor(&self) -> Option<u32> {
        self.last
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn operands(&self) -> &[BoundOperand] {
        &self.io
    }

    /// Decodes an input operand. The root of a chain.
    pub fn decode(mut self, operand: Operand) -> Self {
        let io_id = self.bind(operand, Direction::In);
        self.linear(Step::Decode { io_id })
    }

    /// Encodes the current image into an output operand with the given
    /// preset. Usually the terminal step of a chain.
    pub fn encode(mut self, operand: Operand, preset: Preset) -> Self {
        let io_id = self.bind(operand, Direction::Out);
        self.linear(Step::Encode { io_id, preset })
    }

    /// Draws a watermark sourced from `operand` over the current image. The
    /// watermark source is always read, never written, so it registers as an
    /// input.
    pub fn watermark(mut self, operand: Operand, mark: Watermark) -> Self {
        let io_id = self.bind(operand, Direction::In);
        self.linear(Step::Watermark { io_id, mark })
    }

    pub fn constrain(self, constrain: Constrain) -> Self {
        self.linear(Step::Constrain(constrain))
    }

    /// Shrinks the image to fit within the given bounds, never upscaling.
    pub fn constrain_within(self, w: Option<f64>, h: Option<f64>) -> Self {
        self.constrain(Constrain::within(w, h))
    }

    pub fn region(self, region: Region) -> Self {
        self.linear(Step::Region(region))
    }

    pub fn region_percent(self, region: RegionPercent) -> Self {
        self.linear(Step::RegionPercent(region))
    }

    pub fn crop_whitespace(self, crop: CropWhitespace) -> Self {
        self.linear(Step::CropWhitespace(crop))
    }

    pub fn rotate_90(self) -> Self {
        self.linear(Step::Rotate90)
    }

    pub fn rotate_180(self) -> Self {
        self.linear(Step::Rotate180)
    }

    pub fn rotate_270(self) -> Self {
        self.linear(Step::Rotate270)
    }

    pub fn flip_h(self) -> Self {
        self.linear(Step::FlipH)
    }

    pub fn flip_v(self) -> Self {
        self.linear(Step::FlipV)
    }

    pub fn transpose(self) -> Self {
        self.linear(Step::Transpose)
    }

    pub fn fill_rect(self, rect: FillRect) -> Self {
        self.linear(Step::FillRect(rect))
    }

    pub fn expand_canvas(self, expand: ExpandCanvas) -> Self {
        self.linear(Step::ExpandCanvas(expand))
    }

    pub fn color_filter(self, filter: ColorFilter) -> Self {
        self.linear(Step::ColorFilterSrgb(filter))
    }

    /// Appends a querystring-style command as a single node.
    pub fn command_string(self, kind: impl Into<String>, value: impl Into<String>) -> Self {
        self.linear(Step::CommandString {
            kind: kind.into(),
            value: value.into(),
        })
    }

    /// Appends a raw `{<kind>: value}` node for operations the typed surface
    /// does not cover yet.
    pub fn raw(self, kind: impl Into<String>, value: Value) -> Self {
        self.linear(Step::Raw {
            kind: kind.into(),
            value,
        })
    }

    /// Forks an independent downstream chain off the current node. `f` builds
    /// the side path; the cursor visible after `branch` returns is the one
    /// from before the call, so further steps continue from the fork point.
    pub fn branch(self, f: impl FnOnce(Self) -> Self) -> Self {
        let saved = self.last;
        let mut forked = f(self);
        forked.last = saved;
        forked
    }

    /// Copies a rectangle from an independently built image onto the current
    /// image. `f` builds the sub-chain (its own decode and edits) supplying
    /// the copied pixels.
    pub fn copy_rect_to_canvas(
        self,
        copy: CopyRectToCanvas,
        f: impl FnOnce(Self) -> Self,
    ) -> FramewiseResult<Self> {
        self.compose(Step::CopyRectToCanvas(copy), f)
    }

    /// Scales an independently built image to exact dimensions and draws it
    /// onto the current image.
    pub fn draw_image_exact(
        self,
        draw: DrawImageExact,
        f: impl FnOnce(Self) -> Self,
    ) -> FramewiseResult<Self> {
        self.compose(Step::DrawImageExact(draw), f)
    }

    /// Serializes the graph and operand declarations, transfers every input,
    /// submits the command, then routes every output through its sink.
    /// Transfers happen in operand registration order with no overlap between
    /// input and output phases. Any failure aborts with no partial results.
    #[tracing::instrument(skip_all, fields(nodes = self.graph.nodes().len(), io = self.io.len()))]
    pub fn execute<E: EngineBackend>(
        self,
        engine: E,
    ) -> FramewiseResult<BTreeMap<String, Vec<u8>>> {
        let payload = serde_json::to_vec(&self.to_payload()?)
            .map_err(|e| FramewiseError::protocol(e.to_string()))?;

        let mut ctx = JobContext::new(engine);
        for bound in self.io.iter().filter(|b| b.direction == Direction::In) {
            ctx.add_input(bound.io_id, bound.operand.read_bytes()?)?;
        }
        for bound in self.io.iter().filter(|b| b.direction == Direction::Out) {
            ctx.add_output(bound.io_id)?;
        }
        ctx.message(payload)?;

        let mut outputs = BTreeMap::new();
        for bound in self.io.iter().filter(|b| b.direction == Direction::Out) {
            let data = ctx.get_output(bound.io_id)?;
            bound.operand.write_bytes(&data, &mut outputs)?;
        }
        Ok(outputs)
    }

    /// The full submission payload: operand declarations plus the graph.
    pub fn to_payload(&self) -> FramewiseResult<Value> {
        let io: Vec<Value> = self
            .io
            .iter()
            .map(|b| json!({"io_id": b.io_id, "direction": b.direction}))
            .collect();
        Ok(json!({
            "io": io,
            "framewise": {"graph": self.graph.to_value()?},
        }))
    }

    /// Assigns the next io id. Ids are monotonic and shared across inputs and
    /// outputs; exactly one per decode/encode/watermark, in call order.
    fn bind(&mut self, operand: Operand, direction: Direction) -> u32 {
        let io_id = self.next_io_id;
        self.next_io_id += 1;
        self.io.push(BoundOperand {
            io_id,
            direction,
            operand,
        });
        io_id
    }

    /// Appends a single-input node and advances the cursor. A node appended
    /// before any decode becomes a root with no inbound edge.
    fn linear(mut self, step: Step) -> Self {
        let id = self.graph.append_node(step);
        if let Some(last) = self.last {
            self.graph.add_edge(last, id, EdgeKind::Input);
        }
        self.last = Some(id);
        self
    }

    /// Shared wiring for the two-input compositing nodes: the saved cursor
    /// becomes the canvas edge, the sub-chain terminal the input edge.
    fn compose(mut self, step: Step, f: impl FnOnce(Self) -> Self) -> FramewiseResult<Self> {
        let canvas = self.last.ok_or_else(|| {
            FramewiseError::construction("canvas composition requires a current node to draw onto")
        })?;
        self.last = None;
        let mut built = f(self);
        let input = built.last.ok_or_else(|| {
            FramewiseError::construction("canvas composition sub-chain appended no nodes")
        })?;
        let node = built.graph.append_node(step);
        built.graph.add_edge(canvas, node, EdgeKind::Canvas);
        built.graph.add_edge(input, node, EdgeKind::Input);
        built.last = Some(node);
        Ok(built)
    }
}
