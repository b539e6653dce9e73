use framewise::{
    CompositingMode, DrawImageExact, Operand, PipelineBuilder, Preset, Watermark,
};
use serde_json::json;

#[test]
fn decode_constrain_rotate_encode_produces_one_path() {
    let builder = PipelineBuilder::new()
        .decode(Operand::file("a.jpg"))
        .constrain_within(Some(400.0), None)
        .rotate_90()
        .encode(
            Operand::file("b.png"),
            Preset::Pngquant {
                quality: 80,
                minimum_quality: 0,
                speed: 0,
                maximum_deflate: false,
            },
        );

    let payload = builder.to_payload().unwrap();
    assert_eq!(
        payload,
        json!({
            "io": [
                {"io_id": 0, "direction": "in"},
                {"io_id": 1, "direction": "out"},
            ],
            "framewise": {"graph": {
                "nodes": {
                    "0": {"decode": {"io_id": 0}},
                    "1": {"constrain": {"mode": "within", "w": 400.0}},
                    "2": "rotate_90",
                    "3": {"encode": {"io_id": 1, "preset": {"pngquant": {
                        "quality": 80,
                        "minimum_quality": 0,
                        "speed": 0,
                        "maximum_deflate": false,
                    }}}},
                },
                "edges": [
                    {"from": 0, "to": 1, "kind": "input"},
                    {"from": 1, "to": 2, "kind": "input"},
                    {"from": 2, "to": 3, "kind": "input"},
                ],
            }},
        })
    );
}

#[test]
fn every_node_has_at_most_one_inbound_input_edge_in_linear_chains() {
    let builder = PipelineBuilder::new()
        .decode(Operand::bytes(vec![1]))
        .flip_h()
        .rotate_180()
        .transpose()
        .encode(Operand::capture("out"), Preset::Webplossless);

    for node in 0..builder.graph().nodes().len() as u32 {
        let inbound = builder
            .graph()
            .edges()
            .iter()
            .filter(|e| e.to == node)
            .count();
        assert!(inbound <= 1, "node {node} has in-degree {inbound}");
    }
}

#[test]
fn nested_branches_keep_io_allocation_in_call_order() {
    let builder = PipelineBuilder::new()
        .decode(Operand::bytes(vec![1])) // io 0
        .branch(|b| {
            b.constrain_within(Some(100.0), None)
                .branch(|b| b.encode(Operand::capture("tiny"), Preset::Gif)) // io 1
                .encode(Operand::capture("small"), Preset::Webplossy { quality: 70 }) // io 2
        })
        .watermark(Operand::bytes(vec![2]), Watermark::default()) // io 3
        .encode(
            Operand::capture("full"),
            Preset::Mozjpeg {
                quality: 90,
                progressive: false,
            },
        ); // io 4

    let ids: Vec<u32> = builder.operands().iter().map(|b| b.io_id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);

    // The watermark source is an input even though it was registered between
    // two outputs.
    let payload = builder.to_payload().unwrap();
    assert_eq!(payload["io"][3]["direction"], json!("in"));
}

#[test]
fn branch_then_canvas_composition_wires_both_edge_kinds() {
    let builder = PipelineBuilder::new()
        .decode(Operand::bytes(vec![1]))
        .branch(|b| b.encode(Operand::capture("untouched"), Preset::Gif))
        .draw_image_exact(
            DrawImageExact {
                w: 64,
                h: 64,
                x: 0,
                y: 0,
                blend: Some(CompositingMode::Compose),
                hints: None,
            },
            |b| b.decode(Operand::bytes(vec![2])).flip_v(),
        )
        .unwrap()
        .encode(Operand::capture("composed"), Preset::Webplossless);

    let payload = builder.to_payload().unwrap();
    let edges = payload["framewise"]["graph"]["edges"].as_array().unwrap();
    let canvas_edges: Vec<_> = edges
        .iter()
        .filter(|e| e["kind"] == json!("canvas"))
        .collect();
    assert_eq!(canvas_edges.len(), 1);
    assert_eq!(canvas_edges[0]["from"], json!(0));
}
