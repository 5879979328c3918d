//! SVG serialization of scene fragments.

use crate::config::CanvasConfig;
use crate::geometry::{fmt_num, fmt_point};
use crate::hover::PositionedOverlay;
use crate::link::LinkFragment;
use crate::node::{NodeFragment, ShapeElement};
use crate::scene::SceneFragments;
use crate::style::{resolve_style, style, to_inline_css, StyleMap};
use crate::text::{TextBlock, ATTRIBUTES_CLASS, NAME_CLASS};

/// Class of the group wrapping a hover overlay.
pub const OVERLAY_CLASS: &str = "overlayLabel";

/// Writes a standalone SVG document for `fragments`.
#[must_use]
pub fn render_svg(fragments: &SceneFragments, canvas: &CanvasConfig) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = fmt_num(canvas.width),
        h = fmt_num(canvas.height),
    ));
    svg.push_str(&format!(
        r#"<g class="rd3t-g" transform="translate({})">"#,
        fmt_point(canvas.translate)
    ));

    for link in &fragments.links {
        write_link(&mut svg, link);
    }
    for node in &fragments.nodes {
        write_node(&mut svg, node);
    }

    svg.push_str("</g></svg>");
    svg
}

fn write_link(svg: &mut String, link: &LinkFragment) {
    svg.push_str(&format!(r#"<g data-link-id="{}">"#, escape_xml(&link.id)));
    svg.push_str(&format!(
        r#"<path class="{}" d="{}" style="{}" stroke-width="{}""#,
        link.class_name,
        escape_xml(&link.d),
        escape_xml(&to_inline_css(&link.style)),
        link.stroke_width,
    ));
    if let Some(dash) = &link.stroke_dasharray {
        svg.push_str(&format!(r#" stroke-dasharray="{dash}""#));
    }
    svg.push_str("/>");

    if let Some(hit) = &link.hit_area {
        svg.push_str(&format!(
            r#"<path class="{}" d="{}" style="{}" stroke-width="{}"/>"#,
            link.class_name,
            escape_xml(&hit.d),
            escape_xml(&to_inline_css(&hit.style)),
            hit.stroke_width,
        ));
    }
    if let Some(overlay) = &link.overlay {
        write_overlay(svg, overlay);
    }
    svg.push_str("</g>");
}

fn write_node(svg: &mut String, node: &NodeFragment) {
    let group_style = style([("opacity", fmt_num(node.opacity))]);
    svg.push_str(&format!(
        r#"<g id="{}" transform="{}" style="{}">"#,
        escape_xml(&node.id),
        node.transform,
        to_inline_css(&group_style),
    ));
    if let Some(shape) = &node.shape {
        write_shape(svg, shape);
    }
    write_text(svg, &node.text, &node.name_style, &node.attributes_style);
    if let Some(overlay) = &node.overlay {
        write_overlay(svg, overlay);
    }
    svg.push_str("</g>");
}

fn write_shape(svg: &mut String, shape: &ShapeElement) {
    svg.push_str(&format!("<{}", shape.tag));
    if let Some(class) = &shape.class_name {
        svg.push_str(&format!(r#" class="{}""#, escape_xml(class)));
    }
    for (name, value) in &shape.attrs {
        svg.push_str(&format!(r#" {}="{}""#, escape_xml(name), escape_xml(value)));
    }
    if !shape.style.is_empty() {
        svg.push_str(&format!(
            r#" style="{}""#,
            escape_xml(&to_inline_css(&shape.style))
        ));
    }
    svg.push_str("/>");
}

fn write_text(
    svg: &mut String,
    text: &TextBlock,
    name_style: &StyleMap,
    attributes_style: &StyleMap,
) {
    let anchor = escape_xml(&text.text_anchor);
    let transform = text
        .transform
        .as_deref()
        .map(|t| format!(r#" transform="{}""#, escape_xml(t)))
        .unwrap_or_default();

    let primary = &text.primary;
    svg.push_str(&format!(
        r#"<text class="{NAME_CLASS}" text-anchor="{anchor}" x="{}" y="{}" dy="{}"{transform}{}>{}</text>"#,
        fmt_num(primary.x),
        primary.y.map(fmt_num).unwrap_or_default(),
        primary.dy,
        style_attr(name_style),
        escape_xml(&primary.text),
    ));

    svg.push_str(&format!(
        r#"<text class="{ATTRIBUTES_CLASS}" text-anchor="{anchor}" y="{}"{transform}{}>"#,
        fmt_num(text.secondary_y),
        style_attr(attributes_style),
    ));
    for run in &text.secondary {
        svg.push_str(&format!(
            r#"<tspan x="{}" dy="{}">{}</tspan>"#,
            fmt_num(run.x),
            run.dy,
            escape_xml(&run.text),
        ));
    }
    svg.push_str("</text>");
}

fn write_overlay(svg: &mut String, overlay: &PositionedOverlay) {
    let class = overlay
        .label
        .class_name
        .as_deref()
        .map_or_else(|| OVERLAY_CLASS.to_string(), |c| format!("{OVERLAY_CLASS} {c}"));
    let text_style = resolve_style(&[&style([("pointer-events", "none")])]);
    svg.push_str(&format!(
        r#"<g class="{}" transform="translate({})"><text text-anchor="middle" style="{}">{}</text></g>"#,
        escape_xml(&class),
        fmt_point(overlay.position),
        to_inline_css(&text_style),
        escape_xml(&overlay.label.text),
    ));
}

fn style_attr(style: &StyleMap) -> String {
    if style.is_empty() {
        String::new()
    } else {
        format!(r#" style="{}""#, escape_xml(&to_inline_css(style)))
    }
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
