//! SVG export serializer.
//!
//! Renders clusters as an overlay on a white canvas the size of the
//! source image, using the [`svg`] crate for document construction and
//! XML escaping.
//!
//! Each cluster becomes one `<path>` made of unit squares, one per pixel,
//! filled with a colour from [`CLUSTER_COLORS`] chosen by cluster index.
//!
//! Optional [`SvgMetadata`] embeds `<title>`, `<desc>`, and a
//! `<metadata>` block carrying the pipeline config as JSON.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Description, Element, Path, Rectangle, Title};
use svg::node::{Node, Text};

use tracer_pipeline::{Cluster, Dimensions};

/// Fill colours cycled across clusters in output order.
pub const CLUSTER_COLORS: &[&str] = &[
    "#ff3333", // red
    "#ff8800", // orange
    "#ffdd00", // yellow
    "#33cc33", // green
    "#3399ff", // blue
];

/// Metadata to embed in the SVG document.
///
/// All fields are optional. Text values are XML-escaped automatically
/// by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    ///
    /// Typically the source image filename (without extension).
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized pipeline config, emitted inside a `<metadata>` element
    /// wrapped in a namespaced `<tracer:config>` element.
    pub config_json: Option<&'a str>,
}

/// Path data covering every pixel of a cluster with a unit square.
fn cluster_path_data(cluster: &Cluster) -> Data {
    cluster.points().iter().fold(Data::new(), |data, p| {
        data.move_to((f64::from(p.x), f64::from(p.y)))
            .line_by((1.0, 0.0))
            .line_by((0.0, 1.0))
            .line_by((-1.0, 0.0))
            .close()
    })
}

/// Serialize clusters into an SVG overlay string.
///
/// The document is `dimensions.width` by `dimensions.height` user units
/// with a matching `viewBox`, so one unit is one source pixel. Empty
/// clusters are skipped.
#[must_use]
pub fn clusters_to_svg(
    clusters: &[Cluster],
    dimensions: Dimensions,
    metadata: &SvgMetadata<'_>,
) -> String {
    let w = dimensions.width;
    let h = dimensions.height;
    let mut doc = Document::new()
        .set("width", w)
        .set("height", h)
        .set("viewBox", (0, 0, w, h))
        .set("shape-rendering", "crispEdges");

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(config_json) = metadata.config_json {
        let mut config_el = Element::new("tracer:config");
        config_el.assign("xmlns:tracer", "https://github.com/tracer-rs/tracer/ns/1");
        config_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(config_el);
        doc = doc.add(metadata_el);
    }

    doc = doc.add(
        Rectangle::new()
            .set("width", w)
            .set("height", h)
            .set("fill", "white"),
    );

    for (index, cluster) in clusters.iter().enumerate() {
        if cluster.is_empty() {
            continue;
        }
        let color = CLUSTER_COLORS[index % CLUSTER_COLORS.len()];
        let path = Path::new()
            .set("id", format!("cluster-{index}"))
            .set("d", cluster_path_data(cluster))
            .set("fill", color);
        doc = doc.add(path);
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}
