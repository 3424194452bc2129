//! Rendering sink: the Petri dish SVG and the text volume summary.
//!
//! Consumes a [`RunRecord`] in one batch after the run completes. Dish y
//! grows upward while SVG y grows downward, so y is negated on the way out.

use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::Path;

use svg::Document;
use svg::node::element::{Circle, Line, Text};

use crate::colors::resolve_visual_color;
use crate::geometry::PETRI_INNER_DIAMETER;
use crate::trail::RunRecord;

/// Dish background styles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackgroundStyle {
    /// Dark agar.
    #[default]
    Black,
    /// Beige agar.
    Agar,
    /// Outline only, for printing.
    Paper,
}

impl BackgroundStyle {
    /// Parses a style name. Unrecognized names fall back to the dark fill.
    pub fn from_name(name: &str) -> Self {
        match name {
            "black" => Self::Black,
            "agar" => Self::Agar,
            "paper" => Self::Paper,
            other => {
                tracing::warn!(style = other, "unknown background style, using black");
                Self::Black
            }
        }
    }
}

/// Options for the SVG rendering.
#[derive(Clone, Debug, Default)]
pub struct RenderOptions {
    pub background: BackgroundStyle,
    pub title: Option<String>,
}

/// Whitespace around the dish, in mm of canvas space.
const VIEW_MARGIN: f32 = 0.5;

/// Stroke width of smear streaks, in mm. A drag mark is narrower than the
/// droplet that fed it.
const SMEAR_STROKE_WIDTH: f32 = 1.5;

/// Rendered document edge, in pixels.
const RENDER_SIZE_PX: u32 = 720;

/// Renders the recorded run as an SVG document string.
///
/// Draws the dish as a circle of the plate's inner diameter, droplets as
/// filled circles whose area tracks the recorded scatter size, and smears as
/// round-capped line segments on top.
pub fn render_petri_svg(record: &RunRecord, options: &RenderOptions) -> String {
    let radius = PETRI_INNER_DIAMETER / 2.0;
    let extent = radius + VIEW_MARGIN;
    let mut document = Document::new()
        .set("viewBox", (-extent, -extent, 2.0 * extent, 2.0 * extent))
        .set("width", RENDER_SIZE_PX)
        .set("height", RENDER_SIZE_PX);

    let dish = Circle::new().set("cx", 0).set("cy", 0).set("r", radius);
    let dish = match options.background {
        BackgroundStyle::Black => dish.set("fill", "#000000"),
        BackgroundStyle::Agar => dish.set("fill", "#d7ca95"),
        BackgroundStyle::Paper => dish
            .set("fill", "none")
            .set("stroke", "#000000")
            .set("stroke-width", 0.5),
    };
    document = document.add(dish);

    for droplet in &record.trail.droplets {
        // Scatter size is an area; the drawn radius follows its square root.
        let r = droplet.size.sqrt() / 10.0;
        document = document.add(
            Circle::new()
                .set("cx", droplet.x)
                .set("cy", -droplet.y)
                .set("r", r)
                .set("fill", droplet.color.as_str()),
        );
    }

    for smear in &record.trail.smears {
        document = document.add(
            Line::new()
                .set("x1", smear.x[0])
                .set("y1", -smear.y[0])
                .set("x2", smear.x[1])
                .set("y2", -smear.y[1])
                .set("stroke", smear.color.as_str())
                .set("stroke-width", SMEAR_STROKE_WIDTH)
                .set("stroke-linecap", "round"),
        );
    }

    if let Some(title) = &options.title {
        document = document.add(
            Text::new(title.as_str())
                .set("x", 0)
                .set("y", -(radius - 4.0))
                .set("text-anchor", "middle")
                .set("font-size", 4)
                .set("fill", "#888888"),
        );
    }

    document.to_string()
}

/// Renders and writes the SVG to `path`.
pub fn save_petri_svg(
    path: impl AsRef<Path>,
    record: &RunRecord,
    options: &RenderOptions,
) -> io::Result<()> {
    std::fs::write(path, render_petri_svg(record, options))
}

/// Tolerance below which aspirated and dispensed totals count as equal.
const WASTE_EPSILON: f32 = 1e-6;

/// Writes the per-reagent volume totals, waste flags and tip usage.
pub fn write_volume_summary<W: Write>(w: &mut W, record: &RunRecord) -> io::Result<()> {
    writeln!(w, "=== TOTAL VOLUMES BY REAGENT ===")?;
    let reagents: BTreeSet<&String> = record
        .total_aspirated
        .keys()
        .chain(record.total_dispensed.keys())
        .collect();
    let mut grand_aspirated = 0.0f32;
    let mut grand_dispensed = 0.0f32;
    for reagent in reagents {
        let aspirated = record.total_aspirated.get(reagent).copied().unwrap_or(0.0);
        let dispensed = record.total_dispensed.get(reagent).copied().unwrap_or(0.0);
        grand_aspirated += aspirated;
        grand_dispensed += dispensed;
        let flag = if aspirated - dispensed > WASTE_EPSILON {
            "\t##### WASTE: more aspirated than dispensed!"
        } else {
            ""
        };
        writeln!(
            w,
            "\t{reagent} ({}):\taspirated {aspirated:.1}\tdispensed {dispensed:.1}{flag}",
            resolve_visual_color(reagent),
        )?;
    }
    writeln!(
        w,
        "\t[all]:\t[aspirated {grand_aspirated:.1}]\t[dispensed {grand_dispensed:.1}]"
    )?;
    writeln!(w, "=== TIPS USED ===")?;
    writeln!(w, "\t{} tip(s)  (ideal: one per reagent)", record.tip_count)?;
    Ok(())
}
