#![warn(missing_docs)]
//! Rendering of the calculation results as schematic drawings.
//!
//! The drawing is done in canvas pixel coordinates on the root [`DrawingArea`] of a `plotters`
//! backend. All geometry has already been derived by the calculation engines, so this module
//! contains no physics at all.
use std::path::Path;

use log::{info, warn};
use nalgebra::Point2;
use plotters::{
    backend::DrawingBackend,
    coord::Shift,
    drawing::DrawingAreaErrorKind,
    element::{Circle, PathElement, Polygon, Text},
    prelude::{BitMapBackend, DrawingArea, IntoDrawingArea, SVGBackend},
    style::{
        text_anchor::{HPos, Pos, VPos},
        Color, IntoFont, RGBAColor, RGBColor, ShapeStyle, BLACK, WHITE,
    },
};

use crate::{
    beam_offset::{BeamGeometry, BeamResult, TiltedSlabGeometry},
    error::{SlabError, SlabResult},
    focus_shift::FocusResult,
    geometry::{RotatedRect, Segment},
    layout::CanvasLayout,
};

const SLAB_FILL: RGBAColor = RGBAColor(173, 216, 230, 0.6);
const SLAB_BORDER: RGBColor = RGBColor(0x00, 0x00, 0x8B);
const RAY_COLOR: RGBColor = RGBColor(0xFF, 0x00, 0x00);
const VIRTUAL_RAY_COLOR: RGBAColor = RGBAColor(0xFF, 0x00, 0x00, 0.5);
const AXIS_COLOR: RGBColor = RGBColor(0x88, 0x88, 0x88);
const FOCUS_POINT_RADIUS: i32 = 5;
const LABEL_FONT_SIZE: u32 = 12;

/// Things which can be drawn onto a canvas.
#[derive(Debug, Clone, Copy)]
pub enum Scene<'a> {
    /// A tilted slab displacing a beam.
    Beam(&'a BeamResult),
    /// A slab shifting the focus of a converging beam.
    Focus(&'a FocusResult),
    /// An empty canvas. Used for clearing a previous drawing after invalid input.
    Blank,
}

/// Image formats supported by [`render_to_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Scalable vector graphics (`.svg`)
    Svg,
    /// Bitmap image (`.png`, `.bmp`, `.jpg`)
    Bitmap,
}
impl ImageFormat {
    /// Determine the [`ImageFormat`] from the extension of the given file path.
    ///
    /// # Errors
    ///
    /// This function returns an error if the extension is missing or not supported.
    pub fn from_path(path: &Path) -> SlabResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("svg") => Ok(Self::Svg),
            Some("png" | "bmp" | "jpg" | "jpeg") => Ok(Self::Bitmap),
            _ => Err(SlabError::Render(format!(
                "unsupported image file extension: {}. Choose \".svg\" or \".png\"",
                path.display()
            ))),
        }
    }
}

/// Render a [`Scene`] into an image file.
///
/// The image format is determined by the file extension (see [`ImageFormat::from_path`]) and the
/// canvas size is taken from the given [`CanvasLayout`].
///
/// # Errors
///
/// This function returns an error if
///   - the file extension is not supported
///   - the drawing backend fails (e.g. the file cannot be written)
pub fn render_to_file(scene: &Scene<'_>, path: &Path, layout: &CanvasLayout) -> SlabResult<()> {
    let size = (layout.width, layout.height);
    match ImageFormat::from_path(path)? {
        ImageFormat::Svg => draw_scene(&SVGBackend::new(path, size).into_drawing_area(), scene, layout)?,
        ImageFormat::Bitmap => {
            draw_scene(&BitMapBackend::new(path, size).into_drawing_area(), scene, layout)?;
        }
    }
    info!("Drawing written to {}", path.display());
    Ok(())
}

/// Draw a [`Scene`] onto the given drawing area.
///
/// The area is cleared before drawing.
///
/// # Errors
///
/// This function returns an error if the drawing backend fails. Failing text labels are only
/// logged since they depend on the available font support.
pub fn draw_scene<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scene: &Scene<'_>,
    layout: &CanvasLayout,
) -> SlabResult<()> {
    root.fill(&WHITE).map_err(render_error)?;
    match scene {
        Scene::Beam(result) => draw_beam(root, result, layout)?,
        Scene::Focus(result) => draw_focus(root, result)?,
        Scene::Blank => {}
    }
    root.present().map_err(render_error)
}

fn draw_beam<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    result: &BeamResult,
    layout: &CanvasLayout,
) -> SlabResult<()> {
    let beam_color = RGBColor::from(result.beam_color());
    match result.geometry() {
        BeamGeometry::Straight { beam, width } => {
            draw_segment(root, beam, beam_color.stroke_width(stroke_width(*width)))
        }
        BeamGeometry::Grazing { slab } => {
            draw_slab(root, slab)?;
            draw_label(
                root,
                "Beam visualization inaccurate near ±90° incidence.",
                Point2::new(layout.width_px() / 2.0, 20.0),
                &RAY_COLOR,
            );
            Ok(())
        }
        BeamGeometry::Tilted(geometry) => draw_tilted_slab(root, geometry, beam_color),
    }
}

fn draw_tilted_slab<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    geometry: &TiltedSlabGeometry,
    beam_color: RGBColor,
) -> SlabResult<()> {
    draw_slab(root, &geometry.slab)?;
    let beam_style = beam_color.stroke_width(stroke_width(geometry.beam_width));
    for segment in [&geometry.incoming, &geometry.inside, &geometry.outgoing] {
        draw_segment(root, segment, beam_style)?;
    }
    let continuation_style = beam_color.stroke_width(stroke_width(geometry.continuation_width));
    for dash in geometry.continuation.dashes(5.0, 3.0) {
        draw_segment(root, &dash, continuation_style)?;
    }
    Ok(())
}

fn draw_focus<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    result: &FocusResult,
) -> SlabResult<()> {
    draw_slab(root, result.slab_outline())?;
    for dash in result.optical_axis().dashes(2.0, 2.0) {
        draw_segment(root, &dash, AXIS_COLOR.stroke_width(1))?;
    }
    let ray_style = RAY_COLOR.stroke_width(2);
    for ray in result.ray_states() {
        for segment in ray.path() {
            draw_segment(root, &segment, ray_style)?;
        }
    }
    let virtual_style = VIRTUAL_RAY_COLOR.stroke_width(1);
    for (ray, virtual_ray) in result.ray_states().iter().zip(result.virtual_rays()) {
        let incident = Segment::new(ray.origin, ray.entry_point);
        for dash in incident
            .dashes(5.0, 3.0)
            .into_iter()
            .chain(virtual_ray.dashes(5.0, 3.0))
        {
            draw_segment(root, &dash, virtual_style)?;
        }
    }
    let virtual_focus = result.virtual_focus();
    let real_focus = result.real_focus();
    root.draw(&Circle::new(
        to_pixel(virtual_focus),
        FOCUS_POINT_RADIUS,
        VIRTUAL_RAY_COLOR.filled(),
    ))
    .map_err(render_error)?;
    root.draw(&Circle::new(
        to_pixel(real_focus),
        FOCUS_POINT_RADIUS,
        RAY_COLOR.filled(),
    ))
    .map_err(render_error)?;
    draw_label(
        root,
        "Virtual Focus",
        Point2::new(virtual_focus.x, virtual_focus.y - 15.0),
        &BLACK,
    );
    draw_label(
        root,
        "Real Focus",
        Point2::new(real_focus.x, real_focus.y + 20.0),
        &BLACK,
    );
    Ok(())
}

fn draw_slab<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    slab: &RotatedRect,
) -> SlabResult<()> {
    let corners: Vec<(i32, i32)> = slab.corners().into_iter().map(to_pixel).collect();
    root.draw(&Polygon::new(corners.clone(), SLAB_FILL.filled()))
        .map_err(render_error)?;
    let mut border = corners;
    if let Some(first) = border.first().copied() {
        border.push(first);
    }
    root.draw(&PathElement::new(border, SLAB_BORDER.stroke_width(1)))
        .map_err(render_error)
}

fn draw_segment<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    segment: &Segment,
    style: ShapeStyle,
) -> SlabResult<()> {
    root.draw(&PathElement::new(
        vec![to_pixel(segment.start), to_pixel(segment.end)],
        style,
    ))
    .map_err(render_error)
}

fn draw_label<DB: DrawingBackend, C: Color>(
    root: &DrawingArea<DB, Shift>,
    text: &str,
    position: Point2<f64>,
    color: &C,
) {
    let style = ("sans-serif", LABEL_FONT_SIZE)
        .into_font()
        .color(color)
        .pos(Pos::new(HPos::Center, VPos::Center));
    if let Err(e) = root.draw(&Text::new(text, to_pixel(position), style)) {
        warn!("label \"{text}\" could not be drawn: {e}");
    }
}

#[allow(clippy::cast_possible_truncation)]
fn to_pixel(point: Point2<f64>) -> (i32, i32) {
    (point.x.round() as i32, point.y.round() as i32)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn stroke_width(width: f64) -> u32 {
    width.round().max(1.0) as u32
}

fn render_error<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> SlabError {
    SlabError::Render(e.to_string())
}
