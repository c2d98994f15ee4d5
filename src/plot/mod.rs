//! 3D scatter rendering of projected points

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::coordinates::Projection;
use crate::{FitscanError, Result};

/// Output image size in pixels
const PLOT_SIZE: (u32, u32) = (800, 800);

type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// Render `projection` as a 3D scatter plot
///
/// Points are drawn as small blue markers inside the [-1, 1] cube with axes
/// named X, Y and Z and no tick labels. A `.png` path produces a bitmap; any
/// other extension produces SVG.
pub fn render_scatter(projection: &Projection, output: &Path) -> Result<()> {
    let is_png = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"));

    let drawn = if is_png {
        let root = BitMapBackend::new(output, PLOT_SIZE).into_drawing_area();
        draw_scatter(&root, projection)
    } else {
        let root = SVGBackend::new(output, PLOT_SIZE).into_drawing_area();
        draw_scatter(&root, projection)
    };
    drawn.map_err(|e| FitscanError::PlotError(e.to_string()))?;

    log::info!(
        "Rendered {} points to {}",
        projection.len(),
        output.display()
    );
    Ok(())
}

fn draw_scatter<DB>(root: &DrawingArea<DB, Shift>, projection: &Projection) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .build_cartesian_3d(-1.0..1.0, -1.0..1.0, -1.0..1.0)?;

    chart.with_projection(|mut pb| {
        pb.yaw = 0.6;
        pb.pitch = 0.4;
        pb.scale = 0.8;
        pb.into_matrix()
    });

    chart
        .configure_axes()
        .x_labels(0)
        .y_labels(0)
        .z_labels(0)
        .draw()?;

    let label_style = ("sans-serif", 20).into_font().color(&BLACK);
    chart.draw_series(
        [
            ("X", (1.15, -1.0, -1.0)),
            ("Y", (-1.0, 1.15, -1.0)),
            ("Z", (-1.0, -1.0, 1.15)),
        ]
        .into_iter()
        .map(|(text, pos)| Text::new(text, pos, label_style.clone())),
    )?;

    chart.draw_series(
        projection
            .points()
            .map(|p| Circle::new((p.x, p.y, p.z), 1, BLUE.filled())),
    )?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::project_to_unit_sphere;
    use tempfile::tempdir;

    #[test]
    fn test_render_svg() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stars.svg");
        let projection =
            project_to_unit_sphere(&[0.0, 90.0, 180.0], &[0.0, 0.0, 90.0]).unwrap();

        render_scatter(&projection, &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<circle"));
    }

    #[test]
    fn test_render_empty_projection() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.svg");
        render_scatter(&Projection::default(), &path).unwrap();
        assert!(path.exists());
    }
}
