use cgmath::Vector3;
use eddy::{Axis, VelocityField};
use image::{Rgba, RgbaImage};
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Stroke, Transform};

// Angle between an arrow shaft and each side of its head.
const HEAD_ANGLE: f32 = 0.45;

/// Draw, every `gap` cells, a velocity arrow and then the tracers, and save
/// `out/{prefix}_{index}.png` with `scale` pixels per cell.
pub fn save_frame(
    prefix: &str,
    index: usize,
    field: &VelocityField,
    tracers: &[Vector3<f64>],
    scale: usize,
    gap: usize,
) -> anyhow::Result<()> {
    let grid = field.grid();
    let (w, h) = ((grid.size_x() * scale) as u32, (grid.size_y() * scale) as u32);

    let mut pixmap = Pixmap::new(w, h).ok_or_else(|| anyhow::anyhow!("empty frame {}x{}", w, h))?;
    pixmap.fill(Color::BLACK);

    let u = field.velocity_grid(Axis::X)?;
    let v = field.velocity_grid(Axis::Y)?;
    let length = (scale * gap) as f32;
    let half = scale as f32 * 0.5;

    let mut pb = PathBuilder::new();
    for j in (0..grid.size_y()).step_by(gap) {
        for i in (0..grid.size_x()).step_by(gap) {
            let x0 = i as f32 * scale as f32 + half;
            let y0 = j as f32 * scale as f32 + half;
            let dx = u[[0, j, i]] as f32 * length;
            let dy = v[[0, j, i]] as f32 * length;

            arrow(&mut pb, (x0, y0), (dx, dy));
        }
    }

    if let Some(path) = pb.finish() {
        let mut paint = Paint::default();
        paint.set_color_rgba8(255, 255, 255, 255);
        paint.anti_alias = true;

        let stroke = Stroke {
            width: 1.0,
            ..Stroke::default()
        };

        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    // The background is opaque, so the premultiplied pixels are plain RGBA.
    let mut img = RgbaImage::from_raw(w, h, pixmap.data().to_vec())
        .ok_or_else(|| anyhow::anyhow!("pixmap does not fit a {}x{} image", w, h))?;

    let tracer = Rgba([60, 60, 255, 255]);
    for p in tracers {
        let (x, y) = (p.x * scale as f64, p.y * scale as f64);
        if x >= 0.0 && y >= 0.0 && (x as u32) < w && (y as u32) < h {
            img.put_pixel(x as u32, y as u32, tracer);
        }
    }

    img.save(format!("out/{}_{:06}.png", prefix, index))?;

    Ok(())
}

/// Shaft from `from` along `d`, and a head a third of its length.
fn arrow(pb: &mut PathBuilder, from: (f32, f32), d: (f32, f32)) {
    let len = d.0.hypot(d.1);
    if !(len > 0.5) {
        return;
    }

    let tip = (from.0 + d.0, from.1 + d.1);
    pb.move_to(from.0, from.1);
    pb.line_to(tip.0, tip.1);

    let back = d.1.atan2(d.0) + std::f32::consts::PI;
    let head = len / 3.0;
    for side in [-HEAD_ANGLE, HEAD_ANGLE].iter() {
        let a = back + side;
        pb.move_to(tip.0, tip.1);
        pb.line_to(tip.0 + head * a.cos(), tip.1 + head * a.sin());
    }
}
