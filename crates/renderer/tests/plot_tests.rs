//! Whole-figure rendering: panels, filled contours, colour bars, profile lines.

use renderer::{
    draw_colorbar, render_filled, render_lines, Axes, BandStyle, Canvas, Extend, Grid2D,
    LineSeries, PanelLayout, Rgba, Scale, SERIES_COLORS,
};

fn two_band_style() -> BandStyle {
    BandStyle::new(
        vec![0.0, 50.0, 100.0],
        vec!["#2166ac".into(), "#b2182b".into()],
        Extend::Both,
    )
    .unwrap()
}

/// Section with rows = heights (km), columns = horizontal position (km).
fn section_grid() -> Grid2D {
    let x = vec![-0.5, -0.25, 0.0, 0.25, 0.5];
    let y = vec![0.5, 1.0, 2.0, 4.5];
    let values = y
        .iter()
        .flat_map(|&z| x.iter().map(move |&h: &f64| 100.0 * (1.0 - h.abs()) * z / 4.5))
        .collect();
    Grid2D::new(x, y, values).unwrap()
}

#[test]
fn test_five_panel_figure() {
    let layout = PanelLayout::grid(5, 3, 600, 400, 10);
    let mut canvas = Canvas::new(600, 400, Rgba::WHITE);
    let style = two_band_style();
    let grid = section_grid();
    let axes = Axes::linear((-0.5, 0.5), (0.5, 4.5)).unwrap();

    for panel in &layout.panels {
        let (plot, bar) = panel.split_right(12, 6);
        render_filled(&grid, &style, &axes, &mut canvas, plot).unwrap();
        draw_colorbar(&style, &mut canvas, bar).unwrap();
    }

    // bottom row is centred: nothing drawn in the bottom-left corner cell
    assert_eq!(canvas.pixel(20, 390), Some(Rgba::WHITE));

    // top of the middle of the first panel is the high band, bottom the low band
    let first = layout.panels[0].split_right(12, 6).0;
    let mid_x = first.x + first.width / 2;
    assert_eq!(canvas.pixel(mid_x, first.y + 3), Some(Rgba::opaque(0xb2, 0x18, 0x2b)));
    assert_eq!(
        canvas.pixel(mid_x, first.bottom() - 3),
        Some(Rgba::opaque(0x21, 0x66, 0xac))
    );

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sections.png");
    canvas.save(&path).unwrap();
    assert!(std::fs::metadata(&path).unwrap().len() > 100);
}

#[test]
fn test_profile_semilog_plot() {
    let axes = Axes::new((1e-2, 1e10), (0.5, 4.5), Scale::Log).unwrap();
    let layout = PanelLayout::grid(1, 1, 400, 300, 20);
    let mut canvas = Canvas::new(400, 300, Rgba::WHITE);

    let heights_km: Vec<f64> = (1..=40).map(|i| i as f64 * 0.1 + 0.4).collect();
    let series: Vec<LineSeries> = (0..3)
        .map(|r| {
            let x = heights_km
                .iter()
                .map(|z| 10f64.powf(2.0 + r as f64 + z))
                .collect();
            LineSeries::new(format!("run{}", r + 1), x, heights_km.clone(), SERIES_COLORS[r])
                .unwrap()
        })
        .collect();

    render_lines(&series, &axes, &mut canvas, layout.panels[0], 2).unwrap();

    for color in &SERIES_COLORS[..3] {
        let count = canvas
            .pixels()
            .chunks_exact(4)
            .filter(|px| *px == color.to_array())
            .count();
        assert!(count > 50, "series colour {:?} drawn {} times", color, count);
    }
}

#[test]
fn test_invalid_style_is_rejected_before_drawing() {
    let style = BandStyle {
        levels: vec![0.0, 1.0],
        colors: vec!["#000000".into(), "#ffffff".into()],
        extend: Extend::Neither,
    };
    let mut canvas = Canvas::new(10, 10, Rgba::WHITE);
    let axes = Axes::linear((0.0, 1.0), (0.0, 1.0)).unwrap();
    let grid = Grid2D::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![0.5; 4]).unwrap();

    assert!(render_filled(&grid, &style, &axes, &mut canvas, PanelLayout::grid(1, 1, 10, 10, 0).panels[0]).is_err());
    assert!(canvas.pixels().chunks_exact(4).all(|px| px == Rgba::WHITE.to_array()));
}
