//! Render a synthetic reflectivity composite onto a Web Mercator canvas.
//!
//! Run with: cargo run --package renderer --example render_radar

use chrono::Utc;
use projection::{converters, ProjectionRegistry};
use radar_common::{AffineTransform, DataScale, DataType, LinearScale, ProductDescriptor};
use renderer::{RadarRenderer, RenderKey, RenderView};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Synthetic 760x1226 composite over Finland with a radial echo.
    let (width, height) = (760usize, 1226usize);
    let mut data = vec![255u8; width * height];
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
    for y in 0..height {
        for x in 0..width {
            let d = ((x as f64 - cx).powi(2) + (y as f64 - cy).powi(2)).sqrt();
            if d < width as f64 / 3.0 {
                data[y * width + x] = (64.0 + d / 4.0) as u8;
            }
        }
    }

    let product = ProductDescriptor {
        projection: "EPSG:4326".to_string(),
        affine: AffineTransform::new([
            19.8869934197,
            0.009449604183593748,
            0.0,
            62.5293188598,
            0.0,
            -0.0045287129015625024,
        ]),
        width,
        height,
        data,
        data_type: DataType::Reflectivity,
        scale: DataScale::Linear(LinearScale {
            step: 0.5,
            offset: -32.0,
            not_scanned: 255,
            no_echo: 0,
        }),
        unit: Some("dBZ".to_string()),
    };

    let registry = ProjectionRegistry::with_defaults();
    let (to_mercator, _) = converters(&registry, "EPSG:4326", "EPSG:3857").unwrap();
    let extent = to_mercator
        .convert_extent(&product.native_extent())
        .unwrap();
    let view = RenderView::new("EPSG:3857", extent, 512, 512);
    let key = RenderKey::new("demo::REFLECTIVITY", Utc::now(), &view.extent, 512, 512);

    let mut renderer = RadarRenderer::new(registry);
    let raster = renderer.render(&key, &product, &view).unwrap();

    let painted = raster
        .pixels()
        .chunks_exact(4)
        .filter(|px| px[3] > 0)
        .count();
    println!(
        "rendered {}x{} canvas, {} painted pixels",
        raster.width(),
        raster.height(),
        painted
    );

    // Probe the composite center.
    if let Some((value, color)) = renderer.probe(&product, &view, 20.83, 61.75).unwrap() {
        println!("value at (20.83E, 61.75N): {:?}, color {:?}", value, color);
    }

    // A second render of the same key is served from the cache.
    renderer.render(&key, &product, &view).unwrap();
    println!("cache stats: {:?}", renderer.cache_stats());
}
