// Check downwind drift with minimal setup
use smoke_sim_core::{SmokeField, SmokeParams, Vec2};

/// Density-weighted centroid of the field, x component.
fn centroid_x(field: &SmokeField) -> f32 {
    let (width, _height) = field.dimensions();
    let mut weighted = 0.0;
    let mut total = 0.0;
    for (idx, &v) in field.densities().iter().enumerate() {
        weighted += (idx % width) as f32 * v;
        total += v;
    }
    if total > 0.0 {
        weighted / total
    } else {
        0.0
    }
}

fn main() {
    let params = SmokeParams {
        source_radius: 4.0,
        ..SmokeParams::default()
    };
    let mut field = SmokeField::with_params(60, 30, params).expect("valid dimensions");
    field
        .set_wind(Vec2::new(1.0, 0.0), 5.0)
        .expect("valid wind");
    field.add_smoke(15.0, 15.0, 1.0).expect("valid injection");

    let start = centroid_x(&field);
    println!("Injected at x=15, centroid x = {start:.2}");

    println!("\nTick | Centroid X | Total Smoke");
    println!("-----|------------|------------");
    for tick in 1..=40 {
        field.update();
        if tick % 10 == 0 {
            println!(
                "{tick:4} | {:10.2} | {:.3}",
                centroid_x(&field),
                field.total_density()
            );
        }
    }

    let end = centroid_x(&field);
    let drift = end - start;
    println!("\nCentroid drift: {drift:+.2} cells over 40 ticks");
    if drift > 0.0 {
        println!("PASS: smoke drifted downwind");
    } else {
        println!("FAIL: no downwind drift");
    }
}
