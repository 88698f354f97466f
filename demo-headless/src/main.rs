use clap::Parser;
use smoke_sim_core::{
    DiffusionParams, SessionConfig, SimulationSession, SmokeField, SmokeParams, SmokeSnapshot,
    Vec2,
};

/// Smoke transport demo with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "smoke-demo")]
#[command(about = "Wind-driven smoke transport demo", long_about = None)]
struct Args {
    /// Grid width in cells
    #[arg(long, default_value_t = 80)]
    width: usize,

    /// Grid height in cells
    #[arg(long, default_value_t = 40)]
    height: usize,

    /// Number of simulation ticks to run
    #[arg(short, long, default_value_t = 200)]
    ticks: u64,

    /// Wind speed
    #[arg(short = 'w', long, default_value_t = 3.0)]
    wind_speed: f32,

    /// Wind direction in degrees (math convention: 0 = +x, counterclockwise)
    #[arg(long, default_value_t = 0.0)]
    wind_direction: f32,

    /// Diffusion retain weight
    #[arg(long, default_value_t = 0.8)]
    retain: f32,

    /// Diffusion neighbor weight
    #[arg(long, default_value_t = 0.05)]
    diff_rate: f32,

    /// Advection distance scale (wind speed to cells per tick)
    #[arg(long, default_value_t = 0.2)]
    distance_scale: f32,

    /// Injection radius in grid cells
    #[arg(long, default_value_t = 6.0)]
    source_radius: f32,

    /// Chance per tick that the source emits a puff
    #[arg(long, default_value_t = 0.3)]
    emission_probability: f32,

    /// Density deposited per puff
    #[arg(long, default_value_t = 0.5)]
    emission_amount: f32,

    /// Seed for the emission draw
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,

    /// Report interval in ticks
    #[arg(short, long, default_value_t = 20)]
    report_interval: u64,

    /// Print an ASCII density frame at each report
    #[arg(long)]
    frames: bool,

    /// Round-trip the final field through the snapshot wire format
    #[arg(long)]
    snapshot_demo: bool,
}

/// Luminance ramp for ASCII frames, dark to bright.
const ASCII_RAMP: &[u8] = b" .:-=+*#%@";

/// Renderer contract: density maps linearly into an opacity channel.
fn density_to_intensity(density: f32) -> u8 {
    (density * 255.0).clamp(0.0, 255.0) as u8
}

fn render_frame(densities: &[f32], width: usize, height: usize) {
    for y in 0..height {
        let mut line = String::with_capacity(width);
        for x in 0..width {
            let intensity = usize::from(density_to_intensity(densities[y * width + x]));
            let slot = intensity * (ASCII_RAMP.len() - 1) / 255;
            line.push(ASCII_RAMP[slot] as char);
        }
        println!("{line}");
    }
    println!();
}

fn peak(densities: &[f32], width: usize) -> (f32, usize, usize) {
    let mut best = 0.0_f32;
    let mut best_idx = 0;
    for (idx, &v) in densities.iter().enumerate() {
        if v > best {
            best = v;
            best_idx = idx;
        }
    }
    (best, best_idx % width, best_idx / width)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    println!("=== Smoke Transport Demo ===\n");

    let params = SmokeParams {
        diffusion: DiffusionParams {
            retain: args.retain,
            diff_rate: args.diff_rate,
        },
        distance_scale: args.distance_scale,
        source_radius: args.source_radius,
    };
    let config = SessionConfig {
        emission_probability: args.emission_probability,
        emission_amount: args.emission_amount,
        seed: args.seed,
    };

    let mut session = match SimulationSession::with_params(args.width, args.height, params, config)
    {
        Ok(session) => session,
        Err(err) => {
            eprintln!("Failed to create session: {err}");
            std::process::exit(1);
        }
    };

    let angle = args.wind_direction.to_radians();
    let direction = Vec2::new(angle.cos(), angle.sin());
    if let Err(err) = session.field_mut().set_wind(direction, args.wind_speed) {
        eprintln!("Invalid wind: {err}");
        std::process::exit(1);
    }

    let (source_x, source_y) = session.field().smoke_source_position();
    println!("Grid: {}x{} cells", args.width, args.height);
    println!(
        "Wind: {:.1} at {:.0} degrees",
        args.wind_speed, args.wind_direction
    );
    println!("Source: ({source_x:.1}, {source_y:.1})\n");

    session.start();

    println!("  Tick | Total Smoke | Peak  | Peak Cell");
    println!("-------|-------------|-------|----------");

    let report_interval = args.report_interval.max(1);
    let mut next_report = report_interval;

    for _ in 0..args.ticks {
        if !session.tick() {
            break;
        }
        let tick = session.ticks_advanced();
        if tick >= next_report {
            let (width, height) = session.field().dimensions();
            let (peak_value, px, py) = peak(session.field().densities(), width);
            println!(
                "{:6} | {:11.3} | {:5.3} | ({px}, {py})",
                tick,
                session.field().total_density(),
                peak_value
            );
            if args.frames {
                render_frame(session.field().densities(), width, height);
            }
            next_report += report_interval;
        }
    }

    println!("\n=== Simulation Complete ===");
    println!("Ticks advanced: {}", session.ticks_advanced());
    println!("Total smoke: {:.3}", session.field().total_density());
    let (width, _) = session.field().dimensions();
    let (peak_value, px, py) = peak(session.field().densities(), width);
    println!("Peak density: {peak_value:.3} at ({px}, {py})");

    if args.snapshot_demo {
        snapshot_round_trip(&session);
    }
}

/// Demonstrate the remote-data exchange: encode the final field to the
/// wire format, decode it back, and seed a second solver from it. A
/// degraded payload is rejected without disturbing the local field.
fn snapshot_round_trip(session: &SimulationSession) {
    println!("\n=== Snapshot Round-Trip ===");

    let snapshot = session.field().snapshot();
    let bytes = match snapshot.to_bytes() {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("Encode failed: {err}");
            return;
        }
    };
    println!(
        "Encoded {} cells into {} bytes",
        snapshot.data.len(),
        bytes.len()
    );

    match SmokeSnapshot::from_bytes(&bytes) {
        Ok(decoded) => {
            let (width, height) = session.field().dimensions();
            match SmokeField::new(width, height) {
                Ok(mut seeded) => {
                    if let Err(err) = seeded.load_snapshot_normalized(&decoded) {
                        eprintln!("Seeding failed: {err}");
                        return;
                    }
                    println!(
                        "Seeded a fresh {width}x{height} field, total smoke {:.3}",
                        seeded.total_density()
                    );
                }
                Err(err) => eprintln!("Field construction failed: {err}"),
            }
        }
        Err(err) => {
            // Degraded collaborator: keep the last-known local field.
            println!("Decode failed ({err}); keeping local field");
        }
    }

    // A truncated transfer must be rejected, not mis-seeded.
    match SmokeSnapshot::from_bytes(&bytes[..bytes.len() / 2]) {
        Err(err) => println!("Truncated payload rejected: {err}"),
        Ok(_) => eprintln!("Truncated payload unexpectedly decoded"),
    }
}
