//! Ether Dream demo.
//!
//! Loads the vendor library, lists the attached controllers and plays a test
//! shape on one of them until the frame is replaced or the program exits.
//!
//! Run with: `cargo run --example etherdream -- [triangle|circle] --card 0`

use clap::{Parser, ValueEnum};
use netherdream::{EtherDreamLib, Frame, LaserPoint, LibraryConfig, Repeat, Result, Status};
use std::f32::consts::PI;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

#[derive(Parser)]
#[command(about = "Send a test pattern to an Ether Dream through the vendor library")]
struct Args {
    /// Shape to display
    #[arg(value_enum, default_value_t = Shape::Triangle)]
    shape: Shape,

    /// Card number to draw on
    #[arg(short, long, default_value_t = 0)]
    card: usize,

    /// Points per second
    #[arg(short, long, default_value_t = 30_000)]
    pps: u16,

    /// Repeat count, -1 for forever
    #[arg(short, long, default_value_t = -1, allow_negative_numbers = true)]
    repeat: i32,

    /// Directory containing the vendor library
    #[arg(long)]
    lib_dir: Option<PathBuf>,
}

#[derive(Copy, Clone, ValueEnum)]
enum Shape {
    Triangle,
    Circle,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = LibraryConfig::new();
    if let Some(dir) = args.lib_dir {
        config = config.with_search_dir(dir);
    }

    let mut lib = EtherDreamLib::with_config(config);
    lib.load()?;

    let devices = lib.list_devices()?;
    if devices.is_empty() {
        println!("No Ether Dream found.");
        lib.close()?;
        return Ok(());
    }
    for device in &devices {
        println!("  Found: {}", device);
    }

    let repeat = Repeat::from_signed(args.repeat)?;
    let points = match args.shape {
        Shape::Triangle => triangle(600),
        Shape::Circle => circle(600),
    };
    let frame = Frame::from_laser_points(args.pps, &points).with_repeat(repeat);

    lib.open_device(args.card)?;
    while lib.status(args.card)? == Status::Busy {
        thread::sleep(Duration::from_millis(5));
    }
    lib.write_frame(args.card, &frame)?;
    println!("Playing on card {}... Press Enter to stop", args.card);

    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);

    lib.stop(args.card)?;
    lib.close_device(args.card)?;
    lib.close()?;
    Ok(())
}

fn triangle(n_points: usize) -> Vec<LaserPoint> {
    let vertices = [
        (-0.5_f32, -0.5_f32, 65535_u16, 0_u16, 0_u16),
        (0.5, -0.5, 0, 65535, 0),
        (0.0, 0.5, 0, 0, 65535),
    ];
    let per_edge = (n_points / 3).max(20);

    let mut points = vec![LaserPoint::blanked(vertices[0].0, vertices[0].1); 5];
    for edge in 0..3 {
        let (x1, y1, r, g, b) = vertices[edge];
        let (x2, y2, ..) = vertices[(edge + 1) % 3];
        for i in 0..per_edge {
            let t = i as f32 / per_edge as f32;
            points.push(LaserPoint::new(
                x1 + (x2 - x1) * t,
                y1 + (y2 - y1) * t,
                r,
                g,
                b,
                65535,
            ));
        }
    }
    points
}

fn circle(n_points: usize) -> Vec<LaserPoint> {
    let mut points = vec![LaserPoint::blanked(0.5, 0.0); 5];
    for i in 0..=n_points {
        let angle = (i as f32 / n_points as f32) * 2.0 * PI;
        points.push(LaserPoint::new(
            0.5 * angle.cos(),
            0.5 * angle.sin(),
            65535,
            65535,
            65535,
            65535,
        ));
    }
    points
}
