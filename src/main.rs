use std::path::PathBuf;
use std::process;
use std::thread;

use clap::Parser;
use log::{ error, info };

use whitted::Result;
use whitted::camera::Camera;
use whitted::consts::{ DEFAULT_OUT_FILE, DEFAULT_RECURSION_DEPTH };
use whitted::scene::Scene;

/// Renders a JSON scene description to a PPM image.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Path to the JSON scene file
    scene: PathBuf,

    /// Where to write the PPM image
    #[clap(short, long, default_value = DEFAULT_OUT_FILE)]
    output: PathBuf,

    /// How many reflection/refraction bounces to follow
    #[clap(short, long, default_value_t = DEFAULT_RECURSION_DEPTH)]
    depth: usize,

    /// Worker threads; defaults to the available parallelism
    #[clap(short, long)]
    threads: Option<usize>,

    /// Overrides the camera's horizontal size
    #[clap(long)]
    width: Option<usize>,

    /// Overrides the camera's vertical size
    #[clap(long)]
    height: Option<usize>,
}

fn run(args: Args) -> Result<()> {
    let Scene { world, mut camera } = Scene::from_file(&args.scene)?;

    if args.width.is_some() || args.height.is_some() {
        camera = Camera::new(
            args.width.unwrap_or(camera.hsize),
            args.height.unwrap_or(camera.vsize),
            camera.field_of_view,
            *camera.transform(),
        );
    }

    let threads = args.threads.unwrap_or_else(|| {
        thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    });

    let canvas = camera.render_parallel(&world, args.depth, threads);
    info!("Finished rendering {}", args.scene.display());

    canvas.save(&args.output)
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{}", e);
        process::exit(1);
    }
}
