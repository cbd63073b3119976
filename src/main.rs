#![deny(clippy::all)]

use clap::{App, Arg};
use std::fs::File;
use std::path::Path;
use volray::Scene;

fn main() {
    let matches = App::new("volray")
        .about("A coarse-to-fine volumetric ray renderer written in Rust")
        .arg(
            Arg::with_name("scene")
                .index(1)
                .required(true)
                .takes_value(true)
                .help("input scene as a json file"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .default_value("render.png")
                .help("Output rendered image to file"),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .takes_value(true)
                .help("Override the scene's sampling seed"),
        )
        .arg(
            Arg::with_name("noprogress")
                .long("no-progress")
                .help("Hide progress bar"),
        )
        .get_matches();

    let scene_path = Path::new(matches.value_of("scene").unwrap());
    let scene_file = File::open(scene_path).expect("file not found");
    let output_filename = matches.value_of("output").unwrap();
    let use_progress = !matches.is_present("noprogress");

    let mut scene: Scene = serde_json::from_reader(scene_file).expect("failed to parse scene");
    if let Some(seed) = matches.value_of("seed") {
        scene.options.seed = seed.parse().expect("seed must be an integer");
    }

    let (image, duration) = match scene.render_to_image(use_progress) {
        Ok(rendered) => rendered,
        Err(error) => {
            eprintln!("render failed: {}", error);
            std::process::exit(1);
        }
    };

    image.save(output_filename).expect("unable to write image");
    println!("Output written to {} in {:.3?}", output_filename, duration);
}
