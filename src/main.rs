//
// cargo run -- capture.bin label.pbm
//
// Decodes a captured printer command stream (raw bytes as sent to TCP port
// 9100) and writes the image that would have been printed as a plain
// netpbm bitmap.

use std::fs;

use log::info;
use ptouch_raster::decode;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!("usage: {} <input.bin> <output.pbm>", args[0]);
        std::process::exit(2);
    }

    if let Err(err) = run(&args[1], &args[2]) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(input: &str, output: &str) -> Result<(), ptouch_raster::Error> {
    let data = fs::read(input)?;
    let image = decode(&data)?;

    info!("width: {}, height: {}", image.width(), image.height());

    fs::write(output, image.to_pbm())?;
    Ok(())
}
