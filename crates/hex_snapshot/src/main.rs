use std::{env, error::Error, path::PathBuf};

use futures::executor::block_on;
use log::info;

use hexshade::{HexFrame, OffscreenRenderer};

struct Args {
    frame: PathBuf,
    output: PathBuf,
    width: u32,
    height: u32,
}

impl Args {
    fn parse() -> Result<Self, Box<dyn Error>> {
        let mut args = env::args().skip(1);
        let frame = args.next().unwrap_or_else(|| "./frame.json".to_string());
        let output = args.next().unwrap_or_else(|| "./frame.png".to_string());
        let width = args.next().map(|width| width.parse()).transpose()?;
        let height = args.next().map(|height| height.parse()).transpose()?;

        Ok(Self {
            frame: frame.into(),
            output: output.into(),
            width: width.unwrap_or(512),
            height: height.unwrap_or(512),
        })
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args = Args::parse()?;
    let frame = HexFrame::from_json_file(&args.frame)?;
    info!(
        "Rendering {} draw(s) from {} at {}x{}",
        frame.draws.len(),
        args.frame.display(),
        args.width,
        args.height
    );

    let image = block_on(async {
        let mut renderer = OffscreenRenderer::new(args.width, args.height).await?;
        renderer.draw(&frame).await
    })?;

    image.save(&args.output)?;
    info!("Wrote {}", args.output.display());
    Ok(())
}
