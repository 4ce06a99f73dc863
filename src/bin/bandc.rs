// src/bin/bandc.rs

//! CLI for the band codecs
//!
//! ```bash
//! bandc encode cac photo.png photo.cac --model HSB --tolerance 4 2 6
//! bandc encode dct photo.png photo.dct --coefficients 10
//! bandc decode photo.cac restored.png
//! bandc info photo.cac
//! bandc edge photo.png edges.png --tile-size 16
//! ```

use std::fs;
use std::process;

use clap::{Args, Parser, Subcommand};
use log::info;

use band_codecs::{
    CacParams, Codec, ColorModel, ContainerHeader, DctEdgeFilter, DctEdgeParams, DctParams,
    DeltaParams, ImageFilter, RleParams,
};

#[derive(Parser)]
#[command(name = "bandc", version, about = "Band-oriented raster image codecs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode an image file with one of the codecs
    Encode {
        #[command(subcommand)]
        codec: EncodeCommand,
    },
    /// Decode any codec stream back to an image file
    Decode {
        /// Encoded input file
        input: String,
        /// Output image; the format follows the extension
        output: String,
    },
    /// Show the container header of an encoded file
    Info {
        /// Encoded input file
        input: String,
    },
    /// Emphasize edges by reweighting DCT coefficients
    Edge {
        input: String,
        output: String,
        /// Tile edge length in pixels
        #[arg(long, default_value_t = 20)]
        tile_size: usize,
        /// Constant added to every coefficient weight
        #[arg(long, default_value_t = 0.0)]
        offset: f32,
        /// Weight given to the highest frequencies
        #[arg(long, default_value_t = 8.0)]
        strength: f32,
    },
}

#[derive(Args)]
struct Paths {
    /// Input image (any format the image crate reads)
    input: String,
    /// Encoded output file
    output: String,
}

#[derive(Subcommand)]
enum EncodeCommand {
    /// Quadtree region coding
    Cac {
        #[command(flatten)]
        paths: Paths,
        /// Colour model: RGB or HSB
        #[arg(short, long, default_value = "RGB")]
        model: ColorModel,
        /// Homogeneity tolerance per band
        #[arg(short, long, num_args = 3, default_values_t = [5.0, 5.0, 5.0])]
        tolerance: Vec<f64>,
    },
    /// 8x8 block DCT coding
    Dct {
        #[command(flatten)]
        paths: Paths,
        /// Zig-zag coefficients kept per tile (1-64)
        #[arg(short = 'n', long, default_value_t = 16)]
        coefficients: usize,
    },
    /// Per-row one-bit delta coding
    Delta {
        #[command(flatten)]
        paths: Paths,
        /// Colour model: RGB or HSB
        #[arg(short, long, default_value = "RGB")]
        model: ColorModel,
        /// Step size per band
        #[arg(short, long, num_args = 3, default_values_t = [4.0, 4.0, 4.0])]
        step: Vec<f64>,
    },
    /// Lossless bit-plane run-length coding
    Rle {
        #[command(flatten)]
        paths: Paths,
        /// Colour model: RGB or HSB
        #[arg(short, long, default_value = "RGB")]
        model: ColorModel,
    },
}

/// Turns a three-value command-line list into a per-band array.
fn per_band(values: &[f64], what: &str) -> Result<[f64; 3], String> {
    <[f64; 3]>::try_from(values).map_err(|_| format!("expected 3 {what} values, got {}", values.len()))
}

impl EncodeCommand {
    fn into_parts(self) -> Result<(Paths, Codec), String> {
        Ok(match self {
            EncodeCommand::Cac { paths, model, tolerance } => (
                paths,
                Codec::Cac(CacParams {
                    color_model: model,
                    tolerances: per_band(&tolerance, "tolerance")?,
                }),
            ),
            EncodeCommand::Dct { paths, coefficients } => (paths, Codec::Dct(DctParams { coefficients })),
            EncodeCommand::Delta { paths, model, step } => (
                paths,
                Codec::Delta(DeltaParams {
                    color_model: model,
                    steps: per_band(&step, "step")?,
                }),
            ),
            EncodeCommand::Rle { paths, model } => (paths, Codec::Rle(RleParams { color_model: model })),
        })
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Encode { codec } => cmd_encode(codec),
        Commands::Decode { input, output } => cmd_decode(&input, &output),
        Commands::Info { input } => cmd_info(&input),
        Commands::Edge {
            input,
            output,
            tile_size,
            offset,
            strength,
        } => cmd_edge(
            &input,
            &output,
            DctEdgeParams {
                tile_size,
                offset,
                strength,
            },
        ),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn cmd_encode(command: EncodeCommand) -> Result<(), String> {
    let (Paths { input, output }, codec) = command.into_parts()?;
    codec.validate().map_err(|e| e.to_string())?;

    let image = image::open(&input).map_err(|e| format!("read {input}: {e}"))?;
    let bytes = codec.encode_to_vec(&image).map_err(|e| e.to_string())?;
    fs::write(&output, &bytes).map_err(|e| format!("write {output}: {e}"))?;

    let raw_size = image.width() as usize * image.height() as usize * image.color().channel_count() as usize;
    eprintln!(
        "encoded {}x{} with {} -> {} bytes ({:.1}% of raw)",
        image.width(),
        image.height(),
        codec.kind(),
        bytes.len(),
        bytes.len() as f64 * 100.0 / raw_size.max(1) as f64
    );
    Ok(())
}

fn cmd_decode(input: &str, output: &str) -> Result<(), String> {
    let data = fs::read(input).map_err(|e| format!("read {input}: {e}"))?;
    let image = band_codecs::decode_from_slice(&data).map_err(|e| e.to_string())?;
    image.save(output).map_err(|e| format!("write {output}: {e}"))?;
    info!("decoded {} into {}x{}", input, image.width(), image.height());
    Ok(())
}

fn cmd_info(input: &str) -> Result<(), String> {
    let data = fs::read(input).map_err(|e| format!("read {input}: {e}"))?;
    let header = ContainerHeader::read(&mut data.as_slice()).map_err(|e| e.to_string())?;

    println!("Band codec stream info");
    println!("  File:        {input}");
    println!("  File size:   {} bytes", data.len());
    println!("  Codec:       {}", header.kind);
    println!("  Width:       {}", header.width);
    println!("  Height:      {}", header.height);
    println!("  Pixel type:  {:?} (tag {})", header.pixel_type, header.pixel_type.tag());
    println!("  Bands:       {}", header.band_count());
    Ok(())
}

fn cmd_edge(input: &str, output: &str, params: DctEdgeParams) -> Result<(), String> {
    let filter = DctEdgeFilter::new(params).map_err(|e| e.to_string())?;
    let image = image::open(input).map_err(|e| format!("read {input}: {e}"))?;
    let filtered = filter.apply(&image).map_err(|e| e.to_string())?;
    filtered.save(output).map_err(|e| format!("write {output}: {e}"))?;
    info!("edge filter {:?} applied to {}", filter.params(), input);
    Ok(())
}
