// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use jpeg::api::{JpegDecoder, JpegDecoderLimits, JpegDecoderOptions, JpegOutputFormat};
use jpeg_cli::{enc::encode_for_path, metadata::describe};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Rgba,
    Rgb,
    Native,
}

#[derive(Parser)]
#[command(about = "Decodes a baseline or progressive JPEG file")]
struct Opt {
    /// Input JPEG file
    input: PathBuf,

    /// Output image file, should end in .png, .ppm, .pgm or .pam. Without
    /// it, only a summary of the image is printed.
    output: Option<PathBuf>,

    /// Pixel layout of the output; derived from the output extension if
    /// omitted
    #[clap(long, value_enum)]
    format: Option<OutputFormat>,

    /// Forces the YCbCr/YCCK color transform on
    #[clap(long, conflicts_with = "no_color_transform")]
    color_transform: bool,

    /// Forces the YCbCr/YCCK color transform off
    #[clap(long)]
    no_color_transform: bool,

    /// Maximum image size in megapixels
    #[clap(long)]
    max_megapixels: Option<f64>,

    /// Maximum projected memory use in MiB
    #[clap(long)]
    max_memory_mb: Option<u64>,

    /// Disables all resource limits
    #[clap(long, conflicts_with_all = ["max_megapixels", "max_memory_mb"])]
    unlimited: bool,

    /// Prints the contents of COM segments
    #[clap(long)]
    print_comments: bool,
}

fn default_format(output: &Path) -> JpegOutputFormat {
    match output.extension().and_then(|e| e.to_str()) {
        Some("ppm") => JpegOutputFormat::Rgb,
        Some("pgm") | Some("pam") => JpegOutputFormat::Native,
        _ => JpegOutputFormat::Rgba,
    }
}

fn options(opt: &Opt) -> JpegDecoderOptions {
    let mut options = JpegDecoderOptions::default();
    if opt.color_transform {
        options.color_transform = Some(true);
    } else if opt.no_color_transform {
        options.color_transform = Some(false);
    }
    options.output_format = match (opt.format, &opt.output) {
        (Some(OutputFormat::Rgba), _) => JpegOutputFormat::Rgba,
        (Some(OutputFormat::Rgb), _) => JpegOutputFormat::Rgb,
        (Some(OutputFormat::Native), _) => JpegOutputFormat::Native,
        (None, Some(output)) => default_format(output),
        (None, None) => JpegOutputFormat::Native,
    };
    if opt.unlimited {
        options.limits = JpegDecoderLimits::unlimited();
    }
    if let Some(max_megapixels) = opt.max_megapixels {
        options.limits.max_megapixels = Some(max_megapixels);
    }
    if let Some(max_memory_mb) = opt.max_memory_mb {
        options.limits.max_memory_mb = Some(max_memory_mb);
    }
    options
}

fn main() -> Result<()> {
    color_eyre::install()?;

    #[cfg(feature = "tracing-subscriber")]
    {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(EnvFilter::from_default_env())
            .init();
    }

    let opt = Opt::parse();
    let data = fs::read(&opt.input)
        .wrap_err_with(|| format!("Cannot read {}", opt.input.display()))?;

    let decoder = JpegDecoder::new(options(&opt));
    let image = decoder
        .decode(&data)
        .wrap_err_with(|| format!("Failed to decode {}", opt.input.display()))?;
    print!("{}", describe(&image, opt.print_comments));

    if let Some(output) = &opt.output {
        let bytes = encode_for_path(&image, output)?;
        fs::write(output, bytes)
            .wrap_err_with(|| format!("Cannot write {}", output.display()))?;
    }
    Ok(())
}
