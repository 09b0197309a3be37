use std::path::PathBuf;

use clap::Parser;

/// Format a device or an image file as onefilefs
#[derive(Parser)]
pub struct Cli {
    /// Device or image file to format
    pub device: PathBuf,

    /// Put a file into the root directory, content taken from the host PATH
    #[arg(long = "file", short, value_name = "NAME=PATH", value_parser = parse_file_arg)]
    pub files: Vec<(String, PathBuf)>,

    /// Create the image file, or grow it to the required size
    #[arg(long)]
    pub create: bool,
}

fn parse_file_arg(arg: &str) -> Result<(String, PathBuf), String> {
    match arg.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_owned(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=PATH, got {arg:?}")),
    }
}
