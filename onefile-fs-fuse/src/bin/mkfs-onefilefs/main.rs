mod cli;

use std::error::Error;
use std::fs::{self, OpenOptions};
use std::process::ExitCode;

use clap::Parser;
use cli::Cli;
use onefile_fs::format::{self, Layout};
use onefile_fs::BLOCK_SIZE;
use onefile_fs_fuse::BlockFile;

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("mkfs-onefilefs: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut layout = Layout::new();
    for (name, path) in &cli.files {
        let content = fs::read(path).map_err(|err| format!("{}: {err}", path.display()))?;
        log::info!("file={name:?} from {path:?}, {} bytes", content.len());
        layout = layout.file(name.as_bytes(), content);
    }
    // 先校验，避免留下写了一半的设备
    layout.validate()?;

    let fd = OpenOptions::new()
        .read(true)
        .write(true)
        .create(cli.create)
        .truncate(false)
        .open(&cli.device)
        .map_err(|err| format!("{}: {err}", cli.device.display()))?;

    if cli.create {
        let required = (layout.required_blocks() * BLOCK_SIZE) as u64;
        if fd.metadata()?.len() < required {
            fd.set_len(required)?;
        }
    }

    format::format(&BlockFile::new(fd), &layout)?;
    println!(
        "{}: onefilefs with {} files written",
        cli.device.display(),
        layout.files().len()
    );

    Ok(())
}
