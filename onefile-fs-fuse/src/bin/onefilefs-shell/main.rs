mod cli;

use std::error::Error;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use cli::{Cli, Command};
use onefile_fs::{Directory, File, OneFileSystem, BLOCK_SIZE};
use onefile_fs_fuse::BlockFile;
use vfs::DirEntryType;

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("onefilefs-shell: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let fd = OpenOptions::new()
        .read(true)
        .write(matches!(cli.command, Command::Write { .. }))
        .open(&cli.image)
        .map_err(|err| format!("{}: {err}", cli.image.display()))?;

    let fs = OneFileSystem::mount(Arc::new(BlockFile::new(fd)))?;
    let root = fs.root()?;

    let res = match cli.command {
        Command::Ls => ls(&root),
        Command::Stat { name } => stat(&root, &name),
        Command::Cat { name } => cat(&open(&root, &name)?),
        Command::Write { name, offset, text } => {
            let written = open(&root, &name)?.write_at(offset, text.as_bytes())?;
            println!("{written} bytes written");
            Ok(())
        }
    };

    drop(root);
    fs.unmount();
    res
}

fn ls(root: &Directory) -> Result<(), Box<dyn Error>> {
    for entry in root.ls_at(0, usize::MAX)? {
        let ty = match entry.ty {
            DirEntryType::Directory => 'd',
            DirEntryType::Regular => '-',
            DirEntryType::Unknown => '?',
        };
        println!("{ty} {:>4} {}", entry.inode, entry.name);
    }
    Ok(())
}

fn stat(root: &Directory, name: &str) -> Result<(), Box<dyn Error>> {
    let inode = root
        .lookup(name.as_bytes())?
        .ok_or_else(|| format!("{name}: no such file"))?;
    let stat = inode.stat()?;

    println!("  File: {name}");
    println!("  Type: {:?}", stat.mode);
    println!(" Inode: {}", stat.inode);
    println!("Access: {:04o}", stat.perm);
    println!("  Size: {}", stat.size);
    println!("Blocks: {} of {} bytes", stat.blocks, stat.block_size);
    Ok(())
}

fn cat(file: &File) -> Result<(), Box<dyn Error>> {
    let mut buf = vec![0; BLOCK_SIZE];
    let len = file.read_at(0, &mut buf)?;
    io::stdout().write_all(&buf[..len])?;
    Ok(())
}

fn open(root: &Directory, name: &str) -> Result<File, Box<dyn Error>> {
    let inode = root
        .lookup(name.as_bytes())?
        .ok_or_else(|| format!("{name}: no such file"))?;
    Ok(inode.into_file()?)
}
