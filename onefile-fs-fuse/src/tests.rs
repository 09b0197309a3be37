use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::sync::Arc;
use std::{env, fs, process};

use block_dev::BlockDevice;
use onefile_fs::format::{self, Layout};
use onefile_fs::{OneFileSystem, BLOCK_SIZE};

use crate::BlockFile;

/// 测试结束时删除的临时镜像
struct Image(PathBuf);

impl Image {
    fn new(name: &str, blocks: usize) -> Self {
        let path = env::temp_dir().join(format!("onefilefs-{}-{name}.img", process::id()));
        File::create(&path)
            .and_then(|fd| fd.set_len((blocks * BLOCK_SIZE) as u64))
            .unwrap();
        Self(path)
    }

    fn open(&self) -> BlockFile {
        BlockFile::new(OpenOptions::new().read(true).write(true).open(&self.0).unwrap())
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

#[test]
fn block_round_trip() {
    let image = Image::new("round-trip", 4);
    let dev = image.open();
    assert_eq!(4, dev.block_count(BLOCK_SIZE));

    let block = vec![0x5a; BLOCK_SIZE];
    dev.write_block(2, &block).unwrap();
    dev.flush().unwrap();

    let mut buf = vec![0; BLOCK_SIZE];
    dev.read_block(2, &mut buf).unwrap();
    assert_eq!(block, buf);
    dev.read_block(1, &mut buf).unwrap();
    assert!(buf.iter().all(|&b| b == 0));
}

#[test]
fn read_past_the_image_is_short() {
    let image = Image::new("short", 1);
    let dev = image.open();

    let mut buf = vec![0; BLOCK_SIZE];
    assert_eq!(
        Err(block_dev::Error::ShortRead {
            block_id: 1,
            len: 0
        }),
        dev.read_block(1, &mut buf)
    );
}

#[test]
fn format_and_mount_an_image() {
    let image = Image::new("mount", 8);
    format::format(&image.open(), &Layout::new().file("note.txt", "hi")).unwrap();

    let fs = OneFileSystem::mount(Arc::new(image.open())).unwrap();
    let note = fs
        .root()
        .unwrap()
        .lookup(b"note.txt")
        .unwrap()
        .unwrap()
        .into_file()
        .unwrap();
    assert_eq!(3, note.write_at(2, b"!!!").unwrap());
    fs.unmount();

    let fs = OneFileSystem::mount(Arc::new(image.open())).unwrap();
    let note = fs.root().unwrap().lookup(b"note.txt").unwrap().unwrap();
    assert_eq!(5, note.stat().unwrap().size);
}
