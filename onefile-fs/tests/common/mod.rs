#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use block_dev::BlockDevice;
use onefile_fs::{Layout, OneFileSystem, BLOCK_SIZE};

/// 内存中的块设备
pub struct RamDisk {
    bytes: Mutex<Vec<u8>>,
    writes: AtomicUsize,
}

impl RamDisk {
    pub fn new(blocks: usize) -> Arc<Self> {
        Arc::new(Self {
            bytes: Mutex::new(vec![0; blocks * BLOCK_SIZE]),
            writes: AtomicUsize::new(0),
        })
    }

    pub fn formatted(layout: &Layout) -> Arc<Self> {
        let disk = Self::new(layout.required_blocks() + 4);
        layout.write_to(&*disk).unwrap();
        disk
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.lock().unwrap().clone()
    }

    pub fn block(&self, block_id: usize) -> Vec<u8> {
        let start = block_id * BLOCK_SIZE;
        self.bytes.lock().unwrap()[start..start + BLOCK_SIZE].to_vec()
    }

    pub fn patch(&self, offset: usize, data: &[u8]) {
        self.bytes.lock().unwrap()[offset..offset + data.len()].copy_from_slice(data);
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

impl BlockDevice for RamDisk {
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), block_dev::Error> {
        let bytes = self.bytes.lock().unwrap();
        let start = block_id * buf.len();
        let block = bytes
            .get(start..start + buf.len())
            .ok_or(block_dev::Error::OutOfRange { block_id })?;
        buf.copy_from_slice(block);
        Ok(())
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), block_dev::Error> {
        let mut bytes = self.bytes.lock().unwrap();
        let start = block_id * buf.len();
        bytes
            .get_mut(start..start + buf.len())
            .ok_or(block_dev::Error::OutOfRange { block_id })?
            .copy_from_slice(buf);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn block_count(&self, block_size: usize) -> usize {
        self.bytes.lock().unwrap().len() / block_size
    }
}

/// 写到第`fail_at`次时只写进去一半
pub struct FlakyDisk {
    inner: Arc<RamDisk>,
    fail_at: usize,
}

impl FlakyDisk {
    pub fn new(blocks: usize, fail_at: usize) -> Arc<Self> {
        Arc::new(Self {
            inner: RamDisk::new(blocks),
            fail_at,
        })
    }

    pub fn inner(&self) -> &RamDisk {
        &self.inner
    }
}

impl BlockDevice for FlakyDisk {
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), block_dev::Error> {
        self.inner.read_block(block_id, buf)
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), block_dev::Error> {
        if self.inner.writes() + 1 == self.fail_at {
            return Err(block_dev::Error::ShortWrite {
                block_id,
                len: buf.len() / 2,
            });
        }
        self.inner.write_block(block_id, buf)
    }

    fn block_count(&self, block_size: usize) -> usize {
        self.inner.block_count(block_size)
    }
}

/// 根目录下只有`note.txt`，内容为`hi`
pub fn note_layout() -> Layout {
    Layout::new().file("note.txt", "hi")
}

pub fn mount(layout: &Layout) -> (Arc<RamDisk>, Arc<OneFileSystem>) {
    let disk = RamDisk::formatted(layout);
    let fs = OneFileSystem::mount(disk.clone()).unwrap();
    (disk, fs)
}

pub fn u64_at(bytes: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap())
}

pub fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}
