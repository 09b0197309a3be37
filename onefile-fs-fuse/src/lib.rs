#[cfg(test)]
mod tests;

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::Mutex;

use block_dev::BlockDevice;

/// 以宿主文件为后端的块设备
#[derive(Debug)]
pub struct BlockFile(Mutex<File>);

impl BlockFile {
    pub fn new(fd: File) -> Self {
        Self(Mutex::new(fd))
    }

    fn file(&self) -> std::sync::MutexGuard<'_, File> {
        // 持锁线程 panic 不会破坏文件本身
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl BlockDevice for BlockFile {
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), block_dev::Error> {
        let mut file = self.file();
        file.seek(SeekFrom::Start((block_id * buf.len()) as u64))
            .map_err(|err| io_error(block_id, err))?;

        let mut len = 0;
        while len < buf.len() {
            match file.read(&mut buf[len..]) {
                Ok(0) => return Err(block_dev::Error::ShortRead { block_id, len }),
                Ok(n) => len += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(io_error(block_id, err)),
            }
        }

        Ok(())
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), block_dev::Error> {
        let mut file = self.file();
        file.seek(SeekFrom::Start((block_id * buf.len()) as u64))
            .map_err(|err| io_error(block_id, err))?;

        let mut len = 0;
        while len < buf.len() {
            match file.write(&buf[len..]) {
                Ok(0) => return Err(block_dev::Error::ShortWrite { block_id, len }),
                Ok(n) => len += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(io_error(block_id, err)),
            }
        }

        Ok(())
    }

    fn block_count(&self, block_size: usize) -> usize {
        match self.file().metadata() {
            Ok(meta) => meta.len() as usize / block_size,
            Err(err) => {
                log::error!("failed to query the image size: {err}");
                0
            }
        }
    }

    fn flush(&self) -> Result<(), block_dev::Error> {
        self.file().sync_data().map_err(|err| io_error(0, err))
    }
}

fn io_error(block_id: usize, err: io::Error) -> block_dev::Error {
    log::error!("I/O error on block {block_id}: {err}");
    block_dev::Error::Io { block_id }
}
