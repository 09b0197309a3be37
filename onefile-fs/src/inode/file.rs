use alloc::sync::Arc;

use vfs::{DirEntryType, Stat};

use crate::layout::{DiskInode, InodeBody};
use crate::sync::{Interrupt, NeverInterrupted};
use crate::{DataBlock, Error, OneFileSystem, Result};
use crate::BLOCK_SIZE;

/// 普通文件句柄，内容全部位于一个数据块内
#[derive(Clone)]
pub struct File {
    fs: Arc<OneFileSystem>,
    inode_no: u64,
    data_block: usize,
}

impl File {
    pub(crate) fn new(fs: Arc<OneFileSystem>, disk: &DiskInode) -> Self {
        Self {
            fs,
            inode_no: disk.inode_no,
            data_block: disk.data_block_number as usize,
        }
    }

    #[inline]
    pub fn inode_no(&self) -> u64 {
        self.inode_no
    }

    #[inline]
    pub fn data_block(&self) -> usize {
        self.data_block
    }

    /// 索引节点表中当前记录的文件大小
    pub fn size(&self) -> Result<u64> {
        let disk = self.fs.resolve(self.inode_no)?;
        Self::size_of(&disk)
    }

    /// 从`offset`读出数据填充`buf`，不加锁。
    ///
    /// `offset`到达文件末尾时读到0字节；读取不会越过数据块的边界。
    pub fn read_at(&self, offset: usize, buf: &mut [u8]) -> Result<usize> {
        let size = self.size()?;
        let size = if size > BLOCK_SIZE as u64 {
            log::warn!("inode {} records {size} bytes in one block", self.inode_no);
            BLOCK_SIZE
        } else {
            size as usize
        };

        if offset >= size {
            return Ok(0);
        }
        let len = buf.len().min(size - offset);

        self.fs
            .cache()
            .get(self.data_block)?
            .lock()
            .map(0, |data_block: &DataBlock| {
                buf[..len].copy_from_slice(&data_block[offset..offset + len])
            });

        log::debug!("read {len} bytes at {offset} from inode {}", self.inode_no);
        Ok(len)
    }

    /// 按宿主约定写入：越界、稀疏写入和等锁被打断都只报告写入了0字节
    pub fn write_at(&self, offset: usize, buf: &[u8]) -> Result<usize> {
        self.write_at_interruptible(offset, buf, &NeverInterrupted)
    }

    /// 同 [`Self::write_at`]，等锁时检查`intr`
    pub fn write_at_interruptible(
        &self,
        offset: usize,
        buf: &[u8],
        intr: &dyn Interrupt,
    ) -> Result<usize> {
        match self.try_write_at(offset, buf, intr) {
            Err(err) if err.is_write_rejection() => {
                log::warn!("write to inode {} rejected: {err}", self.inode_no);
                Ok(0)
            }
            res => res,
        }
    }

    /// 写入并给出拒绝的具体原因。
    ///
    /// 分两个阶段，两把锁从不同时持有：
    /// 1. 数据锁下把`buf`拷进数据块并标记为脏块；
    /// 2. 若写到了原文件末尾之后，再在索引节点锁下更新文件大小。
    ///
    /// 两阶段之间，并发的读者可能看到新数据和旧的文件大小。
    /// 只有等数据锁时被打断才算拒绝；等索引节点锁时被打断，
    /// 返回原文件末尾之前实际覆盖的字节数。
    pub fn try_write_at(&self, offset: usize, buf: &[u8], intr: &dyn Interrupt) -> Result<usize> {
        if offset >= BLOCK_SIZE {
            return Err(Error::CapacityExceeded {
                offset,
                len: buf.len(),
            });
        }

        let size = self.size()?;
        if offset as u64 > size {
            return Err(Error::OffsetBeyondContent { offset, size });
        }

        let len = buf.len().min(BLOCK_SIZE - offset);
        if len == 0 {
            return Ok(0);
        }

        {
            let _guard = self
                .fs
                .data_lock()
                .lock_interruptible(intr)
                .inspect_err(|_| log::warn!("write to inode {} interrupted", self.inode_no))?;

            self.fs
                .cache()
                .get(self.data_block)?
                .lock()
                .map_mut(0, |data_block: &mut DataBlock| {
                    data_block[offset..offset + len].copy_from_slice(&buf[..len])
                });
        }

        let end = (offset + len) as u64;
        if end > size {
            match self.fs.commit_file_size(self.inode_no, end, intr) {
                Ok(()) => {}
                // 数据已经落进块里，只报告旧文件末尾之前可见的部分
                Err(Error::Interrupted) => {
                    let visible = (size - offset as u64) as usize;
                    log::warn!(
                        "size update of inode {} interrupted, {visible} of {len} bytes visible",
                        self.inode_no
                    );
                    return Ok(visible);
                }
                Err(err) => return Err(err),
            }
        }

        log::debug!("wrote {len} bytes at {offset} to inode {}", self.inode_no);
        Ok(len)
    }

    pub fn stat(&self) -> Result<Stat> {
        let disk = self.fs.resolve(self.inode_no)?;
        Ok(Stat {
            inode: self.inode_no,
            mode: DirEntryType::Regular,
            perm: disk.perm(),
            block_size: BLOCK_SIZE as u64,
            blocks: 1,
            size: Self::size_of(&disk)?,
        })
    }

    fn size_of(disk: &DiskInode) -> Result<u64> {
        match disk.body() {
            Some(InodeBody::File { size }) => Ok(size),
            Some(InodeBody::Directory { .. }) => Err(Error::IsADirectory(disk.inode_no)),
            None => Err(Error::UnknownKind {
                inode: disk.inode_no,
                mode: disk.mode,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use core::sync::atomic::AtomicBool;

    use block_dev::BlockDevice;
    use spin::Mutex;

    use super::File;
    use crate::sync::NeverInterrupted;
    use crate::{DataBlock, Error, Layout, OneFileSystem, BLOCK_SIZE};

    struct Ram(Mutex<Vec<u8>>);

    impl BlockDevice for Ram {
        fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), block_dev::Error> {
            let start = block_id * buf.len();
            buf.copy_from_slice(&self.0.lock()[start..start + buf.len()]);
            Ok(())
        }

        fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), block_dev::Error> {
            let start = block_id * buf.len();
            self.0.lock()[start..start + buf.len()].copy_from_slice(buf);
            Ok(())
        }

        fn block_count(&self, block_size: usize) -> usize {
            self.0.lock().len() / block_size
        }
    }

    fn note() -> File {
        let ram = Arc::new(Ram(Mutex::new(alloc::vec![0; 4 * BLOCK_SIZE])));
        Layout::new().file("note", "hi").write_to(&*ram).unwrap();

        let fs = OneFileSystem::mount(ram).unwrap();
        let root = fs.root().unwrap();
        root.lookup(b"note").unwrap().unwrap().into_file().unwrap()
    }

    fn raw_data(file: &File) -> Vec<u8> {
        file.fs
            .cache()
            .get(file.data_block)
            .unwrap()
            .lock()
            .map(0, |data: &DataBlock| data[..8].to_vec())
    }

    #[test]
    fn interrupted_while_data_lock_is_held() {
        let note = note();
        let intr = AtomicBool::new(true);

        let held = note.fs.data_lock().lock_interruptible(&NeverInterrupted).unwrap();
        assert_eq!(Err(Error::Interrupted), note.try_write_at(0, b"HI", &intr));
        assert_eq!(Ok(0), note.write_at_interruptible(2, b"!!", &intr));
        drop(held);

        assert_eq!(b"hi\0\0", &raw_data(&note)[..4]);
        assert_eq!(2, note.size().unwrap());
    }

    #[test]
    fn interrupted_while_inode_lock_is_held() {
        let note = note();
        let intr = AtomicBool::new(true);

        let held = note.fs.inode_lock().lock_interruptible(&NeverInterrupted).unwrap();
        assert_eq!(Ok(0), note.try_write_at(2, b"!!", &intr));
        drop(held);

        // 数据已写入，大小未更新
        assert_eq!(b"hi!!", &raw_data(&note)[..4]);
        assert_eq!(2, note.size().unwrap());

        let mut buf = [0; 8];
        assert_eq!(2, note.read_at(0, &mut buf).unwrap());
    }

    #[test]
    fn interrupted_size_update_reports_overwritten_bytes() {
        let note = note();
        let intr = AtomicBool::new(true);

        let held = note.fs.inode_lock().lock_interruptible(&NeverInterrupted).unwrap();
        assert_eq!(Ok(2), note.write_at_interruptible(0, b"XYZ", &intr));
        assert_eq!(Ok(1), note.try_write_at(1, b"QRS", &intr));
        drop(held);

        assert_eq!(2, note.size().unwrap());
        let mut buf = [0; 8];
        assert_eq!(2, note.read_at(0, &mut buf).unwrap());
        assert_eq!(b"XQ", &buf[..2]);
        assert_eq!(b"XQRS", &raw_data(&note)[..4]);
    }

    #[test]
    fn overwrite_inside_the_file_skips_the_inode_lock() {
        let note = note();
        let intr = AtomicBool::new(true);

        let _held = note.fs.inode_lock().lock_interruptible(&NeverInterrupted).unwrap();
        assert_eq!(Ok(2), note.try_write_at(0, b"HI", &intr));
        assert_eq!(b"HI", &raw_data(&note)[..2]);
    }
}
