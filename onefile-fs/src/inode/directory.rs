use alloc::sync::Arc;
use alloc::vec::Vec;

use vfs::{DirContext, DirEntry, DirEntryType, Listing, Stat};

use super::{entry_type, Inode};
use crate::layout::{DirRecord, DiskInode, InodeBody};
use crate::{Error, OneFileSystem, Result};
use crate::{BLOCK_SIZE, RECORDS_PER_BLOCK};

/// 目录句柄
#[derive(Clone)]
pub struct Directory {
    fs: Arc<OneFileSystem>,
    inode_no: u64,
    /// `..`指向的索引节点
    parent: u64,
    perm: u32,
    data_block: usize,
    children: usize,
}

impl Directory {
    pub(crate) fn new(fs: Arc<OneFileSystem>, disk: &DiskInode, parent: u64) -> Result<Self> {
        let Some(InodeBody::Directory { children }) = disk.body() else {
            return Err(Error::NotADirectory(disk.inode_no));
        };
        if children > RECORDS_PER_BLOCK as u64 {
            log::error!("directory {} claims {children} children", disk.inode_no);
            return Err(Error::Corrupted("directory records exceed one block"));
        }

        Ok(Self {
            fs,
            inode_no: disk.inode_no,
            parent,
            perm: disk.perm(),
            data_block: disk.data_block_number as usize,
            children: children as usize,
        })
    }

    #[inline]
    pub fn inode_no(&self) -> u64 {
        self.inode_no
    }

    #[inline]
    pub fn data_block(&self) -> usize {
        self.data_block
    }

    #[inline]
    pub fn children_count(&self) -> usize {
        self.children
    }

    /// 在数据块的前`children`条记录中逐字节比较文件名。
    ///
    /// 找不到时返回`Ok(None)`，宿主应视之为不存在而非出错。
    pub fn lookup(&self, name: &[u8]) -> Result<Option<Inode>> {
        let inode_no = self
            .fs
            .cache()
            .get(self.data_block)?
            .lock()
            .map_slice(self.children, |records: &[DirRecord]| {
                records
                    .iter()
                    .find(|record| record.name() == name)
                    .map(DirRecord::inode_no)
            });

        log::debug!(
            "lookup \"{}\" in directory {}: {inode_no:?}",
            name.escape_ascii(),
            self.inode_no
        );

        let Some(inode_no) = inode_no else {
            return Ok(None);
        };
        let disk = self.fs.resolve(inode_no)?;
        Inode::from_disk(self.fs.clone(), &disk, self.inode_no).map(Some)
    }

    /// 从`ctx`记录的位置开始汇报目录项。
    ///
    /// 位置0和1留给`.`和`..`，位置`2..children+2`依次对应磁盘上的记录；
    /// 位置越过末尾时什么也不汇报，表示读完。
    /// 宿主拒收某项时停下，位置停在该项上，下次从这里继续。
    pub fn enumerate(&self, ctx: &mut dyn DirContext) -> Result<()> {
        let end = 2 + self.children as u64;
        log::debug!(
            "readdir of directory {} at pos {}, {} children",
            self.inode_no,
            ctx.pos(),
            self.children
        );

        if ctx.pos() >= end {
            return Ok(());
        }

        if ctx.pos() == 0 {
            if !ctx.emit(b".", self.inode_no, DirEntryType::Directory) {
                return Ok(());
            }
            ctx.set_pos(1);
        }
        if ctx.pos() == 1 {
            if !ctx.emit(b"..", self.parent, DirEntryType::Directory) {
                return Ok(());
            }
            ctx.set_pos(2);
        }

        let start = (ctx.pos() - 2) as usize;
        let records: Vec<DirRecord> = self
            .fs
            .cache()
            .get(self.data_block)?
            .lock()
            .map_slice(self.children, |records: &[DirRecord]| records[start..].to_vec());

        for record in &records {
            let ty = entry_type(
                self.fs
                    .find_inode(record.inode_no())?
                    .and_then(|inode| inode.kind()),
            );
            if !ctx.emit(record.name(), record.inode_no(), ty) {
                break;
            }
            ctx.set_pos(ctx.pos() + 1);
        }

        Ok(())
    }

    /// 读取`at`之后的目录项，最多为`count`个
    pub fn ls_at(&self, at: u64, count: usize) -> Result<Vec<DirEntry>> {
        let mut listing = Listing::new(at, count);
        self.enumerate(&mut listing)?;
        Ok(listing.into_entries())
    }

    pub fn stat(&self) -> Stat {
        Stat {
            inode: self.inode_no,
            mode: DirEntryType::Directory,
            perm: self.perm,
            block_size: BLOCK_SIZE as u64,
            blocks: 1,
            size: self.children as u64,
        }
    }
}
