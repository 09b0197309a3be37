//! # 文件系统层
//!
//! 挂载时校验超级块并解析根目录；之后按需在索引节点表中解析索引节点。
//! 索引节点表是唯一的权威存储，这里返回的索引节点都是一次性的拷贝，
//! 用完即弃，不做缓存。

use alloc::sync::Arc;

use block_dev::BlockDevice;

use crate::block_cache::BlockCacheManager;
use crate::layout::{DiskInode, InodeBody, SuperBlock};
use crate::sync::{Interrupt, InterruptibleMutex};
use crate::{Directory, Error, Result};
use crate::{INODES_PER_BLOCK, INODE_TABLE_BLOCK_ID, ROOT_INODE_NO, SUPER_BLOCK_ID};

pub struct OneFileSystem {
    cache: BlockCacheManager,
    version: u64,
    inodes_count: usize,
    /// 挂载时解析出的根目录
    root: DiskInode,
    /// 串行化所有数据块写入
    data_lock: InterruptibleMutex<()>,
    /// 串行化索引节点表中文件大小的更新
    inode_lock: InterruptibleMutex<()>,
}

impl OneFileSystem {
    pub fn mount(block_device: Arc<dyn BlockDevice>) -> Result<Arc<Self>> {
        let cache = BlockCacheManager::new(block_device);

        let (version, inodes_count) =
            cache
                .get(SUPER_BLOCK_ID)?
                .lock()
                .map(0, |super_block: &SuperBlock| {
                    log::debug!("super block on disk: {super_block:?}");
                    super_block
                        .validate()
                        .map(|()| (super_block.version, super_block.inodes_count))
                })
                .inspect_err(|err| log::error!("refusing to mount: {err}"))?;

        if inodes_count > INODES_PER_BLOCK as u64 {
            log::error!("{inodes_count} inodes cannot fit into the inode table");
            return Err(Error::Corrupted("inode count exceeds the inode table"));
        }

        let mut fs = Self {
            cache,
            version,
            inodes_count: inodes_count as usize,
            root: DiskInode::default(),
            data_lock: InterruptibleMutex::new(()),
            inode_lock: InterruptibleMutex::new(()),
        };

        let root = fs.resolve(ROOT_INODE_NO)?;
        if !root.is_dir() {
            log::error!("root inode has mode {:#o}", root.mode);
            return Err(Error::NotADirectory(ROOT_INODE_NO));
        }
        fs.root = root;

        log::info!(
            "onefilefs of version {version} with {inodes_count} inodes, block size {} detected",
            crate::BLOCK_SIZE
        );
        Ok(Arc::new(fs))
    }

    /// 根目录的句柄，其父目录是自己
    pub fn root(self: &Arc<Self>) -> Result<Directory> {
        Directory::new(self.clone(), &self.root, ROOT_INODE_NO)
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn inodes_count(&self) -> usize {
        self.inodes_count
    }

    /// 读出索引节点表，扫描前`inodes_count`项，返回第一个匹配项的拷贝
    pub fn find_inode(&self, inode_no: u64) -> Result<Option<DiskInode>> {
        let inode = self
            .cache
            .get(INODE_TABLE_BLOCK_ID)?
            .lock()
            .map_slice(self.inodes_count, |table: &[DiskInode]| {
                DiskInode::find(table, inode_no)
            });
        Ok(inode)
    }

    /// 同 [`Self::find_inode`]，但找不到时报错
    pub fn resolve(&self, inode_no: u64) -> Result<DiskInode> {
        self.find_inode(inode_no)?.ok_or_else(|| {
            log::error!("dangling reference to inode {inode_no}");
            Error::InodeNotFound(inode_no)
        })
    }

    /// 写回全部脏块
    pub fn sync(&self) -> Result<()> {
        self.cache.sync_all().map_err(Error::from)
    }

    /// 卸载没有需要持久化的状态，除了写回脏块；总是成功
    pub fn unmount(self: Arc<Self>) {
        if let Err(err) = self.sync() {
            log::error!("failed to flush dirty blocks on unmount: {err}");
        }
        log::info!("onefilefs unmounted");
    }
}

impl OneFileSystem {
    #[inline]
    pub(crate) fn cache(&self) -> &BlockCacheManager {
        &self.cache
    }

    #[inline]
    pub(crate) fn data_lock(&self) -> &InterruptibleMutex<()> {
        &self.data_lock
    }

    #[cfg(test)]
    pub(crate) fn inode_lock(&self) -> &InterruptibleMutex<()> {
        &self.inode_lock
    }

    /// 写入之后的第二阶段：在索引节点锁下重新读出索引节点表，就地增大文件大小。
    ///
    /// 只增不减，并发写者以任意顺序提交都不会把文件改小。
    pub(crate) fn commit_file_size(
        &self,
        inode_no: u64,
        new_size: u64,
        intr: &dyn Interrupt,
    ) -> Result<()> {
        let _guard = self
            .inode_lock
            .lock_interruptible(intr)
            .inspect_err(|_| log::warn!("size update of inode {inode_no} interrupted"))?;

        let cache = self.cache.get(INODE_TABLE_BLOCK_ID)?;
        let mut cache = cache.lock();
        let inodes_count = self.inodes_count;

        cache.map_mut_slice(inodes_count, |table: &mut [DiskInode]| {
            let inode =
                DiskInode::find_mut(table, inode_no).ok_or(Error::InodeNotFound(inode_no))?;
            match inode.body() {
                Some(InodeBody::File { size }) if new_size > size => {
                    log::debug!("inode {inode_no}: size {size} -> {new_size}");
                    inode.set_file_size(new_size);
                    Ok(())
                }
                Some(InodeBody::File { .. }) => Ok(()),
                Some(InodeBody::Directory { .. }) => Err(Error::IsADirectory(inode_no)),
                None => Err(Error::UnknownKind {
                    inode: inode_no,
                    mode: inode.mode,
                }),
            }
        })
    }
}
