use derive_more::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Error {
    /// 超级块的魔数不符，设备不是 onefilefs
    #[display(fmt = "bad magic {:#x}, not a onefilefs device", _0)]
    BadMagic(u64),

    /// 超级块记录的块大小不符
    #[display(fmt = "unsupported block size {}", _0)]
    BadBlockSize(u64),

    #[display(fmt = "inode {} not found in the inode table", _0)]
    InodeNotFound(u64),

    #[display(fmt = "inode {} is not a directory", _0)]
    NotADirectory(u64),

    #[display(fmt = "inode {} is a directory", _0)]
    IsADirectory(u64),

    /// 类型位既不是目录也不是普通文件
    #[display(fmt = "inode {} has unknown type bits in mode {:#o}", inode, mode)]
    UnknownKind { inode: u64, mode: u32 },

    /// 磁盘上的数据违背了布局约束
    #[display(fmt = "corrupted filesystem: {}", _0)]
    Corrupted(&'static str),

    /// 写入起点已在数据块之外
    #[display(fmt = "write of {} bytes at {} exceeds the data block", len, offset)]
    CapacityExceeded { offset: usize, len: usize },

    /// 写入起点越过了文件末尾，不允许稀疏文件
    #[display(fmt = "write at {} is past the end of a {} byte file", offset, size)]
    OffsetBeyondContent { offset: usize, size: u64 },

    /// 数据无法在设备和内存之间搬运
    #[display(fmt = "transfer fault: {}", _0)]
    TransferFault(block_dev::Error),

    /// 等锁期间被打断，什么也没有改变
    #[display(fmt = "interrupted while waiting for a lock")]
    Interrupted,

    /* 以下仅在格式化时出现 */
    #[display(fmt = "invalid file name {:?}", _0)]
    InvalidName(NameBuf),

    #[display(fmt = "duplicate file name {:?}", _0)]
    DuplicateName(NameBuf),

    #[display(fmt = "{} entries do not fit into one block", _0)]
    TooManyEntries(usize),

    #[display(fmt = "device holds {} blocks, layout needs {}", available, required)]
    DeviceTooSmall { required: usize, available: usize },
}

pub type Result<T> = core::result::Result<T, Error>;

impl core::error::Error for Error {}

impl From<block_dev::Error> for Error {
    #[inline]
    fn from(err: block_dev::Error) -> Self {
        Self::TransferFault(err)
    }
}

impl Error {
    /// 挂载时发现设备不是本文件系统的格式
    #[inline]
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, Self::BadMagic(_) | Self::BadBlockSize(_))
    }

    /// 按宿主约定只报告“写入0字节”的拒绝
    #[inline]
    pub fn is_write_rejection(&self) -> bool {
        matches!(
            self,
            Self::CapacityExceeded { .. } | Self::OffsetBeyondContent { .. } | Self::Interrupted
        )
    }
}

/// 错误里携带的文件名，截断到固定长度以保持 [`Error`] 为 `Copy`
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct NameBuf {
    bytes: [u8; Self::CAP],
    len: usize,
}

impl NameBuf {
    const CAP: usize = 32;

    pub fn new(name: &[u8]) -> Self {
        let len = name.len().min(Self::CAP);
        let mut bytes = [0; Self::CAP];
        bytes[..len].copy_from_slice(&name[..len]);
        Self { bytes, len }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl core::fmt::Debug for NameBuf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "\"{}\"", self.as_bytes().escape_ascii())
    }
}
