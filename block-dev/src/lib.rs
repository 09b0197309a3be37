//! # 块设备接口层
//!
//! 块设备是以**块**为单位存储数据的设备，例如磁盘、U盘、镜像文件等；
//! [`BlockDevice`] 就是对读写块设备的抽象，实现了此特质的类型称为**块设备驱动**。
//!
//! 块大小由文件系统决定，驱动只负责按块号搬运整块数据。

#![no_std]

use core::any::Any;

use derive_more::Display;

/// 块设备驱动特质
///
/// 读写都可能阻塞调用者，直到设备完成传输。
pub trait BlockDevice: Send + Sync + Any {
    /// 读出`block_id`号块，`buf`的长度即块大小
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), Error>;

    /// 把`buf`写入`block_id`号块，`buf`的长度即块大小
    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), Error>;

    /// 设备容纳的块数，块大小为`block_size`
    fn block_count(&self, block_size: usize) -> usize;

    /// 把设备自身缓冲的数据落盘
    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Error {
    /// 块号超出设备容量
    #[display(fmt = "block {} is out of range", block_id)]
    OutOfRange { block_id: usize },
    /// 读到的字节数不足一块
    #[display(fmt = "short read on block {}: only {} bytes", block_id, len)]
    ShortRead { block_id: usize, len: usize },
    /// 写入的字节数不足一块
    #[display(fmt = "short write on block {}: only {} bytes", block_id, len)]
    ShortWrite { block_id: usize, len: usize },
    /// 底层设备报错
    #[display(fmt = "device error on block {}", block_id)]
    Io { block_id: usize },
}

impl core::error::Error for Error {}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::ToString;

    use super::Error;

    #[test]
    fn display() {
        assert_eq!(
            "short write on block 3: only 512 bytes",
            Error::ShortWrite {
                block_id: 3,
                len: 512
            }
            .to_string()
        );
        assert_eq!("block 9 is out of range", Error::OutOfRange { block_id: 9 }.to_string());
    }
}
