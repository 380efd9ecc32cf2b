// src/utils.rs
//
// 帧格式：4 字节大端长度 + JSON 数据

use anyhow::{bail, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// 将消息序列化为 JSON 并写入一帧
pub async fn write_packet<W, T>(writer: &mut W, msg: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let json = serde_json::to_vec(msg)?;
    if json.len() > MAX_FRAME_LEN {
        bail!("数据包过大: {} 字节", json.len());
    }
    debug!(len = json.len(), "发送数据包");

    let length = json.len() as u32;
    writer.write_all(&length.to_be_bytes()).await?;
    writer.write_all(&json).await?;
    writer.flush().await?; // 确保刷新缓冲区

    Ok(())
}

/// 读取一帧原始数据。对端在帧边界处正常关闭时返回 `None`。
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    // 读取数据长度（4 字节大端），只有一个字节都没读到时才算正常关闭
    let mut length_buf = [0u8; 4];
    let mut filled = 0;
    while filled < length_buf.len() {
        let n = reader.read(&mut length_buf[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            bail!("连接在长度头中途断开: 已读取 {filled} 字节");
        }
        filled += n;
    }
    let length = u32::from_be_bytes(length_buf) as usize;
    if length > MAX_FRAME_LEN {
        bail!("数据包过大: {length} 字节");
    }

    let mut json_buf = vec![0u8; length];
    reader.read_exact(&mut json_buf).await?;
    debug!(len = length, "接收数据包");

    Ok(Some(json_buf))
}

/// 读取一帧并反序列化
pub async fn read_packet<R, T>(reader: &mut R) -> Result<Option<T>>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    match read_frame(reader).await? {
        Some(buf) => Ok(Some(serde_json::from_slice(&buf)?)),
        None => Ok(None),
    }
}
