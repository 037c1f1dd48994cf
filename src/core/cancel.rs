//! 搜索取消信号
//!
//! 一次搜索共享一个信号，广播给两个方向上的所有任务。
//! 信号只会触发一次，触发后所有等待者立即被唤醒。

use std::sync::Arc;

use log::debug;
use tokio::sync::watch;

/// 可克隆的广播取消信号
#[derive(Debug, Clone)]
pub struct CancelSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// 触发取消，返回 `true` 表示本次调用是第一次触发
    pub fn cancel(&self) -> bool {
        !self.sender.send_replace(true)
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// 等待取消信号
    ///
    /// 已经触发时立即返回
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // 发送端由 self 持有，wait_for 不会因为通道关闭而失败
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }

    /// 返回一个守卫，守卫被丢弃时触发取消
    ///
    /// 持有守卫的 future 被提前丢弃（外层超时、连接断开）时，
    /// 它启动的任务仍能收到取消信号。
    pub fn drop_guard(&self) -> CancelOnDrop {
        CancelOnDrop(self.clone())
    }
}

/// 丢弃时触发取消
#[derive(Debug)]
pub struct CancelOnDrop(CancelSignal);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if self.0.cancel() {
            debug!("守卫被丢弃，取消搜索");
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}
