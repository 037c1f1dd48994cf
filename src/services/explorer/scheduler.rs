//! 扩展任务调度
//!
//! 与扩展逻辑解耦的任务调度器，支持两种并发策略：
//! - `Unbounded`：每个任务一个 tokio 任务，任务数随分支因子增长
//! - `Pool`：固定数量的工作者从共享队列中取任务，限制并发远程查询数
//!
//! 调度器维护一个在途任务计数：任务入队前加一，执行完毕后减一。
//! 计数归零即表示该方向的全部工作已经完成。

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::{mpsc, watch, Mutex};

use crate::core::{CancelSignal, SearchResult};

/// 默认工作者数量
pub const DEFAULT_WORKERS: usize = 10;

/// 并发策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionPolicy {
    /// 每个新节点一个任务，只适合外部已经限制了总查询量的场景
    Unbounded,
    /// 固定数量的工作者消费共享队列
    Pool { workers: usize },
}

impl Default for ExpansionPolicy {
    fn default() -> Self {
        ExpansionPolicy::Pool {
            workers: DEFAULT_WORKERS,
        }
    }
}

impl ExpansionPolicy {
    /// 同一时刻最多执行的任务数，`None` 表示不限制
    pub fn concurrency(&self) -> Option<usize> {
        match self {
            ExpansionPolicy::Unbounded => None,
            ExpansionPolicy::Pool { workers } => Some((*workers).max(1)),
        }
    }
}

type Handler<T> = Arc<dyn Fn(T, Spawner<T>) -> BoxFuture<'static, ()> + Send + Sync>;

struct Shared<T> {
    pending: AtomicUsize,
    idle: watch::Sender<bool>,
    /// `Pool` 模式下的任务队列，`Unbounded` 模式为 `None`
    queue: Option<mpsc::UnboundedSender<T>>,
    handler: Handler<T>,
    cancel: CancelSignal,
}

/// 任务句柄，供处理函数继续调度新任务
pub struct Spawner<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Spawner<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Send + 'static> Spawner<T> {
    /// 调度一个新任务
    ///
    /// 计数在任务真正开始之前增加，因此父任务结束前计数不会暂时归零
    pub fn schedule(&self, job: T) {
        self.shared.pending.fetch_add(1, Ordering::SeqCst);
        match &self.shared.queue {
            None => {
                let spawner = self.clone();
                tokio::spawn(async move { spawner.run(job).await });
            }
            Some(queue) => {
                if queue.send(job).is_err() {
                    self.finish();
                }
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    async fn run(&self, job: T) {
        let _guard = PendingGuard(self);
        if !self.shared.cancel.is_cancelled() {
            (self.shared.handler)(job, self.clone()).await;
        }
    }

    fn finish(&self) {
        if self.shared.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.shared.idle.send_replace(true);
        }
    }
}

/// 处理函数即使 panic 也要归还计数
struct PendingGuard<'a, T: Send + 'static>(&'a Spawner<T>);

impl<T: Send + 'static> Drop for PendingGuard<'_, T> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// 任务调度器
pub struct TaskScheduler {
    policy: ExpansionPolicy,
    cancel: CancelSignal,
}

impl TaskScheduler {
    pub fn new(policy: ExpansionPolicy, cancel: CancelSignal) -> Self {
        Self { policy, cancel }
    }

    /// 从初始任务开始运行，直到所有任务完成或收到取消信号
    ///
    /// `Unbounded` 模式下取消后仍会等待已派生的任务退出；
    /// `Pool` 模式下等待所有工作者退出，队列中剩余的任务被丢弃。
    pub async fn run<T, F, Fut>(self, initial: T, handler: F) -> SearchResult<()>
    where
        T: Send + 'static,
        F: Fn(T, Spawner<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (idle_tx, idle_rx) = watch::channel(false);
        let handler: Handler<T> = Arc::new(move |job, spawner| Box::pin(handler(job, spawner)));

        let (queue, receiver) = match self.policy {
            ExpansionPolicy::Unbounded => (None, None),
            ExpansionPolicy::Pool { .. } => {
                let (tx, rx) = mpsc::unbounded_channel();
                (Some(tx), Some(rx))
            }
        };

        let spawner = Spawner {
            shared: Arc::new(Shared {
                pending: AtomicUsize::new(0),
                idle: idle_tx,
                queue,
                handler,
                cancel: self.cancel.clone(),
            }),
        };

        // 初始任务必须在工作者启动之前计数
        spawner.schedule(initial);

        match receiver {
            None => {
                let mut idle_rx = idle_rx;
                let _ = idle_rx.wait_for(|idle| *idle).await;
            }
            Some(receiver) => {
                let receiver = Arc::new(Mutex::new(receiver));
                let workers = self.policy.concurrency().unwrap_or(DEFAULT_WORKERS);
                let handles: Vec<_> = (0..workers)
                    .map(|_| {
                        tokio::spawn(worker_loop(
                            spawner.clone(),
                            receiver.clone(),
                            idle_rx.clone(),
                        ))
                    })
                    .collect();

                for handle in handles {
                    handle.await?;
                }
            }
        }

        Ok(())
    }
}

async fn worker_loop<T: Send + 'static>(
    spawner: Spawner<T>,
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<T>>>,
    mut idle: watch::Receiver<bool>,
) {
    let cancel = spawner.shared.cancel.clone();
    loop {
        let job = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = idle.wait_for(|idle| *idle) => break,
            job = next_job(&receiver) => job,
        };

        match job {
            Some(job) => spawner.run(job).await,
            None => break,
        }
    }
}

async fn next_job<T>(receiver: &Mutex<mpsc::UnboundedReceiver<T>>) -> Option<T> {
    receiver.lock().await.recv().await
}
