//! Avatar Animation
//!
//! 两个独立的周期任务：
//! - 眨眼：睁眼保持随机 2~5 秒，闭眼固定 200ms
//! - 口型：仅在音频播放期间按 闭 → 张 → 半张 循环，间隔随机 50~200ms；
//!   播放停止时立即回到闭口
//!
//! 帧通过 watch 通道发布，Avatar 被 drop 时任务全部取消

use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 眼睛帧
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EyeFrame {
    Open,
    Closed,
}

impl EyeFrame {
    pub fn next(self) -> Self {
        match self {
            EyeFrame::Open => EyeFrame::Closed,
            EyeFrame::Closed => EyeFrame::Open,
        }
    }
}

/// 嘴部帧
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouthFrame {
    Closed,
    Open,
    HalfOpen,
}

impl MouthFrame {
    pub fn next(self) -> Self {
        match self {
            MouthFrame::Closed => MouthFrame::Open,
            MouthFrame::Open => MouthFrame::HalfOpen,
            MouthFrame::HalfOpen => MouthFrame::Closed,
        }
    }

    /// 帧序号，对应素材 mouth_0/1/2
    pub fn index(self) -> usize {
        match self {
            MouthFrame::Closed => 0,
            MouthFrame::Open => 1,
            MouthFrame::HalfOpen => 2,
        }
    }
}

/// 闭区间 [min, max] 内的随机间隔
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalBounds {
    pub min: Duration,
    pub max: Duration,
}

impl IntervalBounds {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub fn fixed(duration: Duration) -> Self {
        Self::new(duration, duration)
    }

    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

/// 动画时间参数
#[derive(Debug, Clone, Copy)]
pub struct AvatarTimings {
    pub blink: IntervalBounds,
    pub eyes_open: IntervalBounds,
    pub mouth: IntervalBounds,
}

impl Default for AvatarTimings {
    fn default() -> Self {
        Self {
            blink: IntervalBounds::fixed(Duration::from_millis(200)),
            eyes_open: IntervalBounds::new(Duration::from_millis(2000), Duration::from_millis(5000)),
            mouth: IntervalBounds::new(Duration::from_millis(50), Duration::from_millis(200)),
        }
    }
}

/// 运行中的头像动画
pub struct Avatar {
    eyes: watch::Receiver<EyeFrame>,
    mouth: watch::Receiver<MouthFrame>,
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl Avatar {
    /// 启动眨眼与口型任务；playing 为音频播放标志
    pub fn spawn(timings: AvatarTimings, playing: watch::Receiver<bool>) -> Self {
        let token = CancellationToken::new();
        let (eyes_tx, eyes) = watch::channel(EyeFrame::Open);
        let (mouth_tx, mouth) = watch::channel(MouthFrame::Closed);

        let blink = tokio::spawn({
            let token = token.clone();
            async move {
                run_cycle(
                    &eyes_tx,
                    &token,
                    |frame| match frame {
                        EyeFrame::Open => timings.eyes_open,
                        EyeFrame::Closed => timings.blink,
                    },
                    EyeFrame::next,
                )
                .await;
            }
        });

        let talk = tokio::spawn(run_mouth(mouth_tx, token.clone(), timings.mouth, playing));

        Self {
            eyes,
            mouth,
            token,
            tasks: vec![blink, talk],
        }
    }

    pub fn eyes(&self) -> watch::Receiver<EyeFrame> {
        self.eyes.clone()
    }

    pub fn mouth(&self) -> watch::Receiver<MouthFrame> {
        self.mouth.clone()
    }

    /// 取消任务并等待退出
    pub async fn shutdown(mut self) {
        self.token.cancel();
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Avatar task panicked");
            }
        }
    }
}

impl Drop for Avatar {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// 周期任务：按当前帧决定停留时长，到期后切换到下一帧，直到被取消
async fn run_cycle<F, H, N>(tx: &watch::Sender<F>, token: &CancellationToken, hold: H, next: N)
where
    F: Copy,
    H: Fn(F) -> IntervalBounds,
    N: Fn(F) -> F,
{
    loop {
        let current = *tx.borrow();
        let wait = hold(current).sample();
        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(wait) => {}
        }
        tx.send_replace(next(current));
    }
}

/// 口型任务：playing 变化时拆掉内层周期任务并重新判断
async fn run_mouth(
    tx: watch::Sender<MouthFrame>,
    token: CancellationToken,
    bounds: IntervalBounds,
    mut playing: watch::Receiver<bool>,
) {
    loop {
        let is_playing = *playing.borrow_and_update();

        if !is_playing {
            tx.send_if_modified(|frame| {
                let changed = *frame != MouthFrame::Closed;
                *frame = MouthFrame::Closed;
                changed
            });
            tokio::select! {
                _ = token.cancelled() => break,
                changed = playing.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
            continue;
        }

        tokio::select! {
            _ = token.cancelled() => break,
            _ = run_cycle(&tx, &token, |_| bounds, MouthFrame::next) => break,
            changed = playing.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    tx.send_replace(MouthFrame::Closed);
}
