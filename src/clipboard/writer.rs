//! # 剪贴板写入
//!
//! ## 设计思路
//!
//! 与操作系统剪贴板交互的部分独立成 `RichTextSink`，便于隔离平台不稳定因素，
//! 测试中可替换为记录型或失败型实现。
//!
//! ## 实现思路
//!
//! 剪贴板被其他程序短暂占用时（Busy / Transient）进行有限重试：
//! 指数退避 + 抖动，并受总时间预算约束；Fatal 错误立即终止。

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::error::ClipboardError;

/// 写入失败的分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Busy,
    Transient,
    Fatal,
}

/// 单次写入失败。
#[derive(Debug, Clone)]
pub struct WriteFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl WriteFailure {
    pub fn busy(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Busy,
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Transient,
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Fatal,
            message: message.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, FailureKind::Busy | FailureKind::Transient)
    }
}

/// 接收富文本（HTML + 纯文本备选）的剪贴板。
pub trait RichTextSink {
    fn write_html(&mut self, html: &str, alt_text: &str) -> Result<(), WriteFailure>;
}

impl<S: RichTextSink + ?Sized> RichTextSink for Box<S> {
    fn write_html(&mut self, html: &str, alt_text: &str) -> Result<(), WriteFailure> {
        (**self).write_html(html, alt_text)
    }
}

/// 基于 `arboard` 的系统剪贴板。
///
/// Linux（X11 / Wayland）上剪贴板内容归写入进程所有，进程退出即失效：
/// 写入后阻塞并持有选区，直到被其他复制替换（剪贴板管理器接管也算），
/// 或超过 `hold`。
#[derive(Debug, Default, Clone, Copy)]
pub struct ArboardSink {
    hold: Option<Duration>,
}

impl ArboardSink {
    pub fn new(config: &ClipboardConfig) -> Self {
        Self {
            hold: config.hold_secs.map(Duration::from_secs),
        }
    }

    /// 持有选区的最长时间，`None` 表示一直持有到被替换。
    pub fn hold(&self) -> Option<Duration> {
        self.hold
    }

    #[cfg(target_os = "linux")]
    fn set_html(
        &self,
        clipboard: &mut arboard::Clipboard,
        html: &str,
        alt_text: &str,
    ) -> Result<(), arboard::Error> {
        use arboard::SetExtLinux;

        log::info!("📋 剪贴板内容由本进程持有，直到被其他复制替换");
        let set = match self.hold {
            Some(hold) => clipboard.set().wait_until(Instant::now() + hold),
            None => clipboard.set().wait(),
        };
        set.html(html, Some(alt_text))
    }

    #[cfg(not(target_os = "linux"))]
    fn set_html(
        &self,
        clipboard: &mut arboard::Clipboard,
        html: &str,
        alt_text: &str,
    ) -> Result<(), arboard::Error> {
        clipboard.set_html(html, Some(alt_text))
    }
}

impl RichTextSink for ArboardSink {
    fn write_html(&mut self, html: &str, alt_text: &str) -> Result<(), WriteFailure> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| WriteFailure::busy(format!("无法访问剪贴板：{}", e)))?;

        self.set_html(&mut clipboard, html, alt_text)
            .map_err(classify_arboard_error)
    }
}

fn classify_arboard_error(err: arboard::Error) -> WriteFailure {
    match err {
        arboard::Error::ClipboardOccupied => WriteFailure::busy("剪贴板被其他程序占用"),
        arboard::Error::ClipboardNotSupported => {
            WriteFailure::fatal("当前环境不支持富文本剪贴板")
        }
        other => WriteFailure::transient(format!("复制失败：{}", other)),
    }
}

/// 写入重试策略。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClipboardConfig {
    /// 最大尝试次数（至少 1）。
    pub retries: u32,
    /// 退避基准延迟（毫秒）。
    pub retry_delay_ms: u64,
    /// 单次退避上限（毫秒）。
    pub retry_max_delay_ms: u64,
    /// 全部重试的总时间预算（毫秒）。
    pub retry_max_total_ms: u64,
    /// Linux 上写入后持有选区的最长秒数；不设置则持有到被替换。
    pub hold_secs: Option<u64>,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            retries: 4,
            retry_delay_ms: 60,
            retry_max_delay_ms: 400,
            retry_max_total_ms: 1500,
            hold_secs: None,
        }
    }
}

static JITTER_STATE: AtomicU64 = AtomicU64::new(0);

fn seed_jitter_state() -> u64 {
    let time_seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let state = time_seed ^ ((std::process::id() as u64) << 32) ^ 0x9E37_79B9_7F4A_7C15;
    if state == 0 { 0xA5A5_5A5A_0123_4567 } else { state }
}

/// xorshift64，只用于退避抖动。
fn next_jitter_u64() -> u64 {
    let mut current = JITTER_STATE.load(Ordering::Relaxed);

    loop {
        let mut next = if current == 0 { seed_jitter_state() } else { current };
        next ^= next << 13;
        next ^= next >> 7;
        next ^= next << 17;

        match JITTER_STATE.compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(observed) => current = observed,
        }
    }
}

fn compute_backoff_delay_with_jitter(base_delay_ms: u64, attempt: u32, max_delay_ms: u64) -> u64 {
    let exp = base_delay_ms.saturating_mul(1_u64 << attempt.saturating_sub(1).min(8));
    let capped = exp.min(max_delay_ms.max(base_delay_ms));
    let jitter_bound = (capped / 3).max(1);
    let jitter = next_jitter_u64() % (jitter_bound + 1);
    capped.saturating_add(jitter)
}

fn would_exceed_retry_budget(elapsed_ms: u64, wait_ms: u64, budget_ms: u64) -> bool {
    elapsed_ms.saturating_add(wait_ms) > budget_ms
}

/// 写入 + 重试。阻塞当前线程。
pub fn write_with_retry<S: RichTextSink + ?Sized>(
    sink: &mut S,
    html: &str,
    alt_text: &str,
    config: &ClipboardConfig,
) -> Result<(), ClipboardError> {
    let retry_count = config.retries.max(1);
    let started = Instant::now();
    let mut last_failure: Option<WriteFailure> = None;

    for attempt in 1..=retry_count {
        if attempt > 1 {
            let elapsed_ms = started.elapsed().as_millis() as u64;
            if elapsed_ms >= config.retry_max_total_ms {
                log::warn!(
                    "⏱️ 剪贴板写入重试预算耗尽（{}ms >= {}ms）",
                    elapsed_ms,
                    config.retry_max_total_ms
                );
                break;
            }

            let wait_ms = compute_backoff_delay_with_jitter(
                config.retry_delay_ms.max(1),
                attempt - 1,
                config.retry_max_delay_ms,
            );

            if would_exceed_retry_budget(elapsed_ms, wait_ms, config.retry_max_total_ms) {
                log::warn!(
                    "⏱️ 跳过第 {} 次重试：等待 {}ms 会超过预算 {}ms",
                    attempt,
                    wait_ms,
                    config.retry_max_total_ms
                );
                break;
            }

            log::debug!("🔄 重试 {}/{}，等待 {}ms（指数退避+抖动）", attempt, retry_count, wait_ms);
            std::thread::sleep(Duration::from_millis(wait_ms));
        }

        match sink.write_html(html, alt_text) {
            Ok(()) => {
                log::info!("✅ 签名已复制到剪贴板 (尝试 {})", attempt);
                return Ok(());
            }
            Err(failure) => {
                let retryable = failure.is_retryable();
                log::warn!(
                    "❌ 尝试 {} 失败: {}（kind={:?}, retryable={}）",
                    attempt,
                    failure.message,
                    failure.kind,
                    retryable
                );
                last_failure = Some(failure);

                if !retryable {
                    log::warn!("🛑 非可重试错误，提前终止重试");
                    break;
                }
            }
        }
    }

    match last_failure {
        Some(WriteFailure {
            kind: FailureKind::Busy,
            message,
        }) => Err(ClipboardError::Busy(message)),
        Some(failure) => Err(ClipboardError::Denied(failure.message)),
        None => Err(ClipboardError::Denied("未知错误".to_string())),
    }
}
