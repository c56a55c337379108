//! # 上传会话
//!
//! ## 设计思路
//!
//! 同一编辑会话内只认最新一次上传：每次 `begin` 递增令牌，
//! `finish` 时令牌不是最新的结果直接丢弃，避免旧请求覆盖新图片。
//!
//! ## 实现思路
//!
//! - 令牌使用 `AtomicU64`，状态使用 `Mutex<UploadState>`。
//! - `Uploading` 期间 `is_busy()` 为真，调用方据此禁用上传入口。

use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Uploading,
    Ready(String),
    Failed(String),
}

/// 一次上传请求的凭据。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket(u64);

impl UploadTicket {
    pub fn token(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub struct UploadSession {
    latest: AtomicU64,
    state: Mutex<UploadState>,
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadSession {
    pub fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
            state: Mutex::new(UploadState::Idle),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, UploadState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// 开始一次新上传，之前未完成的请求随之作废。
    pub fn begin(&self) -> UploadTicket {
        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        *self.lock_state() = UploadState::Uploading;
        log::debug!("🎫 上传令牌 #{}", token);
        UploadTicket(token)
    }

    pub fn is_current(&self, ticket: UploadTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// 写回上传结果；令牌已过期时丢弃并返回 `false`。
    pub fn finish<E: Display>(&self, ticket: UploadTicket, result: &Result<String, E>) -> bool {
        let mut state = self.lock_state();
        if !self.is_current(ticket) {
            log::info!("⏭️ 丢弃过期上传结果（令牌 #{}）", ticket.0);
            return false;
        }

        *state = match result {
            Ok(url) => UploadState::Ready(url.clone()),
            Err(err) => UploadState::Failed(err.to_string()),
        };
        true
    }

    pub fn state(&self) -> UploadState {
        self.lock_state().clone()
    }

    pub fn is_busy(&self) -> bool {
        matches!(*self.lock_state(), UploadState::Uploading)
    }

    /// 最近一次成功上传的地址。
    pub fn ready_url(&self) -> Option<String> {
        match &*self.lock_state() {
            UploadState::Ready(url) => Some(url.clone()),
            _ => None,
        }
    }
}
