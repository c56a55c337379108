//! # 邮件签名生成器：库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  CLI (clap) / 调用方                      │
//! │   ProfileDraft ── 头像文件 ── AppSettings (JSON + env)   │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ Result<T, AppError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            service::SignatureService             │
//! │                                                          │
//! │  ┌─ image_handler  解码·400 宽缩放·白底·JPEG 85          │
//! │  │                                                       │
//! │  ├─ upload ─────── multipart 上传 + 最新令牌会话          │
//! │  │                                                       │
//! │  ├─ signature ──── 资料校验 → 行内样式文档树 → HTML       │
//! │  │                                                       │
//! │  ├─ clipboard ──── 离屏暂存 + StagingGuard (RAII)        │
//! │  │                 → arboard 富文本写入（退避重试）       │
//! │  │                                                       │
//! │  ├─ storage         复制失败时的预览文件                  │
//! │  ├─ settings        设置文件 + 环境变量覆盖               │
//! │  └─ error           AppError (统一错误类型)               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，附稳定错误码与阶段 |
//! | [`image_handler`] | 将任意图片规范化为固定宽度、无透明通道的 JPEG |
//! | [`signature`] | 资料模型、转义、只含行内样式的签名文档构建 |
//! | [`clipboard`] | 离屏暂存、选区管理与富文本剪贴板写入 |
//! | [`upload`] | 上传到远端素材库并换取公开地址 |
//! | [`service`] | 编排一次编辑会话的完整流程 |
//! | [`settings`] | 应用设置的读取与环境变量覆盖 |
//! | [`storage`] | 预览目录的获取与自动创建 |

pub mod error;
pub mod clipboard;
pub mod image_handler;
pub mod service;
pub mod settings;
pub mod signature;
pub mod storage;
pub mod upload;
