//! # 邮件签名生成器：命令行入口
//!
//! 本文件只负责参数解析、日志初始化与结果输出。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use email_signature::error::AppError;
use email_signature::image_handler::{ImageDelivery, ImageSource};
use email_signature::service::{CopyOutcome, SignatureService};
use email_signature::settings::AppSettings;
use email_signature::signature::{BrandColor, ProfileDraft};

#[derive(Parser, Debug)]
#[command(
    name = "email-signature",
    version,
    about = "Generate a mail-client-safe HTML signature and copy it as rich text"
)]
struct Cli {
    #[arg(long, global = true, help = "Settings JSON file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the signature and copy it to the clipboard.
    Generate {
        #[command(flatten)]
        profile: ProfileArgs,
        #[arg(long, help = "Profile image file")]
        image: Option<PathBuf>,
        #[arg(long, help = "Use an already hosted image instead of --image")]
        image_url: Option<String>,
        #[arg(long, value_enum, help = "Override how the image is delivered")]
        delivery: Option<DeliveryArg>,
        #[arg(long, help = "Also write the HTML fragment to this file")]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = false, help = "Skip the clipboard copy")]
        no_copy: bool,
    },
    /// Normalize an image to the fixed-width JPEG used in signatures.
    Normalize {
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
struct ProfileArgs {
    #[arg(long, help = "Profile JSON file; flags override its fields")]
    profile: Option<PathBuf>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long, help = "Social profile, e.g. fb.com/yourpage")]
    social: Option<String>,
    #[arg(long, value_parser = parse_brand_color, help = "Blue, Green, Brown or their hex value")]
    color: Option<BrandColor>,
    #[arg(long)]
    disclaimer: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DeliveryArg {
    Embed,
    Upload,
}

impl From<DeliveryArg> for ImageDelivery {
    fn from(arg: DeliveryArg) -> Self {
        match arg {
            DeliveryArg::Embed => ImageDelivery::Embed,
            DeliveryArg::Upload => ImageDelivery::Upload,
        }
    }
}

fn parse_brand_color(value: &str) -> Result<BrandColor, String> {
    BrandColor::try_from(value.to_string())
}

#[derive(Serialize)]
struct GenerateReport {
    delivery: &'static str,
    image_fallback: bool,
    copied: bool,
    preview: Option<String>,
    output: Option<String>,
    html: String,
}

#[derive(Serialize)]
struct NormalizeReport {
    width: u32,
    height: u32,
    bytes: usize,
    output: String,
}

#[derive(Serialize)]
struct ErrorReport<'a> {
    code: &'static str,
    stage: &'static str,
    message: &'a str,
}

impl ProfileArgs {
    fn into_draft(self) -> Result<ProfileDraft, AppError> {
        let mut draft = match &self.profile {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    AppError::Config(format!("读取资料文件 '{}' 失败: {}", path.display(), e))
                })?;
                serde_json::from_str::<ProfileDraft>(&content)
                    .map_err(|e| AppError::Config(format!("解析资料文件失败: {}", e)))?
            }
            None => ProfileDraft::default(),
        };

        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(location) = self.location {
            draft.location = location;
        }
        if let Some(email) = self.email {
            draft.email = email;
        }
        if let Some(phone) = self.phone {
            draft.phone = phone;
        }
        if let Some(social) = self.social {
            draft.social = social;
        }
        if let Some(color) = self.color {
            draft.brand_color = color;
        }
        if let Some(disclaimer) = self.disclaimer {
            draft.disclaimer = disclaimer;
        }
        Ok(draft)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let json = cli.json;

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("❌ [{}/{}] {}", err.code(), err.stage(), err);
            if json {
                let message = err.to_string();
                let report = ErrorReport {
                    code: err.code(),
                    stage: err.stage(),
                    message: &message,
                };
                if let Ok(text) = serde_json::to_string(&report) {
                    println!("{}", text);
                }
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let mut settings = AppSettings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            profile,
            image,
            image_url,
            delivery,
            output,
            no_copy,
        } => {
            if let Some(delivery) = delivery {
                settings.delivery = delivery.into();
            }
            let draft = profile.into_draft()?;
            generate(settings, draft, image, image_url, output, no_copy, cli.json).await
        }
        Commands::Normalize { input, output } => normalize(settings, &input, &output, cli.json),
    }
}

async fn generate(
    settings: AppSettings,
    draft: ProfileDraft,
    image: Option<PathBuf>,
    image_url: Option<String>,
    output: Option<PathBuf>,
    no_copy: bool,
    json: bool,
) -> Result<(), AppError> {
    let missing = draft.missing_fields();
    if !missing.is_empty() {
        return Err(AppError::IncompleteProfile(missing));
    }

    let mut service = SignatureService::new(settings)?;

    let image_fallback = match (image, image_url) {
        (Some(path), _) => {
            let source = ImageSource::FilePath(path.to_string_lossy().to_string());
            service.prepare_image(source).await?.is_fallback()
        }
        (None, Some(url)) => {
            service.use_remote_image(&url);
            false
        }
        (None, None) => {
            return Err(AppError::ImageNotReady(
                "请通过 --image 或 --image-url 指定头像".to_string(),
            ));
        }
    };

    let document = service.generate(&draft)?;
    let html = document.to_html();

    if let Some(path) = &output {
        fs::write(path, &html)?;
        log::info!("📝 HTML 已写入：{}", path.display());
    }

    let (copied, preview) = if no_copy {
        (false, None)
    } else {
        if cfg!(target_os = "linux") {
            eprintln!(
                "Holding the signature on the clipboard until a clipboard manager takes it over or something else is copied (Ctrl+C to stop)."
            );
        }
        match service.copy_or_preview(&document)? {
            CopyOutcome::Copied => (true, None),
            CopyOutcome::Preview { path, hint } => {
                eprintln!("{}", hint);
                eprintln!("{}", path.display());
                (false, Some(path.to_string_lossy().to_string()))
            }
        }
    };

    if json {
        let report = GenerateReport {
            delivery: service.settings().delivery.as_str(),
            image_fallback,
            copied,
            preview,
            output: output.map(|p| p.to_string_lossy().to_string()),
            html,
        };
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| AppError::Config(format!("序列化结果失败: {}", e)))?;
        println!("{}", text);
    } else if copied {
        println!("Signature copied to clipboard. Paste it into your mail client's signature settings.");
    } else if no_copy && output.is_none() {
        println!("{}", html);
    }

    Ok(())
}

fn normalize(settings: AppSettings, input: &Path, output: &Path, json: bool) -> Result<(), AppError> {
    let service = SignatureService::new(settings)?;
    let normalizer = service.normalizer();

    let raw = normalizer.load(ImageSource::FilePath(input.to_string_lossy().to_string()))?;
    let asset = normalizer.normalize(&raw.bytes)?;
    fs::write(output, asset.encoded_bytes())?;

    if json {
        let report = NormalizeReport {
            width: asset.width(),
            height: asset.height(),
            bytes: asset.encoded_bytes().len(),
            output: output.to_string_lossy().to_string(),
        };
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| AppError::Config(format!("序列化结果失败: {}", e)))?;
        println!("{}", text);
    } else {
        println!(
            "{}x{} JPEG ({} bytes) -> {}",
            asset.width(),
            asset.height(),
            asset.encoded_bytes().len(),
            output.display()
        );
    }
    Ok(())
}
