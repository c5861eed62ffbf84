//! RangeCaddie CLI 客户端
//!
//! 非交互式 CLI，用于测试和展示 SDK 功能：登录、场次列表、统计、球杆、主题，
//! 以及通过命令行参数一次性记录一球。

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rangecaddie_sdk_core_rust::caddie::auth::AuthListener;
use rangecaddie_sdk_core_rust::caddie::enums::{
    ClubType, DispersionBand, DispersionDirection, DistanceBand, ShotFlight, SwingPath, Trajectory,
};
use rangecaddie_sdk_core_rust::caddie::flow::{FlowStep, ShotDraft};
use rangecaddie_sdk_core_rust::caddie::session::SessionListener;
use rangecaddie_sdk_core_rust::{ClientConfig, QueryState, RangeCaddieClient, SessionMode, Theme};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// RangeCaddie CLI 客户端
#[derive(Parser, Debug)]
#[command(name = "rangecaddie-cli")]
#[command(about = "RangeCaddie CLI 客户端 - 用于测试和展示 SDK 功能", long_about = None)]
struct Args {
    /// API 地址（默认读取 RANGECADDIE_API_URL，否则 http://localhost:3000）
    #[arg(long)]
    api_url: Option<String>,

    /// 本地数据库 URL（默认读取 RANGECADDIE_DB_URL）
    #[arg(long)]
    db_url: Option<String>,

    /// 日志级别（默认: info,rangecaddie_sdk_core_rust=debug）
    #[arg(long, default_value = "info,rangecaddie_sdk_core_rust=debug")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 邮箱密码登录
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// 注册新账号
    Signup {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// 退出登录
    Logout,
    /// 当前用户信息
    Profile,
    /// 最近场次
    Sessions {
        /// 从服务端刷新
        #[arg(long)]
        refresh: bool,
    },
    /// 统计页数据
    Stats {
        #[arg(long)]
        session: Option<String>,
        #[arg(long)]
        club: Option<String>,
    },
    /// 球杆管理
    Clubs {
        #[command(subcommand)]
        action: ClubsCommand,
    },
    /// 查看或设置主题（light / dark / system）
    Theme { value: Option<Theme> },
    /// 记录一球（练习场模式）
    Shot(ShotArgs),
    /// Google 登录地址
    GoogleUrl,
}

#[derive(Subcommand, Debug)]
enum ClubsCommand {
    /// 服务端球杆列表
    List,
    /// 可选球杆类型
    Types,
    /// 本地球杆选择
    Selection,
    /// 保存球杆选择（球杆代码）
    Select { codes: Vec<ClubType> },
    /// 恢复默认选择（全部球杆）
    Reset,
}

#[derive(clap::Args, Debug)]
struct ShotArgs {
    /// 模式：free / short / long
    #[arg(long, default_value = "free")]
    mode: SessionMode,
    #[arg(long)]
    club: ClubType,
    /// 目标距离区间，例如 Y150_160
    #[arg(long)]
    target: DistanceBand,
    #[arg(long)]
    flight: ShotFlight,
    /// 目标散布区间，例如 D10_20
    #[arg(long)]
    dispersion: DispersionBand,
    #[arg(long)]
    trajectory: Trajectory,
    #[arg(long)]
    swing_path: SwingPath,
    #[arg(long)]
    actual_distance: DistanceBand,
    #[arg(long)]
    actual_dispersion: DispersionBand,
    #[arg(long, default_value = "CENTER")]
    direction: DispersionDirection,
    #[arg(long)]
    actual_flight: ShotFlight,
    #[arg(long)]
    actual_trajectory: Trajectory,
    #[arg(long)]
    actual_swing_path: SwingPath,
    /// 击球质量（Thin / Fat / Pure / Toe / Heel）或自由文本
    #[arg(long)]
    result: Option<String>,
    #[arg(long, default_value = "")]
    note: String,
}

/// 初始化日志（同时输出到 stdout 和文件）
fn init_logger(log_level: &str) -> Result<()> {
    use std::fs::OpenOptions;
    use std::io;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    // 优先使用环境变量 RUST_LOG（如果设置了），否则使用命令行参数
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // 创建日志文件（追加模式）
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .context("无法创建日志文件 debug.log")?;

    // 输出到 stdout（控制台），保留 ANSI 颜色代码用于终端显示
    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(true);

    // 输出到文件，禁用 ANSI 颜色代码
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    info!("[CLI] 📝 日志已同时输出到控制台和文件: debug.log");
    Ok(())
}

struct CliAuthListener;

#[async_trait::async_trait]
impl AuthListener for CliAuthListener {
    async fn on_sign_in_required(&self, route: String) {
        warn!("[CLI/Auth] 🔑 需要重新登录: {}", route);
    }
}

struct CliSessionListener;

#[async_trait::async_trait]
impl SessionListener for CliSessionListener {
    async fn on_recent_sessions_changed(&self, sessions_json: String) {
        info!("[CLI/Session] 🔄 最近场次变更: {}", sessions_json);
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("序列化输出失败")?
    );
    Ok(())
}

/// 逐步填写并提交一球，返回统计页路由
async fn record_shot(client: &RangeCaddieClient, args: ShotArgs) -> Result<String> {
    if args.mode.is_putting() {
        return Err(anyhow::anyhow!("推杆模式不支持命令行记录"));
    }
    let mut flow = client.new_flow();
    flow.select_mode(args.mode);
    if let Some(ShotDraft::Range(draft)) = flow.draft_mut() {
        draft.club = Some(args.club);
        draft.intended_distance = Some(args.target);
        draft.intended_flight = Some(args.flight);
        draft.intended_dispersion = Some(args.dispersion);
        draft.intended_trajectory = Some(args.trajectory);
        draft.intended_swing_path = Some(args.swing_path);
        draft.actual_distance = Some(args.actual_distance);
        draft.actual_dispersion = Some(args.actual_dispersion);
        draft.dispersion_direction = args.direction;
        draft.actual_flight = Some(args.actual_flight);
        draft.actual_trajectory = Some(args.actual_trajectory);
        draft.actual_swing_path = Some(args.actual_swing_path);
        draft.result_tag = args.result.filter(|r| !r.trim().is_empty());
        draft.note = args.note;
    }

    while flow.step() != FlowStep::Finish {
        let before = (flow.step(), flow.pre_index(), flow.post_index());
        flow.next().await;
        if let Some(message) = flow.error() {
            let message = message.to_string();
            error!("[CLI] ❌ 记录失败: {}", message);
            flow.cancel_session().await;
            return Err(anyhow::anyhow!(message));
        }
        if before == (flow.step(), flow.pre_index(), flow.post_index()) {
            return Err(anyhow::anyhow!("向导无法继续: {:?}", flow.step()));
        }
    }

    if let Some(view) = flow.finish_view() {
        print_json(&view)?;
    }
    let route = flow
        .finish_session()
        .await
        .ok_or_else(|| anyhow::anyhow!(flow.error().unwrap_or("保存场次失败").to_string()))?;
    Ok(route)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日志
    init_logger(&args.log_level)?;
    info!("[CLI] 🚀 RangeCaddie CLI 客户端");

    let mut config = ClientConfig::from_env();
    if let Some(url) = args.api_url.as_deref() {
        config = config.with_api_base_url(url);
    }
    if let Some(db_url) = args.db_url {
        config.db_url = db_url;
    }
    info!("[CLI] 🌐 API: {}", config.api_base_url);

    let client = RangeCaddieClient::with_listeners(
        config,
        Arc::new(CliAuthListener),
        Arc::new(CliSessionListener),
    )
    .await?;

    match args.command {
        Command::Login { email, password } => {
            client.auth().login(&email, &password).await?;
            info!("[CLI] ✅ 登录成功！用户ID: {:?}", client.tokens().user_id().await?);
        }
        Command::Signup { email, password } => {
            client.auth().signup(&email, &password).await?;
            info!("[CLI] ✅ 注册成功！用户ID: {:?}", client.tokens().user_id().await?);
        }
        Command::Logout => client.logout().await?,
        Command::Profile => print_json(&client.remote().profile().await?)?,
        Command::Sessions { refresh } => {
            let sessions = if refresh {
                client.recent_sessions().refresh().await?
            } else {
                client.recent_sessions().stored_sessions().await?
            };
            info!("[CLI] 📋 最近场次（共 {} 个）", sessions.len());
            print_json(&sessions)?;
        }
        Command::Stats { session, club } => {
            let mut query = QueryState::parse("tab=stats");
            if let Some(session) = session.as_deref() {
                query.set("session", session);
            }
            if let Some(club) = club.as_deref() {
                query.set("club", club);
            }
            let view = client.stats().load(&query).await?;
            if let Some(sync) = view.query_sync.as_ref() {
                info!("[CLI] 🔗 {}", sync.href("/"));
            }
            print_json(&view)?;
        }
        Command::Clubs { action } => match action {
            ClubsCommand::List => print_json(&client.remote().clubs().await?)?,
            ClubsCommand::Types => print_json(&client.remote().club_types().await?)?,
            ClubsCommand::Selection => {
                let selection = client.club_selection().await?;
                print_json(&selection.clubs())?;
            }
            ClubsCommand::Select { codes } => {
                let mut selection = client.club_selection().await?;
                selection.set_clubs(codes);
                selection.save().await?;
                print_json(&selection.clubs())?;
            }
            ClubsCommand::Reset => {
                let mut selection = client.club_selection().await?;
                selection.reset_to_default();
                selection.save().await?;
                print_json(&selection.clubs())?;
            }
        },
        Command::Theme { value } => {
            if let Some(theme) = value {
                client.theme().set_theme(theme).await?;
            }
            println!("{}", client.theme().theme().await?.as_str());
        }
        Command::Shot(shot) => {
            let route = record_shot(&client, shot).await?;
            info!("[CLI] ⛳ 已记录，统计页: {}", route);
            println!("{}", route);
        }
        Command::GoogleUrl => println!("{}", client.auth().google_auth_url()),
    }

    Ok(())
}
