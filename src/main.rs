// ==========================================
// TruckFlow 运输台账 - 连通性检查入口
// ==========================================
// 职责: 加载配置，打开当日录入表单并加载当日交易，输出结果
// ==========================================

use anyhow::{anyhow, Context};
use chrono::Local;

use truckflow::app::AppState;
use truckflow::config::ConfigManager;
use truckflow::domain::DateFilter;
use truckflow::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 连通性检查", truckflow::APP_NAME);
    tracing::info!("系统版本: {}", truckflow::VERSION);
    tracing::info!("==================================================");

    let config_manager =
        ConfigManager::load_default().map_err(|e| anyhow!("配置加载失败: {}", e))?;
    tracing::info!("使用配置: {}", config_manager.path().display());
    config_manager
        .validate()
        .map_err(|e| anyhow!("配置无效: {}", e))?;

    let state = AppState::new(&config_manager).context("AppState初始化失败")?;

    let today = Local::now().date_naive();
    let form = state
        .open_entry_form(today)
        .await
        .context("录入表单打开失败")?;
    let snapshot = form.snapshot().context("读取会话失败")?;
    tracing::info!(
        date = %snapshot.date(),
        partners = snapshot.catalog().partners().count(),
        locations = snapshot.catalog().locations().count(),
        used_today = snapshot.used_partners().len(),
        "目录与当日已用合作方已加载"
    );

    let data = state
        .transaction_api
        .load(DateFilter::Today)
        .await
        .context("当日交易加载失败")?;
    tracing::info!(
        transactions = data.table_data.len(),
        total_trucks = data.summary.total_trucks,
        total_paid = data.summary.total_paid,
        total_outstanding = data.summary.total_outstanding,
        "当日交易已加载"
    );

    tracing::info!("连通性检查完成");
    Ok(())
}
