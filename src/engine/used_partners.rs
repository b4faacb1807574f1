// ==========================================
// TruckFlow 运输台账 - 当日已用合作方
// ==========================================
// 职责: 记录当前日期在远程已录入的合作方
// 说明: 表单内已占用的合作方由录入行实时推导，不在此存储
// ==========================================

use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{instrument, warn};

use crate::remote::{bounded, RemoteStore};

// ==========================================
// UsedPartnerTracker
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsedPartnerTracker {
    date: NaiveDate,
    remote_used: BTreeSet<String>,
}

impl UsedPartnerTracker {
    pub fn new<I: IntoIterator<Item = String>>(date: NaiveDate, used: I) -> Self {
        Self {
            date,
            remote_used: used
                .into_iter()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// 空集合（加载失败时的降级值）
    pub fn empty(date: NaiveDate) -> Self {
        Self::new(date, Vec::new())
    }

    /// 从远程加载指定日期的已用合作方
    ///
    /// 加载失败时降级为空集合并记录警告，不阻断录入
    #[instrument(skip(remote))]
    pub async fn fetch(remote: &dyn RemoteStore, date: NaiveDate, timeout: Duration) -> Self {
        match bounded(timeout, remote.get_used_partners_for_date(date)).await {
            Ok(names) => Self::new(date, names),
            Err(e) => {
                warn!("当日已用合作方加载失败，按空集合处理: date={}, error={}", date, e);
                Self::empty(date)
            }
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn contains(&self, partner: &str) -> bool {
        self.remote_used.contains(partner)
    }

    pub fn remote_used(&self) -> impl Iterator<Item = &str> {
        self.remote_used.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.remote_used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remote_used.is_empty()
    }
}
