// ==========================================
// Mock 远程存储 - 用于集成测试
// ==========================================
// 内存实现 RemoteStore；可配置新建行为、延迟、批量结果，并记录调用
// ==========================================

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use truckflow::domain::{
    DashboardData, DashboardSummary, DateFilter, EntityCategory, EntryPayload, EntryRef,
    EntryStatus, Transaction,
};
use truckflow::remote::{
    BatchReceipt, BatchStatus, CatalogLists, CreateStatus, RemoteError, RemoteResult, RemoteStore,
};

/// 新建实体时的远程行为
#[derive(Debug, Clone)]
pub enum CreateBehavior {
    Succeed,
    Exists,
    Fail(RemoteError),
}

pub struct MockRemoteStore {
    partners: Mutex<Vec<String>>,
    locations: Mutex<Vec<String>>,
    used: Mutex<HashMap<NaiveDate, Vec<String>>>,
    used_error: Mutex<Option<RemoteError>>,
    used_delays: Mutex<HashMap<NaiveDate, Duration>>,
    catalog_error: Mutex<Option<RemoteError>>,
    create_behavior: Mutex<CreateBehavior>,
    create_delays: Mutex<HashMap<String, Duration>>,
    batch_result: Mutex<Option<RemoteResult<BatchReceipt>>>,
    batches: Mutex<Vec<Vec<EntryPayload>>>,
    transactions: Mutex<Vec<Transaction>>,
    write_error: Mutex<Option<RemoteError>>,
    updates: Mutex<Vec<(EntryRef, EntryPayload)>>,
    filters: Mutex<Vec<DateFilter>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl MockRemoteStore {
    pub fn new(partners: &[&str], locations: &[&str]) -> Self {
        Self {
            partners: Mutex::new(partners.iter().map(|s| s.to_string()).collect()),
            locations: Mutex::new(locations.iter().map(|s| s.to_string()).collect()),
            used: Mutex::new(HashMap::new()),
            used_error: Mutex::new(None),
            used_delays: Mutex::new(HashMap::new()),
            catalog_error: Mutex::new(None),
            create_behavior: Mutex::new(CreateBehavior::Succeed),
            create_delays: Mutex::new(HashMap::new()),
            batch_result: Mutex::new(None),
            batches: Mutex::new(Vec::new()),
            transactions: Mutex::new(Vec::new()),
            write_error: Mutex::new(None),
            updates: Mutex::new(Vec::new()),
            filters: Mutex::new(Vec::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    // ==========================================
    // 行为配置
    // ==========================================

    pub fn set_used(&self, date: NaiveDate, partners: &[&str]) {
        self.used
            .lock()
            .unwrap()
            .insert(date, partners.iter().map(|s| s.to_string()).collect());
    }

    pub fn fail_used_partners(&self, err: RemoteError) {
        *self.used_error.lock().unwrap() = Some(err);
    }

    /// 指定日期的已用合作方查询延迟返回
    pub fn delay_used(&self, date: NaiveDate, delay: Duration) {
        self.used_delays.lock().unwrap().insert(date, delay);
    }

    pub fn fail_catalog(&self, err: RemoteError) {
        *self.catalog_error.lock().unwrap() = Some(err);
    }

    pub fn set_create_behavior(&self, behavior: CreateBehavior) {
        *self.create_behavior.lock().unwrap() = behavior;
    }

    /// 指定名称的新建请求延迟返回
    pub fn delay_create(&self, name: &str, delay: Duration) {
        self.create_delays
            .lock()
            .unwrap()
            .insert(name.to_string(), delay);
    }

    pub fn set_batch_result(&self, result: RemoteResult<BatchReceipt>) {
        *self.batch_result.lock().unwrap() = Some(result);
    }

    pub fn set_transactions(&self, transactions: Vec<Transaction>) {
        *self.transactions.lock().unwrap() = transactions;
    }

    /// updateEntry / deleteEntry 返回的错误
    pub fn fail_writes(&self, err: RemoteError) {
        *self.write_error.lock().unwrap() = Some(err);
    }

    // ==========================================
    // 记录查询
    // ==========================================

    pub fn calls(&self, action: &str) -> usize {
        self.calls.lock().unwrap().get(action).copied().unwrap_or(0)
    }

    pub fn batches(&self) -> Vec<Vec<EntryPayload>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<(EntryRef, EntryPayload)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn filters(&self) -> Vec<DateFilter> {
        self.filters.lock().unwrap().clone()
    }

    pub fn partners(&self) -> Vec<String> {
        self.partners.lock().unwrap().clone()
    }

    pub fn locations(&self) -> Vec<String> {
        self.locations.lock().unwrap().clone()
    }

    fn record(&self, action: &'static str) {
        *self.calls.lock().unwrap().entry(action).or_insert(0) += 1;
    }

    fn names(&self, category: EntityCategory) -> &Mutex<Vec<String>> {
        match category {
            EntityCategory::Partner => &self.partners,
            EntityCategory::Location => &self.locations,
        }
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn get_partners_and_locations(&self) -> RemoteResult<CatalogLists> {
        self.record("getPartnersAndLocations");
        if let Some(err) = self.catalog_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(CatalogLists {
            partners: self.partners(),
            locations: self.locations(),
        })
    }

    async fn get_used_partners_for_date(&self, date: NaiveDate) -> RemoteResult<Vec<String>> {
        self.record("getUsedPartnersForDate");
        let delay = self.used_delays.lock().unwrap().get(&date).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.used_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self
            .used
            .lock()
            .unwrap()
            .get(&date)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_data(&self, filter: &DateFilter) -> RemoteResult<DashboardData> {
        self.record("getData");
        self.filters.lock().unwrap().push(*filter);
        let table_data = self.transactions.lock().unwrap().clone();
        let summary = DashboardSummary {
            total_trucks: table_data.iter().map(|t| t.truck_count).sum(),
            total_paid: table_data
                .iter()
                .filter(|t| t.status == EntryStatus::Paid)
                .map(|t| t.amount)
                .sum(),
            total_outstanding: table_data
                .iter()
                .filter(|t| t.status == EntryStatus::Outstanding)
                .map(|t| t.amount)
                .sum(),
        };
        Ok(DashboardData {
            summary,
            table_data,
        })
    }

    async fn create_entity(
        &self,
        category: EntityCategory,
        name: &str,
    ) -> RemoteResult<CreateStatus> {
        self.record("createEntity");
        let delay = self.create_delays.lock().unwrap().get(name).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let behavior = self.create_behavior.lock().unwrap().clone();
        match behavior {
            CreateBehavior::Succeed => {
                let mut names = self.names(category).lock().unwrap();
                if names.iter().any(|n| n == name) {
                    return Ok(CreateStatus::AlreadyExists);
                }
                names.push(name.to_string());
                Ok(CreateStatus::Created)
            }
            CreateBehavior::Exists => Ok(CreateStatus::AlreadyExists),
            CreateBehavior::Fail(err) => Err(err),
        }
    }

    async fn delete_entity(&self, category: EntityCategory, name: &str) -> RemoteResult<()> {
        self.record("deleteEntity");
        let mut names = self.names(category).lock().unwrap();
        let before = names.len();
        names.retain(|n| n != name);
        if names.len() == before {
            return Err(RemoteError::logic(Some(format!("{} not found", name))));
        }
        Ok(())
    }

    async fn add_entries(&self, entries: &[EntryPayload]) -> RemoteResult<BatchReceipt> {
        self.record("addEntries");
        let configured = self.batch_result.lock().unwrap().clone();
        let result = configured.unwrap_or(Ok(BatchReceipt {
            status: BatchStatus::Success,
            saved_count: entries.len(),
        }));
        if let Ok(receipt) = &result {
            // 已保存条目的合作方计入当日已用
            let mut used = self.used.lock().unwrap();
            for entry in entries.iter().take(receipt.saved_count) {
                used.entry(entry.date)
                    .or_default()
                    .push(entry.partner.clone());
            }
            self.batches.lock().unwrap().push(entries.to_vec());
        }
        result
    }

    async fn update_entry(&self, entry_ref: &EntryRef, entry: &EntryPayload) -> RemoteResult<()> {
        self.record("updateEntry");
        if let Some(err) = self.write_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.updates
            .lock()
            .unwrap()
            .push((entry_ref.clone(), entry.clone()));
        Ok(())
    }

    async fn delete_entry(&self, entry_ref: &EntryRef) -> RemoteResult<()> {
        self.record("deleteEntry");
        if let Some(err) = self.write_error.lock().unwrap().clone() {
            return Err(err);
        }
        let mut transactions = self.transactions.lock().unwrap();
        let before = transactions.len();
        transactions.retain(|t| !t.matches(entry_ref));
        if transactions.len() == before {
            return Err(RemoteError::logic(Some("Entry not found".to_string())));
        }
        Ok(())
    }
}
