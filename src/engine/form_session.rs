// ==========================================
// TruckFlow 运输台账 - 录入表单会话
// ==========================================
// 职责: 持有一次表单生命周期内的全部可变状态
//       (目录 / 当日已用合作方 / 录入行与候选 / 校验高亮)
// 生命周期: 打开表单时创建，关闭时丢弃
// 并发: 以 Arc<Mutex<FormSession>> 共享，单写者；
//       持锁期间不做远程调用，每个方法对外表现为原子操作
// ==========================================

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use chrono::NaiveDate;

use crate::domain::{
    EntityCategory, EntryRow, EntryStatus, FormField, LocationField, PendingCustomTarget, RowId,
    Selection,
};
use crate::engine::catalog::EntityCatalog;
use crate::engine::error::FormResult;
use crate::engine::row_constraint::{
    ApplyOutcome, DeleteRowOutcome, RowConstraintEngine, RowOptions, SelectionEffect,
};
use crate::engine::used_partners::UsedPartnerTracker;
use crate::engine::validation::{ValidationEngine, ValidationReport};

/// 会话共享句柄
pub type SharedSession = Arc<Mutex<FormSession>>;

// ==========================================
// FormSession
// ==========================================
#[derive(Debug, Clone)]
pub struct FormSession {
    catalog: EntityCatalog,
    used: UsedPartnerTracker,
    engine: RowConstraintEngine,
    /// 最近一次请求的录入日期；晚到的旧日期结果据此丢弃
    requested_date: NaiveDate,
    /// 以行标识记录，删除行后其他行的高亮不移位
    highlights: HashSet<(RowId, FormField)>,
}

impl FormSession {
    /// 打开会话并创建第一行
    pub fn open(catalog: EntityCatalog, used: UsedPartnerTracker) -> Self {
        let mut session = Self {
            catalog,
            requested_date: used.date(),
            used,
            engine: RowConstraintEngine::new(),
            highlights: HashSet::new(),
        };
        session.add_row();
        info!(
            date = %session.used.date(),
            partners = session.catalog.len(EntityCategory::Partner),
            locations = session.catalog.len(EntityCategory::Location),
            used_today = session.used.len(),
            "录入会话已打开"
        );
        session
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn date(&self) -> NaiveDate {
        self.used.date()
    }

    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    pub fn used_partners(&self) -> &UsedPartnerTracker {
        &self.used
    }

    pub fn rows(&self) -> &[EntryRow] {
        self.engine.rows()
    }

    pub fn row(&self, id: RowId) -> Option<&EntryRow> {
        self.engine.row(id)
    }

    pub fn options(&self, id: RowId) -> Option<&RowOptions> {
        self.engine.options(id)
    }

    /// 当前高亮字段（行索引, 字段）
    pub fn highlighted_fields(&self) -> BTreeSet<(usize, FormField)> {
        self.highlights
            .iter()
            .filter_map(|(id, field)| self.engine.row_index(*id).map(|i| (i, *field)))
            .collect()
    }

    // ==========================================
    // 行操作
    // ==========================================

    pub fn add_row(&mut self) -> RowId {
        self.engine.add_row(&self.catalog, &self.used)
    }

    pub fn delete_row(&mut self, id: RowId) -> FormResult<DeleteRowOutcome> {
        let outcome = self.engine.delete_row(id, &self.catalog, &self.used)?;
        self.highlights.retain(|(row, _)| *row != id);
        Ok(outcome)
    }

    pub fn select_partner(
        &mut self,
        id: RowId,
        selection: Selection,
    ) -> FormResult<SelectionEffect> {
        let effect = self
            .engine
            .select_partner(id, selection, &self.catalog, &self.used)?;
        self.clear_highlight(id, FormField::Partner);
        Ok(effect)
    }

    pub fn select_location(
        &mut self,
        id: RowId,
        field: LocationField,
        selection: Selection,
    ) -> FormResult<SelectionEffect> {
        let effect = self
            .engine
            .select_location(id, field, selection, &self.catalog)?;
        self.clear_highlight(id, field.into());
        Ok(effect)
    }

    pub fn set_amount(&mut self, id: RowId, amount: Option<f64>) -> FormResult<()> {
        self.engine.set_amount(id, amount)?;
        self.clear_highlight(id, FormField::Amount);
        Ok(())
    }

    pub fn set_truck_count(&mut self, id: RowId, truck_count: Option<i64>) -> FormResult<()> {
        self.engine.set_truck_count(id, truck_count)?;
        self.clear_highlight(id, FormField::TruckCount);
        Ok(())
    }

    pub fn set_status(&mut self, id: RowId, status: Option<EntryStatus>) -> FormResult<()> {
        self.engine.set_status(id, status)?;
        self.clear_highlight(id, FormField::Status);
        Ok(())
    }

    /// 只清除单个字段的高亮
    pub fn clear_highlight(&mut self, id: RowId, field: FormField) {
        self.highlights.remove(&(id, field));
    }

    // ==========================================
    // 日期 / 目录变更
    // ==========================================

    /// 登记新的目标日期（在加载该日期已用合作方之前调用）
    pub fn request_date(&mut self, date: NaiveDate) {
        self.requested_date = date;
    }

    pub fn requested_date(&self) -> NaiveDate {
        self.requested_date
    }

    /// 切换录入日期（传入新日期的已用合作方）
    ///
    /// # 返回
    /// - Some: 因与新日期已用合作方冲突而被清空的行
    /// - None: 结果对应的日期已被更晚的请求取代，未做任何修改
    pub fn change_date(&mut self, used: UsedPartnerTracker) -> Option<Vec<RowId>> {
        if used.date() != self.requested_date {
            debug!(
                stale = %used.date(),
                requested = %self.requested_date,
                "丢弃过期的已用合作方结果"
            );
            return None;
        }
        self.used = used;
        let released = self.engine.release_used_partners(&self.used);
        self.engine.recompute_options(&self.catalog, &self.used);
        debug!(date = %self.used.date(), released = released.len(), "录入日期已切换");
        Some(released)
    }

    /// 提交成功后重置表单: 仅保留一个空行，清空高亮
    ///
    /// 传入的已用合作方只在其日期仍为当前请求日期时替换
    pub fn reset(&mut self, used: UsedPartnerTracker) {
        if used.date() == self.requested_date {
            self.used = used;
        }
        self.engine = RowConstraintEngine::new();
        self.highlights.clear();
        self.add_row();
        info!(date = %self.used.date(), used_today = self.used.len(), "录入表单已重置");
    }

    /// 目录新增名称（目录管理同步），返回是否为新增
    pub fn add_catalog_entry(&mut self, category: EntityCategory, name: &str) -> bool {
        let added = self.catalog.add(category, name);
        if added {
            self.engine.recompute_options(&self.catalog, &self.used);
        }
        added
    }

    /// 目录移除名称（目录管理同步），返回是否存在
    pub fn remove_catalog_entry(&mut self, category: EntityCategory, name: &str) -> bool {
        let removed = self.catalog.remove(category, name);
        if removed {
            self.engine.recompute_options(&self.catalog, &self.used);
        }
        removed
    }

    /// 自定义实体: 目录加入名称并按目标回填（一次加锁内完成）
    pub fn apply_custom(&mut self, target: PendingCustomTarget, name: &str) -> ApplyOutcome {
        self.catalog.add(target.category(), name);
        let outcome = self
            .engine
            .apply_custom(target, name, &self.catalog, &self.used);
        if outcome.is_applied() {
            self.clear_highlight(target.row_id, target.field.into());
        }
        outcome
    }

    /// 重算全部候选集合
    pub fn recompute_options(&mut self) {
        self.engine.recompute_options(&self.catalog, &self.used);
    }

    // ==========================================
    // 校验
    // ==========================================

    /// 校验全部行，并以本次结果替换高亮集合
    pub fn validate(&mut self) -> ValidationReport {
        let report = ValidationEngine::validate(self.engine.rows());
        let rows = self.engine.rows();
        self.highlights = report
            .fields_to_highlight
            .iter()
            .filter_map(|(index, field)| rows.get(*index).map(|r| (r.id, *field)))
            .collect();
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> FormSession {
        FormSession::open(
            EntityCatalog::from_lists(
                vec!["Acme".into(), "Beta".into()],
                vec!["Depot".into(), "Port".into()],
            ),
            UsedPartnerTracker::empty(NaiveDate::from_ymd_opt(2026, 3, 7).unwrap()),
        )
    }

    #[test]
    fn test_open_creates_one_row() {
        let session = session();
        assert_eq!(session.rows().len(), 1);
        let id = session.rows()[0].id;
        assert!(session.options(id).is_some());
    }

    #[test]
    fn test_editing_clears_only_that_field() {
        let mut session = session();
        let id = session.rows()[0].id;
        let report = session.validate();
        assert!(!report.ok);
        assert_eq!(session.highlighted_fields().len(), 5);

        session
            .select_partner(id, Selection::Value("Acme".into()))
            .unwrap();
        let remaining = session.highlighted_fields();
        assert_eq!(remaining.len(), 4);
        assert!(!remaining.contains(&(0, FormField::Partner)));
        assert!(remaining.contains(&(0, FormField::From)));
    }

    #[test]
    fn test_highlights_follow_rows_after_delete() {
        let mut session = session();
        let first = session.rows()[0].id;
        session.add_row();
        session.validate();
        session.delete_row(first).unwrap();

        // 第二行变为第一行
        assert!(session
            .highlighted_fields()
            .iter()
            .all(|(index, _)| *index == 0));
        assert_eq!(session.highlighted_fields().len(), 5);
    }

    #[test]
    fn test_change_date_releases_colliding_partner() {
        let mut session = session();
        let id = session.rows()[0].id;
        session
            .select_partner(id, Selection::Value("Acme".into()))
            .unwrap();

        let next = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        session.request_date(next);
        let released = session.change_date(UsedPartnerTracker::new(
            next,
            vec!["Acme".to_string()],
        ));
        assert_eq!(released, Some(vec![id]));
        assert_eq!(session.date(), NaiveDate::from_ymd_opt(2026, 3, 8).unwrap());
        let partners: Vec<&str> = session
            .options(id)
            .unwrap()
            .partners
            .iter()
            .map(|o| o.value())
            .collect();
        assert_eq!(partners, vec!["Beta", "__custom__"]);
    }

    #[test]
    fn test_stale_date_result_is_discarded() {
        let mut session = session();
        let id = session.rows()[0].id;
        session
            .select_partner(id, Selection::Value("Acme".into()))
            .unwrap();
        let slow = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        let fast = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();

        session.request_date(slow);
        session.request_date(fast);
        assert_eq!(
            session.change_date(UsedPartnerTracker::empty(fast)),
            Some(vec![])
        );
        assert_eq!(
            session.change_date(UsedPartnerTracker::new(slow, vec!["Acme".to_string()])),
            None
        );
        assert_eq!(session.date(), fast);
        assert_eq!(session.row(id).unwrap().partner.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_reset_leaves_one_empty_row() {
        let mut session = session();
        let first = session.rows()[0].id;
        session
            .select_partner(first, Selection::Value("Acme".into()))
            .unwrap();
        session.add_row();
        session.validate();
        assert!(!session.highlighted_fields().is_empty());

        let date = session.date();
        session.reset(UsedPartnerTracker::new(date, vec!["Acme".to_string()]));

        assert_eq!(session.rows().len(), 1);
        let row = &session.rows()[0];
        assert_eq!(row.partner, None);
        assert!(session.highlighted_fields().is_empty());
        assert!(session.used_partners().contains("Acme"));
        let partners: Vec<&str> = session
            .options(row.id)
            .unwrap()
            .partners
            .iter()
            .map(|o| o.value())
            .collect();
        assert_eq!(partners, vec!["Beta", "__custom__"]);
    }
}
