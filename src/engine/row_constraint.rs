// ==========================================
// TruckFlow 运输台账 - 行选择约束引擎
// ==========================================
// 约束1: 有合作方的行之间合作方两两不同，且不在当日已用集合中
// 约束2: 同一行内起点 ≠ 终点（均非空时）
// ==========================================
// 重算规则（刻意不对称）:
// - 合作方变更 / 增删行: 重算"其他所有行"的合作方候选
// - 地点变更: 只重算同一行的另一个地点字段
// - 地点可跨行重复使用，不做跨行排除
// ==========================================

use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::domain::{
    EntityCategory, EntryRow, EntryStatus, LocationField, PendingCustomTarget, RowId, SelectField,
    SelectOption, Selection,
};
use crate::engine::catalog::EntityCatalog;
use crate::engine::error::{FormError, FormResult};
use crate::engine::used_partners::UsedPartnerTracker;

// ==========================================
// RowOptions - 单行的下拉候选
// ==========================================
/// 每个候选列表均以 `SelectOption::CreateNew` 结尾
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowOptions {
    pub partners: Vec<SelectOption>,
    pub from: Vec<SelectOption>,
    pub to: Vec<SelectOption>,
}

impl RowOptions {
    pub fn location(&self, field: LocationField) -> &[SelectOption] {
        match field {
            LocationField::From => &self.from,
            LocationField::To => &self.to,
        }
    }

    fn location_mut(&mut self, field: LocationField) -> &mut Vec<SelectOption> {
        match field {
            LocationField::From => &mut self.from,
            LocationField::To => &mut self.to,
        }
    }
}

/// 一次选择的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEffect {
    /// 值已写入行
    Applied,
    /// 选择了"新建"，字段已清空，需交给自定义实体流程
    CreateRequested(PendingCustomTarget),
}

/// 删除行的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteRowOutcome {
    Removed,
    /// 唯一的一行只清空不删除
    Cleared,
}

/// 自定义实体回填的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// 已回填，同行另一个地点与之相同而被清空
    SiblingCleared,
    /// 合作方已被其他行占用或当日已用，未回填
    Conflict,
    /// 目标行已被删除
    RowMissing,
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied | ApplyOutcome::SiblingCleared)
    }
}

fn with_sentinel<'a, I: IntoIterator<Item = &'a str>>(names: I) -> Vec<SelectOption> {
    names
        .into_iter()
        .map(|n| SelectOption::Existing(n.to_string()))
        .chain(std::iter::once(SelectOption::CreateNew))
        .collect()
}

// ==========================================
// RowConstraintEngine
// ==========================================
/// 持有录入行（按创建顺序）及每行的候选集合
///
/// 目录与当日已用集合由调用方传入，引擎不持有
#[derive(Debug, Clone, Default)]
pub struct RowConstraintEngine {
    rows: Vec<EntryRow>,
    options: HashMap<RowId, RowOptions>,
}

impl RowConstraintEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn rows(&self) -> &[EntryRow] {
        &self.rows
    }

    pub fn row(&self, id: RowId) -> Option<&EntryRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn row_index(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    pub fn options(&self, id: RowId) -> Option<&RowOptions> {
        self.options.get(&id)
    }

    fn row_mut(&mut self, id: RowId) -> FormResult<&mut EntryRow> {
        self.rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(FormError::RowNotFound(id))
    }

    /// 合作方是否被 `except` 之外的行占用
    fn partner_held_elsewhere(&self, partner: &str, except: RowId) -> bool {
        self.rows
            .iter()
            .any(|r| r.id != except && r.selected_partner() == Some(partner))
    }

    // ==========================================
    // 候选集合计算
    // ==========================================

    /// candidatePartners(R) = 目录 \ (当日已用 ∪ 其他行合作方) ∪ {R.partner}
    pub fn candidate_partners(
        &self,
        id: RowId,
        catalog: &EntityCatalog,
        used: &UsedPartnerTracker,
    ) -> Vec<SelectOption> {
        let held_elsewhere: BTreeSet<&str> = self
            .rows
            .iter()
            .filter(|r| r.id != id)
            .filter_map(|r| r.selected_partner())
            .collect();

        let mut names: BTreeSet<&str> = catalog
            .partners()
            .filter(|p| !used.contains(p) && !held_elsewhere.contains(p))
            .collect();

        if let Some(own) = self.row(id).and_then(|r| r.selected_partner()) {
            names.insert(own);
        }

        with_sentinel(names)
    }

    /// candidateFrom(R) = 目录 \ {R.to}；candidateTo(R) = 目录 \ {R.from}
    pub fn candidate_locations(
        &self,
        id: RowId,
        field: LocationField,
        catalog: &EntityCatalog,
    ) -> Vec<SelectOption> {
        let excluded = self.row(id).and_then(|r| r.location(field.sibling()));
        with_sentinel(catalog.locations().filter(|l| Some(*l) != excluded))
    }

    /// 重算所有行的全部候选集合
    ///
    /// 无状态变化时重复调用结果相同
    pub fn recompute_options(&mut self, catalog: &EntityCatalog, used: &UsedPartnerTracker) {
        let ids: Vec<RowId> = self.rows.iter().map(|r| r.id).collect();
        for id in ids {
            let computed = RowOptions {
                partners: self.candidate_partners(id, catalog, used),
                from: self.candidate_locations(id, LocationField::From, catalog),
                to: self.candidate_locations(id, LocationField::To, catalog),
            };
            self.options.insert(id, computed);
        }
        debug!(rows = self.rows.len(), "已重算全部候选集合");
    }

    /// 重算合作方候选（`except` 对应的行除外）
    fn recompute_partners(
        &mut self,
        except: Option<RowId>,
        catalog: &EntityCatalog,
        used: &UsedPartnerTracker,
    ) {
        let ids: Vec<RowId> = self
            .rows
            .iter()
            .map(|r| r.id)
            .filter(|id| Some(*id) != except)
            .collect();
        for id in ids {
            let partners = self.candidate_partners(id, catalog, used);
            self.options.entry(id).or_default().partners = partners;
        }
    }

    fn recompute_location(&mut self, id: RowId, field: LocationField, catalog: &EntityCatalog) {
        let candidates = self.candidate_locations(id, field, catalog);
        *self.options.entry(id).or_default().location_mut(field) = candidates;
    }

    fn recompute_all_locations(&mut self, catalog: &EntityCatalog) {
        let ids: Vec<RowId> = self.rows.iter().map(|r| r.id).collect();
        for id in ids {
            self.recompute_location(id, LocationField::From, catalog);
            self.recompute_location(id, LocationField::To, catalog);
        }
    }

    // ==========================================
    // 行管理
    // ==========================================

    /// 追加空行并计算其初始候选
    pub fn add_row(&mut self, catalog: &EntityCatalog, used: &UsedPartnerTracker) -> RowId {
        let row = EntryRow::empty();
        let id = row.id;
        self.rows.push(row);

        let initial = RowOptions {
            partners: self.candidate_partners(id, catalog, used),
            from: self.candidate_locations(id, LocationField::From, catalog),
            to: self.candidate_locations(id, LocationField::To, catalog),
        };
        self.options.insert(id, initial);
        debug!(row_id = %id, rows = self.rows.len(), "新增录入行");
        id
    }

    /// 删除行；唯一的一行只清空
    pub fn delete_row(
        &mut self,
        id: RowId,
        catalog: &EntityCatalog,
        used: &UsedPartnerTracker,
    ) -> FormResult<DeleteRowOutcome> {
        let index = self.row_index(id).ok_or(FormError::RowNotFound(id))?;

        if self.rows.len() <= 1 {
            self.rows[index].clear();
            self.recompute_options(catalog, used);
            return Ok(DeleteRowOutcome::Cleared);
        }

        self.rows.remove(index);
        self.options.remove(&id);
        self.recompute_partners(None, catalog, used);
        debug!(row_id = %id, rows = self.rows.len(), "删除录入行");
        Ok(DeleteRowOutcome::Removed)
    }

    // ==========================================
    // 选择
    // ==========================================

    pub fn select_partner(
        &mut self,
        id: RowId,
        selection: Selection,
        catalog: &EntityCatalog,
        used: &UsedPartnerTracker,
    ) -> FormResult<SelectionEffect> {
        match selection {
            Selection::CreateNew => {
                self.row_mut(id)?.partner = None;
                Ok(SelectionEffect::CreateRequested(PendingCustomTarget::new(
                    id,
                    SelectField::Partner,
                )))
            }
            Selection::Clear => {
                self.row_mut(id)?.partner = None;
                self.recompute_partners(Some(id), catalog, used);
                Ok(SelectionEffect::Applied)
            }
            Selection::Value(value) => {
                let value = value.trim().to_string();
                self.row_mut(id)?;

                let available = self
                    .candidate_partners(id, catalog, used)
                    .iter()
                    .any(|o| matches!(o, SelectOption::Existing(n) if *n == value));
                if !available {
                    return Err(if catalog.contains(EntityCategory::Partner, &value) {
                        FormError::PartnerUnavailable { name: value }
                    } else {
                        FormError::NotInCatalog {
                            category: EntityCategory::Partner,
                            name: value,
                        }
                    });
                }

                self.row_mut(id)?.partner = Some(value);
                self.recompute_partners(Some(id), catalog, used);
                Ok(SelectionEffect::Applied)
            }
        }
    }

    pub fn select_location(
        &mut self,
        id: RowId,
        field: LocationField,
        selection: Selection,
        catalog: &EntityCatalog,
    ) -> FormResult<SelectionEffect> {
        match selection {
            Selection::CreateNew => {
                *self.row_mut(id)?.location_mut(field) = None;
                Ok(SelectionEffect::CreateRequested(PendingCustomTarget::new(
                    id,
                    field.into(),
                )))
            }
            Selection::Clear => {
                *self.row_mut(id)?.location_mut(field) = None;
                self.recompute_location(id, field.sibling(), catalog);
                Ok(SelectionEffect::Applied)
            }
            Selection::Value(value) => {
                let value = value.trim().to_string();
                if !catalog.contains(EntityCategory::Location, &value) {
                    return Err(FormError::NotInCatalog {
                        category: EntityCategory::Location,
                        name: value,
                    });
                }

                let row = self.row_mut(id)?;
                if row.location(field.sibling()) == Some(value.as_str()) {
                    return Err(FormError::SameLocation { name: value });
                }
                *row.location_mut(field) = Some(value);

                self.recompute_location(id, field.sibling(), catalog);
                Ok(SelectionEffect::Applied)
            }
        }
    }

    // ==========================================
    // 自定义实体回填
    // ==========================================

    /// 按捕获的目标回填新名称（目录应已包含该名称）
    ///
    /// 合作方: 回填后重算所有行的合作方候选
    /// 地点: 另外重算所有行的地点候选（含目标行的另一个字段）
    pub fn apply_custom(
        &mut self,
        target: PendingCustomTarget,
        name: &str,
        catalog: &EntityCatalog,
        used: &UsedPartnerTracker,
    ) -> ApplyOutcome {
        let outcome = if self.row(target.row_id).is_none() {
            ApplyOutcome::RowMissing
        } else {
            match target.field.location_field() {
                None => {
                    if used.contains(name) || self.partner_held_elsewhere(name, target.row_id) {
                        ApplyOutcome::Conflict
                    } else {
                        // row_mut 不会失败: 上面已确认行存在
                        if let Ok(row) = self.row_mut(target.row_id) {
                            row.partner = Some(name.to_string());
                        }
                        ApplyOutcome::Applied
                    }
                }
                Some(field) => {
                    let mut outcome = ApplyOutcome::Applied;
                    if let Ok(row) = self.row_mut(target.row_id) {
                        *row.location_mut(field) = Some(name.to_string());
                        if row.location(field.sibling()) == Some(name) {
                            *row.location_mut(field.sibling()) = None;
                            outcome = ApplyOutcome::SiblingCleared;
                        }
                    }
                    outcome
                }
            }
        };

        self.recompute_partners(None, catalog, used);
        if target.category() == EntityCategory::Location {
            self.recompute_all_locations(catalog);
        }
        outcome
    }

    // ==========================================
    // 其他字段
    // ==========================================

    pub fn set_amount(&mut self, id: RowId, amount: Option<f64>) -> FormResult<()> {
        self.row_mut(id)?.amount = amount;
        Ok(())
    }

    pub fn set_truck_count(&mut self, id: RowId, truck_count: Option<i64>) -> FormResult<()> {
        self.row_mut(id)?.truck_count = truck_count;
        Ok(())
    }

    pub fn set_status(&mut self, id: RowId, status: Option<EntryStatus>) -> FormResult<()> {
        self.row_mut(id)?.status = status;
        Ok(())
    }

    /// 清空与当日已用集合冲突的合作方（切换日期后调用）
    ///
    /// # 返回
    /// - 被清空合作方的行
    pub fn release_used_partners(&mut self, used: &UsedPartnerTracker) -> Vec<RowId> {
        let mut released = Vec::new();
        for row in self.rows.iter_mut() {
            if row.selected_partner().map(|p| used.contains(p)).unwrap_or(false) {
                row.partner = None;
                released.push(row.id);
            }
        }
        released
    }
}
