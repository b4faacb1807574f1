// ==========================================
// TruckFlow 运输台账 - 实体目录
// ==========================================
// 职责: 维护已知合作方/地点名称（升序集合）
// 说明: 名称先 trim，空名称被丢弃；比较区分大小写
// ==========================================

use std::collections::BTreeSet;

use crate::domain::EntityCategory;

// ==========================================
// EntityCatalog - 实体目录
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityCatalog {
    partners: BTreeSet<String>,
    locations: BTreeSet<String>,
}

impl EntityCatalog {
    /// 从远程返回的名称列表构建目录
    pub fn from_lists<P, L>(partners: P, locations: L) -> Self
    where
        P: IntoIterator<Item = String>,
        L: IntoIterator<Item = String>,
    {
        Self {
            partners: normalize(partners),
            locations: normalize(locations),
        }
    }

    fn set(&self, category: EntityCategory) -> &BTreeSet<String> {
        match category {
            EntityCategory::Partner => &self.partners,
            EntityCategory::Location => &self.locations,
        }
    }

    fn set_mut(&mut self, category: EntityCategory) -> &mut BTreeSet<String> {
        match category {
            EntityCategory::Partner => &mut self.partners,
            EntityCategory::Location => &mut self.locations,
        }
    }

    pub fn contains(&self, category: EntityCategory, name: &str) -> bool {
        self.set(category).contains(name.trim())
    }

    /// 新增名称，已存在时不做任何改变
    ///
    /// # 返回
    /// - true: 名称为新增
    /// - false: 名称为空或已存在
    pub fn add(&mut self, category: EntityCategory, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.set_mut(category).insert(name.to_string())
    }

    /// 移除名称
    pub fn remove(&mut self, category: EntityCategory, name: &str) -> bool {
        self.set_mut(category).remove(name.trim())
    }

    /// 按升序遍历名称
    pub fn names(&self, category: EntityCategory) -> impl Iterator<Item = &str> {
        self.set(category).iter().map(String::as_str)
    }

    pub fn partners(&self) -> impl Iterator<Item = &str> {
        self.names(EntityCategory::Partner)
    }

    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.names(EntityCategory::Location)
    }

    pub fn len(&self, category: EntityCategory) -> usize {
        self.set(category).len()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty() && self.locations.is_empty()
    }
}

fn normalize<I: IntoIterator<Item = String>>(names: I) -> BTreeSet<String> {
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}
