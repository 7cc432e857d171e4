use serde::{Deserialize, Serialize};

use crate::domain::models::file::FileRecord;

/// Page size used when a listing does not specify one
pub const DEFAULT_LIST_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortBy {
    pub column: SortColumn,
    #[serde(default)]
    pub order: SortOrder,
}

/// Options accepted by `list`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, bon::Builder)]
#[serde(rename_all = "camelCase")]
pub struct ListOptions {
    /// Path prefix; empty or absent matches the whole bucket
    #[builder(into)]
    pub prefix: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort_by: Option<SortBy>,
}

impl ListOptions {
    pub fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or_default()
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIST_LIMIT)
    }

    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult {
    pub files: Vec<FileRecord>,
    pub has_more: bool,
}

/// Sort and slice the records matched by a listing.
///
/// `matched` must already be in encounter order; the sort is stable so ties
/// keep that order. `has_more` compares against the count before slicing.
pub fn paginate(mut matched: Vec<FileRecord>, options: &ListOptions) -> ListResult {
    if let Some(sort_by) = options.sort_by {
        matched.sort_by(|a, b| {
            let ordering = match sort_by.column {
                SortColumn::Name => a.name.cmp(&b.name),
                SortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
                SortColumn::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            };
            match sort_by.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }

    let total = matched.len();
    let offset = options.offset();
    let end = offset.saturating_add(options.limit());

    let files = matched
        .into_iter()
        .skip(offset)
        .take(options.limit())
        .collect();

    ListResult {
        files,
        has_more: end < total,
    }
}
