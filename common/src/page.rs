use crate::{ErrorCode, SuccessCode};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One ordering key, named by its client-facing field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: String,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Desc,
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    /// Accepts `field` or `field,asc|desc`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(2, ',').map(str::trim);
        let field = parts.next().unwrap_or_default();
        if field.is_empty() {
            return Err("Sort field cannot be empty".to_string());
        }
        let direction = match parts.next().map(|d| d.to_lowercase()) {
            None => SortDirection::Asc,
            Some(d) if d == "asc" => SortDirection::Asc,
            Some(d) if d == "desc" => SortDirection::Desc,
            Some(d) => return Err(format!("Invalid sort direction '{}', expected asc or desc", d)),
        };
        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }
}

/// Zero-based page request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Vec<SortOrder>,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort: Vec::new(),
        }
    }

    pub fn sorted_by(mut self, order: SortOrder) -> Self {
        self.sort.push(order);
        self
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// A bounded slice of results plus total-count metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_elements: u64, page_size: u32) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total_elements.div_ceil(u64::from(page_size))
        };
        Self {
            items,
            total_elements,
            total_pages,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

/// Response body shared by every operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_code: Option<SuccessCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ResponseEnvelope<T> {
    pub fn ok(code: SuccessCode, data: T) -> Self {
        Self {
            data: Some(data),
            success_code: Some(code),
            error_code: None,
            message: None,
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            data: None,
            success_code: None,
            error_code: Some(code),
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error_code.is_none()
    }

    pub fn status(&self) -> u16 {
        self.error_code.map(|c| c.http_status()).unwrap_or(200)
    }
}
